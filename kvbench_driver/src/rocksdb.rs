// RocksDB adapter / RocksDB 适配器

use std::{any::Any, path::Path};

use rocksdb::{
  BlockBasedOptions, Cache, DB, DBCompressionType, DBRawIteratorWithThreadMode, ErrorKind,
  WriteBatch,
};

use crate::{
  Batch, Compression, Db, DbIter, Driver, Error, Options, ReadOptions, Result, WriteOptions,
};

pub const NAME: &str = "rocksdb";

pub struct RocksDriver;

impl Driver for RocksDriver {
  fn open(&self, dir: &Path, opts: &Options) -> Result<Box<dyn Db>> {
    let db = DB::open(&convert_options(opts), dir).map_err(Error::backend)?;
    Ok(Box::new(RocksDb { db }))
  }
}

fn convert_options(opts: &Options) -> rocksdb::Options {
  let mut o = rocksdb::Options::default();
  o.create_if_missing(opts.create_if_missing);
  o.set_error_if_exists(opts.error_if_exists);
  if opts.max_open_files > 0 {
    o.set_max_open_files(opts.max_open_files.min(i32::MAX as usize) as i32);
  }
  if opts.write_buffer_size > 0 {
    o.set_write_buffer_size(opts.write_buffer_size);
  }
  match opts.compression {
    Compression::Default => {}
    Compression::None => o.set_compression_type(DBCompressionType::None),
    Compression::Snappy => o.set_compression_type(DBCompressionType::Snappy),
  }

  let mut block = BlockBasedOptions::default();
  if opts.bloom_bits_per_key > 0 {
    block.set_bloom_filter(opts.bloom_bits_per_key as f64, false);
  }
  if opts.block_cache_capacity > 0 {
    let cache = Cache::new_lru_cache(opts.block_cache_capacity);
    block.set_block_cache(&cache);
  } else {
    block.disable_cache();
  }
  o.set_block_based_table_factory(&block);
  o
}

fn convert_read(opt: &ReadOptions) -> rocksdb::ReadOptions {
  let mut r = rocksdb::ReadOptions::default();
  r.fill_cache(!opt.dont_fill_cache);
  r.set_verify_checksums(opt.verify_checksums);
  r
}

fn convert_write(opt: &WriteOptions) -> rocksdb::WriteOptions {
  let mut w = rocksdb::WriteOptions::default();
  w.set_sync(opt.sync);
  w
}

fn kind(err: &Error) -> Option<ErrorKind> {
  match err {
    Error::Backend(e) => e.downcast_ref::<rocksdb::Error>().map(rocksdb::Error::kind),
    _ => None,
  }
}

pub struct RocksDb {
  db: DB,
}

impl Db for RocksDb {
  fn get(&self, key: &[u8], opt: &ReadOptions) -> Result<Vec<u8>> {
    self
      .db
      .get_opt(key, &convert_read(opt))
      .map_err(Error::backend)?
      .ok_or(Error::NotFound)
  }

  fn put(&self, key: &[u8], val: &[u8], opt: &WriteOptions) -> Result<()> {
    self
      .db
      .put_opt(key, val, &convert_write(opt))
      .map_err(Error::backend)
  }

  fn delete(&self, key: &[u8], opt: &WriteOptions) -> Result<()> {
    self
      .db
      .delete_opt(key, &convert_write(opt))
      .map_err(Error::backend)
  }

  fn write(&self, batch: &mut dyn Batch, opt: &WriteOptions) -> Result<()> {
    let batch = batch
      .as_any_mut()
      .downcast_mut::<RocksBatch>()
      .ok_or(Error::ForeignBatch)?;
    self
      .db
      .write_opt(&batch.0, &convert_write(opt))
      .map_err(Error::backend)
  }

  fn batch(&self) -> Box<dyn Batch> {
    Box::new(RocksBatch::default())
  }

  fn all(&self, opt: &ReadOptions) -> Result<Box<dyn DbIter + '_>> {
    let it = self.db.raw_iterator_opt(convert_read(opt));
    Ok(Box::new(RocksIter {
      it: Some(it),
      run: false,
      err: None,
    }))
  }

  fn close(self: Box<Self>) -> Result<()> {
    // Dropping the handle closes the database / 释放句柄即关闭数据库
    drop(self);
    Ok(())
  }

  fn is_not_found(&self, err: &Error) -> bool {
    matches!(err, Error::NotFound) || kind(err) == Some(ErrorKind::NotFound)
  }

  fn is_corrupt(&self, err: &Error) -> bool {
    matches!(err, Error::Corrupt(_)) || kind(err) == Some(ErrorKind::Corruption)
  }
}

#[derive(Default)]
pub struct RocksBatch(WriteBatch);

impl Batch for RocksBatch {
  fn put(&mut self, key: &[u8], val: &[u8]) {
    self.0.put(key, val);
  }

  fn delete(&mut self, key: &[u8]) {
    self.0.delete(key);
  }

  fn clear(&mut self) {
    self.0.clear();
  }

  fn len(&self) -> usize {
    self.0.len()
  }

  fn as_any_mut(&mut self) -> &mut dyn Any {
    self
  }
}

pub struct RocksIter<'a> {
  /// None once closed / 关闭后为 None
  it: Option<DBRawIteratorWithThreadMode<'a, DB>>,
  run: bool,
  err: Option<Error>,
}

impl RocksIter<'_> {
  /// Record the first status error and report validity
  /// 记录首个状态错误并返回有效性
  fn settle(&mut self) -> bool {
    let Some(it) = &self.it else {
      return false;
    };
    if self.err.is_none() {
      if let Err(e) = it.status() {
        self.err = Some(Error::backend(e));
      }
    }
    it.valid()
  }

  fn with(&mut self, f: impl FnOnce(&mut DBRawIteratorWithThreadMode<'_, DB>)) -> bool {
    self.run = true;
    if let Some(it) = &mut self.it {
      f(it);
    }
    self.settle()
  }
}

impl DbIter for RocksIter<'_> {
  fn first(&mut self) -> bool {
    self.with(|it| it.seek_to_first())
  }

  fn last(&mut self) -> bool {
    self.with(|it| it.seek_to_last())
  }

  fn next(&mut self) -> bool {
    if !self.run {
      return self.first();
    }
    self.with(|it| {
      if it.valid() {
        it.next()
      }
    })
  }

  fn prev(&mut self) -> bool {
    if !self.run {
      return self.last();
    }
    self.with(|it| {
      if it.valid() {
        it.prev()
      }
    })
  }

  fn seek(&mut self, key: &[u8]) -> bool {
    self.with(|it| it.seek(key))
  }

  fn valid(&self) -> bool {
    self.it.as_ref().is_some_and(|it| it.valid())
  }

  fn key(&self) -> Option<&[u8]> {
    self.it.as_ref()?.key()
  }

  fn value(&self) -> Option<&[u8]> {
    self.it.as_ref()?.value()
  }

  fn err(&self) -> Option<&Error> {
    self.err.as_ref()
  }

  fn close(&mut self) -> Result<()> {
    self.settle();
    self.it = None;
    match self.err.take() {
      Some(e) => Err(e),
      None => Ok(()),
    }
  }
}
