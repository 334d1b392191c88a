//! Ordered in-memory engine persisted on close
//! 关闭时持久化的有序内存引擎
//!
//! Always compiled in, so the harness runs without native libraries.
//! Tuning options (compression, cache, bloom) have no effect and `sync`
//! writes are durable only once the database is closed.
//! 始终编译，使基准框架无需原生库即可运行。
//! 调优选项（压缩、缓存、布隆）无效，`sync` 写入在关闭后才落盘。

mod iter;
mod snapshot;

use std::{
  any::Any,
  collections::BTreeMap,
  path::{Path, PathBuf},
  sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
  },
};

pub use iter::BTreeIter;
use log::{debug, warn};
use parking_lot::RwLock;
pub use snapshot::{FILE, MAGIC};

use crate::{Batch, Db, DbIter, Driver, Error, Options, ReadOptions, Result, WriteOptions};

pub const NAME: &str = "btree";

pub(crate) type Map = BTreeMap<Box<[u8]>, Box<[u8]>>;

pub struct BTreeDriver;

impl Driver for BTreeDriver {
  fn open(&self, dir: &Path, opts: &Options) -> Result<Box<dyn Db>> {
    Ok(Box::new(BTreeDb::open(dir, opts)?))
  }
}

pub struct BTreeDb {
  dir: PathBuf,
  /// Iterators hold a clone of the Arc; writers copy on write
  /// 迭代器持有 Arc 克隆，写入时写时复制
  map: RwLock<Arc<Map>>,
  dirty: AtomicBool,
}

impl BTreeDb {
  pub fn open(dir: &Path, opts: &Options) -> Result<Self> {
    let path = dir.join(FILE);
    let (map, dirty) = if path.exists() {
      if opts.error_if_exists {
        return Err(Error::Exists(dir.to_path_buf()));
      }
      (snapshot::load(&path)?, false)
    } else {
      if !opts.create_if_missing {
        return Err(Error::Missing(dir.to_path_buf()));
      }
      std::fs::create_dir_all(dir)?;
      // Dirty so that close leaves a snapshot even when empty
      // 标记为脏，即使为空关闭时也写出快照
      (Map::new(), true)
    };
    debug!("btree open {} ({} keys)", dir.display(), map.len());
    Ok(Self {
      dir: dir.to_path_buf(),
      map: RwLock::new(Arc::new(map)),
      dirty: AtomicBool::new(dirty),
    })
  }

  pub fn len(&self) -> usize {
    self.map.read().len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  #[inline]
  fn mutate<R>(&self, f: impl FnOnce(&mut Map) -> R) -> R {
    let mut guard = self.map.write();
    let r = f(Arc::make_mut(&mut guard));
    self.dirty.store(true, Ordering::Release);
    r
  }

  fn persist(&self) -> Result<()> {
    if self.dirty.load(Ordering::Acquire) {
      let map = self.map.read().clone();
      snapshot::store(&self.dir.join(FILE), &map)?;
      self.dirty.store(false, Ordering::Release);
      debug!("btree persist {} ({} keys)", self.dir.display(), map.len());
    }
    Ok(())
  }
}

impl Drop for BTreeDb {
  fn drop(&mut self) {
    if self.dirty.load(Ordering::Acquire) {
      warn!("btree {} dropped without close, changes lost", self.dir.display());
    }
  }
}

impl Db for BTreeDb {
  fn get(&self, key: &[u8], _: &ReadOptions) -> Result<Vec<u8>> {
    self
      .map
      .read()
      .get(key)
      .map(|v| v.to_vec())
      .ok_or(Error::NotFound)
  }

  fn put(&self, key: &[u8], val: &[u8], _: &WriteOptions) -> Result<()> {
    self.mutate(|m| m.insert(key.into(), val.into()));
    Ok(())
  }

  fn delete(&self, key: &[u8], _: &WriteOptions) -> Result<()> {
    self.mutate(|m| m.remove(key));
    Ok(())
  }

  fn write(&self, batch: &mut dyn Batch, _: &WriteOptions) -> Result<()> {
    let batch = batch
      .as_any_mut()
      .downcast_mut::<BTreeBatch>()
      .ok_or(Error::ForeignBatch)?;
    // One write lock for the whole batch: readers see all or nothing
    // 整个批次只持一次写锁：读者要么全见要么全不见
    self.mutate(|m| {
      for op in &batch.ops {
        match op {
          Op::Put(k, v) => {
            m.insert(k.clone(), v.clone());
          }
          Op::Delete(k) => {
            m.remove(k);
          }
        }
      }
    });
    Ok(())
  }

  fn batch(&self) -> Box<dyn Batch> {
    Box::new(BTreeBatch::default())
  }

  fn all(&self, _: &ReadOptions) -> Result<Box<dyn DbIter + '_>> {
    Ok(Box::new(BTreeIter::new(self.map.read().clone())))
  }

  fn close(self: Box<Self>) -> Result<()> {
    self.persist()
  }
}

#[derive(Debug, Clone)]
enum Op {
  Put(Box<[u8]>, Box<[u8]>),
  Delete(Box<[u8]>),
}

#[derive(Debug, Default)]
pub struct BTreeBatch {
  ops: Vec<Op>,
}

impl Batch for BTreeBatch {
  fn put(&mut self, key: &[u8], val: &[u8]) {
    self.ops.push(Op::Put(key.into(), val.into()));
  }

  fn delete(&mut self, key: &[u8]) {
    self.ops.push(Op::Delete(key.into()));
  }

  fn clear(&mut self) {
    self.ops.clear();
  }

  fn len(&self) -> usize {
    self.ops.len()
  }

  fn as_any_mut(&mut self) -> &mut dyn Any {
    self
  }
}
