// Mutation writers: one by one or batched
// 变更写入器：逐条或批量

use kvbench_data::{EntryGen, KeyGen};
use kvbench_driver::{Batch, Db, WriteOptions};

use crate::Result;

/// Apply mutations to a database / 向数据库应用变更
pub trait DbWriter {
  fn put(&mut self, key: &[u8], val: &[u8]) -> Result<()>;

  fn delete(&mut self, key: &[u8]) -> Result<()>;

  /// Flush whatever is still buffered / 刷出仍在缓冲的变更
  fn done(&mut self) -> Result<()>;
}

/// One synchronous mutation per call / 每次调用一次同步变更
pub struct Singular<'a> {
  db: &'a dyn Db,
  opt: WriteOptions,
}

impl<'a> Singular<'a> {
  pub fn new(db: &'a dyn Db, opt: WriteOptions) -> Self {
    Self { db, opt }
  }
}

impl DbWriter for Singular<'_> {
  #[inline]
  fn put(&mut self, key: &[u8], val: &[u8]) -> Result<()> {
    Ok(self.db.put(key, val, &self.opt)?)
  }

  #[inline]
  fn delete(&mut self, key: &[u8]) -> Result<()> {
    Ok(self.db.delete(key, &self.opt)?)
  }

  #[inline]
  fn done(&mut self) -> Result<()> {
    Ok(())
  }
}

/// Buffer mutations, flush atomically every `max` of them
/// 缓冲变更，每 `max` 条原子刷出一次
pub struct Batched<'a> {
  db: &'a dyn Db,
  batch: Box<dyn Batch>,
  opt: WriteOptions,
  max: usize,
  count: usize,
  flushes: u64,
}

impl<'a> Batched<'a> {
  pub fn new(db: &'a dyn Db, max: usize, opt: WriteOptions) -> Self {
    Self {
      db,
      batch: db.batch(),
      opt,
      max: max.max(1),
      count: 0,
      flushes: 0,
    }
  }

  /// Successful flushes so far / 已成功刷出的次数
  pub fn flushes(&self) -> u64 {
    self.flushes
  }

  /// Buffered mutations / 缓冲中的变更数
  pub fn pending(&self) -> usize {
    self.batch.len()
  }

  /// The batch is cleared even when the write fails
  /// 即使写入失败也会清空批次
  fn check(&mut self, max: usize) -> Result<()> {
    if self.count < max {
      return Ok(());
    }
    let r = self.db.write(self.batch.as_mut(), &self.opt);
    self.count = 0;
    self.batch.clear();
    r?;
    self.flushes += 1;
    Ok(())
  }
}

impl DbWriter for Batched<'_> {
  #[inline]
  fn put(&mut self, key: &[u8], val: &[u8]) -> Result<()> {
    self.batch.put(key, val);
    self.count += 1;
    self.check(self.max)
  }

  #[inline]
  fn delete(&mut self, key: &[u8]) -> Result<()> {
    self.batch.delete(key);
    self.count += 1;
    self.check(self.max)
  }

  #[inline]
  fn done(&mut self) -> Result<()> {
    self.check(1)
  }
}

/// Writer picked by batch size / 按批次大小选择的写入器
pub enum Writer<'a> {
  Singular(Singular<'a>),
  Batched(Batched<'a>),
}

/// `batch <= 1` writes one by one, otherwise batches of `batch`
/// `batch <= 1` 逐条写入，否则按 `batch` 分批
pub fn writer(db: &dyn Db, batch: usize, opt: WriteOptions) -> Writer<'_> {
  if batch <= 1 {
    Writer::Singular(Singular::new(db, opt))
  } else {
    Writer::Batched(Batched::new(db, batch, opt))
  }
}

impl Writer<'_> {
  pub fn flushes(&self) -> u64 {
    match self {
      Self::Singular(_) => 0,
      Self::Batched(w) => w.flushes(),
    }
  }
}

impl DbWriter for Writer<'_> {
  #[inline]
  fn put(&mut self, key: &[u8], val: &[u8]) -> Result<()> {
    match self {
      Self::Singular(w) => w.put(key, val),
      Self::Batched(w) => w.put(key, val),
    }
  }

  #[inline]
  fn delete(&mut self, key: &[u8]) -> Result<()> {
    match self {
      Self::Singular(w) => w.delete(key),
      Self::Batched(w) => w.delete(key),
    }
  }

  #[inline]
  fn done(&mut self) -> Result<()> {
    match self {
      Self::Singular(w) => w.done(),
      Self::Batched(w) => w.done(),
    }
  }
}

/// Write entries `[0, n)` of `g` / 写入 `g` 的 `[0, n)` 条目
pub fn write_entries<G: EntryGen + ?Sized>(
  db: &dyn Db,
  n: usize,
  batch: usize,
  opt: WriteOptions,
  g: &G,
) -> Result<()> {
  let mut w = writer(db, batch, opt);
  for i in 0..n {
    w.put(&g.key(i), g.value(i))?;
  }
  w.done()
}

/// Delete keys `[0, n)` of `g` / 删除 `g` 的 `[0, n)` 个 key
pub fn delete_keys<G: KeyGen + ?Sized>(
  db: &dyn Db,
  n: usize,
  batch: usize,
  opt: WriteOptions,
  g: &G,
) -> Result<()> {
  let mut w = writer(db, batch, opt);
  for i in 0..n {
    w.delete(&g.key(i))?;
  }
  w.done()
}
