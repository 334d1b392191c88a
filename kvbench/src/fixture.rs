// Pre-populated databases for read / delete / iterate benchmarks
// 用于读、删除、迭代基准测试的预填充数据库

use std::{fs, path::Path, time::Instant};

use kvbench_data::{Entries, ValueGen};
use kvbench_driver::{Db, Options, Registry};
use log::debug;
use tempfile::TempDir;

use crate::{BenchConf, Result, write_entries};

/// Batch size used to fill fixtures / 填充基准库的批次大小
pub const FIXTURE_BATCH: usize = 1000;

const TMP_PREFIX: &str = "kvbench-";

/// Bytes of regular files under `path`, 0 if it is missing
/// `path` 下普通文件的总字节数，不存在时为 0
pub fn dir_size(path: &Path) -> u64 {
  let mut total = 0;
  let mut stack = vec![path.to_path_buf()];
  while let Some(dir) = stack.pop() {
    let Ok(entries) = fs::read_dir(&dir) else {
      continue;
    };
    for entry in entries.flatten() {
      match entry.metadata() {
        Ok(m) if m.is_dir() => stack.push(entry.path()),
        Ok(m) => total += m.len(),
        Err(_) => {}
      }
    }
  }
  total
}

/// Create an empty database in a fresh temp dir
/// 在新的临时目录中创建空数据库
///
/// The directory is removed when the returned `TempDir` drops.
/// 返回的 `TempDir` 释放时删除目录。
pub fn create_db(registry: &Registry, conf: &BenchConf) -> Result<(TempDir, Box<dyn Db>)> {
  let dir = tempfile::Builder::new().prefix(TMP_PREFIX).tempdir()?;
  let db = registry.open(&conf.driver, dir.path(), &conf.create_options())?;
  Ok((dir, db))
}

/// Closed database holding `entries` full-random entries
/// 已关闭的数据库，包含 `entries` 条全随机条目
pub struct Fixture<'r> {
  dir: TempDir,
  registry: &'r Registry,
  driver: String,
  opts: Options,
  entries: usize,
}

impl<'r> Fixture<'r> {
  pub fn create(
    registry: &'r Registry,
    conf: &BenchConf,
    n: usize,
    rng: &mut fastrand::Rng,
  ) -> Result<Self> {
    let start = Instant::now();
    let (dir, db) = create_db(registry, conf)?;
    let values = ValueGen::new(rng.u64(..), conf.compression_ratio, conf.value_size);
    let g = Entries::full_rand(0, n, rng.u64(..), values);
    let wrote = write_entries(db.as_ref(), n, FIXTURE_BATCH, conf.write_options(), &g);
    // Close before reporting a write error / 先关闭再返回写入错误
    let closed = db.close();
    wrote?;
    closed?;
    debug!(
      "fixture {} entries={n} in {:.2?} at {}",
      conf.driver,
      start.elapsed(),
      dir.path().display()
    );
    Ok(Self {
      dir,
      registry,
      driver: conf.driver.clone(),
      opts: conf.open_options(),
      entries: n,
    })
  }

  /// Reopen for reading / 重新打开以读取
  pub fn open(&self) -> Result<Box<dyn Db>> {
    Ok(self.registry.open(&self.driver, self.dir.path(), &self.opts)?)
  }

  pub fn path(&self) -> &Path {
    self.dir.path()
  }

  pub fn entries(&self) -> usize {
    self.entries
  }

  pub fn disk_bytes(&self) -> u64 {
    dir_size(self.dir.path())
  }
}
