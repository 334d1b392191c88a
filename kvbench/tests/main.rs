use std::collections::HashSet;

use aok::{OK, Void};
use kvbench::{
  Batched, BenchConf, DbWriter, Error, Fixture, MAX_REOPEN, Report, Runner, Singular, create_db,
  dir_size, read_keys, write_entries, write_partitioned,
};
use kvbench_data::{Entries, Key, KeyFmt, KeyGen, SeqKeys, ValueGen, key_index};
use kvbench_driver::{Batch, Db, DbIter, ReadOptions, Registry, WriteOptions};
use log::info;

#[static_init::constructor(0)]
extern "C" fn _log_init() {
  log_init::init();
}

fn conf() -> BenchConf {
  BenchConf::default().entries(200).max_concurrency(4).seed(7)
}

fn count(db: &dyn Db) -> kvbench::Result<usize> {
  let mut it = db.all(&ReadOptions::default())?;
  let mut n = 0;
  while it.next() {
    n += 1;
  }
  it.close()?;
  Ok(n)
}

// ============================================================================
// Writers / 写入器
// ============================================================================

#[test]
fn test_batched_flushes() -> Void {
  let reg = Registry::builtin();
  let (_dir, db) = create_db(&reg, &conf())?;
  let g = SeqKeys::hit(25);
  {
    let mut w = Batched::new(db.as_ref(), 10, WriteOptions::default());
    for i in 0..25 {
      w.put(&g.key(i), b"v")?;
      // Empty right after each flush / 每次刷出后立即为空
      if i == 9 || i == 19 {
        assert_eq!(w.pending(), 0, "i={i}");
        assert_eq!(w.flushes(), (i as u64 + 1) / 10);
      } else {
        assert_eq!(w.pending(), (i + 1) % 10, "i={i}");
      }
    }
    assert_eq!(w.flushes(), 2);
    assert_eq!(w.pending(), 5);
    w.done()?;
    assert_eq!(w.flushes(), 3);
    assert_eq!(w.pending(), 0);
    // Nothing buffered, nothing flushed / 无缓冲则不刷出
    w.done()?;
    assert_eq!(w.flushes(), 3);
  }
  assert_eq!(count(db.as_ref())?, 25);
  db.close()?;
  OK
}

#[test]
fn test_singular_writes_through() -> Void {
  let reg = Registry::builtin();
  let (_dir, db) = create_db(&reg, &conf())?;
  let key = KeyFmt::Hit.key(1);
  let mut w = Singular::new(db.as_ref(), WriteOptions::default());
  w.put(&key, b"one")?;
  assert_eq!(db.get(&key, &ReadOptions::default())?, b"one");
  w.delete(&key)?;
  let e = db.get(&key, &ReadOptions::default()).unwrap_err();
  assert!(db.is_not_found(&e));
  w.done()?;
  db.close()?;
  OK
}

mod writer_prop {
  use kvbench::{Batched, DbWriter, create_db};
  use kvbench_data::{KeyGen, SeqKeys};
  use kvbench_driver::{Registry, WriteOptions};
  use proptest::prelude::*;

  proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Flush count is `ceil(m / batch)` / 刷出次数为 `ceil(m / batch)`
    #[test]
    fn prop_flush_count(m in 0usize..300, batch in 2usize..64) {
      let reg = Registry::builtin();
      let (_dir, db) = create_db(&reg, &crate::conf()).unwrap();
      let g = SeqKeys::hit(m);
      let mut w = Batched::new(db.as_ref(), batch, WriteOptions::default());
      for i in 0..m {
        w.put(&g.key(i), b"x").unwrap();
      }
      w.done().unwrap();
      prop_assert_eq!(w.flushes(), m.div_ceil(batch) as u64);
      prop_assert_eq!(w.pending(), 0);
      drop(w);
      prop_assert_eq!(crate::count(db.as_ref()).unwrap(), m);
      db.close().unwrap();
    }
  }
}

// ============================================================================
// Fixtures and reads / 基准库与读取
// ============================================================================

/// 1000 sequential entries with 100 byte values
/// 1000 条顺序条目，value 为 100 字节
#[test]
fn test_sequential_fixture_lookup() -> Void {
  let reg = Registry::builtin();
  let (_dir, db) = create_db(&reg, &conf())?;
  let g = Entries::seq(1_000, ValueGen::new(3, 0.5, 100));
  write_entries(db.as_ref(), 1_000, 100, WriteOptions::default(), &g)?;

  let ropt = ReadOptions::default();
  let key = KeyFmt::Hit.key(500);
  assert_eq!(&key, b"0000000000000500+");
  let val = db.get(&key, &ropt)?;
  assert_eq!(val.len(), 100);
  assert_eq!(val, kvbench_data::EntryGen::value(&g, 500));

  let e = db.get(&KeyFmt::Missing.key(500), &ropt).unwrap_err();
  assert!(db.is_not_found(&e));

  read_keys(db.as_ref(), 1_000, &ropt, &SeqKeys::hit(1_000), false)?;
  let missing = SeqKeys::new(10, 0, KeyFmt::Missing);
  read_keys(db.as_ref(), 10, &ropt, &missing, true)?;
  match read_keys(db.as_ref(), 10, &ropt, &missing, false) {
    Err(Error::Get { key, source }) => {
      assert_eq!(key, "0000000000000000-");
      assert!(db.is_not_found(&source));
    }
    other => panic!("expected get error, got {other:?}"),
  }
  db.close()?;
  OK
}

#[test]
fn test_dir_size() -> Void {
  let tmp = tempfile::TempDir::new()?;
  assert_eq!(dir_size(&tmp.path().join("missing")), 0);
  let sub = tmp.path().join("a/b");
  std::fs::create_dir_all(&sub)?;
  std::fs::write(tmp.path().join("top"), [0u8; 10])?;
  std::fs::write(sub.join("deep"), [0u8; 32])?;
  assert_eq!(dir_size(tmp.path()), 42);
  OK
}

#[test]
fn test_fixture_reopen() -> Void {
  let reg = Registry::builtin();
  let mut rng = fastrand::Rng::with_seed(11);
  let fx = Fixture::create(&reg, &conf(), 300, &mut rng)?;
  assert_eq!(fx.entries(), 300);
  assert!(fx.disk_bytes() > 0);

  let db = fx.open()?;
  assert_eq!(count(db.as_ref())?, 300);
  for i in [0u64, 150, 299] {
    db.get(&KeyFmt::Hit.key(i), &ReadOptions::default())?;
  }
  db.close()?;

  let path = fx.path().to_path_buf();
  drop(fx);
  assert!(!path.exists());
  OK
}

// ============================================================================
// Concurrent writes / 并发写入
// ============================================================================

fn stored_indexes(db: &dyn Db) -> kvbench::Result<HashSet<u64>> {
  let mut it = db.all(&ReadOptions::default())?;
  let mut seen = HashSet::new();
  while it.next() {
    if let Some(i) = it.key().and_then(key_index) {
      seen.insert(i);
    }
  }
  it.close()?;
  Ok(seen)
}

/// Partitions of one permutation cover exactly `n` keys for any parallelism
/// 任意并行度下，同一排列的分区恰好覆盖 `n` 个 key
#[test]
fn test_partitioned_writes_exact() -> Void {
  let reg = Registry::builtin();
  for (n, p) in [(1_001usize, 4usize), (10, 3), (1, 8), (0, 2), (64, 64)] {
    let (_dir, db) = create_db(&reg, &conf())?;
    let g = Entries::full_rand(0, n, 5, ValueGen::new(5, 0.5, 32));
    write_partitioned(db.as_ref(), n, p, 16, WriteOptions::default(), &g)?;
    let seen = stored_indexes(db.as_ref())?;
    assert_eq!(seen.len(), n, "n={n} p={p}");
    assert!(seen.iter().all(|&i| (i as usize) < n), "n={n} p={p}");
    db.close()?;
  }
  OK
}

/// Handles every call concurrently, fails one chosen key
/// 支持并发调用，对指定 key 返回失败
struct FailOn {
  inner: Box<dyn Db>,
  key: Key,
}

impl Db for FailOn {
  fn get(&self, key: &[u8], opt: &ReadOptions) -> kvbench_driver::Result<Vec<u8>> {
    self.inner.get(key, opt)
  }

  fn put(&self, key: &[u8], val: &[u8], opt: &WriteOptions) -> kvbench_driver::Result<()> {
    if key == self.key {
      return Err(kvbench_driver::Error::Corrupt("injected".into()));
    }
    self.inner.put(key, val, opt)
  }

  fn delete(&self, key: &[u8], opt: &WriteOptions) -> kvbench_driver::Result<()> {
    self.inner.delete(key, opt)
  }

  fn write(&self, batch: &mut dyn Batch, opt: &WriteOptions) -> kvbench_driver::Result<()> {
    self.inner.write(batch, opt)
  }

  fn batch(&self) -> Box<dyn Batch> {
    self.inner.batch()
  }

  fn all(&self, opt: &ReadOptions) -> kvbench_driver::Result<Box<dyn DbIter + '_>> {
    self.inner.all(opt)
  }

  fn close(self: Box<Self>) -> kvbench_driver::Result<()> {
    self.inner.close()
  }
}

/// A failing worker fails the whole write after every worker is joined
/// 单个写入者失败时，等待全部写入者结束后整体失败
#[test]
fn test_partitioned_write_error() -> Void {
  let reg = Registry::builtin();
  let (_dir, inner) = create_db(&reg, &conf())?;
  let g = Entries::full_rand(0, 400, 9, ValueGen::new(9, 0.5, 16));
  let db = FailOn {
    inner,
    key: KeyFmt::Hit.key(123),
  };
  let r = write_partitioned(&db, 400, 4, 1, WriteOptions::default(), &g);
  match r {
    Err(Error::Driver(kvbench_driver::Error::Corrupt(msg))) => assert_eq!(msg, "injected"),
    other => panic!("expected injected error, got {other:?}"),
  }
  Box::new(db).close()?;
  OK
}

#[test]
fn test_write_random_counts() -> Void {
  let reg = Registry::builtin();
  let mut r = Runner::with_registry(conf().batch_count(10), &reg);
  let m = r.write_random(4, 1_001)?;
  assert_eq!(m.name, "write_random/parallelism-4");
  assert_eq!(m.ops_count, 1_001);
  assert!(m.disk_bytes > 0);
  for (p, n) in [(3, 10), (8, 1)] {
    assert_eq!(r.write_random(p, n)?.ops_count, n as u64);
  }
  OK
}

// ============================================================================
// Runner / 运行器
// ============================================================================

#[test]
fn test_parallelism_levels() -> Void {
  let levels: Vec<_> = conf().max_concurrency(5).parallelism().collect();
  assert_eq!(levels, [1, 2, 4]);
  let levels: Vec<_> = conf().max_concurrency(0).parallelism().collect();
  assert_eq!(levels, [1]);
  assert_eq!(BenchConf::default().parallelism().last(), Some(2048));
  OK
}

#[test]
fn test_template_entries() -> Void {
  let c = BenchConf::default().open_db_size(1_000).value_size(100);
  assert_eq!(c.template_entries(), 10);
  assert_eq!(c.entries(3).template_entries(), 3);
  OK
}

#[test]
fn test_unknown_driver_fails() -> Void {
  let reg = Registry::builtin();
  let mut r = Runner::with_registry(conf().driver("nope"), &reg);
  assert!(matches!(
    r.write_sequential(10),
    Err(Error::Driver(kvbench_driver::Error::NoDriver(_)))
  ));
  OK
}

#[test]
fn test_run_all() -> Void {
  let reg = Registry::builtin();
  let mut r = Runner::with_registry(conf().batch_count(8), &reg);
  assert_eq!(r.seed(), 7);
  let report = r.run_all(300)?;
  for m in &report.results {
    info!("{m}");
  }

  let names: Vec<_> = report.results.iter().map(|m| m.name.as_str()).collect();
  assert_eq!(
    names,
    [
      "open",
      "seek_random",
      "read_hot",
      "read_random",
      "read_random_missing",
      "read_sequential",
      "read_reverse",
      "iterate_sequential",
      "iterate_reverse",
      "write_sequential",
      "write_random/parallelism-1",
      "write_random/parallelism-2",
      "write_random/parallelism-4",
      "delete_random",
      "delete_sequential",
    ]
  );
  assert!(report.results.iter().all(|m| m.ops_count == 300));
  assert_eq!(report.seed, 7);

  let json = report.to_json()?;
  let back: Report = sonic_rs::from_str(&json)?;
  assert_eq!(back.driver, report.driver);
  assert_eq!(back.results.len(), report.results.len());
  assert_eq!(back.results[0].name, "open");
  OK
}

/// Reopens are capped, other phases run the full count
/// 重新打开次数有上限，其余阶段执行完整次数
#[test]
fn test_run_all_caps_reopen() -> Void {
  let reg = Registry::builtin();
  let n = MAX_REOPEN + 1;
  let mut r = Runner::with_registry(conf().entries(50).max_concurrency(1), &reg);
  let report = r.run_all(n)?;
  assert_eq!(report.results[0].name, "open");
  assert_eq!(report.results[0].ops_count, MAX_REOPEN as u64);
  assert!(report.results[1..].iter().all(|m| m.ops_count == n as u64));
  OK
}

#[test]
fn test_iterate_wraps() -> Void {
  let reg = Registry::builtin();
  let mut r = Runner::with_registry(conf().entries(10), &reg);
  // More steps than entries / 步数多于条目数
  let m = r.iterate_reverse(35)?;
  assert_eq!(m.ops_count, 35);
  let m = r.iterate_sequential(35)?;
  assert_eq!(m.ops_count, 35);
  OK
}
