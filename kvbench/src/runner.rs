// Benchmark runner: timed phases over one engine
// 基准测试运行器：针对单个引擎的计时阶段

use std::{
  sync::atomic::{AtomicBool, Ordering},
  thread,
};

use kvbench_data::{
  Entries, EntryGen, KeyFmt, KeyGen, PredefKeys, RandKeys, Reversed, Round, SeqKeys, StartAt,
  ValueGen,
};
use kvbench_driver::{Db, DbIter, ReadOptions, Registry, WriteOptions, registry};
use log::{debug, info};
use tempfile::TempDir;

use crate::{
  BenchConf, BenchMetrics, Bencher, DbWriter, Error, Fixture, Report, Result, create_db,
  delete_keys, dir_size, write_entries, writer,
};

/// Upper bound of reopens in [`Runner::run_all`] / [`Runner::run_all`] 中重新打开次数上限
pub const MAX_REOPEN: usize = 1000;

/// Worker `w` of `p` owns `[w * n / p, (w + 1) * n / p)`
/// `p` 个写入者中第 `w` 个负责 `[w * n / p, (w + 1) * n / p)`
#[inline]
fn partition(n: usize, p: usize, w: usize) -> (usize, usize) {
  (w * n / p, (w + 1) * n / p)
}

/// Write entries `[0, n)` of `g` from `parallelism` scoped threads
/// 由 `parallelism` 个作用域线程写入 `g` 的 `[0, n)` 条目
///
/// Every index is written exactly once. All workers are joined before the
/// first error (or panic, as [`Error::Worker`]) is returned.
/// 每个索引恰好写入一次。先等待全部写入者结束，再返回首个错误（崩溃为 [`Error::Worker`]）。
pub fn write_partitioned<G: EntryGen + Sync + ?Sized>(
  db: &dyn Db,
  n: usize,
  parallelism: usize,
  batch: usize,
  opt: WriteOptions,
  g: &G,
) -> Result<()> {
  let p = parallelism.max(1);
  let failed = AtomicBool::new(false);
  let failed = &failed;

  let results: Vec<Result<()>> = thread::scope(|s| {
    let workers: Vec<_> = (0..p)
      .map(|w| {
        let (lo, hi) = partition(n, p, w);
        s.spawn(move || {
          let part = StartAt::new(lo, g);
          write_part(db, hi - lo, batch, opt, &part, failed)
        })
      })
      .collect();
    workers
      .into_iter()
      .enumerate()
      .map(|(w, h)| h.join().unwrap_or(Err(Error::Worker(w))))
      .collect()
  });
  results.into_iter().collect()
}

/// Read keys `[0, n)` of `g`; not-found is fatal unless `allow_not_found`
/// 读取 `g` 的 `[0, n)` 个 key；除非 `allow_not_found`，未找到即失败
pub fn read_keys<G: KeyGen + ?Sized>(
  db: &dyn Db,
  n: usize,
  opt: &ReadOptions,
  g: &G,
  allow_not_found: bool,
) -> Result<()> {
  for i in 0..n {
    let key = g.key(i);
    match db.get(&key, opt) {
      Ok(_) => {}
      Err(e) if allow_not_found && db.is_not_found(&e) => {}
      Err(source) => {
        return Err(Error::Get {
          key: String::from_utf8_lossy(&key).into_owned(),
          source,
        });
      }
    }
  }
  Ok(())
}

/// Consume the iterator so its database can be closed next
/// 消耗迭代器，之后才能关闭其数据库
fn close_iter(mut it: Box<dyn DbIter + '_>) -> Result<()> {
  it.close()?;
  Ok(())
}

fn rewind(it: &mut dyn DbIter, forward: bool) -> bool {
  if forward { it.first() } else { it.last() }
}

/// Benchmark runner / 基准测试运行器
pub struct Runner<'r> {
  conf: BenchConf,
  registry: &'r Registry,
  seed: u64,
  rng: fastrand::Rng,
  /// Shared by open and iterate phases, built on first use
  /// 供打开与迭代阶段共享，首次使用时构建
  template: Option<Fixture<'r>>,
}

impl Runner<'static> {
  /// Runner over the process-wide registry / 使用进程级注册表的运行器
  pub fn new(conf: BenchConf) -> Self {
    Self::with_registry(conf, registry())
  }
}

impl<'r> Runner<'r> {
  pub fn with_registry(conf: BenchConf, registry: &'r Registry) -> Self {
    let seed = conf.seed.unwrap_or_else(|| fastrand::u64(..));
    info!("{} seed={seed}", conf.driver);
    Self {
      conf,
      registry,
      seed,
      rng: fastrand::Rng::with_seed(seed),
      template: None,
    }
  }

  pub fn conf(&self) -> &BenchConf {
    &self.conf
  }

  /// Seed that reproduces this run / 可复现本次运行的种子
  pub fn seed(&self) -> u64 {
    self.seed
  }

  fn values(&mut self) -> ValueGen {
    ValueGen::new(
      self.rng.u64(..),
      self.conf.compression_ratio,
      self.conf.value_size,
    )
  }

  /// Build the template fixture now instead of on first use
  /// 立即构建模板基准库，而非首次使用时
  pub fn template(&mut self) -> Result<&Fixture<'r>> {
    match &mut self.template {
      Some(fx) => Ok(&*fx),
      slot @ None => {
        let n = self.conf.template_entries();
        info!("build template {} entries={n}", self.conf.driver);
        let fx = Fixture::create(self.registry, &self.conf, n, &mut self.rng)?;
        Ok(&*slot.insert(fx))
      }
    }
  }

  /// Private fixture with `n` entries / 含 `n` 条目的私有基准库
  fn full_db(&mut self, n: usize) -> Result<Fixture<'r>> {
    Fixture::create(self.registry, &self.conf, n, &mut self.rng)
  }

  fn empty_db(&self) -> Result<(TempDir, Box<dyn Db>)> {
    create_db(self.registry, &self.conf)
  }

  /// Time `f` over a private fixture of `n` entries
  /// 在 `n` 条目的私有基准库上为 `f` 计时
  fn on_full_db(
    &mut self,
    name: &str,
    n: usize,
    f: impl FnOnce(&dyn Db, &ReadOptions) -> Result<()>,
  ) -> Result<BenchMetrics> {
    let fx = self.full_db(n)?;
    let db = fx.open()?;
    let ropt = self.conf.read_options();
    let mut b = Bencher::new(name, n);
    b.reset();
    f(db.as_ref(), &ropt)?;
    let m = b.stop();
    db.close()?;
    Ok(m.disk(fx.disk_bytes()))
  }

  // ==========================================================================
  // Open / 打开
  // ==========================================================================

  /// Reopen the template fixture `n` times / 重复打开模板基准库 `n` 次
  pub fn open(&mut self, n: usize) -> Result<BenchMetrics> {
    let fx = self.template()?;
    let mut b = Bencher::new("open", n);
    b.reset();
    for _ in 0..n {
      fx.open()?.close()?;
    }
    Ok(b.stop().disk(fx.disk_bytes()))
  }

  // ==========================================================================
  // Reads / 读取
  // ==========================================================================

  /// Seek an iterator to random hit keys / 将迭代器定位到随机命中 key
  pub fn seek_random(&mut self, n: usize) -> Result<BenchMetrics> {
    let fx = self.full_db(n)?;
    let db = fx.open()?;
    let g = RandKeys::hit(n.max(1), self.rng.u64(..));
    let ropt = self.conf.read_options();
    let mut it = db.all(&ropt)?;
    let mut b = Bencher::new("seek_random", n);
    b.reset();
    for i in 0..n {
      let key = g.key(i);
      if !it.seek(&key) || it.key() != Some(&key[..]) {
        let got = match (it.key(), it.err()) {
          (_, Some(e)) => format!("error {e}"),
          (Some(k), None) => String::from_utf8_lossy(k).into_owned(),
          (None, None) => "end".to_owned(),
        };
        return Err(Error::Seek {
          key: String::from_utf8_lossy(&key).into_owned(),
          got,
        });
      }
      let _ = it.value();
    }
    let m = b.stop();
    close_iter(it)?;
    db.close()?;
    Ok(m.disk(fx.disk_bytes()))
  }

  /// Random reads cycling over a hot 1% of the keys
  /// 在 1% 的热点 key 上循环随机读取
  pub fn read_hot(&mut self, n: usize) -> Result<BenchMetrics> {
    let k = n.div_ceil(100).max(1);
    let g = Round(PredefKeys::rand(k, KeyFmt::Hit, self.rng.u64(..)));
    self.on_full_db("read_hot", n, |db, ropt| read_keys(db, n, ropt, &g, false))
  }

  pub fn read_random(&mut self, n: usize) -> Result<BenchMetrics> {
    let g = RandKeys::hit(n.max(1), self.rng.u64(..));
    self.on_full_db("read_random", n, |db, ropt| {
      read_keys(db, n, ropt, &g, false)
    })
  }

  /// Lookups that always miss / 必然未命中的查询
  pub fn read_random_missing(&mut self, n: usize) -> Result<BenchMetrics> {
    let g = RandKeys::missing(n.max(1), self.rng.u64(..));
    self.on_full_db("read_random_missing", n, |db, ropt| {
      read_keys(db, n, ropt, &g, true)
    })
  }

  pub fn read_sequential(&mut self, n: usize) -> Result<BenchMetrics> {
    let g = SeqKeys::hit(n);
    self.on_full_db("read_sequential", n, |db, ropt| {
      read_keys(db, n, ropt, &g, false)
    })
  }

  pub fn read_reverse(&mut self, n: usize) -> Result<BenchMetrics> {
    let g = Reversed(SeqKeys::hit(n));
    self.on_full_db("read_reverse", n, |db, ropt| {
      read_keys(db, n, ropt, &g, false)
    })
  }

  // ==========================================================================
  // Iteration / 迭代
  // ==========================================================================

  /// `n` steps over the template, wrapping around at the end
  /// 在模板上走 `n` 步，到尾部后回绕
  fn iterate(&mut self, name: &str, n: usize, forward: bool) -> Result<BenchMetrics> {
    let ropt = self.conf.read_options();
    let fx = self.template()?;
    let db = fx.open()?;
    let mut it = db.all(&ropt)?;
    let mut b = Bencher::new(name, n);
    b.reset();
    rewind(it.as_mut(), forward);
    for _ in 0..n {
      if !it.valid() {
        rewind(it.as_mut(), forward);
        continue;
      }
      let _ = it.key();
      let _ = it.value();
      if forward {
        it.next();
      } else {
        it.prev();
      }
    }
    let m = b.stop();
    close_iter(it)?;
    db.close()?;
    Ok(m.disk(fx.disk_bytes()))
  }

  pub fn iterate_sequential(&mut self, n: usize) -> Result<BenchMetrics> {
    self.iterate("iterate_sequential", n, true)
  }

  pub fn iterate_reverse(&mut self, n: usize) -> Result<BenchMetrics> {
    self.iterate("iterate_reverse", n, false)
  }

  // ==========================================================================
  // Writes / 写入
  // ==========================================================================

  pub fn write_sequential(&mut self, n: usize) -> Result<BenchMetrics> {
    let g = Entries::seq(n, self.values());
    let (dir, db) = self.empty_db()?;
    let mut b = Bencher::new("write_sequential", n);
    b.reset();
    write_entries(
      db.as_ref(),
      n,
      self.conf.batch_count,
      self.conf.write_options(),
      &g,
    )?;
    let m = b.stop();
    db.close()?;
    Ok(m.disk(dir_size(dir.path())))
  }

  /// `parallelism` writers, each over a disjoint slice of one permutation
  /// `parallelism` 个写入者，各自写同一排列中互不相交的片段
  ///
  /// Writes exactly `n` distinct keys whatever the parallelism.
  /// 无论并行度多少，恰好写入 `n` 个不同 key。
  pub fn write_random(&mut self, parallelism: usize, n: usize) -> Result<BenchMetrics> {
    let p = parallelism.max(1);
    let g = Entries::full_rand(0, n, self.rng.u64(..), self.values());
    let (dir, db) = self.empty_db()?;
    let batch = self.conf.batch_count;
    let wopt = self.conf.write_options();

    let mut b = Bencher::new(format!("write_random/parallelism-{p}"), n);
    b.reset();
    write_partitioned(db.as_ref(), n, p, batch, wopt, &g)?;
    let m = b.stop();
    db.close()?;
    Ok(m.disk(dir_size(dir.path())))
  }

  // ==========================================================================
  // Deletes / 删除
  // ==========================================================================

  pub fn delete_random(&mut self, n: usize) -> Result<BenchMetrics> {
    let g = RandKeys::hit(n.max(1), self.rng.u64(..));
    let batch = self.conf.batch_count.max(1);
    let wopt = self.conf.write_options();
    self.on_full_db("delete_random", n, |db, _| {
      delete_keys(db, n, batch, wopt, &g)
    })
  }

  /// Deletes in key order / 按 key 顺序删除
  pub fn delete_sequential(&mut self, n: usize) -> Result<BenchMetrics> {
    let g = PredefKeys::sorted_random(n, self.rng.u64(..));
    let batch = self.conf.batch_count.max(1);
    let wopt = self.conf.write_options();
    self.on_full_db("delete_sequential", n, |db, _| {
      delete_keys(db, n, batch, wopt, &g)
    })
  }

  // ==========================================================================
  // All / 全部
  // ==========================================================================

  /// Every phase with `n` operations each / 每个阶段各执行 `n` 次操作
  pub fn run_all(&mut self, n: usize) -> Result<Report> {
    let mut results = Vec::new();
    let mut record = |m: BenchMetrics| {
      info!("{m}");
      results.push(m);
    };

    record(self.open(n.min(MAX_REOPEN))?);
    record(self.seek_random(n)?);
    record(self.read_hot(n)?);
    record(self.read_random(n)?);
    record(self.read_random_missing(n)?);
    record(self.read_sequential(n)?);
    record(self.read_reverse(n)?);
    record(self.iterate_sequential(n)?);
    record(self.iterate_reverse(n)?);
    record(self.write_sequential(n)?);
    for p in self.conf.parallelism().collect::<Vec<_>>() {
      record(self.write_random(p, n)?);
    }
    record(self.delete_random(n)?);
    record(self.delete_sequential(n)?);

    Ok(Report {
      driver: self.conf.driver.clone(),
      seed: self.seed,
      value_size: self.conf.value_size,
      batch_count: self.conf.batch_count,
      results,
    })
  }
}

/// One concurrent partition; stops early once another worker failed
/// 单个并发分区；其他写入者失败后提前停止
fn write_part<G: EntryGen + ?Sized>(
  db: &dyn Db,
  n: usize,
  batch: usize,
  wopt: WriteOptions,
  g: &G,
  failed: &AtomicBool,
) -> Result<()> {
  let mut w = writer(db, batch, wopt);
  let r = (|| {
    for i in 0..n {
      if failed.load(Ordering::Relaxed) {
        return Ok(());
      }
      w.put(&g.key(i), g.value(i))?;
    }
    w.done()
  })();
  if r.is_err() {
    failed.store(true, Ordering::Relaxed);
    debug!("write worker failed, aborting siblings");
  }
  r
}
