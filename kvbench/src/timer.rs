// Phase timer with an explicit reset point
// 带显式重置点的阶段计时器

use std::time::{Duration, Instant};

use crate::BenchMetrics;

/// Times one benchmark phase of `n` operations
/// 为 `n` 次操作的基准阶段计时
///
/// Call [`Bencher::reset`] once setup is done and [`Bencher::stop`] before
/// teardown, so neither is measured.
/// 准备完成后调用 [`Bencher::reset`]，清理前调用 [`Bencher::stop`]，二者均不计时。
#[derive(Debug)]
pub struct Bencher {
  name: String,
  n: usize,
  start: Instant,
}

impl Bencher {
  pub fn new(name: impl Into<String>, n: usize) -> Self {
    Self {
      name: name.into(),
      n,
      start: Instant::now(),
    }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  /// Operations in this phase / 本阶段操作数
  pub fn n(&self) -> usize {
    self.n
  }

  /// Restart the clock / 重新开始计时
  pub fn reset(&mut self) {
    self.start = Instant::now();
  }

  pub fn elapsed(&self) -> Duration {
    self.start.elapsed()
  }

  pub fn stop(self) -> BenchMetrics {
    let elapsed = self.start.elapsed();
    BenchMetrics::new(self.name, self.n as u64, elapsed)
  }
}
