// Benchmark metrics types
// 基准测试指标类型

use std::{fmt, time::Duration};

use humansize::{BINARY, format_size};
use serde::{Deserialize, Serialize};

/// Benchmark metrics for a single phase
/// 单个阶段的基准测试指标
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BenchMetrics {
  /// Phase name / 阶段名称
  pub name: String,
  /// Total operations count / 总操作数
  pub ops_count: u64,
  /// Total duration in nanoseconds / 总耗时（纳秒）
  pub duration_ns: u64,
  /// Throughput (ops/sec) / 吞吐量
  pub throughput: f64,
  /// Disk usage after the phase / 阶段结束后的磁盘使用量
  pub disk_bytes: u64,
}

impl BenchMetrics {
  /// Create new metrics from raw data
  /// 从原始数据创建指标
  pub fn new(name: impl Into<String>, ops_count: u64, duration: Duration) -> Self {
    let duration_ns = duration.as_nanos() as u64;
    let throughput = if duration_ns > 0 {
      ops_count as f64 / duration.as_secs_f64()
    } else {
      0.0
    };

    Self {
      name: name.into(),
      ops_count,
      duration_ns,
      throughput,
      disk_bytes: 0,
    }
  }

  pub fn disk(mut self, bytes: u64) -> Self {
    self.disk_bytes = bytes;
    self
  }

  /// Get duration as Duration type
  /// 获取 Duration 类型的耗时
  pub fn duration(&self) -> Duration {
    Duration::from_nanos(self.duration_ns)
  }

  /// Mean time per operation in nanoseconds / 每次操作平均耗时（纳秒）
  pub fn ns_per_op(&self) -> f64 {
    if self.ops_count == 0 {
      0.0
    } else {
      self.duration_ns as f64 / self.ops_count as f64
    }
  }
}

impl fmt::Display for BenchMetrics {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "{:<32} {:>10} ops {:>12.2?} {:>12.0} ops/s {:>10.1} ns/op",
      self.name,
      self.ops_count,
      self.duration(),
      self.throughput,
      self.ns_per_op()
    )?;
    if self.disk_bytes > 0 {
      write!(f, " disk {}", format_size(self.disk_bytes, BINARY))?;
    }
    Ok(())
  }
}

/// All phases of one run / 一次运行的全部阶段
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Report {
  pub driver: String,
  pub seed: u64,
  pub value_size: usize,
  pub batch_count: usize,
  pub results: Vec<BenchMetrics>,
}

impl Report {
  pub fn to_json(&self) -> crate::Result<String> {
    Ok(sonic_rs::to_string_pretty(self)?)
  }
}
