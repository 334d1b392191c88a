// Benchmark configuration
// 基准测试配置

use kvbench_driver::{Compression, Options, ReadOptions, WriteOptions, btree};
use serde::{Deserialize, Serialize};

/// Benchmark configuration / 基准测试配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchConf {
  /// Registered engine name / 已注册的引擎名称
  pub driver: String,
  /// Template fixture size in bytes / 模板基准库大小（字节）
  pub open_db_size: usize,
  /// Template fixture entry count, overrides `open_db_size`
  /// 模板基准库条目数，优先于 `open_db_size`
  pub entries: Option<usize>,
  /// Value size in bytes / value 大小（字节）
  pub value_size: usize,
  /// Mutations per batch for writes and deletes, <= 1 writes one by one
  /// 写入与删除的批次大小，<= 1 表示逐条写入
  pub batch_count: usize,
  /// Random fraction of generated values / 生成 value 的随机比例
  pub compression_ratio: f64,
  /// Upper bound of the concurrent write sweep / 并发写入扫描上限
  pub max_concurrency: usize,
  pub write_sync: bool,
  pub cache_size: usize,
  pub write_buffer_size: usize,
  pub bloom_bits: usize,
  pub open_files: usize,
  pub compression: Compression,
  /// None draws a random seed / None 时随机生成种子
  pub seed: Option<u64>,
}

impl Default for BenchConf {
  fn default() -> Self {
    Self {
      driver: btree::NAME.to_owned(),
      open_db_size: 128 * 1024 * 1024,
      entries: None,
      value_size: 100,
      batch_count: 1,
      compression_ratio: 0.5,
      max_concurrency: 2048,
      write_sync: false,
      cache_size: 0,
      write_buffer_size: 0,
      bloom_bits: 0,
      open_files: 0,
      compression: Compression::Default,
      seed: None,
    }
  }
}

impl BenchConf {
  /// Set engine / 设置引擎
  pub fn driver(mut self, name: impl Into<String>) -> Self {
    self.driver = name.into();
    self
  }

  /// Set template size in entries / 以条目数设置模板大小
  pub fn entries(mut self, n: usize) -> Self {
    self.entries = Some(n);
    self
  }

  /// Set template size in bytes / 以字节数设置模板大小
  pub fn open_db_size(mut self, bytes: usize) -> Self {
    self.open_db_size = bytes;
    self.entries = None;
    self
  }

  pub fn value_size(mut self, n: usize) -> Self {
    self.value_size = n;
    self
  }

  pub fn batch_count(mut self, n: usize) -> Self {
    self.batch_count = n;
    self
  }

  pub fn compression_ratio(mut self, ratio: f64) -> Self {
    self.compression_ratio = ratio;
    self
  }

  pub fn max_concurrency(mut self, n: usize) -> Self {
    self.max_concurrency = n;
    self
  }

  pub fn seed(mut self, seed: u64) -> Self {
    self.seed = Some(seed);
    self
  }

  /// Entries in the template fixture / 模板基准库的条目数
  pub fn template_entries(&self) -> usize {
    self
      .entries
      .unwrap_or(self.open_db_size / self.value_size.max(1))
  }

  /// Options for reopening an existing fixture / 重新打开已有基准库的选项
  pub fn open_options(&self) -> Options {
    Options {
      compression: self.compression,
      max_open_files: self.open_files,
      bloom_bits_per_key: self.bloom_bits,
      write_buffer_size: self.write_buffer_size,
      block_cache_capacity: self.cache_size,
      create_if_missing: false,
      error_if_exists: false,
    }
  }

  /// Options for creating a fresh database / 创建新库的选项
  pub fn create_options(&self) -> Options {
    self.open_options().create()
  }

  pub fn read_options(&self) -> ReadOptions {
    ReadOptions::default()
  }

  pub fn write_options(&self) -> WriteOptions {
    WriteOptions {
      sync: self.write_sync,
    }
  }

  /// Parallelism levels for the concurrent write sweep: 1, 2, 4 ...
  /// 并发写入扫描的并行度：1, 2, 4 ...
  pub fn parallelism(&self) -> impl Iterator<Item = usize> {
    let max = self.max_concurrency.max(1);
    std::iter::successors(Some(1usize), |&p| p.checked_mul(2)).take_while(move |&p| p <= max)
  }
}
