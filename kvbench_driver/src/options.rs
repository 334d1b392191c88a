// Engine-agnostic open / read / write options
// 与引擎无关的打开、读、写选项

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Block compression / 块压缩
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
  /// Whatever the engine defaults to / 引擎默认值
  #[default]
  Default,
  None,
  Snappy,
}

impl FromStr for Compression {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "default" => Ok(Self::Default),
      "none" => Ok(Self::None),
      "snappy" => Ok(Self::Snappy),
      _ => Err(format!("unknown compression: {s}")),
    }
  }
}

impl fmt::Display for Compression {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::Default => "default",
      Self::None => "none",
      Self::Snappy => "snappy",
    })
  }
}

/// Open options, zero means engine default
/// 打开选项，0 表示使用引擎默认值
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Options {
  pub compression: Compression,
  pub max_open_files: usize,
  /// 0 disables the bloom filter / 0 表示关闭布隆过滤器
  pub bloom_bits_per_key: usize,
  pub write_buffer_size: usize,
  /// 0 disables the block cache / 0 表示关闭块缓存
  pub block_cache_capacity: usize,
  pub create_if_missing: bool,
  pub error_if_exists: bool,
}

impl Options {
  /// Same tuning, but creates a fresh database and refuses an existing one
  /// 相同调优参数，但创建新库并拒绝已存在的库
  pub fn create(&self) -> Self {
    Self {
      create_if_missing: true,
      error_if_exists: true,
      ..self.clone()
    }
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadOptions {
  pub dont_fill_cache: bool,
  pub verify_checksums: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteOptions {
  pub sync: bool,
}
