use std::path::PathBuf;

use thiserror::Error;

/// Native engine error / 引擎原生错误
pub type BoxErr = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum Error {
  #[error("key not found / 键不存在")]
  NotFound,

  #[error("corruption: {0}")]
  Corrupt(String),

  #[error("no driver for: {0}")]
  NoDriver(String),

  #[error("driver registered after the registry was built: {0}")]
  Sealed(String),

  #[error("database already exists: {0}")]
  Exists(PathBuf),

  #[error("database does not exist: {0}")]
  Missing(PathBuf),

  #[error("batch created by another backend / 批次来自其他后端")]
  ForeignBatch,

  #[error("IO error: {0}")]
  Io(#[from] std::io::Error),

  #[error("backend error: {0}")]
  Backend(#[source] BoxErr),
}

impl Error {
  /// Wrap a native engine error / 包装引擎原生错误
  pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Backend(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
