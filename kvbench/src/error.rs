use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
  #[error("driver error: {0}")]
  Driver(#[from] kvbench_driver::Error),

  #[error("db get key [{key}] error: {source}")]
  Get {
    key: String,
    #[source]
    source: kvbench_driver::Error,
  },

  #[error("db seek key [{key}] not found, got {got}")]
  Seek { key: String, got: String },

  #[error("write worker {0} panicked / 写入线程 {0} 崩溃")]
  Worker(usize),

  #[error("IO error: {0}")]
  Io(#[from] std::io::Error),

  #[error("JSON error: {0}")]
  Json(#[from] sonic_rs::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
