//! # kvbench_driver - Storage engine driver contract / 存储引擎驱动契约
//!
//! One uniform handle over heterogeneous key-value engines, opened by name
//! through a process-wide registry.
//! 通过全局注册表按名称打开，为异构键值引擎提供统一句柄。

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod btree;
mod db;
mod error;
mod options;
mod registry;
#[cfg(feature = "rocksdb")]
#[cfg_attr(docsrs, doc(cfg(feature = "rocksdb")))]
pub mod rocksdb;

pub use db::{Batch, Db, DbIter};
pub use error::{Error, Result};
pub use options::{Compression, Options, ReadOptions, WriteOptions};
pub use registry::{Driver, Registry, open, register, registry};
