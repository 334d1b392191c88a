// Key-value engine benchmark harness
// 键值引擎基准测试框架

mod conf;
mod error;
mod fixture;
mod metrics;
mod runner;
mod timer;
mod writer;

pub use conf::BenchConf;
pub use error::{Error, Result};
pub use fixture::{FIXTURE_BATCH, Fixture, create_db, dir_size};
pub use metrics::{BenchMetrics, Report};
pub use runner::{MAX_REOPEN, Runner, read_keys, write_partitioned};
pub use timer::Bencher;
pub use writer::{Batched, DbWriter, Singular, Writer, delete_keys, write_entries, writer};
