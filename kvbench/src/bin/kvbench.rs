// Command line entry: run every phase against one engine
// 命令行入口：对单个引擎运行全部阶段

use std::process::ExitCode;

use clap::Parser;
use kvbench::{BenchConf, Result, Runner};
use kvbench_driver::{Compression, registry};
use log::{error, info};

/// Reproducible throughput benchmarks for key-value engines
/// 键值引擎的可复现吞吐量基准测试
#[derive(Parser, Debug)]
#[command(name = "kvbench", version, about)]
struct Args {
  /// Registered engine name / 已注册的引擎名称
  #[arg(long, default_value = "btree")]
  driver: String,

  /// Operations per phase / 每个阶段的操作数
  #[arg(long, default_value_t = 100_000)]
  ops: usize,

  /// Template fixture size in bytes / 模板基准库大小（字节）
  #[arg(long, default_value_t = 128 * 1024 * 1024)]
  open_db_size: usize,

  /// Template fixture entry count, overrides --open-db-size
  #[arg(long)]
  entries: Option<usize>,

  #[arg(long, default_value_t = 100)]
  value_size: usize,

  /// Mutations per batch, <= 1 writes one by one / 批次大小
  #[arg(long, default_value_t = 1)]
  batch_count: usize,

  #[arg(long, default_value_t = 0.5)]
  compression_ratio: f64,

  #[arg(long, default_value_t = 2048)]
  max_concurrency: usize,

  #[arg(long)]
  write_sync: bool,

  #[arg(long, default_value_t = 0)]
  cache_size: usize,

  #[arg(long, default_value_t = 0)]
  write_buffer_size: usize,

  #[arg(long, default_value_t = 0)]
  bloom_bits: usize,

  #[arg(long, default_value_t = 0)]
  open_files: usize,

  /// default | none | snappy
  #[arg(long, default_value_t = Compression::Default)]
  compression: Compression,

  /// Fixed seed, random when absent / 固定种子，缺省时随机
  #[arg(long)]
  seed: Option<u64>,

  /// Print the report as JSON / 以 JSON 输出报告
  #[arg(long)]
  json: bool,

  /// List registered engines and exit / 列出已注册引擎后退出
  #[arg(long)]
  list: bool,
}

impl From<&Args> for BenchConf {
  fn from(a: &Args) -> Self {
    Self {
      driver: a.driver.clone(),
      open_db_size: a.open_db_size,
      entries: a.entries,
      value_size: a.value_size,
      batch_count: a.batch_count,
      compression_ratio: a.compression_ratio,
      max_concurrency: a.max_concurrency,
      write_sync: a.write_sync,
      cache_size: a.cache_size,
      write_buffer_size: a.write_buffer_size,
      bloom_bits: a.bloom_bits,
      open_files: a.open_files,
      compression: a.compression,
      seed: a.seed,
    }
  }
}

fn run(args: &Args) -> Result<()> {
  let mut runner = Runner::new(args.into());
  let report = runner.run_all(args.ops)?;
  if args.json {
    println!("{}", report.to_json()?);
  } else {
    for m in &report.results {
      println!("{m}");
    }
  }
  Ok(())
}

fn main() -> ExitCode {
  log_init::init();
  let args = Args::parse();

  if args.list {
    for name in registry().names() {
      println!("{name}");
    }
    return ExitCode::SUCCESS;
  }

  info!("kvbench {} ops={}", args.driver, args.ops);
  match run(&args) {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      error!("{e}");
      ExitCode::FAILURE
    }
  }
}
