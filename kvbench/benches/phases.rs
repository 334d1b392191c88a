// Quick pass over every phase on the in-memory engine
// 在内存引擎上快速跑一遍全部阶段

use std::{env, fs, path::Path};

use kvbench::{BenchConf, Runner};

const REPORT_DIR: &str = "report";
const OPS: usize = 10_000;
const SEED: u64 = 42;

fn main() {
  log_init::init();

  // `cargo bench` passes `--bench`; skip it / 跳过 `cargo bench` 传入的 `--bench`
  let driver = env::args()
    .skip(1)
    .find(|a| !a.starts_with('-'))
    .unwrap_or_else(|| "btree".to_owned());

  let conf = BenchConf::default()
    .driver(driver)
    .entries(OPS)
    .max_concurrency(8)
    .seed(SEED);
  let mut runner = Runner::new(conf);

  let report = match runner.run_all(OPS) {
    Ok(r) => r,
    Err(e) => {
      log::error!("{e}");
      std::process::exit(1);
    }
  };
  for m in &report.results {
    println!("{m}");
  }

  let dir = Path::new(REPORT_DIR);
  let path = dir.join(format!("{}.json", report.driver));
  let wrote = fs::create_dir_all(dir)
    .map_err(kvbench::Error::from)
    .and_then(|_| report.to_json())
    .and_then(|json| Ok(fs::write(&path, json)?));
  match wrote {
    Ok(()) => println!("report: {}", path.display()),
    Err(e) => log::error!("write report: {e}"),
  }
}
