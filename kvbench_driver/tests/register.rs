// Own process: the global registry must not be built by other tests first
// 独立进程：全局注册表不能先被其他测试构建

use std::path::Path;

use aok::{OK, Void};
use kvbench_driver::{
  Db, Driver, Error, Options, ReadOptions, Result, WriteOptions, btree, open, register, registry,
};
use tempfile::TempDir;

#[static_init::constructor(0)]
extern "C" fn _log_init() {
  log_init::init();
}

struct Mirror;

impl Driver for Mirror {
  fn open(&self, dir: &Path, opts: &Options) -> Result<Box<dyn Db>> {
    btree::BTreeDriver.open(dir, opts)
  }
}

#[test]
fn test_register_before_first_use() -> Void {
  register("mirror", Mirror)?;
  assert!(registry().contains("mirror"));
  assert!(registry().contains(btree::NAME));

  let tmp = TempDir::new()?;
  let db = open("mirror", tmp.path(), &Options::default().create())?;
  db.put(b"k", b"v", &WriteOptions::default())?;
  assert_eq!(db.get(b"k", &ReadOptions::default())?, b"v");
  db.close()?;

  // Built now, late registrations are refused / 已构建，拒绝迟到的注册
  match register("late", Mirror) {
    Err(Error::Sealed(name)) => assert_eq!(name, "late"),
    other => panic!("expected sealed, got {other:?}"),
  }
  assert!(!registry().contains("late"));
  OK
}
