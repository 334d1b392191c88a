// Name-keyed registry of storage engine drivers
// 按名称索引的存储引擎驱动注册表

use std::{collections::BTreeMap, path::Path, sync::LazyLock};

use log::debug;
use parking_lot::Mutex;

use crate::{Db, Error, Options, Result, btree};

/// Opens databases of one engine / 打开某一引擎的数据库
pub trait Driver: Send + Sync {
  fn open(&self, dir: &Path, opts: &Options) -> Result<Box<dyn Db>>;
}

#[derive(Default)]
pub struct Registry {
  drivers: BTreeMap<String, Box<dyn Driver>>,
}

impl Registry {
  pub fn new() -> Self {
    Self::default()
  }

  /// Registry with every engine compiled into this build
  /// 包含本次构建所有引擎的注册表
  pub fn builtin() -> Self {
    let mut this = Self::new();
    this.register(btree::NAME, btree::BTreeDriver);
    #[cfg(feature = "rocksdb")]
    this.register(crate::rocksdb::NAME, crate::rocksdb::RocksDriver);
    this
  }

  /// # Panics
  /// Registering the same name twice is a programming error.
  /// 同名重复注册属于编程错误。
  pub fn register(&mut self, name: impl Into<String>, driver: impl Driver + 'static) {
    self.insert(name.into(), Box::new(driver));
  }

  fn insert(&mut self, name: String, driver: Box<dyn Driver>) {
    if self.drivers.contains_key(&name) {
      panic!("duplicated driver registration: {name}");
    }
    self.drivers.insert(name, driver);
  }

  /// Builder form of [`Registry::register`] / [`Registry::register`] 的构建器形式
  pub fn with(mut self, name: impl Into<String>, driver: impl Driver + 'static) -> Self {
    self.register(name, driver);
    self
  }

  pub fn contains(&self, name: &str) -> bool {
    self.drivers.contains_key(name)
  }

  pub fn names(&self) -> impl Iterator<Item = &str> {
    self.drivers.keys().map(String::as_str)
  }

  pub fn open(&self, name: &str, dir: &Path, opts: &Options) -> Result<Box<dyn Db>> {
    let driver = self
      .drivers
      .get(name)
      .ok_or_else(|| Error::NoDriver(name.to_owned()))?;
    debug!("open {name} at {}", dir.display());
    driver.open(dir, opts)
  }
}

type Pending = Vec<(String, Box<dyn Driver>)>;

/// Drivers queued by [`register`]; None once the registry is built
/// [`register`] 排队的驱动；注册表构建后为 None
static PENDING: Mutex<Option<Pending>> = Mutex::new(Some(Vec::new()));

static REGISTRY: LazyLock<Registry> = LazyLock::new(|| {
  let mut reg = Registry::builtin();
  for (name, driver) in PENDING.lock().take().unwrap_or_default() {
    reg.insert(name, driver);
  }
  reg
});

/// Add a driver to the process-wide registry
/// 向进程级注册表添加驱动
///
/// Must run before the first [`registry`] or [`open`] call, e.g. at the top
/// of `main`. Afterwards it fails with [`Error::Sealed`].
/// 必须在首次调用 [`registry`] 或 [`open`] 之前执行，例如 `main` 开头；之后返回 [`Error::Sealed`]。
///
/// # Panics
/// On first use of the registry if `name` is already taken.
/// 若名称已被占用，首次使用注册表时 panic。
pub fn register(name: impl Into<String>, driver: impl Driver + 'static) -> Result<()> {
  let name = name.into();
  match PENDING.lock().as_mut() {
    Some(pending) => {
      debug!("queue driver {name}");
      pending.push((name, Box::new(driver)));
      Ok(())
    }
    None => Err(Error::Sealed(name)),
  }
}

/// Process-wide registry, built once on first use
/// 进程级注册表，首次使用时构建
pub fn registry() -> &'static Registry {
  &REGISTRY
}

/// Open through the process-wide registry / 通过进程级注册表打开
pub fn open(name: &str, dir: &Path, opts: &Options) -> Result<Box<dyn Db>> {
  registry().open(name, dir, opts)
}
