// Key generators for benchmark
// 基准测试的 key 生成器

use std::cell::RefCell;

use crate::{Key, KeyFmt};

/// Map an index to a fixed-width key
/// 将索引映射为定宽 key
pub trait KeyGen {
  /// Number of distinct keys this generator is built over
  /// 生成器覆盖的 key 数量
  fn nkey(&self) -> usize;

  /// Key at index `i` / 索引 `i` 处的 key
  fn key(&self, i: usize) -> Key;
}

impl<G: KeyGen + ?Sized> KeyGen for &G {
  #[inline]
  fn nkey(&self) -> usize {
    (**self).nkey()
  }

  #[inline]
  fn key(&self, i: usize) -> Key {
    (**self).key(i)
  }
}

/// Sequential keys: `key(i) = fmt(start + i)`
/// 顺序 key
#[derive(Debug, Clone)]
pub struct SeqKeys {
  n: usize,
  start: usize,
  fmt: KeyFmt,
}

impl SeqKeys {
  pub fn new(n: usize, start: usize, fmt: KeyFmt) -> Self {
    Self { n, start, fmt }
  }

  /// Hit keys `[0, n)` / 命中 key `[0, n)`
  pub fn hit(n: usize) -> Self {
    Self::new(n, 0, KeyFmt::Hit)
  }
}

impl KeyGen for SeqKeys {
  #[inline]
  fn nkey(&self) -> usize {
    self.n
  }

  #[inline]
  fn key(&self, i: usize) -> Key {
    self.fmt.key((self.start + i) as u64)
  }
}

/// Random keys drawn with replacement from `[0, n)`
/// 从 `[0, n)` 有放回随机抽取的 key
///
/// Every call draws again, so `key(i)` is not idempotent.
/// 每次调用都重新抽取，`key(i)` 不幂等。
#[derive(Debug)]
pub struct RandKeys {
  n: usize,
  fmt: KeyFmt,
  rng: RefCell<fastrand::Rng>,
}

impl RandKeys {
  pub fn new(n: usize, fmt: KeyFmt, seed: u64) -> Self {
    debug_assert!(n > 0, "random key domain must not be empty");
    Self {
      n,
      fmt,
      rng: RefCell::new(fastrand::Rng::with_seed(seed)),
    }
  }

  pub fn hit(n: usize, seed: u64) -> Self {
    Self::new(n, KeyFmt::Hit, seed)
  }

  /// Same numeric domain as [`RandKeys::hit`], never present in a fixture
  /// 与 [`RandKeys::hit`] 同数值域，但不存在于基准库
  pub fn missing(n: usize, seed: u64) -> Self {
    Self::new(n, KeyFmt::Missing, seed)
  }
}

impl KeyGen for RandKeys {
  #[inline]
  fn nkey(&self) -> usize {
    self.n
  }

  #[inline]
  fn key(&self, _: usize) -> Key {
    let n = self.rng.borrow_mut().usize(..self.n.max(1));
    self.fmt.key(n as u64)
  }
}

/// Shuffled permutation of `[start, start + n)`
/// `[start, start + n)` 的随机排列
///
/// Every key in range appears exactly once over `i in [0, n)`.
/// 在 `i in [0, n)` 上每个 key 恰好出现一次。
#[derive(Debug, Clone)]
pub struct FullRandKeys {
  keys: Vec<Key>,
}

impl FullRandKeys {
  pub fn new(start: usize, n: usize, seed: u64) -> Self {
    let mut keys: Vec<Key> = (start..start + n)
      .map(|i| KeyFmt::Hit.key(i as u64))
      .collect();
    fastrand::Rng::with_seed(seed).shuffle(&mut keys);
    Self { keys }
  }
}

impl KeyGen for FullRandKeys {
  #[inline]
  fn nkey(&self) -> usize {
    self.keys.len()
  }

  #[inline]
  fn key(&self, i: usize) -> Key {
    self.keys[i]
  }
}

/// Keys materialized up front / 预先生成的 key 列表
#[derive(Debug, Clone, Default)]
pub struct PredefKeys {
  keys: Vec<Key>,
}

impl PredefKeys {
  pub fn new(keys: Vec<Key>) -> Self {
    Self { keys }
  }

  /// `n` random draws from `[0, n)`, fixed at construction
  /// 从 `[0, n)` 随机抽取 `n` 个，构造时固定
  pub fn rand(n: usize, fmt: KeyFmt, seed: u64) -> Self {
    let mut rng = fastrand::Rng::with_seed(seed);
    let keys = (0..n).map(|_| fmt.key(rng.usize(..n) as u64)).collect();
    Self { keys }
  }

  /// Random hit keys sorted by byte order, for ordered deletes
  /// 按字节序排序的随机命中 key，用于有序删除
  pub fn sorted_random(n: usize, seed: u64) -> Self {
    let mut this = Self::rand(n, KeyFmt::Hit, seed);
    this.keys.sort_unstable();
    this
  }

  pub fn keys(&self) -> &[Key] {
    &self.keys
  }
}

impl KeyGen for PredefKeys {
  #[inline]
  fn nkey(&self) -> usize {
    self.keys.len()
  }

  #[inline]
  fn key(&self, i: usize) -> Key {
    self.keys[i]
  }
}
