// Entry generator: key generator paired with value generator
// 条目生成器：key 生成器与 value 生成器配对

use crate::{FullRandKeys, Key, KeyGen, RandKeys, SeqKeys, ValueGen};

/// Workload source for writes / 写入负载来源
pub trait EntryGen: KeyGen {
  fn value(&self, i: usize) -> &[u8];
}

impl<G: EntryGen + ?Sized> EntryGen for &G {
  #[inline]
  fn value(&self, i: usize) -> &[u8] {
    (**self).value(i)
  }
}

#[derive(Debug, Clone)]
pub struct Entries<K> {
  keys: K,
  values: ValueGen,
}

impl<K: KeyGen> Entries<K> {
  pub fn new(keys: K, values: ValueGen) -> Self {
    Self { keys, values }
  }

  pub fn keys(&self) -> &K {
    &self.keys
  }

  pub fn values(&self) -> &ValueGen {
    &self.values
  }
}

impl Entries<SeqKeys> {
  /// Sequential hit keys `[0, n)` / 顺序命中 key `[0, n)`
  pub fn seq(n: usize, values: ValueGen) -> Self {
    Self::new(SeqKeys::hit(n), values)
  }
}

impl Entries<RandKeys> {
  pub fn rand(n: usize, seed: u64, values: ValueGen) -> Self {
    Self::new(RandKeys::hit(n, seed), values)
  }
}

impl Entries<FullRandKeys> {
  /// Permutation of `[start, start + n)` / `[start, start + n)` 的排列
  pub fn full_rand(start: usize, n: usize, seed: u64, values: ValueGen) -> Self {
    Self::new(FullRandKeys::new(start, n, seed), values)
  }
}

impl<K: KeyGen> KeyGen for Entries<K> {
  #[inline]
  fn nkey(&self) -> usize {
    self.keys.nkey()
  }

  #[inline]
  fn key(&self, i: usize) -> Key {
    self.keys.key(i)
  }
}

impl<K: KeyGen> EntryGen for Entries<K> {
  #[inline]
  fn value(&self, i: usize) -> &[u8] {
    self.values.value(i)
  }
}
