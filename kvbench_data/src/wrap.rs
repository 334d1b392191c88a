// Generator decorators
// 生成器装饰器

use crate::{EntryGen, Key, KeyGen};

/// `key(i) = inner.key(inner.nkey() - 1 - i)`
#[derive(Debug, Clone)]
pub struct Reversed<G>(pub G);

impl<G: KeyGen> KeyGen for Reversed<G> {
  #[inline]
  fn nkey(&self) -> usize {
    self.0.nkey()
  }

  #[inline]
  fn key(&self, i: usize) -> Key {
    self.0.key(self.0.nkey() - 1 - i)
  }
}

/// Cycle a small key set over a larger index domain (hot working set)
/// 在更大的索引域上循环小 key 集合（热点工作集）
#[derive(Debug, Clone)]
pub struct Round<G>(pub G);

impl<G: KeyGen> KeyGen for Round<G> {
  #[inline]
  fn nkey(&self) -> usize {
    self.0.nkey()
  }

  #[inline]
  fn key(&self, i: usize) -> Key {
    self.0.key(i % self.0.nkey())
  }
}

/// Offset view, one per concurrent partition
/// 偏移视图，每个并发分区一个
#[derive(Debug, Clone)]
pub struct StartAt<G> {
  inner: G,
  start: usize,
}

impl<G: KeyGen> StartAt<G> {
  pub fn new(start: usize, inner: G) -> Self {
    debug_assert!(start <= inner.nkey());
    Self { inner, start }
  }
}

impl<G: KeyGen> KeyGen for StartAt<G> {
  #[inline]
  fn nkey(&self) -> usize {
    self.inner.nkey() - self.start
  }

  #[inline]
  fn key(&self, i: usize) -> Key {
    self.inner.key(self.start + i)
  }
}

// Values keep the unshifted index.
// value 保持未偏移的索引。
impl<G: EntryGen> EntryGen for StartAt<G> {
  #[inline]
  fn value(&self, i: usize) -> &[u8] {
    self.inner.value(i)
  }
}
