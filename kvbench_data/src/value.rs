// Compressible value generator
// 可压缩 value 生成器

/// Minimum template length: 1 MiB / 模板最小长度：1 MiB
pub const MIN_TEMPLATE: usize = 1024 * 1024;

/// Fixed-length values cut from a cyclic template
/// 从循环模板中截取的定长 value
///
/// The template is built once, so `value` never allocates or draws random
/// bytes. `ratio` controls the random fraction of every `k`-byte block:
/// 1.0 is fully random, 0.0 repeats a single byte.
/// 模板只构建一次，`value` 不分配也不生成随机字节。
/// `ratio` 控制每个 `k` 字节块的随机比例：1.0 全随机，0.0 重复单字节。
#[derive(Debug, Clone)]
pub struct ValueGen {
  buf: Box<[u8]>,
  k: usize,
}

/// Printable ASCII / 可打印 ASCII
#[inline]
fn random_bytes(rng: &mut fastrand::Rng, n: usize, out: &mut Vec<u8>) {
  out.extend((0..n).map(|_| rng.u8(b' '..=b'~')));
}

/// Append `n` bytes repeating a random block of `max(n * ratio, 1)` bytes
/// 追加 `n` 字节，内容为重复的 `max(n * ratio, 1)` 字节随机块
fn compressible_bytes(rng: &mut fastrand::Rng, ratio: f64, n: usize, out: &mut Vec<u8>) {
  let m = ((n as f64 * ratio) as usize).clamp(1, n.max(1));
  let start = out.len();
  random_bytes(rng, m.min(n), out);
  while out.len() - start < n {
    let take = (n - (out.len() - start)).min(m);
    out.extend_from_within(start..start + take);
  }
}

impl ValueGen {
  /// # Arguments
  /// - `seed`: Random seed / 随机种子
  /// - `ratio`: Random fraction, clamped to `[0, 1]` / 随机比例
  /// - `k`: Value length in bytes / value 长度（字节）
  pub fn new(seed: u64, ratio: f64, k: usize) -> Self {
    if k == 0 {
      return Self {
        buf: Box::default(),
        k,
      };
    }
    let ratio = ratio.clamp(0.0, 1.0);
    let mut rng = fastrand::Rng::with_seed(seed);
    let max = k.max(MIN_TEMPLATE);
    let mut buf = Vec::with_capacity(max + k);
    // Whole k-byte blocks, so every window is in bounds
    // 按整块 k 字节追加，保证所有窗口不越界
    while buf.len() < max {
      compressible_bytes(&mut rng, ratio, k, &mut buf);
    }
    Self {
      buf: buf.into_boxed_slice(),
      k,
    }
  }

  /// Value length / value 长度
  #[inline]
  pub fn len(&self) -> usize {
    self.k
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.k == 0
  }

  /// Template length / 模板长度
  #[inline]
  pub fn template_len(&self) -> usize {
    self.buf.len()
  }

  /// The `k`-byte window at `(i * k) mod template_len`
  /// 位于 `(i * k) mod template_len` 的 `k` 字节窗口
  #[inline]
  pub fn value(&self, i: usize) -> &[u8] {
    if self.k == 0 {
      return &[];
    }
    let off = (i % (self.buf.len() / self.k)) * self.k;
    &self.buf[off..off + self.k]
  }
}
