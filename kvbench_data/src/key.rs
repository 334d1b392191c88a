// Fixed-width key encoding
// 定宽 key 编码
//
// Layout: 16 zero-padded decimal digits + 1 marker byte.
// 布局：16 位补零十进制数字 + 1 字节标记。

/// Decimal digits per key / 每个 key 的十进制位数
pub const DIGITS: usize = 16;

/// Encoded key length, identical for hit and missing keys
/// 编码后 key 长度，命中与缺失 key 相同
pub const KEY_LEN: usize = DIGITS + 1;

/// Largest index that fits in `DIGITS` digits / `DIGITS` 位可容纳的最大索引
pub const MAX_INDEX: u64 = 10u64.pow(DIGITS as u32) - 1;

/// Encoded key / 编码后的 key
pub type Key = [u8; KEY_LEN];

/// Key format, selected by the trailing marker byte
/// Key 格式，由末尾标记字节区分
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyFmt {
  /// Present in fixtures / 存在于基准库中
  #[default]
  Hit,
  /// Never written by any generator, so lookups always miss
  /// 从不被写入，查询必然未命中
  Missing,
}

impl KeyFmt {
  /// Marker byte / 标记字节
  #[inline]
  pub const fn marker(self) -> u8 {
    match self {
      Self::Hit => b'+',
      Self::Missing => b'-',
    }
  }

  /// Encode index `n` / 编码索引 `n`
  #[inline]
  pub fn key(self, n: u64) -> Key {
    debug_assert!(n <= MAX_INDEX, "key index {n} exceeds {DIGITS} digits");
    let mut key = [b'0'; KEY_LEN];
    key[DIGITS] = self.marker();
    let mut n = n;
    for b in key[..DIGITS].iter_mut().rev() {
      *b = b'0' + (n % 10) as u8;
      n /= 10;
      if n == 0 {
        break;
      }
    }
    key
  }

  /// Format of an encoded key, None if the marker is unknown
  /// 已编码 key 的格式，标记未知时返回 None
  pub fn of(key: &[u8]) -> Option<Self> {
    match key.get(DIGITS)? {
      b'+' => Some(Self::Hit),
      b'-' => Some(Self::Missing),
      _ => None,
    }
  }
}

/// Decode the numeric index of an encoded key
/// 解码 key 的数字索引
pub fn key_index(key: &[u8]) -> Option<u64> {
  if key.len() != KEY_LEN {
    return None;
  }
  KeyFmt::of(key)?;
  key[..DIGITS].iter().try_fold(0u64, |acc, &b| {
    b.is_ascii_digit().then(|| acc * 10 + u64::from(b - b'0'))
  })
}
