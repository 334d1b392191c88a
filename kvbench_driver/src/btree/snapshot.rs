//! Snapshot file / 快照文件
//!
//! Disk format: magic(4) + count(8) + [klen(4) + vlen(4) + key + val]* + crc32(4)
//! 磁盘格式：magic(4) + count(8) + [klen(4) + vlen(4) + key + val]* + crc32(4)
//!
//! CRC covers everything before it. Integers are little endian.
//! CRC 覆盖其之前的全部字节，整数为小端序。

use std::{fs, path::Path};

use super::Map;
use crate::{Error, Result};

pub const FILE: &str = "btree.kv";
pub const MAGIC: [u8; 4] = *b"KVB1";

const CRC_SIZE: usize = 4;
const HEAD_SIZE: usize = MAGIC.len() + 8;

pub(crate) fn encode(map: &Map) -> Vec<u8> {
  let body: usize = map.iter().map(|(k, v)| 8 + k.len() + v.len()).sum();
  let mut buf = Vec::with_capacity(HEAD_SIZE + body + CRC_SIZE);
  buf.extend_from_slice(&MAGIC);
  buf.extend_from_slice(&(map.len() as u64).to_le_bytes());
  for (k, v) in map {
    buf.extend_from_slice(&(k.len() as u32).to_le_bytes());
    buf.extend_from_slice(&(v.len() as u32).to_le_bytes());
    buf.extend_from_slice(k);
    buf.extend_from_slice(v);
  }
  let crc = crc32fast::hash(&buf);
  buf.extend_from_slice(&crc.to_le_bytes());
  buf
}

/// Cursor over the record body / 记录体游标
struct Reader<'a> {
  buf: &'a [u8],
}

impl<'a> Reader<'a> {
  fn take(&mut self, n: usize) -> Result<&'a [u8]> {
    if self.buf.len() < n {
      return Err(Error::Corrupt("btree snapshot truncated".into()));
    }
    let (head, rest) = self.buf.split_at(n);
    self.buf = rest;
    Ok(head)
  }

  fn u32(&mut self) -> Result<usize> {
    let b = self.take(4)?;
    Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]) as usize)
  }
}

pub(crate) fn decode(buf: &[u8]) -> Result<Map> {
  if buf.len() < HEAD_SIZE + CRC_SIZE || buf[..MAGIC.len()] != MAGIC {
    return Err(Error::Corrupt("btree snapshot: bad header".into()));
  }
  let (data, crc) = buf.split_at(buf.len() - CRC_SIZE);
  let crc_stored = u32::from_le_bytes([crc[0], crc[1], crc[2], crc[3]]);
  if crc_stored != crc32fast::hash(data) {
    return Err(Error::Corrupt("btree snapshot: crc mismatch".into()));
  }

  let mut count = [0u8; 8];
  count.copy_from_slice(&data[MAGIC.len()..HEAD_SIZE]);
  let count = u64::from_le_bytes(count);

  let mut r = Reader {
    buf: &data[HEAD_SIZE..],
  };
  let mut map = Map::new();
  for _ in 0..count {
    let klen = r.u32()?;
    let vlen = r.u32()?;
    let k = r.take(klen)?;
    let v = r.take(vlen)?;
    map.insert(k.into(), v.into());
  }
  if !r.buf.is_empty() {
    return Err(Error::Corrupt("btree snapshot: trailing bytes".into()));
  }
  Ok(map)
}

pub(crate) fn load(path: &Path) -> Result<Map> {
  decode(&fs::read(path)?)
}

/// Write to a temp file then rename, so a crash never leaves half a snapshot
/// 先写临时文件再重命名，崩溃时不会留下半个快照
pub(crate) fn store(path: &Path, map: &Map) -> Result<()> {
  let tmp = path.with_extension("tmp");
  fs::write(&tmp, encode(map))?;
  fs::rename(&tmp, path)?;
  Ok(())
}
