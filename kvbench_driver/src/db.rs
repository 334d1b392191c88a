// Uniform database handle
// 统一的数据库句柄

use std::any::Any;

use crate::{Error, ReadOptions, Result, WriteOptions};

/// Opened database / 已打开的数据库
///
/// Adapters must allow concurrent `get / put / delete / write` from many
/// threads through a shared reference.
/// 适配器必须支持多线程通过共享引用并发调用 `get / put / delete / write`。
pub trait Db: Send + Sync {
  /// Missing keys are `Error::NotFound`, never an empty success
  /// 不存在的键返回 `Error::NotFound`，而非空值
  fn get(&self, key: &[u8], opt: &ReadOptions) -> Result<Vec<u8>>;

  fn put(&self, key: &[u8], val: &[u8], opt: &WriteOptions) -> Result<()>;

  fn delete(&self, key: &[u8], opt: &WriteOptions) -> Result<()>;

  /// Apply a batch atomically / 原子地应用批次
  ///
  /// The batch must come from [`Db::batch`] of the same backend.
  /// 批次必须来自同一后端的 [`Db::batch`]。
  fn write(&self, batch: &mut dyn Batch, opt: &WriteOptions) -> Result<()>;

  fn batch(&self) -> Box<dyn Batch>;

  /// Iterator over the whole keyspace / 全键空间迭代器
  fn all(&self, opt: &ReadOptions) -> Result<Box<dyn DbIter + '_>>;

  fn close(self: Box<Self>) -> Result<()>;

  fn is_not_found(&self, err: &Error) -> bool {
    matches!(err, Error::NotFound)
  }

  fn is_corrupt(&self, err: &Error) -> bool {
    matches!(err, Error::Corrupt(_))
  }
}

/// Pending mutations / 待写入的变更
pub trait Batch: Send {
  fn put(&mut self, key: &[u8], val: &[u8]);

  fn delete(&mut self, key: &[u8]);

  fn clear(&mut self);

  fn len(&self) -> usize;

  fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Downcast hook for [`Db::write`] / 供 [`Db::write`] 向下转型
  fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Ordered cursor over a database / 数据库有序游标
///
/// An unpositioned cursor treats `next` as `first` and `prev` as `last`.
/// 未定位的游标将 `next` 视为 `first`，`prev` 视为 `last`。
pub trait DbIter {
  fn first(&mut self) -> bool;

  fn last(&mut self) -> bool;

  /// Still valid after the move / 移动后是否仍有效
  fn next(&mut self) -> bool;

  fn prev(&mut self) -> bool;

  /// Position at the first key `>= key` / 定位到第一个 `>= key` 的键
  fn seek(&mut self, key: &[u8]) -> bool;

  fn valid(&self) -> bool;

  fn key(&self) -> Option<&[u8]>;

  fn value(&self) -> Option<&[u8]>;

  /// Sticky terminal error / 粘滞的终止错误
  fn err(&self) -> Option<&Error>;

  /// Release native resources, idempotent; returns the terminal error once
  /// 释放原生资源，幂等；终止错误只返回一次
  fn close(&mut self) -> Result<()>;
}
