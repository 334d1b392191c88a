// Snapshot cursor over the btree engine
// btree 引擎的快照游标

use std::{
  ops::Bound::{Excluded, Included, Unbounded},
  sync::Arc,
};

use super::Map;
use crate::{DbIter, Error, Result};

/// Reads a frozen view of the map taken at creation
/// 读取创建时冻结的映射视图
pub struct BTreeIter {
  /// None once closed / 关闭后为 None
  map: Option<Arc<Map>>,
  cur: Option<Box<[u8]>>,
  run: bool,
}

impl BTreeIter {
  pub(crate) fn new(map: Arc<Map>) -> Self {
    Self {
      map: Some(map),
      cur: None,
      run: false,
    }
  }

  #[inline]
  fn set(&mut self, f: impl FnOnce(&Map, Option<&[u8]>) -> Option<Box<[u8]>>) -> bool {
    self.run = true;
    self.cur = match &self.map {
      Some(map) => f(map, self.cur.as_deref()),
      None => None,
    };
    self.cur.is_some()
  }
}

impl DbIter for BTreeIter {
  fn first(&mut self) -> bool {
    self.set(|m, _| m.keys().next().cloned())
  }

  fn last(&mut self) -> bool {
    self.set(|m, _| m.keys().next_back().cloned())
  }

  fn next(&mut self) -> bool {
    if !self.run {
      return self.first();
    }
    self.set(|m, cur| {
      let cur = cur?;
      m.range::<[u8], _>((Excluded(cur), Unbounded))
        .next()
        .map(|(k, _)| k.clone())
    })
  }

  fn prev(&mut self) -> bool {
    if !self.run {
      return self.last();
    }
    self.set(|m, cur| {
      let cur = cur?;
      m.range::<[u8], _>((Unbounded, Excluded(cur)))
        .next_back()
        .map(|(k, _)| k.clone())
    })
  }

  fn seek(&mut self, key: &[u8]) -> bool {
    self.set(|m, _| {
      m.range::<[u8], _>((Included(key), Unbounded))
        .next()
        .map(|(k, _)| k.clone())
    })
  }

  fn valid(&self) -> bool {
    self.cur.is_some()
  }

  fn key(&self) -> Option<&[u8]> {
    self.cur.as_deref()
  }

  fn value(&self) -> Option<&[u8]> {
    let map = self.map.as_ref()?;
    map.get(self.cur.as_deref()?).map(|v| &**v)
  }

  fn err(&self) -> Option<&Error> {
    None
  }

  fn close(&mut self) -> Result<()> {
    self.map = None;
    self.cur = None;
    Ok(())
  }
}
