// Key-value benchmark workload generators
// 键值基准测试工作负载生成器

#![cfg_attr(docsrs, feature(doc_cfg))]

mod entry;
mod key;
mod keygen;
mod value;
mod wrap;

pub use entry::{Entries, EntryGen};
pub use key::{DIGITS, KEY_LEN, Key, KeyFmt, MAX_INDEX, key_index};
pub use keygen::{FullRandKeys, KeyGen, PredefKeys, RandKeys, SeqKeys};
pub use value::{MIN_TEMPLATE, ValueGen};
pub use wrap::{Reversed, Round, StartAt};
