//! Present/absent shard slots
//!
//! Read-only entry points (`verify`, `join`) accept any slice of
//! [`ShardSlot`]s, so callers can pass plain buffers (always present) or
//! `Option`s where `None` marks an erasure. An empty buffer is a present,
//! zero-length shard, never an erasure.

use super::error::{RsError, RsResult};

/// A shard position that is either present with content or absent
pub trait ShardSlot {
    fn present(&self) -> Option<&[u8]>;

    fn is_present(&self) -> bool {
        self.present().is_some()
    }
}

impl ShardSlot for Vec<u8> {
    fn present(&self) -> Option<&[u8]> {
        Some(self.as_slice())
    }
}

impl ShardSlot for &[u8] {
    fn present(&self) -> Option<&[u8]> {
        Some(*self)
    }
}

impl ShardSlot for &mut [u8] {
    fn present(&self) -> Option<&[u8]> {
        Some(&**self)
    }
}

impl ShardSlot for Box<[u8]> {
    fn present(&self) -> Option<&[u8]> {
        Some(&**self)
    }
}

impl<const N: usize> ShardSlot for [u8; N] {
    fn present(&self) -> Option<&[u8]> {
        Some(self.as_slice())
    }
}

impl<T: AsRef<[u8]>> ShardSlot for Option<T> {
    fn present(&self) -> Option<&[u8]> {
        self.as_ref().map(AsRef::as_ref)
    }
}

/// Common length of the present shards, `None` if every slot is absent
///
/// Fails with [`RsError::ShardSizeMismatch`] naming the first shard whose
/// length differs from the first present one.
pub(crate) fn common_shard_len(
    lens: impl IntoIterator<Item = Option<usize>>,
) -> RsResult<Option<usize>> {
    let mut expected = None;
    for (index, len) in lens.into_iter().enumerate() {
        let Some(len) = len else { continue };
        match expected {
            None => expected = Some(len),
            Some(want) if want != len => {
                return Err(RsError::ShardSizeMismatch {
                    index,
                    expected: want,
                    actual: len,
                })
            }
            Some(_) => {}
        }
    }
    Ok(expected)
}
