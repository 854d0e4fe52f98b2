//! Payload splitting and joining
//!
//! [`split`] cuts an arbitrary payload into `data_shards` equal shards of
//! `ceil(len / data_shards)` bytes, zero-padding the tail. [`join`] and
//! [`join_to`] reverse it given the original length, so padding never
//! reaches the caller.

use super::error::{RsError, RsResult};
use super::shard::ShardSlot;
use std::io::Write;

/// Split `payload` into `data_shards` zero-padded shards.
///
/// Returns the shards and their common length. Shards that start past the
/// end of the payload are all zeros.
pub fn split(payload: &[u8], data_shards: usize) -> RsResult<(Vec<Vec<u8>>, usize)> {
    if data_shards == 0 {
        return Err(RsError::InvalidShardCount {
            data: 0,
            parity: 0,
        });
    }

    let shard_len = payload.len().div_ceil(data_shards);
    let shards = (0..data_shards)
        .map(|i| {
            let mut shard = vec![0u8; shard_len];
            let start = (i * shard_len).min(payload.len());
            let end = (start + shard_len).min(payload.len());
            shard[..end - start].copy_from_slice(&payload[start..end]);
            shard
        })
        .collect();

    Ok((shards, shard_len))
}

/// Concatenate the first `data_shards` shards and truncate to `original_len`
pub fn join<S: ShardSlot>(
    shards: &[S],
    data_shards: usize,
    original_len: usize,
) -> RsResult<Vec<u8>> {
    // Never reserve more than the shards can supply; join_to reports ShortData
    let available: usize = shards
        .iter()
        .take(data_shards)
        .filter_map(ShardSlot::present)
        .map(<[u8]>::len)
        .sum();
    let mut payload = Vec::with_capacity(original_len.min(available));
    join_to(&mut payload, shards, data_shards, original_len)?;
    Ok(payload)
}

/// Stream the joined payload into `writer`.
///
/// All shard checks happen before the first write.
pub fn join_to<W: Write, S: ShardSlot>(
    writer: &mut W,
    shards: &[S],
    data_shards: usize,
    original_len: usize,
) -> RsResult<()> {
    if data_shards == 0 {
        return Err(RsError::InvalidShardCount {
            data: 0,
            parity: 0,
        });
    }
    if shards.len() < data_shards {
        return Err(RsError::WrongShardCount {
            expected: data_shards,
            actual: shards.len(),
        });
    }

    let data: Vec<&[u8]> = shards[..data_shards]
        .iter()
        .enumerate()
        .map(|(index, shard)| shard.present().ok_or(RsError::MissingDataShard(index)))
        .collect::<RsResult<_>>()?;

    let available: usize = data.iter().map(|shard| shard.len()).sum();
    if available < original_len {
        return Err(RsError::ShortData {
            needed: original_len,
            available,
        });
    }

    let mut remaining = original_len;
    for shard in data {
        if remaining == 0 {
            break;
        }
        let take = shard.len().min(remaining);
        writer.write_all(&shard[..take])?;
        remaining -= take;
    }
    Ok(())
}
