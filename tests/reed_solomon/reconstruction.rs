//! Reconstruction Tests
//!
//! Rebuilding absent shards from any `data` survivors, the erasure limit,
//! and the reference HELLO_RS scenario.

use rand::rngs::StdRng;
use rand::seq::index::sample;
use rand::{Rng, SeedableRng};
use shardrs::reed_solomon::builder::Combinations;
use shardrs::reed_solomon::{CodecConfig, MatrixKind, ReedSolomon, RsError};
use shardrs::{join, split};

fn encoded_slots(rs: &ReedSolomon, payload: &[u8]) -> Vec<Option<Vec<u8>>> {
    let mut shards = rs.split(payload).unwrap();
    rs.encode(&mut shards).unwrap();
    shards.into_iter().map(Some).collect()
}

fn random_payload(rng: &mut StdRng, len: usize) -> Vec<u8> {
    let mut payload = vec![0u8; len];
    rng.fill(&mut payload[..]);
    payload
}

// ============================================================================
// Reference scenario
// ============================================================================

#[test]
fn test_hello_rs_scenario() {
    let rs = ReedSolomon::new(4, 2).unwrap();
    let (data, shard_len) = split(b"HELLO_RS", 4).unwrap();
    assert_eq!(shard_len, 2);
    assert_eq!(data, vec![b"HE".to_vec(), b"LL".to_vec(), b"O_".to_vec(), b"RS".to_vec()]);

    let mut shards = data.clone();
    shards.extend([vec![0u8; 2], vec![0u8; 2]]);
    rs.encode(&mut shards).unwrap();
    assert_eq!(&shards[..4], &data[..]);
    let original = shards.clone();

    let mut slots: Vec<Option<Vec<u8>>> = shards.into_iter().map(Some).collect();
    slots[1] = None; // data shard 1
    slots[4] = None; // parity shard 0
    assert!(!rs.verify(&slots).unwrap());

    rs.reconstruct(&mut slots).unwrap();
    assert_eq!(slots[1].as_deref(), Some(&b"LL"[..]));
    assert_eq!(slots[4].as_deref(), Some(original[4].as_slice()));
    assert!(rs.verify(&slots).unwrap());

    assert_eq!(join(&slots, 4, 8).unwrap(), b"HELLO_RS");
}

// ============================================================================
// Erasure patterns
// ============================================================================

#[test]
fn test_every_erasure_pattern_up_to_parity() {
    let payload: Vec<u8> = (0..123u8).collect();
    for kind in [MatrixKind::Cauchy, MatrixKind::Vandermonde] {
        let rs = ReedSolomon::with_config(5, 3, CodecConfig::default().with_matrix(kind)).unwrap();
        let full = encoded_slots(&rs, &payload);

        for erased in 0..=3 {
            for pattern in Combinations::new(8, erased) {
                let mut slots = full.clone();
                for &index in &pattern {
                    slots[index] = None;
                }
                rs.reconstruct(&mut slots)
                    .unwrap_or_else(|e| panic!("{kind} pattern {pattern:?}: {e}"));
                assert_eq!(slots, full, "{kind} pattern {pattern:?}");
            }
        }
    }
}

#[test]
fn test_one_more_than_parity_fails() {
    let rs = ReedSolomon::new(5, 3).unwrap();
    let full = encoded_slots(&rs, b"some payload bytes");

    for pattern in Combinations::new(8, 4) {
        let mut slots = full.clone();
        for &index in &pattern {
            slots[index] = None;
        }
        let before = slots.clone();
        assert!(matches!(
            rs.reconstruct(&mut slots),
            Err(RsError::TooManyErasures { missing: 4, max: 3 })
        ));
        assert_eq!(slots, before);
    }
}

#[test]
fn test_all_absent_fails() {
    let rs = ReedSolomon::new(2, 2).unwrap();
    let mut slots: Vec<Option<Vec<u8>>> = vec![None; 4];
    assert!(matches!(
        rs.reconstruct(&mut slots),
        Err(RsError::TooManyErasures { missing: 4, max: 2 })
    ));
}

#[test]
fn test_random_large_configurations() {
    let mut rng = StdRng::seed_from_u64(42);
    for (data, parity) in [(10, 4), (17, 17), (50, 20), (200, 56)] {
        let rs = ReedSolomon::new(data, parity).unwrap();
        let len = rng.random_range(1..4000);
        let payload = random_payload(&mut rng, len);
        let full = encoded_slots(&rs, &payload);

        for _ in 0..5 {
            let erased = rng.random_range(1..=parity);
            let mut slots = full.clone();
            for index in sample(&mut rng, data + parity, erased).into_vec() {
                slots[index] = None;
            }
            rs.reconstruct(&mut slots).unwrap();
            assert_eq!(slots, full, "{data}+{parity}, {erased} erased");
            assert_eq!(join(&slots, data, payload.len()).unwrap(), payload);
        }
    }
}

#[test]
fn test_parallel_reconstruct_matches() {
    let mut rng = StdRng::seed_from_u64(7);
    let payload = random_payload(&mut rng, 64 * 1024);
    let rs = ReedSolomon::with_config(8, 4, CodecConfig::new(4, true).with_min_split_len(256))
        .unwrap();
    let full = encoded_slots(&rs, &payload);

    let mut slots = full.clone();
    slots[0] = None;
    slots[3] = None;
    slots[7] = None;
    slots[10] = None;
    rs.reconstruct(&mut slots).unwrap();
    assert_eq!(slots, full);
}

// ============================================================================
// Mutation rules
// ============================================================================

#[test]
fn test_present_shards_are_untouched() {
    let rs = ReedSolomon::new(4, 2).unwrap();
    let mut slots = encoded_slots(&rs, b"0123456789abcdef");
    slots[0] = None;

    let pointers: Vec<Option<*const u8>> = slots
        .iter()
        .map(|s| s.as_ref().map(|b| b.as_ptr()))
        .collect();
    rs.reconstruct(&mut slots).unwrap();

    for (index, pointer) in pointers.iter().enumerate().skip(1) {
        assert_eq!(slots[index].as_ref().map(|b| b.as_ptr()), *pointer);
    }
}

#[test]
fn test_all_present_is_noop() {
    let rs = ReedSolomon::new(3, 2).unwrap();
    let mut slots = encoded_slots(&rs, b"abcdef");
    let before = slots.clone();
    rs.reconstruct(&mut slots).unwrap();
    assert_eq!(slots, before);
}

#[test]
fn test_size_mismatch_checked_before_mutation() {
    let rs = ReedSolomon::new(3, 2).unwrap();
    let mut slots = encoded_slots(&rs, b"abcdefghi");
    slots[0] = None;
    slots[4] = Some(vec![0u8; 7]);
    let before = slots.clone();
    assert!(matches!(
        rs.reconstruct(&mut slots),
        Err(RsError::ShardSizeMismatch { index: 4, .. })
    ));
    assert_eq!(slots, before);
}

#[test]
fn test_wrong_shard_count() {
    let rs = ReedSolomon::new(3, 2).unwrap();
    let mut slots: Vec<Option<Vec<u8>>> = vec![Some(vec![0u8; 2]); 6];
    assert!(matches!(
        rs.reconstruct(&mut slots),
        Err(RsError::WrongShardCount {
            expected: 5,
            actual: 6
        })
    ));
}

#[test]
fn test_zero_length_shards() {
    let rs = ReedSolomon::new(3, 2).unwrap();
    let mut slots: Vec<Option<Vec<u8>>> = vec![Some(Vec::new()); 5];
    slots[1] = None;
    slots[3] = None;
    rs.reconstruct(&mut slots).unwrap();
    assert!(slots.iter().all(|s| s.as_deref() == Some(&[][..])));
}

// ============================================================================
// Variants
// ============================================================================

#[test]
fn test_reconstruct_data_only() {
    let rs = ReedSolomon::new(4, 2).unwrap();
    let full = encoded_slots(&rs, b"reconstruct only the data");
    let mut slots = full.clone();
    slots[2] = None;
    slots[5] = None;

    rs.reconstruct_data(&mut slots).unwrap();
    assert_eq!(slots[2], full[2]);
    assert!(slots[5].is_none());
    assert_eq!(join(&slots, 4, 25).unwrap(), b"reconstruct only the data");
}

#[test]
fn test_reconstruct_with_mask() {
    let rs = ReedSolomon::new(4, 2).unwrap();
    let mut shards = rs.split(b"bitmap erasure signalling").unwrap();
    rs.encode(&mut shards).unwrap();
    let original = shards.clone();

    // Erased buffers keep garbage; only the bitmap marks them
    shards[0].fill(0xFF);
    shards[5].fill(0x00);
    let present = [false, true, true, true, true, false];
    rs.reconstruct_with_mask(&mut shards, &present).unwrap();
    assert_eq!(shards, original);
}

#[test]
fn test_reconstruct_with_mask_errors_restore_buffers() {
    let rs = ReedSolomon::new(4, 2).unwrap();
    let mut shards = rs.split(b"bitmap erasure signalling").unwrap();
    rs.encode(&mut shards).unwrap();
    let original = shards.clone();

    let present = [false, false, false, true, true, true];
    assert!(matches!(
        rs.reconstruct_with_mask(&mut shards, &present),
        Err(RsError::TooManyErasures { .. })
    ));
    assert_eq!(shards, original);

    assert!(matches!(
        rs.reconstruct_with_mask(&mut shards, &[true; 5]),
        Err(RsError::WrongShardCount { .. })
    ));
}

#[test]
fn test_repeated_patterns_use_same_result() {
    let rs = ReedSolomon::new(6, 3).unwrap();
    let full = encoded_slots(&rs, &[0x42; 600]);
    for _ in 0..3 {
        let mut slots = full.clone();
        slots[1] = None;
        slots[2] = None;
        rs.reconstruct(&mut slots).unwrap();
        assert_eq!(slots, full);
    }
}
