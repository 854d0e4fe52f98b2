//! Generator Matrix Tests
//!
//! Every `data`-row selection of a generator matrix must be invertible;
//! small configurations are checked exhaustively, larger ones by sampling.

use rand::rngs::StdRng;
use rand::seq::index::sample;
use rand::SeedableRng;
use shardrs::reed_solomon::builder::check_row_subset;
use shardrs::reed_solomon::{
    build_generator, check_submatrices, GaloisField, Matrix, MatrixKind, RsError,
};

const KINDS: [MatrixKind; 2] = [MatrixKind::Cauchy, MatrixKind::Vandermonde];

#[test]
fn test_exhaustive_small_configurations() {
    let field = GaloisField::new();
    for kind in KINDS {
        for data in 1..=6 {
            for parity in 0..=4 {
                let generator = build_generator(&field, data, parity, kind).unwrap();
                let checked = check_submatrices(&generator, &field, None).unwrap();
                assert!(checked >= 1, "{kind} {data}+{parity}");
            }
        }
    }
}

#[test]
fn test_reference_configuration_4_2() {
    let field = GaloisField::new();
    for kind in KINDS {
        let generator = build_generator(&field, 4, 2, kind).unwrap();
        assert_eq!(check_submatrices(&generator, &field, None).unwrap(), 15);
    }
}

#[test]
fn test_sampled_large_configurations() {
    let field = GaloisField::new();
    let mut rng = StdRng::seed_from_u64(0x5eed);

    for kind in KINDS {
        for (data, parity) in [(17, 3), (32, 32), (100, 28), (128, 128), (255, 1)] {
            let generator = build_generator(&field, data, parity, kind).unwrap();
            for _ in 0..10 {
                let mut rows = sample(&mut rng, data + parity, data).into_vec();
                rows.sort_unstable();
                check_row_subset(&generator, &rows, &field)
                    .unwrap_or_else(|e| panic!("{kind} {data}+{parity} rows {rows:?}: {e}"));
            }
        }
    }
}

#[test]
fn test_parity_rows_only() {
    // No identity rows at all
    let field = GaloisField::new();
    for kind in KINDS {
        let generator = build_generator(&field, 8, 8, kind).unwrap();
        let rows: Vec<usize> = (8..16).collect();
        check_row_subset(&generator, &rows, &field).unwrap();
    }
}

#[test]
fn test_max_shards() {
    let field = GaloisField::new();
    let generator = build_generator(&field, 128, 128, MatrixKind::Cauchy).unwrap();
    assert_eq!((generator.rows(), generator.cols()), (256, 128));
    assert!(matches!(
        build_generator(&field, 128, 129, MatrixKind::Cauchy),
        Err(RsError::InvalidShardCount { .. })
    ));
}

#[test]
fn test_inverse_roundtrip_on_generator_blocks() {
    let field = GaloisField::new();
    let generator = build_generator(&field, 5, 5, MatrixKind::Vandermonde).unwrap();
    let block = generator.sub_matrix(5..10, 0..5).unwrap();
    let inverse = block.invert(&field).unwrap();
    assert_eq!(block.multiply(&inverse, &field).unwrap(), Matrix::identity(5));
}
