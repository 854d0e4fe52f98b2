//! Reed-Solomon Erasure Coding Module
//!
//! Systematic Reed-Solomon codes over GF(2^8): split a payload into data
//! shards, compute parity shards, and rebuild any combination of up to
//! `parity` missing shards from the survivors.
//!
//! Leaves first: `galois` (field arithmetic) → `scalar` (slice kernels) →
//! `matrix` (Gauss-Jordan) → `builder` (generator matrices) → `codec`
//! (encode/verify/reconstruct) and `split` (payload ↔ shards).

pub mod builder;
pub mod codec;
pub mod config;
pub mod error;
pub mod galois;
pub mod matrix;
pub mod scalar;
pub mod shard;
pub mod split;

pub use builder::{build_generator, check_submatrices, MatrixKind, MAX_TOTAL_SHARDS};
pub use codec::ReedSolomon;
pub use config::CodecConfig;
pub use error::{RsError, RsResult};
pub use galois::{GaloisField, DEFAULT_POLYNOMIAL};
pub use matrix::Matrix;
pub use shard::ShardSlot;
pub use split::{join, join_to, split};
