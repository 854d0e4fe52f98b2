//! Reed-Solomon erasure coding over GF(2^8)
//!
//! ```
//! use shardrs::ReedSolomon;
//!
//! let rs = ReedSolomon::new(4, 2).unwrap();
//! let mut shards = rs.split(b"HELLO_RS").unwrap();
//! rs.encode(&mut shards).unwrap();
//!
//! let mut slots: Vec<Option<Vec<u8>>> = shards.into_iter().map(Some).collect();
//! slots[1] = None;
//! slots[4] = None;
//! rs.reconstruct(&mut slots).unwrap();
//!
//! assert_eq!(rs.join(&slots, 8).unwrap(), b"HELLO_RS");
//! ```

pub mod reed_solomon;

pub use reed_solomon::{
    join, join_to, split, CodecConfig, GaloisField, MatrixKind, ReedSolomon, RsError, RsResult,
    ShardSlot,
};
