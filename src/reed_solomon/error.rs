//! Error types for Reed-Solomon operations

use thiserror::Error;

/// Errors that can occur during Reed-Solomon operations
#[derive(Debug, Error)]
pub enum RsError {
    /// Shard configuration outside the supported range
    #[error(
        "Invalid shard count: {data} data + {parity} parity (need data >= 1 and total <= 256)"
    )]
    InvalidShardCount { data: usize, parity: usize },

    /// Shard sequence has the wrong number of entries
    #[error("Wrong shard count: expected {expected}, got {actual}")]
    WrongShardCount { expected: usize, actual: usize },

    /// A shard differs in length from the others
    #[error("Shard {index} has length {actual}, expected {expected}")]
    ShardSizeMismatch {
        index: usize,
        expected: usize,
        actual: usize,
    },

    /// More shards are absent than parity can recover
    #[error("Cannot reconstruct: {missing} shards missing but at most {max} can be recovered")]
    TooManyErasures { missing: usize, max: usize },

    /// Division (or inversion) by the additive identity
    #[error("Division by zero in Galois field")]
    DivisionByZero,

    /// Gauss-Jordan elimination found no usable pivot
    #[error("Matrix is singular")]
    SingularMatrix,

    /// Matrix operands have incompatible shapes
    #[error("Matrix dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// Field polynomial for which 2 does not generate the multiplicative group
    #[error("Polynomial {0:#x} is not a primitive degree-8 polynomial")]
    InvalidPolynomial(u32),

    /// Shards hold fewer bytes than the requested payload length
    #[error("Short data: need {needed} bytes but shards hold {available}")]
    ShortData { needed: usize, available: usize },

    /// A data shard needed for joining is absent
    #[error("Data shard {0} is missing")]
    MissingDataShard(usize),

    /// Codec configuration value that cannot be used
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O error while streaming a joined payload
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RsError {
    /// Returns true for errors that indicate a broken generator matrix or
    /// field rather than bad caller input
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            RsError::DivisionByZero | RsError::SingularMatrix | RsError::DimensionMismatch(_)
        )
    }
}

/// Result type for Reed-Solomon operations
pub type RsResult<T> = std::result::Result<T, RsError>;
