//! Configuration for Reed-Solomon codecs

use super::builder::MatrixKind;
use super::error::{RsError, RsResult};

/// Default shard length below which coding stays on the calling thread
pub const DEFAULT_MIN_SPLIT_LEN: usize = 4096;

/// Default number of decode matrices kept per codec
pub const DEFAULT_CACHE_CAPACITY: usize = 256;

/// Configuration for encode/verify/reconstruct operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecConfig {
    /// Number of threads for computation (0 = auto-detect)
    pub threads: usize,
    /// Whether to split shards across threads (false = single-threaded everything)
    pub parallel: bool,
    /// Shards shorter than this are always coded on the calling thread
    pub min_split_len: usize,
    /// Parity-row construction for the generator matrix
    pub matrix: MatrixKind,
    /// Keep inverted decode matrices keyed by erasure pattern
    pub inversion_cache: bool,
    /// Maximum cached decode matrices; the cache is cleared when full
    pub cache_capacity: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            threads: 0, // Auto-detect CPU cores
            parallel: true,
            min_split_len: DEFAULT_MIN_SPLIT_LEN,
            matrix: MatrixKind::Cauchy,
            inversion_cache: true,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl CodecConfig {
    pub fn new(threads: usize, parallel: bool) -> Self {
        Self {
            threads,
            parallel,
            ..Self::default()
        }
    }

    /// Single-threaded configuration
    pub fn sequential() -> Self {
        Self::new(1, false)
    }

    pub fn with_matrix(mut self, matrix: MatrixKind) -> Self {
        self.matrix = matrix;
        self
    }

    pub fn with_min_split_len(mut self, min_split_len: usize) -> Self {
        self.min_split_len = min_split_len;
        self
    }

    pub fn with_inversion_cache(mut self, enabled: bool) -> Self {
        self.inversion_cache = enabled;
        self
    }

    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// Read `threads`, `no-parallel` and `matrix` arguments when the command defines them.
    ///
    /// Values that are present but unparsable fail with [`RsError::InvalidConfig`].
    pub fn from_args(matches: &clap::ArgMatches) -> RsResult<Self> {
        let threads: usize = match matches.try_get_one::<String>("threads").ok().flatten() {
            Some(raw) => raw.parse().map_err(|_| {
                RsError::InvalidConfig(format!("invalid thread count '{raw}'"))
            })?,
            None => 0,
        };

        let parallel = !matches
            .try_get_one::<bool>("no-parallel")
            .ok()
            .flatten()
            .copied()
            .unwrap_or(false);

        let matrix: MatrixKind = match matches.try_get_one::<String>("matrix").ok().flatten() {
            Some(raw) => raw.parse().map_err(RsError::InvalidConfig)?,
            None => MatrixKind::default(),
        };

        Ok(Self::new(threads, parallel).with_matrix(matrix))
    }

    /// Threads a single coding call may use; 0 resolves to the available cores
    pub fn effective_threads(&self) -> usize {
        if !self.parallel {
            return 1;
        }
        if self.threads > 0 {
            return self.threads;
        }
        std::thread::available_parallelism().map_or(1, |cores| cores.get())
    }
}
