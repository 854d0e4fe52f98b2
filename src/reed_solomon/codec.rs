//! Systematic Reed-Solomon shard codec
//!
//! ## Overview
//!
//! [`ReedSolomon`] owns the generator matrix for one `(data, parity)`
//! configuration and applies it to caller-owned shard buffers:
//!
//! - **encode**: parity shard `r` = Σ generator[data + r][i] · data shard `i`
//! - **verify**: recompute parity into scratch buffers and compare
//! - **reconstruct**: invert the generator rows of `data` surviving shards,
//!   recover the missing data shards, then re-encode missing parity
//!
//! The codec keeps no reference to shard buffers after a call returns and
//! holds no mutable state apart from the optional inversion cache, so one
//! instance can be shared between threads.
//!
//! ## Parallelism
//!
//! Shards of at least `min_split_len` bytes are split into byte ranges that
//! rayon codes independently. Output is byte-identical to sequential coding.

use super::builder::build_generator;
use super::config::CodecConfig;
use super::error::{RsError, RsResult};
use super::galois::GaloisField;
use super::matrix::Matrix;
use super::scalar::{process_slice_multiply, WriteOp};
use super::shard::{common_shard_len, ShardSlot};
use super::split;
use log::{debug, trace, warn};
use rayon::prelude::*;
use rustc_hash::FxHashMap as HashMap;
use smallvec::SmallVec;
use std::fmt;
use std::sync::{Arc, RwLock};

/// Inline capacity for per-shard reference lists
const INLINE_SHARDS: usize = 32;

/// Byte ranges handed to workers are multiples of this
const SPLIT_ALIGN: usize = 64;

type ShardRefs<'a> = SmallVec<[&'a [u8]; INLINE_SHARDS]>;
type ShardMuts<'a> = SmallVec<[&'a mut [u8]; INLINE_SHARDS]>;

/// Surviving generator rows a decode matrix was inverted from
type SurvivorKey = SmallVec<[u8; INLINE_SHARDS]>;

/// Reed-Solomon encoder/decoder for a fixed shard configuration
pub struct ReedSolomon {
    data_shards: usize,
    parity_shards: usize,
    field: Arc<GaloisField>,
    generator: Arc<Matrix>,
    config: CodecConfig,
    pool: Option<rayon::ThreadPool>,
    inversion_cache: RwLock<HashMap<SurvivorKey, Arc<Matrix>>>,
}

impl ReedSolomon {
    /// Create a codec with the default configuration.
    ///
    /// Fails with [`RsError::InvalidShardCount`] unless `data_shards >= 1`
    /// and `data_shards + parity_shards <= 256`.
    pub fn new(data_shards: usize, parity_shards: usize) -> RsResult<Self> {
        Self::with_config(data_shards, parity_shards, CodecConfig::default())
    }

    pub fn with_config(
        data_shards: usize,
        parity_shards: usize,
        config: CodecConfig,
    ) -> RsResult<Self> {
        Self::with_field(
            Arc::new(GaloisField::new()),
            data_shards,
            parity_shards,
            config,
        )
    }

    /// Create a codec over an existing (possibly shared) field
    pub fn with_field(
        field: Arc<GaloisField>,
        data_shards: usize,
        parity_shards: usize,
        config: CodecConfig,
    ) -> RsResult<Self> {
        let generator = build_generator(&field, data_shards, parity_shards, config.matrix)?;

        // Explicit thread counts get their own pool; auto-detect uses rayon's global pool
        let pool = match (config.parallel, config.threads) {
            (true, threads) if threads > 1 => rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .map_err(|e| {
                    warn!(
                        "Could not create {} coding threads, using default pool: {}",
                        threads, e
                    )
                })
                .ok(),
            _ => None,
        };

        debug!(
            "Created Reed-Solomon codec: {} data + {} parity shards, {} threads",
            data_shards,
            parity_shards,
            config.effective_threads()
        );

        Ok(Self {
            data_shards,
            parity_shards,
            field,
            generator: Arc::new(generator),
            config,
            pool,
            inversion_cache: RwLock::new(HashMap::default()),
        })
    }

    pub fn data_shard_count(&self) -> usize {
        self.data_shards
    }

    pub fn parity_shard_count(&self) -> usize {
        self.parity_shards
    }

    pub fn total_shard_count(&self) -> usize {
        self.data_shards + self.parity_shards
    }

    /// The `(data + parity) x data` generator matrix
    pub fn generator(&self) -> &Matrix {
        &self.generator
    }

    pub fn field(&self) -> &Arc<GaloisField> {
        &self.field
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Compute parity shards in place from the data shards.
    ///
    /// `shards` must hold exactly `data + parity` equally sized buffers; the
    /// parity buffers are overwritten.
    pub fn encode<T>(&self, shards: &mut [T]) -> RsResult<()>
    where
        T: AsRef<[u8]> + AsMut<[u8]>,
    {
        self.check_count(shards.len())?;
        let shard_len =
            common_shard_len(shards.iter().map(|s| Some(s.as_ref().len())))?.unwrap_or(0);

        let (data, parity) = shards.split_at_mut(self.data_shards);
        let inputs: ShardRefs = data.iter().map(AsRef::as_ref).collect();
        let mut outputs: ShardMuts = parity.iter_mut().map(AsMut::as_mut).collect();
        let rows = self.parity_rows(0..self.parity_shards);

        self.code_some_shards(&rows, &inputs, &mut outputs, shard_len);
        Ok(())
    }

    /// Check that the parity shards match the data shards.
    ///
    /// Returns `Ok(false)` if any shard is absent or any parity byte differs.
    /// Wrong shard counts and unequal lengths are errors. Never mutates.
    pub fn verify<S: ShardSlot>(&self, shards: &[S]) -> RsResult<bool> {
        self.check_count(shards.len())?;
        let shard_len = common_shard_len(shards.iter().map(|s| s.present().map(<[u8]>::len)))?;

        let present: Option<ShardRefs> = shards.iter().map(ShardSlot::present).collect();
        let Some(present) = present else {
            return Ok(false);
        };
        let shard_len = shard_len.unwrap_or(0);

        let (inputs, expected) = present.split_at(self.data_shards);
        let mut scratch = vec![vec![0u8; shard_len]; self.parity_shards];
        {
            let mut outputs: ShardMuts = scratch.iter_mut().map(Vec::as_mut_slice).collect();
            let rows = self.parity_rows(0..self.parity_shards);
            self.code_some_shards(&rows, inputs, &mut outputs, shard_len);
        }

        Ok(scratch
            .iter()
            .zip(expected)
            .all(|(computed, supplied)| computed.as_slice() == *supplied))
    }

    /// Rebuild every absent shard (`None`) in place.
    ///
    /// Needs at least `data` present shards; otherwise fails with
    /// [`RsError::TooManyErasures`] before touching anything. Present shards
    /// are left untouched.
    pub fn reconstruct(&self, shards: &mut [Option<Vec<u8>>]) -> RsResult<()> {
        self.reconstruct_internal(shards, false)
    }

    /// Rebuild only the absent data shards; absent parity stays absent
    pub fn reconstruct_data(&self, shards: &mut [Option<Vec<u8>>]) -> RsResult<()> {
        self.reconstruct_internal(shards, true)
    }

    /// Reconstruct using a presence bitmap instead of `Option` slots.
    ///
    /// Buffers whose `present` flag is false are replaced with rebuilt
    /// shards; their previous contents are ignored.
    pub fn reconstruct_with_mask(&self, shards: &mut [Vec<u8>], present: &[bool]) -> RsResult<()> {
        if present.len() != shards.len() {
            return Err(RsError::WrongShardCount {
                expected: shards.len(),
                actual: present.len(),
            });
        }

        let mut slots: Vec<Option<Vec<u8>>> = shards
            .iter_mut()
            .zip(present)
            .map(|(shard, &is_present)| is_present.then(|| std::mem::take(shard)))
            .collect();

        let result = self.reconstruct(&mut slots);

        for (shard, slot) in shards.iter_mut().zip(slots) {
            if let Some(buffer) = slot {
                *shard = buffer;
            }
        }
        result
    }

    /// Split a payload into data shards followed by zeroed parity buffers,
    /// ready for [`ReedSolomon::encode`]
    pub fn split(&self, payload: &[u8]) -> RsResult<Vec<Vec<u8>>> {
        let (mut shards, shard_len) = split::split(payload, self.data_shards)?;
        shards.extend((0..self.parity_shards).map(|_| vec![0u8; shard_len]));
        Ok(shards)
    }

    /// Concatenate the data shards and truncate to `original_len`
    pub fn join<S: ShardSlot>(&self, shards: &[S], original_len: usize) -> RsResult<Vec<u8>> {
        split::join(shards, self.data_shards, original_len)
    }

    fn reconstruct_internal(
        &self,
        shards: &mut [Option<Vec<u8>>],
        data_only: bool,
    ) -> RsResult<()> {
        self.check_count(shards.len())?;
        let shard_len = common_shard_len(shards.iter().map(|s| s.as_ref().map(Vec::len)))?;

        let total = self.total_shard_count();
        let present_count = shards.iter().filter(|s| s.is_some()).count();
        if present_count == total {
            return Ok(());
        }
        let shard_len = match shard_len {
            Some(len) if present_count >= self.data_shards => len,
            _ => {
                return Err(RsError::TooManyErasures {
                    missing: total - present_count,
                    max: self.parity_shards,
                })
            }
        };

        let missing_data: SmallVec<[usize; INLINE_SHARDS]> =
            (0..self.data_shards).filter(|&i| shards[i].is_none()).collect();
        let missing_parity: SmallVec<[usize; INLINE_SHARDS]> = (self.data_shards..total)
            .filter(|&i| shards[i].is_none())
            .collect();

        debug!(
            "Reconstructing {} data and {} parity shards of {} bytes",
            missing_data.len(),
            if data_only { 0 } else { missing_parity.len() },
            shard_len
        );

        if !missing_data.is_empty() {
            let recovered = {
                let (survivor_rows, inputs): (SmallVec<[usize; INLINE_SHARDS]>, ShardRefs) = shards
                    .iter()
                    .enumerate()
                    .filter_map(|(i, s)| s.as_deref().map(|buffer| (i, buffer)))
                    .take(self.data_shards)
                    .unzip();

                let decode = self.decode_matrix(&survivor_rows)?;
                let rows: ShardRefs = missing_data.iter().map(|&i| decode.row(i)).collect();
                self.code_into_new(&rows, &inputs, shard_len)
            };
            for (&index, buffer) in missing_data.iter().zip(recovered) {
                shards[index] = Some(buffer);
            }
        }

        if data_only || missing_parity.is_empty() {
            return Ok(());
        }

        let recovered = {
            let inputs: ShardRefs = shards[..self.data_shards]
                .iter()
                .filter_map(Option::as_deref)
                .collect();
            let rows = self.parity_rows(missing_parity.iter().map(|&i| i - self.data_shards));
            self.code_into_new(&rows, &inputs, shard_len)
        };
        for (&index, buffer) in missing_parity.iter().zip(recovered) {
            shards[index] = Some(buffer);
        }
        Ok(())
    }

    /// Inverse of the generator rows for `survivors`, cached per pattern
    fn decode_matrix(&self, survivors: &[usize]) -> RsResult<Arc<Matrix>> {
        // Indices are below 256, so one byte each identifies the pattern
        let key: SurvivorKey = survivors.iter().map(|&i| i as u8).collect();

        let caching = self.config.inversion_cache && self.config.cache_capacity > 0;
        if caching {
            match self.inversion_cache.read() {
                Ok(cache) => {
                    if let Some(matrix) = cache.get(&key) {
                        trace!("Decode matrix cache hit for rows {:?}", survivors);
                        return Ok(Arc::clone(matrix));
                    }
                }
                Err(_) => warn!("Inversion cache lock poisoned, inverting without cache"),
            }
        }

        let inverse = Arc::new(
            self.generator
                .select_rows(survivors)?
                .invert(&self.field)?,
        );
        debug!("Inverted decode matrix for surviving rows {:?}", survivors);

        if caching {
            match self.inversion_cache.write() {
                Ok(mut cache) => {
                    // Full cache is dropped wholesale
                    if cache.len() >= self.config.cache_capacity {
                        debug!("Inversion cache full ({} entries), clearing", cache.len());
                        cache.clear();
                    }
                    cache.insert(key, Arc::clone(&inverse));
                }
                Err(_) => warn!("Inversion cache lock poisoned, not caching decode matrix"),
            }
        }
        Ok(inverse)
    }

    fn parity_rows(&self, parity_indices: impl Iterator<Item = usize>) -> ShardRefs<'_> {
        parity_indices
            .map(|p| self.generator.row(self.data_shards + p))
            .collect()
    }

    fn check_count(&self, actual: usize) -> RsResult<()> {
        let expected = self.total_shard_count();
        if actual != expected {
            return Err(RsError::WrongShardCount { expected, actual });
        }
        Ok(())
    }

    /// Code `rows` over `inputs` into freshly allocated buffers
    fn code_into_new(&self, rows: &[&[u8]], inputs: &[&[u8]], shard_len: usize) -> Vec<Vec<u8>> {
        let mut buffers = vec![vec![0u8; shard_len]; rows.len()];
        {
            let mut outputs: ShardMuts = buffers.iter_mut().map(Vec::as_mut_slice).collect();
            self.code_some_shards(rows, inputs, &mut outputs, shard_len);
        }
        buffers
    }

    /// `outputs[i] = Σ_j rows[i][j] · inputs[j]`
    fn code_some_shards(
        &self,
        rows: &[&[u8]],
        inputs: &[&[u8]],
        outputs: &mut [&mut [u8]],
        shard_len: usize,
    ) {
        if outputs.is_empty() || shard_len == 0 {
            return;
        }

        let threads = self.config.effective_threads();
        if threads > 1 && shard_len >= self.config.min_split_len {
            match &self.pool {
                Some(pool) => {
                    pool.install(|| self.code_parallel(rows, inputs, outputs, shard_len, threads))
                }
                None => self.code_parallel(rows, inputs, outputs, shard_len, threads),
            }
        } else {
            code_serial(&self.field, rows, inputs, outputs);
        }
    }

    /// Split every shard into the same byte ranges and code the ranges in parallel
    fn code_parallel(
        &self,
        rows: &[&[u8]],
        inputs: &[&[u8]],
        outputs: &mut [&mut [u8]],
        shard_len: usize,
        threads: usize,
    ) {
        let chunk = shard_len
            .div_ceil(threads)
            .max(self.config.min_split_len / 2)
            .next_multiple_of(SPLIT_ALIGN);
        let chunk_count = shard_len.div_ceil(chunk);
        trace!(
            "Coding {} outputs in {} chunks of {} bytes",
            outputs.len(),
            chunk_count,
            chunk
        );

        let mut per_chunk: Vec<ShardMuts> = (0..chunk_count).map(|_| SmallVec::new()).collect();
        for output in outputs.iter_mut() {
            for (c, piece) in output.chunks_mut(chunk).enumerate() {
                per_chunk[c].push(piece);
            }
        }

        let field = &*self.field;
        per_chunk
            .into_par_iter()
            .enumerate()
            .for_each(|(c, mut pieces)| {
                let start = c * chunk;
                let end = (start + chunk).min(shard_len);
                let slices: ShardRefs = inputs.iter().map(|input| &input[start..end]).collect();
                code_serial(field, rows, &slices, &mut pieces);
            });
    }
}

/// Single-threaded matrix-times-shards kernel
fn code_serial(field: &GaloisField, rows: &[&[u8]], inputs: &[&[u8]], outputs: &mut [&mut [u8]]) {
    for (row, output) in rows.iter().zip(outputs.iter_mut()) {
        for (j, (&coefficient, input)) in row.iter().zip(inputs).enumerate() {
            let op = if j == 0 { WriteOp::Direct } else { WriteOp::Add };
            process_slice_multiply(input, output, field.mul_row(coefficient), op);
        }
    }
}

impl fmt::Debug for ReedSolomon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReedSolomon")
            .field("data_shards", &self.data_shards)
            .field("parity_shards", &self.parity_shards)
            .field("field", &self.field)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
