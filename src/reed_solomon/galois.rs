//! Galois Field GF(2^8) arithmetic for Reed-Solomon erasure coding
//!
//! ## Field Polynomial
//!
//! The default field is built from the primitive polynomial **0x11D**
//! (x⁸ + x⁴ + x³ + x² + 1) with generator 2. Other primitive degree-8
//! polynomials can be supplied through [`GaloisField::with_polynomial`].
//!
//! ## Tables
//!
//! A [`GaloisField`] owns its log/antilog tables and a full 256x256
//! multiplication table. It is an ordinary immutable value: build it once,
//! wrap it in an `Arc` and share it between the matrix engine and any number
//! of codecs.
//!
//! Addition and subtraction are both XOR.

use super::error::{RsError, RsResult};
use super::scalar::{process_slice_multiply, WriteOp};
use std::fmt;

/// GF(2^8) polynomial: 0x11D (x⁸ + x⁴ + x³ + x² + 1)
pub const DEFAULT_POLYNOMIAL: u32 = 0x11D;

const COUNT: usize = 256;
const LIMIT: usize = COUNT - 1;

/// GF(2^8) lookup tables
pub struct GaloisField {
    polynomial: u32,
    log: [u8; COUNT],
    /// Doubled so that `log[a] + log[b]` indexes without a modulo
    antilog: [u8; 2 * COUNT],
    /// `mul[a][b] = a * b`
    mul: Box<[[u8; COUNT]]>,
}

impl Default for GaloisField {
    fn default() -> Self {
        Self::new()
    }
}

impl GaloisField {
    /// Build the field for [`DEFAULT_POLYNOMIAL`]
    pub fn new() -> Self {
        Self::build(DEFAULT_POLYNOMIAL).0
    }

    /// Build the field for an arbitrary degree-8 polynomial.
    ///
    /// Fails with [`RsError::InvalidPolynomial`] unless 2 generates all 255
    /// non-zero elements under `polynomial`.
    pub fn with_polynomial(polynomial: u32) -> RsResult<Self> {
        if !(0x100..0x200).contains(&polynomial) {
            return Err(RsError::InvalidPolynomial(polynomial));
        }
        match Self::build(polynomial) {
            (field, true) => Ok(field),
            (_, false) => Err(RsError::InvalidPolynomial(polynomial)),
        }
    }

    /// Returns the tables plus whether 2 cycled through the full group
    fn build(polynomial: u32) -> (Self, bool) {
        let mut log = [0u8; COUNT];
        let mut antilog = [0u8; 2 * COUNT];
        let mut primitive = true;

        let mut b = 1u32;
        for l in 0..LIMIT {
            if l > 0 && b == 1 {
                primitive = false;
            }
            log[b as usize] = l as u8;
            antilog[l] = b as u8;
            antilog[l + LIMIT] = b as u8;

            b <<= 1;
            if b & COUNT as u32 != 0 {
                b ^= polynomial;
            }
        }
        if b != 1 {
            primitive = false;
        }

        let mut mul = vec![[0u8; COUNT]; COUNT].into_boxed_slice();
        for a in 1..COUNT {
            let log_a = log[a] as usize;
            for (b, slot) in mul[a].iter_mut().enumerate().skip(1) {
                *slot = antilog[log_a + log[b] as usize];
            }
        }

        let field = Self {
            polynomial,
            log,
            antilog,
            mul,
        };
        (field, primitive)
    }

    /// The reduction polynomial this field was built from
    pub fn polynomial(&self) -> u32 {
        self.polynomial
    }

    /// Addition (XOR)
    #[inline]
    pub fn add(a: u8, b: u8) -> u8 {
        a ^ b
    }

    #[inline]
    pub fn mul(&self, a: u8, b: u8) -> u8 {
        self.mul[a as usize][b as usize]
    }

    /// Division; fails with [`RsError::DivisionByZero`] when `b == 0`
    #[inline]
    pub fn div(&self, a: u8, b: u8) -> RsResult<u8> {
        if b == 0 {
            return Err(RsError::DivisionByZero);
        }
        if a == 0 {
            return Ok(0);
        }
        let log_diff = self.log[a as usize] as usize + LIMIT - self.log[b as usize] as usize;
        Ok(self.antilog[log_diff])
    }

    /// Power operation, with `0^0 = 1`
    pub fn exp(&self, a: u8, power: usize) -> u8 {
        if power == 0 {
            return 1;
        }
        if a == 0 {
            return 0;
        }
        let log_a = self.log[a as usize] as usize;
        self.antilog[(log_a * (power % LIMIT)) % LIMIT]
    }

    /// Multiplicative inverse; fails with [`RsError::DivisionByZero`] for 0
    #[inline]
    pub fn inv(&self, a: u8) -> RsResult<u8> {
        self.div(1, a)
    }

    /// The row of the multiplication table for `coefficient`
    #[inline]
    pub fn mul_row(&self, coefficient: u8) -> &[u8; COUNT] {
        &self.mul[coefficient as usize]
    }

    /// `output = coefficient * input`
    pub fn mul_slice(&self, coefficient: u8, input: &[u8], output: &mut [u8]) {
        process_slice_multiply(input, output, self.mul_row(coefficient), WriteOp::Direct);
    }

    /// `output ^= coefficient * input`
    pub fn mul_slice_add(&self, coefficient: u8, input: &[u8], output: &mut [u8]) {
        process_slice_multiply(input, output, self.mul_row(coefficient), WriteOp::Add);
    }
}

impl fmt::Debug for GaloisField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GaloisField")
            .field("polynomial", &format_args!("{:#x}", self.polynomial))
            .finish_non_exhaustive()
    }
}
