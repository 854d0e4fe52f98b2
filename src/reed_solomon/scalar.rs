//! Scalar GF(2^8) slice kernels for Reed-Solomon
//!
//! Every encode, verify and reconstruct call spends nearly all of its time in
//! [`process_slice_multiply`]: multiply a whole shard by one matrix
//! coefficient and either store or XOR-accumulate the result.
//!
//! ## Key Components
//!
//! - **`WriteOp`**: Operation mode (direct write vs XOR accumulate)
//! - **Multiplication rows**: the 256-entry row of the field's multiplication
//!   table for one coefficient, so each byte costs a single lookup
//!
//! The loops are kept simple so the compiler can unroll and vectorize them
//! for the target; results never depend on how wide that ends up being.

/// Specifies how to combine the multiplication result with the output buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOp {
    /// Direct write: output = coefficient * input (replaces contents)
    Direct,
    /// Accumulate: output = output XOR (coefficient * input)
    Add,
}

/// Multiply `input` by the coefficient whose table row is `row`
///
/// Processes `min(input.len(), output.len())` bytes. Rows for 0 and 1 are
/// recognised from the table itself (`row[1]` is the coefficient) and take
/// the fill/copy/XOR fast paths.
#[inline]
pub fn process_slice_multiply(input: &[u8], output: &mut [u8], row: &[u8; 256], op: WriteOp) {
    let len = input.len().min(output.len());
    let input = &input[..len];
    let output = &mut output[..len];

    match (row[1], op) {
        (0, WriteOp::Direct) => output.fill(0),
        (0, WriteOp::Add) => {}
        (1, WriteOp::Direct) => output.copy_from_slice(input),
        (1, WriteOp::Add) => xor_slice(input, output),
        (_, WriteOp::Direct) => {
            for (out, &byte) in output.iter_mut().zip(input) {
                *out = row[byte as usize];
            }
        }
        (_, WriteOp::Add) => {
            for (out, &byte) in output.iter_mut().zip(input) {
                *out ^= row[byte as usize];
            }
        }
    }
}

/// `output ^= input` over the common prefix
#[inline]
pub fn xor_slice(input: &[u8], output: &mut [u8]) {
    for (out, &byte) in output.iter_mut().zip(input) {
        *out ^= byte;
    }
}
