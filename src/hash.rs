use encoding_rs::Encoding;
use std::f64::consts::LN_2;

/// A type alias for the hash function used in the Bloom filter.
///
/// This function takes an input item and computes multiple hash indices
/// for the Bloom filter's bit vector.
///
/// **Parameters:**
///
/// - `item: &[u8]`
///   - A byte slice representing the item to be hashed.
/// - `num_hashes: usize`
///   - The number of hash values to compute for the item.
/// - `bound: usize`
///   - The size of the Bloom filter's bit vector. This ensures that
///     the generated hash indices are within valid bounds.
///
/// **Returns:**
///
/// - `Vec<u32>`
///   - A vector of hash indices corresponding to positions in the bit vector.
///
/// The same `(item, num_hashes, bound)` must always produce the same indices,
/// otherwise membership answers and persisted snapshots become meaningless.
pub type HashFunction = fn(&[u8], usize, usize) -> Vec<u32>;

const FNV_OFFSET_BASIS: u32 = 2_166_136_261;
const FNV_PRIME: u32 = 16_777_619;

const LCG_MULTIPLIER: u64 = 0x5_DEEC_E66D;
const LCG_ADDEND: u64 = 0xB;
const LCG_MASK: u64 = (1 << 48) - 1;
/// Keeps the top 30 bits of the 48-bit LCG state.
const LCG_SHIFT: u32 = 48 - 30;

/// Seed used when the base hash is `i32::MIN`, which has no absolute value.
const MIN_HASH_FALLBACK_SEED: u64 = 42;

/// 32-bit FNV-1 (multiply, then xor) over `data`.
///
/// The empty input hashes to the offset basis.
pub fn hash_fnv1_32(data: &[u8]) -> u32 {
    data.iter().fold(FNV_OFFSET_BASIS, |acc, &byte| {
        acc.wrapping_mul(FNV_PRIME) ^ u32::from(byte)
    })
}

/// Turns a base hash into a non-negative LCG seed.
///
/// The hash is read as a signed 32-bit value and its absolute value taken.
/// `i32::MIN` maps to a fixed fallback seed.
pub fn seed_from_hash(hash: u32) -> u64 {
    match (hash as i32).checked_abs() {
        Some(value) => value as u64,
        None => MIN_HASH_FALLBACK_SEED,
    }
}

/// Iterator over the raw 30-bit values of the LCG expansion.
///
/// Produced by [`expand`]. Values are not reduced to a bit-array length.
#[derive(Debug, Clone)]
pub struct LcgIndices {
    seed: u64,
    remaining: usize,
}

impl Iterator for LcgIndices {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        self.seed = self
            .seed
            .wrapping_mul(LCG_MULTIPLIER)
            .wrapping_add(LCG_ADDEND)
            & LCG_MASK;
        Some((self.seed >> LCG_SHIFT) as u32)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for LcgIndices {}

/// Expands `data` into `num_hashes` pseudo-random 30-bit values.
///
/// A single FNV-1 hash seeds a 48-bit linear congruential generator which is
/// stepped once per value. Output is a pure function of `(data, num_hashes)`.
pub fn expand(data: &[u8], num_hashes: usize) -> LcgIndices {
    LcgIndices {
        seed: seed_from_hash(hash_fnv1_32(data)),
        remaining: num_hashes,
    }
}

/// Default index function: [`expand`] reduced modulo `bound`.
pub fn default_hash_function(
    item: &[u8],
    num_hashes: usize,
    bound: usize,
) -> Vec<u32> {
    // bound is validated >= 1 by every filter constructor
    let bound = bound.max(1) as u64;
    expand(item, num_hashes)
        .map(|value| (u64::from(value) % bound) as u32)
        .collect()
}

/// Single derived value for `data` (one round of the expansion, unreduced).
pub fn create_hash(data: &[u8]) -> u32 {
    expand(data, 1).next().unwrap_or_default()
}

/// [`create_hash`] over the UTF-8 bytes of `value`.
pub fn create_hash_str(value: &str) -> u32 {
    create_hash(value.as_bytes())
}

/// [`create_hash`] over `value` encoded with `encoding`.
///
/// Characters the encoding cannot represent are replaced with numeric
/// character references, as `encoding_rs` does for every encoder.
pub fn create_hash_with_encoding(
    value: &str,
    encoding: &'static Encoding,
) -> u32 {
    let (bytes, _, _) = encoding.encode(value);
    create_hash(&bytes)
}

/// `k = ceil(-log2(p))`, the hash rounds needed for false positive rate `p`.
pub fn num_hashes_for_rate(fpr: f64) -> usize {
    (-(fpr.ln() / LN_2)).ceil() as usize
}

/// `c = k / ln(2)`, the bits per element that make `k` rounds optimal.
pub fn bits_per_element_for_hashes(num_hashes: usize) -> f64 {
    num_hashes as f64 / LN_2
}

/// `k = round(m / n * ln(2))`.
pub fn optimal_num_hashes(n: usize, m: usize) -> usize {
    ((m as f64 / n as f64) * LN_2).round() as usize
}

/// `m = ceil(c * n)`.
pub fn bit_array_size(bits_per_element: f64, n: usize) -> usize {
    (bits_per_element * n as f64).ceil() as usize
}

/// `(1 - e^(-k * count / m))^k`
pub fn false_positive_probability(
    num_hashes: usize,
    bit_array_size: usize,
    count: f64,
) -> f64 {
    let k = num_hashes as f64;
    (1.0 - (-k * count / bit_array_size as f64).exp()).powf(k)
}
