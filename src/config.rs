use crate::error::{BloomError, Result};
use crate::hash::{
    HashFunction, bit_array_size, bits_per_element_for_hashes,
    default_hash_function, num_hashes_for_rate, optimal_num_hashes,
};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// How the bit array and number of hash rounds are derived.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Sizing {
    /// Target false positive probability `p` in `(0, 1)`.
    /// `k = ceil(-log2(p))`, `c = k / ln(2)`.
    FalsePositiveRate(f64),
    /// Fixed memory budget of `m` bits.
    /// `c = m / n`, `k = round(c * ln(2))`.
    BitArraySize(usize),
    /// Explicit bits per element and hash rounds.
    BitsPerElement {
        bits_per_element: f64,
        num_hashes: usize,
    },
}

#[derive(Clone, Debug, Builder, Serialize, Deserialize)]
#[builder(pattern = "owned")]
pub struct BloomConfig {
    /// Expected number of elements
    #[builder(default = "1_000_000")]
    pub capacity: usize,

    /// Parameter derivation mode
    #[builder(default = "Sizing::FalsePositiveRate(0.01)")]
    pub sizing: Sizing,

    /// Hash function to use
    #[builder(default = "default_hash_function")]
    #[serde(skip, default = "default_hash_fn")]
    pub hash_function: HashFunction,
}

fn default_hash_fn() -> HashFunction {
    default_hash_function
}

impl BloomConfig {
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(BloomError::ZeroCapacity);
        }
        match self.sizing {
            Sizing::FalsePositiveRate(rate) => {
                if !(rate > 0.0 && rate < 1.0) {
                    return Err(BloomError::InvalidFalsePositiveRate { rate });
                }
            }
            Sizing::BitArraySize(0) => {
                return Err(BloomError::InvalidConfig(
                    "Bit array size must be > 0".into(),
                ));
            }
            Sizing::BitArraySize(_) => {}
            Sizing::BitsPerElement {
                bits_per_element,
                num_hashes,
            } => {
                check_bits_per_element(bits_per_element)?;
                if num_hashes == 0 {
                    return Err(BloomError::ZeroHashes);
                }
            }
        }
        Ok(())
    }
}

fn check_bits_per_element(bits_per_element: f64) -> Result<()> {
    if !(bits_per_element.is_finite() && bits_per_element > 0.0) {
        return Err(BloomError::InvalidBitsPerElement { bits_per_element });
    }
    Ok(())
}

/// Derived parameters calculated from BloomConfig
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BloomParams {
    /// `m`
    pub bit_array_size: usize,
    /// `n`
    pub expected_elements: usize,
    /// `c`
    pub bits_per_element: f64,
    /// `k`
    pub num_hashes: usize,
}

impl BloomParams {
    /// `m = ceil(c * n)` with `c`, `n` and `k` given directly.
    pub fn from_bits_per_element(
        bits_per_element: f64,
        expected_elements: usize,
        num_hashes: usize,
    ) -> Result<Self> {
        check_bits_per_element(bits_per_element)?;
        if expected_elements == 0 {
            return Err(BloomError::ZeroCapacity);
        }
        if num_hashes == 0 {
            return Err(BloomError::ZeroHashes);
        }

        let bit_array_size = bit_array_size(bits_per_element, expected_elements);
        if bit_array_size == 0 {
            return Err(BloomError::InvalidConfig(
                "Bit array size must be > 0".into(),
            ));
        }

        Ok(Self {
            bit_array_size,
            expected_elements,
            bits_per_element,
            num_hashes,
        })
    }

    /// Derives `c` and `k` from a memory budget of `m` bits.
    pub fn from_bit_array_size(
        bit_array_size: usize,
        expected_elements: usize,
    ) -> Result<Self> {
        if expected_elements == 0 {
            return Err(BloomError::ZeroCapacity);
        }
        let bits_per_element = bit_array_size as f64 / expected_elements as f64;
        let num_hashes = optimal_num_hashes(expected_elements, bit_array_size);
        let params = Self::from_bits_per_element(
            bits_per_element,
            expected_elements,
            num_hashes,
        )?;
        // ceil(m / n * n) can drift past m in floating point
        Ok(Self {
            bit_array_size,
            ..params
        })
    }

    /// Derives `k` and `c` from a target false positive probability.
    pub fn from_false_positive_rate(
        rate: f64,
        expected_elements: usize,
    ) -> Result<Self> {
        if !(rate > 0.0 && rate < 1.0) {
            return Err(BloomError::InvalidFalsePositiveRate { rate });
        }
        let num_hashes = num_hashes_for_rate(rate);
        Self::from_bits_per_element(
            bits_per_element_for_hashes(num_hashes),
            expected_elements,
            num_hashes,
        )
    }
}

impl TryFrom<&BloomConfig> for BloomParams {
    type Error = BloomError;

    fn try_from(config: &BloomConfig) -> Result<Self> {
        config.validate()?;
        match config.sizing {
            Sizing::FalsePositiveRate(rate) => {
                Self::from_false_positive_rate(rate, config.capacity)
            }
            Sizing::BitArraySize(m) => {
                Self::from_bit_array_size(m, config.capacity)
            }
            Sizing::BitsPerElement {
                bits_per_element,
                num_hashes,
            } => Self::from_bits_per_element(
                bits_per_element,
                config.capacity,
                num_hashes,
            ),
        }
    }
}
