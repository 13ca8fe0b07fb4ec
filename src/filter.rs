use crate::config::{BloomConfig, BloomParams};
use crate::error::{BloomError, Result};
use crate::hash::{
    HashFunction, default_hash_function, false_positive_probability,
    optimal_num_hashes,
};
use crate::snapshot::FilterSnapshot;
use crate::storage::BitStorage;
use tracing::{debug, trace, warn};

/// A Bloom filter over raw byte sequences.
///
/// `contains` never reports a false negative for bytes passed to `add` since
/// the last `clear`. Positive answers are correct with the probability given
/// by [`BloomFilter::false_positive_probability`].
///
/// Not synchronised: share it behind a lock if several threads need it.
#[derive(Clone)]
pub struct BloomFilter {
    params: BloomParams,
    hash_function: HashFunction,
    bits: BitStorage,
    insert_count: usize,
}

impl BloomFilter {
    pub fn new(config: BloomConfig) -> Result<Self> {
        let params = BloomParams::try_from(&config)?;
        Ok(Self::from_params(params, config.hash_function))
    }

    /// `m = ceil(c * n)` bits, `k` hash rounds.
    pub fn with_bits_per_element(
        bits_per_element: f64,
        expected_elements: usize,
        num_hashes: usize,
    ) -> Result<Self> {
        let params = BloomParams::from_bits_per_element(
            bits_per_element,
            expected_elements,
            num_hashes,
        )?;
        Ok(Self::from_params(params, default_hash_function))
    }

    /// Fixed budget of `m` bits; `k` is chosen to be optimal for `n`.
    pub fn with_bit_array_size(
        bit_array_size: usize,
        expected_elements: usize,
    ) -> Result<Self> {
        let params =
            BloomParams::from_bit_array_size(bit_array_size, expected_elements)?;
        Ok(Self::from_params(params, default_hash_function))
    }

    /// Sized for a target false positive probability at `n` elements.
    pub fn with_false_positive_rate(
        rate: f64,
        expected_elements: usize,
    ) -> Result<Self> {
        let params =
            BloomParams::from_false_positive_rate(rate, expected_elements)?;
        Ok(Self::from_params(params, default_hash_function))
    }

    /// Rebuilds a filter from persisted bit data.
    ///
    /// `k` is recomputed from `(m, n)` exactly like
    /// [`BloomFilter::with_bit_array_size`], so the data must come from a
    /// filter sized the same way. Use [`BloomFilter::restore_snapshot`] when
    /// `k` was persisted.
    pub fn restore(
        bit_array_size: usize,
        expected_elements: usize,
        number_added: usize,
        bit_data: &[u8],
    ) -> Result<Self> {
        let params =
            BloomParams::from_bit_array_size(bit_array_size, expected_elements)?;
        let bits = BitStorage::from_bytes(bit_array_size, bit_data)?;
        debug!(
            bit_array_size,
            num_hashes = params.num_hashes,
            number_added,
            "Restored bloom filter"
        );
        Ok(Self {
            params,
            hash_function: default_hash_function,
            bits,
            insert_count: number_added,
        })
    }

    /// Rebuilds a filter from a snapshot, using the persisted `k` as is.
    pub fn restore_snapshot(
        snapshot: &FilterSnapshot,
        expected_elements: usize,
    ) -> Result<Self> {
        if expected_elements == 0 {
            return Err(BloomError::ZeroCapacity);
        }
        if snapshot.bit_array_size == 0 {
            return Err(BloomError::InvalidSnapshot(
                "bit array size is 0".into(),
            ));
        }
        if snapshot.num_hashes == 0 {
            return Err(BloomError::ZeroHashes);
        }

        let bit_array_size = snapshot.bit_array_size as usize;
        let num_hashes = snapshot.num_hashes as usize;
        let bits = BitStorage::from_bytes(bit_array_size, &snapshot.bits)?;

        let derived = optimal_num_hashes(expected_elements, bit_array_size);
        if derived != num_hashes {
            warn!(
                persisted = num_hashes,
                derived,
                expected_elements,
                "Snapshot hash rounds differ from the (m, n) derivation"
            );
        }

        debug!(
            bit_array_size,
            num_hashes,
            number_added = snapshot.number_added,
            "Restored bloom filter from snapshot"
        );

        Ok(Self {
            params: BloomParams {
                bit_array_size,
                expected_elements,
                bits_per_element: bit_array_size as f64
                    / expected_elements as f64,
                num_hashes,
            },
            hash_function: default_hash_function,
            bits,
            insert_count: snapshot.number_added as usize,
        })
    }

    /// Decodes a persisted record and restores it.
    pub fn from_bytes(bytes: &[u8], expected_elements: usize) -> Result<Self> {
        let snapshot = FilterSnapshot::from_bytes(bytes)?;
        Self::restore_snapshot(&snapshot, expected_elements)
    }

    fn from_params(params: BloomParams, hash_function: HashFunction) -> Self {
        debug!(
            bit_array_size = params.bit_array_size,
            num_hashes = params.num_hashes,
            bits_per_element = params.bits_per_element,
            expected_elements = params.expected_elements,
            "Created bloom filter"
        );
        Self {
            bits: BitStorage::new(params.bit_array_size),
            params,
            hash_function,
            insert_count: 0,
        }
    }

    fn indices(&self, item: &[u8]) -> impl Iterator<Item = usize> + use<> {
        let m = self.params.bit_array_size;
        (self.hash_function)(item, self.params.num_hashes, m)
            .into_iter()
            .map(move |idx| idx as usize % m)
    }

    /// Sets the `k` bits for `item`. Every call counts, duplicates included.
    pub fn add(&mut self, item: &[u8]) {
        for idx in self.indices(item) {
            self.bits.set_one(idx);
        }
        self.insert_count += 1;
    }

    /// `false` means `item` was definitely never added.
    pub fn contains(&self, item: &[u8]) -> bool {
        self.indices(item).all(|idx| self.bits.is_set(idx))
    }

    /// Zeroes every bit and resets the counter; parameters are kept.
    pub fn clear(&mut self) {
        self.bits.clear_all();
        self.insert_count = 0;
        trace!("Cleared bloom filter");
    }

    pub fn get_bit(&self, index: usize) -> Result<bool> {
        self.bits.get(index)
    }

    pub fn set_bit(&mut self, index: usize, value: bool) -> Result<()> {
        self.bits.set(index, value)
    }

    /// Number of bits, `m`.
    pub fn size(&self) -> usize {
        self.params.bit_array_size
    }

    /// Number of `add` calls since construction or the last `clear`.
    pub fn count(&self) -> usize {
        self.insert_count
    }

    pub fn expected_elements(&self) -> usize {
        self.params.expected_elements
    }

    pub fn expected_bits_per_element(&self) -> f64 {
        self.params.bits_per_element
    }

    /// Actual bits per added element, `m / count`.
    ///
    /// `None` while nothing has been added.
    pub fn bits_per_element(&self) -> Option<f64> {
        if self.insert_count == 0 {
            return None;
        }
        Some(self.params.bit_array_size as f64 / self.insert_count as f64)
    }

    pub fn num_hashes(&self) -> usize {
        self.params.num_hashes
    }

    pub fn params(&self) -> &BloomParams {
        &self.params
    }

    pub fn bits(&self) -> &BitStorage {
        &self.bits
    }

    pub fn count_ones(&self) -> usize {
        self.bits.count_ones()
    }

    /// Estimated false positive probability once `n` elements are added.
    pub fn expected_false_positive_probability(&self) -> f64 {
        self.false_positive_probability_for(self.params.expected_elements)
    }

    /// Estimated false positive probability at the current count.
    pub fn false_positive_probability(&self) -> f64 {
        self.false_positive_probability_for(self.insert_count)
    }

    /// `(1 - e^(-k * count / m))^k`
    pub fn false_positive_probability_for(&self, count: usize) -> f64 {
        false_positive_probability(
            self.params.num_hashes,
            self.params.bit_array_size,
            count as f64,
        )
    }

    /// Exports `m`, `k`, the counter and the packed bits.
    ///
    /// Fails when a value does not fit the record's 32-bit fields.
    pub fn snapshot(&self) -> Result<FilterSnapshot> {
        let to_u32 = |value: usize, what: &str| {
            u32::try_from(value).map_err(|_| {
                BloomError::SerializationError(format!(
                    "{what} {value} does not fit in 32 bits"
                ))
            })
        };

        Ok(FilterSnapshot {
            bit_array_size: to_u32(self.params.bit_array_size, "bit array size")?,
            num_hashes: to_u32(self.params.num_hashes, "hash rounds")?,
            number_added: to_u32(self.insert_count, "number added")?,
            bits: self.bits.to_bytes(),
        })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.snapshot()?.to_bytes()
    }
}

impl std::fmt::Debug for BloomFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "BloomFilter {{ bit_array_size: {}, num_hashes: {}, expected_elements: {}, bits_per_element: {:.3}, count: {} }}",
            self.params.bit_array_size,
            self.params.num_hashes,
            self.params.expected_elements,
            self.params.bits_per_element,
            self.insert_count
        )
    }
}
