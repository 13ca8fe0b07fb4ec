use crate::error::{BloomError, Result};
use bitvec::{bitvec, order::Lsb0, vec::BitVec};

/// Fixed-length packed bit vector backing a [`crate::BloomFilter`].
///
/// Bits are packed into machine words. The length is set at construction
/// and never changes.
#[derive(Clone, PartialEq, Eq)]
pub struct BitStorage {
    bits: BitVec<usize, Lsb0>,
}

impl BitStorage {
    /// All-zero storage of `len` bits.
    pub fn new(len: usize) -> Self {
        Self {
            bits: bitvec![usize, Lsb0; 0; len],
        }
    }

    /// Rebuilds storage of `len` bits from the packed byte layout produced by
    /// [`BitStorage::to_bytes`].
    ///
    /// `bytes` must hold exactly `ceil(len / 8)` bytes. Padding bits past
    /// `len` in the last byte are ignored.
    pub fn from_bytes(len: usize, bytes: &[u8]) -> Result<Self> {
        let expected = len.div_ceil(8);
        if bytes.len() != expected {
            return Err(BloomError::InvalidSnapshot(format!(
                "expected {} bytes of bit data for {} bits, got {}",
                expected,
                len,
                bytes.len()
            )));
        }

        let mut storage = Self::new(len);
        for (byte_idx, &byte) in bytes.iter().enumerate() {
            if byte == 0 {
                continue;
            }
            for bit in 0..8 {
                let index = byte_idx * 8 + bit;
                if index >= len {
                    break;
                }
                if byte & (1 << bit) != 0 {
                    storage.bits.set(index, true);
                }
            }
        }
        Ok(storage)
    }

    /// Packed bytes: bit `i` lives in byte `i / 8` at position `i % 8`
    /// (least significant bit first). Padding bits are zero.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = vec![0u8; self.bits.len().div_ceil(8)];
        for index in self.bits.iter_ones() {
            bytes[index / 8] |= 1 << (index % 8);
        }
        bytes
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<bool> {
        self.check_index(index)?;
        Ok(self.bits[index])
    }

    pub fn set(&mut self, index: usize, value: bool) -> Result<()> {
        self.check_index(index)?;
        self.bits.set(index, value);
        Ok(())
    }

    /// Unchecked variants for indices already reduced modulo the length.
    /// Panics when `index >= len`.
    pub(crate) fn set_one(&mut self, index: usize) {
        self.bits.set(index, true);
    }

    pub(crate) fn is_set(&self, index: usize) -> bool {
        self.bits[index]
    }

    /// Zeroes every bit; the length is unchanged.
    pub fn clear_all(&mut self) {
        self.bits.fill(false);
    }

    /// Number of bits currently set.
    pub fn count_ones(&self) -> usize {
        self.bits.count_ones()
    }

    /// Size of the packed words in bytes.
    pub fn memory_usage(&self) -> usize {
        self.bits.as_raw_slice().len() * std::mem::size_of::<usize>()
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.bits.len() {
            return Err(BloomError::IndexOutOfBounds {
                index,
                capacity: self.bits.len(),
            });
        }
        Ok(())
    }
}

impl std::fmt::Debug for BitStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "BitStorage {{ len: {}, ones: {} }}",
            self.len(),
            self.count_ones()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_storage_is_zeroed() {
        let storage = BitStorage::new(100);
        assert_eq!(storage.len(), 100);
        assert_eq!(storage.count_ones(), 0);
        assert!((0..100).all(|i| !storage.get(i).unwrap()));
    }

    #[test]
    fn test_set_get_and_clear() {
        let mut storage = BitStorage::new(130);
        storage.set(0, true).unwrap();
        storage.set(64, true).unwrap();
        storage.set(129, true).unwrap();

        assert!(storage.get(0).unwrap());
        assert!(storage.get(64).unwrap());
        assert!(storage.get(129).unwrap());
        assert!(!storage.get(1).unwrap());
        assert_eq!(storage.count_ones(), 3);

        storage.set(64, false).unwrap();
        assert!(!storage.get(64).unwrap());

        storage.clear_all();
        assert_eq!(storage.count_ones(), 0);
        assert_eq!(storage.len(), 130);
    }

    #[test]
    fn test_out_of_range_index() {
        let mut storage = BitStorage::new(10);
        assert!(matches!(
            storage.get(10),
            Err(BloomError::IndexOutOfBounds {
                index: 10,
                capacity: 10
            })
        ));
        assert!(storage.set(11, true).is_err());
    }

    #[test]
    fn test_storage_is_packed() {
        let storage = BitStorage::new(1024);
        assert_eq!(storage.memory_usage(), 1024 / 8);
    }

    #[test]
    fn test_byte_layout_is_lsb_first() {
        let mut storage = BitStorage::new(12);
        storage.set(0, true).unwrap();
        storage.set(3, true).unwrap();
        storage.set(9, true).unwrap();

        assert_eq!(storage.to_bytes(), vec![0b0000_1001, 0b0000_0010]);
    }

    #[test]
    fn test_from_bytes_restores_bits() {
        let restored = BitStorage::from_bytes(12, &[0b0000_1001, 0b0000_0010])
            .expect("valid layout");
        assert!(restored.get(0).unwrap());
        assert!(restored.get(3).unwrap());
        assert!(restored.get(9).unwrap());
        assert_eq!(restored.count_ones(), 3);
    }

    #[test]
    fn test_from_bytes_ignores_padding_bits() {
        // bits 12..16 are padding for a 12-bit storage
        let restored = BitStorage::from_bytes(12, &[0, 0b1111_0000]).unwrap();
        assert_eq!(restored.count_ones(), 0);
    }

    #[test]
    fn test_from_bytes_rejects_wrong_length() {
        assert!(matches!(
            BitStorage::from_bytes(12, &[0]),
            Err(BloomError::InvalidSnapshot(_))
        ));
        assert!(BitStorage::from_bytes(8, &[0, 0]).is_err());
    }
}
