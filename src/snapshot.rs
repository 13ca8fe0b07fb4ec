//! Portable persisted form of a [`crate::BloomFilter`].
//!
//! Layout, all integers little-endian:
//!
//! | field          | size                 |
//! |----------------|----------------------|
//! | `m`            | `u32`                |
//! | `k`            | `u32`                |
//! | `number_added` | `u32`                |
//! | bit data       | `ceil(m / 8)` bytes  |
//!
//! Bit `i` is stored in byte `i / 8` at position `i % 8`, least significant
//! bit first.

use crate::error::{BloomError, Result};
use bincode::{
    Decode, Encode,
    config::{self, Config},
    de::{Decoder, read::Reader},
    enc::{Encoder, write::Writer},
    error::{DecodeError, EncodeError},
};

/// Size of the fixed header in bytes.
pub const HEADER_LEN: usize = 12;

fn snapshot_config() -> impl Config {
    config::standard()
        .with_little_endian()
        .with_fixed_int_encoding()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSnapshot {
    pub bit_array_size: u32,
    pub num_hashes: u32,
    pub number_added: u32,
    pub bits: Vec<u8>,
}

impl FilterSnapshot {
    /// Number of bit-data bytes for a bit array of `bit_array_size` bits.
    pub fn data_len(bit_array_size: u32) -> usize {
        (bit_array_size as usize).div_ceil(8)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.check_data_len()?;
        Ok(bincode::encode_to_vec(self, snapshot_config())?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(BloomError::InvalidSnapshot(format!(
                "record is {} bytes, header alone needs {}",
                bytes.len(),
                HEADER_LEN
            )));
        }

        let (snapshot, read): (Self, usize) =
            bincode::decode_from_slice(bytes, snapshot_config())?;
        if read != bytes.len() {
            return Err(BloomError::InvalidSnapshot(format!(
                "{} trailing bytes after bit data",
                bytes.len() - read
            )));
        }
        Ok(snapshot)
    }

    fn check_data_len(&self) -> Result<()> {
        let expected = Self::data_len(self.bit_array_size);
        if self.bits.len() != expected {
            return Err(BloomError::InvalidSnapshot(format!(
                "expected {} bytes of bit data for {} bits, got {}",
                expected,
                self.bit_array_size,
                self.bits.len()
            )));
        }
        Ok(())
    }
}

impl Encode for FilterSnapshot {
    fn encode<E: Encoder>(
        &self,
        encoder: &mut E,
    ) -> std::result::Result<(), EncodeError> {
        self.bit_array_size.encode(encoder)?;
        self.num_hashes.encode(encoder)?;
        self.number_added.encode(encoder)?;
        // raw bytes, no length prefix: the length follows from m
        encoder.writer().write(&self.bits)
    }
}

impl<Context> Decode<Context> for FilterSnapshot {
    fn decode<D: Decoder<Context = Context>>(
        decoder: &mut D,
    ) -> std::result::Result<Self, DecodeError> {
        let bit_array_size = u32::decode(decoder)?;
        let num_hashes = u32::decode(decoder)?;
        let number_added = u32::decode(decoder)?;

        let len = Self::data_len(bit_array_size);
        decoder.claim_bytes_read(len)?;
        let mut bits = vec![0u8; len];
        decoder.reader().read(&mut bits)?;

        Ok(Self {
            bit_array_size,
            num_hashes,
            number_added,
            bits,
        })
    }
}
