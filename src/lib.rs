//! Compact Bloom filter over raw byte sequences.
//!
//! A Bloom filter answers "possibly present" or "definitely absent" for an
//! element using far less memory than an exact set.
//!
//! HowTo:
//!    * Sizing: pick a target false positive probability `p` and the expected
//!      number of elements `n`. The filter derives `k = ceil(-log2(p))` hash
//!      rounds and `m = ceil(k / ln(2) * n)` bits.
//!    * Hashing: every element is reduced to one 32-bit FNV-1 hash, which then
//!      seeds a 48-bit linear congruential generator. Each LCG step yields one
//!      of the `k` bit indices (modulo `m`).
//!
//! Insertion:
//!     * Set the `k` bits of the element and bump the insert counter.
//! Query:
//!     * If any of the `k` bits is unset the element was never added.
//!     * If all are set the element is possibly present.
//! Persistence:
//!     * [`FilterSnapshot`] is a fixed little-endian record of `m`, `k`, the
//!       insert counter and the packed bits.
//!
//! Obvious problems:
//!     * No removal and no resizing; the counter counts calls, not distinct
//!       elements, so duplicate inserts inflate the probability estimates.
//!     * Not synchronised. Callers that share a filter between threads must
//!       serialise writers themselves.
//!
//! ```
//! use bloomy_rs::BloomFilter;
//!
//! let mut filter = BloomFilter::with_false_positive_rate(0.01, 1000)?;
//! filter.add(b"apple");
//! assert!(filter.contains(b"apple"));
//! assert_eq!(filter.num_hashes(), 7);
//! # Ok::<(), bloomy_rs::BloomError>(())
//! ```

pub mod common;
mod config;
#[cfg(feature = "cli")]
pub mod driver;
mod error;
mod filter;
pub mod hash;
mod snapshot;
mod storage;

pub use config::{
    BloomConfig, BloomConfigBuilder, BloomConfigBuilderError, BloomParams,
    Sizing,
};
pub use error::{BloomError, Result};
pub use filter::BloomFilter;
pub use hash::{
    HashFunction, create_hash, create_hash_str, create_hash_with_encoding,
    default_hash_function, expand,
};
pub use snapshot::{FilterSnapshot, HEADER_LEN};
pub use storage::BitStorage;
