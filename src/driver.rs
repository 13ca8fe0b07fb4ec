//! Plumbing behind the `bloomy` command-line tool: environment configuration,
//! building and inspecting persisted filters, and the throughput benchmark
//! against an exact hash set.

use crate::error::{BloomError, Result};
use crate::filter::BloomFilter;
use derive_builder::Builder;
use fnv::FnvHashSet;
use rand::{RngCore, SeedableRng, rngs::StdRng};
use serde::Serialize;
use std::f64::consts::LN_2;
use std::fmt::Display;
use std::io::BufRead;
use std::path::Path;
use std::str::FromStr;
use std::time::Instant;
use tracing::{debug, info, warn};

#[derive(Builder, Clone, Debug, Serialize)]
#[builder(pattern = "owned")]
pub struct DriverConfig {
    /// Expected number of elements, also the benchmark element count
    #[builder(default = "1_000_000")]
    pub capacity: usize,
    /// Target false positive probability
    #[builder(default = "0.01")]
    pub false_positive_rate: f64,
    /// Size in bytes of each random benchmark element
    #[builder(default = "100")]
    pub element_size: usize,
    /// Fixed RNG seed for reproducible benchmark data
    #[builder(default = "None")]
    pub seed: Option<u64>,
}

impl DriverConfig {
    /// Reads `BLOOMY_CAPACITY`, `BLOOMY_FPR`, `BLOOMY_ELEMENT_SIZE` and
    /// `BLOOMY_SEED`, after loading `.env` if present.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            capacity: env_or("BLOOMY_CAPACITY", 1_000_000)?,
            false_positive_rate: env_or("BLOOMY_FPR", 0.01)?,
            element_size: env_or("BLOOMY_ELEMENT_SIZE", 100)?,
            seed: match std::env::var("BLOOMY_SEED") {
                Ok(value) => Some(parse_env("BLOOMY_SEED", &value)?),
                Err(_) => None,
            },
        })
    }
}

fn env_or<T>(var_name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match std::env::var(var_name) {
        Ok(value) => parse_env(var_name, &value),
        Err(_) => Ok(default),
    }
}

fn parse_env<T>(var_name: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    value.trim().parse().map_err(|e: T::Err| BloomError::EnvParseError {
        var_name: var_name.to_string(),
        value: value.to_string(),
        error: e.to_string(),
    })
}

/// Parameters of a filter as printed by `params` and `info`.
#[derive(Debug, Clone, Serialize)]
pub struct FilterInfo {
    pub bit_array_size: usize,
    pub num_hashes: usize,
    pub expected_elements: usize,
    pub expected_bits_per_element: f64,
    pub number_added: usize,
    pub bits_set: usize,
    pub packed_bytes: usize,
    pub expected_false_positive_probability: f64,
    pub current_false_positive_probability: f64,
}

impl From<&BloomFilter> for FilterInfo {
    fn from(filter: &BloomFilter) -> Self {
        Self {
            bit_array_size: filter.size(),
            num_hashes: filter.num_hashes(),
            expected_elements: filter.expected_elements(),
            expected_bits_per_element: filter.expected_bits_per_element(),
            number_added: filter.count(),
            bits_set: filter.count_ones(),
            packed_bytes: filter.size().div_ceil(8),
            expected_false_positive_probability: filter
                .expected_false_positive_probability(),
            current_false_positive_probability: filter
                .false_positive_probability(),
        }
    }
}

/// Best guess of `n` for a record that only carries `m` and `k`:
/// the inverse of `c = k / ln(2)`.
pub fn infer_capacity(bit_array_size: usize, num_hashes: usize) -> usize {
    ((bit_array_size as f64 * LN_2) / num_hashes.max(1) as f64)
        .round()
        .max(1.0) as usize
}

/// Adds every line of `reader` to a new filter sized for `capacity` lines,
/// or for the number of lines read when `capacity` is `None`.
pub fn build_from_lines<R: BufRead>(
    reader: R,
    false_positive_rate: f64,
    capacity: Option<usize>,
) -> Result<BloomFilter> {
    let lines = reader.lines().collect::<std::io::Result<Vec<_>>>()?;
    let capacity = capacity.unwrap_or(lines.len()).max(1);

    let mut filter =
        BloomFilter::with_false_positive_rate(false_positive_rate, capacity)?;
    for line in &lines {
        filter.add(line.as_bytes());
    }
    info!(
        lines = lines.len(),
        bit_array_size = filter.size(),
        num_hashes = filter.num_hashes(),
        "Built filter"
    );
    Ok(filter)
}

pub fn save_filter(filter: &BloomFilter, path: &Path) -> Result<()> {
    let bytes = filter.to_bytes()?;
    std::fs::write(path, &bytes)?;
    debug!(path = %path.display(), bytes = bytes.len(), "Saved filter");
    Ok(())
}

/// Loads a persisted filter. Without `capacity`, `n` is inferred from `m`
/// and `k`, which only affects the probability estimates.
pub fn load_filter(
    path: &Path,
    capacity: Option<usize>,
) -> Result<BloomFilter> {
    let bytes = std::fs::read(path)?;
    let snapshot = crate::snapshot::FilterSnapshot::from_bytes(&bytes)?;
    let capacity = capacity.unwrap_or_else(|| {
        infer_capacity(
            snapshot.bit_array_size as usize,
            snapshot.num_hashes as usize,
        )
    });
    BloomFilter::restore_snapshot(&snapshot, capacity)
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Throughput {
    pub seconds: f64,
    pub elements_per_second: f64,
}

impl Throughput {
    fn measure<T, F: FnOnce() -> T>(count: usize, work: F) -> (Self, T) {
        let start = Instant::now();
        let output = work();
        let seconds = start.elapsed().as_secs_f64();
        let throughput = Self {
            seconds,
            elements_per_second: if seconds > 0.0 {
                count as f64 / seconds
            } else {
                f64::INFINITY
            },
        };
        (throughput, output)
    }
}

impl Display for Throughput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:.3}s, {:.0} elements/s",
            self.seconds, self.elements_per_second
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BenchReport {
    pub element_count: usize,
    pub element_size: usize,
    pub seed: u64,
    pub filter: FilterInfo,
    pub bloom_add: Throughput,
    pub bloom_contains_existing: Throughput,
    pub bloom_contains_missing: Throughput,
    pub hashset_add: Throughput,
    pub hashset_contains_existing: Throughput,
    pub false_positives: usize,
    pub observed_false_positive_rate: f64,
}

/// Random elements that are pairwise distinct.
pub fn random_elements(
    rng: &mut StdRng,
    count: usize,
    size: usize,
    exclude: &FnvHashSet<Vec<u8>>,
) -> Vec<Vec<u8>> {
    let mut seen = FnvHashSet::default();
    let mut elements = Vec::with_capacity(count);
    while elements.len() < count {
        let mut element = vec![0u8; size];
        rng.fill_bytes(&mut element);
        if exclude.contains(&element) || !seen.insert(element.clone()) {
            continue;
        }
        elements.push(element);
    }
    elements
}

/// Times `add`/`contains` of the filter against an exact `FnvHashSet`
/// and measures the observed false positive rate on disjoint elements.
pub fn run_bench(config: &DriverConfig) -> Result<BenchReport> {
    if config.element_size == 0 {
        return Err(BloomError::InvalidConfig(
            "Element size must be > 0".into(),
        ));
    }
    // two disjoint sets of distinct elements must fit in 256^size values
    let space = 256f64.powi(config.element_size.min(8) as i32);
    if space < 2.0 * config.capacity as f64 {
        return Err(BloomError::InvalidConfig(format!(
            "{} distinct elements of {} bytes do not exist",
            2 * config.capacity,
            config.element_size
        )));
    }
    let seed = config.seed.unwrap_or_else(rand::random);
    let mut rng = StdRng::seed_from_u64(seed);
    let count = config.capacity;

    info!(
        count,
        element_size = config.element_size,
        seed,
        "Generating elements"
    );
    let existing = random_elements(
        &mut rng,
        count,
        config.element_size,
        &FnvHashSet::default(),
    );
    let existing_set: FnvHashSet<Vec<u8>> = existing.iter().cloned().collect();
    let missing =
        random_elements(&mut rng, count, config.element_size, &existing_set);

    let mut filter =
        BloomFilter::with_false_positive_rate(config.false_positive_rate, count)?;

    let (bloom_add, ()) = Throughput::measure(count, || {
        for element in &existing {
            filter.add(element);
        }
    });
    let (bloom_contains_existing, found) = Throughput::measure(count, || {
        existing.iter().filter(|e| filter.contains(e)).count()
    });
    if found != count {
        warn!(found, count, "Filter missed inserted elements");
    }
    let (bloom_contains_missing, false_positives) =
        Throughput::measure(count, || {
            missing.iter().filter(|e| filter.contains(e)).count()
        });

    let mut hashset: FnvHashSet<&[u8]> =
        FnvHashSet::with_capacity_and_hasher(count, Default::default());
    let (hashset_add, ()) = Throughput::measure(count, || {
        for element in &existing {
            hashset.insert(element.as_slice());
        }
    });
    let (hashset_contains_existing, _) = Throughput::measure(count, || {
        existing
            .iter()
            .filter(|e| hashset.contains(e.as_slice()))
            .count()
    });

    Ok(BenchReport {
        element_count: count,
        element_size: config.element_size,
        seed,
        filter: FilterInfo::from(&filter),
        bloom_add,
        bloom_contains_existing,
        bloom_contains_missing,
        hashset_add,
        hashset_contains_existing,
        false_positives,
        observed_false_positive_rate: false_positives as f64
            / count.max(1) as f64,
    })
}
