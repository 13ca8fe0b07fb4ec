use bloomy_rs::{
    BloomFilter, BloomParams,
    common::{bits2hr, bytes2hr},
    driver::{
        DriverConfig, FilterInfo, build_from_lines, load_filter, run_bench,
        save_filter,
    },
};
use clap::{Parser, Subcommand};
use std::{
    fs::File,
    io::{self, BufReader},
    path::PathBuf,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the parameters derived for a target false positive rate
    Params {
        /// False positive rate (between 0 and 1)
        #[arg(short, long)]
        fpr: Option<f64>,

        /// Expected number of elements
        #[arg(short, long)]
        capacity: Option<usize>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Build a filter from the lines of a file and persist it
    Build {
        /// Input file, one element per line ("-" for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Where to write the persisted filter
        #[arg(short, long)]
        output: PathBuf,

        /// False positive rate (between 0 and 1)
        #[arg(short, long)]
        fpr: Option<f64>,

        /// Expected number of elements, defaults to the number of lines
        #[arg(short, long)]
        capacity: Option<usize>,
    },

    /// Check elements against a persisted filter
    Check {
        /// Path to the persisted filter
        #[arg(short = 'F', long)]
        filter: PathBuf,

        /// Elements to check
        #[arg(required = true)]
        elements: Vec<String>,
    },

    /// Display information about a persisted filter
    Info {
        /// Path to the persisted filter
        #[arg(short = 'F', long)]
        filter: PathBuf,

        /// Expected number of elements the filter was sized for
        #[arg(short, long)]
        capacity: Option<usize>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compare filter throughput against an exact hash set
    Bench {
        /// Number of elements to insert and to probe
        #[arg(short, long)]
        count: Option<usize>,

        /// Size of each random element in bytes
        #[arg(short, long)]
        element_size: Option<usize>,

        /// False positive rate (between 0 and 1)
        #[arg(short, long)]
        fpr: Option<f64>,

        /// RNG seed for reproducible runs
        #[arg(short, long)]
        seed: Option<u64>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let env = DriverConfig::from_env()?;

    match cli.command {
        Commands::Params {
            fpr,
            capacity,
            json,
        } => {
            let fpr = fpr.unwrap_or(env.false_positive_rate);
            let capacity = capacity.unwrap_or(env.capacity);
            let params = BloomParams::from_false_positive_rate(fpr, capacity)?;
            let filter = BloomFilter::with_false_positive_rate(fpr, capacity)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&params)?);
            } else {
                println!("Bloom Filter Parameters:");
                println!("  Target false positive rate: {fpr}");
                println!("  Expected elements (n): {}", params.expected_elements);
                println!("  Bits per element (c): {:.4}", params.bits_per_element);
                println!("  Hash rounds (k): {}", params.num_hashes);
                println!("  Bit array size (m): {}", params.bit_array_size);
                println!("  Memory: {}", bits2hr(params.bit_array_size));
                println!(
                    "  Estimated false positive rate at n: {:.6}",
                    filter.expected_false_positive_probability()
                );
            }
        }
        Commands::Build {
            input,
            output,
            fpr,
            capacity,
        } => {
            let fpr = fpr.unwrap_or(env.false_positive_rate);
            let filter = if input.as_os_str() == "-" {
                build_from_lines(io::stdin().lock(), fpr, capacity)?
            } else {
                build_from_lines(BufReader::new(File::open(&input)?), fpr, capacity)?
            };
            save_filter(&filter, &output)?;
            println!(
                "Wrote filter with {} elements to {}",
                filter.count(),
                output.display()
            );
        }
        Commands::Check { filter, elements } => {
            let bloom = load_filter(&filter, None)?;
            for element in &elements {
                if bloom.contains(element.as_bytes()) {
                    println!("Element '{element}' may exist in the filter");
                } else {
                    println!("Element '{element}' does not exist in the filter");
                }
            }
        }
        Commands::Info {
            filter,
            capacity,
            json,
        } => {
            let bloom = load_filter(&filter, capacity)?;
            let info = FilterInfo::from(&bloom);
            if json {
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("Bloom Filter:");
                println!("  Path: {}", filter.display());
                println!("  Bit array size (m): {}", info.bit_array_size);
                println!("  Hash rounds (k): {}", info.num_hashes);
                println!("  Expected elements (n): {}", info.expected_elements);
                println!("  Elements added: {}", info.number_added);
                println!("  Bits set: {}", info.bits_set);
                println!("  Packed size: {}", bytes2hr(info.packed_bytes));
                match bloom.bits_per_element() {
                    Some(bits) => println!("  Bits per added element: {bits:.3}"),
                    None => println!("  Bits per added element: n/a"),
                }
                println!(
                    "  Expected false positive rate: {:.6}",
                    info.expected_false_positive_probability
                );
                println!(
                    "  Current false positive rate: {:.6}",
                    info.current_false_positive_probability
                );
            }
        }
        Commands::Bench {
            count,
            element_size,
            fpr,
            seed,
            json,
        } => {
            let config = DriverConfig {
                capacity: count.unwrap_or(env.capacity),
                false_positive_rate: fpr.unwrap_or(env.false_positive_rate),
                element_size: element_size.unwrap_or(env.element_size),
                seed: seed.or(env.seed),
            };
            info!(?config, "Running benchmark");
            let report = run_bench(&config)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("Testing BloomFilter {} elements", report.element_count);
                println!("  add(): {}", report.bloom_add);
                println!(
                    "  contains(), existing: {}",
                    report.bloom_contains_existing
                );
                println!(
                    "  contains(), missing: {}",
                    report.bloom_contains_missing
                );
                println!(
                    "  false positives: {} ({:.4}%, estimated {:.4}%)",
                    report.false_positives,
                    report.observed_false_positive_rate * 100.0,
                    report.filter.expected_false_positive_probability * 100.0
                );
                println!("  memory: {}", bits2hr(report.filter.bit_array_size));
                println!("Testing HashSet {} elements", report.element_count);
                println!("  add(): {}", report.hashset_add);
                println!(
                    "  contains(), existing: {}",
                    report.hashset_contains_existing
                );
            }
        }
    }

    Ok(())
}
