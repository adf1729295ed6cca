use cache_simulator::generator::{TrafficLogConfig, TrafficLogGenerator};
use cache_simulator::models::{CacheAlgorithm, CacheMode, SimulationConfig};
use cache_simulator::runner::SimulationRunner;
use cache_simulator::stats::SimulationStats;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Cache eviction policy simulator
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay request logs through the selected eviction policies
    Simulate {
        /// Directory containing CSV request logs
        #[arg(short, long, value_name = "DIR")]
        input_dir: PathBuf,

        /// Cache capacity (number of entries)
        #[arg(short, long, default_value = "10000")]
        capacity: usize,

        /// Algorithms to simulate (lru, fifo, lfu, reference-lru); all when omitted
        #[arg(short, long, value_name = "ALGOS", num_args = 1.., value_delimiter = ',')]
        algorithms: Option<Vec<String>>,

        /// Cache mode: sequential, concurrent, or both
        #[arg(long, default_value = "both")]
        mode: String,

        /// Worker threads sharing the cache in concurrent mode
        #[arg(long, default_value = "4")]
        threads: usize,

        /// Export results to CSV file
        #[arg(long, value_name = "PATH")]
        output_csv: Option<PathBuf>,
    },

    /// Generate random traffic logs
    Generate {
        /// Requests per second
        #[arg(long, default_value = "100")]
        rps: u32,

        /// Duration in hours
        #[arg(long, default_value = "24")]
        duration: u32,

        /// Number of unique objects
        #[arg(long, default_value = "10000")]
        objects: u32,

        /// Percentage of traffic from popular objects
        #[arg(long, default_value = "80")]
        popular_traffic: u8,

        /// Percentage of objects that are popular
        #[arg(long, default_value = "20")]
        popular_objects: u8,

        /// Minimum object size in KB
        #[arg(long, default_value = "1")]
        min_size: u64,

        /// Maximum object size in KB
        #[arg(long, default_value = "1024")]
        max_size: u64,

        /// Minimum TTL in hours
        #[arg(long, default_value = "1")]
        min_ttl: u64,

        /// Maximum TTL in hours
        #[arg(long, default_value = "24")]
        max_ttl: u64,

        /// Seed for reproducible logs
        #[arg(long)]
        seed: Option<u64>,

        /// Output directory
        #[arg(short, long, default_value = "traffic_logs")]
        output: PathBuf,

        /// Write buffer size in KB
        #[arg(long, default_value = "8192")]
        buffer_size: u32,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    match args.command {
        Commands::Generate {
            rps,
            duration,
            objects,
            popular_traffic,
            popular_objects,
            min_size,
            max_size,
            min_ttl,
            max_ttl,
            seed,
            output,
            buffer_size,
        } => {
            let config = TrafficLogConfig {
                rps,
                duration_hours: duration,
                unique_objects: objects,
                popular_traffic_percent: popular_traffic,
                popular_objects_percent: popular_objects,
                min_size: min_size * 1024,
                max_size: max_size * 1024,
                min_ttl: min_ttl * 3600,
                max_ttl: max_ttl * 3600,
                output_dir: output,
                buffer_size_kb: buffer_size,
                seed,
                start_time: None,
            };
            TrafficLogGenerator::new(config).generate()
        }

        Commands::Simulate {
            input_dir,
            capacity,
            algorithms,
            mode,
            threads,
            output_csv,
        } => {
            let config = SimulationConfig {
                input_dir,
                capacity,
                algorithms: parse_algorithms(algorithms.as_deref())?,
                modes: CacheMode::parse_list(&mode)?,
                thread_count: threads.max(1),
            };
            run_simulation(config, output_csv)
        }
    }
}

/// Parse algorithm names; an empty or missing list selects every algorithm
fn parse_algorithms(names: Option<&[String]>) -> Result<Vec<CacheAlgorithm>, String> {
    let mut selected = Vec::new();
    for name in names.unwrap_or_default() {
        let algorithm: CacheAlgorithm = name.parse()?;
        if !selected.contains(&algorithm) {
            selected.push(algorithm);
        }
    }
    if selected.is_empty() {
        selected = CacheAlgorithm::all();
    }
    Ok(selected)
}

fn run_simulation(
    config: SimulationConfig,
    output_csv: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Cache Simulation");
    println!("================");
    println!("Input directory: {}", config.input_dir.display());
    println!("Cache capacity: {} entries", config.capacity);
    println!(
        "Algorithms: {:?}",
        config.algorithms.iter().map(|a| a.as_str()).collect::<Vec<_>>()
    );
    println!(
        "Modes: {:?}",
        config.modes.iter().map(|m| m.as_str()).collect::<Vec<_>>()
    );
    if config.modes.contains(&CacheMode::Concurrent) {
        println!("Worker threads: {}", config.thread_count);
    }
    println!();

    let result = SimulationRunner::new(config).run()?;

    println!("\nSimulation completed in {:.2?}", result.duration);
    println!("Total requests: {}", result.total_requests);
    println!("Unique objects: {}", result.unique_objects);

    if let Some(csv_path) = output_csv {
        SimulationStats::from_result(&result).export_csv(&csv_path)?;
        println!("\nResults exported to: {}", csv_path.display());
    }

    Ok(())
}
