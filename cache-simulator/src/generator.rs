//! Synthetic traffic logs.
//!
//! Each simulated hour is written to its own `traffic_hour_NN.csv` by its own
//! thread. A configurable share of requests goes to a small "popular" object
//! set with a skewed rank distribution; the rest is spread uniformly over the
//! regular objects. The popular window drifts from hour to hour so recency
//! and frequency based policies see different workloads.

use crate::models::Request;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::{SystemTime, UNIX_EPOCH};

/// Rank skew for popular objects; higher values concentrate traffic on fewer keys.
const POPULAR_SKEW: f64 = 3.0;

#[derive(Debug, Clone)]
pub struct TrafficLogConfig {
    /// Requests per second
    pub rps: u32,
    /// Total duration in hours
    pub duration_hours: u32,
    /// Number of unique objects
    pub unique_objects: u32,
    /// Percentage of traffic that goes to popular objects
    pub popular_traffic_percent: u8,
    /// Percentage of objects considered popular
    pub popular_objects_percent: u8,
    /// Minimum object size in bytes
    pub min_size: u64,
    /// Maximum object size in bytes
    pub max_size: u64,
    /// Minimum TTL in seconds
    pub min_ttl: u64,
    /// Maximum TTL in seconds
    pub max_ttl: u64,
    pub output_dir: PathBuf,
    /// Write buffer size in KB
    pub buffer_size_kb: u32,
    /// Seed for reproducible logs; `None` draws from OS entropy
    pub seed: Option<u64>,
    /// Timestamp of the first request; `None` uses the current time
    pub start_time: Option<u64>,
}

impl Default for TrafficLogConfig {
    fn default() -> Self {
        Self {
            rps: 100,
            duration_hours: 24,
            unique_objects: 10_000,
            popular_traffic_percent: 80,
            popular_objects_percent: 20,
            min_size: 1024,        // 1KB
            max_size: 1024 * 1024, // 1MB
            min_ttl: 3600,         // 1 hour
            max_ttl: 86400,        // 24 hours
            output_dir: PathBuf::from("traffic_logs"),
            buffer_size_kb: 8192,
            seed: None,
            start_time: None,
        }
    }
}

/// Generator for random traffic logs
#[derive(Debug)]
pub struct TrafficLogGenerator {
    config: TrafficLogConfig,
}

impl TrafficLogGenerator {
    pub fn new(config: TrafficLogConfig) -> Self {
        Self { config }
    }

    /// Number of objects in the popular set.
    pub fn popular_objects(&self) -> u32 {
        let percent = u64::from(self.config.popular_objects_percent.min(100));
        (u64::from(self.config.unique_objects) * percent / 100) as u32
    }

    /// Path of the log written for `hour`.
    pub fn hour_file(&self, hour: u32) -> PathBuf {
        self.config
            .output_dir
            .join(format!("traffic_hour_{hour:02}.csv"))
    }

    /// Writes one CSV file per hour into the output directory.
    pub fn generate(&self) -> Result<(), Box<dyn std::error::Error>> {
        let config = &self.config;
        if config.unique_objects == 0 {
            return Err("unique_objects must be greater than zero".into());
        }
        fs::create_dir_all(&config.output_dir)?;

        let start_time = match config.start_time {
            Some(ts) => ts,
            None => SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs(),
        };
        let popular = self.popular_objects();
        let requests_per_hour = u64::from(config.rps) * 3600;
        let total_requests = requests_per_hour * u64::from(config.duration_hours);

        println!("Generating traffic logs with the following parameters:");
        println!("  Requests per second: {}", config.rps);
        println!("  Duration: {} hours", config.duration_hours);
        println!(
            "  Objects: {} ({} popular, {} regular)",
            config.unique_objects,
            popular,
            config.unique_objects - popular
        );
        println!(
            "  Traffic distribution: {}% from {}% of objects",
            config.popular_traffic_percent, config.popular_objects_percent
        );
        println!("  Size range: {} - {} bytes", config.min_size, config.max_size);
        println!("  Output directory: {}", config.output_dir.display());
        println!("Generating {total_requests} requests in total");

        let completed = AtomicU64::new(0);

        let failures: Vec<String> = thread::scope(|scope| {
            let handles: Vec<_> = (0..config.duration_hours)
                .map(|hour| {
                    let completed = &completed;
                    scope.spawn(move || {
                        let path = self.hour_file(hour);
                        let hour_start = start_time + u64::from(hour) * 3600;
                        self.generate_hour(hour, hour_start, &path)
                            .map_err(|e| format!("hour {hour}: {e}"))?;

                        let done =
                            completed.fetch_add(requests_per_hour, Ordering::Relaxed) + requests_per_hour;
                        println!("Hour {hour:02} complete: {done}/{total_requests} requests");
                        Ok::<(), String>(())
                    })
                })
                .collect();

            handles
                .into_iter()
                .filter_map(|handle| match handle.join() {
                    Ok(Ok(())) => None,
                    Ok(Err(e)) => Some(e),
                    Err(_) => Some("generator thread panicked".to_string()),
                })
                .collect()
        });

        if !failures.is_empty() {
            return Err(failures.join("; ").into());
        }

        println!("Traffic log generation complete");
        Ok(())
    }

    /// Generates and writes the requests for a single hour.
    fn generate_hour(
        &self,
        hour: u32,
        start_time: u64,
        path: &Path,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let config = &self.config;
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(u64::from(hour))),
            None => StdRng::from_entropy(),
        };

        let file = File::create(path)?;
        let buffer = BufWriter::with_capacity(config.buffer_size_kb.max(1) as usize * 1024, file);
        let mut writer = csv::Writer::from_writer(buffer);

        let popular = self.popular_objects();
        let regular = config.unique_objects - popular;
        let popular_probability = match (popular, regular) {
            (0, _) => 0.0,
            (_, 0) => 1.0,
            _ => f64::from(config.popular_traffic_percent.min(100)) / 100.0,
        };

        // the popular window drifts every hour and wraps after half a day
        let shift = hour % 12;
        let popular_base = shift * (popular / 12).max(1);
        let regular_base = shift * (regular / 24).max(1);

        let (min_size, max_size) = ordered(config.min_size, config.max_size);
        let (min_ttl, max_ttl) = ordered(config.min_ttl, config.max_ttl);

        let requests = u64::from(config.rps) * 3600;
        let step = if requests > 0 { 3600.0 / requests as f64 } else { 0.0 };

        for i in 0..requests {
            let key = if rng.gen_bool(popular_probability) {
                let rank = (rng.gen::<f64>().powf(POPULAR_SKEW) * f64::from(popular)) as u32;
                format!("popular_obj_{}", (popular_base + rank) % popular)
            } else {
                let offset = rng.gen_range(0..regular);
                format!("regular_obj_{}", (regular_base + offset) % regular)
            };

            let request = Request {
                timestamp: start_time + (i as f64 * step) as u64,
                key,
                size: rng.gen_range(min_size..=max_size) as usize,
                ttl: rng.gen_range(min_ttl..=max_ttl),
            };
            writer.serialize(request)?;
        }

        writer.flush()?;
        Ok(())
    }
}

fn ordered(a: u64, b: u64) -> (u64, u64) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::LogReader;
    use std::collections::HashMap;

    fn create_temp_dir(test_name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("policy_cache_generator_test_{test_name}"));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    fn small_config(dir: &Path) -> TrafficLogConfig {
        TrafficLogConfig {
            rps: 2,
            duration_hours: 2,
            unique_objects: 100,
            min_size: 10,
            max_size: 20,
            min_ttl: 5,
            max_ttl: 5,
            output_dir: dir.to_path_buf(),
            buffer_size_kb: 4,
            seed: Some(7),
            start_time: Some(1_000_000),
            ..TrafficLogConfig::default()
        }
    }

    #[test]
    fn test_creates_one_file_per_hour() {
        let dir = create_temp_dir("hourly");
        let generator = TrafficLogGenerator::new(small_config(&dir));
        generator.generate().unwrap();

        assert!(generator.hour_file(0).exists());
        assert!(generator.hour_file(1).exists());
        assert!(!generator.hour_file(2).exists());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_generated_rows_respect_bounds() {
        let dir = create_temp_dir("bounds");
        let generator = TrafficLogGenerator::new(small_config(&dir));
        generator.generate().unwrap();

        let requests = LogReader::new(&dir).parse_file(generator.hour_file(1)).unwrap();
        assert_eq!(requests.len(), 2 * 3600);

        let mut last = 0;
        for request in &requests {
            assert!((10..=20).contains(&request.size));
            assert_eq!(request.ttl, 5);
            assert!(request.timestamp >= 1_000_000 + 3600);
            assert!(request.timestamp >= last);
            assert!(
                request.key.starts_with("popular_obj_") || request.key.starts_with("regular_obj_")
            );
            last = request.timestamp;
        }

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_same_seed_same_log() {
        let dir_a = create_temp_dir("seed_a");
        let dir_b = create_temp_dir("seed_b");
        TrafficLogGenerator::new(small_config(&dir_a)).generate().unwrap();
        TrafficLogGenerator::new(small_config(&dir_b)).generate().unwrap();

        let a = fs::read_to_string(dir_a.join("traffic_hour_00.csv")).unwrap();
        let b = fs::read_to_string(dir_b.join("traffic_hour_00.csv")).unwrap();
        assert_eq!(a, b);

        let _ = fs::remove_dir_all(&dir_a);
        let _ = fs::remove_dir_all(&dir_b);
    }

    #[test]
    fn test_popular_share_roughly_matches_config() {
        let dir = create_temp_dir("share");
        let mut config = small_config(&dir);
        config.duration_hours = 1;
        config.rps = 10;
        let generator = TrafficLogGenerator::new(config);
        generator.generate().unwrap();

        let requests = LogReader::new(&dir).parse_file(generator.hour_file(0)).unwrap();
        let popular = requests
            .iter()
            .filter(|r| r.key.starts_with("popular_obj_"))
            .count();
        let share = popular as f64 / requests.len() as f64;
        assert!((0.75..0.85).contains(&share), "popular share {share}");

        // 20 popular objects absorb 80% of traffic, so they repeat far more often
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for r in &requests {
            *counts.entry(r.key.as_str()).or_default() += 1;
        }
        let distinct_popular = counts.keys().filter(|k| k.starts_with("popular_")).count();
        assert!(distinct_popular <= 20);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_all_popular_when_no_regular_objects() {
        let dir = create_temp_dir("all_popular");
        let mut config = small_config(&dir);
        config.duration_hours = 1;
        config.popular_objects_percent = 100;
        let generator = TrafficLogGenerator::new(config);
        generator.generate().unwrap();

        let requests = LogReader::new(&dir).parse_file(generator.hour_file(0)).unwrap();
        assert!(requests.iter().all(|r| r.key.starts_with("popular_obj_")));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_zero_objects_is_rejected() {
        let dir = create_temp_dir("zero_objects");
        let mut config = small_config(&dir);
        config.unique_objects = 0;
        assert!(TrafficLogGenerator::new(config).generate().is_err());
    }
}
