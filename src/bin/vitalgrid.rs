//! vitalgrid CLI - Command-line interface for the vitalgrid engine
//!
//! Commands:
//! - report: Compute all report views for one user from an NDJSON sample file
//! - generate: Produce a synthetic NDJSON sample file for trying the engine
//! - schema: Print example input records

use chrono::{DateTime, Datelike, Duration, Timelike, Utc};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use vitalgrid::schema::{RawSampleRecord, RecordType, SampleBatch, SCHEMA_VERSION};
use vitalgrid::store::MemoryStore;
use vitalgrid::types::AnalyzerConfig;
use vitalgrid::{Analyzer, VITALGRID_VERSION};

/// vitalgrid - Aggregation engine for time-binned views of wearable biometric data
#[derive(Parser)]
#[command(name = "vitalgrid")]
#[command(version = VITALGRID_VERSION)]
#[command(about = "Turn raw biometric samples into chart-ready aggregates", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute all report views for one user
    Report {
        /// Input NDJSON sample file (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file for the report payload JSON (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// User to report on
        #[arg(short, long)]
        user: u32,

        /// Anchor time, RFC 3339 (defaults to the current time)
        #[arg(long)]
        now: Option<String>,

        /// Time-of-day slot width for weekly heatmaps, minutes
        #[arg(long, default_value = "60")]
        grid_time: u32,

        /// Bin width for step-count axes
        #[arg(long, default_value = "10")]
        grid_steps: f64,

        /// Bin width for pulse axes
        #[arg(long, default_value = "5")]
        grid_pulse: f64,

        /// Bin width for alcohol axes
        #[arg(long, default_value = "0.2")]
        grid_alcohol: f64,

        /// Full correlation join window, minutes
        #[arg(long, default_value = "15")]
        time_delta: i64,

        /// Minimum samples before last-day reports render
        #[arg(long, default_value = "10")]
        min_daily: usize,

        /// Minimum samples before monthly reports render
        #[arg(long, default_value = "20")]
        min_monthly: usize,

        /// Minimum samples before 2-D reports render
        #[arg(long, default_value = "50")]
        min_2d: usize,

        /// Minimum samples per series before correlation reports render
        #[arg(long, default_value = "50")]
        min_3d: usize,
    },

    /// Generate a synthetic NDJSON sample file
    Generate {
        /// Output file (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// User id to stamp on the samples
        #[arg(short, long, default_value = "1")]
        user: u32,

        /// History length in days, ending now
        #[arg(long, default_value = "31")]
        days: i64,

        /// Number of observation times to draw
        #[arg(long, default_value = "1000")]
        count: usize,

        /// RNG seed for reproducible output
        #[arg(long, default_value = "42")]
        seed: u64,
    },

    /// Print example input records
    Schema,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Report {
            input,
            output,
            user,
            now,
            grid_time,
            grid_steps,
            grid_pulse,
            grid_alcohol,
            time_delta,
            min_daily,
            min_monthly,
            min_2d,
            min_3d,
        } => {
            let config = AnalyzerConfig {
                grid_time_minutes: grid_time,
                grid_steps,
                grid_pulse,
                grid_alcohol,
                time_delta_minutes: time_delta,
                min_daily_values: min_daily,
                min_monthly_values: min_monthly,
                min_2d_values: min_2d,
                min_3d_values: min_3d,
            };
            run_report(&input, &output, user, now.as_deref(), config)
        }
        Commands::Generate {
            output,
            user,
            days,
            count,
            seed,
        } => run_generate(&output, user, days, count, seed),
        Commands::Schema => run_schema(),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("Error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run_report(
    input: &PathBuf,
    output: &PathBuf,
    user: u32,
    now: Option<&str>,
    config: AnalyzerConfig,
) -> Result<(), String> {
    let now = match now {
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .map_err(|e| format!("invalid --now timestamp: {e}"))?
            .with_timezone(&Utc),
        None => Utc::now(),
    };

    let raw = read_input(input)?;
    let batch = SampleBatch::from_ndjson(&raw).map_err(|e| e.to_string())?;

    let mut store = MemoryStore::new();
    store.extend_activity(batch.activity);
    store.extend_drinking(batch.drinking);

    let analyzer = Analyzer::with_config(config).map_err(|e| e.to_string())?;
    let json = analyzer
        .report_all_json(&store, user, now)
        .map_err(|e| e.to_string())?;
    write_output(output, &json)
}

/// Synthetic sample generator.
///
/// The shape mirrors a plausible week: weekday nights are quiet, daytime
/// alcohol is rare, weekend drinking doubles, steps track waking hours and
/// pulse tracks steps.
struct Generator {
    rng: StdRng,
    steps_factor: f64,
    pulse_factor: f64,
    alco_factor: f64,
}

impl Generator {
    fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            steps_factor: 25.0,
            pulse_factor: 0.5,
            alco_factor: 2.0,
        }
    }

    fn rand_alcohol(&mut self, weekday: u32, hour: u32) -> Option<f64> {
        let mut alco = self.alco_factor;
        if weekday <= 4 && (1..=6).contains(&hour) {
            return None;
        }
        if (6..=16).contains(&hour) {
            alco /= 4.0;
        }
        if weekday >= 5 {
            alco *= 2.0;
        }
        Some(self.rng.gen::<f64>() * alco)
    }

    fn rand_steps(&mut self, weekday: u32, hour: u32, alcohol: Option<f64>) -> u32 {
        let mut steps = self.steps_factor;
        if weekday <= 4 && (1..=6).contains(&hour) {
            return 0;
        }
        if (10..=17).contains(&hour) {
            steps /= 2.0;
        }
        if weekday == 6 {
            steps *= 2.0;
        }
        if let Some(alco) = alcohol {
            steps *= 1.0 + alco / self.alco_factor;
        }
        (self.rng.gen::<f64>() * steps) as u32
    }

    fn rand_pulse(&mut self, hour: u32, steps: u32, alcohol: Option<f64>) -> f64 {
        let mut pulse = 85.0;
        if (1..=6).contains(&hour) {
            pulse *= 0.8;
        }
        if let Some(alco) = alcohol {
            pulse += 1.0 + alco / self.alco_factor;
        }
        pulse += steps as f64 * self.pulse_factor;
        pulse += self.rng.gen::<f64>();
        pulse
    }

    fn records(&mut self, user: u32, days: i64, count: usize) -> Vec<RawSampleRecord> {
        let stop = Utc::now();
        let span_seconds = Duration::days(days).num_seconds();
        let mut records = Vec::with_capacity(count * 2);

        for _ in 0..count {
            let offset = self.rng.gen_range(0..span_seconds.max(1));
            let timestamp = stop - Duration::seconds(offset);
            let weekday = timestamp.weekday().num_days_from_monday();
            let hour = timestamp.hour();

            let alcohol = self.rand_alcohol(weekday, hour);
            let steps = self.rand_steps(weekday, hour, alcohol);
            let pulse = self.rand_pulse(hour, steps, alcohol);

            records.push(RawSampleRecord {
                record_type: RecordType::Activity,
                user_id: user,
                timestamp,
                steps: Some(steps),
                pulse: Some(pulse),
                alcohol: None,
            });
            if alcohol.is_some() {
                records.push(RawSampleRecord {
                    record_type: RecordType::Drinking,
                    user_id: user,
                    timestamp,
                    steps: None,
                    pulse: None,
                    alcohol,
                });
            }
        }
        records
    }
}

fn run_generate(
    output: &PathBuf,
    user: u32,
    days: i64,
    count: usize,
    seed: u64,
) -> Result<(), String> {
    if days <= 0 {
        return Err(format!("--days must be positive, got {days}"));
    }
    let mut generator = Generator::new(seed);
    let records = generator.records(user, days, count);

    let mut lines = String::new();
    for record in &records {
        let line = serde_json::to_string(record).map_err(|e| e.to_string())?;
        lines.push_str(&line);
        lines.push('\n');
    }
    write_output(output, &lines)
}

fn run_schema() -> Result<(), String> {
    println!("# {SCHEMA_VERSION} - one JSON record per line");
    println!(
        r#"{{"record_type": "activity", "user_id": 1, "timestamp": "2018-10-20T08:00:00Z", "steps": 12, "pulse": 71.5}}"#
    );
    println!(
        r#"{{"record_type": "drinking", "user_id": 1, "timestamp": "2018-10-20T22:00:00Z", "alcohol": 0.4}}"#
    );
    Ok(())
}

fn read_input(path: &PathBuf) -> Result<String, String> {
    if path.to_str() == Some("-") {
        if atty::is(atty::Stream::Stdin) {
            eprintln!("Reading NDJSON records from stdin (press Ctrl-D to finish)...");
        }
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| format!("failed to read stdin: {e}"))?;
        Ok(buffer)
    } else {
        fs::read_to_string(path).map_err(|e| format!("failed to read {}: {e}", path.display()))
    }
}

fn write_output(path: &PathBuf, content: &str) -> Result<(), String> {
    if path.to_str() == Some("-") {
        io::stdout()
            .write_all(content.as_bytes())
            .map_err(|e| format!("failed to write stdout: {e}"))
    } else {
        fs::write(path, content).map_err(|e| format!("failed to write {}: {e}", path.display()))
    }
}
