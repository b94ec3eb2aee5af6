//! Command line options for the flight binary.

use std::path::PathBuf;

use clap::Parser;

use crate::constants::{DEFAULT_POST_LANDING_TICKS, DEFAULT_QUEUE_CAPACITY};
use crate::scheduler::RunLimits;

#[derive(Parser, Debug)]
#[command(name = "billboard")]
#[command(about = "Altitude logger and flight phase detector")]
pub struct Cli {
    /// Directory for the csv flight logs
    #[arg(long, default_value = "logs")]
    pub log_dir: PathBuf,

    /// Serial port of the telemetry radio, e.g. /dev/ttyS0
    #[arg(long)]
    pub serial_port: Option<String>,

    /// Replay altitudes from a csv file instead of reading the barometer
    #[arg(long)]
    pub replay: Option<PathBuf>,

    /// Run replays at the 50 ms flight rate instead of as fast as possible
    #[arg(long)]
    pub realtime: bool,

    /// Ticks to keep logging after landing
    #[arg(long, default_value_t = DEFAULT_POST_LANDING_TICKS)]
    pub post_landing_ticks: u64,

    /// Stop after this many ticks
    #[arg(long)]
    pub max_ticks: Option<u64>,

    /// Records buffered between the sampling loop and the log writer
    #[arg(long, default_value_t = DEFAULT_QUEUE_CAPACITY, value_parser = parse_queue_capacity)]
    pub queue_capacity: usize,

    /// Attempts at bringing up the barometer, one second apart
    #[arg(long, default_value_t = 30)]
    pub sensor_attempts: u32,
}

fn parse_queue_capacity(arg: &str) -> Result<usize, String> {
    match arg.parse::<usize>() {
        Ok(0) => Err("queue capacity must be at least 1".to_string()),
        Ok(capacity) => Ok(capacity),
        Err(e) => Err(e.to_string()),
    }
}

impl Cli {
    pub fn run_limits(&self) -> RunLimits {
        RunLimits {
            post_landing_ticks: self.post_landing_ticks,
            max_ticks: self.max_ticks,
        }
    }
}
