//! Ground checkout: reads the barometer at the flight rate for a few seconds
//! and prints altitude and acceleration, without logging or phase detection.

use std::time::{Duration, Instant};

use anyhow::Context as _;

use billboard::constants::SAMPLE_PERIOD;
use billboard::history::AltitudeHistory;
use billboard::kinematics::{KinematicsEstimator, KinematicsStatus};
use billboard::sensor::{AltitudeSource, Barometer};
use billboard::timebase::{FixedRateTimebase, Timebase};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut barometer = Barometer::new(10).context("starting barometer")?;
    let mut history = AltitudeHistory::new();
    let mut kinematics = KinematicsEstimator::new();
    let mut timebase = FixedRateTimebase::new(SAMPLE_PERIOD);
    let mut failures = 0;

    let start = Instant::now();
    while start.elapsed() < Duration::from_secs(10) {
        timebase.wait_for_tick();
        match barometer.read_altitude() {
            Ok(altitude) => history.push(altitude),
            Err(e) => {
                failures += 1;
                eprintln!("Read error: {}", e);
                continue;
            }
        }
        let altitude = history.latest().unwrap_or_default();
        match kinematics.update(&history) {
            KinematicsStatus::Available(k) => println!(
                "{:8.2} m  {:9.2} m/s^2  {:6.2} g",
                altitude, k.acceleration, k.g_force
            ),
            KinematicsStatus::Unavailable => println!("{:8.2} m", altitude),
        }
    }

    println!(
        "{} read errors, {} overruns",
        failures,
        timebase.overruns()
    );
    Ok(())
}
