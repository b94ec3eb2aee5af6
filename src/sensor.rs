//! Altitude sources: the BMP280 barometer in flight, recorded files on the ground.

use std::io::Read;
use std::path::Path;
use std::thread;
use std::time::Duration;

use bmp280::{Bmp280, Bmp280Builder};
use serde::Deserialize;

use crate::error::{FlightResult, SensorError};

/// One altitude reading per call. Must return within a tick; retrying is up to
/// the implementation, the scheduler never retries.
pub trait AltitudeSource {
    fn read_altitude(&mut self) -> Result<f32, SensorError>;

    /// True once the source will never produce another reading.
    fn is_exhausted(&self) -> bool {
        false
    }
}

impl<T: AltitudeSource + ?Sized> AltitudeSource for Box<T> {
    fn read_altitude(&mut self) -> Result<f32, SensorError> {
        (**self).read_altitude()
    }

    fn is_exhausted(&self) -> bool {
        (**self).is_exhausted()
    }
}

pub struct Barometer {
    bmp280: Bmp280,
}

impl Barometer {
    /// Opens the BMP280 and zeroes it, so altitudes are relative to the pad.
    /// We can have I2C errors right after power-up, so keep trying for a bit.
    pub fn new(attempts: u32) -> Result<Self, SensorError> {
        let mut tries = 0;
        let mut bmp280 = loop {
            tries += 1;
            if let Ok(dev) = Bmp280Builder::new().build() {
                break dev;
            }
            if tries >= attempts {
                return Err(SensorError::NotReady { attempts });
            }
            log::info!("Waiting for BMP280 sensor to be ready...");
            thread::sleep(Duration::from_secs(1));
        };

        bmp280
            .zero()
            .map_err(|e| SensorError::ReadFailed(format!("zeroing BMP280: {:?}", e)))?;
        log::info!("BMP280 sensor initialized after {} attempt(s).", tries);
        Ok(Barometer { bmp280 })
    }
}

impl AltitudeSource for Barometer {
    fn read_altitude(&mut self) -> Result<f32, SensorError> {
        self.bmp280
            .altitude_m()
            .map_err(|e| SensorError::ReadFailed(format!("{:?}", e)))
    }
}

#[derive(Deserialize)]
struct ReplayRow {
    altitude: f32,
    #[serde(default)]
    record: Option<String>,
}

/// Plays back altitudes from a CSV file with an `altitude` column, one sample
/// per tick. Flight logs replay as-is: when a `record` column is present only
/// `data` rows are used.
pub struct ReplaySource {
    samples: Vec<f32>,
    next: usize,
}

impl ReplaySource {
    pub fn from_samples(samples: Vec<f32>) -> Self {
        ReplaySource { samples, next: 0 }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> FlightResult<Self> {
        let reader = csv::Reader::from_path(path)?;
        Self::read_rows(reader)
    }

    pub fn from_reader<R: Read>(reader: R) -> FlightResult<Self> {
        Self::read_rows(csv::Reader::from_reader(reader))
    }

    fn read_rows<R: Read>(mut reader: csv::Reader<R>) -> FlightResult<Self> {
        let mut samples = Vec::new();
        for row in reader.deserialize::<ReplayRow>() {
            let row = row?;
            match row.record.as_deref() {
                None | Some("data") => samples.push(row.altitude),
                Some(_) => {}
            }
        }
        Ok(Self::from_samples(samples))
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl AltitudeSource for ReplaySource {
    fn read_altitude(&mut self) -> Result<f32, SensorError> {
        let sample = self
            .samples
            .get(self.next)
            .copied()
            .ok_or(SensorError::ReplayExhausted(self.samples.len()))?;
        self.next += 1;
        Ok(sample)
    }

    fn is_exhausted(&self) -> bool {
        self.next >= self.samples.len()
    }
}
