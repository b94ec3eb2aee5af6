//! Error types for the flight computer.

use std::io;
use thiserror::Error;

pub type FlightResult<T> = Result<T, FlightError>;

#[derive(Error, Debug)]
pub enum FlightError {
    /// Fewer samples have been pushed than the computation needs.
    #[error("insufficient history: requested {requested} samples, {available} available")]
    InsufficientHistory { requested: usize, available: usize },

    #[error("sensor error: {0}")]
    Sensor(#[from] SensorError),

    #[error("log file error: {0}")]
    Io(#[from] io::Error),

    #[error("log encoding error: {0}")]
    Csv(#[from] csv::Error),

    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),
}

/// Failure to acquire one altitude measurement.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SensorError {
    #[error("altimeter not available after {attempts} attempts")]
    NotReady { attempts: u32 },

    #[error("altimeter read failed: {0}")]
    ReadFailed(String),

    #[error("replay exhausted after {0} samples")]
    ReplayExhausted(usize),
}
