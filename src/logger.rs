//! Writes every flight record to a csv file on the SD card.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{FlightError, FlightResult};
use crate::event::{EventSink, FlightRecord};

#[derive(Serialize)]
struct LogRow<'a> {
    tick: u64,
    time_ms: u64,
    record: &'static str,
    phase: Option<char>,
    altitude: f32,
    acceleration: Option<f32>,
    g_force: Option<f32>,
    detail: &'a str,
}

impl<'a> LogRow<'a> {
    fn from_record(record: &'a FlightRecord) -> Self {
        let tick = record.tick_index();
        let time_ms = record.time_ms();
        match record {
            FlightRecord::Transition { kind, altitude, .. } => LogRow {
                tick,
                time_ms,
                record: "event",
                phase: Some(kind.phase_entered().code()),
                altitude: *altitude,
                acceleration: None,
                g_force: None,
                detail: kind.name(),
            },
            FlightRecord::Data {
                altitude,
                acceleration,
                g_force,
                phase,
                ..
            } => LogRow {
                tick,
                time_ms,
                record: "data",
                phase: Some(phase.code()),
                altitude: *altitude,
                acceleration: *acceleration,
                g_force: *g_force,
                detail: "",
            },
            FlightRecord::SensorFault {
                held_altitude,
                reason,
                ..
            } => LogRow {
                tick,
                time_ms,
                record: "fault",
                phase: None,
                altitude: *held_altitude,
                acceleration: None,
                g_force: None,
                detail: reason,
            },
        }
    }
}

/// csv flight log. The csv writer flushes itself when dropped.
pub struct Logger<W: Write = File> {
    writer: csv::Writer<W>,
    path: Option<PathBuf>,
}

impl Logger<File> {
    /// Creates `<dir>/YYYY-MM-DD_HH-MM-SS.csv` (UTC). The header row goes out
    /// with the first record.
    pub fn create(dir: &Path) -> FlightResult<Self> {
        fs::create_dir_all(dir)?;
        let path = dir.join(format!(
            "{}.csv",
            chrono::Utc::now().format("%Y-%m-%d_%H-%M-%S")
        ));
        let writer = csv::Writer::from_path(&path)?;
        log::info!("Logging flight to {}", path.display());

        Ok(Logger {
            writer,
            path: Some(path),
        })
    }
}

impl<W: Write> Logger<W> {
    pub fn from_writer(writer: W) -> Self {
        Logger {
            writer: csv::Writer::from_writer(writer),
            path: None,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn log_record(&mut self, record: &FlightRecord) -> FlightResult<()> {
        self.writer.serialize(LogRow::from_record(record))?;
        Ok(())
    }

    /// Flushes and hands back the underlying writer.
    pub fn into_inner(self) -> FlightResult<W> {
        self.writer
            .into_inner()
            .map_err(|e| FlightError::Io(e.into_error()))
    }
}

impl<W: Write> EventSink for Logger<W> {
    fn emit(&mut self, record: FlightRecord) {
        if let Err(e) = self.log_record(&record) {
            log::error!("Failed to write to log file: {}", e);
        }
    }

    fn flush(&mut self) {
        if let Err(e) = self.writer.flush() {
            log::error!("Failed to flush log file: {}", e);
        }
    }
}
