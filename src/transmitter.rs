//! Radio downlink over a serial port.

use std::io::Write;
use std::time::Duration;

use crate::constants::{SERIAL_BAUD_RATE, TRANSMIT_EVERY_TICKS};
use crate::error::FlightResult;
use crate::event::{EventSink, FlightRecord};

/// Sends phase events as they happen and a data line every 200 ms, so the
/// ground station can follow the flight without the full log rate.
pub struct Transmitter<W: Write = Box<dyn serialport::SerialPort>> {
    port: W,
}

impl Transmitter {
    pub fn open(path: &str) -> FlightResult<Self> {
        let port = serialport::new(path, SERIAL_BAUD_RATE)
            .timeout(Duration::from_millis(100))
            .open()?;
        log::info!("Downlink open on {} at {} baud", path, SERIAL_BAUD_RATE);
        Ok(Transmitter { port })
    }
}

impl<W: Write> Transmitter<W> {
    pub fn from_writer(port: W) -> Self {
        Transmitter { port }
    }

    pub fn into_inner(self) -> W {
        self.port
    }

    fn format(record: &FlightRecord) -> Option<String> {
        match record {
            FlightRecord::Transition {
                kind,
                tick_index,
                altitude,
            } => Some(format!("EVT,{},{},{:.1}\n", kind.name(), tick_index, altitude)),
            FlightRecord::Data {
                tick_index,
                altitude,
                acceleration,
                g_force,
                phase,
            } if tick_index % TRANSMIT_EVERY_TICKS == 0 => Some(format!(
                "{},{},{:.1},{},{}\n",
                phase.code(),
                tick_index,
                altitude,
                optional(*acceleration),
                optional(*g_force)
            )),
            FlightRecord::Data { .. } => None,
            FlightRecord::SensorFault {
                tick_index,
                held_altitude,
                ..
            } => Some(format!("FLT,{},{:.1}\n", tick_index, held_altitude)),
        }
    }
}

fn optional(value: Option<f32>) -> String {
    match value {
        Some(v) => format!("{:.2}", v),
        None => "-".to_string(),
    }
}

impl<W: Write> EventSink for Transmitter<W> {
    fn emit(&mut self, record: FlightRecord) {
        let Some(line) = Self::format(&record) else {
            return;
        };
        if let Err(e) = self.port.write_all(line.as_bytes()) {
            log::warn!("Failed to write to port for transmission: {}", e);
        }
    }

    fn flush(&mut self) {
        if let Err(e) = self.port.flush() {
            log::warn!("Failed to flush downlink: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventKind;
    use crate::phase::FlightPhase;

    fn data(tick_index: u64) -> FlightRecord {
        FlightRecord::Data {
            tick_index,
            altitude: 812.345,
            acceleration: Some(-9.8),
            g_force: Some(-1.0),
            phase: FlightPhase::Descent,
        }
    }

    fn sent(records: Vec<FlightRecord>) -> String {
        let mut transmitter = Transmitter::from_writer(Vec::new());
        for record in records {
            transmitter.emit(record);
        }
        String::from_utf8(transmitter.into_inner()).unwrap()
    }

    #[test]
    fn throttles_data_lines() {
        let out = sent((0..9).map(data).collect());
        assert_eq!(
            out,
            "D,0,812.3,-9.80,-1.00\nD,4,812.3,-9.80,-1.00\nD,8,812.3,-9.80,-1.00\n"
        );
    }

    #[test]
    fn always_sends_events_and_faults() {
        let out = sent(vec![
            FlightRecord::Transition {
                kind: EventKind::Apogee,
                tick_index: 301,
                altitude: 1204.0,
            },
            FlightRecord::SensorFault {
                tick_index: 303,
                held_altitude: 1203.5,
                reason: "nack".to_string(),
            },
        ]);
        assert_eq!(out, "EVT,APOGEE,301,1204.0\nFLT,303,1203.5\n");
    }

    #[test]
    fn missing_kinematics_are_dashes() {
        let out = sent(vec![FlightRecord::Data {
            tick_index: 0,
            altitude: 0.0,
            acceleration: None,
            g_force: None,
            phase: FlightPhase::Prelaunch,
        }]);
        assert_eq!(out, "P,0,0.0,-,-\n");
    }
}
