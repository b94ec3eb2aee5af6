//! The fixed-rate tick: sample, estimate, detect, record.

use crate::error::{FlightError, SensorError};
use crate::event::{EventSink, FlightRecord};
use crate::history::AltitudeHistory;
use crate::kinematics::{KinematicsEstimator, KinematicsStatus};
use crate::phase::{FlightPhase, PhaseDetector, Transition};
use crate::sensor::AltitudeSource;
use crate::timebase::Timebase;

/// What the phase detector did on one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Detection {
    Evaluated(Option<Transition>),
    /// History not full yet, the predicate was skipped.
    Unavailable,
    /// Landed, nothing left to detect.
    Inert,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TickReport {
    pub tick_index: u64,
    pub altitude: f32,
    pub kinematics: KinematicsStatus,
    pub detection: Detection,
    pub phase: FlightPhase,
    pub sensor_fault: Option<SensorError>,
}

impl TickReport {
    pub fn transition(&self) -> Option<Transition> {
        match self.detection {
            Detection::Evaluated(transition) => transition,
            _ => None,
        }
    }
}

/// Consistent copy of the flight state for readers outside the tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlightSnapshot {
    pub tick_index: u64,
    pub altitude: f32,
    pub acceleration: Option<f32>,
    pub g_force: Option<f32>,
    pub phase: FlightPhase,
    pub sensor_faults: u64,
}

#[derive(Clone, Copy, Debug)]
pub struct RunLimits {
    /// Ticks to keep logging after landing.
    pub post_landing_ticks: u64,
    /// Hard stop, mostly for bench runs.
    pub max_ticks: Option<u64>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunSummary {
    pub ticks: u64,
    pub phase: FlightPhase,
    pub landed_at: Option<u64>,
    pub sensor_faults: u64,
}

pub struct SampleScheduler<S: AltitudeSource, E: EventSink> {
    source: S,
    sink: E,
    history: AltitudeHistory,
    kinematics: KinematicsEstimator,
    detector: PhaseDetector,
    /// Index of the last completed tick; the first tick is 1.
    tick_index: u64,
    last_altitude: f32,
    sensor_faults: u64,
    landed_at: Option<u64>,
}

impl<S: AltitudeSource, E: EventSink> SampleScheduler<S, E> {
    pub fn new(source: S, sink: E) -> Self {
        SampleScheduler {
            source,
            sink,
            history: AltitudeHistory::new(),
            kinematics: KinematicsEstimator::new(),
            detector: PhaseDetector::new(),
            tick_index: 0,
            last_altitude: 0.0,
            sensor_faults: 0,
            landed_at: None,
        }
    }

    /// One sampling period. Never fails: a bad read holds the last altitude
    /// and a short history just skips detection.
    pub fn tick(&mut self) -> TickReport {
        let tick_index = self.tick_index + 1;

        let sensor_fault = match self.source.read_altitude() {
            Ok(altitude) => {
                self.last_altitude = altitude;
                None
            }
            Err(e) => {
                self.sensor_faults += 1;
                log::warn!(
                    "Tick {}: {}, holding {:.2} m",
                    tick_index,
                    e,
                    self.last_altitude
                );
                self.sink.emit(FlightRecord::SensorFault {
                    tick_index,
                    held_altitude: self.last_altitude,
                    reason: e.to_string(),
                });
                Some(e)
            }
        };
        let altitude = self.last_altitude;

        self.history.push(altitude);
        let kinematics = self.kinematics.update(&self.history);
        let detection = self.detect(tick_index, altitude);

        let (acceleration, g_force) = match kinematics {
            KinematicsStatus::Available(k) => (Some(k.acceleration), Some(k.g_force)),
            KinematicsStatus::Unavailable => (None, None),
        };
        let phase = self.detector.phase();
        self.sink.emit(FlightRecord::Data {
            tick_index,
            altitude,
            acceleration,
            g_force,
            phase,
        });

        log::debug!(
            "Tick {}: alt {:.2} m, accel {:?} m/s^2, {:?} g, {}",
            tick_index,
            altitude,
            acceleration,
            g_force,
            phase.name()
        );

        self.tick_index = tick_index;
        TickReport {
            tick_index,
            altitude,
            kinematics,
            detection,
            phase,
            sensor_fault,
        }
    }

    fn detect(&mut self, tick_index: u64, altitude: f32) -> Detection {
        if self.detector.phase().is_terminal() {
            return Detection::Inert;
        }
        match self.detector.evaluate(&self.history) {
            Ok(Some(transition)) => {
                log::info!(
                    "{} at tick {} ({:.2} m): {} -> {}",
                    transition.kind.name(),
                    tick_index,
                    altitude,
                    transition.from.name(),
                    transition.to.name()
                );
                self.sink.emit(FlightRecord::Transition {
                    kind: transition.kind,
                    tick_index,
                    altitude,
                });
                if transition.to.is_terminal() {
                    self.landed_at = Some(tick_index);
                }
                Detection::Evaluated(Some(transition))
            }
            Ok(None) => Detection::Evaluated(None),
            Err(FlightError::InsufficientHistory { .. }) => Detection::Unavailable,
            Err(e) => {
                log::warn!("Tick {}: phase detection failed: {}", tick_index, e);
                Detection::Unavailable
            }
        }
    }

    /// Ticks on `timebase` until landed for `post_landing_ticks`, the source
    /// runs dry, or `max_ticks` is hit. Flushes the sink before returning.
    pub fn run<T: Timebase>(&mut self, timebase: &mut T, limits: RunLimits) -> RunSummary {
        let mut ticks = 0;
        loop {
            if limits.max_ticks.is_some_and(|max| ticks >= max) {
                log::info!("Stopping after {} ticks", ticks);
                break;
            }
            if self.source.is_exhausted() {
                log::info!("Altitude source exhausted after {} ticks", ticks);
                break;
            }
            if let Some(landed_at) = self.landed_at {
                if self.tick_index - landed_at >= limits.post_landing_ticks {
                    log::info!("Landed at tick {}, logging finished", landed_at);
                    break;
                }
            }

            timebase.wait_for_tick();
            self.tick();
            ticks += 1;
        }
        self.sink.flush();

        RunSummary {
            ticks,
            phase: self.detector.phase(),
            landed_at: self.landed_at,
            sensor_faults: self.sensor_faults,
        }
    }

    pub fn snapshot(&self) -> FlightSnapshot {
        FlightSnapshot {
            tick_index: self.tick_index,
            altitude: self.last_altitude,
            acceleration: self.kinematics.acceleration(),
            g_force: self.kinematics.g_force(),
            phase: self.detector.phase(),
            sensor_faults: self.sensor_faults,
        }
    }

    pub fn phase(&self) -> FlightPhase {
        self.detector.phase()
    }

    pub fn history(&self) -> &AltitudeHistory {
        &self.history
    }

    pub fn sink(&self) -> &E {
        &self.sink
    }

    pub fn into_sink(self) -> E {
        self.sink
    }
}
