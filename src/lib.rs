//! Flight phase detection for an altimeter payload.
//!
//! Every 50 ms the [`scheduler::SampleScheduler`] reads one altitude, pushes it
//! into a 40-sample [`history::AltitudeHistory`], estimates vertical
//! acceleration, runs the predicate of the current [`phase::FlightPhase`] and
//! hands the resulting records to an [`event::EventSink`].

pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod history;
pub mod kinematics;
pub mod logger;
pub mod phase;
pub mod scheduler;
pub mod sensor;
pub mod timebase;
pub mod transmitter;
