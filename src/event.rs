//! Records emitted by the flight computer and the sinks that take them.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, SyncSender, TrySendError};
use std::thread::{self, JoinHandle};

use crate::constants::SAMPLE_PERIOD_MS;
use crate::phase::FlightPhase;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventKind {
    Launch,
    Apogee,
    Landing,
}

impl EventKind {
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::Launch => "LAUNCH",
            EventKind::Apogee => "APOGEE",
            EventKind::Landing => "LANDING",
        }
    }

    pub fn phase_entered(&self) -> FlightPhase {
        match self {
            EventKind::Launch => FlightPhase::Ascent,
            EventKind::Apogee => FlightPhase::Descent,
            EventKind::Landing => FlightPhase::Landed,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum FlightRecord {
    Transition {
        kind: EventKind,
        tick_index: u64,
        altitude: f32,
    },
    /// Emitted every tick. Kinematics are `None` until four samples exist.
    Data {
        tick_index: u64,
        altitude: f32,
        acceleration: Option<f32>,
        g_force: Option<f32>,
        phase: FlightPhase,
    },
    /// The altimeter read failed and `held_altitude` was used instead.
    SensorFault {
        tick_index: u64,
        held_altitude: f32,
        reason: String,
    },
}

impl FlightRecord {
    pub fn tick_index(&self) -> u64 {
        match self {
            FlightRecord::Transition { tick_index, .. }
            | FlightRecord::Data { tick_index, .. }
            | FlightRecord::SensorFault { tick_index, .. } => *tick_index,
        }
    }

    /// Nominal time since the first tick.
    pub fn time_ms(&self) -> u64 {
        self.tick_index() * SAMPLE_PERIOD_MS
    }
}

/// Takes records from the tick. Implementations must not block the caller on
/// storage; anything slow goes behind a [`QueuedSink`].
pub trait EventSink {
    fn emit(&mut self, record: FlightRecord);

    fn flush(&mut self) {}
}

impl<T: EventSink + ?Sized> EventSink for Box<T> {
    fn emit(&mut self, record: FlightRecord) {
        (**self).emit(record)
    }

    fn flush(&mut self) {
        (**self).flush()
    }
}

/// Keeps every record in memory.
#[derive(Default)]
pub struct RecordBuffer {
    pub records: Vec<FlightRecord>,
}

impl RecordBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transitions(&self) -> Vec<EventKind> {
        self.records
            .iter()
            .filter_map(|record| match record {
                FlightRecord::Transition { kind, .. } => Some(*kind),
                _ => None,
            })
            .collect()
    }

    pub fn phases(&self) -> Vec<FlightPhase> {
        self.records
            .iter()
            .filter_map(|record| match record {
                FlightRecord::Data { phase, .. } => Some(*phase),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for RecordBuffer {
    fn emit(&mut self, record: FlightRecord) {
        self.records.push(record);
    }
}

/// Sends each record to two sinks, e.g. the flight log and the downlink.
pub struct Fanout<A, B> {
    pub first: A,
    pub second: B,
}

impl<A: EventSink, B: EventSink> Fanout<A, B> {
    pub fn new(first: A, second: B) -> Self {
        Fanout { first, second }
    }
}

impl<A: EventSink, B: EventSink> EventSink for Fanout<A, B> {
    fn emit(&mut self, record: FlightRecord) {
        self.first.emit(record.clone());
        self.second.emit(record);
    }

    fn flush(&mut self) {
        self.first.flush();
        self.second.flush();
    }
}

enum QueueMessage {
    Record(FlightRecord),
    Flush,
}

/// Moves a slow sink onto its own thread behind a bounded queue.
///
/// `emit` never blocks: when the queue is full the record is dropped and
/// counted. A `flush` that finds the queue full is skipped; the writer flushes
/// again once the `QueuedSink` is dropped and the queue has drained.
pub struct QueuedSink {
    sender: Option<SyncSender<QueueMessage>>,
    writer: Option<JoinHandle<()>>,
    dropped: Arc<AtomicU64>,
}

impl QueuedSink {
    pub fn spawn<S>(mut sink: S, capacity: usize) -> Self
    where
        S: EventSink + Send + 'static,
    {
        let (sender, receiver) = mpsc::sync_channel(capacity);
        let writer = thread::spawn(move || {
            for message in receiver {
                match message {
                    QueueMessage::Record(record) => sink.emit(record),
                    QueueMessage::Flush => sink.flush(),
                }
            }
            sink.flush();
        });

        QueuedSink {
            sender: Some(sender),
            writer: Some(writer),
            dropped: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Records discarded because the writer fell behind.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    fn send(&self, message: QueueMessage) {
        let Some(sender) = &self.sender else {
            return;
        };
        match sender.try_send(message) {
            Ok(()) => {}
            Err(TrySendError::Full(QueueMessage::Record(record))) => {
                let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                log::warn!(
                    "Log queue full, dropped record for tick {} ({} dropped so far)",
                    record.tick_index(),
                    dropped
                );
            }
            Err(TrySendError::Full(QueueMessage::Flush)) => {
                log::debug!("Log queue full, flush skipped until the writer drains");
            }
            Err(TrySendError::Disconnected(_)) => {
                log::error!("Log writer thread is gone, record lost");
            }
        }
    }
}

impl EventSink for QueuedSink {
    fn emit(&mut self, record: FlightRecord) {
        self.send(QueueMessage::Record(record));
    }

    fn flush(&mut self) {
        self.send(QueueMessage::Flush);
    }
}

impl Drop for QueuedSink {
    fn drop(&mut self) {
        // Closing the channel ends the writer loop once it has drained.
        self.sender.take();
        if let Some(writer) = self.writer.take() {
            if writer.join().is_err() {
                log::error!("Log writer thread panicked");
            }
        }
    }
}
