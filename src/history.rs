//! Fixed-depth altitude history, oldest sample first.

use fixed_deque::Deque;

use crate::constants::HISTORY_CAPACITY;
use crate::error::{FlightError, FlightResult};

/// The most recent altitude samples. Once full, every push evicts the oldest
/// sample, so `oldest()` is always the reading taken `capacity` ticks ago.
pub struct AltitudeHistory {
    samples: Deque<f32>,
    capacity: usize,
}

impl AltitudeHistory {
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        AltitudeHistory {
            samples: Deque::new(capacity),
            capacity,
        }
    }

    /// Appends the newest sample, dropping the oldest when at capacity.
    pub fn push(&mut self, sample: f32) {
        self.samples.push_back(sample);
    }

    /// Returns the last `k` samples, oldest to newest.
    pub fn window(&self, k: usize) -> FlightResult<Vec<f32>> {
        let available = self.len();
        if k > available {
            return Err(FlightError::InsufficientHistory {
                requested: k,
                available,
            });
        }
        Ok(self.samples.iter().skip(available - k).copied().collect())
    }

    pub fn oldest(&self) -> FlightResult<f32> {
        self.samples
            .iter()
            .next()
            .copied()
            .ok_or(FlightError::InsufficientHistory {
                requested: 1,
                available: 0,
            })
    }

    pub fn latest(&self) -> Option<f32> {
        self.samples.iter().last().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = f32> + '_ {
        self.samples.iter().copied()
    }

    /// Number of valid samples, saturating at the capacity.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

impl Default for AltitudeHistory {
    fn default() -> Self {
        Self::new()
    }
}
