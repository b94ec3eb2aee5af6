//! Vertical acceleration and g-force from the altitude history.

use crate::constants::{KINEMATICS_WINDOW, SAMPLE_PERIOD_SECONDS, STANDARD_GRAVITY};
use crate::history::AltitudeHistory;

/// One acceleration estimate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Kinematics {
    pub acceleration: f32,
    pub g_force: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum KinematicsStatus {
    Available(Kinematics),
    /// Fewer than four samples so far. Means "no data", not zero.
    Unavailable,
}

pub struct KinematicsEstimator {
    last: Option<Kinematics>,
}

impl KinematicsEstimator {
    pub fn new() -> Self {
        KinematicsEstimator { last: None }
    }

    /// Recomputes from the four newest samples. Leaves the previous estimate
    /// untouched when the history is too short.
    pub fn update(&mut self, history: &AltitudeHistory) -> KinematicsStatus {
        let Ok(window) = history.window(KINEMATICS_WINDOW) else {
            return KinematicsStatus::Unavailable;
        };
        let acceleration = acceleration([window[0], window[1], window[2], window[3]]);
        let kinematics = Kinematics {
            acceleration,
            g_force: g_force(acceleration),
        };
        self.last = Some(kinematics);
        KinematicsStatus::Available(kinematics)
    }

    pub fn last(&self) -> Option<Kinematics> {
        self.last
    }

    pub fn acceleration(&self) -> Option<f32> {
        self.last.map(|k| k.acceleration)
    }

    pub fn g_force(&self) -> Option<f32> {
        self.last.map(|k| k.g_force)
    }
}

impl Default for KinematicsEstimator {
    fn default() -> Self {
        Self::new()
    }
}

/// Second difference over four consecutive altitudes, oldest first.
///
/// The two velocities come from the first and last pair, leaving a one sample
/// gap between them, and their difference is still divided by a single `T`.
pub fn acceleration(altitudes: [f32; 4]) -> f32 {
    let v0 = (altitudes[1] - altitudes[0]) / SAMPLE_PERIOD_SECONDS;
    let v1 = (altitudes[3] - altitudes[2]) / SAMPLE_PERIOD_SECONDS;
    (v1 - v0) / SAMPLE_PERIOD_SECONDS
}

pub fn g_force(acceleration: f32) -> f32 {
    acceleration / STANDARD_GRAVITY
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn history_of(samples: &[f32]) -> AltitudeHistory {
        let mut history = AltitudeHistory::new();
        for &s in samples {
            history.push(s);
        }
        history
    }

    #[test]
    fn unavailable_until_four_samples() {
        let mut estimator = KinematicsEstimator::new();
        let history = history_of(&[0.0, 1.0, 2.0]);
        assert_eq!(estimator.update(&history), KinematicsStatus::Unavailable);
        assert_eq!(estimator.acceleration(), None);
        assert_eq!(estimator.g_force(), None);
    }

    #[test]
    fn flat_altitude_has_no_acceleration() {
        let mut estimator = KinematicsEstimator::new();
        let status = estimator.update(&history_of(&[0.0, 0.0, 0.0, 0.0]));
        assert_eq!(
            status,
            KinematicsStatus::Available(Kinematics {
                acceleration: 0.0,
                g_force: 0.0
            })
        );
    }

    #[test]
    fn constant_velocity_has_no_acceleration() {
        // v0 = 20, v1 = 20
        assert_abs_diff_eq!(acceleration([0.0, 1.0, 0.0, 1.0]), 0.0, epsilon = 1e-3);
    }

    #[test]
    fn velocity_step() {
        // v0 = 0, v1 = 40
        let a = acceleration([0.0, 0.0, 0.0, 2.0]);
        assert_abs_diff_eq!(a, 800.0, epsilon = 1e-2);
        assert_abs_diff_eq!(g_force(a), 800.0 / 9.80665, epsilon = 1e-3);
    }

    #[test]
    fn negative_acceleration() {
        assert_abs_diff_eq!(acceleration([0.0, 2.0, 0.0, 0.0]), -800.0, epsilon = 1e-2);
    }

    #[test]
    fn uses_newest_four_samples() {
        let mut estimator = KinematicsEstimator::new();
        estimator.update(&history_of(&[5.0, 9.0, 0.0, 0.0, 0.0, 2.0]));
        assert_abs_diff_eq!(estimator.acceleration().unwrap(), 800.0, epsilon = 1e-2);
    }

    #[test]
    fn keeps_last_estimate_when_history_resets() {
        let mut estimator = KinematicsEstimator::new();
        let mut history = history_of(&[0.0, 0.0, 0.0, 2.0]);
        estimator.update(&history);
        history.clear();
        history.push(7.0);

        assert_eq!(estimator.update(&history), KinematicsStatus::Unavailable);
        assert_abs_diff_eq!(estimator.acceleration().unwrap(), 800.0, epsilon = 1e-2);
    }
}
