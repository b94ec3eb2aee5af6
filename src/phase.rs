//! Flight phase state machine.

use crate::constants::{
    APOGEE_ALTITUDE_DROP, HISTORY_CAPACITY, LANDING_ALTITUDE_TOLERANCE, LAUNCH_ALTITUDE_GAIN,
};
use crate::error::FlightResult;
use crate::event::EventKind;
use crate::history::AltitudeHistory;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum FlightPhase {
    Prelaunch,
    Ascent,
    /// Marker between ascent and descent. The detector reports the apogee
    /// event and moves straight on to `Descent`; if this phase is ever set it
    /// is evaluated exactly like `Descent`.
    Apogee,
    Descent,
    Landed,
}

impl FlightPhase {
    pub fn name(&self) -> &'static str {
        match self {
            FlightPhase::Prelaunch => "Prelaunch",
            FlightPhase::Ascent => "Ascent",
            FlightPhase::Apogee => "Apogee",
            FlightPhase::Descent => "Descent",
            FlightPhase::Landed => "Landed",
        }
    }

    /// Single character used in the log and downlink.
    pub fn code(&self) -> char {
        match self {
            FlightPhase::Prelaunch => 'P',
            FlightPhase::Ascent => 'A',
            FlightPhase::Apogee => 'O',
            FlightPhase::Descent => 'D',
            FlightPhase::Landed => 'L',
        }
    }

    pub fn index(&self) -> u8 {
        *self as u8
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, FlightPhase::Landed)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transition {
    pub from: FlightPhase,
    pub to: FlightPhase,
    pub kind: EventKind,
}

/// Owns the current phase. Only `evaluate` moves it, and only forward.
pub struct PhaseDetector {
    phase: FlightPhase,
}

impl PhaseDetector {
    pub fn new() -> Self {
        PhaseDetector {
            phase: FlightPhase::Prelaunch,
        }
    }

    pub fn phase(&self) -> FlightPhase {
        self.phase
    }

    /// Runs the predicate of the current phase against a full history.
    ///
    /// Returns `Err(InsufficientHistory)` without touching the phase until the
    /// history has filled up; that is "not known yet", not "false". Once
    /// landed the detector is inert.
    pub fn evaluate(&mut self, history: &AltitudeHistory) -> FlightResult<Option<Transition>> {
        if self.phase.is_terminal() {
            return Ok(None);
        }
        let window = history.window(HISTORY_CAPACITY)?;

        let next = match self.phase {
            FlightPhase::Prelaunch => {
                launch_detected(&window).then_some((FlightPhase::Ascent, EventKind::Launch))
            }
            FlightPhase::Ascent => {
                apogee_detected(&window).then_some((FlightPhase::Descent, EventKind::Apogee))
            }
            FlightPhase::Apogee | FlightPhase::Descent => {
                landing_detected(&window).then_some((FlightPhase::Landed, EventKind::Landing))
            }
            FlightPhase::Landed => None,
        };

        Ok(next.map(|(to, kind)| {
            let transition = Transition {
                from: self.phase,
                to,
                kind,
            };
            self.phase = to;
            transition
        }))
    }
}

impl Default for PhaseDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// Any sample in the window more than the launch gain below the newest one.
pub fn launch_detected(window: &[f32]) -> bool {
    let Some(&altitude) = window.last() else {
        return false;
    };
    window
        .iter()
        .any(|&past| altitude - past > LAUNCH_ALTITUDE_GAIN)
}

/// Any sample in the window more than the apogee drop above the newest one.
pub fn apogee_detected(window: &[f32]) -> bool {
    let Some(&altitude) = window.last() else {
        return false;
    };
    window
        .iter()
        .any(|&past| altitude - past < APOGEE_ALTITUDE_DROP)
}

/// Newest sample within tolerance of the oldest one, i.e. altitude has been
/// stable for the whole window.
pub fn landing_detected(window: &[f32]) -> bool {
    match (window.first(), window.last()) {
        (Some(&oldest), Some(&altitude)) => (oldest - altitude).abs() < LANDING_ALTITUDE_TOLERANCE,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FlightError;

    /// 39 copies of `past` followed by `current`.
    fn window_with(past: f32, current: f32) -> Vec<f32> {
        let mut window = vec![past; HISTORY_CAPACITY - 1];
        window.push(current);
        window
    }

    fn full_history(samples: &[f32]) -> AltitudeHistory {
        let mut history = AltitudeHistory::new();
        for &s in samples {
            history.push(s);
        }
        history
    }

    #[test]
    fn launch_threshold_is_strict() {
        assert!(!launch_detected(&window_with(0.0, 100.0)));
        assert!(launch_detected(&window_with(0.0, 100.001)));
    }

    #[test]
    fn launch_needs_only_one_low_sample() {
        let mut window = vec![120.0; HISTORY_CAPACITY];
        window[17] = 10.0;
        *window.last_mut().unwrap() = 120.0;
        assert!(launch_detected(&window));
    }

    #[test]
    fn apogee_threshold_is_strict() {
        assert!(!apogee_detected(&window_with(5.0, 0.0)));
        assert!(apogee_detected(&window_with(5.001, 0.0)));
    }

    #[test]
    fn apogee_needs_only_one_high_sample() {
        let mut window = vec![300.0; HISTORY_CAPACITY];
        window[5] = 310.0;
        assert!(apogee_detected(&window));
    }

    #[test]
    fn landing_threshold_is_strict() {
        assert!(landing_detected(&window_with(0.0, 4.999)));
        assert!(!landing_detected(&window_with(0.0, 5.0)));
        assert!(!landing_detected(&window_with(0.0, -5.5)));
    }

    #[test]
    fn landing_only_compares_against_oldest() {
        let mut window = vec![0.0; HISTORY_CAPACITY];
        window[20] = 500.0;
        assert!(landing_detected(&window));
    }

    #[test]
    fn empty_window_detects_nothing() {
        assert!(!launch_detected(&[]));
        assert!(!apogee_detected(&[]));
        assert!(!landing_detected(&[]));
    }

    #[test]
    fn skips_until_history_is_full() {
        let mut detector = PhaseDetector::new();
        let mut samples = vec![0.0; HISTORY_CAPACITY - 2];
        samples.push(500.0);
        let history = full_history(&samples);

        assert!(matches!(
            detector.evaluate(&history),
            Err(FlightError::InsufficientHistory { .. })
        ));
        assert_eq!(detector.phase(), FlightPhase::Prelaunch);
    }

    #[test]
    fn walks_through_every_phase() {
        let mut detector = PhaseDetector::new();

        let launch = detector
            .evaluate(&full_history(&window_with(0.0, 150.0)))
            .unwrap()
            .unwrap();
        assert_eq!(launch.kind, EventKind::Launch);
        assert_eq!(detector.phase(), FlightPhase::Ascent);

        let apogee = detector
            .evaluate(&full_history(&window_with(800.0, 790.0)))
            .unwrap()
            .unwrap();
        assert_eq!(apogee.kind, EventKind::Apogee);
        assert_eq!(apogee.from, FlightPhase::Ascent);
        assert_eq!(detector.phase(), FlightPhase::Descent);

        let landing = detector
            .evaluate(&full_history(&window_with(2.0, 1.0)))
            .unwrap()
            .unwrap();
        assert_eq!(landing.kind, EventKind::Landing);
        assert_eq!(detector.phase(), FlightPhase::Landed);

        // Inert once landed.
        assert_eq!(
            detector
                .evaluate(&full_history(&window_with(0.0, 500.0)))
                .unwrap(),
            None
        );
        assert_eq!(detector.phase(), FlightPhase::Landed);
    }

    #[test]
    fn does_not_reevaluate_passed_phases() {
        let mut detector = PhaseDetector::new();
        detector
            .evaluate(&full_history(&window_with(0.0, 150.0)))
            .unwrap();
        assert_eq!(detector.phase(), FlightPhase::Ascent);

        // Another jump would satisfy the launch predicate again.
        let again = detector
            .evaluate(&full_history(&window_with(150.0, 400.0)))
            .unwrap();
        assert_eq!(again, None);
        assert_eq!(detector.phase(), FlightPhase::Ascent);
    }

    #[test]
    fn stable_ground_does_not_land_from_prelaunch() {
        let mut detector = PhaseDetector::new();
        let history = full_history(&[0.0; HISTORY_CAPACITY]);
        for _ in 0..10 {
            assert_eq!(detector.evaluate(&history).unwrap(), None);
        }
        assert_eq!(detector.phase(), FlightPhase::Prelaunch);
    }

    #[test]
    fn phase_indices_are_ordered() {
        let phases = [
            FlightPhase::Prelaunch,
            FlightPhase::Ascent,
            FlightPhase::Apogee,
            FlightPhase::Descent,
            FlightPhase::Landed,
        ];
        for pair in phases.windows(2) {
            assert!(pair[0].index() < pair[1].index());
            assert!(pair[0] < pair[1]);
        }
        assert!(FlightPhase::Landed.is_terminal());
    }
}
