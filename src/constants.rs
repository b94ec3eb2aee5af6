//! Constants used throughout the program.

use std::time::Duration;

/// Number of altitude samples kept in the history (2 seconds at 50 ms).
pub const HISTORY_CAPACITY: usize = 40;

/// Period between two sampling ticks.
pub const SAMPLE_PERIOD: Duration = Duration::from_millis(50);
/// Same period in seconds, used as `T` by the finite differences.
pub const SAMPLE_PERIOD_SECONDS: f32 = 0.05;
pub const SAMPLE_PERIOD_MS: u64 = 50;

/// Samples needed for one acceleration estimate.
pub const KINEMATICS_WINDOW: usize = 4;

/// Standard gravity in m/s^2:
pub const STANDARD_GRAVITY: f32 = 9.80665;

/// Altitude gain over any sample in the history that means we have launched:
pub const LAUNCH_ALTITUDE_GAIN: f32 = 100.0;
/// Altitude change (negative) against any sample in the history that means apogee:
pub const APOGEE_ALTITUDE_DROP: f32 = -5.0;
/// Maximum change against the oldest sample for the rocket to be considered landed:
pub const LANDING_ALTITUDE_TOLERANCE: f32 = 5.0;

/// Data records are downlinked every this many ticks (200 ms):
pub const TRANSMIT_EVERY_TICKS: u64 = 4;
pub const SERIAL_BAUD_RATE: u32 = 9600;

/// Ticks we keep logging after landing before stopping.
pub const DEFAULT_POST_LANDING_TICKS: u64 = 200;
/// Records buffered between the tick and the log writer thread.
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;
