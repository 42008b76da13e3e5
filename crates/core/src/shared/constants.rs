use std::time::Duration;

/// Maximum number of entries retained by the detection log.
pub const DETECTION_LOG_CAPACITY: usize = 100;

/// Period of the playback countdown and uptime clock.
pub const CLOCK_TICK: Duration = Duration::from_secs(1);

/// Window used by the dashboard's "in last minute" counter.
pub const RECENT_WINDOW: Duration = Duration::from_secs(60);

pub const DEFAULT_SAMPLE_PERIOD: Duration = Duration::from_millis(2000);
pub const DEFAULT_DETECTION_PROBABILITY: f64 = 0.3;
pub const DEFAULT_OVERLAY_DWELL: Duration = Duration::from_millis(3000);

/// Accepted range for the overlay dwell window.
pub const MIN_OVERLAY_DWELL: Duration = Duration::from_secs(3);
pub const MAX_OVERLAY_DWELL: Duration = Duration::from_secs(8);

/// Simulated sensor age range (inclusive).
pub const SIMULATED_MIN_AGE: u32 = 15;
pub const SIMULATED_MAX_AGE: u32 = 74;

/// Simulated confidence range: `[min, max)`.
pub const SIMULATED_MIN_CONFIDENCE: f64 = 0.80;
pub const SIMULATED_MAX_CONFIDENCE: f64 = 0.95;

/// Overlay positions are percentages of the display in `[min, max)`.
pub const SIMULATED_MIN_POSITION: f64 = 20.0;
pub const SIMULATED_MAX_POSITION: f64 = 80.0;

/// Simulated frame rate reported alongside the sensor status: `[min, max)`.
pub const SIMULATED_MIN_FPS: f64 = 20.0;
pub const SIMULATED_MAX_FPS: f64 = 30.0;
pub const DEFAULT_FRAME_RATE: f64 = 24.0;

/// Age bucket boundaries used by the dashboard: `<25`, `25..45`, `>=45`.
pub const YOUNG_AGE_LIMIT: u32 = 25;
pub const ADULT_AGE_LIMIT: u32 = 45;
