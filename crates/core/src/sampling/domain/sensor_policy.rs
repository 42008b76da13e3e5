use super::detected_person::PersonReading;
use crate::shared::constants::DEFAULT_FRAME_RATE;
use crate::shared::random_source::RandomSource;

/// Domain interface for the detection source.
///
/// Called once per sampling period while the sampler is active. How ages
/// and genders are produced is entirely up to the implementation.
pub trait SensorPolicy: Send {
    /// Returns a reading when a person was observed this period.
    fn observe(&mut self, rng: &mut dyn RandomSource) -> Option<PersonReading>;

    /// Frames per second currently reported by the source.
    fn frame_rate(&self) -> f64 {
        DEFAULT_FRAME_RATE
    }
}
