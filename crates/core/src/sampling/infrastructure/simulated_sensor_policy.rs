use crate::sampling::domain::detected_person::{PersonReading, Position};
use crate::sampling::domain::sampler_config::SimulationConfig;
use crate::sampling::domain::sensor_policy::SensorPolicy;
use crate::shared::constants::{
    DEFAULT_FRAME_RATE, SIMULATED_MAX_FPS, SIMULATED_MAX_POSITION, SIMULATED_MIN_FPS,
    SIMULATED_MIN_POSITION,
};
use crate::shared::demographics::Gender;
use crate::shared::random_source::RandomSource;

/// Stand-in for a camera plus demographic model.
///
/// Each period: with `detection_probability` a person is "seen" with a
/// uniform age, a coin-flip gender, a confidence in the configured range
/// and a random overlay position. The reported frame rate jitters every
/// period whether or not anyone was seen.
pub struct SimulatedSensorPolicy {
    config: SimulationConfig,
    frame_rate: f64,
}

impl SimulatedSensorPolicy {
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            config,
            frame_rate: DEFAULT_FRAME_RATE,
        }
    }

    fn read_person(&self, rng: &mut dyn RandomSource) -> PersonReading {
        let span = u64::from(self.config.max_age.saturating_sub(self.config.min_age)) + 1;
        let span = usize::try_from(span).unwrap_or(usize::MAX);
        let offset = u32::try_from(rng.next_index(span)).unwrap_or(u32::MAX);
        let age = self
            .config
            .min_age
            .saturating_add(offset)
            .min(self.config.max_age);
        let gender = if rng.next_unit() > 0.5 {
            Gender::Male
        } else {
            Gender::Female
        };
        let confidence = rng.next_in(self.config.min_confidence, self.config.max_confidence);
        let position = Position {
            x: rng.next_in(SIMULATED_MIN_POSITION, SIMULATED_MAX_POSITION),
            y: rng.next_in(SIMULATED_MIN_POSITION, SIMULATED_MAX_POSITION),
        };
        PersonReading {
            age,
            gender,
            confidence,
            position,
        }
    }
}

impl Default for SimulatedSensorPolicy {
    fn default() -> Self {
        Self::new(SimulationConfig::default())
    }
}

impl SensorPolicy for SimulatedSensorPolicy {
    fn observe(&mut self, rng: &mut dyn RandomSource) -> Option<PersonReading> {
        let reading = if rng.next_unit() < self.config.detection_probability {
            Some(self.read_person(rng))
        } else {
            None
        };
        self.frame_rate = rng.next_in(SIMULATED_MIN_FPS, SIMULATED_MAX_FPS);
        reading
    }

    fn frame_rate(&self) -> f64 {
        self.frame_rate
    }
}
