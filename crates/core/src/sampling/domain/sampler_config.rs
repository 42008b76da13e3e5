use std::time::Duration;

use thiserror::Error;

use crate::shared::constants::{
    DEFAULT_DETECTION_PROBABILITY, DEFAULT_OVERLAY_DWELL, DEFAULT_SAMPLE_PERIOD,
    MAX_OVERLAY_DWELL, MIN_OVERLAY_DWELL, SIMULATED_MAX_AGE, SIMULATED_MAX_CONFIDENCE,
    SIMULATED_MIN_AGE, SIMULATED_MIN_CONFIDENCE,
};

#[derive(Error, Debug, PartialEq)]
pub enum SamplerConfigError {
    #[error("sample period must be greater than zero")]
    ZeroPeriod,
    #[error("overlay dwell must be between {min:?} and {max:?}, got {got:?}")]
    DwellOutOfRange {
        got: Duration,
        min: Duration,
        max: Duration,
    },
    #[error("detection probability must be between 0.0 and 1.0, got {0}")]
    Probability(f64),
    #[error("age range {min}-{max} is inverted")]
    AgeRange { min: u32, max: u32 },
    #[error("confidence range must satisfy 0 <= min <= max <= 1, got {min}-{max}")]
    ConfidenceRange { min: f64, max: f64 },
}

/// Timing for the sampling loop and its overlay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplerConfig {
    pub sample_period: Duration,
    pub dwell: Duration,
}

impl SamplerConfig {
    pub fn new(sample_period: Duration, dwell: Duration) -> Result<Self, SamplerConfigError> {
        if sample_period.is_zero() {
            return Err(SamplerConfigError::ZeroPeriod);
        }
        if !(MIN_OVERLAY_DWELL..=MAX_OVERLAY_DWELL).contains(&dwell) {
            return Err(SamplerConfigError::DwellOutOfRange {
                got: dwell,
                min: MIN_OVERLAY_DWELL,
                max: MAX_OVERLAY_DWELL,
            });
        }
        Ok(Self {
            sample_period,
            dwell,
        })
    }
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            sample_period: DEFAULT_SAMPLE_PERIOD,
            dwell: DEFAULT_OVERLAY_DWELL,
        }
    }
}

/// Parameters of the simulated person generator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationConfig {
    pub detection_probability: f64,
    pub min_age: u32,
    pub max_age: u32,
    pub min_confidence: f64,
    pub max_confidence: f64,
}

impl SimulationConfig {
    pub fn with_probability(detection_probability: f64) -> Result<Self, SamplerConfigError> {
        let config = Self {
            detection_probability,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SamplerConfigError> {
        if !(0.0..=1.0).contains(&self.detection_probability) {
            return Err(SamplerConfigError::Probability(self.detection_probability));
        }
        if self.min_age > self.max_age {
            return Err(SamplerConfigError::AgeRange {
                min: self.min_age,
                max: self.max_age,
            });
        }
        let conf_ok = (0.0..=1.0).contains(&self.min_confidence)
            && (0.0..=1.0).contains(&self.max_confidence)
            && self.min_confidence <= self.max_confidence;
        if !conf_ok {
            return Err(SamplerConfigError::ConfidenceRange {
                min: self.min_confidence,
                max: self.max_confidence,
            });
        }
        Ok(())
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            detection_probability: DEFAULT_DETECTION_PROBABILITY,
            min_age: SIMULATED_MIN_AGE,
            max_age: SIMULATED_MAX_AGE,
            min_confidence: SIMULATED_MIN_CONFIDENCE,
            max_confidence: SIMULATED_MAX_CONFIDENCE,
        }
    }
}
