use std::fmt;

use serde::Serialize;

use crate::shared::demographics::{Gender, Target};

/// Unique identifier assigned to each emitted detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct DetectionId(pub u64);

impl fmt::Display for DetectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "det-{:06}", self.0)
    }
}

/// Normalized overlay position, in percent of the display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// What the sensor reports for one observed person, before an id is assigned.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PersonReading {
    pub age: u32,
    pub gender: Gender,
    /// Detection confidence in `[0, 1]`.
    pub confidence: f64,
    pub position: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DetectedPerson {
    pub id: DetectionId,
    pub age: u32,
    pub gender: Gender,
    pub confidence: f64,
    pub position: Position,
}

impl DetectedPerson {
    pub fn from_reading(id: DetectionId, reading: PersonReading) -> Self {
        debug_assert!(
            (0.0..=1.0).contains(&reading.confidence),
            "confidence outside [0, 1]"
        );
        Self {
            id,
            age: reading.age,
            gender: reading.gender,
            confidence: reading.confidence,
            position: reading.position,
        }
    }

    pub fn target(&self) -> Target {
        Target::new(self.age, self.gender)
    }
}
