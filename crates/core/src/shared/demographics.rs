use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Gender reported by the sensor for a detected person.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub const ALL: &[Gender] = &[Gender::Male, Gender::Female];
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Male => write!(f, "male"),
            Gender::Female => write!(f, "female"),
        }
    }
}

impl FromStr for Gender {
    type Err = TargetParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" => Ok(Gender::Male),
            "female" | "f" => Ok(Gender::Female),
            other => Err(TargetParseError::Gender(other.to_string())),
        }
    }
}

/// Gender an advertisement is aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetGender {
    Male,
    Female,
    Both,
}

impl TargetGender {
    pub fn matches(self, gender: Gender) -> bool {
        match self {
            TargetGender::Both => true,
            TargetGender::Male => gender == Gender::Male,
            TargetGender::Female => gender == Gender::Female,
        }
    }
}

impl fmt::Display for TargetGender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetGender::Male => write!(f, "male"),
            TargetGender::Female => write!(f, "female"),
            TargetGender::Both => write!(f, "All"),
        }
    }
}

/// Inclusive age range `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeRange {
    pub min: u32,
    pub max: u32,
}

impl AgeRange {
    pub fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, age: u32) -> bool {
        (self.min..=self.max).contains(&age)
    }

    pub fn is_valid(&self) -> bool {
        self.min <= self.max
    }
}

impl fmt::Display for AgeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}

/// The demographic profile currently driving ad selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub age: u32,
    pub gender: Gender,
}

impl Target {
    pub fn new(age: u32, gender: Gender) -> Self {
        Self { age, gender }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}y {}", self.age, self.gender)
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TargetParseError {
    #[error("expected AGE:GENDER, got '{0}'")]
    Format(String),
    #[error("invalid age '{0}'")]
    Age(String),
    #[error("gender must be 'male' or 'female', got '{0}'")]
    Gender(String),
}

/// Parses `AGE:GENDER` (e.g. `30:female`).
impl FromStr for Target {
    type Err = TargetParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (age, gender) = s
            .split_once(':')
            .ok_or_else(|| TargetParseError::Format(s.to_string()))?;
        let age = age
            .trim()
            .parse::<u32>()
            .map_err(|_| TargetParseError::Age(age.trim().to_string()))?;
        Ok(Target::new(age, gender.parse()?))
    }
}
