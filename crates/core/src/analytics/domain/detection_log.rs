use std::collections::VecDeque;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::shared::constants::{ADULT_AGE_LIMIT, DETECTION_LOG_CAPACITY, YOUNG_AGE_LIMIT};
use crate::shared::demographics::Gender;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectionLogEntry {
    pub timestamp: Instant,
    pub age: u32,
    pub gender: Gender,
    /// Ad put on screen in response to this detection, if any.
    pub ad_shown_id: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GenderDistribution {
    pub male: usize,
    pub female: usize,
}

impl GenderDistribution {
    pub fn count(&self, gender: Gender) -> usize {
        match gender {
            Gender::Male => self.male,
            Gender::Female => self.female,
        }
    }

    pub fn total(&self) -> usize {
        self.male + self.female
    }

    /// Percentage of entries with `gender`; 0 when nothing is logged.
    pub fn share(&self, gender: Gender) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.count(gender) as f64 / total as f64 * 100.0,
        }
    }
}

/// Age partition: `<25`, `25..45`, `>=45`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AgeBuckets {
    pub young: usize,
    pub adult: usize,
    pub senior: usize,
}

impl AgeBuckets {
    fn add(&mut self, age: u32) {
        if age < YOUNG_AGE_LIMIT {
            self.young += 1;
        } else if age < ADULT_AGE_LIMIT {
            self.adult += 1;
        } else {
            self.senior += 1;
        }
    }
}

/// Bounded chronological log of detections.
///
/// Appends at the back and evicts from the front once `capacity` is
/// exceeded. Every query recomputes from the entries.
#[derive(Debug, Clone)]
pub struct DetectionLog {
    entries: VecDeque<DetectionLogEntry>,
    capacity: usize,
}

impl DetectionLog {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "detection log capacity must be positive");
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn record(&mut self, entry: DetectionLogEntry) {
        self.entries.push_back(entry);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &DetectionLogEntry> {
        self.entries.iter()
    }

    /// Entries strictly younger than `window` at `now`.
    pub fn recent_count(&self, window: Duration, now: Instant) -> usize {
        self.entries
            .iter()
            .filter(|e| now.saturating_duration_since(e.timestamp) < window)
            .count()
    }

    pub fn gender_distribution(&self) -> GenderDistribution {
        self.entries
            .iter()
            .fold(GenderDistribution::default(), |mut acc, e| {
                match e.gender {
                    Gender::Male => acc.male += 1,
                    Gender::Female => acc.female += 1,
                }
                acc
            })
    }

    pub fn age_buckets(&self) -> AgeBuckets {
        self.entries.iter().fold(AgeBuckets::default(), |mut acc, e| {
            acc.add(e.age);
            acc
        })
    }

    /// Arithmetic mean of logged ages; `0.0` for an empty log.
    pub fn average_age(&self) -> f64 {
        if self.entries.is_empty() {
            return 0.0;
        }
        let sum: u64 = self.entries.iter().map(|e| u64::from(e.age)).sum();
        sum as f64 / self.entries.len() as f64
    }
}

impl Default for DetectionLog {
    fn default() -> Self {
        Self::new(DETECTION_LOG_CAPACITY)
    }
}
