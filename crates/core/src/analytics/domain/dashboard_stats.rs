use std::time::{Duration, Instant};

use serde::Serialize;

use super::detection_log::{AgeBuckets, DetectionLog, GenderDistribution};
use crate::shared::demographics::Gender;

/// Derived statistics for the dashboard, computed from one log snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub system_active: bool,
    pub uptime_seconds: u64,
    pub uptime_label: String,
    pub total_detections: usize,
    pub recent_detections: usize,
    pub gender: GenderDistribution,
    pub male_share: f64,
    pub female_share: f64,
    pub age_buckets: AgeBuckets,
    pub average_age: f64,
}

impl DashboardStats {
    pub fn compute(
        log: &DetectionLog,
        now: Instant,
        recent_window: Duration,
        system_active: bool,
        uptime_seconds: u64,
    ) -> Self {
        let gender = log.gender_distribution();
        Self {
            system_active,
            uptime_seconds,
            uptime_label: format_uptime(uptime_seconds),
            total_detections: log.len(),
            recent_detections: log.recent_count(recent_window, now),
            male_share: gender.share(Gender::Male),
            female_share: gender.share(Gender::Female),
            gender,
            age_buckets: log.age_buckets(),
            average_age: log.average_age(),
        }
    }

    /// Multi-line text rendering used by terminal front-ends.
    pub fn render(&self) -> String {
        let status = if self.system_active {
            "Active"
        } else {
            "Inactive"
        };
        [
            format!("System: {status} (uptime {})", self.uptime_label),
            format!(
                "Detections: {} total, +{} in last minute",
                self.total_detections, self.recent_detections
            ),
            format!(
                "Gender: male {} ({:.0}%), female {} ({:.0}%)",
                self.gender.male, self.male_share, self.gender.female, self.female_share
            ),
            format!(
                "Ages: <25 {}, 25-44 {}, 45+ {} (average {:.1} years)",
                self.age_buckets.young,
                self.age_buckets.adult,
                self.age_buckets.senior,
                self.average_age
            ),
        ]
        .join("\n")
    }
}

/// `"{hours}h {minutes}m"`; seconds are truncated.
pub fn format_uptime(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    format!("{hours}h {minutes}m")
}
