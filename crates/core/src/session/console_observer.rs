use std::collections::HashMap;

use crate::rotation::domain::rotation_scheduler::{AdShown, ShowReason};
use crate::sampling::domain::detected_person::DetectedPerson;

/// Outbound notifications from the console to whatever presents it.
///
/// Decouples the session from specific output mechanisms (log lines, JSON,
/// a GUI) so front-ends can observe without changing the core.
pub trait ConsoleObserver: Send {
    /// Fired exactly once per ad-shown transition.
    fn on_ad_shown(&mut self, shown: &AdShown);

    /// A detection was emitted by the sensor.
    fn on_detection(&mut self, person: &DetectedPerson);

    /// The detection overlay was cleared (dwell elapsed or sensor stopped).
    fn on_overlay_cleared(&mut self);

    /// Human-readable lifecycle message.
    fn on_status(&mut self, message: &str);

    /// Emit an end-of-session summary. Default: no-op.
    fn summary(&self) {}
}

/// Observer that discards everything. Used by tests and embedders that
/// poll snapshots instead.
pub struct NullConsoleObserver;

impl ConsoleObserver for NullConsoleObserver {
    fn on_ad_shown(&mut self, _shown: &AdShown) {}
    fn on_detection(&mut self, _person: &DetectedPerson) {}
    fn on_overlay_cleared(&mut self) {}
    fn on_status(&mut self, _message: &str) {}
}

/// Observer that writes through the `log` facade and tallies impressions
/// for an end-of-session report.
#[derive(Default)]
pub struct LogConsoleObserver {
    impressions: HashMap<String, usize>,
    fallbacks: usize,
    detections: usize,
}

impl LogConsoleObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn impressions_for(&self, ad_id: &str) -> usize {
        self.impressions.get(ad_id).copied().unwrap_or(0)
    }

    pub fn total_impressions(&self) -> usize {
        self.impressions.values().sum()
    }

    /// Returns the formatted summary, or `None` if nothing happened.
    pub fn summary_string(&self) -> Option<String> {
        if self.impressions.is_empty() && self.detections == 0 {
            return None;
        }

        let mut lines = vec![format!(
            "Session summary ({} detections, {} impressions, {} fallbacks):",
            self.detections,
            self.total_impressions(),
            self.fallbacks
        )];

        let mut ids: Vec<_> = self.impressions.keys().collect();
        ids.sort();
        for id in ids {
            lines.push(format!("  ad {id:>4}: {} shows", self.impressions[id]));
        }
        Some(lines.join("\n"))
    }
}

impl ConsoleObserver for LogConsoleObserver {
    fn on_ad_shown(&mut self, shown: &AdShown) {
        *self.impressions.entry(shown.ad_id.clone()).or_default() += 1;
        if shown.reason == ShowReason::Fallback {
            self.fallbacks += 1;
        }
        log::info!("Ad viewed: {} ({:?})", shown.ad_id, shown.reason);
    }

    fn on_detection(&mut self, person: &DetectedPerson) {
        self.detections += 1;
        log::info!(
            "Person {}: {}y {} at ({:.0}%, {:.0}%), confidence {:.1}%",
            person.id,
            person.age,
            person.gender,
            person.position.x,
            person.position.y,
            person.confidence * 100.0
        );
    }

    fn on_overlay_cleared(&mut self) {
        log::debug!("Detection overlay cleared");
    }

    fn on_status(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampling::domain::detected_person::{DetectionId, PersonReading, Position};
    use crate::shared::demographics::Gender;

    fn shown(id: &str, reason: ShowReason) -> AdShown {
        AdShown {
            ad_id: id.to_string(),
            reason,
        }
    }

    fn person() -> DetectedPerson {
        DetectedPerson::from_reading(
            DetectionId(1),
            PersonReading {
                age: 30,
                gender: Gender::Male,
                confidence: 0.9,
                position: Position { x: 30.0, y: 40.0 },
            },
        )
    }

    #[test]
    fn test_null_observer_all_methods_are_noop() {
        let mut observer = NullConsoleObserver;
        observer.on_ad_shown(&shown("1", ShowReason::Targeted));
        observer.on_detection(&person());
        observer.on_overlay_cleared();
        observer.on_status("hello");
        observer.summary();
    }

    #[test]
    fn test_impressions_are_tallied_per_ad() {
        let mut observer = LogConsoleObserver::new();
        observer.on_ad_shown(&shown("1", ShowReason::Targeted));
        observer.on_ad_shown(&shown("1", ShowReason::Rotation));
        observer.on_ad_shown(&shown("3", ShowReason::Fallback));

        assert_eq!(observer.impressions_for("1"), 2);
        assert_eq!(observer.impressions_for("3"), 1);
        assert_eq!(observer.impressions_for("9"), 0);
        assert_eq!(observer.total_impressions(), 3);
        assert_eq!(observer.fallbacks, 1);
    }

    #[test]
    fn test_summary_lists_ads_and_counts() {
        let mut observer = LogConsoleObserver::new();
        observer.on_detection(&person());
        observer.on_ad_shown(&shown("2", ShowReason::Targeted));
        observer.on_ad_shown(&shown("1", ShowReason::Fallback));

        let summary = observer.summary_string().unwrap();
        assert!(summary.contains("1 detections, 2 impressions, 1 fallbacks"));
        let first = summary.find("ad    1").unwrap();
        let second = summary.find("ad    2").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_empty_summary_returns_none() {
        assert!(LogConsoleObserver::new().summary_string().is_none());
    }

    #[test]
    fn test_status_messages_leave_no_state_behind() {
        let mut observer = LogConsoleObserver::new();
        for _ in 0..1000 {
            observer.on_status("Detection started");
        }
        assert!(observer.summary_string().is_none());
        assert_eq!(observer.total_impressions(), 0);
    }
}
