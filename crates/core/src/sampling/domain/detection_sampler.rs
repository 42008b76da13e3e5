use std::time::Instant;

use serde::Serialize;

use super::detected_person::{DetectedPerson, DetectionId};
use super::sampler_config::SamplerConfig;
use super::sensor_policy::SensorPolicy;
use crate::shared::random_source::RandomSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorStatus {
    Active,
    Inactive,
    /// Permanently unavailable (e.g. camera permission denied).
    Unavailable,
}

impl SensorStatus {
    pub fn label(self) -> &'static str {
        match self {
            SensorStatus::Active => "Live",
            SensorStatus::Inactive => "Standby",
            SensorStatus::Unavailable => "Unavailable",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Overlay {
    person: DetectedPerson,
    expires_at: Instant,
}

/// Read-only view of the sampler for the detection overlay.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorSnapshot {
    pub status: SensorStatus,
    pub status_label: &'static str,
    pub frame_rate: f64,
    pub overlay: Option<DetectedPerson>,
    pub detected_count: usize,
}

/// Periodic detection source with a self-expiring overlay marker.
///
/// Holds no history: each emission replaces the overlay, and the overlay
/// disappears `dwell` after the emission that set it.
pub struct DetectionSampler {
    config: SamplerConfig,
    policy: Box<dyn SensorPolicy>,
    rng: Box<dyn RandomSource>,
    status: SensorStatus,
    overlay: Option<Overlay>,
    next_id: u64,
}

impl DetectionSampler {
    pub fn new(
        config: SamplerConfig,
        policy: Box<dyn SensorPolicy>,
        rng: Box<dyn RandomSource>,
    ) -> Self {
        Self {
            config,
            policy,
            rng,
            status: SensorStatus::Inactive,
            overlay: None,
            next_id: 1,
        }
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    pub fn status(&self) -> SensorStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status == SensorStatus::Active
    }

    /// Starts sampling. Returns `false` when already active or unavailable.
    pub fn activate(&mut self) -> bool {
        match self.status {
            SensorStatus::Inactive => {
                self.status = SensorStatus::Active;
                log::info!("Detection started");
                true
            }
            SensorStatus::Active => false,
            SensorStatus::Unavailable => {
                log::warn!("Sensor unavailable; detection stays off");
                false
            }
        }
    }

    /// Stops sampling and clears any live overlay. Returns `false` when
    /// sampling was not running.
    pub fn deactivate(&mut self) -> bool {
        self.overlay = None;
        if self.status == SensorStatus::Active {
            self.status = SensorStatus::Inactive;
            log::info!("Detection stopped");
            true
        } else {
            false
        }
    }

    /// Marks the sensor as permanently unavailable. Returns `true` when it
    /// was running.
    pub fn mark_unavailable(&mut self) -> bool {
        let was_active = self.is_active();
        self.overlay = None;
        self.status = SensorStatus::Unavailable;
        log::warn!("Sensor reported unavailable");
        was_active
    }

    /// One sampling period. Emits at most one detection and, when it does,
    /// replaces the overlay with one expiring `dwell` from `now`.
    pub fn sample(&mut self, now: Instant) -> Option<DetectedPerson> {
        if !self.is_active() {
            return None;
        }
        let reading = self.policy.observe(self.rng.as_mut())?;

        let id = DetectionId(self.next_id);
        self.next_id += 1;
        let person = DetectedPerson::from_reading(id, reading);
        self.overlay = Some(Overlay {
            person,
            expires_at: now + self.config.dwell,
        });
        log::debug!(
            "Detected {id}: {}y {} ({:.1}%)",
            person.age,
            person.gender,
            person.confidence * 100.0
        );
        Some(person)
    }

    /// Clears the overlay once its dwell window has elapsed. Returns `true`
    /// when an overlay was cleared.
    pub fn expire_overlay(&mut self, now: Instant) -> bool {
        match self.overlay {
            Some(overlay) if now >= overlay.expires_at => {
                self.overlay = None;
                log::debug!("Overlay for {} expired", overlay.person.id);
                true
            }
            _ => false,
        }
    }

    pub fn overlay(&self) -> Option<&DetectedPerson> {
        self.overlay.as_ref().map(|o| &o.person)
    }

    pub fn overlay_expires_at(&self) -> Option<Instant> {
        self.overlay.map(|o| o.expires_at)
    }

    pub fn snapshot(&self) -> SensorSnapshot {
        SensorSnapshot {
            status: self.status,
            status_label: self.status.label(),
            frame_rate: self.policy.frame_rate(),
            overlay: self.overlay().copied(),
            detected_count: usize::from(self.overlay.is_some()),
        }
    }
}
