use serde::Serialize;

use super::rotation_state::{PlaybackStatus, RotationState};
use crate::catalog::domain::ad_record::AdRecord;
use crate::catalog::domain::catalog::Catalog;
use crate::catalog::domain::eligibility_filter::select_eligible;
use crate::shared::demographics::Target;
use crate::shared::random_source::RandomSource;

/// External stimuli accepted by the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationEvent {
    TargetArrived(Target),
    TargetCleared,
    Tick,
    TogglePlay,
}

/// Why an ad started showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ShowReason {
    /// First entry of a freshly computed eligible set.
    Targeted,
    /// No entry matched; picked at random from the full catalog.
    Fallback,
    /// Previous entry's countdown expired.
    Rotation,
}

/// Ad-shown notification, produced exactly once per show transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdShown {
    pub ad_id: String,
    pub reason: ShowReason,
}

/// Read-only view of the scheduler for "now showing" displays.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RotationSnapshot {
    pub status: PlaybackStatus,
    pub status_label: &'static str,
    pub target: Option<Target>,
    pub targeting_label: String,
    pub current_ad: Option<AdRecord>,
    pub current_index: Option<usize>,
    pub eligible_ids: Vec<String>,
    pub seconds_remaining: u32,
    pub progress: f64,
    pub fallback: bool,
}

/// Targeting and rotation state machine.
///
/// All transitions go through [`RotationScheduler::handle_event`], so a
/// target arrival is fully applied before the next tick is processed.
pub struct RotationScheduler {
    catalog: Catalog,
    rng: Box<dyn RandomSource>,
    state: RotationState,
    target: Option<Target>,
    fallback: bool,
}

impl RotationScheduler {
    pub fn new(catalog: Catalog, rng: Box<dyn RandomSource>) -> Self {
        Self {
            catalog,
            rng,
            state: RotationState::idle(),
            target: None,
            fallback: false,
        }
    }

    /// Applies one event. Returns the ad-shown notification when the event
    /// put a (possibly identical) ad on screen.
    pub fn handle_event(&mut self, event: RotationEvent) -> Option<AdShown> {
        match event {
            RotationEvent::TargetArrived(target) => Some(self.retarget(target)),
            RotationEvent::TargetCleared => {
                self.clear_target();
                None
            }
            RotationEvent::Tick => self.tick(),
            RotationEvent::TogglePlay => {
                self.state.toggle();
                log::info!("Playback {}", self.state.status().label());
                None
            }
        }
    }

    fn retarget(&mut self, target: Target) -> AdShown {
        self.target = Some(target);
        let eligible = select_eligible(&target, self.catalog.ads());

        let reason = if eligible.is_empty() {
            let pick = self.rng.next_index(self.catalog.len());
            let ad = self.catalog.ads()[pick].clone();
            log::warn!(
                "No ad matches {target}; falling back to '{}' ({})",
                ad.title,
                ad.id
            );
            self.state.start(vec![ad]);
            self.fallback = true;
            ShowReason::Fallback
        } else {
            log::debug!("{} eligible ads for {target}", eligible.len());
            self.state.start(eligible);
            self.fallback = false;
            ShowReason::Targeted
        };

        self.shown(reason)
    }

    fn clear_target(&mut self) {
        if self.target.take().is_some() {
            log::info!("Target cleared; entering standby");
        }
        self.state.clear();
        self.fallback = false;
    }

    fn tick(&mut self) -> Option<AdShown> {
        if self.state.tick() {
            Some(self.shown(ShowReason::Rotation))
        } else {
            None
        }
    }

    fn shown(&self, reason: ShowReason) -> AdShown {
        let ad = self
            .state
            .current_ad()
            .expect("a started rotation always has a current ad");
        log::info!(
            "Now showing '{}' ({}) for {}s [{reason:?}]",
            ad.title,
            ad.id,
            ad.duration_seconds
        );
        AdShown {
            ad_id: ad.id.clone(),
            reason,
        }
    }

    pub fn state(&self) -> &RotationState {
        &self.state
    }

    pub fn status(&self) -> PlaybackStatus {
        self.state.status()
    }

    pub fn target(&self) -> Option<Target> {
        self.target
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// True when the current eligible set came from the fallback policy.
    pub fn is_fallback(&self) -> bool {
        self.fallback
    }

    pub fn snapshot(&self) -> RotationSnapshot {
        RotationSnapshot {
            status: self.state.status(),
            status_label: self.state.status().label(),
            target: self.target,
            targeting_label: self
                .target
                .map_or_else(|| "General audience".to_string(), |t| t.to_string()),
            current_ad: self.state.current_ad().cloned(),
            current_index: self.state.current_index(),
            eligible_ids: self
                .state
                .eligible_set()
                .iter()
                .map(|ad| ad.id.clone())
                .collect(),
            seconds_remaining: self.state.seconds_remaining(),
            progress: self.state.progress(),
            fallback: self.fallback,
        }
    }
}
