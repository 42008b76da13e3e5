use serde::Serialize;

use crate::catalog::domain::ad_record::AdRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackStatus {
    /// No target and no eligible set.
    Idle,
    /// Counting down the current ad.
    Playing,
    /// Timer frozen by the user.
    Paused,
}

impl PlaybackStatus {
    /// Status text shown next to the playback indicator.
    pub fn label(self) -> &'static str {
        match self {
            PlaybackStatus::Idle => "Standby",
            PlaybackStatus::Playing => "Playing",
            PlaybackStatus::Paused => "Paused",
        }
    }
}

/// Playback state: the eligible set, the rotation cursor and the countdown.
///
/// Invariants, checked after every mutation in debug builds:
/// - `Playing` implies a non-empty eligible set and a valid cursor.
/// - `seconds_remaining <= current.duration_seconds`.
/// - `Idle` implies an empty eligible set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationState {
    eligible_set: Vec<AdRecord>,
    current_index: Option<usize>,
    seconds_remaining: u32,
    status: PlaybackStatus,
}

impl RotationState {
    pub fn idle() -> Self {
        Self {
            eligible_set: Vec::new(),
            current_index: None,
            seconds_remaining: 0,
            status: PlaybackStatus::Idle,
        }
    }

    /// Replaces the eligible set and starts playing its first entry.
    pub fn start(&mut self, eligible_set: Vec<AdRecord>) {
        assert!(
            !eligible_set.is_empty(),
            "cannot start rotation with an empty eligible set"
        );
        self.seconds_remaining = eligible_set[0].duration_seconds;
        self.eligible_set = eligible_set;
        self.current_index = Some(0);
        self.status = PlaybackStatus::Playing;
        self.assert_invariants();
    }

    /// Drops the eligible set and returns to standby.
    pub fn clear(&mut self) {
        *self = Self::idle();
    }

    /// One countdown step. Returns `true` when the rotation advanced to the
    /// next entry. Inert unless playing.
    pub fn tick(&mut self) -> bool {
        if self.status != PlaybackStatus::Playing {
            return false;
        }
        debug_assert!(self.seconds_remaining > 0, "playing with an expired timer");
        self.seconds_remaining = self.seconds_remaining.saturating_sub(1);

        let advanced = if self.seconds_remaining == 0 {
            self.advance();
            true
        } else {
            false
        };
        self.assert_invariants();
        advanced
    }

    /// Playing ⇄ Paused. Resuming keeps the frozen countdown unless it had
    /// run out, in which case the current ad restarts from full duration.
    /// Inert while idle.
    pub fn toggle(&mut self) {
        match self.status {
            PlaybackStatus::Playing => self.status = PlaybackStatus::Paused,
            PlaybackStatus::Paused => {
                if self.seconds_remaining == 0 {
                    self.seconds_remaining = self.current_duration();
                }
                self.status = PlaybackStatus::Playing;
            }
            PlaybackStatus::Idle => {}
        }
        self.assert_invariants();
    }

    fn advance(&mut self) {
        let len = self.eligible_set.len();
        let next = self.current_index.map_or(0, |i| (i + 1) % len);
        self.current_index = Some(next);
        self.seconds_remaining = self.eligible_set[next].duration_seconds;
    }

    fn current_duration(&self) -> u32 {
        self.current_ad().map_or(0, |ad| ad.duration_seconds)
    }

    pub fn eligible_set(&self) -> &[AdRecord] {
        &self.eligible_set
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    pub fn current_ad(&self) -> Option<&AdRecord> {
        self.current_index.and_then(|i| self.eligible_set.get(i))
    }

    pub fn seconds_remaining(&self) -> u32 {
        self.seconds_remaining
    }

    pub fn status(&self) -> PlaybackStatus {
        self.status
    }

    pub fn is_playing(&self) -> bool {
        self.status == PlaybackStatus::Playing
    }

    /// Elapsed fraction of the current ad in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        match self.current_ad() {
            Some(ad) if ad.duration_seconds > 0 => {
                f64::from(ad.duration_seconds - self.seconds_remaining)
                    / f64::from(ad.duration_seconds)
            }
            _ => 0.0,
        }
    }

    fn assert_invariants(&self) {
        match self.status {
            PlaybackStatus::Idle => {
                debug_assert!(self.eligible_set.is_empty(), "idle with an eligible set");
                debug_assert!(self.current_index.is_none(), "idle with a cursor");
            }
            PlaybackStatus::Playing | PlaybackStatus::Paused => {
                debug_assert!(!self.eligible_set.is_empty(), "active with no eligible set");
                debug_assert!(
                    self.current_index.is_some_and(|i| i < self.eligible_set.len()),
                    "cursor out of range"
                );
            }
        }
        if self.status == PlaybackStatus::Playing {
            debug_assert!(self.seconds_remaining > 0, "playing with an expired timer");
        }
        debug_assert!(
            self.seconds_remaining <= self.current_duration(),
            "countdown exceeds the current ad's duration"
        );
    }
}

impl Default for RotationState {
    fn default() -> Self {
        Self::idle()
    }
}
