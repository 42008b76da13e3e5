use std::time::{Duration, Instant};

use crossbeam_channel::{after, never, tick, Receiver};

use crate::sampling::domain::sampler_config::SamplerConfig;
use crate::shared::constants::CLOCK_TICK;

/// Real-time periods driving the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopTiming {
    pub clock: Duration,
    pub sample_period: Duration,
    pub dwell: Duration,
}

impl LoopTiming {
    pub fn from_config(config: &SamplerConfig) -> Self {
        Self {
            clock: CLOCK_TICK,
            sample_period: config.sample_period,
            dwell: config.dwell,
        }
    }
}

/// Armed/fired/cancelled counters. Once sampling is torn down every armed
/// timer is accounted for as either fired or cancelled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimerLedger {
    pub armed: usize,
    pub fired: usize,
    pub cancelled: usize,
}

impl TimerLedger {
    pub fn pending(&self) -> usize {
        self.armed - self.fired - self.cancelled
    }
}

/// Owns the crossbeam timer channels of one session.
///
/// A cancelled timer is simply dropped and replaced with `never()`, so a
/// `select!` over [`SessionTimers::sample`] and [`SessionTimers::overlay`]
/// can no longer observe it.
pub struct SessionTimers {
    timing: LoopTiming,
    clock: Receiver<Instant>,
    sample: Option<Receiver<Instant>>,
    overlay: Option<Receiver<Instant>>,
    ledger: TimerLedger,
}

impl SessionTimers {
    pub fn new(timing: LoopTiming) -> Self {
        Self {
            timing,
            clock: tick(timing.clock),
            sample: None,
            overlay: None,
            ledger: TimerLedger::default(),
        }
    }

    pub fn timing(&self) -> LoopTiming {
        self.timing
    }

    pub fn clock(&self) -> Receiver<Instant> {
        self.clock.clone()
    }

    pub fn sample(&self) -> Receiver<Instant> {
        self.sample.clone().unwrap_or_else(never)
    }

    pub fn overlay(&self) -> Receiver<Instant> {
        self.overlay.clone().unwrap_or_else(never)
    }

    pub fn is_sampling(&self) -> bool {
        self.sample.is_some()
    }

    pub fn has_overlay(&self) -> bool {
        self.overlay.is_some()
    }

    /// Starts the periodic sampling timer. No-op when already running.
    pub fn arm_sampling(&mut self) -> bool {
        if self.sample.is_some() {
            return false;
        }
        self.sample = Some(tick(self.timing.sample_period));
        self.ledger.armed += 1;
        log::debug!("Sampling timer armed ({:?})", self.timing.sample_period);
        true
    }

    /// (Re)starts the overlay one-shot. A pending one is cancelled first.
    pub fn arm_overlay(&mut self) {
        if self.overlay.take().is_some() {
            self.ledger.cancelled += 1;
        }
        self.overlay = Some(after(self.timing.dwell));
        self.ledger.armed += 1;
    }

    /// The overlay one-shot delivered its message.
    pub fn overlay_fired(&mut self) {
        if self.overlay.take().is_some() {
            self.ledger.fired += 1;
        }
    }

    /// Cancels the sampling timer and any pending overlay. Returns how many
    /// timers were cancelled; a second call returns 0.
    pub fn cancel_sampling(&mut self) -> usize {
        let cancelled =
            usize::from(self.sample.take().is_some()) + usize::from(self.overlay.take().is_some());
        self.ledger.cancelled += cancelled;
        if cancelled > 0 {
            log::debug!("Cancelled {cancelled} session timer(s)");
        }
        cancelled
    }

    pub fn ledger(&self) -> TimerLedger {
        self.ledger
    }
}

impl Drop for SessionTimers {
    fn drop(&mut self) {
        self.cancel_sampling();
        debug_assert_eq!(self.ledger.pending(), 0, "timers leaked past teardown");
    }
}
