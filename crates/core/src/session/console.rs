use std::time::Instant;

use serde::Serialize;

use super::console_command::ConsoleCommand;
use super::console_observer::ConsoleObserver;
use crate::analytics::domain::dashboard_stats::DashboardStats;
use crate::analytics::domain::detection_log::{DetectionLog, DetectionLogEntry};
use crate::rotation::domain::rotation_scheduler::{
    AdShown, RotationEvent, RotationScheduler, RotationSnapshot,
};
use crate::sampling::domain::detected_person::DetectedPerson;
use crate::sampling::domain::detection_sampler::{DetectionSampler, SensorSnapshot};
use crate::shared::constants::RECENT_WINDOW;
use crate::shared::demographics::Target;

/// What the event loop must do with the sampling timers after a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerRequest {
    None,
    ArmSampling,
    CancelSampling,
    ArmOverlay,
}

/// Combined read-only view for presentation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsoleSnapshot {
    pub rotation: RotationSnapshot,
    pub sensor: SensorSnapshot,
    pub stats: DashboardStats,
}

/// Process-wide session: wires sensor output into targeting and analytics.
///
/// Every method is invoked from the single event loop, so a target arrival
/// (retarget plus log entry) completes before the next tick is handled.
/// Timer ownership stays with the loop; methods report the timer change
/// they need through [`TimerRequest`].
pub struct Console {
    scheduler: RotationScheduler,
    sampler: DetectionSampler,
    log: DetectionLog,
    observer: Box<dyn ConsoleObserver>,
    started_at: Option<Instant>,
    uptime_seconds: u64,
}

impl Console {
    pub fn new(
        scheduler: RotationScheduler,
        sampler: DetectionSampler,
        log: DetectionLog,
        observer: Box<dyn ConsoleObserver>,
    ) -> Self {
        Self {
            scheduler,
            sampler,
            log,
            observer,
            started_at: None,
            uptime_seconds: 0,
        }
    }

    /// Begins the session and turns the sensor on.
    pub fn start(&mut self, now: Instant) -> TimerRequest {
        if self.started_at.is_none() {
            self.started_at = Some(now);
            self.observer.on_status("Session started");
        }
        self.activate()
    }

    /// Ends the session: stops the sensor and flushes the observer summary.
    pub fn stop(&mut self) -> TimerRequest {
        let request = self.deactivate();
        if self.started_at.take().is_some() {
            self.observer
                .on_status(&format!("Session stopped after {}s", self.uptime_seconds));
            self.observer.summary();
        }
        request
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn is_active(&self) -> bool {
        self.sampler.is_active()
    }

    /// Applies a presentation command. `ShowStats` and `Quit` belong to the
    /// loop and are ignored here.
    pub fn apply(&mut self, command: ConsoleCommand) -> TimerRequest {
        match command {
            ConsoleCommand::TogglePlay => {
                self.toggle_play();
                TimerRequest::None
            }
            ConsoleCommand::ToggleActive => self.toggle_active(),
            ConsoleCommand::SetTarget(target) => {
                self.set_target(target);
                TimerRequest::None
            }
            ConsoleCommand::ClearTarget => {
                self.clear_target();
                TimerRequest::None
            }
            ConsoleCommand::SensorUnavailable => self.mark_sensor_unavailable(),
            ConsoleCommand::ShowStats | ConsoleCommand::Quit => TimerRequest::None,
        }
    }

    pub fn toggle_play(&mut self) {
        self.route(RotationEvent::TogglePlay);
    }

    pub fn toggle_active(&mut self) -> TimerRequest {
        if self.sampler.is_active() {
            self.deactivate()
        } else {
            self.activate()
        }
    }

    /// Manual targeting from presentation. Not written to the detection log.
    pub fn set_target(&mut self, target: Target) {
        self.observer
            .on_status(&format!("Targeting set manually to {target}"));
        self.route(RotationEvent::TargetArrived(target));
    }

    pub fn clear_target(&mut self) {
        self.route(RotationEvent::TargetCleared);
    }

    /// Sensor lost for good: stop sampling and fall back to standby.
    pub fn mark_sensor_unavailable(&mut self) -> TimerRequest {
        let had_overlay = self.sampler.overlay().is_some();
        let was_active = self.sampler.mark_unavailable();
        if had_overlay {
            self.observer.on_overlay_cleared();
        }
        self.observer.on_status("Camera unavailable");
        self.route(RotationEvent::TargetCleared);
        if was_active {
            TimerRequest::CancelSampling
        } else {
            TimerRequest::None
        }
    }

    /// One-second clock: advances uptime and the rotation countdown.
    pub fn on_clock_tick(&mut self) {
        if self.started_at.is_some() {
            self.uptime_seconds += 1;
        }
        self.route(RotationEvent::Tick);
    }

    /// One sampling period. A detection retargets the scheduler and is logged
    /// together with the ad it put on screen.
    pub fn on_sample_tick(&mut self, now: Instant) -> TimerRequest {
        let Some(person) = self.sampler.sample(now) else {
            return TimerRequest::None;
        };
        self.observer.on_detection(&person);
        let shown = self.route(RotationEvent::TargetArrived(person.target()));
        self.record(&person, now, shown.map(|s| s.ad_id));
        TimerRequest::ArmOverlay
    }

    /// Overlay timer fired. Returns `true` when the overlay was removed.
    pub fn on_overlay_timer(&mut self, now: Instant) -> bool {
        let cleared = self.sampler.expire_overlay(now);
        if cleared {
            self.observer.on_overlay_cleared();
        }
        cleared
    }

    pub fn scheduler(&self) -> &RotationScheduler {
        &self.scheduler
    }

    pub fn sampler(&self) -> &DetectionSampler {
        &self.sampler
    }

    pub fn log(&self) -> &DetectionLog {
        &self.log
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.uptime_seconds
    }

    pub fn stats(&self, now: Instant) -> DashboardStats {
        DashboardStats::compute(
            &self.log,
            now,
            RECENT_WINDOW,
            self.sampler.is_active(),
            self.uptime_seconds,
        )
    }

    pub fn snapshot(&self, now: Instant) -> ConsoleSnapshot {
        ConsoleSnapshot {
            rotation: self.scheduler.snapshot(),
            sensor: self.sampler.snapshot(),
            stats: self.stats(now),
        }
    }

    fn activate(&mut self) -> TimerRequest {
        if self.sampler.activate() {
            TimerRequest::ArmSampling
        } else {
            TimerRequest::None
        }
    }

    fn deactivate(&mut self) -> TimerRequest {
        let had_overlay = self.sampler.overlay().is_some();
        let stopped = self.sampler.deactivate();
        if had_overlay {
            self.observer.on_overlay_cleared();
        }
        if stopped {
            TimerRequest::CancelSampling
        } else {
            TimerRequest::None
        }
    }

    fn route(&mut self, event: RotationEvent) -> Option<AdShown> {
        let shown = self.scheduler.handle_event(event);
        if let Some(shown) = &shown {
            self.observer.on_ad_shown(shown);
        }
        shown
    }

    fn record(&mut self, person: &DetectedPerson, now: Instant, ad_shown_id: Option<String>) {
        self.log.record(DetectionLogEntry {
            timestamp: now,
            age: person.age,
            gender: person.gender,
            ad_shown_id,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::domain::catalog::Catalog;
    use crate::rotation::domain::rotation_state::PlaybackStatus;
    use crate::sampling::domain::detected_person::{PersonReading, Position};
    use crate::sampling::domain::detection_sampler::SensorStatus;
    use crate::sampling::domain::sampler_config::SamplerConfig;
    use crate::sampling::domain::sensor_policy::SensorPolicy;
    use crate::session::console_observer::NullConsoleObserver;
    use crate::shared::demographics::Gender;
    use crate::shared::random_source::{RandomSource, ScriptedRandomSource};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Replays a fixed list of readings, one per sample call.
    struct ScriptedPolicy {
        readings: Vec<Option<(u32, Gender)>>,
        calls: usize,
    }

    impl SensorPolicy for ScriptedPolicy {
        fn observe(&mut self, _rng: &mut dyn RandomSource) -> Option<PersonReading> {
            let next = self.readings.get(self.calls).copied().flatten();
            self.calls += 1;
            next.map(|(age, gender)| PersonReading {
                age,
                gender,
                confidence: 0.9,
                position: Position { x: 40.0, y: 60.0 },
            })
        }
    }

    /// Records shown ad ids so tests can check exactly-once notifications.
    #[derive(Clone, Default)]
    struct RecordingObserver {
        shown: Arc<Mutex<Vec<String>>>,
        cleared: Arc<Mutex<usize>>,
    }

    impl ConsoleObserver for RecordingObserver {
        fn on_ad_shown(&mut self, shown: &AdShown) {
            self.shown.lock().unwrap().push(shown.ad_id.clone());
        }
        fn on_detection(&mut self, _person: &DetectedPerson) {}
        fn on_overlay_cleared(&mut self) {
            *self.cleared.lock().unwrap() += 1;
        }
        fn on_status(&mut self, _message: &str) {}
    }

    fn console_with(
        readings: Vec<Option<(u32, Gender)>>,
        observer: Box<dyn ConsoleObserver>,
    ) -> Console {
        let scheduler = RotationScheduler::new(
            Catalog::default(),
            Box::new(ScriptedRandomSource::new([0.0])),
        );
        let sampler = DetectionSampler::new(
            SamplerConfig::default(),
            Box::new(ScriptedPolicy { readings, calls: 0 }),
            Box::new(ScriptedRandomSource::new([0.5])),
        );
        Console::new(scheduler, sampler, DetectionLog::default(), observer)
    }

    fn console(readings: Vec<Option<(u32, Gender)>>) -> Console {
        console_with(readings, Box::new(NullConsoleObserver))
    }

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[test]
    fn test_start_arms_sampling_once() {
        let mut c = console(vec![]);
        let t0 = Instant::now();
        assert_eq!(c.start(t0), TimerRequest::ArmSampling);
        assert_eq!(c.start(t0), TimerRequest::None);
        assert!(c.is_running());
        assert!(c.is_active());
    }

    #[test]
    fn test_stop_cancels_sampling_once() {
        let mut c = console(vec![]);
        c.start(Instant::now());
        assert_eq!(c.stop(), TimerRequest::CancelSampling);
        assert_eq!(c.stop(), TimerRequest::None);
        assert!(!c.is_running());
    }

    #[test]
    fn test_detection_retargets_and_logs_shown_ad() {
        let mut c = console(vec![Some((30, Gender::Female))]);
        let t0 = Instant::now();
        c.start(t0);

        assert_eq!(c.on_sample_tick(t0), TimerRequest::ArmOverlay);

        let snap = c.scheduler().snapshot();
        assert_eq!(snap.status, PlaybackStatus::Playing);
        assert_eq!(snap.eligible_ids, vec!["1", "4"]);
        let entry = c.log().entries().next().unwrap();
        assert_eq!(entry.age, 30);
        assert_eq!(entry.ad_shown_id.as_deref(), Some("1"));
    }

    #[test]
    fn test_empty_sample_changes_nothing() {
        let mut c = console(vec![None]);
        let t0 = Instant::now();
        c.start(t0);
        assert_eq!(c.on_sample_tick(t0), TimerRequest::None);
        assert!(c.log().is_empty());
        assert_eq!(c.scheduler().status(), PlaybackStatus::Idle);
    }

    #[test]
    fn test_clock_tick_rotates_and_notifies_exactly_once() {
        let observer = RecordingObserver::default();
        let shown = observer.shown.clone();
        let mut c = console_with(vec![Some((30, Gender::Male))], Box::new(observer));
        let t0 = Instant::now();
        c.start(t0);
        // 30y male: Gaming Laptop Pro (10s) then Fitness Tracker Pro (12s).
        c.on_sample_tick(t0);
        for _ in 0..9 {
            c.on_clock_tick();
        }
        assert_eq!(*shown.lock().unwrap(), vec!["2"]);
        c.on_clock_tick();
        assert_eq!(*shown.lock().unwrap(), vec!["2", "4"]);
        assert_eq!(c.uptime_seconds(), 10);
    }

    #[test]
    fn test_overlay_cleared_after_dwell() {
        let observer = RecordingObserver::default();
        let cleared = observer.cleared.clone();
        let mut c = console_with(vec![Some((50, Gender::Male))], Box::new(observer));
        let t0 = Instant::now();
        c.start(t0);
        c.on_sample_tick(t0);

        assert!(!c.on_overlay_timer(t0 + secs(1)));
        assert!(c.on_overlay_timer(t0 + secs(3)));
        assert!(c.sampler().overlay().is_none());
        assert_eq!(*cleared.lock().unwrap(), 1);
    }

    #[test]
    fn test_toggle_active_round_trip() {
        let mut c = console(vec![Some((30, Gender::Male))]);
        let t0 = Instant::now();
        c.start(t0);
        c.on_sample_tick(t0);

        assert_eq!(c.toggle_active(), TimerRequest::CancelSampling);
        assert!(c.sampler().overlay().is_none());
        assert_eq!(c.on_sample_tick(t0 + secs(2)), TimerRequest::None);
        assert_eq!(c.toggle_active(), TimerRequest::ArmSampling);
    }

    #[test]
    fn test_deactivation_keeps_current_target() {
        let mut c = console(vec![Some((30, Gender::Male))]);
        let t0 = Instant::now();
        c.start(t0);
        c.on_sample_tick(t0);
        c.toggle_active();
        assert_eq!(c.scheduler().target(), Some(Target::new(30, Gender::Male)));
        assert_eq!(c.scheduler().status(), PlaybackStatus::Playing);
    }

    #[test]
    fn test_sensor_unavailable_goes_idle() {
        let mut c = console(vec![Some((30, Gender::Male))]);
        let t0 = Instant::now();
        c.start(t0);
        c.on_sample_tick(t0);

        assert_eq!(c.mark_sensor_unavailable(), TimerRequest::CancelSampling);
        assert_eq!(c.scheduler().status(), PlaybackStatus::Idle);
        assert_eq!(c.sampler().status(), SensorStatus::Unavailable);
        assert_eq!(c.toggle_active(), TimerRequest::None);
    }

    #[test]
    fn test_manual_target_is_not_logged() {
        let mut c = console(vec![]);
        c.apply(ConsoleCommand::SetTarget(Target::new(60, Gender::Female)));
        assert!(c.log().is_empty());
        assert_eq!(c.scheduler().snapshot().eligible_ids, vec!["3"]);

        c.apply(ConsoleCommand::ClearTarget);
        assert_eq!(c.scheduler().status(), PlaybackStatus::Idle);
    }

    #[test]
    fn test_uptime_only_counts_while_running() {
        let mut c = console(vec![]);
        let t0 = Instant::now();
        c.on_clock_tick();
        assert_eq!(c.uptime_seconds(), 0);
        c.start(t0);
        c.on_clock_tick();
        c.on_clock_tick();
        assert_eq!(c.uptime_seconds(), 2);
    }

    #[test]
    fn test_snapshot_combines_views() {
        let mut c = console(vec![Some((22, Gender::Male))]);
        let t0 = Instant::now();
        c.start(t0);
        c.on_sample_tick(t0);

        let snap = c.snapshot(t0 + secs(1));
        assert_eq!(snap.rotation.targeting_label, "22y male");
        assert_eq!(snap.sensor.detected_count, 1);
        assert_eq!(snap.stats.total_detections, 1);
        assert_eq!(snap.stats.recent_detections, 1);
        assert!(snap.stats.system_active);
    }
}
