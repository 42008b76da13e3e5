use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{after, never, select, Receiver};

use super::session_timers::{LoopTiming, SessionTimers, TimerLedger};
use crate::session::console::{Console, TimerRequest};
use crate::session::console_command::ConsoleCommand;

/// Why the loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// `run_for` elapsed.
    Deadline,
    /// A `Quit` command arrived.
    Quit,
    /// The shared cancellation flag was raised.
    Cancelled,
    /// Presentation hung up and no deadline can end the run.
    Disconnected,
}

/// Points at which the loop hands control to presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopReport {
    /// After each clock tick has been applied.
    Tick,
    /// The user asked for statistics.
    StatsRequested,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopOutcome {
    pub exit: LoopExit,
    pub ledger: TimerLedger,
}

pub struct LoopConfig {
    pub timing: LoopTiming,
    pub run_for: Option<Duration>,
    pub cancelled: Arc<AtomicBool>,
}

impl LoopConfig {
    pub fn new(timing: LoopTiming) -> Self {
        Self {
            timing,
            run_for: None,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }
}

/// Single-threaded driver for a [`Console`].
///
/// Multiplexes the clock, sampling and overlay timers with presentation
/// commands over one `select!`, so every callback runs to completion before
/// the next one starts. Owns the session lifecycle: starts the console on
/// entry and stops it, cancelling all sampling timers, on every exit path.
pub struct EventLoop {
    config: LoopConfig,
    commands: Receiver<ConsoleCommand>,
}

impl EventLoop {
    pub fn new(config: LoopConfig, commands: Receiver<ConsoleCommand>) -> Self {
        Self { config, commands }
    }

    pub fn run<F>(&mut self, console: &mut Console, mut report: F) -> LoopOutcome
    where
        F: FnMut(&Console, LoopReport, Instant),
    {
        let mut timers = SessionTimers::new(self.config.timing);
        let deadline = self.config.run_for.map_or_else(never, after);
        let mut commands_open = true;

        apply(&mut timers, console.start(Instant::now()));

        let exit = loop {
            if self.config.cancelled.load(Ordering::Relaxed) {
                break LoopExit::Cancelled;
            }

            let clock = timers.clock();
            let sample = timers.sample();
            let overlay = timers.overlay();
            let commands = if commands_open {
                self.commands.clone()
            } else {
                never()
            };

            select! {
                recv(clock) -> _ => {
                    console.on_clock_tick();
                    report(console, LoopReport::Tick, Instant::now());
                }
                recv(sample) -> msg => {
                    if let Ok(at) = msg {
                        apply(&mut timers, console.on_sample_tick(at));
                    }
                }
                recv(overlay) -> msg => {
                    timers.overlay_fired();
                    if let Ok(at) = msg {
                        console.on_overlay_timer(at);
                    }
                }
                recv(commands) -> msg => match msg {
                    Ok(ConsoleCommand::Quit) => break LoopExit::Quit,
                    Ok(ConsoleCommand::ShowStats) => {
                        report(console, LoopReport::StatsRequested, Instant::now());
                    }
                    Ok(command) => apply(&mut timers, console.apply(command)),
                    Err(_) if self.config.run_for.is_none() => break LoopExit::Disconnected,
                    Err(_) => {
                        log::debug!("Command channel closed");
                        commands_open = false;
                    }
                },
                recv(deadline) -> _ => break LoopExit::Deadline,
            }
        };

        apply(&mut timers, console.stop());
        timers.cancel_sampling();
        let ledger = timers.ledger();
        log::debug!("Event loop exited ({exit:?}), timers {ledger:?}");

        LoopOutcome { exit, ledger }
    }
}

fn apply(timers: &mut SessionTimers, request: TimerRequest) {
    match request {
        TimerRequest::None => {}
        TimerRequest::ArmSampling => {
            timers.arm_sampling();
        }
        TimerRequest::CancelSampling => {
            timers.cancel_sampling();
        }
        TimerRequest::ArmOverlay => timers.arm_overlay(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::domain::detection_log::DetectionLog;
    use crate::catalog::domain::catalog::Catalog;
    use crate::rotation::domain::rotation_scheduler::RotationScheduler;
    use crate::rotation::domain::rotation_state::PlaybackStatus;
    use crate::sampling::domain::detection_sampler::DetectionSampler;
    use crate::sampling::domain::sampler_config::{SamplerConfig, SimulationConfig};
    use crate::sampling::infrastructure::simulated_sensor_policy::SimulatedSensorPolicy;
    use crate::session::console_observer::NullConsoleObserver;
    use crate::shared::demographics::{Gender, Target};
    use crate::shared::random_source::RngRandomSource;
    use crossbeam_channel::unbounded;

    fn fast_timing() -> LoopTiming {
        LoopTiming {
            clock: Duration::from_millis(5),
            sample_period: Duration::from_millis(3),
            dwell: Duration::from_millis(10),
        }
    }

    fn console(probability: f64) -> Console {
        let timing = fast_timing();
        let sampler_config = SamplerConfig {
            sample_period: timing.sample_period,
            dwell: timing.dwell,
        };
        let policy = SimulatedSensorPolicy::new(
            SimulationConfig::with_probability(probability).unwrap(),
        );
        Console::new(
            RotationScheduler::new(Catalog::default(), Box::new(RngRandomSource::seeded(1))),
            DetectionSampler::new(
                sampler_config,
                Box::new(policy),
                Box::new(RngRandomSource::seeded(2)),
            ),
            DetectionLog::default(),
            Box::new(NullConsoleObserver),
        )
    }

    fn config(run_for: Duration) -> LoopConfig {
        let mut config = LoopConfig::new(fast_timing());
        config.run_for = Some(run_for);
        config
    }

    #[test]
    fn test_deadline_exit_tears_down_all_timers() {
        let (_tx, rx) = unbounded();
        let mut c = console(1.0);
        let mut ticks = 0;
        let outcome = EventLoop::new(config(Duration::from_millis(150)), rx)
            .run(&mut c, |_, report, _| {
                if report == LoopReport::Tick {
                    ticks += 1;
                }
            });

        assert_eq!(outcome.exit, LoopExit::Deadline);
        assert_eq!(outcome.ledger.pending(), 0);
        assert!(outcome.ledger.armed >= 2);
        assert!(ticks > 0);
        assert!(!c.log().is_empty());
        assert!(!c.is_running());
        assert!(!c.is_active());
    }

    #[test]
    fn test_quit_command_stops_loop() {
        let (tx, rx) = unbounded();
        tx.send(ConsoleCommand::Quit).unwrap();
        let mut c = console(0.0);
        let outcome = EventLoop::new(config(Duration::from_secs(5)), rx).run(&mut c, |_, _, _| {});
        assert_eq!(outcome.exit, LoopExit::Quit);
        assert_eq!(outcome.ledger.pending(), 0);
        assert_eq!(outcome.ledger.cancelled, 1);
    }

    #[test]
    fn test_cancel_flag_stops_loop() {
        let (_tx, rx) = unbounded();
        let mut config = config(Duration::from_secs(5));
        config.cancelled.store(true, Ordering::Relaxed);
        let mut c = console(0.0);
        let outcome = EventLoop::new(config, rx).run(&mut c, |_, _, _| {});
        assert_eq!(outcome.exit, LoopExit::Cancelled);
        assert_eq!(outcome.ledger.pending(), 0);
    }

    #[test]
    fn test_commands_are_applied_in_order() {
        let (tx, rx) = unbounded();
        tx.send(ConsoleCommand::ToggleActive).unwrap();
        tx.send(ConsoleCommand::SetTarget(Target::new(60, Gender::Male)))
            .unwrap();
        tx.send(ConsoleCommand::TogglePlay).unwrap();
        tx.send(ConsoleCommand::ShowStats).unwrap();
        tx.send(ConsoleCommand::Quit).unwrap();

        let mut c = console(0.0);
        let mut stats_requests = 0;
        let outcome = EventLoop::new(config(Duration::from_secs(5)), rx).run(&mut c, |_, r, _| {
            if r == LoopReport::StatsRequested {
                stats_requests += 1;
            }
        });

        assert_eq!(outcome.exit, LoopExit::Quit);
        assert_eq!(stats_requests, 1);
        assert_eq!(c.scheduler().status(), PlaybackStatus::Paused);
        assert_eq!(c.scheduler().snapshot().eligible_ids, vec!["3"]);
        assert_eq!(outcome.ledger.pending(), 0);
    }

    #[test]
    fn test_closed_command_channel_keeps_running_until_deadline() {
        let (tx, rx) = unbounded::<ConsoleCommand>();
        drop(tx);
        let mut c = console(0.0);
        let started = Instant::now();
        let outcome = EventLoop::new(config(Duration::from_millis(60)), rx).run(&mut c, |_, _, _| {});
        assert_eq!(outcome.exit, LoopExit::Deadline);
        assert!(started.elapsed() >= Duration::from_millis(60));
    }

    #[test]
    fn test_closed_command_channel_without_deadline_stops_loop() {
        let (tx, rx) = unbounded::<ConsoleCommand>();
        drop(tx);
        let mut c = console(1.0);
        let outcome = EventLoop::new(LoopConfig::new(fast_timing()), rx).run(&mut c, |_, _, _| {});
        assert_eq!(outcome.exit, LoopExit::Disconnected);
        assert_eq!(outcome.ledger.pending(), 0);
        assert!(!c.is_running());
        assert!(!c.is_active());
    }
}
