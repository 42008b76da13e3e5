pub mod event_loop;
pub mod session_timers;
