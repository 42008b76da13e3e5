pub mod rotation_scheduler;
pub mod rotation_state;
