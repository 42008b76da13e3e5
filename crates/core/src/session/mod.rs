pub mod console;
pub mod console_command;
pub mod console_observer;
pub mod infrastructure;
