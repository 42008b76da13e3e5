pub mod analytics;
pub mod catalog;
pub mod rotation;
pub mod sampling;
pub mod session;
pub mod shared;
