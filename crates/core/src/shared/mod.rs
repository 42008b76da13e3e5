pub mod constants;
pub mod demographics;
pub mod random_source;
