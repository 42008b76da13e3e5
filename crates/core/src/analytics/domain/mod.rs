pub mod dashboard_stats;
pub mod detection_log;
