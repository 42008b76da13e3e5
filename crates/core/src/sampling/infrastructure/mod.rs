pub mod simulated_sensor_policy;
