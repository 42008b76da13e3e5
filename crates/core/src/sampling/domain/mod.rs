pub mod detected_person;
pub mod detection_sampler;
pub mod sampler_config;
pub mod sensor_policy;
