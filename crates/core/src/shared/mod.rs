pub mod config_error;
pub mod constants;
pub mod crop_area;
pub mod endpoint;
pub mod sample_rate;
