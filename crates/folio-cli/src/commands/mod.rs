//! CLI command implementations.

pub mod config;
pub mod doctor;
pub mod serve;
pub mod status;

pub use config::run_config;
pub use doctor::run_doctor;
pub use serve::run_serve;
pub use status::run_status;
