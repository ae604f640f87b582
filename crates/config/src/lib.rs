//! Recon Configuration
//!
//! Configuration management and startup utilities for the supply reconciler.

pub mod loader;
pub mod settings;
pub mod startup;

pub use loader::load_config;
pub use settings::{
	CircuitBreakerSettings, LogFormat, LoggingSettings, RetrySettings, ServerSettings, Settings,
	SourceSettings, ValidationSettings,
};
pub use startup::{log_service_info, log_startup_complete};
