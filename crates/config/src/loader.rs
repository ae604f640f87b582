//! Configuration loading utilities

use crate::Settings;
use config::{Config, ConfigError, Environment, File};

/// Load configuration from the optional config file plus environment
///
/// File keys come from `config/config.{toml,yaml,json}`; environment
/// variables prefixed with `RECON__` override them (double underscore as
/// the section separator, e.g. `RECON__SERVER__PORT=8080`).
pub fn load_config() -> Result<Settings, ConfigError> {
	let s = Config::builder()
		.add_source(File::with_name("config/config").required(false))
		.add_source(
			Environment::with_prefix("RECON")
				.prefix_separator("__")
				.separator("__"),
		)
		.build()?;

	s.try_deserialize()
}
