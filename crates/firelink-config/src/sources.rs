// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: environment variables and TOML files.

use std::path::PathBuf;
use std::str::FromStr;

use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::layer::ServerConfigLayer;
use crate::secret::load_secret_env;
use crate::sections::{
	ClusterConfigLayer, EnvironmentsConfigLayer, HttpConfigLayer, LoggingConfigLayer,
	MetricsConfigLayer, ReservationConfigLayer,
};

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

/// Trait for configuration sources.
pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<ServerConfigLayer, ConfigError>;
}

/// Built-in defaults source.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		debug!("loading defaults");
		Ok(ServerConfigLayer::default())
	}
}

/// TOML file configuration source.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	/// `FIRELINK_CONFIG` if set, otherwise `/etc/firelink/server.toml`.
	pub fn system() -> Self {
		Self::new(env_var("FIRELINK_CONFIG").unwrap_or_else(|| "/etc/firelink/server.toml".into()))
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(ServerConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: ServerConfigLayer =
			toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
				path: self.path.clone(),
				source: e,
			})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Convention: FIRELINK_<SECTION>_<FIELD>. The deployment's historical
/// names (`PORT`, `OC_SERVER`, `OC_TOKEN`, `PROMETHEUS_URL`) are honoured
/// when the prefixed form is absent.
pub struct EnvSource;

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		debug!("loading environment variables");
		Ok(ServerConfigLayer {
			http: Some(load_http_from_env()?),
			logging: Some(load_logging_from_env()?),
			cluster: Some(load_cluster_from_env()?),
			reservation: Some(load_reservation_from_env()?),
			environments: Some(load_environments_from_env()),
			metrics: Some(load_metrics_from_env()?),
		})
	}
}

fn env_var(name: &str) -> Option<String> {
	std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_bool(name: &str) -> Option<bool> {
	env_var(name).map(|v| v.eq_ignore_ascii_case("true") || v == "1")
}

fn env_parse<T: FromStr>(name: &str) -> Result<Option<T>, ConfigError> {
	match env_var(name) {
		Some(v) => v.parse().map(Some).map_err(|_| ConfigError::InvalidValue {
			key: name.to_string(),
			message: format!("invalid value '{v}'"),
		}),
		None => Ok(None),
	}
}

fn env_parse_either<T: FromStr>(primary: &str, fallback: &str) -> Result<Option<T>, ConfigError> {
	match env_parse(primary)? {
		Some(v) => Ok(Some(v)),
		None => env_parse(fallback),
	}
}

fn load_http_from_env() -> Result<HttpConfigLayer, ConfigError> {
	Ok(HttpConfigLayer {
		host: env_var("FIRELINK_HOST"),
		port: env_parse_either("FIRELINK_PORT", "PORT")?,
	})
}

fn load_logging_from_env() -> Result<LoggingConfigLayer, ConfigError> {
	Ok(LoggingConfigLayer {
		level: env_var("FIRELINK_LOG_LEVEL"),
		format: env_parse("FIRELINK_LOG_FORMAT")?,
	})
}

fn load_cluster_from_env() -> Result<ClusterConfigLayer, ConfigError> {
	let token = match load_secret_env("FIRELINK_CLUSTER_TOKEN")? {
		Some(token) => Some(token),
		None => load_secret_env("OC_TOKEN")?,
	};
	Ok(ClusterConfigLayer {
		server: env_var("FIRELINK_CLUSTER_SERVER").or_else(|| env_var("OC_SERVER")),
		token,
		bonfire_bin: env_var("FIRELINK_BONFIRE_BIN"),
		oc_bin: env_var("FIRELINK_OC_BIN"),
		command_timeout_secs: env_parse("FIRELINK_COMMAND_TIMEOUT_SECS")?,
	})
}

fn load_reservation_from_env() -> Result<ReservationConfigLayer, ConfigError> {
	Ok(ReservationConfigLayer {
		pool: env_var("FIRELINK_RESERVATION_POOL"),
		duration: env_var("FIRELINK_RESERVATION_DURATION"),
		timeout_secs: env_parse("FIRELINK_RESERVATION_TIMEOUT_SECS")?,
		local: env_bool("FIRELINK_RESERVATION_LOCAL"),
		requester: env_var("FIRELINK_RESERVATION_REQUESTER"),
		release_attempts: env_parse("FIRELINK_RESERVATION_RELEASE_ATTEMPTS")?,
		release_interval_ms: env_parse("FIRELINK_RESERVATION_RELEASE_INTERVAL_MS")?,
	})
}

fn load_environments_from_env() -> EnvironmentsConfigLayer {
	EnvironmentsConfigLayer {
		source: env_var("FIRELINK_APPS_SOURCE"),
		target_env: env_var("FIRELINK_TARGET_ENV"),
		ref_env: env_var("FIRELINK_REF_ENV"),
		fallback_ref_env: env_var("FIRELINK_FALLBACK_REF_ENV"),
	}
}

fn load_metrics_from_env() -> Result<MetricsConfigLayer, ConfigError> {
	Ok(MetricsConfigLayer {
		backend: env_parse("FIRELINK_METRICS_BACKEND")?,
		prometheus_url: env_var("FIRELINK_PROMETHEUS_URL").or_else(|| env_var("PROMETHEUS_URL")),
		prometheus_token: load_secret_env("FIRELINK_PROMETHEUS_TOKEN")?,
		accept_invalid_certs: env_bool("FIRELINK_PROMETHEUS_ACCEPT_INVALID_CERTS"),
		query_timeout_secs: env_parse("FIRELINK_METRICS_QUERY_TIMEOUT_SECS")?,
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_precedence_ordering() {
		assert!(Precedence::Environment > Precedence::ConfigFile);
		assert!(Precedence::ConfigFile > Precedence::Defaults);
	}

	#[test]
	fn test_defaults_source_returns_empty_layer() {
		let layer = DefaultsSource.load().unwrap();
		assert!(layer.http.is_none());
		assert!(layer.metrics.is_none());
	}

	#[test]
	fn test_toml_source_missing_file_returns_empty() {
		let source = TomlSource::new("/nonexistent/config.toml");
		let layer = source.load().unwrap();
		assert!(layer.http.is_none());
	}

	#[test]
	fn test_toml_source_invalid_file_errors() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("server.toml");
		std::fs::write(&path, "[http\nport = ").unwrap();
		let err = TomlSource::new(&path).load().unwrap_err();
		assert!(matches!(err, ConfigError::TomlParse { .. }));
	}

	#[test]
	fn test_env_parse_rejects_garbage() {
		std::env::set_var("FIRELINK_TEST_ENV_PARSE_GARBAGE", "not-a-number");
		let result: Result<Option<u16>, _> = env_parse("FIRELINK_TEST_ENV_PARSE_GARBAGE");
		std::env::remove_var("FIRELINK_TEST_ENV_PARSE_GARBAGE");
		assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
	}

	#[test]
	fn test_env_parse_either_prefers_primary() {
		std::env::set_var("FIRELINK_TEST_EITHER_PRIMARY", "7000");
		std::env::set_var("FIRELINK_TEST_EITHER_FALLBACK", "5000");
		let value: Option<u16> =
			env_parse_either("FIRELINK_TEST_EITHER_PRIMARY", "FIRELINK_TEST_EITHER_FALLBACK")
				.unwrap();
		std::env::remove_var("FIRELINK_TEST_EITHER_PRIMARY");
		std::env::remove_var("FIRELINK_TEST_EITHER_FALLBACK");
		assert_eq!(value, Some(7000));
	}
}
