// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Centralized configuration management for Firelink.
//!
//! This crate provides:
//! - Layered configuration from multiple sources (defaults, TOML file, environment)
//! - Type-safe configuration with validation
//! - Consistent environment variable naming (`FIRELINK_*`)
//!
//! # Usage
//!
//! ```ignore
//! use firelink_config::load_config;
//!
//! let config = load_config()?;
//! println!("Listening on {}", config.socket_addr());
//! ```

pub mod error;
pub mod layer;
pub mod secret;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::ServerConfigLayer;
pub use secret::{load_secret_env, SecretString, REDACTED};
pub use sections::*;
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};

use tracing::{debug, info};

/// Fully resolved server configuration.
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
	pub http: HttpConfig,
	pub logging: LoggingConfig,
	pub cluster: ClusterConfig,
	pub reservation: ReservationConfig,
	pub environments: EnvironmentsConfig,
	pub metrics: MetricsConfig,
}

impl ServerConfig {
	/// Get the socket address string for binding.
	pub fn socket_addr(&self) -> String {
		format!("{}:{}", self.http.host, self.http.port)
	}
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`FIRELINK_*`)
/// 2. Config file (`/etc/firelink/server.toml` or `FIRELINK_CONFIG`)
/// 3. Built-in defaults
pub fn load_config() -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	])
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(
	config_path: impl Into<std::path::PathBuf>,
) -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	])
}

fn load_from_sources(mut sources: Vec<Box<dyn ConfigSource>>) -> Result<ServerConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = ServerConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		let layer = source.load()?;
		merged.merge(layer);
	}

	finalize(merged)
}

/// Finalize configuration layer into resolved config.
fn finalize(layer: ServerConfigLayer) -> Result<ServerConfig, ConfigError> {
	let http = layer.http.unwrap_or_default().finalize();
	let logging = layer.logging.unwrap_or_default().finalize();
	let cluster = layer.cluster.unwrap_or_default().finalize();
	let reservation = layer.reservation.unwrap_or_default().finalize();
	let environments = layer.environments.unwrap_or_default().finalize();
	let mut metrics = layer.metrics.unwrap_or_default().finalize();

	// Prometheus on the cluster accepts the same bearer token as the API server.
	if metrics.prometheus_token.is_none() {
		metrics.prometheus_token = cluster.token.clone();
	}

	validate_config(&http, &reservation, &metrics)?;

	info!(
		host = %http.host,
		port = http.port,
		bonfire_bin = %cluster.bonfire_bin,
		cluster_login = cluster.login_credentials().is_some(),
		pool = %reservation.pool,
		duration = %reservation.duration,
		release_attempts = reservation.release_attempts,
		target_env = %environments.target_env,
		metrics_backend = %metrics.backend,
		"Server configuration loaded"
	);

	Ok(ServerConfig {
		http,
		logging,
		cluster,
		reservation,
		environments,
		metrics,
	})
}

/// Validate cross-field configuration rules.
fn validate_config(
	http: &HttpConfig,
	reservation: &ReservationConfig,
	metrics: &MetricsConfig,
) -> Result<(), ConfigError> {
	if http.port == 0 {
		return Err(ConfigError::Validation(
			"http.port must be non-zero".to_string(),
		));
	}
	reservation.validate()?;
	metrics.validate()?;
	Ok(())
}
