// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Metrics backend selection.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::secret::SecretString;

/// Which backend serves resource usage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricsBackend {
	/// The cluster's metrics.k8s.io API plus pod specs.
	#[default]
	MetricsServer,
	/// A Prometheus-compatible query API.
	Prometheus,
}

impl std::str::FromStr for MetricsBackend {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().replace('-', "_").as_str() {
			"metrics_server" => Ok(MetricsBackend::MetricsServer),
			"prometheus" => Ok(MetricsBackend::Prometheus),
			other => Err(format!("unknown metrics backend '{other}'")),
		}
	}
}

impl std::fmt::Display for MetricsBackend {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			MetricsBackend::MetricsServer => write!(f, "metrics_server"),
			MetricsBackend::Prometheus => write!(f, "prometheus"),
		}
	}
}

/// Metrics configuration (runtime).
#[derive(Debug, Clone)]
pub struct MetricsConfig {
	pub backend: MetricsBackend,
	pub prometheus_url: Option<String>,
	pub prometheus_token: Option<SecretString>,
	pub accept_invalid_certs: bool,
	pub query_timeout_secs: u64,
}

impl MetricsConfig {
	pub fn query_timeout(&self) -> Duration {
		Duration::from_secs(self.query_timeout_secs)
	}

	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.backend == MetricsBackend::Prometheus && self.prometheus_url.is_none() {
			return Err(ConfigError::Validation(
				"metrics.backend = prometheus requires metrics.prometheus_url".to_string(),
			));
		}
		Ok(())
	}
}

impl Default for MetricsConfig {
	fn default() -> Self {
		MetricsConfigLayer::default().finalize()
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetricsConfigLayer {
	#[serde(default)]
	pub backend: Option<MetricsBackend>,
	#[serde(default)]
	pub prometheus_url: Option<String>,
	#[serde(default)]
	pub prometheus_token: Option<SecretString>,
	#[serde(default)]
	pub accept_invalid_certs: Option<bool>,
	#[serde(default)]
	pub query_timeout_secs: Option<u64>,
}

impl MetricsConfigLayer {
	pub fn merge(&mut self, other: MetricsConfigLayer) {
		if other.backend.is_some() {
			self.backend = other.backend;
		}
		if other.prometheus_url.is_some() {
			self.prometheus_url = other.prometheus_url;
		}
		if other.prometheus_token.is_some() {
			self.prometheus_token = other.prometheus_token;
		}
		if other.accept_invalid_certs.is_some() {
			self.accept_invalid_certs = other.accept_invalid_certs;
		}
		if other.query_timeout_secs.is_some() {
			self.query_timeout_secs = other.query_timeout_secs;
		}
	}

	pub fn finalize(self) -> MetricsConfig {
		MetricsConfig {
			backend: self.backend.unwrap_or_default(),
			prometheus_url: self
				.prometheus_url
				.map(|url| url.trim_end_matches('/').to_string()),
			prometheus_token: self.prometheus_token,
			accept_invalid_certs: self.accept_invalid_certs.unwrap_or(true),
			query_timeout_secs: self.query_timeout_secs.unwrap_or(30),
		}
	}
}
