// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Cluster access configuration: login credentials and external tool paths.

use std::time::Duration;

use serde::Deserialize;

use crate::secret::SecretString;

const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 900;

/// Cluster configuration (runtime).
#[derive(Debug, Clone)]
pub struct ClusterConfig {
	/// API server URL used for the startup login.
	pub server: Option<String>,
	/// Bearer token used for the startup login.
	pub token: Option<SecretString>,
	pub bonfire_bin: String,
	pub oc_bin: String,
	pub command_timeout_secs: u64,
}

impl ClusterConfig {
	/// Both a server and a token are needed to log in at startup.
	pub fn login_credentials(&self) -> Option<(&str, &SecretString)> {
		match (&self.server, &self.token) {
			(Some(server), Some(token)) => Some((server.as_str(), token)),
			_ => None,
		}
	}

	pub fn command_timeout(&self) -> Duration {
		Duration::from_secs(self.command_timeout_secs)
	}
}

impl Default for ClusterConfig {
	fn default() -> Self {
		ClusterConfigLayer::default().finalize()
	}
}

/// Cluster configuration layer (for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClusterConfigLayer {
	#[serde(default)]
	pub server: Option<String>,
	#[serde(default)]
	pub token: Option<SecretString>,
	#[serde(default)]
	pub bonfire_bin: Option<String>,
	#[serde(default)]
	pub oc_bin: Option<String>,
	#[serde(default)]
	pub command_timeout_secs: Option<u64>,
}

impl ClusterConfigLayer {
	pub fn merge(&mut self, other: ClusterConfigLayer) {
		if other.server.is_some() {
			self.server = other.server;
		}
		if other.token.is_some() {
			self.token = other.token;
		}
		if other.bonfire_bin.is_some() {
			self.bonfire_bin = other.bonfire_bin;
		}
		if other.oc_bin.is_some() {
			self.oc_bin = other.oc_bin;
		}
		if other.command_timeout_secs.is_some() {
			self.command_timeout_secs = other.command_timeout_secs;
		}
	}

	pub fn finalize(self) -> ClusterConfig {
		ClusterConfig {
			server: self.server,
			token: self.token,
			bonfire_bin: self.bonfire_bin.unwrap_or_else(|| "bonfire".to_string()),
			oc_bin: self.oc_bin.unwrap_or_else(|| "oc".to_string()),
			command_timeout_secs: self
				.command_timeout_secs
				.unwrap_or(DEFAULT_COMMAND_TIMEOUT_SECS),
		}
	}
}
