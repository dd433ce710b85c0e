// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Default application source and environment names for template processing.

use serde::{Deserialize, Serialize};

/// Environment names (runtime).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentsConfig {
	pub source: String,
	pub target_env: String,
	pub ref_env: String,
	pub fallback_ref_env: String,
}

impl Default for EnvironmentsConfig {
	fn default() -> Self {
		Self {
			source: "appsre".to_string(),
			target_env: "insights-ephemeral".to_string(),
			ref_env: "insights-stage".to_string(),
			fallback_ref_env: "insights-stage".to_string(),
		}
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnvironmentsConfigLayer {
	#[serde(default)]
	pub source: Option<String>,
	#[serde(default)]
	pub target_env: Option<String>,
	#[serde(default)]
	pub ref_env: Option<String>,
	#[serde(default)]
	pub fallback_ref_env: Option<String>,
}

impl EnvironmentsConfigLayer {
	pub fn merge(&mut self, other: EnvironmentsConfigLayer) {
		if other.source.is_some() {
			self.source = other.source;
		}
		if other.target_env.is_some() {
			self.target_env = other.target_env;
		}
		if other.ref_env.is_some() {
			self.ref_env = other.ref_env;
		}
		if other.fallback_ref_env.is_some() {
			self.fallback_ref_env = other.fallback_ref_env;
		}
	}

	pub fn finalize(self) -> EnvironmentsConfig {
		let defaults = EnvironmentsConfig::default();
		EnvironmentsConfig {
			source: self.source.unwrap_or(defaults.source),
			target_env: self.target_env.unwrap_or(defaults.target_env),
			ref_env: self.ref_env.unwrap_or(defaults.ref_env),
			fallback_ref_env: self.fallback_ref_env.unwrap_or(defaults.fallback_ref_env),
		}
	}
}
