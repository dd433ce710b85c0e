// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Namespace reservation defaults and release-confirmation policy.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Reservation configuration (runtime).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationConfig {
	/// Pool type used when a request does not name one.
	pub pool: String,
	/// Reservation duration, in the provisioning tool's format (`1h`, `90m`).
	pub duration: String,
	/// Seconds to wait for a namespace to become available when reserving.
	pub timeout_secs: u64,
	/// Whether the provisioning tool should run against the local cluster context.
	pub local: bool,
	/// Requester recorded when a request does not carry one.
	pub requester: Option<String>,
	/// Reservation-state checks after a release before giving up.
	pub release_attempts: u32,
	/// Delay before each reservation-state check, in milliseconds.
	pub release_interval_ms: u64,
}

impl ReservationConfig {
	pub fn release_interval(&self) -> Duration {
		Duration::from_millis(self.release_interval_ms)
	}

	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.release_attempts == 0 {
			return Err(ConfigError::Validation(
				"reservation.release_attempts must be at least 1".to_string(),
			));
		}
		humantime::parse_duration(&self.duration).map_err(|e| ConfigError::InvalidValue {
			key: "reservation.duration".to_string(),
			message: format!("'{}': {e}", self.duration),
		})?;
		Ok(())
	}
}

impl Default for ReservationConfig {
	fn default() -> Self {
		ReservationConfigLayer::default().finalize()
	}
}

/// Reservation configuration layer (for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReservationConfigLayer {
	#[serde(default)]
	pub pool: Option<String>,
	#[serde(default)]
	pub duration: Option<String>,
	#[serde(default)]
	pub timeout_secs: Option<u64>,
	#[serde(default)]
	pub local: Option<bool>,
	#[serde(default)]
	pub requester: Option<String>,
	#[serde(default)]
	pub release_attempts: Option<u32>,
	#[serde(default)]
	pub release_interval_ms: Option<u64>,
}

impl ReservationConfigLayer {
	pub fn merge(&mut self, other: ReservationConfigLayer) {
		if other.pool.is_some() {
			self.pool = other.pool;
		}
		if other.duration.is_some() {
			self.duration = other.duration;
		}
		if other.timeout_secs.is_some() {
			self.timeout_secs = other.timeout_secs;
		}
		if other.local.is_some() {
			self.local = other.local;
		}
		if other.requester.is_some() {
			self.requester = other.requester;
		}
		if other.release_attempts.is_some() {
			self.release_attempts = other.release_attempts;
		}
		if other.release_interval_ms.is_some() {
			self.release_interval_ms = other.release_interval_ms;
		}
	}

	pub fn finalize(self) -> ReservationConfig {
		ReservationConfig {
			pool: self.pool.unwrap_or_else(|| "default".to_string()),
			duration: self.duration.unwrap_or_else(|| "1h".to_string()),
			timeout_secs: self.timeout_secs.unwrap_or(600),
			local: self.local.unwrap_or(true),
			requester: self.requester,
			release_attempts: self.release_attempts.unwrap_or(30),
			release_interval_ms: self.release_interval_ms.unwrap_or(1000),
		}
	}
}
