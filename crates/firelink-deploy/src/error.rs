// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::time::Duration;

use firelink_bonfire::BonfireError;
use firelink_k8s::K8sError;
use firelink_reservation::{GatewayError, LifecycleError};
use thiserror::Error;

pub type DeployResult<T> = Result<T, DeployError>;

/// Why a deployment stopped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeployError {
	#[error("Namespace Operator not detected on cluster")]
	SubsystemUnavailable,

	#[error("Namespace failure: {0}")]
	Namespace(#[from] LifecycleError),

	#[error("Could not find an environment tied to ns '{namespace}'")]
	EnvironmentNotFound { namespace: String },

	/// Bad input or rejected manifests. Retrying will not help.
	#[error("{0}")]
	Fatal(String),

	#[error("Timed out waiting for resources in '{namespace}' after {}s", .after.as_secs())]
	TimedOut { namespace: String, after: Duration },

	#[error("{0}")]
	Transient(String),

	#[error("Deployment cancelled: observer disconnected")]
	Cancelled,
}

impl DeployError {
	/// Short label for logs.
	pub fn kind(&self) -> &'static str {
		match self {
			DeployError::SubsystemUnavailable => "subsystem_unavailable",
			DeployError::Namespace(_) => "namespace",
			DeployError::EnvironmentNotFound { .. } => "environment_not_found",
			DeployError::Fatal(_) => "fatal",
			DeployError::TimedOut { .. } => "timed_out",
			DeployError::Transient(_) => "transient",
			DeployError::Cancelled => "cancelled",
		}
	}
}

impl From<BonfireError> for DeployError {
	fn from(err: BonfireError) -> Self {
		if err.is_transient() {
			DeployError::Transient(err.reason())
		} else {
			DeployError::Fatal(err.reason())
		}
	}
}

impl From<K8sError> for DeployError {
	fn from(err: K8sError) -> Self {
		if err.is_transient() {
			DeployError::Transient(err.to_string())
		} else {
			DeployError::Fatal(err.to_string())
		}
	}
}

impl From<GatewayError> for DeployError {
	fn from(err: GatewayError) -> Self {
		match err {
			GatewayError::Transient(message) => DeployError::Transient(message),
			GatewayError::Permanent(message) => DeployError::Fatal(message),
		}
	}
}
