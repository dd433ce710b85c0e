// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use thiserror::Error;

/// Result type alias for cluster operations.
pub type K8sResult<T> = Result<T, K8sError>;

/// Errors that can occur during cluster operations.
#[derive(Error, Debug)]
pub enum K8sError {
	#[error("K8s API error: {message}")]
	ApiError { code: Option<u16>, message: String },

	#[error("{kind} not found: {name}")]
	NotFound { kind: &'static str, name: String },

	#[error("Cluster transport error: {message}")]
	Transport { message: String },

	#[error("Failed to decode {what}: {message}")]
	Decode { what: &'static str, message: String },

	#[error("Invalid object: {message}")]
	InvalidObject { message: String },

	#[error("Metrics API not available on this cluster")]
	MetricsUnavailable,

	#[error("Operation timed out")]
	Timeout,
}

impl K8sError {
	/// Whether retrying the same call later could plausibly succeed.
	pub fn is_transient(&self) -> bool {
		match self {
			K8sError::Transport { .. } | K8sError::Timeout => true,
			K8sError::ApiError {
				code: Some(code), ..
			} => *code == 429 || *code >= 500,
			_ => false,
		}
	}

	pub(crate) fn decode(what: &'static str, err: serde_json::Error) -> Self {
		K8sError::Decode {
			what,
			message: err.to_string(),
		}
	}
}

impl From<kube::Error> for K8sError {
	fn from(err: kube::Error) -> Self {
		match err {
			kube::Error::Api(resp) => K8sError::ApiError {
				code: Some(resp.code),
				message: resp.message,
			},
			kube::Error::Service(e) => K8sError::Transport {
				message: e.to_string(),
			},
			kube::Error::SerdeError(e) => K8sError::Decode {
				what: "API response",
				message: e.to_string(),
			},
			other => K8sError::ApiError {
				code: None,
				message: other.to_string(),
			},
		}
	}
}
