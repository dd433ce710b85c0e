// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Server error types and HTTP response conversions.

use axum::{
	http::StatusCode,
	response::{IntoResponse, Response},
	Json,
};
use firelink_deploy::DeployError;
use firelink_metrics::MetricsError;
use firelink_reservation::{GatewayError, LifecycleError};
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
	/// Invalid request payload.
	#[error("Invalid request: {0}")]
	BadRequest(String),

	/// A cluster dependency is missing or not answering right now.
	#[error("Service unavailable: {0}")]
	ServiceUnavailable(String),

	/// The cluster or a CLI rejected the call.
	#[error("Upstream error: {0}")]
	UpstreamError(String),

	#[error("Internal error: {0}")]
	Internal(String),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
	pub error: String,
	pub message: String,
}

impl IntoResponse for ServerError {
	fn into_response(self) -> Response {
		let (status, code, message) = match &self {
			ServerError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone()),
			ServerError::ServiceUnavailable(msg) => {
				tracing::warn!(error = %msg, "service unavailable");
				(StatusCode::SERVICE_UNAVAILABLE, "service_unavailable", msg.clone())
			}
			ServerError::UpstreamError(msg) => {
				tracing::warn!(error = %msg, "upstream error");
				(StatusCode::BAD_GATEWAY, "upstream_error", msg.clone())
			}
			ServerError::Internal(msg) => {
				tracing::error!(error = %msg, "internal error");
				(
					StatusCode::INTERNAL_SERVER_ERROR,
					"internal_error",
					"An internal error occurred".to_string(),
				)
			}
		};
		(
			status,
			Json(ErrorResponse {
				error: code.to_string(),
				message,
			}),
		)
			.into_response()
	}
}

impl From<GatewayError> for ServerError {
	fn from(err: GatewayError) -> Self {
		match err {
			GatewayError::Transient(msg) => ServerError::ServiceUnavailable(msg),
			GatewayError::Permanent(msg) => ServerError::UpstreamError(msg),
		}
	}
}

impl From<LifecycleError> for ServerError {
	fn from(err: LifecycleError) -> Self {
		match err {
			LifecycleError::Gateway(err) => err.into(),
			other if other.is_guard_failure() => ServerError::BadRequest(other.to_string()),
			other => ServerError::UpstreamError(other.to_string()),
		}
	}
}

impl From<MetricsError> for ServerError {
	fn from(err: MetricsError) -> Self {
		match err {
			MetricsError::Config(msg) => ServerError::Internal(msg),
			other => ServerError::UpstreamError(other.to_string()),
		}
	}
}

impl From<DeployError> for ServerError {
	fn from(err: DeployError) -> Self {
		match err {
			DeployError::SubsystemUnavailable | DeployError::Transient(_) => {
				ServerError::ServiceUnavailable(err.to_string())
			}
			other => ServerError::UpstreamError(other.to_string()),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn gateway_errors_map_to_status() {
		let transient = ServerError::from(GatewayError::Transient("timeout".into()));
		assert_eq!(transient.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);

		let permanent = ServerError::from(GatewayError::Permanent("no operator".into()));
		assert_eq!(permanent.into_response().status(), StatusCode::BAD_GATEWAY);
	}

	#[test]
	fn guard_failures_are_bad_requests() {
		let err = ServerError::from(LifecycleError::NotReserved {
			namespace: "ephemeral-a".into(),
		});
		assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
	}

	#[test]
	fn internal_errors_hide_details() {
		let response = ServerError::Internal("secret path".into()).into_response();
		assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
	}
}
