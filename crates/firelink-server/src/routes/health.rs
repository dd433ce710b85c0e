// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Health HTTP handler.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
	Healthy,
	Degraded,
	Unhealthy,
}

#[derive(Debug, Serialize)]
pub struct MetricsHealth {
	pub backend: &'static str,
	pub healthy: bool,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
	pub status: HealthStatus,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub cluster_version: Option<String>,
	pub metrics: MetricsHealth,
}

/// GET /health - cluster reachability plus metrics backend availability.
///
/// Only an unreachable API server makes the service unhealthy.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
	let (cluster, metrics_healthy) =
		tokio::join!(state.cluster.server_version(), state.metrics.is_healthy());

	let cluster_version = match cluster {
		Ok(version) => Some(version),
		Err(err) => {
			tracing::warn!(error = %err, "Cluster health check failed");
			None
		}
	};

	let status = match (&cluster_version, metrics_healthy) {
		(None, _) => HealthStatus::Unhealthy,
		(Some(_), false) => HealthStatus::Degraded,
		(Some(_), true) => HealthStatus::Healthy,
	};
	let code = match status {
		HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
		_ => StatusCode::OK,
	};

	(
		code,
		Json(HealthResponse {
			status,
			cluster_version,
			metrics: MetricsHealth {
				backend: state.metrics.backend(),
				healthy: metrics_healthy,
			},
		}),
	)
}
