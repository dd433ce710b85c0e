// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use axum::{extract::State, Json};
use firelink_metrics::{ClusterUsage, NodeUsage};
use serde::Serialize;

use crate::error::ServerError;
use crate::state::AppState;

/// GET /cluster/top_nodes
pub async fn top_nodes(State(state): State<AppState>) -> Result<Json<Vec<NodeUsage>>, ServerError> {
	Ok(Json(state.metrics.top_nodes().await?))
}

/// GET /cluster/usage
pub async fn usage(State(state): State<AppState>) -> Result<Json<ClusterUsage>, ServerError> {
	Ok(Json(state.metrics.cluster_usage().await?))
}

#[derive(Debug, Serialize)]
pub struct UsagePercent {
	pub usage: String,
}

/// GET /cluster/cpu_usage
pub async fn cpu_usage(State(state): State<AppState>) -> Result<Json<UsagePercent>, ServerError> {
	let usage = state.metrics.cluster_usage().await?;
	Ok(Json(UsagePercent {
		usage: usage.cpu_percent,
	}))
}

/// GET /cluster/memory_usage
pub async fn memory_usage(
	State(state): State<AppState>,
) -> Result<Json<UsagePercent>, ServerError> {
	let usage = state.metrics.cluster_usage().await?;
	Ok(Json(UsagePercent {
		usage: usage.memory_percent,
	}))
}
