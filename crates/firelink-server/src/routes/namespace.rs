// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Namespace lifecycle and per-namespace metrics handlers.

use std::collections::BTreeMap;

use axum::{
	extract::{Path, State},
	Json,
};
use firelink_metrics::{PodUsage, ResourceUsageSnapshot};
use firelink_reservation::{
	DescribeResponse, NamespaceSummary, ReleaseRequest, ReleaseResponse, ReserveRequest,
	ReserveResponse,
};
use serde::Deserialize;

use crate::error::ServerError;
use crate::state::AppState;

/// GET /namespace/list
pub async fn list(
	State(state): State<AppState>,
) -> Result<Json<Vec<NamespaceSummary>>, ServerError> {
	Ok(Json(state.lifecycle.list().await?))
}

/// GET /namespace/describe/{namespace}
pub async fn describe(
	State(state): State<AppState>,
	Path(namespace): Path<String>,
) -> Json<DescribeResponse> {
	Json(state.lifecycle.describe(&namespace).await)
}

/// POST /namespace/reserve
pub async fn reserve(
	State(state): State<AppState>,
	Json(request): Json<ReserveRequest>,
) -> Json<ReserveResponse> {
	Json(state.lifecycle.reserve(request).await)
}

/// POST /namespace/release
pub async fn release(
	State(state): State<AppState>,
	Json(request): Json<ReleaseRequest>,
) -> Json<ReleaseResponse> {
	Json(state.lifecycle.release(request).await)
}

/// GET /namespace/resource_metrics - usage for every reserved namespace.
pub async fn resource_metrics(
	State(state): State<AppState>,
) -> Result<Json<BTreeMap<String, ResourceUsageSnapshot>>, ServerError> {
	let reserved: Vec<String> = state
		.lifecycle
		.list()
		.await?
		.into_iter()
		.filter(|ns| ns.reserved)
		.map(|ns| ns.namespace)
		.collect();
	Ok(Json(state.metrics.usage_for_namespaces(&reserved).await))
}

/// GET /namespace/resource_metrics/{namespace}
pub async fn resource_metrics_single(
	State(state): State<AppState>,
	Path(namespace): Path<String>,
) -> Json<ResourceUsageSnapshot> {
	Json(state.metrics.usage_for_namespace(&namespace).await)
}

#[derive(Debug, Deserialize)]
pub struct TopPodsRequest {
	#[serde(default)]
	pub namespace: String,
}

/// POST /namespace/top_pods
pub async fn top_pods(
	State(state): State<AppState>,
	Json(request): Json<TopPodsRequest>,
) -> Result<Json<Vec<PodUsage>>, ServerError> {
	if request.namespace.trim().is_empty() {
		return Err(ServerError::BadRequest("namespace is required".to_string()));
	}
	Ok(Json(state.metrics.top_pods(&request.namespace).await))
}
