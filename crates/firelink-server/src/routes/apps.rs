// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! App catalog and streaming deployment handlers.

use std::convert::Infallible;
use std::time::Duration;

use axum::{
	extract::{Query, State},
	response::sse::{Event, KeepAlive, Sse},
	Json,
};
use firelink_deploy::{AppInfo, AppsQuery, DeployEvent, DeploymentRequest};
use futures::Stream;
use tokio_stream::StreamExt;

use crate::error::ServerError;
use crate::state::AppState;

/// GET /apps/list
pub async fn list(
	State(state): State<AppState>,
	Query(query): Query<AppsQuery>,
) -> Result<Json<Vec<AppInfo>>, ServerError> {
	Ok(Json(state.catalog.list(query).await?))
}

/// POST /apps/deploy - run a deployment and stream its progress.
///
/// Each event is sent with the event name `monitor`, `error` or `end`.
/// Closing the connection abandons the deployment; a namespace it
/// reserved is released.
pub async fn deploy(
	State(state): State<AppState>,
	Json(request): Json<DeploymentRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ServerError> {
	if request.app_names.is_empty() {
		return Err(ServerError::BadRequest("app_names must not be empty".to_string()));
	}
	tracing::info!(
		apps = ?request.app_names,
		namespace = ?request.namespace,
		"Deployment requested"
	);

	let mut events = state.orchestrator.deploy(request).events();
	let stream = async_stream::stream! {
		while let Some(event) = events.next().await {
			yield Ok::<_, Infallible>(to_sse(&event));
		}
	};

	Ok(Sse::new(stream).keep_alive(
		KeepAlive::new()
			.interval(Duration::from_secs(15))
			.text("keep-alive"),
	))
}

fn to_sse(event: &DeployEvent) -> Event {
	let sse = Event::default().event(event.kind.as_str());
	match serde_json::to_string(event) {
		Ok(json) => sse.data(json),
		Err(err) => {
			tracing::error!(error = %err, "Failed to serialize deploy event");
			sse.data(event.message.clone())
		}
	}
}
