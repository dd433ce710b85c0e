// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Router construction.

use axum::{
	routing::{get, post},
	Router,
};

use crate::routes::{apps, cluster, health, namespace};
use crate::state::AppState;

pub const API_PREFIX: &str = "/api/firelink";

/// Build the application router. Health is served both at the root and
/// under the API prefix.
pub fn create_router(state: AppState) -> Router {
	let api = Router::new()
		.route("/health", get(health::health_check))
		.route("/namespace/list", get(namespace::list))
		.route("/namespace/describe/{namespace}", get(namespace::describe))
		.route("/namespace/reserve", post(namespace::reserve))
		.route("/namespace/release", post(namespace::release))
		.route("/namespace/resource_metrics", get(namespace::resource_metrics))
		.route(
			"/namespace/resource_metrics/{namespace}",
			get(namespace::resource_metrics_single),
		)
		.route("/namespace/top_pods", post(namespace::top_pods))
		.route("/apps/list", get(apps::list))
		.route("/apps/deploy", post(apps::deploy))
		.route("/cluster/top_nodes", get(cluster::top_nodes))
		.route("/cluster/usage", get(cluster::usage))
		.route("/cluster/cpu_usage", get(cluster::cpu_usage))
		.route("/cluster/memory_usage", get(cluster::memory_usage));

	Router::new()
		.route("/health", get(health::health_check))
		.nest(API_PREFIX, api)
		.with_state(state)
}
