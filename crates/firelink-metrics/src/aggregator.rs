// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{info, warn};

use crate::error::MetricsResult;
use crate::source::MetricsSource;
use crate::types::{ClusterUsage, NodeUsage, PodUsage, ResourceUsageSnapshot};

/// Read-side facade over a [`MetricsSource`].
///
/// Per-namespace and per-pod failures are logged and replaced with zero
/// values so one broken namespace never hides the rest.
#[derive(Clone)]
pub struct MetricsAggregator {
	source: Arc<dyn MetricsSource>,
}

impl MetricsAggregator {
	pub fn new(source: Arc<dyn MetricsSource>) -> Self {
		info!(backend = source.name(), "Metrics backend selected");
		Self { source }
	}

	pub fn backend(&self) -> &'static str {
		self.source.name()
	}

	pub async fn is_healthy(&self) -> bool {
		match self.source.check_health().await {
			Ok(()) => true,
			Err(err) => {
				warn!(backend = self.source.name(), error = %err, "Metrics backend unavailable");
				false
			}
		}
	}

	pub async fn usage_for_namespace(&self, namespace: &str) -> ResourceUsageSnapshot {
		self.source
			.usage_for_namespace(namespace)
			.await
			.unwrap_or_else(|err| {
				warn!(
					namespace = %namespace,
					error = %err,
					"Namespace metrics unavailable, reporting zero"
				);
				ResourceUsageSnapshot::default()
			})
	}

	/// Usage for each namespace, batched where the backend allows.
	///
	/// If the batched call fails every namespace is retried on its own.
	pub async fn usage_for_namespaces(
		&self,
		namespaces: &[String],
	) -> BTreeMap<String, ResourceUsageSnapshot> {
		match self.source.usage_for_namespaces(namespaces).await {
			Ok(mut usage) => {
				for namespace in namespaces {
					usage.entry(namespace.clone()).or_default();
				}
				usage
			}
			Err(err) => {
				warn!(
					count = namespaces.len(),
					error = %err,
					"Batched metrics query failed, querying namespaces individually"
				);
				let mut usage = BTreeMap::new();
				for namespace in namespaces {
					usage.insert(namespace.clone(), self.usage_for_namespace(namespace).await);
				}
				usage
			}
		}
	}

	pub async fn top_pods(&self, namespace: &str) -> Vec<PodUsage> {
		self.source.top_pods(namespace).await.unwrap_or_else(|err| {
			warn!(namespace = %namespace, error = %err, "Pod metrics unavailable");
			Vec::new()
		})
	}

	pub async fn top_nodes(&self) -> MetricsResult<Vec<NodeUsage>> {
		self.source.top_nodes().await
	}

	pub async fn cluster_usage(&self) -> MetricsResult<ClusterUsage> {
		self.source.cluster_usage().await
	}
}
