// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::error::MetricsResult;
use crate::types::{ClusterUsage, NodeUsage, PodUsage, ResourceUsageSnapshot};

/// A backend that can answer resource usage questions.
#[async_trait]
pub trait MetricsSource: Send + Sync {
	/// Short name used in logs.
	fn name(&self) -> &'static str;

	/// Whether the backend answers at all.
	async fn check_health(&self) -> MetricsResult<()>;

	async fn usage_for_namespace(&self, namespace: &str) -> MetricsResult<ResourceUsageSnapshot>;

	/// Usage for several namespaces at once.
	///
	/// Backends that can query many namespaces in one request override this.
	async fn usage_for_namespaces(
		&self,
		namespaces: &[String],
	) -> MetricsResult<BTreeMap<String, ResourceUsageSnapshot>> {
		let mut out = BTreeMap::new();
		for namespace in namespaces {
			out.insert(namespace.clone(), self.usage_for_namespace(namespace).await?);
		}
		Ok(out)
	}

	async fn top_pods(&self, namespace: &str) -> MetricsResult<Vec<PodUsage>>;

	async fn top_nodes(&self) -> MetricsResult<Vec<NodeUsage>>;

	async fn cluster_usage(&self) -> MetricsResult<ClusterUsage>;
}
