// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{MetricsError, MetricsResult};
use crate::source::MetricsSource;
use crate::types::{ClusterUsage, NodeUsage, PodUsage, ResourceUsageSnapshot};

/// Canned metrics for tests. Namespaces marked with
/// [`MockMetricsSource::fail_namespace`] fail every query that touches them.
#[derive(Default)]
pub struct MockMetricsSource {
	usage: Mutex<BTreeMap<String, ResourceUsageSnapshot>>,
	pods: Mutex<BTreeMap<String, Vec<PodUsage>>>,
	nodes: Mutex<Vec<NodeUsage>>,
	failing: Mutex<HashSet<String>>,
	unavailable: Mutex<bool>,
}

impl MockMetricsSource {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn set_usage(&self, namespace: &str, snapshot: ResourceUsageSnapshot) {
		self.usage
			.lock()
			.unwrap()
			.insert(namespace.to_string(), snapshot);
	}

	pub fn set_pods(&self, namespace: &str, pods: Vec<PodUsage>) {
		self.pods.lock().unwrap().insert(namespace.to_string(), pods);
	}

	pub fn set_nodes(&self, nodes: Vec<NodeUsage>) {
		*self.nodes.lock().unwrap() = nodes;
	}

	pub fn fail_namespace(&self, namespace: &str) {
		self.failing.lock().unwrap().insert(namespace.to_string());
	}

	pub fn set_unavailable(&self) {
		*self.unavailable.lock().unwrap() = true;
	}

	fn check(&self, namespace: &str) -> MetricsResult<()> {
		if *self.unavailable.lock().unwrap() || self.failing.lock().unwrap().contains(namespace) {
			return Err(MetricsError::Query {
				message: format!("no data for {namespace}"),
			});
		}
		Ok(())
	}
}

#[async_trait]
impl MetricsSource for MockMetricsSource {
	fn name(&self) -> &'static str {
		"mock"
	}

	async fn check_health(&self) -> MetricsResult<()> {
		self.check("")
	}

	async fn usage_for_namespace(&self, namespace: &str) -> MetricsResult<ResourceUsageSnapshot> {
		self.check(namespace)?;
		Ok(self
			.usage
			.lock()
			.unwrap()
			.get(namespace)
			.copied()
			.unwrap_or_default())
	}

	async fn top_pods(&self, namespace: &str) -> MetricsResult<Vec<PodUsage>> {
		self.check(namespace)?;
		Ok(self
			.pods
			.lock()
			.unwrap()
			.get(namespace)
			.cloned()
			.unwrap_or_default())
	}

	async fn top_nodes(&self) -> MetricsResult<Vec<NodeUsage>> {
		self.check("")?;
		Ok(self.nodes.lock().unwrap().clone())
	}

	async fn cluster_usage(&self) -> MetricsResult<ClusterUsage> {
		self.check("")?;
		Ok(ClusterUsage {
			cpu_percent: "0%".to_string(),
			memory_percent: "0%".to_string(),
		})
	}
}
