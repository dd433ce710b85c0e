// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use firelink_k8s::{K8sClient, Node, Pod};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use tracing::{debug, warn};

use crate::error::MetricsResult;
use crate::quantity::{self, percentage, ResourceKind};
use crate::source::MetricsSource;
use crate::types::{ClusterUsage, NodeUsage, PodUsage, ResourcePair, ResourceUsageSnapshot};

/// Reads pod specs and the `metrics.k8s.io` API through the shared cluster client.
pub struct MetricsServerSource {
	client: Arc<dyn K8sClient>,
}

impl MetricsServerSource {
	pub fn new(client: Arc<dyn K8sClient>) -> Self {
		Self { client }
	}

	async fn node_usage(&self) -> MetricsResult<Vec<(NodeUsage, ResourcePair)>> {
		let nodes = self.client.list_nodes().await?;
		let samples = self.client.node_metrics().await?;

		let allocatable: BTreeMap<String, ResourcePair> = nodes
			.iter()
			.filter_map(|node| Some((node.metadata.name.clone()?, node_allocatable(node))))
			.collect();

		let mut out = Vec::with_capacity(samples.len());
		for sample in samples {
			let used = ResourcePair {
				cpu: parse_or_zero(&sample.cpu, ResourceKind::Cpu),
				memory: parse_or_zero(&sample.memory, ResourceKind::Memory),
			};
			let capacity = allocatable.get(&sample.name).copied().unwrap_or_default();
			out.push((
				NodeUsage {
					cpu: quantity::round2(used.cpu),
					cpu_percent: percentage(used.cpu, capacity.cpu),
					memory: quantity::round2(used.memory),
					memory_percent: percentage(used.memory, capacity.memory),
					name: sample.name,
				},
				capacity,
			));
		}
		out.sort_by(|a, b| a.0.name.cmp(&b.0.name));
		Ok(out)
	}
}

#[async_trait]
impl MetricsSource for MetricsServerSource {
	fn name(&self) -> &'static str {
		"metrics_server"
	}

	async fn check_health(&self) -> MetricsResult<()> {
		self.client.server_version().await?;
		Ok(())
	}

	async fn usage_for_namespace(&self, namespace: &str) -> MetricsResult<ResourceUsageSnapshot> {
		let pods = self.client.list_pods(namespace).await?;
		let mut snapshot = ResourceUsageSnapshot::default();
		for pod in &pods {
			let (requests, limits) = pod_resources(pod);
			snapshot.requests += requests;
			snapshot.limits += limits;
		}

		for pod in self.client.pod_metrics(namespace).await? {
			for container in &pod.containers {
				snapshot.usage += ResourcePair {
					cpu: parse_or_zero(&container.cpu, ResourceKind::Cpu),
					memory: parse_or_zero(&container.memory, ResourceKind::Memory),
				};
			}
		}
		debug!(namespace = %namespace, pods = pods.len(), "Aggregated namespace resources");
		Ok(snapshot.rounded())
	}

	async fn top_pods(&self, namespace: &str) -> MetricsResult<Vec<PodUsage>> {
		let samples = self.client.pod_metrics(namespace).await?;
		Ok(samples
			.into_iter()
			.map(|pod| {
				let mut total = ResourcePair::default();
				for container in &pod.containers {
					total += ResourcePair {
						cpu: parse_or_zero(&container.cpu, ResourceKind::Cpu),
						memory: parse_or_zero(&container.memory, ResourceKind::Memory),
					};
				}
				let total = total.rounded();
				PodUsage {
					name: pod.name,
					cpu: total.cpu,
					memory: total.memory,
				}
			})
			.collect())
	}

	async fn top_nodes(&self) -> MetricsResult<Vec<NodeUsage>> {
		Ok(self.node_usage().await?.into_iter().map(|(usage, _)| usage).collect())
	}

	async fn cluster_usage(&self) -> MetricsResult<ClusterUsage> {
		let mut used = ResourcePair::default();
		let mut capacity = ResourcePair::default();
		for (node, allocatable) in self.node_usage().await? {
			used += ResourcePair {
				cpu: node.cpu,
				memory: node.memory,
			};
			capacity += allocatable;
		}
		Ok(ClusterUsage {
			cpu_percent: percentage(used.cpu, capacity.cpu),
			memory_percent: percentage(used.memory, capacity.memory),
		})
	}
}

/// Summed container requests and limits of one pod.
fn pod_resources(pod: &Pod) -> (ResourcePair, ResourcePair) {
	let mut requests = ResourcePair::default();
	let mut limits = ResourcePair::default();
	let containers = pod.spec.as_ref().map(|s| s.containers.as_slice()).unwrap_or_default();
	for container in containers {
		let Some(resources) = &container.resources else {
			continue;
		};
		if let Some(values) = &resources.requests {
			requests += pair_from(values);
		}
		if let Some(values) = &resources.limits {
			limits += pair_from(values);
		}
	}
	(requests, limits)
}

fn node_allocatable(node: &Node) -> ResourcePair {
	node.status
		.as_ref()
		.and_then(|s| s.allocatable.as_ref())
		.map(pair_from)
		.unwrap_or_default()
}

fn pair_from(values: &BTreeMap<String, Quantity>) -> ResourcePair {
	ResourcePair {
		cpu: values
			.get("cpu")
			.map(|q| parse_or_zero(&q.0, ResourceKind::Cpu))
			.unwrap_or(0.0),
		memory: values
			.get("memory")
			.map(|q| parse_or_zero(&q.0, ResourceKind::Memory))
			.unwrap_or(0.0),
	}
}

fn parse_or_zero(value: &str, kind: ResourceKind) -> f64 {
	quantity::parse(value, kind).unwrap_or_else(|err| {
		warn!(error = %err, "Ignoring unparsable quantity");
		0.0
	})
}
