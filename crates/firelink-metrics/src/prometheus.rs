// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::error::{MetricsError, MetricsResult};
use crate::quantity::{percentage, round2};
use crate::source::MetricsSource;
use crate::types::{ClusterUsage, NodeUsage, PodUsage, ResourcePair, ResourceUsageSnapshot};

const MIB: f64 = 1024.0 * 1024.0;

mod queries {
	pub fn requests(resource: &str, namespaces: &str) -> String {
		format!(
			r#"sum by (namespace) (kube_pod_resource_request{{resource="{resource}", namespace=~"{namespaces}"}})"#
		)
	}

	pub fn limits(resource: &str, namespaces: &str) -> String {
		format!(
			r#"sum by (namespace) (kube_pod_resource_limit{{resource="{resource}", namespace=~"{namespaces}"}})"#
		)
	}

	pub fn cpu_usage(namespaces: &str) -> String {
		format!(
			r#"sum(rate(container_cpu_usage_seconds_total{{namespace=~"{namespaces}",container!="POD"}}[5m])) by (namespace)"#
		)
	}

	pub fn memory_usage(namespaces: &str) -> String {
		format!(
			r#"sum(container_memory_working_set_bytes{{namespace=~"{namespaces}",container="",pod!=""}}) by (namespace)"#
		)
	}

	pub fn pod_cpu(namespace: &str) -> String {
		format!(
			r#"sum(node_namespace_pod_container:container_cpu_usage_seconds_total:sum_irate{{cluster="", namespace="{namespace}"}}) by (pod)"#
		)
	}

	pub fn pod_memory(namespace: &str) -> String {
		format!(r#"sum(container_memory_working_set_bytes{{namespace="{namespace}"}}) by (pod)"#)
	}

	pub const NODE_ALLOCATABLE: &str = r#"kube_node_status_allocatable{resource=~"cpu|memory"}"#;
	pub const NODE_CPU: &str =
		r#"sum(node_namespace_pod_container:container_cpu_usage_seconds_total:sum_irate{cluster=""}) by (node)"#;
	pub const NODE_MEMORY: &str =
		r#"sum(node_namespace_pod_container:container_memory_working_set_bytes{cluster=""}) by (node)"#;
	pub const CLUSTER_CPU: &str = r#"cluster:node_cpu:ratio_rate5m{cluster=""}"#;
	pub const CLUSTER_MEMORY: &str = r#"cluster:memory_usage:ratio{cluster=""}"#;
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
	status: String,
	#[serde(default)]
	data: Option<QueryData>,
	#[serde(default)]
	error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct QueryData {
	#[serde(default)]
	result: Vec<Sample>,
}

/// One instant-vector element: labels plus `[timestamp, "value"]`.
#[derive(Debug, Clone, Deserialize)]
struct Sample {
	#[serde(default)]
	metric: BTreeMap<String, String>,
	value: (f64, String),
}

impl Sample {
	fn label(&self, name: &str) -> Option<&str> {
		self.metric.get(name).map(String::as_str)
	}

	fn number(&self) -> f64 {
		self.value.1.parse().unwrap_or(0.0)
	}
}

/// Sum of sample values keyed by one label.
fn by_label(samples: &[Sample], label: &str) -> BTreeMap<String, f64> {
	let mut out = BTreeMap::new();
	for sample in samples {
		if let Some(key) = sample.label(label) {
			*out.entry(key.to_string()).or_insert(0.0) += sample.number();
		}
	}
	out
}

/// Queries a Prometheus-compatible HTTP API with a bearer token.
pub struct PrometheusSource {
	http: reqwest::Client,
	base_url: String,
	token: Option<String>,
}

impl PrometheusSource {
	pub fn new(
		base_url: &str,
		token: Option<String>,
		accept_invalid_certs: bool,
		timeout: Duration,
	) -> MetricsResult<Self> {
		if base_url.is_empty() {
			return Err(MetricsError::Config("prometheus url is empty".to_string()));
		}
		let http = reqwest::Client::builder()
			.danger_accept_invalid_certs(accept_invalid_certs)
			.timeout(timeout)
			.build()?;
		Ok(Self {
			http,
			base_url: base_url.trim_end_matches('/').to_string(),
			token,
		})
	}

	fn get(&self, path: &str) -> reqwest::RequestBuilder {
		let request = self.http.get(format!("{}{path}", self.base_url));
		match &self.token {
			Some(token) => request.bearer_auth(token),
			None => request,
		}
	}

	#[instrument(skip(self), level = "debug")]
	async fn query(&self, query: &str) -> MetricsResult<Vec<Sample>> {
		let response = self
			.get("/api/v1/query")
			.query(&[("query", query)])
			.send()
			.await?;
		let status = response.status();
		let body: QueryResponse = response.json().await.map_err(|e| {
			if status.is_success() {
				MetricsError::Http(e)
			} else {
				MetricsError::Query {
					message: format!("HTTP {status}"),
				}
			}
		})?;
		if body.status != "success" {
			return Err(MetricsError::Query {
				message: body.error.unwrap_or_else(|| format!("HTTP {status}")),
			});
		}
		let samples = body.data.map(|d| d.result).unwrap_or_default();
		debug!(samples = samples.len(), "Query returned");
		Ok(samples)
	}

	async fn scalar(&self, query: &str) -> MetricsResult<f64> {
		let samples = self.query(query).await?;
		samples
			.first()
			.map(Sample::number)
			.ok_or_else(|| MetricsError::Query {
				message: format!("no samples for {query}"),
			})
	}
}

#[async_trait]
impl MetricsSource for PrometheusSource {
	fn name(&self) -> &'static str {
		"prometheus"
	}

	async fn check_health(&self) -> MetricsResult<()> {
		self.get("/-/healthy").send().await?.error_for_status()?;
		Ok(())
	}

	async fn usage_for_namespace(&self, namespace: &str) -> MetricsResult<ResourceUsageSnapshot> {
		let mut all = self.usage_for_namespaces(&[namespace.to_string()]).await?;
		Ok(all.remove(namespace).unwrap_or_default())
	}

	async fn usage_for_namespaces(
		&self,
		namespaces: &[String],
	) -> MetricsResult<BTreeMap<String, ResourceUsageSnapshot>> {
		if namespaces.is_empty() {
			return Ok(BTreeMap::new());
		}
		let pattern = namespaces.join("|");
		let q_cpu_requests = queries::requests("cpu", &pattern);
		let q_cpu_limits = queries::limits("cpu", &pattern);
		let q_cpu_usage = queries::cpu_usage(&pattern);
		let q_mem_requests = queries::requests("memory", &pattern);
		let q_mem_limits = queries::limits("memory", &pattern);
		let q_mem_usage = queries::memory_usage(&pattern);
		let (cpu_requests, cpu_limits, cpu_usage, mem_requests, mem_limits, mem_usage) =
			futures::try_join!(
				self.query(&q_cpu_requests),
				self.query(&q_cpu_limits),
				self.query(&q_cpu_usage),
				self.query(&q_mem_requests),
				self.query(&q_mem_limits),
				self.query(&q_mem_usage),
			)?;

		let cpu_requests = by_label(&cpu_requests, "namespace");
		let cpu_limits = by_label(&cpu_limits, "namespace");
		let cpu_usage = by_label(&cpu_usage, "namespace");
		let mem_requests = by_label(&mem_requests, "namespace");
		let mem_limits = by_label(&mem_limits, "namespace");
		let mem_usage = by_label(&mem_usage, "namespace");

		let value = |map: &BTreeMap<String, f64>, ns: &str| map.get(ns).copied().unwrap_or(0.0);
		Ok(namespaces
			.iter()
			.map(|ns| {
				let snapshot = ResourceUsageSnapshot {
					requests: ResourcePair {
						cpu: value(&cpu_requests, ns),
						memory: value(&mem_requests, ns) / MIB,
					},
					limits: ResourcePair {
						cpu: value(&cpu_limits, ns),
						memory: value(&mem_limits, ns) / MIB,
					},
					usage: ResourcePair {
						cpu: value(&cpu_usage, ns),
						memory: value(&mem_usage, ns) / MIB,
					},
				};
				(ns.clone(), snapshot.rounded())
			})
			.collect())
	}

	async fn top_pods(&self, namespace: &str) -> MetricsResult<Vec<PodUsage>> {
		let q_cpu = queries::pod_cpu(namespace);
		let q_memory = queries::pod_memory(namespace);
		let (cpu, memory) =
			futures::try_join!(self.query(&q_cpu), self.query(&q_memory))?;
		let mut pods: BTreeMap<String, ResourcePair> = BTreeMap::new();
		for (name, cores) in by_label(&cpu, "pod") {
			pods.entry(name).or_default().cpu = cores;
		}
		for (name, bytes) in by_label(&memory, "pod") {
			pods.entry(name).or_default().memory = bytes / MIB;
		}
		Ok(pods
			.into_iter()
			.map(|(name, usage)| PodUsage {
				cpu: round2(usage.cpu),
				memory: round2(usage.memory),
				name,
			})
			.collect())
	}

	async fn top_nodes(&self) -> MetricsResult<Vec<NodeUsage>> {
		let (allocatable, cpu, memory) = futures::try_join!(
			self.query(queries::NODE_ALLOCATABLE),
			self.query(queries::NODE_CPU),
			self.query(queries::NODE_MEMORY),
		)?;

		let mut capacity: BTreeMap<String, ResourcePair> = BTreeMap::new();
		for sample in &allocatable {
			let (Some(node), Some(resource)) = (sample.label("node"), sample.label("resource"))
			else {
				continue;
			};
			let entry = capacity.entry(node.to_string()).or_default();
			match resource {
				"cpu" => entry.cpu += sample.number(),
				"memory" => entry.memory += sample.number() / MIB,
				_ => {}
			}
		}
		let cpu = by_label(&cpu, "node");
		let memory = by_label(&memory, "node");

		Ok(capacity
			.into_iter()
			.map(|(name, capacity)| {
				let used_cpu = cpu.get(&name).copied().unwrap_or(0.0);
				let used_memory = memory.get(&name).copied().unwrap_or(0.0) / MIB;
				NodeUsage {
					cpu: round2(used_cpu),
					cpu_percent: percentage(used_cpu, capacity.cpu),
					memory: round2(used_memory),
					memory_percent: percentage(used_memory, capacity.memory),
					name,
				}
			})
			.collect())
	}

	async fn cluster_usage(&self) -> MetricsResult<ClusterUsage> {
		let (cpu, memory) = futures::try_join!(
			self.scalar(queries::CLUSTER_CPU),
			self.scalar(queries::CLUSTER_MEMORY),
		)?;
		// Both recording rules are ratios of allocatable.
		Ok(ClusterUsage {
			cpu_percent: percentage(cpu, 1.0),
			memory_percent: percentage(memory, 1.0),
		})
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;
	use wiremock::matchers::{header, method, path, query_param};
	use wiremock::{Mock, MockServer, ResponseTemplate};

	use super::*;

	fn vector(samples: serde_json::Value) -> serde_json::Value {
		json!({
			"status": "success",
			"data": { "resultType": "vector", "result": samples }
		})
	}

	fn ns_sample(namespace: &str, value: &str) -> serde_json::Value {
		json!({ "metric": { "namespace": namespace }, "value": [1_700_000_000.0, value] })
	}

	async fn mount(server: &MockServer, query: String, body: serde_json::Value) {
		Mock::given(method("GET"))
			.and(path("/api/v1/query"))
			.and(query_param("query", query))
			.respond_with(ResponseTemplate::new(200).set_body_json(body))
			.mount(server)
			.await;
	}

	fn source(server: &MockServer) -> PrometheusSource {
		PrometheusSource::new(
			&server.uri(),
			Some("sekrit".to_string()),
			true,
			Duration::from_secs(5),
		)
		.unwrap()
	}

	#[tokio::test]
	async fn batched_namespace_usage() {
		let server = MockServer::start().await;
		let pattern = "ephemeral-a|ephemeral-b";
		mount(
			&server,
			queries::requests("cpu", pattern),
			vector(json!([ns_sample("ephemeral-a", "1.5"), ns_sample("ephemeral-b", "0.25")])),
		)
		.await;
		mount(
			&server,
			queries::limits("cpu", pattern),
			vector(json!([ns_sample("ephemeral-a", "3")])),
		)
		.await;
		mount(
			&server,
			queries::cpu_usage(pattern),
			vector(json!([ns_sample("ephemeral-a", "0.123")])),
		)
		.await;
		mount(
			&server,
			queries::requests("memory", pattern),
			vector(json!([ns_sample("ephemeral-a", "536870912")])),
		)
		.await;
		mount(&server, queries::limits("memory", pattern), vector(json!([]))).await;
		mount(
			&server,
			queries::memory_usage(pattern),
			vector(json!([ns_sample("ephemeral-b", "104857600")])),
		)
		.await;

		let usage = source(&server)
			.usage_for_namespaces(&["ephemeral-a".to_string(), "ephemeral-b".to_string()])
			.await
			.unwrap();

		let a = usage["ephemeral-a"];
		assert_eq!(a.requests, ResourcePair { cpu: 1.5, memory: 512.0 });
		assert_eq!(a.limits, ResourcePair { cpu: 3.0, memory: 0.0 });
		assert_eq!(a.usage.cpu, 0.12);
		let b = usage["ephemeral-b"];
		assert_eq!(b.requests.cpu, 0.25);
		assert_eq!(b.usage.memory, 100.0);
	}

	#[tokio::test]
	async fn sends_bearer_token() {
		let server = MockServer::start().await;
		Mock::given(method("GET"))
			.and(path("/-/healthy"))
			.and(header("authorization", "Bearer sekrit"))
			.respond_with(ResponseTemplate::new(200))
			.mount(&server)
			.await;
		source(&server).check_health().await.unwrap();
	}

	#[tokio::test]
	async fn unhealthy_backend_fails_health_check() {
		let server = MockServer::start().await;
		Mock::given(path("/-/healthy"))
			.respond_with(ResponseTemplate::new(503))
			.mount(&server)
			.await;
		assert!(source(&server).check_health().await.is_err());
	}

	#[tokio::test]
	async fn query_error_is_reported() {
		let server = MockServer::start().await;
		Mock::given(path("/api/v1/query"))
			.respond_with(ResponseTemplate::new(400).set_body_json(json!({
				"status": "error",
				"errorType": "bad_data",
				"error": "parse error at char 5"
			})))
			.mount(&server)
			.await;
		let err = source(&server).cluster_usage().await.unwrap_err();
		assert!(err.to_string().contains("parse error"));
	}

	#[tokio::test]
	async fn top_pods_joins_cpu_and_memory() {
		let server = MockServer::start().await;
		mount(
			&server,
			queries::pod_cpu("ephemeral-a"),
			vector(json!([{ "metric": { "pod": "api-1" }, "value": [0, "0.5"] }])),
		)
		.await;
		mount(
			&server,
			queries::pod_memory("ephemeral-a"),
			vector(json!([{ "metric": { "pod": "api-1" }, "value": [0, "268435456"] }])),
		)
		.await;
		let pods = source(&server).top_pods("ephemeral-a").await.unwrap();
		assert_eq!(
			pods,
			vec![PodUsage {
				name: "api-1".into(),
				cpu: 0.5,
				memory: 256.0,
			}]
		);
	}

	#[tokio::test]
	async fn top_pods_keeps_pods_missing_from_either_series() {
		let server = MockServer::start().await;
		mount(
			&server,
			queries::pod_cpu("ephemeral-a"),
			vector(json!([{ "metric": { "pod": "api-1" }, "value": [0, "0.25"] }])),
		)
		.await;
		mount(
			&server,
			queries::pod_memory("ephemeral-a"),
			vector(json!([{ "metric": { "pod": "init-job" }, "value": [0, "134217728"] }])),
		)
		.await;
		let pods = source(&server).top_pods("ephemeral-a").await.unwrap();
		assert_eq!(
			pods,
			vec![
				PodUsage {
					name: "api-1".into(),
					cpu: 0.25,
					memory: 0.0,
				},
				PodUsage {
					name: "init-job".into(),
					cpu: 0.0,
					memory: 128.0,
				},
			]
		);
	}

	#[tokio::test]
	async fn cluster_usage_ratios() {
		let server = MockServer::start().await;
		mount(
			&server,
			queries::CLUSTER_CPU.to_string(),
			vector(json!([{ "metric": {}, "value": [0, "0.4215"] }])),
		)
		.await;
		mount(
			&server,
			queries::CLUSTER_MEMORY.to_string(),
			vector(json!([{ "metric": {}, "value": [0, "0.5"] }])),
		)
		.await;
		let usage = source(&server).cluster_usage().await.unwrap();
		assert_eq!(usage.cpu_percent, "42.15%");
		assert_eq!(usage.memory_percent, "50.00%");
	}

	#[tokio::test]
	async fn top_nodes_from_allocatable() {
		let server = MockServer::start().await;
		mount(
			&server,
			queries::NODE_ALLOCATABLE.to_string(),
			vector(json!([
				{ "metric": { "node": "n1", "resource": "cpu" }, "value": [0, "4"] },
				{ "metric": { "node": "n1", "resource": "memory" }, "value": [0, "8589934592"] }
			])),
		)
		.await;
		mount(
			&server,
			queries::NODE_CPU.to_string(),
			vector(json!([{ "metric": { "node": "n1" }, "value": [0, "1"] }])),
		)
		.await;
		mount(
			&server,
			queries::NODE_MEMORY.to_string(),
			vector(json!([{ "metric": { "node": "n1" }, "value": [0, "4294967296"] }])),
		)
		.await;
		let nodes = source(&server).top_nodes().await.unwrap();
		assert_eq!(nodes.len(), 1);
		assert_eq!(nodes[0].cpu_percent, "25.00%");
		assert_eq!(nodes[0].memory, 4096.0);
		assert_eq!(nodes[0].memory_percent, "50.00%");
	}
}
