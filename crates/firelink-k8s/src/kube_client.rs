// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::collections::BTreeMap;

use async_trait::async_trait;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{Namespace, Node, Pod};
use kube::{
	api::{Api, DynamicObject, ListParams, Patch, PatchParams},
	core::{ApiResource, GroupVersionKind, TypeMeta},
	discovery::{self, Scope},
	Client,
};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::client::K8sClient;
use crate::error::K8sError;
use crate::types::{
	AppliedObject, ClowdEnvironmentRef, ContainerUsage, NamespaceReservation, NodeMetrics,
	PodMetrics, RESERVATION_PLURAL,
};

const CLOUD_GROUP: &str = "cloud.redhat.com";
const CLOUD_VERSION: &str = "v1alpha1";
const FIELD_MANAGER: &str = "firelink";
const METRICS_API: &str = "/apis/metrics.k8s.io/v1beta1";

/// Production cluster client implementation using the kube crate.
pub struct KubeClient {
	client: Client,
}

impl KubeClient {
	/// Create a new KubeClient that auto-discovers cluster configuration.
	///
	/// This will attempt to load config from:
	/// 1. In-cluster service account (when running in K8s)
	/// 2. KUBECONFIG environment variable
	/// 3. ~/.kube/config (written by `oc login` at startup)
	pub async fn new() -> Result<Self, K8sError> {
		let client = Client::try_default().await?;
		debug!("K8s client initialized");
		Ok(Self { client })
	}

	/// Wrap an already-configured kube client.
	pub fn from_client(client: Client) -> Self {
		Self { client }
	}

	fn cloud_resource(kind: &str, plural: &str) -> ApiResource {
		let gvk = GroupVersionKind::gvk(CLOUD_GROUP, CLOUD_VERSION, kind);
		ApiResource::from_gvk_with_plural(&gvk, plural)
	}

	async fn list_cloud_objects(
		&self,
		kind: &str,
		plural: &str,
	) -> Result<Vec<DynamicObject>, K8sError> {
		let resource = Self::cloud_resource(kind, plural);
		let api: Api<DynamicObject> = Api::all_with(self.client.clone(), &resource);
		let list = api.list(&ListParams::default()).await?;
		Ok(list.items)
	}

	async fn metrics_request<T>(&self, path: &str) -> Result<T, K8sError>
	where
		T: serde::de::DeserializeOwned,
	{
		let request = http::Request::builder()
			.method("GET")
			.uri(path)
			.body(Vec::new())
			.map_err(|e| K8sError::InvalidObject {
				message: format!("failed to build metrics request: {e}"),
			})?;

		match self.client.request::<T>(request).await {
			Ok(body) => Ok(body),
			Err(kube::Error::Api(err)) if err.code == 404 => Err(K8sError::MetricsUnavailable),
			Err(e) => Err(e.into()),
		}
	}
}

#[async_trait]
impl K8sClient for KubeClient {
	async fn server_version(&self) -> Result<String, K8sError> {
		let info = self.client.apiserver_version().await?;
		Ok(info.git_version)
	}

	async fn list_namespaces(&self) -> Result<Vec<Namespace>, K8sError> {
		let namespaces: Api<Namespace> = Api::all(self.client.clone());
		let list = namespaces.list(&ListParams::default()).await?;
		Ok(list.items)
	}

	#[instrument(skip(self))]
	async fn has_api_resource(&self, group_version: &str, plural: &str) -> Result<bool, K8sError> {
		match self.client.list_api_group_resources(group_version).await {
			Ok(list) => Ok(list.resources.iter().any(|r| r.name == plural)),
			Err(kube::Error::Api(err)) if err.code == 404 => {
				debug!("API group not served");
				Ok(false)
			}
			Err(e) => Err(e.into()),
		}
	}

	async fn list_reservations(&self) -> Result<Vec<NamespaceReservation>, K8sError> {
		let objects = self
			.list_cloud_objects("NamespaceReservation", RESERVATION_PLURAL)
			.await?;
		objects
			.into_iter()
			.map(|obj| {
				serde_json::to_value(obj)
					.and_then(serde_json::from_value::<NamespaceReservation>)
					.map_err(|e| K8sError::decode("NamespaceReservation", e))
			})
			.collect()
	}

	async fn count_clowdapps(&self) -> Result<BTreeMap<String, usize>, K8sError> {
		let objects = self.list_cloud_objects("ClowdApp", "clowdapps").await?;
		let mut counts = BTreeMap::new();
		for obj in objects {
			if let Some(ns) = obj.metadata.namespace {
				*counts.entry(ns).or_insert(0) += 1;
			}
		}
		Ok(counts)
	}

	async fn list_clowd_environments(&self) -> Result<Vec<ClowdEnvironmentRef>, K8sError> {
		let objects = self
			.list_cloud_objects("ClowdEnvironment", "clowdenvironments")
			.await?;
		Ok(objects
			.into_iter()
			.filter_map(|obj| {
				let name = obj.metadata.name?;
				let target_namespace = obj
					.data
					.pointer("/spec/targetNamespace")
					.and_then(|v| v.as_str())
					.map(str::to_string);
				Some(ClowdEnvironmentRef {
					name,
					target_namespace,
				})
			})
			.collect())
	}

	async fn list_pods(&self, namespace: &str) -> Result<Vec<Pod>, K8sError> {
		let pods: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
		let list = pods.list(&ListParams::default()).await?;
		Ok(list.items)
	}

	async fn list_nodes(&self) -> Result<Vec<Node>, K8sError> {
		let nodes: Api<Node> = Api::all(self.client.clone());
		let list = nodes.list(&ListParams::default()).await?;
		Ok(list.items)
	}

	async fn list_deployments(&self, namespace: &str) -> Result<Vec<Deployment>, K8sError> {
		let deployments: Api<Deployment> = Api::namespaced(self.client.clone(), namespace);
		let list = deployments.list(&ListParams::default()).await?;
		Ok(list.items)
	}

	async fn pod_metrics(&self, namespace: &str) -> Result<Vec<PodMetrics>, K8sError> {
		let path = format!("{METRICS_API}/namespaces/{namespace}/pods");
		let list: PodMetricsList = self.metrics_request(&path).await?;
		Ok(list
			.items
			.into_iter()
			.map(|item| PodMetrics {
				name: item.metadata.name,
				namespace: item.metadata.namespace.unwrap_or_else(|| namespace.to_string()),
				containers: item
					.containers
					.into_iter()
					.map(|c| ContainerUsage {
						name: c.name,
						cpu: c.usage.cpu,
						memory: c.usage.memory,
					})
					.collect(),
			})
			.collect())
	}

	async fn node_metrics(&self) -> Result<Vec<NodeMetrics>, K8sError> {
		let path = format!("{METRICS_API}/nodes");
		let list: NodeMetricsList = self.metrics_request(&path).await?;
		Ok(list
			.items
			.into_iter()
			.map(|item| NodeMetrics {
				name: item.metadata.name,
				cpu: item.usage.cpu,
				memory: item.usage.memory,
			})
			.collect())
	}

	#[instrument(skip(self, object))]
	async fn apply_object(
		&self,
		namespace: &str,
		object: &serde_json::Value,
	) -> Result<AppliedObject, K8sError> {
		let types: TypeMeta = serde_json::from_value(object.clone())
			.map_err(|e| K8sError::decode("object type", e))?;
		let gvk = GroupVersionKind::try_from(&types).map_err(|e| K8sError::InvalidObject {
			message: e.to_string(),
		})?;
		let obj: DynamicObject =
			serde_json::from_value(object.clone()).map_err(|e| K8sError::decode("object", e))?;
		let name = obj
			.metadata
			.name
			.clone()
			.ok_or_else(|| K8sError::InvalidObject {
				message: format!("{} without metadata.name", types.kind),
			})?;

		let (resource, caps) = discovery::pinned_kind(&self.client, &gvk).await?;
		let api: Api<DynamicObject> = match caps.scope {
			Scope::Namespaced => Api::namespaced_with(self.client.clone(), namespace, &resource),
			Scope::Cluster => Api::all_with(self.client.clone(), &resource),
		};

		let params = PatchParams::apply(FIELD_MANAGER).force();
		api.patch(&name, &params, &Patch::Apply(&obj)).await?;
		debug!(kind = %types.kind, name = %name, "Applied object");

		Ok(AppliedObject {
			kind: types.kind,
			name,
		})
	}
}

#[derive(Debug, Deserialize)]
struct PodMetricsList {
	items: Vec<PodMetricsItem>,
}

#[derive(Debug, Deserialize)]
struct PodMetricsItem {
	metadata: MetricsMetadata,
	#[serde(default)]
	containers: Vec<ContainerMetricsItem>,
}

#[derive(Debug, Deserialize)]
struct MetricsMetadata {
	name: String,
	#[serde(default)]
	namespace: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContainerMetricsItem {
	name: String,
	usage: UsageItem,
}

#[derive(Debug, Deserialize)]
struct UsageItem {
	cpu: String,
	memory: String,
}

#[derive(Debug, Deserialize)]
struct NodeMetricsList {
	items: Vec<NodeMetricsItem>,
}

#[derive(Debug, Deserialize)]
struct NodeMetricsItem {
	metadata: MetricsMetadata,
	usage: UsageItem,
}
