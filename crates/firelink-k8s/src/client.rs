// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::error::K8sError;
use crate::types::{
	AppliedObject, ClowdEnvironmentRef, Deployment, Namespace, NamespaceReservation, Node,
	NodeMetrics, Pod, PodMetrics,
};

/// Trait for cluster operations.
///
/// A single implementation is constructed at process start and shared by
/// every gateway and metrics component. No reservation state is cached
/// behind this trait; every call re-queries the cluster.
#[async_trait]
pub trait K8sClient: Send + Sync {
	/// Version string reported by the API server. Used as a reachability check.
	async fn server_version(&self) -> Result<String, K8sError>;

	/// List every namespace visible to the client.
	async fn list_namespaces(&self) -> Result<Vec<Namespace>, K8sError>;

	/// Whether `plural` is served under `group_version` (e.g. `cloud.redhat.com/v1alpha1`).
	async fn has_api_resource(&self, group_version: &str, plural: &str) -> Result<bool, K8sError>;

	/// List all NamespaceReservation objects.
	async fn list_reservations(&self) -> Result<Vec<NamespaceReservation>, K8sError>;

	/// Number of ClowdApp objects per namespace.
	async fn count_clowdapps(&self) -> Result<BTreeMap<String, usize>, K8sError>;

	/// List ClowdEnvironment objects with their target namespaces.
	async fn list_clowd_environments(&self) -> Result<Vec<ClowdEnvironmentRef>, K8sError>;

	/// List pods in a namespace.
	async fn list_pods(&self, namespace: &str) -> Result<Vec<Pod>, K8sError>;

	/// List cluster nodes.
	async fn list_nodes(&self) -> Result<Vec<Node>, K8sError>;

	/// List deployments in a namespace.
	async fn list_deployments(&self, namespace: &str) -> Result<Vec<Deployment>, K8sError>;

	/// Per-container usage samples for the pods of a namespace.
	async fn pod_metrics(&self, namespace: &str) -> Result<Vec<PodMetrics>, K8sError>;

	/// Usage samples for every node.
	async fn node_metrics(&self) -> Result<Vec<NodeMetrics>, K8sError>;

	/// Server-side apply an arbitrary manifest into `namespace`.
	///
	/// Cluster-scoped kinds ignore the namespace.
	async fn apply_object(
		&self,
		namespace: &str,
		object: &serde_json::Value,
	) -> Result<AppliedObject, K8sError>;
}
