// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::client::K8sClient;
use crate::error::K8sError;
use crate::types::{
	AppliedObject, ClowdEnvironmentRef, Deployment, Namespace, NamespaceReservation, Node,
	NodeMetrics, Pod, PodMetrics, RESERVATION_GROUP_VERSION, RESERVATION_PLURAL,
};

/// In-memory cluster for tests.
///
/// Operations named with [`MockK8sClient::fail`] return a transport error.
#[derive(Default)]
pub struct MockK8sClient {
	api_resources: Mutex<HashSet<(String, String)>>,
	namespaces: Mutex<Vec<Namespace>>,
	reservations: Mutex<Vec<NamespaceReservation>>,
	clowdapps: Mutex<BTreeMap<String, usize>>,
	environments: Mutex<Vec<ClowdEnvironmentRef>>,
	pods: Mutex<HashMap<String, Vec<Pod>>>,
	nodes: Mutex<Vec<Node>>,
	deployments: Mutex<HashMap<String, Vec<Deployment>>>,
	pod_metrics: Mutex<HashMap<String, Vec<PodMetrics>>>,
	node_metrics: Mutex<Vec<NodeMetrics>>,
	applied: Mutex<Vec<(String, serde_json::Value)>>,
	failing: Mutex<HashSet<&'static str>>,
}

impl MockK8sClient {
	pub fn new() -> Self {
		Self::default()
	}

	/// A cluster that serves the reservation custom resource.
	pub fn with_reservation_subsystem() -> Self {
		let mock = Self::default();
		mock.api_resources.lock().unwrap().insert((
			RESERVATION_GROUP_VERSION.to_string(),
			RESERVATION_PLURAL.to_string(),
		));
		mock
	}

	pub fn fail(&self, operation: &'static str) {
		self.failing.lock().unwrap().insert(operation);
	}

	pub fn set_namespaces(&self, namespaces: Vec<Namespace>) {
		*self.namespaces.lock().unwrap() = namespaces;
	}

	pub fn push_reservation(&self, reservation: NamespaceReservation) {
		self.reservations.lock().unwrap().push(reservation);
	}

	/// Drop every reservation bound to `namespace`.
	pub fn remove_reservations_for(&self, namespace: &str) {
		self.reservations
			.lock()
			.unwrap()
			.retain(|r| r.bound_namespace() != Some(namespace));
	}

	pub fn set_clowdapp_count(&self, namespace: &str, count: usize) {
		self.clowdapps
			.lock()
			.unwrap()
			.insert(namespace.to_string(), count);
	}

	pub fn add_environment(&self, name: &str, target_namespace: &str) {
		self.environments.lock().unwrap().push(ClowdEnvironmentRef {
			name: name.to_string(),
			target_namespace: Some(target_namespace.to_string()),
		});
	}

	pub fn set_pods(&self, namespace: &str, pods: Vec<Pod>) {
		self.pods
			.lock()
			.unwrap()
			.insert(namespace.to_string(), pods);
	}

	pub fn set_nodes(&self, nodes: Vec<Node>) {
		*self.nodes.lock().unwrap() = nodes;
	}

	pub fn set_deployments(&self, namespace: &str, deployments: Vec<Deployment>) {
		self.deployments
			.lock()
			.unwrap()
			.insert(namespace.to_string(), deployments);
	}

	pub fn set_pod_metrics(&self, namespace: &str, metrics: Vec<PodMetrics>) {
		self.pod_metrics
			.lock()
			.unwrap()
			.insert(namespace.to_string(), metrics);
	}

	pub fn set_node_metrics(&self, metrics: Vec<NodeMetrics>) {
		*self.node_metrics.lock().unwrap() = metrics;
	}

	/// Objects passed to `apply_object`, with their target namespace.
	pub fn applied(&self) -> Vec<(String, serde_json::Value)> {
		self.applied.lock().unwrap().clone()
	}

	fn check(&self, operation: &'static str) -> Result<(), K8sError> {
		if self.failing.lock().unwrap().contains(operation) {
			return Err(K8sError::Transport {
				message: format!("{operation} failed"),
			});
		}
		Ok(())
	}
}

#[async_trait]
impl K8sClient for MockK8sClient {
	async fn server_version(&self) -> Result<String, K8sError> {
		self.check("server_version")?;
		Ok("v1.32.0".to_string())
	}

	async fn list_namespaces(&self) -> Result<Vec<Namespace>, K8sError> {
		self.check("list_namespaces")?;
		Ok(self.namespaces.lock().unwrap().clone())
	}

	async fn has_api_resource(&self, group_version: &str, plural: &str) -> Result<bool, K8sError> {
		self.check("has_api_resource")?;
		Ok(self
			.api_resources
			.lock()
			.unwrap()
			.contains(&(group_version.to_string(), plural.to_string())))
	}

	async fn list_reservations(&self) -> Result<Vec<NamespaceReservation>, K8sError> {
		self.check("list_reservations")?;
		Ok(self.reservations.lock().unwrap().clone())
	}

	async fn count_clowdapps(&self) -> Result<BTreeMap<String, usize>, K8sError> {
		self.check("count_clowdapps")?;
		Ok(self.clowdapps.lock().unwrap().clone())
	}

	async fn list_clowd_environments(&self) -> Result<Vec<ClowdEnvironmentRef>, K8sError> {
		self.check("list_clowd_environments")?;
		Ok(self.environments.lock().unwrap().clone())
	}

	async fn list_pods(&self, namespace: &str) -> Result<Vec<Pod>, K8sError> {
		self.check("list_pods")?;
		Ok(self
			.pods
			.lock()
			.unwrap()
			.get(namespace)
			.cloned()
			.unwrap_or_default())
	}

	async fn list_nodes(&self) -> Result<Vec<Node>, K8sError> {
		self.check("list_nodes")?;
		Ok(self.nodes.lock().unwrap().clone())
	}

	async fn list_deployments(&self, namespace: &str) -> Result<Vec<Deployment>, K8sError> {
		self.check("list_deployments")?;
		Ok(self
			.deployments
			.lock()
			.unwrap()
			.get(namespace)
			.cloned()
			.unwrap_or_default())
	}

	async fn pod_metrics(&self, namespace: &str) -> Result<Vec<PodMetrics>, K8sError> {
		self.check("pod_metrics")?;
		Ok(self
			.pod_metrics
			.lock()
			.unwrap()
			.get(namespace)
			.cloned()
			.unwrap_or_default())
	}

	async fn node_metrics(&self) -> Result<Vec<NodeMetrics>, K8sError> {
		self.check("node_metrics")?;
		Ok(self.node_metrics.lock().unwrap().clone())
	}

	async fn apply_object(
		&self,
		namespace: &str,
		object: &serde_json::Value,
	) -> Result<AppliedObject, K8sError> {
		self.check("apply_object")?;
		let kind = object
			.get("kind")
			.and_then(|v| v.as_str())
			.unwrap_or_default()
			.to_string();
		let name = object
			.pointer("/metadata/name")
			.and_then(|v| v.as_str())
			.ok_or_else(|| K8sError::InvalidObject {
				message: format!("{kind} without metadata.name"),
			})?
			.to_string();
		self.applied
			.lock()
			.unwrap()
			.push((namespace.to_string(), object.clone()));
		Ok(AppliedObject { kind, name })
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::types::ReservationStatus;

	#[tokio::test]
	async fn reports_reservation_subsystem() {
		assert!(MockK8sClient::with_reservation_subsystem()
			.has_api_resource(RESERVATION_GROUP_VERSION, RESERVATION_PLURAL)
			.await
			.unwrap());
		assert!(!MockK8sClient::new()
			.has_api_resource(RESERVATION_GROUP_VERSION, RESERVATION_PLURAL)
			.await
			.unwrap());
	}

	#[tokio::test]
	async fn failing_operation_is_transient() {
		let mock = MockK8sClient::new();
		mock.fail("list_pods");
		let err = mock.list_pods("ns").await.unwrap_err();
		assert!(err.is_transient());
	}

	#[tokio::test]
	async fn removes_reservations_by_namespace() {
		let mock = MockK8sClient::new();
		mock.push_reservation(NamespaceReservation {
			status: ReservationStatus {
				namespace: Some("ephemeral-a".into()),
				..Default::default()
			},
			..Default::default()
		});
		mock.remove_reservations_for("ephemeral-a");
		assert!(mock.list_reservations().await.unwrap().is_empty());
	}
}
