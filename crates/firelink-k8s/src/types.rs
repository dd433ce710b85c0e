// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use k8s_openapi::api::apps::v1::Deployment;
pub use k8s_openapi::api::core::v1::{Namespace, Node, Pod};
pub use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

/// API group/version served by the namespace reservation operator.
pub const RESERVATION_GROUP_VERSION: &str = "cloud.redhat.com/v1alpha1";

/// Plural resource name of the reservation custom object.
pub const RESERVATION_PLURAL: &str = "namespacereservations";

/// A NamespaceReservation custom object.
///
/// Only the fields Firelink reads are modelled; everything else is ignored
/// on deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NamespaceReservation {
	#[serde(default)]
	pub metadata: ObjectMeta,
	#[serde(default)]
	pub spec: ReservationSpec,
	#[serde(default)]
	pub status: ReservationStatus,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationSpec {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub duration: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub requester: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub pool: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationStatus {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub namespace: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub expiration: Option<DateTime<Utc>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub state: Option<String>,
}

impl NamespaceReservation {
	/// Name of the reservation object itself.
	pub fn name(&self) -> &str {
		self.metadata.name.as_deref().unwrap_or_default()
	}

	/// Namespace this reservation is bound to, once the operator has assigned one.
	pub fn bound_namespace(&self) -> Option<&str> {
		self.status.namespace.as_deref().filter(|ns| !ns.is_empty())
	}

	/// Requester recorded on the reservation.
	///
	/// The operator copies the requester into a label; older objects only
	/// carry it in the spec.
	pub fn requester(&self) -> Option<&str> {
		self.metadata
			.labels
			.as_ref()
			.and_then(|labels| labels.get("requester"))
			.map(String::as_str)
			.or(self.spec.requester.as_deref())
	}
}

/// An expired reservation no longer claims its namespace. Any other state,
/// including none yet, does.
pub fn reservation_state_is_active(state: Option<&str>) -> bool {
	state != Some("expired")
}

/// A ClowdEnvironment and the namespace it targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClowdEnvironmentRef {
	pub name: String,
	pub target_namespace: Option<String>,
}

/// Usage sample for one pod from the metrics.k8s.io API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PodMetrics {
	pub name: String,
	pub namespace: String,
	pub containers: Vec<ContainerUsage>,
}

/// Raw usage quantities for one container, e.g. `cpu: "1234567n"`, `memory: "20480Ki"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerUsage {
	pub name: String,
	pub cpu: String,
	pub memory: String,
}

/// Usage sample for one node from the metrics.k8s.io API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeMetrics {
	pub name: String,
	pub cpu: String,
	pub memory: String,
}

/// Identity of an object written by `apply_object`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedObject {
	pub kind: String,
	pub name: String,
}

impl std::fmt::Display for AppliedObject {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}/{}", self.kind, self.name)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn reservation_deserializes_operator_object() {
		let value = json!({
			"apiVersion": "cloud.redhat.com/v1alpha1",
			"kind": "NamespaceReservation",
			"metadata": {
				"name": "bonfire-reservation-1a2b",
				"labels": {"requester": "alice"}
			},
			"spec": {"duration": "1h", "requester": "alice", "pool": "default"},
			"status": {
				"namespace": "ephemeral-abc123",
				"expiration": "2025-01-01T12:00:00Z",
				"state": "active"
			}
		});
		let res: NamespaceReservation = serde_json::from_value(value).unwrap();
		assert_eq!(res.name(), "bonfire-reservation-1a2b");
		assert_eq!(res.bound_namespace(), Some("ephemeral-abc123"));
		assert_eq!(res.requester(), Some("alice"));
		assert_eq!(res.spec.pool.as_deref(), Some("default"));
		assert!(res.status.expiration.is_some());
		assert!(reservation_state_is_active(res.status.state.as_deref()));
	}

	#[test]
	fn reservation_without_status_is_unbound() {
		let value = json!({
			"metadata": {"name": "pending"},
			"spec": {"requester": "bob"}
		});
		let res: NamespaceReservation = serde_json::from_value(value).unwrap();
		assert_eq!(res.bound_namespace(), None);
		assert_eq!(res.requester(), Some("bob"));
	}

	#[test]
	fn expired_reservation_is_inactive() {
		assert!(!reservation_state_is_active(Some("expired")));
		assert!(reservation_state_is_active(Some("active")));
		assert!(reservation_state_is_active(None));
	}

	#[test]
	fn applied_object_display() {
		let obj = AppliedObject {
			kind: "ClowdApp".into(),
			name: "rbac".into(),
		};
		assert_eq!(obj.to_string(), "ClowdApp/rbac");
	}
}
