// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::collections::BTreeMap;

use async_trait::async_trait;
use tracing::warn;

use crate::error::GatewayError;
use crate::types::{ClusterNamespace, Reservation, ReservationParams};

/// Pass-through to the external reservation tooling.
///
/// Implementations translate every tool or API failure into a
/// [`GatewayError`] and never retry on their own.
#[async_trait]
pub trait ReservationGateway: Send + Sync {
	/// Whether the cluster runs the namespace reservation operator.
	async fn has_reservation_subsystem(&self) -> Result<bool, GatewayError>;

	/// Reserve a namespace and return its name.
	async fn reserve_namespace(&self, params: &ReservationParams) -> Result<String, GatewayError>;

	/// Ask for the reservation on `namespace` to be dropped.
	///
	/// Returns once the request is accepted; the backing record may
	/// linger for a while afterwards.
	async fn release_reservation(
		&self,
		requester: Option<&str>,
		namespace: &str,
		local: bool,
	) -> Result<(), GatewayError>;

	/// Free-text description block for a namespace.
	async fn describe_namespace(&self, namespace: &str) -> Result<String, GatewayError>;

	/// Name of the environment whose target namespace is `namespace`.
	async fn find_environment_for_namespace(
		&self,
		namespace: &str,
	) -> Result<Option<String>, GatewayError>;

	async fn list_namespaces(&self) -> Result<Vec<ClusterNamespace>, GatewayError>;

	async fn list_reservations(&self) -> Result<Vec<Reservation>, GatewayError>;

	/// Number of applications attached to each namespace.
	async fn clowdapp_counts(&self) -> Result<BTreeMap<String, usize>, GatewayError>;

	/// Active reservation bound to `namespace`, if any.
	async fn get_reservation(&self, namespace: &str) -> Result<Option<Reservation>, GatewayError> {
		Ok(self
			.list_reservations()
			.await?
			.into_iter()
			.find(|r| r.namespace.as_deref() == Some(namespace) && r.is_active()))
	}

	/// Whether `requester` already holds an active reservation.
	async fn check_for_existing_reservation(&self, requester: &str) -> Result<bool, GatewayError> {
		Ok(self
			.list_reservations()
			.await?
			.iter()
			.any(|r| r.requester.as_deref() == Some(requester) && r.is_active()))
	}
}

/// Route guard run before every lifecycle and deploy operation.
pub async fn ensure_reservation_subsystem(
	gateway: &dyn ReservationGateway,
) -> Result<(), GatewayError> {
	if gateway.has_reservation_subsystem().await? {
		Ok(())
	} else {
		warn!("Namespace reservation operator not detected on cluster");
		Err(GatewayError::Permanent(
			"reservation subsystem unavailable".to_string(),
		))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::mock::MockGateway;

	fn expired(namespace: &str, requester: &str) -> Reservation {
		Reservation {
			name: format!("res-{namespace}"),
			namespace: Some(namespace.to_string()),
			requester: Some(requester.to_string()),
			state: Some("expired".to_string()),
			..Default::default()
		}
	}

	#[test]
	fn only_expired_state_is_inactive() {
		let mut res = expired("ephemeral-a", "alice");
		assert!(!res.is_active());
		res.state = None;
		assert!(res.is_active());
		res.state = Some("waiting".to_string());
		assert!(res.is_active());
	}

	#[tokio::test]
	async fn lookups_skip_expired_reservations() {
		let gw = MockGateway::new();
		gw.push_reservation(expired("ephemeral-a", "alice"));
		assert_eq!(gw.get_reservation("ephemeral-a").await.unwrap(), None);
		assert!(!gw.check_for_existing_reservation("alice").await.unwrap());

		gw.hold("ephemeral-a", "alice");
		let found = gw.get_reservation("ephemeral-a").await.unwrap().unwrap();
		assert_eq!(found.state.as_deref(), Some("active"));
		assert!(gw.check_for_existing_reservation("alice").await.unwrap());
	}

	#[tokio::test]
	async fn guard_rejects_cluster_without_operator() {
		let err = ensure_reservation_subsystem(&MockGateway::without_subsystem())
			.await
			.unwrap_err();
		assert_eq!(err.to_string(), "reservation subsystem unavailable");
		assert!(ensure_reservation_subsystem(&MockGateway::new()).await.is_ok());
	}
}
