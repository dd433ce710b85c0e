// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use firelink_bonfire::{BonfireCli, ReleaseArgs, ReserveArgs};
use firelink_k8s::{K8sClient, Namespace, RESERVATION_GROUP_VERSION, RESERVATION_PLURAL};
use tracing::{debug, info, instrument};

use crate::error::GatewayError;
use crate::gateway::ReservationGateway;
use crate::types::{ClusterNamespace, Reservation, ReservationParams};

/// Production gateway: mutations shell out to `bonfire`, reads go to the
/// cluster API directly.
pub struct BonfireGateway {
	cli: BonfireCli,
	client: Arc<dyn K8sClient>,
}

impl BonfireGateway {
	pub fn new(cli: BonfireCli, client: Arc<dyn K8sClient>) -> Self {
		Self { cli, client }
	}
}

#[async_trait]
impl ReservationGateway for BonfireGateway {
	async fn has_reservation_subsystem(&self) -> Result<bool, GatewayError> {
		Ok(self
			.client
			.has_api_resource(RESERVATION_GROUP_VERSION, RESERVATION_PLURAL)
			.await?)
	}

	#[instrument(skip(self, params), fields(requester = %params.requester, pool = %params.pool))]
	async fn reserve_namespace(&self, params: &ReservationParams) -> Result<String, GatewayError> {
		let args = ReserveArgs {
			name: params.name.clone(),
			requester: params.requester.clone(),
			duration: params.duration.clone(),
			pool: params.pool.clone(),
			timeout_secs: params.timeout_secs,
			local: params.local,
			force: params.force,
		};
		let namespace = self.cli.reserve(&args).await?;
		info!(namespace = %namespace, "Namespace reserved");
		Ok(namespace)
	}

	async fn release_reservation(
		&self,
		requester: Option<&str>,
		namespace: &str,
		local: bool,
	) -> Result<(), GatewayError> {
		let args = ReleaseArgs {
			namespace: namespace.to_string(),
			local,
		};
		self.cli.release(&args).await?;
		info!(namespace = %namespace, requester = ?requester, "Release requested");
		Ok(())
	}

	async fn describe_namespace(&self, namespace: &str) -> Result<String, GatewayError> {
		Ok(self.cli.describe(namespace).await?)
	}

	async fn find_environment_for_namespace(
		&self,
		namespace: &str,
	) -> Result<Option<String>, GatewayError> {
		let environments = self.client.list_clowd_environments().await?;
		let found = environments
			.into_iter()
			.find(|env| env.target_namespace.as_deref() == Some(namespace))
			.map(|env| env.name);
		debug!(namespace = %namespace, environment = ?found, "Environment lookup");
		Ok(found)
	}

	async fn list_namespaces(&self) -> Result<Vec<ClusterNamespace>, GatewayError> {
		let namespaces = self.client.list_namespaces().await?;
		Ok(namespaces.into_iter().map(cluster_namespace).collect())
	}

	async fn list_reservations(&self) -> Result<Vec<Reservation>, GatewayError> {
		let reservations = self.client.list_reservations().await?;
		Ok(reservations.into_iter().map(Reservation::from).collect())
	}

	async fn clowdapp_counts(&self) -> Result<BTreeMap<String, usize>, GatewayError> {
		Ok(self.client.count_clowdapps().await?)
	}
}

fn cluster_namespace(ns: Namespace) -> ClusterNamespace {
	ClusterNamespace {
		name: ns.metadata.name.unwrap_or_default(),
		phase: ns
			.status
			.and_then(|s| s.phase)
			.unwrap_or_default(),
		labels: ns.metadata.labels.unwrap_or_default(),
	}
}
