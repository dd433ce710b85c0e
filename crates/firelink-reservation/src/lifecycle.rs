// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::description::{parse_description, NamespaceDescription};
use crate::error::{GatewayError, LifecycleError};
use crate::gateway::{ensure_reservation_subsystem, ReservationGateway};
use crate::types::{
	AcquiredNamespace, ClusterNamespace, NamespaceSummary, NamespaceTarget, Reservation,
	ReservationParams,
};

const NAMESPACE_PREFIX: &str = "ephemeral-";
const HIDDEN_NAMESPACES: &[&str] = &["ephemeral-base", "ephemeral-namespace-operator-system"];
const OPERATOR_LABEL: &str = "operator-ns";
const POOL_LABEL: &str = "pool";

/// How long to wait for a released reservation to disappear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReleasePolicy {
	pub attempts: u32,
	pub interval: Duration,
}

impl Default for ReleasePolicy {
	fn default() -> Self {
		Self {
			attempts: 30,
			interval: Duration::from_secs(1),
		}
	}
}

/// Defaults applied to requests that leave a field unset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleSettings {
	pub pool: String,
	pub duration: String,
	pub timeout_secs: u64,
	pub local: bool,
	pub requester: String,
	pub release: ReleasePolicy,
}

impl Default for LifecycleSettings {
	fn default() -> Self {
		Self {
			pool: "default".to_string(),
			duration: "1h".to_string(),
			timeout_secs: 600,
			local: true,
			requester: "firelink".to_string(),
			release: ReleasePolicy::default(),
		}
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ReserveRequest {
	#[serde(default)]
	pub name: Option<String>,
	#[serde(default)]
	pub requester: Option<String>,
	#[serde(default)]
	pub duration: Option<String>,
	#[serde(default, alias = "pool")]
	pub pool_type: Option<String>,
	#[serde(default)]
	pub timeout: Option<u64>,
	#[serde(default)]
	pub local: Option<bool>,
	#[serde(default)]
	pub force: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReserveResponse {
	pub namespace: String,
	pub completed: bool,
	pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ReleaseRequest {
	#[serde(default)]
	pub namespace: Option<String>,
	#[serde(default)]
	pub requester: Option<String>,
	#[serde(default)]
	pub local: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseResponse {
	pub completed: bool,
	pub message: String,
}

impl ReleaseResponse {
	fn failed(message: impl Into<String>) -> Self {
		Self {
			completed: false,
			message: message.into(),
		}
	}
}

/// Parsed description on success, `"ERROR: ..."` text otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DescribeMessage {
	Description(NamespaceDescription),
	Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DescribeResponse {
	pub completed: bool,
	pub message: DescribeMessage,
}

/// Namespace reservation state machine.
///
/// `Unreserved -> Reserved -> Releasing -> Unreserved`, with the cluster's
/// reservation records as the only state. Public operations never return
/// an error for reserve/release/describe; failures come back as
/// `completed: false` with a message.
pub struct NamespaceLifecycle {
	gateway: Arc<dyn ReservationGateway>,
	settings: LifecycleSettings,
}

impl NamespaceLifecycle {
	pub fn new(gateway: Arc<dyn ReservationGateway>, settings: LifecycleSettings) -> Self {
		Self { gateway, settings }
	}

	pub fn settings(&self) -> &LifecycleSettings {
		&self.settings
	}

	/// Route guard for callers that drive the gateway themselves.
	pub async fn ensure_ready(&self) -> Result<(), GatewayError> {
		ensure_reservation_subsystem(self.gateway.as_ref()).await
	}

	/// Ephemeral namespaces with their reservation details, sorted by name.
	#[instrument(skip(self))]
	pub async fn list(&self) -> Result<Vec<NamespaceSummary>, LifecycleError> {
		self.ensure_ready().await?;
		let namespaces = self.gateway.list_namespaces().await?;
		let reservations = self.gateway.list_reservations().await?;
		let counts = self.gateway.clowdapp_counts().await?;
		let summaries = summarize(namespaces, &reservations, &counts, Utc::now());
		debug!(count = summaries.len(), "Listed ephemeral namespaces");
		Ok(summaries)
	}

	#[instrument(
		skip(self, request),
		fields(requester = ?request.requester, force = request.force)
	)]
	pub async fn reserve(&self, request: ReserveRequest) -> ReserveResponse {
		let params = self.reservation_params(request);
		match self.try_reserve(&params).await {
			Ok(namespace) => ReserveResponse {
				namespace,
				completed: true,
				message: "Namespace reserved".to_string(),
			},
			Err(err) => {
				warn!(error = %err, "Reservation failed");
				ReserveResponse {
					namespace: String::new(),
					completed: false,
					message: err.to_string(),
				}
			}
		}
	}

	/// Fill unset request fields from the configured defaults.
	pub fn reservation_params(&self, request: ReserveRequest) -> ReservationParams {
		ReservationParams {
			name: request.name.filter(|n| !n.is_empty()),
			requester: request
				.requester
				.filter(|r| !r.is_empty())
				.unwrap_or_else(|| self.settings.requester.clone()),
			duration: request
				.duration
				.unwrap_or_else(|| self.settings.duration.clone()),
			pool: request
				.pool_type
				.unwrap_or_else(|| self.settings.pool.clone()),
			timeout_secs: request.timeout.unwrap_or(self.settings.timeout_secs),
			local: request.local.unwrap_or(self.settings.local),
			force: request.force,
		}
	}

	async fn try_reserve(&self, params: &ReservationParams) -> Result<String, LifecycleError> {
		self.ensure_ready().await?;
		// Advisory only: two concurrent calls can both pass this check.
		if !params.force
			&& self
				.gateway
				.check_for_existing_reservation(&params.requester)
				.await?
		{
			return Err(LifecycleError::AlreadyReserved {
				requester: params.requester.clone(),
			});
		}
		let namespace = self.gateway.reserve_namespace(params).await?;
		info!(namespace = %namespace, requester = %params.requester, "Namespace reserved");
		Ok(namespace)
	}

	#[instrument(skip(self, request), fields(namespace = ?request.namespace))]
	pub async fn release(&self, request: ReleaseRequest) -> ReleaseResponse {
		let Some(namespace) = request.namespace.filter(|n| !n.is_empty()) else {
			return ReleaseResponse::failed("No namespace specified");
		};
		let local = request.local.unwrap_or(self.settings.local);

		match self
			.try_release(request.requester.as_deref(), &namespace, local)
			.await
		{
			Ok(()) => ReleaseResponse {
				completed: true,
				message: "Namespace released".to_string(),
			},
			Err(err) => {
				warn!(namespace = %namespace, error = %err, "Release failed");
				ReleaseResponse::failed(err.to_string())
			}
		}
	}

	async fn try_release(
		&self,
		requester: Option<&str>,
		namespace: &str,
		local: bool,
	) -> Result<(), LifecycleError> {
		self.ensure_ready().await?;
		self.gateway
			.release_reservation(requester, namespace, local)
			.await?;
		self.confirm_release(namespace).await
	}

	/// Poll until the reservation record for `namespace` is gone.
	async fn confirm_release(&self, namespace: &str) -> Result<(), LifecycleError> {
		let policy = self.settings.release;
		for attempt in 1..=policy.attempts {
			tokio::time::sleep(policy.interval).await;
			match self.gateway.get_reservation(namespace).await {
				Ok(None) => {
					info!(namespace = %namespace, attempt, "Namespace released");
					return Ok(());
				}
				Ok(Some(_)) => {
					debug!(namespace = %namespace, attempt, "Reservation still present");
				}
				Err(err) if err.is_transient() => {
					warn!(
						namespace = %namespace,
						attempt,
						error = %err,
						"Reservation lookup failed, retrying"
					);
				}
				Err(err) => return Err(err.into()),
			}
		}
		Err(LifecycleError::ReleaseUnconfirmed {
			namespace: namespace.to_string(),
			attempts: policy.attempts,
		})
	}

	/// Fire a release without waiting for confirmation.
	///
	/// Used to roll back a reservation after a failed deployment.
	pub async fn release_now(&self, namespace: &str, local: bool) -> Result<(), LifecycleError> {
		self.gateway
			.release_reservation(None, namespace, local)
			.await?;
		Ok(())
	}

	#[instrument(skip(self))]
	pub async fn describe(&self, namespace: &str) -> DescribeResponse {
		match self.try_describe(namespace).await {
			Ok(description) => DescribeResponse {
				completed: true,
				message: DescribeMessage::Description(description),
			},
			Err(message) => {
				warn!(namespace = %namespace, error = %message, "Describe failed");
				DescribeResponse {
					completed: false,
					message: DescribeMessage::Text(format!("ERROR: {message}")),
				}
			}
		}
	}

	async fn try_describe(&self, namespace: &str) -> Result<NamespaceDescription, String> {
		self.ensure_ready().await.map_err(|e| e.to_string())?;
		let text = self
			.gateway
			.describe_namespace(namespace)
			.await
			.map_err(|e| e.to_string())?;
		Ok(parse_description(&text))
	}

	/// Obtain the working namespace for a deployment.
	///
	/// An existing namespace must be reserved by the same requester.
	pub async fn acquire(
		&self,
		target: &NamespaceTarget,
	) -> Result<AcquiredNamespace, LifecycleError> {
		match target {
			NamespaceTarget::Existing { name, requester } => {
				let reservation = self.gateway.get_reservation(name).await?.ok_or_else(|| {
					LifecycleError::NotReserved {
						namespace: name.clone(),
					}
				})?;
				match reservation.requester.as_deref() {
					Some(owner) if owner != requester => Err(LifecycleError::ReservedByOther {
						namespace: name.clone(),
						owner: owner.to_string(),
					}),
					_ => Ok(AcquiredNamespace {
						name: name.clone(),
						newly_reserved: false,
					}),
				}
			}
			NamespaceTarget::Reserve(params) => {
				let name = self.gateway.reserve_namespace(params).await?;
				Ok(AcquiredNamespace {
					name,
					newly_reserved: true,
				})
			}
		}
	}

	pub async fn find_environment(&self, namespace: &str) -> Result<Option<String>, GatewayError> {
		self.gateway.find_environment_for_namespace(namespace).await
	}
}

/// Join namespaces with their active reservations.
fn summarize(
	namespaces: Vec<ClusterNamespace>,
	reservations: &[Reservation],
	clowdapps: &BTreeMap<String, usize>,
	now: DateTime<Utc>,
) -> Vec<NamespaceSummary> {
	let mut summaries: Vec<NamespaceSummary> = namespaces
		.into_iter()
		.filter(is_ephemeral)
		.map(|ns| {
			let reservation = reservations.iter().find(|r| {
				r.namespace.as_deref() == Some(ns.name.as_str())
					&& r.is_active()
			});
			let mut summary = NamespaceSummary {
				status: ns.phase.clone(),
				reserved: false,
				pool_type: ns.labels.get(POOL_LABEL).cloned().unwrap_or_default(),
				requester: String::new(),
				expires_in: String::new(),
				clowdapps: clowdapps.get(&ns.name).copied().unwrap_or(0),
				namespace: ns.name,
			};
			if let Some(res) = reservation {
				summary.reserved = true;
				summary.requester = res.requester.clone().unwrap_or_default();
				summary.expires_in = res
					.expiration
					.map(|at| expires_in(at, now))
					.unwrap_or_default();
				if let Some(pool) = &res.pool {
					summary.pool_type = pool.clone();
				}
			}
			summary
		})
		.collect();
	summaries.sort_by(|a, b| a.namespace.cmp(&b.namespace));
	summaries
}

fn is_ephemeral(ns: &ClusterNamespace) -> bool {
	ns.name.starts_with(NAMESPACE_PREFIX)
		&& !HIDDEN_NAMESPACES.contains(&ns.name.as_str())
		&& ns.phase == "Active"
		&& ns
			.labels
			.get(OPERATOR_LABEL)
			.is_some_and(|v| !v.is_empty() && !v.eq_ignore_ascii_case("false"))
}

fn expires_in(expiration: DateTime<Utc>, now: DateTime<Utc>) -> String {
	match (expiration - now).to_std() {
		Ok(remaining) if remaining.as_secs() > 0 => {
			humantime::format_duration(Duration::from_secs(remaining.as_secs())).to_string()
		}
		_ => String::new(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::mock::MockGateway;

	fn fast_settings() -> LifecycleSettings {
		LifecycleSettings {
			release: ReleasePolicy {
				attempts: 5,
				interval: Duration::from_millis(1),
			},
			..Default::default()
		}
	}

	fn lifecycle(gateway: Arc<MockGateway>) -> NamespaceLifecycle {
		NamespaceLifecycle::new(gateway, fast_settings())
	}

	fn namespace(name: &str, phase: &str, operator: bool) -> ClusterNamespace {
		let mut labels = BTreeMap::new();
		if operator {
			labels.insert(OPERATOR_LABEL.to_string(), "true".to_string());
		}
		labels.insert(POOL_LABEL.to_string(), "default".to_string());
		ClusterNamespace {
			name: name.to_string(),
			phase: phase.to_string(),
			labels,
		}
	}

	mod list {
		use super::*;

		#[test]
		fn filters_non_ephemeral_namespaces() {
			let now = Utc::now();
			let summaries = summarize(
				vec![
					namespace("ephemeral-b", "Active", true),
					namespace("ephemeral-a", "Active", true),
					namespace("ephemeral-base", "Active", true),
					namespace("ephemeral-namespace-operator-system", "Active", true),
					namespace("ephemeral-c", "Terminating", true),
					namespace("ephemeral-d", "Active", false),
					namespace("kube-system", "Active", true),
				],
				&[],
				&BTreeMap::new(),
				now,
			);
			let names: Vec<_> = summaries.iter().map(|s| s.namespace.as_str()).collect();
			assert_eq!(names, vec!["ephemeral-a", "ephemeral-b"]);
			assert!(summaries.iter().all(|s| !s.reserved));
		}

		#[test]
		fn enriches_reserved_namespaces() {
			let now = Utc::now();
			let reservations = vec![Reservation {
				name: "res-a".into(),
				namespace: Some("ephemeral-a".into()),
				requester: Some("alice".into()),
				pool: Some("minimal".into()),
				expiration: Some(now + chrono::Duration::seconds(3_600)),
				state: Some("active".into()),
				..Default::default()
			}];
			let mut counts = BTreeMap::new();
			counts.insert("ephemeral-a".to_string(), 4);

			let summaries = summarize(
				vec![namespace("ephemeral-a", "Active", true)],
				&reservations,
				&counts,
				now,
			);
			let a = &summaries[0];
			assert!(a.reserved);
			assert_eq!(a.requester, "alice");
			assert_eq!(a.pool_type, "minimal");
			assert_eq!(a.expires_in, "1h");
			assert_eq!(a.clowdapps, 4);
		}

		#[test]
		fn expired_reservations_are_ignored() {
			let now = Utc::now();
			let reservations = vec![Reservation {
				namespace: Some("ephemeral-a".into()),
				requester: Some("alice".into()),
				state: Some("expired".into()),
				..Default::default()
			}];
			let summaries = summarize(
				vec![namespace("ephemeral-a", "Active", true)],
				&reservations,
				&BTreeMap::new(),
				now,
			);
			assert!(!summaries[0].reserved);
			assert_eq!(summaries[0].requester, "");
		}

		#[test]
		fn past_expiration_renders_empty() {
			let now = Utc::now();
			assert_eq!(expires_in(now - chrono::Duration::seconds(5), now), "");
			assert_eq!(
				expires_in(now + chrono::Duration::seconds(90), now),
				"1m 30s"
			);
		}

		#[tokio::test]
		async fn list_requires_subsystem() {
			let gw = Arc::new(MockGateway::without_subsystem());
			let err = lifecycle(gw).list().await.unwrap_err();
			assert_eq!(err.to_string(), "reservation subsystem unavailable");
		}
	}

	mod reserve {
		use super::*;

		#[tokio::test]
		async fn reserves_with_defaults() {
			let gw = Arc::new(MockGateway::new());
			let res = lifecycle(gw.clone())
				.reserve(ReserveRequest {
					requester: Some("alice".into()),
					..Default::default()
				})
				.await;
			assert!(res.completed);
			assert_eq!(res.message, "Namespace reserved");
			assert!(res.namespace.starts_with("ephemeral-"));

			let params = &gw.reserved()[0];
			assert_eq!(params.pool, "default");
			assert_eq!(params.duration, "1h");
			assert_eq!(params.timeout_secs, 600);
			assert!(params.local);
		}

		#[tokio::test]
		async fn second_reservation_is_refused() {
			let gw = Arc::new(MockGateway::new());
			let lc = lifecycle(gw.clone());
			let request = ReserveRequest {
				requester: Some("alice".into()),
				..Default::default()
			};
			assert!(lc.reserve(request.clone()).await.completed);

			let second = lc.reserve(request).await;
			assert!(!second.completed);
			assert_eq!(second.namespace, "");
			assert_eq!(second.message, "You already have a reservation.");
			assert_eq!(gw.reserved().len(), 1);
		}

		#[tokio::test]
		async fn force_skips_existing_check() {
			let gw = Arc::new(MockGateway::new());
			gw.hold("ephemeral-held", "alice");
			let res = lifecycle(gw.clone())
				.reserve(ReserveRequest {
					requester: Some("alice".into()),
					force: true,
					..Default::default()
				})
				.await;
			assert!(res.completed);
			assert_eq!(gw.reserved().len(), 1);
		}

		#[tokio::test]
		async fn gateway_failure_becomes_message() {
			let gw = Arc::new(MockGateway::new());
			gw.fail_reserve(GatewayError::Transient("pool exhausted".into()));
			let res = lifecycle(gw).reserve(ReserveRequest::default()).await;
			assert!(!res.completed);
			assert_eq!(res.message, "pool exhausted");
		}

		#[tokio::test]
		async fn missing_subsystem_never_reserves() {
			let gw = Arc::new(MockGateway::without_subsystem());
			let res = lifecycle(gw.clone()).reserve(ReserveRequest::default()).await;
			assert!(!res.completed);
			assert_eq!(res.message, "reservation subsystem unavailable");
			assert!(gw.reserved().is_empty());
		}
	}

	mod release {
		use super::*;

		#[tokio::test]
		async fn missing_namespace_does_not_contact_gateway() {
			let gw = Arc::new(MockGateway::new());
			let res = lifecycle(gw.clone()).release(ReleaseRequest::default()).await;
			assert_eq!(res, ReleaseResponse::failed("No namespace specified"));
			assert_eq!(gw.calls(), 0);

			let res = lifecycle(gw.clone())
				.release(ReleaseRequest {
					namespace: Some(String::new()),
					..Default::default()
				})
				.await;
			assert!(!res.completed);
			assert_eq!(gw.calls(), 0);
		}

		#[tokio::test]
		async fn missing_subsystem_never_releases() {
			let gw = Arc::new(MockGateway::without_subsystem());
			gw.hold("ephemeral-a", "alice");
			let res = lifecycle(gw.clone())
				.release(ReleaseRequest {
					namespace: Some("ephemeral-a".into()),
					..Default::default()
				})
				.await;
			assert!(!res.completed);
			assert_eq!(res.message, "reservation subsystem unavailable");
			assert!(gw.released().is_empty());
		}

		#[tokio::test]
		async fn confirms_after_record_disappears() {
			let gw = Arc::new(MockGateway::new());
			gw.hold("ephemeral-a", "alice");
			gw.set_release_lag(2);
			let res = lifecycle(gw.clone())
				.release(ReleaseRequest {
					namespace: Some("ephemeral-a".into()),
					..Default::default()
				})
				.await;
			assert!(res.completed);
			assert_eq!(res.message, "Namespace released");
			assert_eq!(gw.released(), vec!["ephemeral-a"]);
		}

		#[tokio::test]
		async fn gives_up_after_retry_budget() {
			let gw = Arc::new(MockGateway::new());
			gw.hold("ephemeral-a", "alice");
			gw.set_release_lag(u32::MAX);
			let res = lifecycle(gw)
				.release(ReleaseRequest {
					namespace: Some("ephemeral-a".into()),
					..Default::default()
				})
				.await;
			assert!(!res.completed);
			assert_eq!(res.message, "Something went wrong verifying the release");
		}

		#[tokio::test]
		async fn permanent_lookup_failure_stops_polling() {
			let gw = Arc::new(MockGateway::new());
			gw.hold("ephemeral-a", "alice");
			gw.fail_reservation_lookup(GatewayError::Permanent("forbidden".into()));
			let res = lifecycle(gw)
				.release(ReleaseRequest {
					namespace: Some("ephemeral-a".into()),
					..Default::default()
				})
				.await;
			assert_eq!(res, ReleaseResponse::failed("forbidden"));
		}

		#[tokio::test]
		async fn reserve_then_release_clears_listing() {
			let gw = Arc::new(MockGateway::new());
			let lc = lifecycle(gw.clone());
			let reserved = lc
				.reserve(ReserveRequest {
					requester: Some("alice".into()),
					..Default::default()
				})
				.await;
			let released = lc
				.release(ReleaseRequest {
					namespace: Some(reserved.namespace.clone()),
					..Default::default()
				})
				.await;
			assert!(released.completed);
			assert!(gw.get_reservation(&reserved.namespace).await.unwrap().is_none());
		}
	}

	mod describe {
		use super::*;

		#[tokio::test]
		async fn parses_description() {
			let gw = Arc::new(MockGateway::new());
			gw.set_description(
				"Keycloak Admin Route: https://x\nKeycloak Admin Login: admin | pw123",
			);
			let res = lifecycle(gw).describe("ephemeral-a").await;
			assert!(res.completed);
			let json = serde_json::to_value(&res).unwrap();
			assert_eq!(json["message"]["keycloak_admin"]["login"]["password"], "pw123");
		}

		#[tokio::test]
		async fn malformed_line_keeps_the_rest() {
			let gw = Arc::new(MockGateway::new());
			gw.set_description(
				"Gateway route: https://gw\nDefault user login: jdoe\n2 clowdapps, 1 frontends deployed",
			);
			let res = lifecycle(gw).describe("ephemeral-a").await;
			assert!(res.completed);
			let json = serde_json::to_value(&res).unwrap();
			assert_eq!(json["message"]["gateway"]["route"], "https://gw");
			assert!(json["message"]["gateway"].get("login").is_none());
			assert_eq!(json["message"]["frontends_deployed"], 1);
		}

		#[tokio::test]
		async fn failure_is_error_text() {
			let gw = Arc::new(MockGateway::new());
			let res = lifecycle(gw).describe("ephemeral-a").await;
			assert!(!res.completed);
			assert_eq!(
				res.message,
				DescribeMessage::Text("ERROR: namespace 'ephemeral-a' not found".into())
			);
		}
	}

	mod acquire {
		use super::*;

		fn existing(name: &str, requester: &str) -> NamespaceTarget {
			NamespaceTarget::Existing {
				name: name.into(),
				requester: requester.into(),
			}
		}

		#[tokio::test]
		async fn existing_namespace_owned_by_requester() {
			let gw = Arc::new(MockGateway::new());
			gw.hold("ephemeral-a", "alice");
			let acquired = lifecycle(gw)
				.acquire(&existing("ephemeral-a", "alice"))
				.await
				.unwrap();
			assert_eq!(acquired.name, "ephemeral-a");
			assert!(!acquired.newly_reserved);
		}

		#[tokio::test]
		async fn existing_namespace_rules() {
			let gw = Arc::new(MockGateway::new());
			gw.hold("ephemeral-a", "bob");
			let lc = lifecycle(gw);
			assert!(matches!(
				lc.acquire(&existing("ephemeral-a", "alice")).await,
				Err(LifecycleError::ReservedByOther { .. })
			));
			assert!(matches!(
				lc.acquire(&existing("ephemeral-z", "alice")).await,
				Err(LifecycleError::NotReserved { .. })
			));
		}

		#[tokio::test]
		async fn reservation_is_marked_new() {
			let gw = Arc::new(MockGateway::new());
			let lc = lifecycle(gw);
			let params = lc.reservation_params(ReserveRequest {
				requester: Some("alice".into()),
				force: true,
				..Default::default()
			});
			let acquired = lc.acquire(&NamespaceTarget::Reserve(params)).await.unwrap();
			assert!(acquired.newly_reserved);
		}
	}
}
