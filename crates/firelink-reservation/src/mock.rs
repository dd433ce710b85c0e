// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::GatewayError;
use crate::gateway::ReservationGateway;
use crate::types::{ClusterNamespace, Reservation, ReservationParams};

#[derive(Default)]
struct State {
	subsystem: bool,
	namespaces: Vec<ClusterNamespace>,
	reservations: Vec<Reservation>,
	clowdapps: BTreeMap<String, usize>,
	environments: BTreeMap<String, String>,
	description: Option<String>,
	reserve_error: Option<GatewayError>,
	release_error: Option<GatewayError>,
	reservation_lookup_error: Option<GatewayError>,
	/// Reservation listings a released record survives before it disappears.
	release_lag: u32,
	releasing: BTreeMap<String, u32>,
	reserved: Vec<ReservationParams>,
	released: Vec<String>,
	calls: usize,
	next_id: u32,
}

/// In-memory reservation backend for tests.
///
/// Released reservations vanish after `release_lag` subsequent listings,
/// mimicking the asynchronous cleanup of the real operator.
#[derive(Default)]
pub struct MockGateway {
	state: Mutex<State>,
}

impl MockGateway {
	/// A gateway whose cluster runs the reservation subsystem.
	pub fn new() -> Self {
		let mock = Self::default();
		mock.state.lock().unwrap().subsystem = true;
		mock
	}

	/// A gateway whose cluster has no reservation subsystem.
	pub fn without_subsystem() -> Self {
		Self::default()
	}

	pub fn set_namespaces(&self, namespaces: Vec<ClusterNamespace>) {
		self.state.lock().unwrap().namespaces = namespaces;
	}

	pub fn push_reservation(&self, reservation: Reservation) {
		self.state.lock().unwrap().reservations.push(reservation);
	}

	/// Record an active reservation of `namespace` held by `requester`.
	pub fn hold(&self, namespace: &str, requester: &str) {
		self.push_reservation(Reservation {
			name: format!("res-{namespace}"),
			namespace: Some(namespace.to_string()),
			requester: Some(requester.to_string()),
			state: Some("active".to_string()),
			..Default::default()
		});
	}

	pub fn set_clowdapp_count(&self, namespace: &str, count: usize) {
		self.state
			.lock()
			.unwrap()
			.clowdapps
			.insert(namespace.to_string(), count);
	}

	pub fn add_environment(&self, namespace: &str, environment: &str) {
		self.state
			.lock()
			.unwrap()
			.environments
			.insert(namespace.to_string(), environment.to_string());
	}

	pub fn set_description(&self, text: &str) {
		self.state.lock().unwrap().description = Some(text.to_string());
	}

	pub fn fail_reserve(&self, err: GatewayError) {
		self.state.lock().unwrap().reserve_error = Some(err);
	}

	pub fn fail_release(&self, err: GatewayError) {
		self.state.lock().unwrap().release_error = Some(err);
	}

	pub fn fail_reservation_lookup(&self, err: GatewayError) {
		self.state.lock().unwrap().reservation_lookup_error = Some(err);
	}

	pub fn set_release_lag(&self, listings: u32) {
		self.state.lock().unwrap().release_lag = listings;
	}

	/// Parameters of every `reserve_namespace` call.
	pub fn reserved(&self) -> Vec<ReservationParams> {
		self.state.lock().unwrap().reserved.clone()
	}

	/// Namespaces passed to `release_reservation`.
	pub fn released(&self) -> Vec<String> {
		self.state.lock().unwrap().released.clone()
	}

	/// Total number of gateway calls made.
	pub fn calls(&self) -> usize {
		self.state.lock().unwrap().calls
	}

	fn enter(&self) -> std::sync::MutexGuard<'_, State> {
		let mut state = self.state.lock().unwrap();
		state.calls += 1;
		state
	}
}

#[async_trait]
impl ReservationGateway for MockGateway {
	async fn has_reservation_subsystem(&self) -> Result<bool, GatewayError> {
		Ok(self.enter().subsystem)
	}

	async fn reserve_namespace(&self, params: &ReservationParams) -> Result<String, GatewayError> {
		let mut state = self.enter();
		if let Some(err) = state.reserve_error.clone() {
			return Err(err);
		}
		state.next_id += 1;
		let namespace = params
			.name
			.clone()
			.unwrap_or_else(|| format!("ephemeral-{:06}", state.next_id));
		state.reserved.push(params.clone());
		state.reservations.push(Reservation {
			name: format!("res-{namespace}"),
			namespace: Some(namespace.clone()),
			requester: Some(params.requester.clone()),
			pool: Some(params.pool.clone()),
			duration: Some(params.duration.clone()),
			expiration: None,
			state: Some("active".to_string()),
		});
		Ok(namespace)
	}

	async fn release_reservation(
		&self,
		_requester: Option<&str>,
		namespace: &str,
		_local: bool,
	) -> Result<(), GatewayError> {
		let mut state = self.enter();
		state.released.push(namespace.to_string());
		if let Some(err) = state.release_error.clone() {
			return Err(err);
		}
		let lag = state.release_lag;
		state.releasing.insert(namespace.to_string(), lag);
		Ok(())
	}

	async fn describe_namespace(&self, namespace: &str) -> Result<String, GatewayError> {
		self.enter()
			.description
			.clone()
			.ok_or_else(|| GatewayError::Permanent(format!("namespace '{namespace}' not found")))
	}

	async fn find_environment_for_namespace(
		&self,
		namespace: &str,
	) -> Result<Option<String>, GatewayError> {
		Ok(self.enter().environments.get(namespace).cloned())
	}

	async fn list_namespaces(&self) -> Result<Vec<ClusterNamespace>, GatewayError> {
		Ok(self.enter().namespaces.clone())
	}

	async fn list_reservations(&self) -> Result<Vec<Reservation>, GatewayError> {
		let mut state = self.enter();
		if let Some(err) = state.reservation_lookup_error.clone() {
			return Err(err);
		}
		let mut gone = Vec::new();
		for (namespace, remaining) in state.releasing.iter_mut() {
			if *remaining == 0 {
				gone.push(namespace.clone());
			} else {
				*remaining -= 1;
			}
		}
		for namespace in gone {
			state.releasing.remove(&namespace);
			state
				.reservations
				.retain(|r| r.namespace.as_deref() != Some(namespace.as_str()));
		}
		Ok(state.reservations.clone())
	}

	async fn clowdapp_counts(&self) -> Result<BTreeMap<String, usize>, GatewayError> {
		Ok(self.enter().clowdapps.clone())
	}
}
