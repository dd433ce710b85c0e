// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A namespace as the cluster reports it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterNamespace {
	pub name: String,
	/// Lifecycle phase (`Active`, `Terminating`, ...).
	pub phase: String,
	pub labels: BTreeMap<String, String>,
}

/// An active or pending claim on a namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
	pub name: String,
	/// Bound namespace; `None` while the operator is still assigning one.
	pub namespace: Option<String>,
	pub requester: Option<String>,
	pub pool: Option<String>,
	pub duration: Option<String>,
	pub expiration: Option<DateTime<Utc>>,
	pub state: Option<String>,
}

impl From<firelink_k8s::NamespaceReservation> for Reservation {
	fn from(res: firelink_k8s::NamespaceReservation) -> Self {
		Reservation {
			name: res.name().to_string(),
			namespace: res.bound_namespace().map(str::to_string),
			requester: res.requester().map(str::to_string),
			pool: res.spec.pool.clone(),
			duration: res.spec.duration.clone(),
			expiration: res.status.expiration,
			state: res.status.state.clone(),
		}
	}
}

impl Reservation {
	pub fn is_active(&self) -> bool {
		firelink_k8s::reservation_state_is_active(self.state.as_deref())
	}
}

/// One row of the namespace listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceSummary {
	pub namespace: String,
	pub status: String,
	pub reserved: bool,
	pub pool_type: String,
	pub requester: String,
	pub expires_in: String,
	pub clowdapps: usize,
}

/// Fully resolved reservation parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationParams {
	pub name: Option<String>,
	pub requester: String,
	pub duration: String,
	pub pool: String,
	pub timeout_secs: u64,
	pub local: bool,
	/// Skip the existing-reservation check.
	pub force: bool,
}

/// How a deployment obtains its working namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamespaceTarget {
	/// Use a namespace the requester already holds.
	Existing { name: String, requester: String },
	/// Reserve a fresh namespace.
	Reserve(ReservationParams),
}

/// Result of [`crate::NamespaceLifecycle::acquire`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquiredNamespace {
	pub name: String,
	/// True when this call created the reservation, which makes the
	/// namespace eligible for a compensating release.
	pub newly_reserved: bool,
}
