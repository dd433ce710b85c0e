// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Namespace reservation lifecycle for Firelink.
//!
//! The cluster's NamespaceReservation objects are the only source of truth;
//! nothing here caches reservation state between calls. Mutations go
//! through a [`ReservationGateway`], and [`NamespaceLifecycle`] turns every
//! failure into a `{completed: false, message}` result.

mod bonfire_gateway;
mod description;
mod error;
mod gateway;
mod lifecycle;
#[cfg(any(test, feature = "testing"))]
mod mock;
mod types;

pub use bonfire_gateway::BonfireGateway;
pub use description::{parse_description, Credentials, EndpointInfo, NamespaceDescription};
pub use error::{GatewayError, LifecycleError};
pub use gateway::{ensure_reservation_subsystem, ReservationGateway};
#[cfg(any(test, feature = "testing"))]
pub use mock::MockGateway;
pub use lifecycle::{
	DescribeMessage, DescribeResponse, LifecycleSettings, NamespaceLifecycle, ReleasePolicy,
	ReleaseRequest, ReleaseResponse, ReserveRequest, ReserveResponse,
};
pub use types::{
	AcquiredNamespace, ClusterNamespace, NamespaceSummary, NamespaceTarget, Reservation,
	ReservationParams,
};
