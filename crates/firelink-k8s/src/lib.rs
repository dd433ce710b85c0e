// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Cluster client abstraction for Firelink.
//!
//! This crate provides:
//! - A trait-based cluster client abstraction for testability
//! - Production implementation using the kube crate
//! - Typed views over the reservation operator's custom objects
//! - Raw pod/node usage samples from the metrics.k8s.io API

mod client;
mod error;
mod kube_client;
#[cfg(any(test, feature = "testing"))]
mod mock;
mod types;

pub use client::K8sClient;
pub use error::{K8sError, K8sResult};
pub use kube_client::KubeClient;
#[cfg(any(test, feature = "testing"))]
pub use mock::MockK8sClient;
pub use types::{
	AppliedObject, ClowdEnvironmentRef, ContainerUsage, Deployment, Namespace, NamespaceReservation,
	Node, NodeMetrics, ObjectMeta, Pod, PodMetrics, ReservationSpec, ReservationStatus,
	reservation_state_is_active, RESERVATION_GROUP_VERSION, RESERVATION_PLURAL,
};
