// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Resource usage for Firelink namespaces, pods and nodes.
//!
//! Two backends share the [`MetricsSource`] contract: the cluster's own
//! metrics API ([`MetricsServerSource`]) and a Prometheus query endpoint
//! ([`PrometheusSource`]). Callers go through [`MetricsAggregator`].

mod aggregator;
mod error;
mod metrics_server;
#[cfg(any(test, feature = "testing"))]
mod mock;
mod prometheus;
pub mod quantity;
mod source;
mod types;

pub use aggregator::MetricsAggregator;
pub use error::{MetricsError, MetricsResult};
pub use metrics_server::MetricsServerSource;
#[cfg(any(test, feature = "testing"))]
pub use mock::MockMetricsSource;
pub use prometheus::PrometheusSource;
pub use quantity::{calculate_percentage, QuantityError, ResourceKind};
pub use source::MetricsSource;
pub use types::{ClusterUsage, NodeUsage, PodUsage, ResourcePair, ResourceUsageSnapshot};
