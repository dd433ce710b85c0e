// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sections for firelink-server.

pub mod cluster;
pub mod environments;
pub mod http;
pub mod logging;
pub mod metrics;
pub mod reservation;

pub use cluster::{ClusterConfig, ClusterConfigLayer};
pub use environments::{EnvironmentsConfig, EnvironmentsConfigLayer};
pub use http::{HttpConfig, HttpConfigLayer};
pub use logging::{LogFormat, LoggingConfig, LoggingConfigLayer};
pub use metrics::{MetricsBackend, MetricsConfig, MetricsConfigLayer};
pub use reservation::{ReservationConfig, ReservationConfigLayer};
