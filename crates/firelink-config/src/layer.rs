// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration layer for merging from multiple sources.

use serde::Deserialize;

use crate::sections::{
	ClusterConfigLayer, EnvironmentsConfigLayer, HttpConfigLayer, LoggingConfigLayer,
	MetricsConfigLayer, ReservationConfigLayer,
};

/// Server configuration layer - all fields are Option for merging.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerConfigLayer {
	#[serde(default)]
	pub http: Option<HttpConfigLayer>,
	#[serde(default)]
	pub logging: Option<LoggingConfigLayer>,
	#[serde(default)]
	pub cluster: Option<ClusterConfigLayer>,
	#[serde(default)]
	pub reservation: Option<ReservationConfigLayer>,
	#[serde(default)]
	pub environments: Option<EnvironmentsConfigLayer>,
	#[serde(default)]
	pub metrics: Option<MetricsConfigLayer>,
}

impl ServerConfigLayer {
	/// Merge another layer into this one. Other layer takes precedence.
	pub fn merge(&mut self, other: ServerConfigLayer) {
		merge_option(&mut self.http, other.http, HttpConfigLayer::merge);
		merge_option(&mut self.logging, other.logging, LoggingConfigLayer::merge);
		merge_option(&mut self.cluster, other.cluster, ClusterConfigLayer::merge);
		merge_option(
			&mut self.reservation,
			other.reservation,
			ReservationConfigLayer::merge,
		);
		merge_option(
			&mut self.environments,
			other.environments,
			EnvironmentsConfigLayer::merge,
		);
		merge_option(&mut self.metrics, other.metrics, MetricsConfigLayer::merge);
	}
}

fn merge_option<T, F>(target: &mut Option<T>, source: Option<T>, merge_fn: F)
where
	F: FnOnce(&mut T, T),
{
	match (target.as_mut(), source) {
		(Some(t), Some(s)) => merge_fn(t, s),
		(None, Some(s)) => *target = Some(s),
		_ => {}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_merge_empty_layers() {
		let mut base = ServerConfigLayer::default();
		base.merge(ServerConfigLayer::default());
		assert!(base.http.is_none());
		assert!(base.reservation.is_none());
	}

	#[test]
	fn test_merge_fills_missing_section() {
		let mut base = ServerConfigLayer::default();
		base.merge(ServerConfigLayer {
			http: Some(HttpConfigLayer {
				host: None,
				port: Some(8000),
			}),
			..Default::default()
		});
		assert_eq!(base.http.unwrap().port, Some(8000));
	}

	#[test]
	fn test_merge_overlays_section_fields() {
		let mut base = ServerConfigLayer {
			reservation: Some(ReservationConfigLayer {
				pool: Some("minimal".to_string()),
				duration: Some("2h".to_string()),
				..Default::default()
			}),
			..Default::default()
		};
		base.merge(ServerConfigLayer {
			reservation: Some(ReservationConfigLayer {
				duration: Some("4h".to_string()),
				..Default::default()
			}),
			..Default::default()
		});
		let reservation = base.reservation.unwrap();
		assert_eq!(reservation.pool.as_deref(), Some("minimal"));
		assert_eq!(reservation.duration.as_deref(), Some("4h"));
	}

	#[test]
	fn test_parse_toml_sections() {
		let layer: ServerConfigLayer = toml::from_str(
			r#"
			[http]
			port = 8080

			[reservation]
			pool = "real-managed-kafka"
			release_attempts = 10

			[metrics]
			backend = "prometheus"
			prometheus_url = "https://prometheus.example"
			"#,
		)
		.unwrap();
		assert_eq!(layer.http.unwrap().port, Some(8080));
		let reservation = layer.reservation.unwrap();
		assert_eq!(reservation.pool.as_deref(), Some("real-managed-kafka"));
		assert_eq!(reservation.release_attempts, Some(10));
		assert!(layer.metrics.unwrap().prometheus_url.is_some());
	}
}
