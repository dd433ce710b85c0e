// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Shared application state and its construction from configuration.

use std::sync::Arc;

use firelink_bonfire::BonfireCli;
use firelink_config::{
	EnvironmentsConfig, MetricsBackend, MetricsConfig, ReservationConfig, ServerConfig,
};
use firelink_deploy::{
	AppCatalog, BonfireTemplates, DeploymentOrchestrator, EnvironmentDefaults, TemplateGateway,
};
use firelink_k8s::K8sClient;
use firelink_metrics::{
	MetricsAggregator, MetricsResult, MetricsServerSource, MetricsSource, PrometheusSource,
};
use firelink_reservation::{
	BonfireGateway, LifecycleSettings, NamespaceLifecycle, ReleasePolicy, ReservationGateway,
};

const DEFAULT_REQUESTER: &str = "firelink";

/// Shared state for all handlers. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
	pub cluster: Arc<dyn K8sClient>,
	pub lifecycle: Arc<NamespaceLifecycle>,
	pub orchestrator: Arc<DeploymentOrchestrator>,
	pub catalog: Arc<AppCatalog>,
	pub metrics: MetricsAggregator,
}

impl AppState {
	/// Wire components from already-built gateways.
	pub fn new(
		cluster: Arc<dyn K8sClient>,
		gateway: Arc<dyn ReservationGateway>,
		templates: Arc<dyn TemplateGateway>,
		metrics: Arc<dyn MetricsSource>,
		settings: LifecycleSettings,
		environments: EnvironmentDefaults,
	) -> Self {
		let lifecycle = Arc::new(NamespaceLifecycle::new(gateway, settings));
		let orchestrator = Arc::new(DeploymentOrchestrator::new(
			Arc::clone(&lifecycle),
			Arc::clone(&templates),
			environments.clone(),
		));
		Self {
			cluster,
			lifecycle,
			orchestrator,
			catalog: Arc::new(AppCatalog::new(templates, environments)),
			metrics: MetricsAggregator::new(metrics),
		}
	}
}

/// Build the production state around one shared cluster client.
pub fn create_app_state(
	config: &ServerConfig,
	cluster: Arc<dyn K8sClient>,
) -> MetricsResult<AppState> {
	let cli = BonfireCli::new(
		config.cluster.bonfire_bin.clone(),
		config.cluster.oc_bin.clone(),
		config.cluster.command_timeout(),
	);
	let gateway = Arc::new(BonfireGateway::new(cli.clone(), Arc::clone(&cluster)));
	let templates = Arc::new(BonfireTemplates::new(cli, Arc::clone(&cluster)));
	let metrics = metrics_source(&config.metrics, Arc::clone(&cluster))?;

	Ok(AppState::new(
		cluster,
		gateway,
		templates,
		metrics,
		lifecycle_settings(&config.reservation),
		environment_defaults(&config.environments),
	))
}

pub fn lifecycle_settings(config: &ReservationConfig) -> LifecycleSettings {
	LifecycleSettings {
		pool: config.pool.clone(),
		duration: config.duration.clone(),
		timeout_secs: config.timeout_secs,
		local: config.local,
		requester: config
			.requester
			.clone()
			.unwrap_or_else(|| DEFAULT_REQUESTER.to_string()),
		release: ReleasePolicy {
			attempts: config.release_attempts,
			interval: config.release_interval(),
		},
	}
}

pub fn environment_defaults(config: &EnvironmentsConfig) -> EnvironmentDefaults {
	EnvironmentDefaults {
		source: config.source.clone(),
		target_env: config.target_env.clone(),
		ref_env: config.ref_env.clone(),
		fallback_ref_env: config.fallback_ref_env.clone(),
	}
}

pub fn metrics_source(
	config: &MetricsConfig,
	cluster: Arc<dyn K8sClient>,
) -> MetricsResult<Arc<dyn MetricsSource>> {
	match config.backend {
		MetricsBackend::MetricsServer => Ok(Arc::new(MetricsServerSource::new(cluster))),
		MetricsBackend::Prometheus => {
			let source = PrometheusSource::new(
				config.prometheus_url.as_deref().unwrap_or_default(),
				config.prometheus_token.as_ref().map(|t| t.expose().to_string()),
				config.accept_invalid_certs,
				config.query_timeout(),
			)?;
			Ok(Arc::new(source))
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use firelink_config::SecretString;
	use firelink_k8s::MockK8sClient;

	#[test]
	fn settings_follow_reservation_config() {
		let config = ReservationConfig {
			requester: Some("ci-bot".into()),
			release_attempts: 5,
			release_interval_ms: 250,
			..Default::default()
		};
		let settings = lifecycle_settings(&config);
		assert_eq!(settings.requester, "ci-bot");
		assert_eq!(settings.release.attempts, 5);
		assert_eq!(settings.release.interval, std::time::Duration::from_millis(250));
	}

	#[test]
	fn requester_defaults_to_firelink() {
		let settings = lifecycle_settings(&ReservationConfig {
			requester: None,
			..Default::default()
		});
		assert_eq!(settings.requester, "firelink");
	}

	#[tokio::test]
	async fn metrics_backend_selection() {
		let cluster: Arc<dyn K8sClient> = Arc::new(MockK8sClient::new());

		let source = metrics_source(&MetricsConfig::default(), Arc::clone(&cluster)).unwrap();
		assert_eq!(source.name(), "metrics_server");

		let prometheus = MetricsConfig {
			backend: MetricsBackend::Prometheus,
			prometheus_url: Some("https://prometheus.example.com".into()),
			prometheus_token: Some(SecretString::new("token")),
			..Default::default()
		};
		let source = metrics_source(&prometheus, Arc::clone(&cluster)).unwrap();
		assert_eq!(source.name(), "prometheus");

		let missing_url = MetricsConfig {
			backend: MetricsBackend::Prometheus,
			prometheus_url: None,
			..Default::default()
		};
		assert!(metrics_source(&missing_url, cluster).is_err());
	}
}
