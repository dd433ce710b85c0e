// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use firelink_reservation::{AcquiredNamespace, NamespaceLifecycle};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{info, instrument, warn};

use crate::error::{DeployError, DeployResult};
use crate::events::{DeployEvent, EventSink};
use crate::request::{DeploymentRequest, EnvironmentDefaults};
use crate::templates::{config_items, TemplateGateway};

const EVENT_BUFFER: usize = 64;

/// A running deployment.
///
/// Dropping the event stream cancels template work, but a namespace
/// reserved for the deployment is still released.
pub struct DeploymentHandle {
	events: mpsc::Receiver<DeployEvent>,
	outcome: JoinHandle<DeployResult<String>>,
}

impl DeploymentHandle {
	/// Ordered progress events. The stream ends after the final event.
	pub fn events(self) -> ReceiverStream<DeployEvent> {
		ReceiverStream::new(self.events)
	}

	pub fn into_parts(self) -> (ReceiverStream<DeployEvent>, JoinHandle<DeployResult<String>>) {
		(ReceiverStream::new(self.events), self.outcome)
	}
}

/// Drives one deployment from namespace acquisition to applied manifests,
/// reporting progress as [`DeployEvent`]s.
pub struct DeploymentOrchestrator {
	lifecycle: Arc<NamespaceLifecycle>,
	templates: Arc<dyn TemplateGateway>,
	defaults: EnvironmentDefaults,
}

impl DeploymentOrchestrator {
	pub fn new(
		lifecycle: Arc<NamespaceLifecycle>,
		templates: Arc<dyn TemplateGateway>,
		defaults: EnvironmentDefaults,
	) -> Self {
		Self {
			lifecycle,
			templates,
			defaults,
		}
	}

	/// Start a deployment in the background.
	pub fn deploy(self: &Arc<Self>, request: DeploymentRequest) -> DeploymentHandle {
		let (tx, rx) = mpsc::channel(EVENT_BUFFER);
		let this = Arc::clone(self);
		let outcome = tokio::spawn(async move { this.run(request, EventSink::new(tx)).await });
		DeploymentHandle {
			events: rx,
			outcome,
		}
	}

	/// Run a deployment to completion, returning the namespace on success.
	#[instrument(skip_all, fields(apps = ?request.app_names))]
	pub async fn run(&self, request: DeploymentRequest, sink: EventSink) -> DeployResult<String> {
		sink.emit(DeployEvent::monitor(format!(
			"Starting deployment for apps: {}",
			request.app_names.join(", ")
		)))
		.await;

		if let Err(err) = self.lifecycle.ensure_ready().await {
			warn!(error = %err, "Reservation subsystem check failed");
			let err = DeployError::SubsystemUnavailable;
			sink.emit(DeployEvent::error(err.to_string())).await;
			return Err(err);
		}

		let target = request.namespace_target(self.lifecycle.settings());
		let acquired = match self.lifecycle.acquire(&target).await {
			Ok(acquired) => acquired,
			Err(err) => {
				warn!(error = %err, "Namespace acquisition failed");
				let err = DeployError::Namespace(err);
				sink.emit(DeployEvent::error(err.to_string())).await;
				return Err(err);
			}
		};
		let namespace = acquired.name.clone();
		info!(
			namespace = %namespace,
			newly_reserved = acquired.newly_reserved,
			"Namespace acquired"
		);
		sink.emit(
			DeployEvent::monitor(format!("Using namespace {namespace}")).with_namespace(&namespace),
		)
		.await;

		// A finished deployment beats a disconnect observed in the same poll.
		let result = tokio::select! {
			biased;
			result = self.provision(&request, &namespace, &sink) => result,
			_ = sink.closed() => {
				info!(namespace = %namespace, "Observer disconnected, abandoning deployment");
				Err(DeployError::Cancelled)
			}
		};

		match result {
			Ok(()) => {
				info!(namespace = %namespace, "Deployment applied");
				sink.emit(
					DeployEvent::succeeded(format!(
						"Deployed to {namespace}. Resources may take additional time to become ready."
					))
					.with_namespace(&namespace),
				)
				.await;
				Ok(namespace)
			}
			Err(err) => {
				warn!(
					namespace = %namespace,
					kind = err.kind(),
					error = %err,
					"Deployment failed"
				);
				self.compensate(&request, &acquired, &sink).await;
				sink.emit(
					DeployEvent::failed(format!("Deployment Failed: {err}"))
						.with_namespace(&namespace),
				)
				.await;
				Err(err)
			}
		}
	}

	async fn provision(
		&self,
		request: &DeploymentRequest,
		namespace: &str,
		sink: &EventSink,
	) -> DeployResult<()> {
		if request.import_secrets {
			let dir = request.secrets_dir.as_deref().ok_or_else(|| {
				DeployError::Fatal("secrets_dir is required to import secrets".to_string())
			})?;
			sink.emit(DeployEvent::monitor(format!("Importing secrets from {dir}")))
				.await;
			self.templates
				.import_secrets(namespace, Path::new(dir))
				.await?;
		}

		let clowd_env = match &request.clowd_env {
			Some(env) => env.clone(),
			None => self
				.lifecycle
				.find_environment(namespace)
				.await?
				.ok_or_else(|| DeployError::EnvironmentNotFound {
					namespace: namespace.to_string(),
				})?,
		};

		sink.emit(DeployEvent::monitor("Processing app templates...")).await;
		let args = request.process_args(namespace, &clowd_env, &self.defaults);
		let config = self.templates.process(&args).await?;
		if config_items(&config).is_empty() {
			let message = "No configurations found to apply!";
			sink.emit(DeployEvent::monitor_error(message)).await;
			return Err(DeployError::Fatal(message.to_string()));
		}

		sink.emit(DeployEvent::monitor("Applying app configs...")).await;
		let applied = self.templates.apply_config(namespace, &config).await?;
		sink.emit(DeployEvent::monitor(format!("Applied {} app configs", applied.len())))
			.await;

		if request.wait_for_resources {
			let timeout = request.timeout_secs(self.lifecycle.settings());
			sink.emit(DeployEvent::monitor(format!(
				"Waiting on resources for max of {timeout} seconds..."
			)))
			.await;
			self.templates
				.wait_on_resources(namespace, Duration::from_secs(timeout))
				.await?;
		}
		Ok(())
	}

	/// Release a namespace this deployment reserved, unless told to keep it.
	async fn compensate(
		&self,
		request: &DeploymentRequest,
		acquired: &AcquiredNamespace,
		sink: &EventSink,
	) {
		if !acquired.newly_reserved || request.no_release_on_fail {
			return;
		}
		let namespace = &acquired.name;
		sink.emit(DeployEvent::monitor(format!("Releasing namespace {namespace}")))
			.await;
		let local = request.local(self.lifecycle.settings());
		match self.lifecycle.release_now(namespace, local).await {
			Ok(()) => info!(namespace = %namespace, "Released namespace after failed deployment"),
			Err(err) => {
				warn!(namespace = %namespace, error = %err, "Compensating release failed");
				sink.emit(DeployEvent::error(format!(
					"Failed to release namespace {namespace}: {err}"
				)))
				.await;
			}
		}
	}
}
