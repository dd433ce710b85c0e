// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::debug;

/// Channel an event is published on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployEventKind {
	Monitor,
	Error,
	End,
}

impl DeployEventKind {
	pub fn as_str(&self) -> &'static str {
		match self {
			DeployEventKind::Monitor => "monitor",
			DeployEventKind::Error => "error",
			DeployEventKind::End => "end",
		}
	}
}

/// One progress notification.
///
/// The kind travels as the SSE event name, so only the payload is
/// serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeployEvent {
	#[serde(skip)]
	pub kind: DeployEventKind,
	pub message: String,
	pub completed: bool,
	pub error: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub namespace: Option<String>,
}

impl DeployEvent {
	pub fn monitor(message: impl Into<String>) -> Self {
		Self {
			kind: DeployEventKind::Monitor,
			message: message.into(),
			completed: false,
			error: false,
			namespace: None,
		}
	}

	/// Progress line that reports a problem without ending the stream.
	pub fn monitor_error(message: impl Into<String>) -> Self {
		Self {
			error: true,
			..Self::monitor(message)
		}
	}

	pub fn error(message: impl Into<String>) -> Self {
		Self {
			kind: DeployEventKind::Error,
			message: message.into(),
			completed: false,
			error: true,
			namespace: None,
		}
	}

	pub fn succeeded(message: impl Into<String>) -> Self {
		Self {
			kind: DeployEventKind::End,
			message: message.into(),
			completed: true,
			error: false,
			namespace: None,
		}
	}

	pub fn failed(message: impl Into<String>) -> Self {
		Self {
			kind: DeployEventKind::End,
			message: message.into(),
			completed: false,
			error: true,
			namespace: None,
		}
	}

	pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
		self.namespace = Some(namespace.into());
		self
	}
}

/// Sending half of a deployment's event stream.
///
/// Sends after the observer went away are dropped so the deployment can
/// still finish its cleanup.
#[derive(Debug, Clone)]
pub struct EventSink {
	tx: mpsc::Sender<DeployEvent>,
}

impl EventSink {
	pub fn new(tx: mpsc::Sender<DeployEvent>) -> Self {
		Self { tx }
	}

	pub async fn emit(&self, event: DeployEvent) {
		if self.tx.send(event).await.is_err() {
			debug!("Deployment observer gone; dropping event");
		}
	}

	/// Resolves once the receiving side has been dropped.
	pub async fn closed(&self) {
		self.tx.closed().await
	}
}
