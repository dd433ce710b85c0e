// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Deployments into ephemeral namespaces.
//!
//! A deployment acquires a namespace, renders app templates, applies them
//! and optionally waits for readiness. Progress is reported as an ordered
//! stream of [`DeployEvent`]s ending in exactly one final event. If a step
//! after acquisition fails, a namespace reserved by the deployment is
//! released before the final event is sent.

mod catalog;
mod error;
mod events;
#[cfg(any(test, feature = "testing"))]
mod mock;
mod orchestrator;
mod request;
mod templates;

pub use catalog::{friendly_name, AppCatalog, AppComponent, AppInfo, AppsQuery};
pub use error::{DeployError, DeployResult};
pub use events::{DeployEvent, DeployEventKind, EventSink};
#[cfg(any(test, feature = "testing"))]
pub use mock::MockTemplates;
pub use orchestrator::{DeploymentHandle, DeploymentOrchestrator};
pub use request::{ComponentSelection, DeploymentRequest, EnvironmentDefaults, Selection};
pub use templates::{config_items, read_secrets, BonfireTemplates, TemplateGateway};
