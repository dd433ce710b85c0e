// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use firelink_bonfire::{AppsListArgs, ProcessArgs};
use firelink_k8s::AppliedObject;
use serde_json::{json, Value};

use crate::error::{DeployError, DeployResult};
use crate::templates::{config_items, TemplateGateway};

/// Scripted [`TemplateGateway`] that records what it was asked to do.
pub struct MockTemplates {
	apps: Mutex<BTreeMap<String, Vec<String>>>,
	config: Mutex<Value>,
	process_error: Mutex<Option<DeployError>>,
	apply_error: Mutex<Option<DeployError>>,
	wait_error: Mutex<Option<DeployError>>,
	process_delay: Mutex<Duration>,
	processed: Mutex<Vec<ProcessArgs>>,
	applied: Mutex<Vec<(String, Value)>>,
	secret_dirs: Mutex<Vec<String>>,
	waits: Mutex<Vec<(String, Duration)>>,
}

impl Default for MockTemplates {
	fn default() -> Self {
		Self {
			apps: Mutex::new(BTreeMap::new()),
			config: Mutex::new(json!({
				"kind": "List",
				"items": [{"kind": "ClowdApp", "metadata": {"name": "app"}}],
			})),
			process_error: Mutex::new(None),
			apply_error: Mutex::new(None),
			wait_error: Mutex::new(None),
			process_delay: Mutex::new(Duration::ZERO),
			processed: Mutex::new(Vec::new()),
			applied: Mutex::new(Vec::new()),
			secret_dirs: Mutex::new(Vec::new()),
			waits: Mutex::new(Vec::new()),
		}
	}
}

impl MockTemplates {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn set_apps(&self, apps: BTreeMap<String, Vec<String>>) {
		*self.apps.lock().unwrap() = apps;
	}

	/// What `process` returns.
	pub fn set_config(&self, config: Value) {
		*self.config.lock().unwrap() = config;
	}

	pub fn fail_process(&self, err: DeployError) {
		*self.process_error.lock().unwrap() = Some(err);
	}

	pub fn fail_apply(&self, err: DeployError) {
		*self.apply_error.lock().unwrap() = Some(err);
	}

	pub fn fail_wait(&self, err: DeployError) {
		*self.wait_error.lock().unwrap() = Some(err);
	}

	/// Make `process` sleep before answering.
	pub fn delay_process(&self, delay: Duration) {
		*self.process_delay.lock().unwrap() = delay;
	}

	pub fn processed(&self) -> Vec<ProcessArgs> {
		self.processed.lock().unwrap().clone()
	}

	pub fn applied(&self) -> Vec<(String, Value)> {
		self.applied.lock().unwrap().clone()
	}

	pub fn secret_dirs(&self) -> Vec<String> {
		self.secret_dirs.lock().unwrap().clone()
	}

	pub fn waits(&self) -> Vec<(String, Duration)> {
		self.waits.lock().unwrap().clone()
	}
}

#[async_trait]
impl TemplateGateway for MockTemplates {
	async fn list_apps(&self, _args: &AppsListArgs) -> DeployResult<BTreeMap<String, Vec<String>>> {
		Ok(self.apps.lock().unwrap().clone())
	}

	async fn process(&self, args: &ProcessArgs) -> DeployResult<Value> {
		self.processed.lock().unwrap().push(args.clone());
		let delay = *self.process_delay.lock().unwrap();
		if !delay.is_zero() {
			tokio::time::sleep(delay).await;
		}
		if let Some(err) = self.process_error.lock().unwrap().clone() {
			return Err(err);
		}
		Ok(self.config.lock().unwrap().clone())
	}

	async fn apply_config(
		&self,
		namespace: &str,
		config: &Value,
	) -> DeployResult<Vec<AppliedObject>> {
		if let Some(err) = self.apply_error.lock().unwrap().clone() {
			return Err(err);
		}
		self.applied
			.lock()
			.unwrap()
			.push((namespace.to_string(), config.clone()));
		Ok(config_items(config)
			.iter()
			.map(|item| AppliedObject {
				kind: item["kind"].as_str().unwrap_or_default().to_string(),
				name: item
					.pointer("/metadata/name")
					.and_then(Value::as_str)
					.unwrap_or_default()
					.to_string(),
			})
			.collect())
	}

	async fn import_secrets(&self, _namespace: &str, dir: &Path) -> DeployResult<usize> {
		self.secret_dirs
			.lock()
			.unwrap()
			.push(dir.display().to_string());
		Ok(0)
	}

	async fn wait_on_resources(&self, namespace: &str, timeout: Duration) -> DeployResult<()> {
		self.waits
			.lock()
			.unwrap()
			.push((namespace.to_string(), timeout));
		match self.wait_error.lock().unwrap().clone() {
			Some(err) => Err(err),
			None => Ok(()),
		}
	}
}
