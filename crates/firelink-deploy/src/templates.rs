// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use firelink_bonfire::{AppsListArgs, BonfireCli, ProcessArgs};
use firelink_k8s::{AppliedObject, Deployment, K8sClient};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::error::{DeployError, DeployResult};

/// Template processing and manifest application.
#[async_trait]
pub trait TemplateGateway: Send + Sync {
	/// Deployable apps and their components.
	async fn list_apps(&self, args: &AppsListArgs) -> DeployResult<BTreeMap<String, Vec<String>>>;

	/// Render app templates into a `List` of manifests.
	async fn process(&self, args: &ProcessArgs) -> DeployResult<Value>;

	/// Apply every item of a processed `List` into `namespace`.
	async fn apply_config(
		&self,
		namespace: &str,
		config: &Value,
	) -> DeployResult<Vec<AppliedObject>>;

	/// Apply the secrets found in YAML/JSON files under `dir`.
	async fn import_secrets(&self, namespace: &str, dir: &Path) -> DeployResult<usize>;

	/// Wait until every Deployment in `namespace` reports ready replicas.
	async fn wait_on_resources(&self, namespace: &str, timeout: Duration) -> DeployResult<()>;
}

/// Items of a processed config, or an empty slice if there are none.
pub fn config_items(config: &Value) -> &[Value] {
	config
		.get("items")
		.and_then(Value::as_array)
		.map(Vec::as_slice)
		.unwrap_or_default()
}

/// [`TemplateGateway`] backed by `bonfire process` and the cluster API.
pub struct BonfireTemplates {
	cli: BonfireCli,
	client: Arc<dyn K8sClient>,
	poll_interval: Duration,
}

impl BonfireTemplates {
	pub fn new(cli: BonfireCli, client: Arc<dyn K8sClient>) -> Self {
		Self {
			cli,
			client,
			poll_interval: Duration::from_secs(5),
		}
	}

	pub fn with_poll_interval(mut self, interval: Duration) -> Self {
		self.poll_interval = interval;
		self
	}

	async fn pending_deployments(&self, namespace: &str) -> DeployResult<Vec<String>> {
		let deployments = self.client.list_deployments(namespace).await?;
		Ok(deployments
			.iter()
			.filter(|d| !is_ready(d))
			.map(|d| d.metadata.name.clone().unwrap_or_default())
			.collect())
	}
}

fn is_ready(deployment: &Deployment) -> bool {
	let wanted = deployment
		.spec
		.as_ref()
		.and_then(|s| s.replicas)
		.unwrap_or(1);
	let ready = deployment
		.status
		.as_ref()
		.and_then(|s| s.ready_replicas)
		.unwrap_or(0);
	ready >= wanted
}

#[async_trait]
impl TemplateGateway for BonfireTemplates {
	async fn list_apps(&self, args: &AppsListArgs) -> DeployResult<BTreeMap<String, Vec<String>>> {
		Ok(self.cli.list_apps(args).await?)
	}

	#[instrument(skip(self, args), fields(apps = ?args.app_names, namespace = %args.namespace))]
	async fn process(&self, args: &ProcessArgs) -> DeployResult<Value> {
		Ok(self.cli.process(args).await?)
	}

	#[instrument(skip(self, config))]
	async fn apply_config(
		&self,
		namespace: &str,
		config: &Value,
	) -> DeployResult<Vec<AppliedObject>> {
		let items = config_items(config);
		let mut applied = Vec::with_capacity(items.len());
		for item in items {
			let object = self.client.apply_object(namespace, item).await?;
			debug!(object = %object, "Applied");
			applied.push(object);
		}
		info!(count = applied.len(), "Applied app configs");
		Ok(applied)
	}

	#[instrument(skip(self))]
	async fn import_secrets(&self, namespace: &str, dir: &Path) -> DeployResult<usize> {
		let secrets = read_secrets(dir).await?;
		for secret in &secrets {
			self.client.apply_object(namespace, secret).await?;
		}
		info!(count = secrets.len(), "Imported secrets");
		Ok(secrets.len())
	}

	#[instrument(skip(self))]
	async fn wait_on_resources(&self, namespace: &str, timeout: Duration) -> DeployResult<()> {
		let poll = async {
			loop {
				let pending = self.pending_deployments(namespace).await?;
				if pending.is_empty() {
					return Ok(());
				}
				debug!(pending = ?pending, "Waiting for deployments");
				tokio::time::sleep(self.poll_interval).await;
			}
		};
		match tokio::time::timeout(timeout, poll).await {
			Ok(result) => result,
			Err(_) => Err(DeployError::TimedOut {
				namespace: namespace.to_string(),
				after: timeout,
			}),
		}
	}
}

/// Secret manifests from every `.yaml`, `.yml` or `.json` file in `dir`.
///
/// Files may hold several documents, and `List` documents are flattened.
/// Non-secret objects are skipped.
pub async fn read_secrets(dir: &Path) -> DeployResult<Vec<Value>> {
	let mut entries = tokio::fs::read_dir(dir).await.map_err(|e| {
		DeployError::Fatal(format!("cannot read secrets dir {}: {e}", dir.display()))
	})?;

	let mut paths = Vec::new();
	while let Some(entry) = entries
		.next_entry()
		.await
		.map_err(|e| DeployError::Fatal(e.to_string()))?
	{
		let path = entry.path();
		let wanted = path
			.extension()
			.and_then(|e| e.to_str())
			.is_some_and(|e| matches!(e, "yaml" | "yml" | "json"));
		if wanted {
			paths.push(path);
		}
	}
	paths.sort();

	let mut secrets = Vec::new();
	for path in paths {
		let text = tokio::fs::read_to_string(&path)
			.await
			.map_err(|e| DeployError::Fatal(format!("cannot read {}: {e}", path.display())))?;
		for document in serde_yaml::Deserializer::from_str(&text) {
			let value = Value::deserialize(document).map_err(|e| {
				DeployError::Fatal(format!("invalid manifest in {}: {e}", path.display()))
			})?;
			collect_secrets(value, &mut secrets);
		}
	}
	Ok(secrets)
}

fn collect_secrets(value: Value, out: &mut Vec<Value>) {
	match value.get("kind").and_then(Value::as_str) {
		Some("Secret") => out.push(value),
		Some("List") => {
			if let Value::Object(mut map) = value {
				if let Some(Value::Array(items)) = map.remove("items") {
					for item in items {
						collect_secrets(item, out);
					}
				}
			}
		}
		_ => {}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use firelink_k8s::{MockK8sClient, ObjectMeta};
	use k8s_openapi::api::apps::v1::{DeploymentSpec, DeploymentStatus};
	use serde_json::json;

	fn templates(mock: Arc<MockK8sClient>) -> BonfireTemplates {
		BonfireTemplates::new(
			BonfireCli::new("bonfire-not-installed", "oc-not-installed", Duration::from_secs(1)),
			mock,
		)
		.with_poll_interval(Duration::from_millis(10))
	}

	fn deployment(name: &str, replicas: i32, ready: Option<i32>) -> Deployment {
		Deployment {
			metadata: ObjectMeta {
				name: Some(name.to_string()),
				..Default::default()
			},
			spec: Some(DeploymentSpec {
				replicas: Some(replicas),
				..Default::default()
			}),
			status: Some(DeploymentStatus {
				ready_replicas: ready,
				..Default::default()
			}),
		}
	}

	#[test]
	fn items_of_processed_list() {
		let config = json!({"kind": "List", "items": [{"kind": "ClowdApp"}]});
		assert_eq!(config_items(&config).len(), 1);
		assert!(config_items(&json!({"kind": "List", "items": []})).is_empty());
		assert!(config_items(&json!({"kind": "List"})).is_empty());
	}

	#[test]
	fn readiness_compares_replicas() {
		assert!(is_ready(&deployment("a", 1, Some(1))));
		assert!(is_ready(&deployment("a", 0, None)));
		assert!(!is_ready(&deployment("a", 2, Some(1))));
		assert!(!is_ready(&deployment("a", 1, None)));
	}

	#[tokio::test]
	async fn apply_config_applies_each_item() {
		let mock = Arc::new(MockK8sClient::new());
		let gateway = templates(mock.clone());
		let config = json!({
			"kind": "List",
			"items": [
				{"kind": "ClowdApp", "metadata": {"name": "rbac"}},
				{"kind": "ConfigMap", "metadata": {"name": "rbac-config"}},
			]
		});
		let applied = gateway.apply_config("ephemeral-a", &config).await.unwrap();
		assert_eq!(applied.len(), 2);
		assert_eq!(applied[0].kind, "ClowdApp");
		assert_eq!(mock.applied().len(), 2);
		assert!(mock.applied().iter().all(|(ns, _)| ns == "ephemeral-a"));
	}

	#[tokio::test]
	async fn rejected_item_is_fatal() {
		let gateway = templates(Arc::new(MockK8sClient::new()));
		let config = json!({"items": [{"kind": "ClowdApp"}]});
		let err = gateway.apply_config("ephemeral-a", &config).await.unwrap_err();
		assert_eq!(err.kind(), "fatal");
	}

	#[tokio::test]
	async fn reads_secrets_from_directory() {
		let dir = tempfile::tempdir().unwrap();
		std::fs::write(
			dir.path().join("a.yaml"),
			"kind: Secret\nmetadata:\n  name: one\n---\nkind: ConfigMap\nmetadata:\n  name: skipped\n",
		)
		.unwrap();
		std::fs::write(
			dir.path().join("b.json"),
			r#"{"kind": "List", "items": [{"kind": "Secret", "metadata": {"name": "two"}}]}"#,
		)
		.unwrap();
		std::fs::write(dir.path().join("notes.txt"), "kind: Secret").unwrap();

		let secrets = read_secrets(dir.path()).await.unwrap();
		let names: Vec<_> = secrets
			.iter()
			.map(|s| s.pointer("/metadata/name").unwrap().as_str().unwrap())
			.collect();
		assert_eq!(names, vec!["one", "two"]);
	}

	#[tokio::test]
	async fn missing_secrets_dir_is_fatal() {
		let err = read_secrets(Path::new("/nonexistent/firelink-secrets"))
			.await
			.unwrap_err();
		assert_eq!(err.kind(), "fatal");
	}

	#[tokio::test]
	async fn import_applies_secrets() {
		let dir = tempfile::tempdir().unwrap();
		std::fs::write(
			dir.path().join("s.yml"),
			"kind: Secret\nmetadata:\n  name: creds\n",
		)
		.unwrap();
		let mock = Arc::new(MockK8sClient::new());
		let count = templates(mock.clone())
			.import_secrets("ephemeral-a", dir.path())
			.await
			.unwrap();
		assert_eq!(count, 1);
		assert_eq!(mock.applied()[0].0, "ephemeral-a");
	}

	#[tokio::test]
	async fn wait_returns_when_ready() {
		let mock = Arc::new(MockK8sClient::new());
		mock.set_deployments("ephemeral-a", vec![deployment("api", 1, Some(1))]);
		templates(mock)
			.wait_on_resources("ephemeral-a", Duration::from_secs(1))
			.await
			.unwrap();
	}

	#[tokio::test]
	async fn wait_times_out() {
		let mock = Arc::new(MockK8sClient::new());
		mock.set_deployments("ephemeral-a", vec![deployment("api", 2, Some(1))]);
		let err = templates(mock)
			.wait_on_resources("ephemeral-a", Duration::from_millis(50))
			.await
			.unwrap_err();
		assert!(matches!(err, DeployError::TimedOut { .. }));
	}

	#[tokio::test]
	async fn missing_bonfire_is_fatal() {
		let err = templates(Arc::new(MockK8sClient::new()))
			.process(&ProcessArgs::default())
			.await
			.unwrap_err();
		assert_eq!(err.kind(), "fatal");
	}
}
