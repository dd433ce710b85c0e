// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::collections::BTreeMap;

/// Arguments for `bonfire namespace reserve`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReserveArgs {
	pub name: Option<String>,
	pub requester: String,
	pub duration: String,
	pub pool: String,
	pub timeout_secs: u64,
	pub local: bool,
	/// Skip bonfire's own "requester already has a reservation" check.
	pub force: bool,
}

impl ReserveArgs {
	pub fn to_args(&self) -> Vec<String> {
		let mut args = vec![
			"namespace".to_string(),
			"reserve".to_string(),
			"--requester".to_string(),
			self.requester.clone(),
			"--duration".to_string(),
			self.duration.clone(),
			"--pool".to_string(),
			self.pool.clone(),
			"--timeout".to_string(),
			self.timeout_secs.to_string(),
			"--local".to_string(),
			self.local.to_string(),
		];
		if let Some(name) = &self.name {
			args.push("--name".to_string());
			args.push(name.clone());
		}
		if self.force {
			args.push("--force".to_string());
		}
		args
	}
}

/// Arguments for `bonfire namespace release`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseArgs {
	pub namespace: String,
	pub local: bool,
}

impl ReleaseArgs {
	pub fn to_args(&self) -> Vec<String> {
		vec![
			"namespace".to_string(),
			"release".to_string(),
			self.namespace.clone(),
			"--force".to_string(),
			"--local".to_string(),
			self.local.to_string(),
		]
	}
}

/// Arguments for `bonfire apps list`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppsListArgs {
	pub source: String,
	pub target_env: String,
	pub ref_env: String,
	pub fallback_ref_env: String,
}

impl AppsListArgs {
	pub fn to_args(&self) -> Vec<String> {
		vec![
			"apps".to_string(),
			"list".to_string(),
			"--source".to_string(),
			self.source.clone(),
			"--target-env".to_string(),
			self.target_env.clone(),
			"--ref-env".to_string(),
			self.ref_env.clone(),
			"--fallback-ref-env".to_string(),
			self.fallback_ref_env.clone(),
			"--list-components".to_string(),
		]
	}
}

/// Arguments for `bonfire process`, which renders app templates into a
/// single `List` object without touching the cluster.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessArgs {
	pub app_names: Vec<String>,
	pub source: String,
	pub namespace: String,
	pub target_env: String,
	pub clowd_env: Option<String>,
	pub ref_env: Option<String>,
	pub fallback_ref_env: Option<String>,
	pub get_dependencies: bool,
	pub optional_deps_method: String,
	pub local_config_method: String,
	pub local_config_path: Option<String>,
	pub set_image_tag: BTreeMap<String, String>,
	pub set_template_ref: BTreeMap<String, String>,
	/// component -> parameter -> value
	pub set_parameter: BTreeMap<String, BTreeMap<String, String>>,
	pub preferred_params: BTreeMap<String, String>,
	pub remove_resources: Vec<String>,
	pub no_remove_resources: Vec<String>,
	pub remove_dependencies: Vec<String>,
	pub no_remove_dependencies: Vec<String>,
	pub single_replicas: bool,
	pub components: Vec<String>,
	pub frontends: bool,
}

impl ProcessArgs {
	pub fn to_args(&self) -> Vec<String> {
		let mut args = vec!["process".to_string()];
		args.extend(self.app_names.iter().cloned());

		push_opt(&mut args, "--source", Some(&self.source));
		push_opt(&mut args, "--namespace", Some(&self.namespace));
		push_opt(&mut args, "--target-env", Some(&self.target_env));
		push_opt(&mut args, "--clowd-env", self.clowd_env.as_ref());
		push_opt(&mut args, "--ref-env", self.ref_env.as_ref());
		push_opt(&mut args, "--fallback-ref-env", self.fallback_ref_env.as_ref());

		args.push(if self.get_dependencies {
			"--get-dependencies".to_string()
		} else {
			"--no-get-dependencies".to_string()
		});
		push_opt(
			&mut args,
			"--optional-deps-method",
			Some(&self.optional_deps_method),
		);
		push_opt(
			&mut args,
			"--local-config-method",
			Some(&self.local_config_method),
		);
		push_opt(&mut args, "--local-config-path", self.local_config_path.as_ref());

		for (image, tag) in &self.set_image_tag {
			args.push("--set-image-tag".to_string());
			args.push(format!("{image}={tag}"));
		}
		for (component, git_ref) in &self.set_template_ref {
			args.push("--set-template-ref".to_string());
			args.push(format!("{component}={git_ref}"));
		}
		for (component, params) in &self.set_parameter {
			for (param, value) in params {
				args.push("--set-parameter".to_string());
				args.push(format!("{component}/{param}={value}"));
			}
		}
		for (key, value) in &self.preferred_params {
			args.push("--preferred-params".to_string());
			args.push(format!("{key}={value}"));
		}

		push_each(&mut args, "--remove-resources", &self.remove_resources);
		push_each(&mut args, "--no-remove-resources", &self.no_remove_resources);
		push_each(&mut args, "--remove-dependencies", &self.remove_dependencies);
		push_each(
			&mut args,
			"--no-remove-dependencies",
			&self.no_remove_dependencies,
		);

		args.push(if self.single_replicas {
			"--single-replicas".to_string()
		} else {
			"--no-single-replicas".to_string()
		});
		push_each(&mut args, "--component", &self.components);
		args.push("--frontends".to_string());
		args.push(self.frontends.to_string());

		args
	}
}

fn push_opt(args: &mut Vec<String>, flag: &str, value: Option<&String>) {
	if let Some(value) = value.filter(|v| !v.is_empty()) {
		args.push(flag.to_string());
		args.push(value.clone());
	}
}

fn push_each(args: &mut Vec<String>, flag: &str, values: &[String]) {
	for value in values {
		args.push(flag.to_string());
		args.push(value.clone());
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn position(args: &[String], flag: &str) -> Option<usize> {
		args.iter().position(|a| a == flag)
	}

	#[test]
	fn reserve_args_without_name() {
		let args = ReserveArgs {
			name: None,
			requester: "alice".into(),
			duration: "1h".into(),
			pool: "default".into(),
			timeout_secs: 600,
			local: true,
			force: false,
		}
		.to_args();
		assert_eq!(
			args,
			vec![
				"namespace",
				"reserve",
				"--requester",
				"alice",
				"--duration",
				"1h",
				"--pool",
				"default",
				"--timeout",
				"600",
				"--local",
				"true"
			]
		);
	}

	#[test]
	fn reserve_args_with_name_and_force() {
		let args = ReserveArgs {
			name: Some("pr-1234".into()),
			requester: "ci".into(),
			duration: "2h".into(),
			pool: "minimal".into(),
			timeout_secs: 60,
			local: false,
			force: true,
		}
		.to_args();
		let idx = position(&args, "--name").unwrap();
		assert_eq!(args[idx + 1], "pr-1234");
		assert_eq!(args.last().unwrap(), "--force");
	}

	#[test]
	fn release_args_force_confirmation() {
		let args = ReleaseArgs {
			namespace: "ephemeral-abc".into(),
			local: true,
		}
		.to_args();
		assert_eq!(
			args,
			vec![
				"namespace",
				"release",
				"ephemeral-abc",
				"--force",
				"--local",
				"true"
			]
		);
	}

	#[test]
	fn process_args_apps_come_first() {
		let args = ProcessArgs {
			app_names: vec!["rbac".into(), "host-inventory".into()],
			source: "appsre".into(),
			namespace: "ephemeral-abc".into(),
			target_env: "insights-ephemeral".into(),
			optional_deps_method: "hybrid".into(),
			local_config_method: "merge".into(),
			..Default::default()
		}
		.to_args();
		assert_eq!(&args[..3], &["process", "rbac", "host-inventory"]);
		assert!(args.contains(&"--no-get-dependencies".to_string()));
		assert!(args.contains(&"--no-single-replicas".to_string()));
		assert!(position(&args, "--clowd-env").is_none());
		assert!(position(&args, "--local-config-path").is_none());
	}

	#[test]
	fn process_args_overrides() {
		let mut params = BTreeMap::new();
		params.insert("REPLICAS".to_string(), "2".to_string());
		let mut set_parameter = BTreeMap::new();
		set_parameter.insert("rbac".to_string(), params);
		let mut set_image_tag = BTreeMap::new();
		set_image_tag.insert("quay.io/cloudservices/rbac".to_string(), "abc123".to_string());

		let args = ProcessArgs {
			app_names: vec!["rbac".into()],
			source: "appsre".into(),
			namespace: "ephemeral-abc".into(),
			target_env: "insights-ephemeral".into(),
			clowd_env: Some("env-ephemeral-abc".into()),
			get_dependencies: true,
			optional_deps_method: "hybrid".into(),
			local_config_method: "merge".into(),
			set_image_tag,
			set_parameter,
			remove_resources: vec!["all".into()],
			no_remove_resources: vec!["rbac".into()],
			single_replicas: true,
			frontends: true,
			..Default::default()
		}
		.to_args();

		let idx = position(&args, "--set-parameter").unwrap();
		assert_eq!(args[idx + 1], "rbac/REPLICAS=2");
		let idx = position(&args, "--set-image-tag").unwrap();
		assert_eq!(args[idx + 1], "quay.io/cloudservices/rbac=abc123");
		let idx = position(&args, "--remove-resources").unwrap();
		assert_eq!(args[idx + 1], "all");
		let idx = position(&args, "--no-remove-resources").unwrap();
		assert_eq!(args[idx + 1], "rbac");
		let idx = position(&args, "--clowd-env").unwrap();
		assert_eq!(args[idx + 1], "env-ephemeral-abc");
		assert!(args.contains(&"--get-dependencies".to_string()));
		assert!(args.contains(&"--single-replicas".to_string()));
		assert_eq!(&args[args.len() - 2..], &["--frontends", "true"]);
	}

	#[test]
	fn apps_list_args() {
		let args = AppsListArgs {
			source: "appsre".into(),
			target_env: "insights-ephemeral".into(),
			ref_env: "insights-stage".into(),
			fallback_ref_env: "insights-stage".into(),
		}
		.to_args();
		assert_eq!(&args[..2], &["apps", "list"]);
		assert_eq!(args.last().unwrap(), "--list-components");
	}
}
