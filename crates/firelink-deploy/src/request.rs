// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::collections::BTreeMap;

use firelink_bonfire::ProcessArgs;
use firelink_reservation::{LifecycleSettings, NamespaceTarget, ReservationParams};
use serde::{Deserialize, Deserializer};

/// Environment names used when a request leaves them unset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentDefaults {
	pub source: String,
	pub target_env: String,
	pub ref_env: String,
	pub fallback_ref_env: String,
}

impl Default for EnvironmentDefaults {
	fn default() -> Self {
		Self {
			source: "appsre".to_string(),
			target_env: "insights-ephemeral".to_string(),
			ref_env: "insights-stage".to_string(),
			fallback_ref_env: "insights-stage".to_string(),
		}
	}
}

/// How one component is treated by a removal selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
	/// Always apply the removal.
	ForceInclude,
	/// Never apply the removal.
	ForceExclude,
	/// Leave it to the template tool.
	Default,
}

/// Per-component tri-state for one removal knob.
///
/// Built from a "do X" list and a "no X" list; a component named in both
/// ends up [`Selection::ForceExclude`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentSelection(BTreeMap<String, Selection>);

impl ComponentSelection {
	pub fn from_lists(include: &[String], exclude: &[String]) -> Self {
		let mut map = BTreeMap::new();
		for name in include.iter().filter(|n| !n.is_empty()) {
			map.insert(name.clone(), Selection::ForceInclude);
		}
		for name in exclude.iter().filter(|n| !n.is_empty()) {
			map.insert(name.clone(), Selection::ForceExclude);
		}
		Self(map)
	}

	pub fn get(&self, component: &str) -> Selection {
		self.0.get(component).copied().unwrap_or(Selection::Default)
	}

	pub fn included(&self) -> Vec<String> {
		self.with(Selection::ForceInclude)
	}

	pub fn excluded(&self) -> Vec<String> {
		self.with(Selection::ForceExclude)
	}

	fn with(&self, wanted: Selection) -> Vec<String> {
		self.0
			.iter()
			.filter(|(_, s)| **s == wanted)
			.map(|(name, _)| name.clone())
			.collect()
	}
}

/// Everything a client can ask of a deployment.
///
/// Field names follow the wire format; empty strings count as unset.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DeploymentRequest {
	pub app_names: Vec<String>,
	#[serde(deserialize_with = "non_empty")]
	pub source: Option<String>,
	pub get_dependencies: bool,
	pub optional_deps_method: String,
	pub local_config_method: String,
	#[serde(deserialize_with = "non_empty")]
	pub local_config_path: Option<String>,
	pub set_image_tag: BTreeMap<String, String>,
	pub set_template_ref: BTreeMap<String, String>,
	pub set_parameter: BTreeMap<String, BTreeMap<String, String>>,
	pub preferred_params: BTreeMap<String, String>,
	#[serde(deserialize_with = "non_empty")]
	pub ref_env: Option<String>,
	#[serde(deserialize_with = "non_empty")]
	pub fallback_ref_env: Option<String>,
	#[serde(deserialize_with = "non_empty")]
	pub target_env: Option<String>,
	#[serde(deserialize_with = "non_empty")]
	pub clowd_env: Option<String>,
	pub remove_resources: Vec<String>,
	pub no_remove_resources: Vec<String>,
	pub remove_dependencies: Vec<String>,
	pub no_remove_dependencies: Vec<String>,
	pub single_replicas: bool,
	pub component_filter: Vec<String>,
	pub frontends: bool,

	/// Deploy into this namespace instead of reserving one.
	#[serde(deserialize_with = "non_empty")]
	pub namespace: Option<String>,
	#[serde(deserialize_with = "non_empty")]
	pub name: Option<String>,
	#[serde(deserialize_with = "non_empty")]
	pub requester: Option<String>,
	#[serde(deserialize_with = "non_empty")]
	pub duration: Option<String>,
	#[serde(deserialize_with = "non_empty")]
	pub pool: Option<String>,
	pub timeout: Option<u64>,
	pub local: Option<bool>,

	pub no_release_on_fail: bool,
	pub import_secrets: bool,
	#[serde(deserialize_with = "non_empty")]
	pub secrets_dir: Option<String>,
	pub wait_for_resources: bool,
}

impl Default for DeploymentRequest {
	fn default() -> Self {
		Self {
			app_names: Vec::new(),
			source: None,
			get_dependencies: true,
			optional_deps_method: "hybrid".to_string(),
			local_config_method: "merge".to_string(),
			local_config_path: None,
			set_image_tag: BTreeMap::new(),
			set_template_ref: BTreeMap::new(),
			set_parameter: BTreeMap::new(),
			preferred_params: BTreeMap::new(),
			ref_env: None,
			fallback_ref_env: None,
			target_env: None,
			clowd_env: None,
			remove_resources: Vec::new(),
			no_remove_resources: Vec::new(),
			remove_dependencies: Vec::new(),
			no_remove_dependencies: Vec::new(),
			single_replicas: true,
			component_filter: Vec::new(),
			frontends: false,
			namespace: None,
			name: None,
			requester: None,
			duration: None,
			pool: None,
			timeout: None,
			local: None,
			no_release_on_fail: false,
			import_secrets: false,
			secrets_dir: None,
			wait_for_resources: false,
		}
	}
}

fn non_empty<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
	D: Deserializer<'de>,
{
	let value: Option<String> = Option::deserialize(deserializer)?;
	Ok(value.filter(|v| !v.trim().is_empty()))
}

impl DeploymentRequest {
	pub fn resource_selection(&self) -> ComponentSelection {
		ComponentSelection::from_lists(&self.remove_resources, &self.no_remove_resources)
	}

	pub fn dependency_selection(&self) -> ComponentSelection {
		ComponentSelection::from_lists(&self.remove_dependencies, &self.no_remove_dependencies)
	}

	pub fn requester(&self, settings: &LifecycleSettings) -> String {
		self.requester
			.clone()
			.unwrap_or_else(|| settings.requester.clone())
	}

	pub fn local(&self, settings: &LifecycleSettings) -> bool {
		self.local.unwrap_or(settings.local)
	}

	pub fn timeout_secs(&self, settings: &LifecycleSettings) -> u64 {
		self.timeout.unwrap_or(settings.timeout_secs)
	}

	/// Explicit namespace if given, otherwise a forced reservation.
	pub fn namespace_target(&self, settings: &LifecycleSettings) -> NamespaceTarget {
		let requester = self.requester(settings);
		match &self.namespace {
			Some(name) => NamespaceTarget::Existing {
				name: name.clone(),
				requester,
			},
			None => NamespaceTarget::Reserve(ReservationParams {
				name: self.name.clone(),
				requester,
				duration: self
					.duration
					.clone()
					.unwrap_or_else(|| settings.duration.clone()),
				pool: self.pool.clone().unwrap_or_else(|| settings.pool.clone()),
				timeout_secs: self.timeout_secs(settings),
				local: self.local(settings),
				force: true,
			}),
		}
	}

	pub fn process_args(
		&self,
		namespace: &str,
		clowd_env: &str,
		defaults: &EnvironmentDefaults,
	) -> ProcessArgs {
		let resources = self.resource_selection();
		let dependencies = self.dependency_selection();
		ProcessArgs {
			app_names: self.app_names.clone(),
			source: self
				.source
				.clone()
				.unwrap_or_else(|| defaults.source.clone()),
			namespace: namespace.to_string(),
			target_env: self
				.target_env
				.clone()
				.unwrap_or_else(|| defaults.target_env.clone()),
			clowd_env: Some(clowd_env.to_string()),
			ref_env: Some(self.ref_env.clone().unwrap_or_else(|| defaults.ref_env.clone())),
			fallback_ref_env: Some(
				self.fallback_ref_env
					.clone()
					.unwrap_or_else(|| defaults.fallback_ref_env.clone()),
			),
			get_dependencies: self.get_dependencies,
			optional_deps_method: self.optional_deps_method.clone(),
			local_config_method: self.local_config_method.clone(),
			local_config_path: self.local_config_path.clone(),
			set_image_tag: self.set_image_tag.clone(),
			set_template_ref: self.set_template_ref.clone(),
			set_parameter: self.set_parameter.clone(),
			preferred_params: self.preferred_params.clone(),
			remove_resources: resources.included(),
			no_remove_resources: resources.excluded(),
			remove_dependencies: dependencies.included(),
			no_remove_dependencies: dependencies.excluded(),
			single_replicas: self.single_replicas,
			components: self.component_filter.clone(),
			frontends: self.frontends,
		}
	}
}
