// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::sync::Arc;

use firelink_bonfire::AppsListArgs;
use serde::{Deserialize, Serialize};

use crate::error::DeployResult;
use crate::request::EnvironmentDefaults;
use crate::templates::TemplateGateway;

/// A deployable app and its components.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppInfo {
	pub name: String,
	pub friendly_name: String,
	pub components: Vec<AppComponent>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppComponent {
	pub name: String,
}

/// Optional overrides for the environments the app list is resolved against.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppsQuery {
	pub source: Option<String>,
	pub target_env: Option<String>,
	pub ref_env: Option<String>,
	pub fallback_ref_env: Option<String>,
}

/// Display name for an app: `"host-inventory"` becomes `"Host Inventory"`,
/// and short or vowel-less words such as `"rbac"` are upper-cased.
pub fn friendly_name(name: &str) -> String {
	name.split('-')
		.map(|word| {
			let has_vowel = word.chars().any(|c| "aeiouAEIOU".contains(c));
			if word.chars().count() > 4 && has_vowel {
				capitalize(word)
			} else {
				word.to_uppercase()
			}
		})
		.collect::<Vec<_>>()
		.join(" ")
}

fn capitalize(word: &str) -> String {
	let mut chars = word.chars();
	match chars.next() {
		Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
		None => String::new(),
	}
}

pub struct AppCatalog {
	templates: Arc<dyn TemplateGateway>,
	defaults: EnvironmentDefaults,
}

impl AppCatalog {
	pub fn new(templates: Arc<dyn TemplateGateway>, defaults: EnvironmentDefaults) -> Self {
		Self { templates, defaults }
	}

	/// All apps, sorted by name.
	pub async fn list(&self, query: AppsQuery) -> DeployResult<Vec<AppInfo>> {
		let args = AppsListArgs {
			source: query.source.unwrap_or_else(|| self.defaults.source.clone()),
			target_env: query
				.target_env
				.unwrap_or_else(|| self.defaults.target_env.clone()),
			ref_env: query.ref_env.unwrap_or_else(|| self.defaults.ref_env.clone()),
			fallback_ref_env: query
				.fallback_ref_env
				.unwrap_or_else(|| self.defaults.fallback_ref_env.clone()),
		};
		let apps = self.templates.list_apps(&args).await?;
		// BTreeMap iteration is already ordered by name.
		Ok(apps
			.into_iter()
			.map(|(name, components)| AppInfo {
				friendly_name: friendly_name(&name),
				components: components
					.into_iter()
					.map(|name| AppComponent { name })
					.collect(),
				name,
			})
			.collect())
	}
}
