// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DescriptionError {
	#[error("malformed login for '{key}': expected 'user | password'")]
	MalformedLogin { key: String },

	#[error("malformed deployment counts: {line}")]
	MalformedCounts { line: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
	pub username: String,
	pub password: String,
}

/// A route plus the login used on it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointInfo {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub route: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub login: Option<Credentials>,
}

impl EndpointInfo {
	fn is_empty(&self) -> bool {
		self.route.is_none() && self.login.is_none()
	}
}

/// Structured form of `bonfire namespace describe` output.
///
/// Lines that are not recognised keep their `key: value` form in
/// `fields`, keyed by the lowercased, underscore-joined label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceDescription {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub keycloak_admin: Option<EndpointInfo>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub gateway: Option<EndpointInfo>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub clowdapps_deployed: Option<u32>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub frontends_deployed: Option<u32>,
	#[serde(flatten)]
	pub fields: BTreeMap<String, String>,
}

/// Parse describe output. Malformed login or count lines are skipped so
/// the rest of the description survives.
pub fn parse_description(text: &str) -> NamespaceDescription {
	let mut description = NamespaceDescription::default();
	let mut keycloak = EndpointInfo::default();
	let mut gateway = EndpointInfo::default();

	for line in text.trim().lines() {
		if let Some((key, value)) = line.split_once(':') {
			let key = key.trim().to_lowercase().replace(' ', "_");
			let value = value.trim();

			if key.contains("keycloak_admin_route") {
				keycloak.route = Some(value.to_string());
			} else if key.contains("keycloak_admin_login") {
				keycloak.login = skip_malformed(parse_login(&key, value));
			} else if key.contains("gateway_route") {
				gateway.route = Some(value.to_string());
			} else if key.contains("default_user_login") {
				gateway.login = skip_malformed(parse_login(&key, value));
			} else {
				description.fields.insert(key, value.to_string());
			}
		} else if line.contains("deployed") {
			if let Some((clowdapps, frontends)) = skip_malformed(parse_counts(line)) {
				description.clowdapps_deployed = Some(clowdapps);
				description.frontends_deployed = Some(frontends);
			}
		}
	}

	if !keycloak.is_empty() {
		description.keycloak_admin = Some(keycloak);
	}
	if !gateway.is_empty() {
		description.gateway = Some(gateway);
	}

	// Structured entries win over raw lines of the same name.
	let lifted = [
		("keycloak_admin", description.keycloak_admin.is_some()),
		("gateway", description.gateway.is_some()),
		("clowdapps_deployed", description.clowdapps_deployed.is_some()),
		("frontends_deployed", description.frontends_deployed.is_some()),
	];
	for (key, present) in lifted {
		if present {
			description.fields.remove(key);
		}
	}
	description
}

fn skip_malformed<T>(parsed: Result<T, DescriptionError>) -> Option<T> {
	parsed
		.map_err(|err| warn!(error = %err, "Skipping malformed description line"))
		.ok()
}

fn parse_login(key: &str, value: &str) -> Result<Credentials, DescriptionError> {
	let (username, password) = value
		.split_once('|')
		.ok_or_else(|| DescriptionError::MalformedLogin {
			key: key.to_string(),
		})?;
	Ok(Credentials {
		username: username.trim().to_string(),
		password: password.trim().to_string(),
	})
}

// "<N> clowdapps, <M> frontends deployed"
fn parse_counts(line: &str) -> Result<(u32, u32), DescriptionError> {
	let malformed = || DescriptionError::MalformedCounts {
		line: line.trim().to_string(),
	};
	let (clowdapps, frontends) = line.split_once(',').ok_or_else(malformed)?;
	let leading = |part: &str| {
		part.split_whitespace()
			.next()
			.and_then(|n| n.parse::<u32>().ok())
	};
	Ok((
		leading(clowdapps).ok_or_else(malformed)?,
		leading(frontends).ok_or_else(malformed)?,
	))
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn keycloak_block() {
		let parsed = parse_description(
			"Keycloak Admin Route: https://x\nKeycloak Admin Login: admin | pw123\n",
		);
		assert_eq!(
			parsed.keycloak_admin,
			Some(EndpointInfo {
				route: Some("https://x".into()),
				login: Some(Credentials {
					username: "admin".into(),
					password: "pw123".into(),
				}),
			})
		);
		assert!(parsed.gateway.is_none());
	}

	#[test]
	fn deployed_counts() {
		let parsed = parse_description("3 clowdapps, 1 frontends deployed");
		assert_eq!(parsed.clowdapps_deployed, Some(3));
		assert_eq!(parsed.frontends_deployed, Some(1));
	}

	#[test]
	fn full_block_serializes_without_empty_sections() {
		let text = "\
Current project: ephemeral-abc
Gateway route: https://gw.example.com
Default user login: jdoe | redhat
2 clowdapps, 0 frontends deployed
";
		let parsed = parse_description(text);
		let json = serde_json::to_value(&parsed).unwrap();
		assert_eq!(json["current_project"], "ephemeral-abc");
		assert_eq!(json["gateway"]["route"], "https://gw.example.com");
		assert_eq!(json["gateway"]["login"]["username"], "jdoe");
		assert_eq!(json["clowdapps_deployed"], 2);
		assert!(json.get("keycloak_admin").is_none());
	}

	#[test]
	fn values_may_contain_colons() {
		let parsed = parse_description("Frontend route: https://example.com:8443/app");
		assert_eq!(parsed.fields["frontend_route"], "https://example.com:8443/app");
	}

	#[test]
	fn malformed_lines_are_skipped() {
		let text = "\
Keycloak Admin Route: https://kc
Keycloak Admin Login: admin
Gateway route: https://gw
nothing deployed
Current project: ephemeral-abc
";
		let parsed = parse_description(text);
		let keycloak = parsed.keycloak_admin.unwrap();
		assert_eq!(keycloak.route.as_deref(), Some("https://kc"));
		assert!(keycloak.login.is_none());
		assert_eq!(parsed.gateway.unwrap().route.as_deref(), Some("https://gw"));
		assert!(parsed.clowdapps_deployed.is_none());
		assert_eq!(parsed.fields["current_project"], "ephemeral-abc");
	}

	#[test]
	fn helpers_report_malformed_input() {
		assert!(matches!(
			parse_login("keycloak_admin_login", "admin"),
			Err(DescriptionError::MalformedLogin { .. })
		));
		assert!(matches!(
			parse_counts("nothing deployed"),
			Err(DescriptionError::MalformedCounts { .. })
		));
	}

	#[test]
	fn raw_key_does_not_shadow_structured_block() {
		let text = "Gateway: legacy\nGateway route: https://gw\nDefault user login: jdoe | redhat\n";
		let parsed = parse_description(text);
		assert!(!parsed.fields.contains_key("gateway"));
		let json = serde_json::to_value(&parsed).unwrap();
		assert_eq!(json["gateway"]["route"], "https://gw");

		let raw_only = parse_description("Gateway: legacy");
		assert_eq!(raw_only.fields["gateway"], "legacy");
		assert!(raw_only.gateway.is_none());
	}

	proptest! {
		#[test]
		fn counts_round_trip(c in 0u32..1000, f in 0u32..1000) {
			let parsed = parse_description(&format!("{c} clowdapps, {f} frontends deployed"));
			prop_assert_eq!(parsed.clowdapps_deployed, Some(c));
			prop_assert_eq!(parsed.frontends_deployed, Some(f));
		}

		#[test]
		fn never_panics(input in "\\PC{0,200}") {
			let _ = parse_description(&input);
		}
	}
}
