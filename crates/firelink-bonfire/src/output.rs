// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::collections::BTreeMap;

/// Extract the namespace name printed by `bonfire namespace reserve`.
///
/// Progress goes to stderr; the namespace is the last non-empty stdout line.
pub fn parse_reserved_namespace(stdout: &str) -> Option<String> {
	stdout
		.lines()
		.map(str::trim)
		.rev()
		.find(|l| !l.is_empty())
		.filter(|l| !l.contains(char::is_whitespace))
		.map(str::to_string)
}

/// Parse `bonfire apps list --list-components` output.
///
/// App names start at column zero; their components follow on indented
/// lines prefixed with a tree marker (`` `-- ``, `|--` or `-`).
pub fn parse_apps_list(stdout: &str) -> BTreeMap<String, Vec<String>> {
	let mut apps: BTreeMap<String, Vec<String>> = BTreeMap::new();
	let mut current: Option<String> = None;

	for line in stdout.lines() {
		if line.trim().is_empty() {
			continue;
		}
		if line.starts_with(char::is_whitespace) {
			let component = line
				.trim()
				.trim_start_matches(['`', '|', '-'])
				.trim();
			if component.is_empty() {
				continue;
			}
			if let Some(app) = &current {
				apps.entry(app.clone())
					.or_default()
					.push(component.to_string());
			}
		} else {
			let app = line.trim().to_string();
			apps.entry(app.clone()).or_default();
			current = Some(app);
		}
	}

	apps
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn reserved_namespace_is_last_line() {
		assert_eq!(
			parse_reserved_namespace("ephemeral-7xkq2m\n"),
			Some("ephemeral-7xkq2m".to_string())
		);
		assert_eq!(
			parse_reserved_namespace("warming up\n\nephemeral-abc\n\n"),
			Some("ephemeral-abc".to_string())
		);
	}

	#[test]
	fn reserved_namespace_rejects_prose() {
		assert_eq!(parse_reserved_namespace(""), None);
		assert_eq!(parse_reserved_namespace("no namespaces available"), None);
	}

	#[test]
	fn apps_list_with_components() {
		let out = "advisor\n `-- advisor-backend\n `-- advisor-frontend\nrbac\n `-- rbac\nhost-inventory\n";
		let apps = parse_apps_list(out);
		assert_eq!(apps.len(), 3);
		assert_eq!(apps["advisor"], vec!["advisor-backend", "advisor-frontend"]);
		assert_eq!(apps["rbac"], vec!["rbac"]);
		assert!(apps["host-inventory"].is_empty());
	}

	#[test]
	fn apps_list_orphan_components_are_ignored() {
		let apps = parse_apps_list("   `-- stray\nrbac\n");
		assert_eq!(apps.len(), 1);
		assert!(apps["rbac"].is_empty());
	}

	proptest! {
		#[test]
		fn apps_list_never_panics(input in "\\PC{0,200}") {
			let _ = parse_apps_list(&input);
		}

		#[test]
		fn single_token_line_round_trips(name in "ephemeral-[a-z0-9]{6}") {
			let parsed = parse_reserved_namespace(&format!("{name}\n"));
			prop_assert_eq!(parsed, Some(name));
		}
	}
}
