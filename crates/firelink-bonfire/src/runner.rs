// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::collections::BTreeMap;
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, info, trace, warn};

use crate::args::{AppsListArgs, ProcessArgs, ReleaseArgs, ReserveArgs};
use crate::error::{BonfireError, BonfireResult};
use crate::output::{parse_apps_list, parse_reserved_namespace};

/// Handle on the `bonfire` and `oc` binaries.
#[derive(Debug, Clone)]
pub struct BonfireCli {
	bonfire_bin: String,
	oc_bin: String,
	timeout: Duration,
}

impl BonfireCli {
	pub fn new(
		bonfire_bin: impl Into<String>,
		oc_bin: impl Into<String>,
		timeout: Duration,
	) -> Self {
		Self {
			bonfire_bin: bonfire_bin.into(),
			oc_bin: oc_bin.into(),
			timeout,
		}
	}

	/// Log the `oc` context in so that `bonfire` and the kube client pick up
	/// the same credentials from the kubeconfig.
	pub async fn login(&self, server: &str, token: &str) -> BonfireResult<()> {
		let args = [
			"login".to_string(),
			format!("--server={server}"),
			format!("--token={token}"),
		];
		let display = [
			"login".to_string(),
			format!("--server={server}"),
			"--token=***".to_string(),
		];
		run(&self.oc_bin, &args, &display, self.timeout).await?;
		info!(server = %server, "Logged in to cluster");
		Ok(())
	}

	/// Reserve a namespace and return its name.
	pub async fn reserve(&self, args: &ReserveArgs) -> BonfireResult<String> {
		let argv = args.to_args();
		let stdout = self.bonfire(&argv).await?;
		parse_reserved_namespace(&stdout).ok_or_else(|| BonfireError::InvalidOutput {
			cmd: "bonfire namespace reserve".to_string(),
			message: format!("no namespace name in output: {stdout:?}"),
		})
	}

	pub async fn release(&self, args: &ReleaseArgs) -> BonfireResult<()> {
		self.bonfire(&args.to_args()).await?;
		Ok(())
	}

	/// Free-text description block for a namespace.
	pub async fn describe(&self, namespace: &str) -> BonfireResult<String> {
		let argv = ["namespace".to_string(), "describe".to_string(), namespace.to_string()];
		self.bonfire(&argv).await
	}

	/// Render app templates; returns the `List` object bonfire prints.
	pub async fn process(&self, args: &ProcessArgs) -> BonfireResult<serde_json::Value> {
		let stdout = self.bonfire(&args.to_args()).await?;
		serde_json::from_str(&stdout).map_err(|e| BonfireError::InvalidOutput {
			cmd: "bonfire process".to_string(),
			message: e.to_string(),
		})
	}

	/// App name -> component names.
	pub async fn list_apps(
		&self,
		args: &AppsListArgs,
	) -> BonfireResult<BTreeMap<String, Vec<String>>> {
		let stdout = self.bonfire(&args.to_args()).await?;
		Ok(parse_apps_list(&stdout))
	}

	async fn bonfire(&self, args: &[String]) -> BonfireResult<String> {
		run(&self.bonfire_bin, args, args, self.timeout).await
	}
}

/// Runs a command and returns its trimmed stdout on success.
///
/// `display` is what gets logged in place of `args`. The child is killed
/// if the returned future is dropped.
async fn run(
	program: &str,
	args: &[String],
	display: &[String],
	timeout: Duration,
) -> BonfireResult<String> {
	let mut cmd = Command::new(program);
	cmd.args(args).kill_on_drop(true);

	let shown = format!("{program} {}", display.join(" "));
	debug!(cmd = %shown, "running command");

	let output = match tokio::time::timeout(timeout, cmd.output()).await {
		Ok(result) => result.map_err(|e| {
			if e.kind() == std::io::ErrorKind::NotFound {
				warn!(program = %program, "command not found in PATH");
				BonfireError::NotInstalled {
					program: program.to_string(),
				}
			} else {
				BonfireError::Io(e)
			}
		})?,
		Err(_) => {
			warn!(program = %program, timeout_secs = timeout.as_secs(), "command timed out");
			return Err(BonfireError::TimedOut {
				cmd: program.to_string(),
				after: timeout,
			});
		}
	};

	let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
	let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
	trace!(program = %program, stdout = %stdout, stderr = %stderr, "command output");

	if output.status.success() {
		Ok(stdout)
	} else {
		Err(BonfireError::CommandFailed {
			cmd: program.to_string(),
			args: display.to_vec(),
			stderr: if stderr.is_empty() { stdout } else { stderr },
		})
	}
}

#[cfg(all(test, unix))]
mod tests {
	use super::*;

	#[tokio::test]
	async fn missing_binary_is_not_installed() {
		let cli = BonfireCli::new(
			"firelink-test-no-such-binary",
			"oc",
			Duration::from_secs(5),
		);
		let err = cli.describe("ephemeral-abc").await.unwrap_err();
		assert!(matches!(err, BonfireError::NotInstalled { .. }));
	}

	#[tokio::test]
	async fn stdout_is_trimmed() {
		let out = run(
			"echo",
			&["  ephemeral-abc  ".to_string()],
			&[],
			Duration::from_secs(5),
		)
		.await
		.unwrap();
		assert_eq!(out, "ephemeral-abc");
	}

	#[tokio::test]
	async fn non_zero_exit_is_command_failed() {
		let err = run(
			"sh",
			&["-c".to_string(), "echo 'ERROR: boom' >&2; exit 3".to_string()],
			&["-c".to_string(), "...".to_string()],
			Duration::from_secs(5),
		)
		.await
		.unwrap_err();
		match err {
			BonfireError::CommandFailed { stderr, args, .. } => {
				assert_eq!(stderr, "ERROR: boom");
				assert_eq!(args, vec!["-c", "..."]);
			}
			other => panic!("unexpected error: {other:?}"),
		}
	}

	#[tokio::test]
	async fn login_reports_outcome_without_the_token() {
		let ok = BonfireCli::new("bonfire", "true", Duration::from_secs(5));
		ok.login("https://api.example.com:6443", "sha256~secret")
			.await
			.unwrap();

		let failing = BonfireCli::new("bonfire", "false", Duration::from_secs(5));
		match failing
			.login("https://api.example.com:6443", "sha256~secret")
			.await
			.unwrap_err()
		{
			BonfireError::CommandFailed { args, .. } => {
				assert!(args.contains(&"--token=***".to_string()));
				assert!(!args.iter().any(|a| a.contains("sha256~secret")));
			}
			other => panic!("unexpected error: {other:?}"),
		}
	}

	#[tokio::test]
	async fn slow_command_times_out() {
		let err = run(
			"sleep",
			&["5".to_string()],
			&[],
			Duration::from_millis(50),
		)
		.await
		.unwrap_err();
		assert!(matches!(err, BonfireError::TimedOut { .. }));
		assert!(err.is_transient());
	}
}
