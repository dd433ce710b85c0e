// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::time::Duration;

use thiserror::Error;

pub type BonfireResult<T> = Result<T, BonfireError>;

/// Stderr fragments that indicate a network or API-server hiccup.
const TRANSIENT_MARKERS: &[&str] = &[
	"timed out",
	"timeout",
	"connection refused",
	"connection reset",
	"temporarily unavailable",
	"service unavailable",
	"too many requests",
	"tls handshake",
	"eof",
];

#[derive(Error, Debug)]
pub enum BonfireError {
	#[error("{program} is not installed or not in PATH")]
	NotInstalled { program: String },

	#[error("{cmd} {} failed: {stderr}", .args.join(" "))]
	CommandFailed {
		cmd: String,
		args: Vec<String>,
		stderr: String,
	},

	#[error("{cmd} timed out after {}s", .after.as_secs())]
	TimedOut { cmd: String, after: Duration },

	#[error("unexpected output from {cmd}: {message}")]
	InvalidOutput { cmd: String, message: String },

	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
}

impl BonfireError {
	/// Whether the failure looks like a retryable network/timeout condition.
	pub fn is_transient(&self) -> bool {
		match self {
			BonfireError::TimedOut { .. } => true,
			BonfireError::CommandFailed { stderr, .. } => {
				let stderr = stderr.to_ascii_lowercase();
				TRANSIENT_MARKERS.iter().any(|m| stderr.contains(m))
			}
			_ => false,
		}
	}

	/// Human-readable reason, without the command line.
	pub fn reason(&self) -> String {
		match self {
			BonfireError::CommandFailed { stderr, .. } => stderr
				.lines()
				.rev()
				.find(|l| !l.trim().is_empty())
				.map(|l| l.trim().trim_start_matches("ERROR:").trim().to_string())
				.unwrap_or_else(|| self.to_string()),
			other => other.to_string(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn failed(stderr: &str) -> BonfireError {
		BonfireError::CommandFailed {
			cmd: "bonfire".into(),
			args: vec!["namespace".into(), "reserve".into()],
			stderr: stderr.into(),
		}
	}

	#[test]
	fn timeouts_are_transient() {
		let err = BonfireError::TimedOut {
			cmd: "bonfire".into(),
			after: Duration::from_secs(5),
		};
		assert!(err.is_transient());
	}

	#[test]
	fn network_stderr_is_transient() {
		assert!(failed("dial tcp 10.0.0.1:6443: connect: connection refused").is_transient());
		assert!(failed("Error from server: Service Unavailable").is_transient());
	}

	#[test]
	fn config_errors_are_permanent() {
		assert!(!failed("ERROR: no app configs found for 'nope'").is_transient());
		assert!(!BonfireError::NotInstalled {
			program: "bonfire".into()
		}
		.is_transient());
	}

	#[test]
	fn reason_uses_last_stderr_line() {
		let err = failed("INFO: reserving\nERROR: pool 'gold' does not exist\n");
		assert_eq!(err.reason(), "pool 'gold' does not exist");
	}

	#[test]
	fn display_includes_args() {
		let err = failed("boom");
		assert_eq!(err.to_string(), "bonfire namespace reserve failed: boom");
	}
}
