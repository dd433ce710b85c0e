// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use firelink_bonfire::BonfireError;
use firelink_k8s::K8sError;
use thiserror::Error;

/// Failure reported by a [`crate::ReservationGateway`].
///
/// Every underlying tool or API error collapses into one of two kinds.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
	/// Network, timeout or API-server hiccup. Retrying later may succeed.
	#[error("{0}")]
	Transient(String),

	/// Retrying will not help, e.g. the reservation subsystem is missing.
	#[error("{0}")]
	Permanent(String),
}

impl GatewayError {
	pub fn is_transient(&self) -> bool {
		matches!(self, GatewayError::Transient(_))
	}
}

impl From<K8sError> for GatewayError {
	fn from(err: K8sError) -> Self {
		if err.is_transient() {
			GatewayError::Transient(err.to_string())
		} else {
			GatewayError::Permanent(err.to_string())
		}
	}
}

impl From<BonfireError> for GatewayError {
	fn from(err: BonfireError) -> Self {
		if err.is_transient() {
			GatewayError::Transient(err.reason())
		} else {
			GatewayError::Permanent(err.reason())
		}
	}
}

/// Failure inside a lifecycle operation, before it is flattened into a
/// `{completed: false, message}` result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
	#[error("You already have a reservation.")]
	AlreadyReserved { requester: String },

	#[error("Namespace '{namespace}' is not reserved")]
	NotReserved { namespace: String },

	#[error("Namespace '{namespace}' is reserved by '{owner}'")]
	ReservedByOther { namespace: String, owner: String },

	#[error("Something went wrong verifying the release")]
	ReleaseUnconfirmed { namespace: String, attempts: u32 },

	#[error(transparent)]
	Gateway(#[from] GatewayError),
}

impl LifecycleError {
	/// Precondition failures, as opposed to gateway failures.
	pub fn is_guard_failure(&self) -> bool {
		matches!(
			self,
			LifecycleError::AlreadyReserved { .. }
				| LifecycleError::NotReserved { .. }
				| LifecycleError::ReservedByOther { .. }
		)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn k8s_errors_keep_their_class() {
		let transient: GatewayError = K8sError::Timeout.into();
		assert!(transient.is_transient());

		let permanent: GatewayError = K8sError::ApiError {
			code: Some(403),
			message: "forbidden".into(),
		}
		.into();
		assert!(!permanent.is_transient());
	}

	#[test]
	fn bonfire_errors_use_reason() {
		let err: GatewayError = BonfireError::CommandFailed {
			cmd: "bonfire".into(),
			args: vec![],
			stderr: "ERROR: pool 'gold' does not exist".into(),
		}
		.into();
		assert_eq!(err, GatewayError::Permanent("pool 'gold' does not exist".into()));
	}

	#[test]
	fn gateway_errors_display_transparently() {
		let err: LifecycleError = GatewayError::Transient("connection reset".into()).into();
		assert_eq!(err.to_string(), "connection reset");
		assert!(!err.is_guard_failure());
	}

	#[test]
	fn guard_failures() {
		let err = LifecycleError::AlreadyReserved {
			requester: "alice".into(),
		};
		assert_eq!(err.to_string(), "You already have a reservation.");
		assert!(err.is_guard_failure());
	}
}
