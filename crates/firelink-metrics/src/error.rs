// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use firelink_k8s::K8sError;
use thiserror::Error;

pub type MetricsResult<T> = Result<T, MetricsError>;

#[derive(Error, Debug)]
pub enum MetricsError {
	#[error("cluster error: {0}")]
	Cluster(#[from] K8sError),

	#[error("prometheus request failed: {0}")]
	Http(#[from] reqwest::Error),

	#[error("prometheus query failed: {message}")]
	Query { message: String },

	#[error("invalid prometheus client configuration: {0}")]
	Config(String),
}
