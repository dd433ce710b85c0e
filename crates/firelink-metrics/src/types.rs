// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use serde::{Deserialize, Serialize};

use crate::quantity::round2;

/// CPU in cores and memory in MiB.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourcePair {
	pub cpu: f64,
	pub memory: f64,
}

impl ResourcePair {
	pub fn rounded(self) -> Self {
		Self {
			cpu: round2(self.cpu),
			memory: round2(self.memory),
		}
	}
}

impl std::ops::AddAssign for ResourcePair {
	fn add_assign(&mut self, other: Self) {
		self.cpu += other.cpu;
		self.memory += other.memory;
	}
}

/// Requests, limits and live usage of a namespace.
///
/// The zero value stands in for a namespace whose metrics could not be read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceUsageSnapshot {
	pub requests: ResourcePair,
	pub limits: ResourcePair,
	pub usage: ResourcePair,
}

impl ResourceUsageSnapshot {
	pub fn rounded(self) -> Self {
		Self {
			requests: self.requests.rounded(),
			limits: self.limits.rounded(),
			usage: self.usage.rounded(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PodUsage {
	pub name: String,
	pub cpu: f64,
	pub memory: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeUsage {
	pub name: String,
	pub cpu: f64,
	pub cpu_percent: String,
	pub memory: f64,
	pub memory_percent: String,
}

/// Cluster-wide share of allocatable capacity in use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterUsage {
	pub cpu_percent: String,
	pub memory_percent: String,
}
