// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Cluster resource quantities ("250m", "512Mi") as plain numbers.
//!
//! CPU normalizes to cores and memory to MiB.

use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
	Cpu,
	Memory,
}

impl fmt::Display for ResourceKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ResourceKind::Cpu => f.write_str("cpu"),
			ResourceKind::Memory => f.write_str("memory"),
		}
	}
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QuantityError {
	#[error("unsupported {kind} value: {value:?}")]
	UnsupportedFormat { value: String, kind: ResourceKind },
}

const MIB: f64 = 1024.0 * 1024.0;

const CPU_SUFFIXES: &[(&str, f64)] = &[("n", 1e-9), ("u", 1e-6), ("m", 1e-3)];

// Longest suffixes first so "Mi" is not read as "M".
const MEMORY_SUFFIXES: &[(&str, f64)] = &[
	("Ki", 1.0 / 1024.0),
	("Mi", 1.0),
	("Gi", 1024.0),
	("Ti", 1024.0 * 1024.0),
	("k", 1e3 / MIB),
	("M", 1e6 / MIB),
	("G", 1e9 / MIB),
	("T", 1e12 / MIB),
];

/// Parse a quantity into cores (cpu) or MiB (memory).
pub fn parse(value: &str, kind: ResourceKind) -> Result<f64, QuantityError> {
	let unsupported = || QuantityError::UnsupportedFormat {
		value: value.to_string(),
		kind,
	};
	let trimmed = value.trim();

	let (number, scale) = match kind {
		ResourceKind::Cpu => split_suffix(trimmed, CPU_SUFFIXES).unwrap_or((trimmed, 1.0)),
		ResourceKind::Memory => {
			split_suffix(trimmed, MEMORY_SUFFIXES).unwrap_or((trimmed, 1.0 / MIB))
		}
	};

	// Rejects leftover unit letters such as "512Mi" read as cpu.
	if number.is_empty() || !number.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
		return Err(unsupported());
	}
	if number.contains(|c: char| c.is_ascii_alphabetic()) {
		return Err(unsupported());
	}
	let parsed: f64 = number.parse().map_err(|_| unsupported())?;
	if !parsed.is_finite() {
		return Err(unsupported());
	}
	Ok(parsed * scale)
}

fn split_suffix<'a>(value: &'a str, table: &[(&str, f64)]) -> Option<(&'a str, f64)> {
	table
		.iter()
		.find_map(|(suffix, scale)| value.strip_suffix(suffix).map(|n| (n, *scale)))
}

/// `usage / allocatable` as a percentage with two decimals, e.g. `"42.50%"`.
///
/// Returns `"0%"` when allocatable is zero.
pub fn calculate_percentage(
	usage: &str,
	allocatable: &str,
	kind: ResourceKind,
) -> Result<String, QuantityError> {
	Ok(percentage(parse(usage, kind)?, parse(allocatable, kind)?))
}

pub fn percentage(usage: f64, allocatable: f64) -> String {
	if allocatable <= 0.0 {
		return "0%".to_string();
	}
	format!("{:.2}%", usage / allocatable * 100.0)
}

pub fn round2(value: f64) -> f64 {
	(value * 100.0).round() / 100.0
}
