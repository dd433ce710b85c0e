// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Runner for the `bonfire` provisioning CLI and the `oc` cluster CLI.
//!
//! Commands are built from typed argument structs, executed with a
//! per-command timeout, and killed if the calling future is dropped.

mod args;
mod error;
mod output;
mod runner;

pub use args::{AppsListArgs, ProcessArgs, ReleaseArgs, ReserveArgs};
pub use error::{BonfireError, BonfireResult};
pub use output::{parse_apps_list, parse_reserved_namespace};
pub use runner::BonfireCli;
