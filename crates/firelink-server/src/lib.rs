// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Firelink HTTP server.
//!
//! Exposes namespace reservation, app deployment with streamed progress,
//! and cluster resource metrics over a JSON API.

pub mod api;
pub mod error;
pub mod routes;
pub mod state;
pub mod version;

pub use api::{create_router, API_PREFIX};
pub use error::{ErrorResponse, ServerError};
pub use state::{create_app_state, AppState};
