// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Firelink server binary.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use firelink_bonfire::BonfireCli;
use firelink_config::{LogFormat, ServerConfig};
use firelink_k8s::KubeClient;
use firelink_server::{create_app_state, create_router, version};
use tower_http::{
	cors::{Any, CorsLayer},
	trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Firelink server - HTTP facade over bonfire ephemeral environments.
#[derive(Parser, Debug)]
#[command(
	name = "firelink-server",
	about = "Ephemeral environment reservation and deployment server",
	version
)]
struct Args {
	/// Path to a TOML config file, replacing the system config file
	#[arg(long, env = "FIRELINK_CONFIG")]
	config: Option<PathBuf>,

	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Show version and build information
	Version,
}

fn init_tracing(config: &ServerConfig) {
	let filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| config.logging.level.clone().into());
	let registry = tracing_subscriber::registry().with(filter);
	match config.logging.format {
		LogFormat::Json => registry
			.with(tracing_subscriber::fmt::layer().json())
			.init(),
		LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
	}
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let args = Args::parse();

	if let Some(Command::Version) = args.command {
		println!("{}", version::format_version_info());
		return Ok(());
	}

	dotenvy::dotenv().ok();

	let config = match &args.config {
		Some(path) => firelink_config::load_config_with_file(path)?,
		None => firelink_config::load_config()?,
	};

	init_tracing(&config);

	tracing::info!(
		host = %config.http.host,
		port = config.http.port,
		metrics_backend = ?config.metrics.backend,
		"starting firelink-server"
	);

	// The CLI session is shared by every bonfire invocation for the life of
	// the process.
	if let Some((server, token)) = config.cluster.login_credentials() {
		let cli = BonfireCli::new(
			config.cluster.bonfire_bin.clone(),
			config.cluster.oc_bin.clone(),
			config.cluster.command_timeout(),
		);
		if let Err(e) = cli.login(server, token.expose()).await {
			tracing::warn!(server = %server, error = %e, "Cluster login failed");
		}
	}

	let cluster = KubeClient::new()
		.await
		.context("failed to create kubernetes client")?;
	let state = create_app_state(&config, Arc::new(cluster))?;

	let app = create_router(state)
		.layer(TraceLayer::new_for_http())
		.layer(
			CorsLayer::new()
				.allow_origin(Any)
				.allow_methods(Any)
				.allow_headers(Any),
		);

	let addr = config.socket_addr();
	tracing::info!("listening on {}", addr);

	let listener = tokio::net::TcpListener::bind(&addr).await?;

	tokio::select! {
		result = axum::serve(listener, app) => {
			if let Err(e) = result {
				tracing::error!(error = %e, "Server error");
			}
		}
		_ = tokio::signal::ctrl_c() => {
			tracing::info!("Received shutdown signal");
		}
	}

	tracing::info!("Server shutdown complete");
	Ok(())
}
