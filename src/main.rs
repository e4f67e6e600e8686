// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::{Context as _, Result};
use axum::{http::StatusCode, routing::get, Router};
use clap::Parser;
use gateway_dns::{
    config::OperatorConfig,
    constants::{
        HEALTH_SERVER_PATH, METRICS_SERVER_BIND_ADDRESS, METRICS_SERVER_PATH, METRICS_SERVER_PORT,
        TOKIO_WORKER_THREADS,
    },
    context::Context,
    credential_controller::{run_credential_controller, run_gateway_dispatcher},
    metrics::gather_metrics,
    record_controller::run_record_controller,
    router::GatewayRequestQueue,
};
use kube::Client;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info};

/// DNS record and gateway credential controller
#[derive(Debug, Parser)]
#[command(name = "gateway-dns", version, about)]
struct Args {
    /// Path to the operator configuration file (YAML)
    #[arg(long, env = "GATEWAY_DNS_CONFIG")]
    config: Option<PathBuf>,

    /// Socket address of the metrics and health server
    #[arg(
        long,
        env = "GATEWAY_DNS_METRICS_ADDR",
        default_value_t = format!("{METRICS_SERVER_BIND_ADDRESS}:{METRICS_SERVER_PORT}")
    )]
    metrics_addr: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Build Tokio runtime with custom thread names
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(TOKIO_WORKER_THREADS)
        .thread_name("gateway-dns")
        .enable_all()
        .build()?;

    runtime.block_on(async_main(args))
}

async fn async_main(args: Args) -> Result<()> {
    // Respects RUST_LOG (default: info) and RUST_LOG_FORMAT (json|text, default: text)
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }

    info!("Starting gateway DNS controller");

    let config = OperatorConfig::load(args.config.as_deref()).await?;
    info!(
        managed_zones = config.managed_zones.len(),
        credential_selector = %config.credential_selector.as_label_selector(),
        "Configuration loaded"
    );

    debug!("Initializing Kubernetes client");
    let client = Client::try_default().await?;
    debug!("Kubernetes client initialized successfully");

    let batch_window = config.gateway_batch_window();
    let context = Arc::new(Context::new(client.clone(), config));
    let (queue, requests) = GatewayRequestQueue::new();

    info!("Starting all controllers");

    // Every task is expected to run forever; the first one to return ends the process
    tokio::select! {
        result = run_record_controller(context.clone()) => {
            error!("CRITICAL: DNSRecord controller exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("DNSRecord controller exited unexpectedly without error")
        }
        result = run_credential_controller(context.clone(), queue) => {
            error!("CRITICAL: Credential controller exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("Credential controller exited unexpectedly without error")
        }
        result = run_gateway_dispatcher(client, requests, batch_window) => {
            error!("CRITICAL: Gateway dispatcher exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("Gateway dispatcher exited unexpectedly without error")
        }
        result = run_metrics_server(&args.metrics_addr) => {
            error!("CRITICAL: Metrics server exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("Metrics server exited unexpectedly without error")
        }
    }
}

/// Serve Prometheus metrics and the liveness probe.
async fn run_metrics_server(bind_address: &str) -> Result<()> {
    let app = Router::new()
        .route(METRICS_SERVER_PATH, get(metrics_handler))
        .route(HEALTH_SERVER_PATH, get(|| async { "ok" }));

    let listener = tokio::net::TcpListener::bind(bind_address)
        .await
        .with_context(|| format!("Failed to bind metrics server to {bind_address}"))?;
    info!("Metrics server listening on {bind_address}");

    axum::serve(listener, app).await?;
    Ok(())
}

async fn metrics_handler() -> Result<String, (StatusCode, String)> {
    gather_metrics().map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
}
