// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # NotABot Oracle
//!
//! Entry point for the `notabot-oracle` binary. Parses CLI arguments,
//! initializes logging and metrics, wires the identity providers and serves
//! the HTTP API.
//!
//! The binary supports four subcommands:
//!
//! - `run`     start the oracle service
//! - `keygen`  generate a signing key and print the oracle address
//! - `status`  query a running oracle's health endpoint
//! - `version` print build version information

mod api;
mod cli;
mod config;
mod error;
mod logging;
mod metrics;
mod providers;
mod rate_limit;
mod service;

use anyhow::{Context, Result};
use clap::Parser;
use notabot_protocol::crypto::OracleKeypair;
use notabot_protocol::{OracleSigner, Source};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::signal;

use cli::{Commands, OracleCli};
use config::OracleConfig;
use metrics::OracleMetrics;
use providers::{
    BrightIdProvider, EvidenceProvider, GitcoinProvider, PohProvider, ProviderSet,
};
use rate_limit::RateLimiter;
use service::OracleService;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = OracleCli::parse();

    match cli.command {
        Commands::Run(args) => run_oracle(*args).await,
        Commands::Keygen => {
            keygen();
            Ok(())
        }
        Commands::Status(args) => query_status(args).await,
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

fn register(set: &mut ProviderSet, provider: Arc<dyn EvidenceProvider>) {
    set.insert(provider.source(), provider);
}

fn build_providers(cfg: &OracleConfig) -> Result<ProviderSet> {
    let client = providers::http_client(cfg.request_timeout)
        .context("failed to build outbound HTTP client")?;

    let mut set: ProviderSet = HashMap::new();
    match &cfg.gitcoin {
        Some(g) => register(
            &mut set,
            Arc::new(GitcoinProvider::new(
                client.clone(),
                &g.api_url,
                &g.api_key,
                &g.scorer_id,
            )),
        ),
        None => tracing::warn!("GITCOIN_API_KEY or GITCOIN_SCORER_ID unset, gitcoin disabled"),
    }
    register(
        &mut set,
        Arc::new(PohProvider::new(client.clone(), &cfg.poh_graph_url)),
    );
    register(
        &mut set,
        Arc::new(BrightIdProvider::new(
            client,
            &cfg.brightid_node_url,
            &cfg.brightid_context,
        )),
    );
    Ok(set)
}

/// Starts the oracle HTTP service and runs until SIGINT/SIGTERM.
async fn run_oracle(args: cli::RunArgs) -> Result<()> {
    logging::init_logging(logging::DEFAULT_FILTER, args.log_format);

    let cfg = OracleConfig::from_args(&args)?;
    let metrics = Arc::new(OracleMetrics::new().context("failed to register metrics")?);
    let providers = build_providers(&cfg)?;

    let signer = OracleSigner::new(cfg.keypair.clone());
    let service = OracleService::new(
        signer,
        providers,
        cfg.gitcoin_min_score,
        Arc::clone(&metrics),
    );

    tracing::info!(
        listen = %cfg.listen,
        oracle = %service.oracle_address(),
        sources = ?service.enabled_sources(),
        dev_mode = cfg.dev_mode,
        gitcoin_min_score = cfg.gitcoin_min_score,
        "starting notabot-oracle"
    );

    let state = api::AppState {
        service: Arc::new(service),
        metrics,
        limiter: Arc::new(RateLimiter::new(
            cfg.rate_limit_window,
            cfg.rate_limit_max,
            cfg.max_in_flight,
        )),
        dev_mode: cfg.dev_mode,
    };
    let router = api::create_router(state, &cfg.allowed_origins);

    let listener = tokio::net::TcpListener::bind(cfg.listen)
        .await
        .with_context(|| format!("failed to bind listener on {}", cfg.listen))?;
    tracing::info!("oracle API listening on {}", cfg.listen);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("API server error")?;

    tracing::info!("notabot-oracle stopped");
    Ok(())
}

/// Generates a fresh signing key. The address is what the adapters are
/// deployed against.
fn keygen() {
    let keypair = OracleKeypair::generate();
    let signer = OracleSigner::new(keypair.clone());

    println!("Oracle key generated.");
    println!("  ORACLE_PRIVATE_KEY : {}", keypair.to_hex());
    println!("  Public key         : {}", keypair.public_key().to_hex());
    println!("  Oracle address     : {}", signer.address());
}

/// Queries a running oracle's health endpoint and prints the result.
async fn query_status(args: cli::StatusArgs) -> Result<()> {
    let url = format!("{}/health", args.url.trim_end_matches('/'));
    let body = reqwest::get(&url)
        .await
        .with_context(|| format!("failed to reach {url}"))?
        .error_for_status()
        .context("oracle reported an error")?
        .text()
        .await
        .context("failed to read health response")?;
    println!("{}", body);
    Ok(())
}

/// Prints version information to stdout.
fn print_version() {
    println!("notabot-oracle {}", env!("CARGO_PKG_VERSION"));
    println!("protocol       {}", notabot_protocol::config::PROTOCOL_VERSION);
    println!(
        "sources        {}",
        Source::ALL.map(|s| s.name()).join(", ")
    );
}

/// Waits for SIGINT (Ctrl+C) or SIGTERM, whichever comes first.
///
/// On non-Unix platforms, only Ctrl+C is supported.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received, draining connections");
}
