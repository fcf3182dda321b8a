//! Validated runtime configuration, built from the `run` arguments.

use anyhow::{bail, Context, Result};
use notabot_protocol::crypto::OracleKeypair;
use std::net::SocketAddr;
use std::time::Duration;

use crate::cli::RunArgs;

#[derive(Debug, Clone)]
pub struct GitcoinConfig {
    pub api_url: String,
    pub api_key: String,
    pub scorer_id: String,
}

#[derive(Debug, Clone)]
pub struct OracleConfig {
    pub listen: SocketAddr,
    pub keypair: OracleKeypair,
    pub dev_mode: bool,
    pub allowed_origins: Vec<String>,
    pub request_timeout: Duration,
    pub rate_limit_window: Duration,
    pub rate_limit_max: u32,
    pub max_in_flight: usize,
    pub gitcoin_min_score: u64,
    /// `None` disables the gitcoin route.
    pub gitcoin: Option<GitcoinConfig>,
    pub poh_graph_url: String,
    pub brightid_node_url: String,
    pub brightid_context: String,
}

impl OracleConfig {
    pub fn from_args(args: &RunArgs) -> Result<Self> {
        let listen: SocketAddr = format!("{}:{}", args.bind, args.port)
            .parse()
            .with_context(|| format!("invalid bind address {}:{}", args.bind, args.port))?;

        let keypair = OracleKeypair::from_hex(args.private_key.trim())
            .context("ORACLE_PRIVATE_KEY must be 64 hex characters")?;

        if args.request_timeout_secs == 0 {
            bail!("request timeout must be at least one second");
        }
        if args.rate_limit_max == 0 || args.max_in_flight == 0 {
            bail!("rate limits must be positive");
        }

        let gitcoin = match (&args.gitcoin_api_key, &args.gitcoin_scorer_id) {
            (Some(key), Some(scorer)) if !key.is_empty() && !scorer.is_empty() => {
                Some(GitcoinConfig {
                    api_url: args.gitcoin_api_url.clone(),
                    api_key: key.clone(),
                    scorer_id: scorer.clone(),
                })
            }
            _ => None,
        };

        Ok(Self {
            listen,
            keypair,
            dev_mode: args.environment.eq_ignore_ascii_case("development"),
            allowed_origins: args
                .allowed_origins
                .iter()
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect(),
            request_timeout: Duration::from_secs(args.request_timeout_secs),
            rate_limit_window: Duration::from_secs(args.rate_limit_window_secs.max(1)),
            rate_limit_max: args.rate_limit_max,
            max_in_flight: args.max_in_flight,
            gitcoin_min_score: args.gitcoin_min_score,
            gitcoin,
            poh_graph_url: args.poh_graph_url.clone(),
            brightid_node_url: args.brightid_node_url.clone(),
            brightid_context: args.brightid_context.clone(),
        })
    }
}
