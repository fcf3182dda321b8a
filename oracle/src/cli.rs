//! # CLI Interface
//!
//! Defines the command-line argument structure for `notabot-oracle` using
//! `clap` derive. Every `run` option has an environment fallback so the
//! service can be configured entirely from the environment.

use clap::{Parser, Subcommand};
use notabot_protocol::config::{
    DEFAULT_GITCOIN_MIN_SCORE, DEFAULT_ORACLE_PORT, MAX_IN_FLIGHT_REQUESTS,
    RATE_LIMIT_MAX_REQUESTS,
};

use crate::logging::LogFormat;
use crate::providers::{brightid, gitcoin, poh};

/// NotABot oracle.
///
/// Queries identity providers on behalf of users and signs short-lived
/// attestations that the on-ledger source adapters accept.
#[derive(Parser, Debug)]
#[command(
    name = "notabot-oracle",
    about = "NotABot attestation oracle",
    version,
    propagate_version = true
)]
pub struct OracleCli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the oracle HTTP service.
    Run(Box<RunArgs>),
    /// Generate a fresh signing key and print it with the oracle address.
    Keygen,
    /// Query the health endpoint of a running oracle.
    Status(StatusArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments for the `run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// HTTP port.
    #[arg(long, env = "PORT", default_value_t = DEFAULT_ORACLE_PORT)]
    pub port: u16,

    /// Bind address.
    #[arg(long, env = "NOTABOT_BIND", default_value = "0.0.0.0")]
    pub bind: String,

    /// Hex-encoded Ed25519 signing key (64 hex chars, optional 0x).
    ///
    /// Prefer the environment over this flag on shared machines.
    #[arg(long, env = "ORACLE_PRIVATE_KEY", hide_env_values = true)]
    pub private_key: String,

    /// Runtime environment. `development` exposes raw error details.
    #[arg(long, env = "NODE_ENV", default_value = "production")]
    pub environment: String,

    /// Log output format.
    #[arg(long, env = "NOTABOT_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    /// Comma-separated CORS origins. Empty allows any origin.
    #[arg(long, env = "ALLOWED_ORIGINS", value_delimiter = ',')]
    pub allowed_origins: Vec<String>,

    /// Outbound provider request timeout, in seconds.
    #[arg(long, env = "NOTABOT_REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    pub request_timeout_secs: u64,

    /// Requests allowed per rate-limit window.
    #[arg(long, env = "NOTABOT_RATE_LIMIT_MAX", default_value_t = RATE_LIMIT_MAX_REQUESTS)]
    pub rate_limit_max: u32,

    /// Rate-limit window, in seconds.
    #[arg(long, env = "NOTABOT_RATE_LIMIT_WINDOW_SECS", default_value_t = 60)]
    pub rate_limit_window_secs: u64,

    /// Concurrent verify requests served at once.
    #[arg(long, env = "NOTABOT_MAX_IN_FLIGHT", default_value_t = MAX_IN_FLIGHT_REQUESTS)]
    pub max_in_flight: usize,

    /// Gitcoin Passport API key. Gitcoin is disabled without it.
    #[arg(long, env = "GITCOIN_API_KEY", hide_env_values = true)]
    pub gitcoin_api_key: Option<String>,

    /// Gitcoin Passport scorer id.
    #[arg(long, env = "GITCOIN_SCORER_ID")]
    pub gitcoin_scorer_id: Option<String>,

    /// Minimum Gitcoin Passport score the oracle will sign.
    #[arg(long, env = "GITCOIN_MIN_SCORE", default_value_t = DEFAULT_GITCOIN_MIN_SCORE)]
    pub gitcoin_min_score: u64,

    #[arg(long, env = "GITCOIN_API_URL", default_value = gitcoin::DEFAULT_BASE_URL)]
    pub gitcoin_api_url: String,

    #[arg(long, env = "POH_GRAPH_URL", default_value = poh::DEFAULT_GRAPH_URL)]
    pub poh_graph_url: String,

    #[arg(long, env = "BRIGHTID_NODE_URL", default_value = brightid::DEFAULT_NODE_URL)]
    pub brightid_node_url: String,

    /// BrightID application context.
    #[arg(long, env = "BRIGHTID_CONTEXT", default_value = brightid::DEFAULT_CONTEXT)]
    pub brightid_context: String,
}

/// Arguments for the `status` subcommand.
#[derive(Parser, Debug)]
pub struct StatusArgs {
    /// Base URL of the running oracle.
    #[arg(long, default_value = "http://127.0.0.1:3001")]
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        OracleCli::command().debug_assert();
    }

    #[test]
    fn run_parses_with_only_a_key() {
        let cli = OracleCli::try_parse_from([
            "notabot-oracle",
            "run",
            "--private-key",
            "0x4242424242424242424242424242424242424242424242424242424242424242",
            "--allowed-origins",
            "http://a.test,http://b.test",
        ])
        .unwrap();
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.port, DEFAULT_ORACLE_PORT);
        assert_eq!(args.gitcoin_min_score, 20);
        assert_eq!(args.allowed_origins.len(), 2);
        assert_eq!(args.log_format, LogFormat::Pretty);
    }
}
