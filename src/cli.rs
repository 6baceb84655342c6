//! Command-line interface parsing for ackbanner
//!
//! This module handles parsing of CLI arguments using clap, and turns them
//! into a validated [`ResolverConfig`].

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::data::DEFAULT_BASE_URL;
use crate::page::SUPPORT_ACK_ID;
use crate::resolver::ExpiryPolicy;

/// Error types for CLI argument handling
#[derive(Debug, Error)]
pub enum CliError {
    /// The base URL does not use http or https
    #[error("Invalid base URL: '{0}'. Expected an http:// or https:// URL")]
    InvalidBaseUrl(String),

    /// A timeout of zero seconds was requested
    #[error("Invalid timeout: must be at least 1 second")]
    InvalidTimeout,
}

/// ackbanner - Resolve and render the institutional acknowledgement banner
#[derive(Parser, Debug)]
#[command(name = "ackbanner")]
#[command(about = "Resolve the cached institutional acknowledgement label")]
#[command(version)]
pub struct Cli {
    /// Site serving the /institutional_banner endpoint
    #[arg(long, global = true, env = "ACKBANNER_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Directory holding the label cache (defaults to the XDG cache directory)
    #[arg(long, global = true, env = "ACKBANNER_CACHE_DIR", value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Keep the cache in memory for this run only
    #[arg(long, global = true)]
    pub no_persist: bool,

    /// Give up on the banner request after this many seconds
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout_secs: Option<u64>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Resolve the label and print the acknowledgement (default)
    Resolve {
        /// Print the full resolution as JSON
        #[arg(long)]
        json: bool,
    },
    /// Resolve the label and render it into an HTML page
    Render {
        /// HTML page to render into
        page: PathBuf,
        /// Write the rendered page here instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
        /// Id of the element receiving the acknowledgement
        #[arg(long, default_value = SUPPORT_ACK_ID)]
        target_id: String,
    },
    /// Show the cached label and expiry without fetching
    Status {
        /// Print the status as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove the cached label and expiry
    Clear,
}

impl Cli {
    /// The subcommand to run, defaulting to `resolve`
    pub fn command(&self) -> Command {
        self.command
            .clone()
            .unwrap_or(Command::Resolve { json: false })
    }
}

/// Resolver settings derived from CLI arguments and environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Site serving the banner endpoint
    pub base_url: String,
    /// Optional request timeout
    pub timeout: Option<Duration>,
    /// Cache lifetimes
    pub policy: ExpiryPolicy,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
            policy: ExpiryPolicy::default(),
        }
    }
}

/// Checks that a base URL uses http or https
///
/// # Returns
/// * `Ok(String)` with any trailing slashes removed
/// * `Err(CliError::InvalidBaseUrl)` otherwise
pub fn parse_base_url(s: &str) -> Result<String, CliError> {
    let trimmed = s.trim();
    let lower = trimmed.to_ascii_lowercase();
    let has_scheme = ["http://", "https://"]
        .iter()
        .any(|scheme| lower.len() > scheme.len() && lower.starts_with(scheme));
    if !has_scheme {
        return Err(CliError::InvalidBaseUrl(s.to_string()));
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}

impl ResolverConfig {
    /// Creates a ResolverConfig from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(ResolverConfig)` with validated settings
    /// * `Err(CliError)` if the base URL or timeout is invalid
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let base_url = parse_base_url(&cli.base_url)?;
        let timeout = match cli.timeout_secs {
            None => None,
            Some(0) => return Err(CliError::InvalidTimeout),
            Some(secs) => Some(Duration::from_secs(secs)),
        };

        Ok(ResolverConfig {
            base_url,
            timeout,
            policy: ExpiryPolicy::default(),
        })
    }
}
