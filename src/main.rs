//! ackbanner - Resolve the institutional acknowledgement banner
//!
//! Reads the cached member institution label, refreshes it from the banner
//! endpoint when it has expired, and prints or renders the acknowledgement.

use std::io::{self, Write};

use clap::Parser;

use ackbanner::cache::{CacheManager, LabelCache, MemoryCache};
use ackbanner::cli::{Cli, Command, ResolverConfig};
use ackbanner::data::BannerClient;
use ackbanner::logging;
use ackbanner::page::HtmlDocument;
use ackbanner::resolver::{CacheState, Resolver};

/// Picks the cache backend from CLI flags
fn open_cache(cli: &Cli) -> Result<Box<dyn LabelCache>, Box<dyn std::error::Error>> {
    if cli.no_persist {
        return Ok(Box::new(MemoryCache::new()));
    }

    let manager = match &cli.cache_dir {
        Some(dir) => CacheManager::with_dir(dir.clone()),
        None => CacheManager::new()
            .ok_or("could not determine a cache directory; pass --cache-dir")?,
    };
    tracing::debug!(dir = %manager.dir().display(), "using disk cache");
    Ok(Box::new(manager))
}

/// Builds the banner client from the resolver config
fn banner_client(config: &ResolverConfig) -> Result<BannerClient, Box<dyn std::error::Error>> {
    let client = match config.timeout {
        Some(timeout) => BannerClient::with_timeout(config.base_url.clone(), timeout)?,
        None => BannerClient::new(config.base_url.clone()),
    };
    Ok(client)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = ResolverConfig::from_cli(&cli)?;
    let cache = open_cache(&cli)?;
    let command = cli.command();

    let resolver = Resolver::new(cache, banner_client(&config)?).with_policy(config.policy);
    let mut stdout = io::stdout().lock();

    match command {
        Command::Resolve { json } => {
            let resolution = resolver.resolve().await;
            if json {
                writeln!(stdout, "{}", serde_json::to_string_pretty(&resolution)?)?;
            } else if let Some(message) = resolution.message() {
                writeln!(stdout, "{}", message)?;
            }
        }
        Command::Render {
            page,
            output,
            target_id,
        } => {
            let mut doc = HtmlDocument::load(&page)?;
            let resolver = resolver.with_target_id(target_id);
            let resolution = resolver.run(&mut doc).await;
            tracing::info!(rendered = resolution.rendered, "page processed");

            match output {
                Some(path) => doc.save(&path)?,
                None => stdout.write_all(doc.as_str().as_bytes())?,
            }
        }
        Command::Status { json } => {
            let (state, entry) = resolver.status();
            if json {
                let status = serde_json::json!({
                    "state": state,
                    "label": entry.label,
                    "expires_at": entry.expires_at,
                });
                writeln!(stdout, "{}", serde_json::to_string_pretty(&status)?)?;
            } else {
                let state = match state {
                    CacheState::Fresh => "fresh",
                    CacheState::Stale => "stale",
                };
                writeln!(stdout, "state: {}", state)?;
                match &entry.label {
                    Some(label) => writeln!(stdout, "label: {}", label)?,
                    None => writeln!(stdout, "label: (none)")?,
                }
                match entry.expires_at {
                    Some(expires_at) => writeln!(stdout, "expires: {}", expires_at.to_rfc3339())?,
                    None => writeln!(stdout, "expires: (none)")?,
                }
            }
        }
        Command::Clear => {
            resolver.cache().clear()?;
            tracing::info!("label cache cleared");
        }
    }

    Ok(())
}
