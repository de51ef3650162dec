//! Server startup utilities.

use jobdesk_config::AppConfig;
use jobdesk_core::JobdeskError;
use std::str::FromStr;
use tracing::info;

/// Command selected by the first CLI argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Command {
    /// Bootstrap the stack and run until a shutdown signal.
    #[default]
    Serve,
    /// Replace all data with the development data set.
    Seed,
    /// Rebuild the search indices from the store.
    Reindex,
}

impl FromStr for Command {
    type Err = JobdeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "serve" => Ok(Self::Serve),
            "seed" => Ok(Self::Seed),
            "reindex" => Ok(Self::Reindex),
            other => Err(JobdeskError::Configuration(format!(
                "Unknown command '{other}', expected serve, seed or reindex"
            ))),
        }
    }
}

impl Command {
    /// Parses the command from process arguments (program name first).
    pub fn from_args<I: IntoIterator<Item = String>>(args: I) -> Result<Self, JobdeskError> {
        args.into_iter()
            .nth(1)
            .map_or(Ok(Self::Serve), |arg| arg.parse())
    }
}

/// Prints the backends the server is about to use.
pub fn print_startup_info(config: &AppConfig) {
    let separator = "=".repeat(60);
    info!("{}", separator);
    info!("Environment: {}", config.app.environment);
    info!(
        "Cache:       {}",
        if config.redis.enabled {
            config.redis.url.as_str()
        } else {
            "in-process"
        }
    );
    info!(
        "Search:      {} (listings {})",
        config.search.url,
        if config.search.enabled { "enabled" } else { "disabled" }
    );
    info!("Cache TTL:   {}s", config.cache.default_ttl_secs);
    if config.observability.metrics_enabled {
        info!("Metrics:     http://{}/metrics", config.observability.metrics_addr);
    }
    info!("{}", separator);
}
