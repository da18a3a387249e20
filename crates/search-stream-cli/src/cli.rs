use clap::{Parser, ValueEnum};
use search_stream_client::ClientConfig;

/// Stream live progress of a search workflow.
#[derive(Parser, Debug)]
#[command(name = "search-stream", version)]
pub struct Cli {
    /// Run this query once and exit. Without it, queries are read from stdin,
    /// one per line.
    pub query: Option<String>,
    /// Refinement attempts requested from the server (1-5, default 3).
    #[arg(long, short = 'n')]
    pub max_attempts: Option<String>,
    /// Server origin, overrides `SEARCH_STREAM_BASE_URL`.
    #[arg(long)]
    pub base_url: Option<String>,
    /// Seconds without stream activity before giving up (0 disables).
    #[arg(long)]
    pub idle_timeout_secs: Option<u64>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Plain)]
    pub output: OutputFormat,
    /// Append attempts and flagged sources under the final answer.
    #[arg(long)]
    pub stats: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Line-oriented terminal output.
    Plain,
    /// Results container markup, printed when each search ends.
    Html,
}

impl Cli {
    /// Applies flag overrides on top of env-derived settings.
    pub fn apply(&self, mut config: ClientConfig) -> ClientConfig {
        if let Some(base_url) = &self.base_url {
            config = config.base_url(base_url.clone());
        }
        if let Some(secs) = self.idle_timeout_secs {
            config = config.idle_timeout_secs(secs);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn one_shot_flags() {
        let cli = Cli::try_parse_from([
            "search-stream",
            "rust async",
            "--max-attempts",
            "2",
            "--output",
            "html",
            "--stats",
        ])
        .expect("parse");
        assert_eq!(cli.query.as_deref(), Some("rust async"));
        assert_eq!(cli.max_attempts.as_deref(), Some("2"));
        assert_eq!(cli.output, OutputFormat::Html);
        assert!(cli.stats);
    }

    #[test]
    fn flags_override_config() {
        let cli = Cli::try_parse_from([
            "search-stream",
            "--base-url",
            "http://search.local:9000",
            "--idle-timeout-secs",
            "0",
        ])
        .expect("parse");
        assert!(cli.query.is_none());
        let config = cli.apply(ClientConfig::default());
        assert_eq!(config.search_url(), "http://search.local:9000/search");
        assert_eq!(config.idle_timeout, None);
    }

    #[test]
    fn idle_timeout_kept_without_flag() {
        let cli = Cli::try_parse_from(["search-stream"]).expect("parse");
        let config = cli.apply(ClientConfig::default().idle_timeout(Some(Duration::from_secs(7))));
        assert_eq!(config.idle_timeout, Some(Duration::from_secs(7)));
    }
}
