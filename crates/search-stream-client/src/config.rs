use std::time::Duration;

use crate::errors::ClientError;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_ENDPOINT: &str = "/search";
/// Workflow node whose completion carries the generated plan.
pub const DEFAULT_PLANNING_NODE: &str = "generate_plan";

/// Configuration for the search stream client.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Server origin, e.g. `http://127.0.0.1:8000`.
    pub base_url: String,
    /// Path of the streaming search endpoint.
    pub endpoint: String,
    /// TCP connect timeout for opening the stream.
    pub connect_timeout: Duration,
    /// Longest allowed gap between two stream messages. `None` waits forever.
    pub idle_timeout: Option<Duration>,
    /// Node name whose `plan` gets rendered.
    pub planning_node: String,
    /// Bounded buffer between session tasks and the controller.
    pub channel_capacity: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            connect_timeout: Duration::from_secs(10),
            idle_timeout: Some(Duration::from_secs(300)),
            planning_node: DEFAULT_PLANNING_NODE.to_string(),
            channel_capacity: 64,
        }
    }
}

impl ClientConfig {
    /// Creates a config pointing at the given server origin.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Builds a config from `SEARCH_STREAM_*` environment variables.
    ///
    /// - `SEARCH_STREAM_BASE_URL`
    /// - `SEARCH_STREAM_ENDPOINT`
    /// - `SEARCH_STREAM_CONNECT_TIMEOUT_SECS`
    /// - `SEARCH_STREAM_IDLE_TIMEOUT_SECS` (`0` disables the liveness timeout)
    /// - `SEARCH_STREAM_PLANNING_NODE`
    ///
    /// Unset or blank variables keep their defaults.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ClientError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();
        if let Some(base_url) = get("SEARCH_STREAM_BASE_URL") {
            config.base_url = base_url.trim().to_string();
        }
        if let Some(endpoint) = get("SEARCH_STREAM_ENDPOINT") {
            config.endpoint = endpoint.trim().to_string();
        }
        if let Some(raw) = get("SEARCH_STREAM_CONNECT_TIMEOUT_SECS") {
            config.connect_timeout = Duration::from_secs(parse_secs(
                "SEARCH_STREAM_CONNECT_TIMEOUT_SECS",
                &raw,
            )?);
        }
        if let Some(raw) = get("SEARCH_STREAM_IDLE_TIMEOUT_SECS") {
            config = config.idle_timeout_secs(parse_secs("SEARCH_STREAM_IDLE_TIMEOUT_SECS", &raw)?);
        }
        if let Some(node) = get("SEARCH_STREAM_PLANNING_NODE") {
            config.planning_node = node.trim().to_string();
        }
        config.validate()?;
        Ok(config)
    }

    /// Overrides the server origin.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Overrides the endpoint path.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Overrides the connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the liveness timeout; `None` disables it.
    pub fn idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Sets the liveness timeout in whole seconds; `0` disables it.
    pub fn idle_timeout_secs(self, secs: u64) -> Self {
        self.idle_timeout((secs > 0).then(|| Duration::from_secs(secs)))
    }

    /// Overrides the planning node name.
    pub fn planning_node(mut self, node: impl Into<String>) -> Self {
        self.planning_node = node.into();
        self
    }

    /// Checks that the config can produce a usable stream URL.
    pub fn validate(&self) -> Result<(), ClientError> {
        let base = self.base_url.trim();
        if base.is_empty() {
            return Err(ClientError::Config("base_url must not be empty".into()));
        }
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ClientError::Config(format!(
                "base_url must start with http:// or https://, got {base}"
            )));
        }
        if self.channel_capacity == 0 {
            return Err(ClientError::Config(
                "channel_capacity must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// Full URL of the search endpoint, without query string.
    pub fn search_url(&self) -> String {
        let endpoint = self.endpoint.trim();
        let endpoint = endpoint.trim_start_matches('/');
        format!("{}/{}", self.base_url.trim().trim_end_matches('/'), endpoint)
    }
}

fn parse_secs(key: &str, raw: &str) -> Result<u64, ClientError> {
    raw.trim()
        .parse::<u64>()
        .map_err(|e| ClientError::Config(format!("{key} must be a whole number of seconds: {e}")))
}
