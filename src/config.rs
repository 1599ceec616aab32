use std::path::Path;

use serde::Deserialize;

/// Client-side transport settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Port used when a host string carries none.
    pub default_port: u16,
    /// Fail on request paths that are not valid UTF-8 instead of logging
    /// and sending them byte-encoded.
    pub strict_path_encoding: bool,
    /// Upper bound on a status line or header block.
    pub max_header_bytes: usize,
    pub user_agent: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            default_port: 80,
            strict_path_encoding: false,
            max_header_bytes: 64 * 1024,
            user_agent: None,
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by `OIO_HTTP_*` environment variables.
    /// Unparseable values are ignored.
    pub fn load() -> Self {
        let mut cfg = Self::default();

        if let Some(port) = env_parse("OIO_HTTP_DEFAULT_PORT") {
            cfg.default_port = port;
        }
        if let Some(strict) = env_parse("OIO_HTTP_STRICT_PATH") {
            cfg.strict_path_encoding = strict;
        }
        if let Some(max) = env_parse("OIO_HTTP_MAX_HEADER_BYTES") {
            cfg.max_header_bytes = max;
        }
        if let Ok(agent) = std::env::var("OIO_HTTP_USER_AGENT") {
            if !agent.is_empty() {
                cfg.user_agent = Some(agent);
            }
        }

        cfg
    }

    pub fn from_yaml_str(raw: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(raw)?)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("reading {}: {e}", path.display()))?;
        Self::from_yaml_str(&raw)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "ignoring unparseable setting");
            None
        }
    }
}
