use std::path::Path;
use std::str::FromStr;

use anyhow::Context;
use serde::Deserialize;

pub const DEFAULT_HELIX_URL: &str = "http://localhost:6969";
pub const DEFAULT_GATEWAY_URL: &str = "http://localhost:8000";
pub const DEFAULT_BIND: &str = "127.0.0.1:8000";

pub const PAGE_SIZES: [usize; 7] = [1, 5, 10, 15, 20, 50, 100];
pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const MAX_VISIBLE_PAGES: usize = 5;

pub const DEFAULT_SEARCH_K: usize = 10;
pub const DEFAULT_VECTOR_DIMENSIONS: usize = 5;
pub const NOTIFICATION_DISMISS_MS: u64 = 5000;
pub const CONTENT_PREVIEW_CHARS: usize = 25;

/// Which client transport backs the UI and the walkthrough.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// The gateway API, array-wrapped responses.
    Api,
    /// HelixDB itself, bare object responses.
    Sdk,
}

impl FromStr for TransportKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "api" => Ok(TransportKind::Api),
            "sdk" => Ok(TransportKind::Sdk),
            other => anyhow::bail!("unknown transport {:?}, expected \"api\" or \"sdk\"", other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HelixDB base URL
    pub helix_url: String,

    /// Gateway API base URL, used by the `api` transport
    pub gateway_url: String,

    pub transport: TransportKind,

    /// Address the web server binds to
    pub bind: String,

    /// tracing env filter
    pub log_level: String,

    /// Create the sample users/posts when the server starts
    pub seed_on_start: bool,

    /// Number of vector inputs the post and search forms start with
    pub vector_dimensions: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            helix_url: DEFAULT_HELIX_URL.to_string(),
            gateway_url: DEFAULT_GATEWAY_URL.to_string(),
            transport: TransportKind::Sdk,
            bind: DEFAULT_BIND.to_string(),
            log_level: "info".to_string(),
            seed_on_start: false,
            vector_dimensions: DEFAULT_VECTOR_DIMENSIONS,
        }
    }
}

impl Config {
    /// Optional TOML file first, then `QUICKSTART_*` environment overrides.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("reading config file {}", path.display()))?;
                Self::from_toml(&raw)
                    .with_context(|| format!("parsing config file {}", path.display()))?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// `lookup` is `std::env::var` outside of tests.
    pub fn apply_env<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("QUICKSTART_HELIX_URL") {
            self.helix_url = v;
        }
        if let Some(v) = lookup("QUICKSTART_GATEWAY_URL") {
            self.gateway_url = v;
        }
        if let Some(v) = lookup("QUICKSTART_TRANSPORT") {
            self.transport = v.parse()?;
        }
        if let Some(v) = lookup("QUICKSTART_BIND") {
            self.bind = v;
        }
        if let Some(v) = lookup("QUICKSTART_LOG") {
            self.log_level = v;
        }
        Ok(())
    }
}
