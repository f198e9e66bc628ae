use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

use crate::http::router::PrefixMatch;

/// What the accept loop does when `accept` fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AcceptErrorPolicy {
    /// Log the failure and keep accepting.
    #[default]
    Skip,
    /// Stop the server with the error.
    Exit,
}

impl AcceptErrorPolicy {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "skip" => Some(AcceptErrorPolicy::Skip),
            "exit" => Some(AcceptErrorPolicy::Exit),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub listen_addr: String,
    /// Serving directory for the `/files` handlers.
    pub directory: PathBuf,
    pub read_buffer_size: usize,
    /// `0` disables the read deadline.
    pub read_timeout_secs: u64,
    pub prefix_matching: PrefixMatch,
    pub accept_errors: AcceptErrorPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:4221".to_string(),
            directory: PathBuf::from("."),
            read_buffer_size: 1024,
            read_timeout_secs: 30,
            prefix_matching: PrefixMatch::Raw,
            accept_errors: AcceptErrorPolicy::Skip,
        }
    }
}

impl Config {
    /// Loads configuration from the process environment.
    pub fn load() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from a key lookup, falling back to defaults for
    /// missing or unparsable values.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(addr) = lookup("LISTEN") {
            cfg.listen_addr = addr;
        }
        if let Some(dir) = lookup("DIRECTORY") {
            cfg.directory = PathBuf::from(dir);
        }
        if let Some(size) = lookup("READ_BUFFER_SIZE").and_then(|v| v.parse().ok()) {
            cfg.read_buffer_size = size;
        }
        if let Some(secs) = lookup("READ_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            cfg.read_timeout_secs = secs;
        }
        if let Some(mode) = lookup("PREFIX_MATCHING").and_then(|v| PrefixMatch::from_str(&v)) {
            cfg.prefix_matching = mode;
        }
        if let Some(policy) =
            lookup("ACCEPT_ERRORS").and_then(|v| AcceptErrorPolicy::from_str(&v))
        {
            cfg.accept_errors = policy;
        }

        cfg
    }

    /// Loads configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_yaml(&raw)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    pub fn from_yaml(raw: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(raw)?)
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        (self.read_timeout_secs > 0).then(|| Duration::from_secs(self.read_timeout_secs))
    }
}
