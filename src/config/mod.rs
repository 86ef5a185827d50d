//! Session configuration (layered: code > env > config file).

use std::fs;
use std::path::{Path, PathBuf};

use bon::Builder;
use serde::{Deserialize, Serialize};

use crate::error::PalaverError;

pub const DEFAULT_RUN_LOOP_LIMIT: usize = 10;
pub const DEFAULT_MAX_CONCURRENT_TOOL_CALLS: usize = 3;
pub const DEFAULT_STREAM_BUFFER: usize = 32;

/// Limits applied to every run of a [`crate::session::Session`].
#[derive(Debug, Clone, Copy, Builder, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SessionConfig {
    /// Maximum model round-trips per run.
    #[builder(default = DEFAULT_RUN_LOOP_LIMIT)]
    pub run_loop_limit: usize,
    /// Maximum tool calls executing at once within one turn.
    #[builder(default = DEFAULT_MAX_CONCURRENT_TOOL_CALLS)]
    pub max_concurrent_tool_calls: usize,
    /// Capacity of the channel between a streaming run and its consumer.
    #[builder(default = DEFAULT_STREAM_BUFFER)]
    pub stream_buffer: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            run_loop_limit: DEFAULT_RUN_LOOP_LIMIT,
            max_concurrent_tool_calls: DEFAULT_MAX_CONCURRENT_TOOL_CALLS,
            stream_buffer: DEFAULT_STREAM_BUFFER,
        }
    }
}

impl SessionConfig {
    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(raw: &str) -> Result<Self, PalaverError> {
        toml::from_str(raw).map_err(|err| PalaverError::Configuration(err.to_string()))
    }

    /// Read a TOML config file. A missing file yields the defaults.
    pub fn from_file(path: &Path) -> Result<Self, PalaverError> {
        match fs::read_to_string(path) {
            Ok(raw) => Self::from_toml_str(&raw),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(PalaverError::Io(err)),
        }
    }

    /// Apply `PALAVER_*` environment overrides on top of `self`.
    pub fn with_env_overrides(self) -> Result<Self, PalaverError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Defaults, then `~/.palaver/config.toml`, then environment (including
    /// a `.env` file if present).
    pub fn load() -> Result<Self, PalaverError> {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        Self::from_file(&default_config_path())?.with_env_overrides()
    }

    fn with_overrides<F>(mut self, lookup: F) -> Result<Self, PalaverError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mappings: [(&str, &mut usize); 3] = [
            ("PALAVER_RUN_LOOP_LIMIT", &mut self.run_loop_limit),
            (
                "PALAVER_MAX_CONCURRENT_TOOL_CALLS",
                &mut self.max_concurrent_tool_calls,
            ),
            ("PALAVER_STREAM_BUFFER", &mut self.stream_buffer),
        ];
        for (env_var, slot) in mappings {
            if let Some(raw) = lookup(env_var) {
                *slot = raw.trim().parse().map_err(|_| {
                    PalaverError::Configuration(format!("{env_var} must be a non-negative integer, got '{raw}'"))
                })?;
            }
        }
        Ok(self)
    }

    pub(crate) fn effective_concurrency(&self) -> usize {
        self.max_concurrent_tool_calls.max(1)
    }

    pub(crate) fn effective_stream_buffer(&self) -> usize {
        self.stream_buffer.max(1)
    }
}

/// `~/.palaver/config.toml`, or a relative `.palaver/config.toml` when no
/// home directory is known.
pub fn default_config_path() -> PathBuf {
    directories::UserDirs::new()
        .map(|dirs| dirs.home_dir().join(".palaver"))
        .unwrap_or_else(|| PathBuf::from(".palaver"))
        .join("config.toml")
}
