//! Checker configuration.
//!
//! [`CheckConfig`] is what the checker reads: the oplog source, the release identifier, and the
//! engines used to validate selectors and sort specifiers. [`AppConfig`] is the file/env layer the
//! CLI resolves into a `CheckConfig`.

use crate::errors::OplogError;
use crate::query::{DocumentEngine, MatchingEngine, SortEngine};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const ENV_OPLOG_URL: &str = "MONGO_OPLOG_URL";
pub const ENV_RELEASE: &str = "OPLOGCHECK_RELEASE";
pub const ENV_CONFIG: &str = "OPLOGCHECK_CONFIG";
pub const ENV_LOG_DIR: &str = "OPLOGCHECK_LOG_DIR";
pub const ENV_LOG_LEVEL: &str = "OPLOGCHECK_LOG_LEVEL";

#[derive(Clone)]
pub struct CheckConfig {
    pub oplog_url: Option<String>,
    pub release: Option<String>,
    /// `None` means the matcher is unavailable; selectors are then assumed supported.
    pub matcher: Option<Arc<dyn MatchingEngine>>,
    /// `None` means sort specifiers are not validated.
    pub sorter: Option<Arc<dyn SortEngine>>,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            oplog_url: None,
            release: None,
            matcher: Some(Arc::new(DocumentEngine)),
            sorter: Some(Arc::new(DocumentEngine)),
        }
    }
}

impl fmt::Debug for CheckConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckConfig")
            .field("oplog_url", &self.oplog_url.as_ref().map(|_| "<set>"))
            .field("release", &self.release)
            .field("matcher", &self.matcher.is_some())
            .field("sorter", &self.sorter.is_some())
            .finish()
    }
}

impl CheckConfig {
    /// Read the oplog URL and release from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Same as [`CheckConfig::from_env`] with an explicit variable source.
    /// Read the env layer. Blank values count as unset so they do not hide config files.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let lookup = |key: &str| lookup(key).filter(|s| !s.trim().is_empty());
        Self {
            oplog_url: lookup(ENV_OPLOG_URL).filter(|s| !s.trim().is_empty()),
            release: lookup(ENV_RELEASE).filter(|s| !s.trim().is_empty()),
            ..Self::default()
        }
    }

    pub fn with_oplog_url(mut self, url: impl Into<String>) -> Self {
        self.oplog_url = Some(url.into());
        self
    }

    pub fn with_release(mut self, release: impl Into<String>) -> Self {
        self.release = Some(release.into());
        self
    }

    pub fn with_matcher(mut self, engine: Option<Arc<dyn MatchingEngine>>) -> Self {
        self.matcher = engine;
        self
    }

    pub fn with_sorter(mut self, engine: Option<Arc<dyn SortEngine>>) -> Self {
        self.sorter = engine;
        self
    }

    pub fn has_oplog_source(&self) -> bool {
        self.oplog_url.as_deref().is_some_and(|s| !s.trim().is_empty())
    }

    /// A checkout reports no release, an empty one, or the literal `none`.
    pub fn official_release(&self) -> Option<&str> {
        self.release
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty() && !r.eq_ignore_ascii_case("none"))
    }
}

/// File/env configuration for the CLI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub oplog_url: Option<String>,
    pub release: Option<String>,
    /// Set to `false` to run without the matching engine.
    pub matcher: Option<bool>,
    pub log_dir: Option<PathBuf>,
    pub log_level: Option<String>,
}

impl AppConfig {
    /// # Errors
    /// Returns an error if the file cannot be read or is not valid TOML.
    pub fn from_file(path: &Path) -> Result<Self, OplogError> {
        let s = std::fs::read_to_string(path)
            .map_err(|e| OplogError::Config(format!("{}: {e}", path.display())))?;
        Ok(toml::from_str(&s)?)
    }

    /// Fill unset fields from `other`; fields already set win.
    pub fn merge_missing(&mut self, other: Self) {
        if self.oplog_url.is_none() {
            self.oplog_url = other.oplog_url;
        }
        if self.release.is_none() {
            self.release = other.release;
        }
        if self.matcher.is_none() {
            self.matcher = other.matcher;
        }
        if self.log_dir.is_none() {
            self.log_dir = other.log_dir;
        }
        if self.log_level.is_none() {
            self.log_level = other.log_level;
        }
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            oplog_url: lookup(ENV_OPLOG_URL),
            release: lookup(ENV_RELEASE),
            matcher: None,
            log_dir: lookup(ENV_LOG_DIR).map(PathBuf::from),
            log_level: lookup(ENV_LOG_LEVEL),
        }
    }

    /// Candidate config files in lookup order.
    pub fn search_paths(cli_cfg: Option<&Path>) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = vec![];
        if let Some(p) = cli_cfg {
            paths.push(p.to_path_buf());
        }
        if let Ok(p) = std::env::var(ENV_CONFIG) {
            paths.push(PathBuf::from(p));
        }
        if let Some(dir) = dirs_next::config_dir() {
            paths.push(dir.join("oplogcheck.toml"));
        }
        if let Ok(cur) = std::env::current_dir() {
            paths.push(cur.join("oplogcheck.toml"));
        }
        paths
    }

    /// Resolve configuration with precedence `overrides` > env > config files > defaults.
    ///
    /// # Errors
    /// An explicitly requested file (`cli_cfg`) that cannot be loaded is an error. Other
    /// candidates are skipped with a warning.
    pub fn load(overrides: Self, cli_cfg: Option<&Path>) -> Result<Self, OplogError> {
        let mut cfg = overrides;
        cfg.merge_missing(Self::from_lookup(|k| std::env::var(k).ok()));
        for p in Self::search_paths(cli_cfg) {
            if !p.exists() {
                if cli_cfg == Some(p.as_path()) {
                    return Err(OplogError::Config(format!("config file not found: {}", p.display())));
                }
                continue;
            }
            match Self::from_file(&p) {
                Ok(file_cfg) => cfg.merge_missing(file_cfg),
                Err(e) if cli_cfg == Some(p.as_path()) => return Err(e),
                Err(e) => log::warn!("skipping config {}: {e}", p.display()),
            }
        }
        Ok(cfg)
    }

    pub fn into_check_config(self) -> CheckConfig {
        let mut cfg = CheckConfig { oplog_url: self.oplog_url, release: self.release, ..CheckConfig::default() };
        if self.matcher == Some(false) {
            cfg.matcher = None;
        }
        cfg
    }
}
