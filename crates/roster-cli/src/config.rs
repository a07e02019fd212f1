// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use roster_app::{DEFAULT_DEBOUNCE, DEFAULT_PAGE_SIZE, MAX_DEBOUNCE};
use roster_testkit::MOCK_LATENCY;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_PATH_ENV: &str = "ROSTER_CONFIG_PATH";

const CONFIG_VERSION: i64 = 1;
const DEFAULT_BASE_URL: &str = "http://localhost:3000/api";
const DEFAULT_TIMEOUT: &str = "10s";
const DEFAULT_LOG_LEVEL: &str = "warn";
const MAX_TIMEOUT: Duration = Duration::from_secs(60 * 60);
const MAX_DEMO_LATENCY: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub api: Api,
    #[serde(default)]
    pub list: List,
    #[serde(default)]
    pub storage: Storage,
    #[serde(default)]
    pub demo: Demo,
    #[serde(default)]
    pub log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            api: Api::default(),
            list: List::default(),
            storage: Storage::default(),
            demo: Demo::default(),
            log: Log::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Api {
    pub base_url: Option<String>,
    pub timeout: Option<String>,
}

impl Default for Api {
    fn default() -> Self {
        Self {
            base_url: Some(DEFAULT_BASE_URL.to_owned()),
            timeout: Some(DEFAULT_TIMEOUT.to_owned()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct List {
    pub page_size: Option<i64>,
    pub debounce: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Storage {
    pub prefs_path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Demo {
    pub latency: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Log {
    pub level: Option<String>,
}

impl Default for Log {
    fn default() -> Self {
        Self {
            level: Some(DEFAULT_LOG_LEVEL.to_owned()),
        }
    }
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os(CONFIG_PATH_ENV) {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set {CONFIG_PATH_ENV} to the config file")
        })?;

        let app_dir = config_root.join(roster_store::APP_NAME);
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("create config directory {}", app_dir.display()))?;
        Ok(app_dir.join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} has no version. Add `version = 1` and put values under [api], [list], [storage], [demo], and [log]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if let Some(base_url) = &self.api.base_url
            && base_url.trim().is_empty()
        {
            bail!("api.base_url in {} must not be empty", path.display());
        }

        if let Some(timeout) = &self.api.timeout {
            let parsed = parse_duration(timeout)?;
            if parsed == Duration::ZERO {
                bail!(
                    "api.timeout in {} must be positive, got {}",
                    path.display(),
                    timeout
                );
            }
            check_at_most("api.timeout", timeout, parsed, MAX_TIMEOUT, path)?;
        }

        if let Some(page_size) = self.list.page_size
            && page_size <= 0
        {
            bail!(
                "list.page_size in {} must be positive, got {}",
                path.display(),
                page_size
            );
        }

        if let Some(debounce) = &self.list.debounce {
            let parsed = parse_duration(debounce)?;
            check_at_most("list.debounce", debounce, parsed, MAX_DEBOUNCE, path)?;
        }
        if let Some(latency) = &self.demo.latency {
            let parsed = parse_duration(latency)?;
            check_at_most("demo.latency", latency, parsed, MAX_DEMO_LATENCY, path)?;
        }

        if let Some(prefs_path) = &self.storage.prefs_path {
            roster_store::validate_prefs_path(prefs_path)?;
        }

        Ok(())
    }

    pub fn base_url(&self) -> &str {
        self.api
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
    }

    pub fn timeout(&self) -> Result<Duration> {
        parse_duration(self.api.timeout.as_deref().unwrap_or(DEFAULT_TIMEOUT))
    }

    /// None means each collection keeps its own default.
    pub fn page_size(&self) -> Option<usize> {
        self.list
            .page_size
            .and_then(|page_size| usize::try_from(page_size).ok())
    }

    pub fn debounce(&self) -> Result<Duration> {
        match &self.list.debounce {
            Some(raw) => parse_duration(raw),
            None => Ok(DEFAULT_DEBOUNCE),
        }
    }

    pub fn demo_latency(&self) -> Result<Duration> {
        match &self.demo.latency {
            Some(raw) => parse_duration(raw),
            None => Ok(MOCK_LATENCY),
        }
    }

    pub fn log_level(&self) -> &str {
        self.log.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn prefs_path(&self) -> Result<PathBuf> {
        match &self.storage.prefs_path {
            Some(path) => Ok(PathBuf::from(path)),
            None => roster_store::default_prefs_path(),
        }
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# roster config\n# Place this file at: {}\n\nversion = 1\n\n[api]\nbase_url = \"{}\"\ntimeout = \"{}\"\n\n[list]\n# Optional. Products default to 5 rows per page, users to {}\n# page_size = 10\ndebounce = \"{}ms\"\n\n[storage]\n# Optional. Default is platform data dir (for example ~/.local/share/roster/prefs.db)\n# prefs_path = \"/absolute/path/to/prefs.db\"\n\n[demo]\nlatency = \"{}ms\"\n\n[log]\n# Overridden by RUST_LOG\nlevel = \"{}\"\n",
            path.display(),
            DEFAULT_BASE_URL,
            DEFAULT_TIMEOUT,
            DEFAULT_PAGE_SIZE,
            DEFAULT_DEBOUNCE.as_millis(),
            MOCK_LATENCY.as_millis(),
            DEFAULT_LOG_LEVEL,
        )
    }
}

fn check_at_most(
    key: &str,
    raw: &str,
    parsed: Duration,
    max: Duration,
    path: &Path,
) -> Result<()> {
    if parsed > max {
        bail!(
            "{key} in {} must be at most {}s, got {raw}",
            path.display(),
            max.as_secs()
        );
    }
    Ok(())
}

fn parse_duration(raw: &str) -> Result<Duration> {
    let raw = raw.trim();
    if let Some(value) = raw.strip_suffix("ms") {
        let millis: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(value) = raw.strip_suffix('s') {
        let secs: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_secs(secs));
    }
    if let Some(value) = raw.strip_suffix('m') {
        let mins: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        let secs = mins
            .checked_mul(60)
            .ok_or_else(|| anyhow!("duration {raw:?} is too large"))?;
        return Ok(Duration::from_secs(secs));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 300ms or 10s)")
}
