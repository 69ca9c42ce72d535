//! # Configuration Module
//!
//! Router-wide settings loaded from a file and overridden from the environment.
//!
//! ## File formats
//!
//! The format is chosen by extension: `.yaml` / `.yml` (serde_yaml), `.toml` (toml)
//! or `.json` (serde_json). Every key is optional.
//!
//! ```yaml
//! default_namespace: 'App\Controllers'
//! default_controller: Home
//! default_method: index
//! controller_suffix: Controller
//! translate_uri_dashes: true
//! prioritize: false
//! http_verb: get
//! placeholders:
//!   uuid: '[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}'
//! supported_locales: [en, fr]
//! use_supported_locales_only: true
//! default_locale: en
//! ```
//!
//! ## Environment Variables
//!
//! - `BRRTMVC_DEFAULT_NAMESPACE`
//! - `BRRTMVC_DEFAULT_CONTROLLER`
//! - `BRRTMVC_DEFAULT_METHOD`
//! - `BRRTMVC_CONTROLLER_SUFFIX` (empty disables the suffix)
//! - `BRRTMVC_TRANSLATE_URI_DASHES` (`true` / `false`)
//! - `BRRTMVC_PRIORITIZE` (`true` / `false`)
//!
//! Unparseable boolean values are ignored.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::path::Path;

/// Settings applied to a [`RouteCollection`](crate::collection::RouteCollection).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    pub default_namespace: String,
    pub default_controller: String,
    pub default_method: String,
    /// Class-name suffix added to resolved controllers
    pub controller_suffix: String,
    pub translate_uri_dashes: bool,
    pub prioritize: bool,
    pub http_verb: String,
    /// Extra placeholders merged over the built-ins
    pub placeholders: BTreeMap<String, String>,
    pub supported_locales: Vec<String>,
    pub use_supported_locales_only: bool,
    pub default_locale: String,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            default_namespace: r"App\Controllers".to_string(),
            default_controller: "Home".to_string(),
            default_method: "index".to_string(),
            controller_suffix: "Controller".to_string(),
            translate_uri_dashes: false,
            prioritize: false,
            http_verb: "get".to_string(),
            placeholders: BTreeMap::new(),
            supported_locales: Vec::new(),
            use_supported_locales_only: false,
            default_locale: "en".to_string(),
        }
    }
}

impl RouterConfig {
    /// Load from a file, then apply environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read router config {}", path.display()))?;
        let mut config = Self::parse(path, &content)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Defaults plus environment overrides.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides();
        config
    }

    /// Parse `content` using the format implied by `path`'s extension.
    pub fn parse(path: &Path, content: &str) -> Result<Self> {
        parse_by_extension(path, content)
    }

    pub fn apply_env_overrides(&mut self) {
        if let Ok(value) = env::var("BRRTMVC_DEFAULT_NAMESPACE") {
            self.default_namespace = value;
        }
        if let Ok(value) = env::var("BRRTMVC_DEFAULT_CONTROLLER") {
            self.default_controller = value;
        }
        if let Ok(value) = env::var("BRRTMVC_DEFAULT_METHOD") {
            self.default_method = value;
        }
        if let Ok(value) = env::var("BRRTMVC_CONTROLLER_SUFFIX") {
            self.controller_suffix = value;
        }
        if let Some(value) = env_bool("BRRTMVC_TRANSLATE_URI_DASHES") {
            self.translate_uri_dashes = value;
        }
        if let Some(value) = env_bool("BRRTMVC_PRIORITIZE") {
            self.prioritize = value;
        }
    }
}

fn env_bool(key: &str) -> Option<bool> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

/// Deserialize YAML, TOML or JSON depending on the file extension.
pub(crate) fn parse_by_extension<T>(path: &Path, content: &str) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match extension.as_str() {
        "yaml" | "yml" => serde_yaml::from_str(content)
            .with_context(|| format!("invalid YAML in {}", path.display())),
        "toml" => toml::from_str(content).with_context(|| format!("invalid TOML in {}", path.display())),
        "json" => serde_json::from_str(content)
            .with_context(|| format!("invalid JSON in {}", path.display())),
        other => bail!(
            "unsupported file extension '{other}' for {} (expected yaml, yml, toml or json)",
            path.display()
        ),
    }
}
