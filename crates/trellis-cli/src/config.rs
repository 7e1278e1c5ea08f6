//! CLI configuration
//!
//! Stored as TOML at `~/.trellis/config.toml` unless `--config` points
//! elsewhere. A missing file means defaults.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use trellis_core::TypeRegistry;

use crate::output::OutputFormat;

/// Get default data directory
pub fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".trellis")
}

/// Default location of the config file
pub fn config_file_path() -> PathBuf {
    default_data_dir().join("config.toml")
}

/// How stored type metadata is interpreted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolverKind {
    /// Honor `trellis_type` and the `[types]` hierarchy
    #[default]
    Polymorphic,
    /// Ignore type metadata
    Untyped,
}

impl fmt::Display for ResolverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Polymorphic => write!(f, "polymorphic"),
            Self::Untyped => write!(f, "untyped"),
        }
    }
}

impl FromStr for ResolverKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "polymorphic" => Ok(Self::Polymorphic),
            "untyped" => Ok(Self::Untyped),
            other => anyhow::bail!("Unknown resolver '{}' (expected polymorphic or untyped)", other),
        }
    }
}

/// Configuration for the CLI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data_dir: PathBuf,
    pub default_format: String,
    pub resolver: ResolverKind,
    /// Frame type name → parent type name
    pub types: BTreeMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            default_format: "table".to_string(),
            resolver: ResolverKind::default(),
            types: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Scalar keys accepted by `get` and `set`. Type entries use `types.<Name>`.
    pub fn keys() -> &'static [&'static str] {
        &["data_dir", "default_format", "resolver"]
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        tracing::debug!("Wrote config to {}", path.display());
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "data_dir" => Some(self.data_dir.display().to_string()),
            "default_format" => Some(self.default_format.clone()),
            "resolver" => Some(self.resolver.to_string()),
            _ => key
                .strip_prefix("types.")
                .and_then(|name| self.types.get(name).cloned()),
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        match key {
            "data_dir" => self.data_dir = PathBuf::from(value),
            "default_format" => {
                value.parse::<OutputFormat>()?;
                self.default_format = value.to_lowercase();
            }
            "resolver" => self.resolver = value.parse()?,
            _ => match key.strip_prefix("types.") {
                Some(name) => {
                    let mut types = self.types.clone();
                    types.insert(name.to_string(), value.to_string());
                    build_registry(&types)?;
                    self.types = types;
                }
                None => anyhow::bail!(
                    "Unknown config key: {} (available: {}, types.<Name>)",
                    key,
                    Self::keys().join(", ")
                ),
            },
        }
        Ok(())
    }

    /// Type hierarchy declared under `[types]`
    pub fn type_registry(&self) -> anyhow::Result<TypeRegistry> {
        build_registry(&self.types)
    }
}

fn build_registry(types: &BTreeMap<String, String>) -> anyhow::Result<TypeRegistry> {
    let mut registry = TypeRegistry::new();
    registry
        .register_all(types.iter())
        .context("Invalid [types] table")?;
    Ok(registry)
}
