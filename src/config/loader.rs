//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources using Figment:
//! 1. Built-in defaults (Serialized)
//! 2. Global config (~/.config/docsmith/config.toml)
//! 3. Repository config (<repo>/.ai/config.yaml)
//! 4. Environment variables (DOCSMITH_* prefix, `__` as section separator)
//!
//! CLI overrides are applied by the command layer after loading.

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml, Yaml},
};
use std::env;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::types::Config;
use crate::constants;
use crate::types::{DocError, Result};

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with full resolution chain:
    /// defaults → global → repository → env vars
    ///
    /// `repo_root` is the repository the command targets; `None` skips the
    /// repository layer (batch mode loads per-clone config separately).
    pub fn load(repo_root: Option<&Path>) -> Result<Config> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            debug!("Loading global config from: {}", global_path.display());
            figment = figment.merge(Toml::file(&global_path));
        }

        if let Some(root) = repo_root {
            let repo_config = root.join(constants::REPO_CONFIG_PATH);
            if repo_config.exists() {
                debug!("Loading repository config from: {}", repo_config.display());
                figment = figment.merge(Yaml::file(&repo_config));
            }
        }

        // e.g. DOCSMITH_LLM__MODEL -> llm.model,
        //      DOCSMITH_BATCH__REGISTRY_TOKEN -> batch.registry_token
        figment = figment.merge(Env::prefixed("DOCSMITH_").split("__").lowercase(true));

        let config: Config = figment
            .extract()
            .map_err(|e| DocError::Config(format!("configuration error: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Get path to global config directory (~/.config/docsmith/)
    pub fn global_dir() -> Option<PathBuf> {
        env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                env::var("HOME")
                    .ok()
                    .map(|home| PathBuf::from(home).join(".config"))
            })
            .map(|p| p.join("docsmith"))
    }

    /// Get path to global config file
    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_dir().map(|dir| dir.join("config.toml"))
    }
}
