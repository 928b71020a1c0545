use crate::error::DefinitionError;
use crate::operator::{OperatorRegistry, default_registry};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::{Arc, LazyLock};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// Settings loaded from a TOML file.
///
/// ```toml
/// [filters]
/// veterans = '{"user.level": {"$gte": 50}}'
///
/// [aliases]
/// "$is" = "$eq"
///
/// [output]
/// pretty = true
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Saved filters by name, as query text.
    pub filters: BTreeMap<String, String>,
    /// Extra operator names mapped onto existing operators.
    pub aliases: BTreeMap<String, String>,
    pub output: OutputRules,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputRules {
    /// Pretty-print JSON output
    pub pretty: bool,
    /// Include matched documents in reports, not just their indices
    pub show_documents: bool,
}

impl FilterConfig {
    /// Operator registry for this configuration.
    ///
    /// Without aliases this is the shared default registry. Otherwise the
    /// defaults are copied and the aliases are added to the copy.
    pub fn registry(&self) -> Result<Arc<OperatorRegistry>, DefinitionError> {
        if self.aliases.is_empty() {
            return Ok(default_registry());
        }

        let mut registry = OperatorRegistry::clone(&default_registry());
        for (alias, target) in &self.aliases {
            registry.alias(alias, target)?;
        }
        Ok(Arc::new(registry))
    }

    pub fn saved_filter(&self, name: &str) -> Option<&str> {
        self.filters.get(name).map(String::as_str)
    }
}

pub fn load_config(path: Option<&Path>) -> Result<FilterConfig, ConfigError> {
    if let Some(path) = path {
        load_config_from_path(path)
    } else {
        Ok(default_config().clone())
    }
}

pub fn load_config_from_path(path: &Path) -> Result<FilterConfig, ConfigError> {
    let path_display = path.display().to_string();
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path_display.clone(),
        source,
    })?;

    toml::from_str::<FilterConfig>(&raw).map_err(|source| ConfigError::Parse {
        path: path_display,
        source,
    })
}

pub fn default_config() -> &'static FilterConfig {
    static DEFAULT_CONFIG: LazyLock<FilterConfig> = LazyLock::new(FilterConfig::default);
    &DEFAULT_CONFIG
}
