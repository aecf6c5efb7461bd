//! Configuration for command-line runs
//!
//! A run is described in YAML: which HTTP source to page through, how to
//! paginate it, where cursors are cached and, optionally, which items to keep.
//!
//! ```yaml
//! paginator:
//!   per_page: 20
//!   batch_size: 50
//! source:
//!   url: https://api.example.com/v1/events
//!   records_path: data
//!   cursor_path: next_cursor
//!   cursor_param: starting_after
//!   params:
//!     order: asc
//! cache:
//!   path: .cursor-cache.json
//! filter:
//!   path: status
//!   equals: active
//! ```

use crate::error::{Error, Result};
use crate::pagination::{Filter, PaginatorConfig};
use crate::source::{extract_path, HttpSourceConfig};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete run configuration loaded from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagerConfig {
    /// Page and batch sizes
    pub paginator: PaginatorConfig,

    /// HTTP source definition
    pub source: HttpSourceConfig,

    /// Cursor cache settings
    #[serde(default)]
    pub cache: CacheConfig,

    /// Optional item filter
    #[serde(default)]
    pub filter: Option<FieldFilter>,
}

impl PagerConfig {
    /// Validate every section
    pub fn validate(&self) -> Result<()> {
        self.paginator.validate()?;
        self.source.validate()?;
        if self.cache.path.as_os_str().is_empty() {
            return Err(Error::missing_field("cache.path"));
        }
        if let Some(filter) = &self.filter {
            if filter.path.is_empty() {
                return Err(Error::invalid_value("filter.path", "cannot be empty"));
            }
        }
        Ok(())
    }

    /// Item filter for the paginator (identity when none is configured)
    pub fn item_filter(&self) -> Filter<Value> {
        self.filter
            .as_ref()
            .map_or_else(Filter::all, FieldFilter::to_filter)
    }
}

// ============================================================================
// Cache Config
// ============================================================================

/// Where cursor state is persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Cache file path
    #[serde(default = "default_cache_path")]
    pub path: PathBuf,

    /// Write the file once a command finishes. `false` leaves it untouched.
    #[serde(default = "default_auto_save")]
    pub auto_save: bool,
}

fn default_cache_path() -> PathBuf {
    PathBuf::from(".cursor-cache.json")
}

fn default_auto_save() -> bool {
    true
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: default_cache_path(),
            auto_save: default_auto_save(),
        }
    }
}

// ============================================================================
// Filter Config
// ============================================================================

/// Keep records whose field at `path` equals `equals`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldFilter {
    /// Dot path to the field
    pub path: String,
    /// Required value
    pub equals: Value,
}

impl FieldFilter {
    /// Create a field filter
    pub fn new(path: impl Into<String>, equals: impl Into<Value>) -> Self {
        Self {
            path: path.into(),
            equals: equals.into(),
        }
    }

    /// Cache namespace key, e.g. `status="active"`
    pub fn key(&self) -> String {
        format!("{}={}", self.path, self.equals)
    }

    /// Build the item predicate
    pub fn to_filter(&self) -> Filter<Value> {
        let path = self.path.clone();
        let expected = self.equals.clone();
        Filter::new(self.key(), move |item: &Value| {
            extract_path(item, &path) == Some(&expected)
        })
    }
}

// ============================================================================
// Loading
// ============================================================================

/// Load a run configuration from a YAML file
pub fn load_config(path: impl AsRef<Path>) -> Result<PagerConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::FileNotFound {
                path: path.display().to_string(),
            }
        } else {
            Error::Io(e)
        }
    })?;
    load_config_from_str(&content)
}

/// Load a run configuration from a YAML string
pub fn load_config_from_str(yaml: &str) -> Result<PagerConfig> {
    let config: PagerConfig = serde_yaml::from_str(yaml)?;

    config.validate()?;
    Ok(config)
}
