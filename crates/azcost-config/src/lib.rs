//! Configuration for azcost.
//!
//! Settings are read from `~/.azcost/config.yaml` (or an explicit path).
//! Every field has a default, so an absent default file is not an error.
//!
//! ```yaml
//! subscription_id: 00000000-0000-0000-0000-000000000000
//! top_n: 10
//! max_concurrent_queries: 4
//! output_dir: ./reports
//! ```

use std::path::{Path, PathBuf};

use azcost_core::{AzcostError, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default Azure Resource Manager endpoint.
pub const DEFAULT_MANAGEMENT_ENDPOINT: &str = "https://management.azure.com";

/// Default file name for the per-resource export.
pub const DEFAULT_DETAILED_FILE: &str = "azure_detailed_costs.csv";

/// Default file name for the per-resource-group export.
pub const DEFAULT_SUMMARY_FILE: &str = "azure_rg_summary.csv";

/// Currency codes recognized by name before falling back to the
/// three-uppercase-letters shape.
pub const DEFAULT_CURRENCY_CODES: &[&str] = azcost_cost::KNOWN_CURRENCIES;

/// azcost configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AzcostConfig {
    /// Subscription to report on (defaults to the session's subscription)
    pub subscription_id: Option<String>,

    /// Azure Resource Manager base URL
    pub management_endpoint: String,

    /// HTTP request timeout in seconds
    pub timeout_secs: u64,

    /// Number of resources shown in the "most expensive" table
    pub top_n: usize,

    /// Maximum cost queries in flight at once (1 = strictly sequential)
    pub max_concurrent_queries: usize,

    /// Directory export files are written to
    pub output_dir: PathBuf,

    /// File name for the per-resource export
    pub detailed_file: String,

    /// File name for the per-resource-group export
    pub summary_file: String,

    /// Currency codes recognized by name
    pub currency_codes: Vec<String>,
}

impl Default for AzcostConfig {
    fn default() -> Self {
        Self {
            subscription_id: None,
            management_endpoint: DEFAULT_MANAGEMENT_ENDPOINT.to_string(),
            timeout_secs: 60,
            top_n: 10,
            max_concurrent_queries: 1,
            output_dir: PathBuf::from("."),
            detailed_file: DEFAULT_DETAILED_FILE.to_string(),
            summary_file: DEFAULT_SUMMARY_FILE.to_string(),
            currency_codes: DEFAULT_CURRENCY_CODES
                .iter()
                .map(|c| c.to_string())
                .collect(),
        }
    }
}

impl AzcostConfig {
    /// Load configuration.
    ///
    /// With `Some(path)` the file must exist. With `None` the default
    /// location is tried and defaults are used when it is absent.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => {
                    debug!("no configuration file found, using defaults");
                    Self::default()
                }
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Parse a configuration file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| AzcostError::config_not_found_with_source(path, e))?;

        let config = Self::from_yaml(&contents).map_err(|e| AzcostError::ConfigInvalid {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Parse configuration from a YAML string. An empty document yields defaults.
    pub fn from_yaml(contents: &str) -> std::result::Result<Self, serde_yaml::Error> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(contents)
    }

    /// Reject values the report cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.top_n == 0 {
            return Err(AzcostError::validation("top_n must be greater than zero"));
        }
        if self.max_concurrent_queries == 0 {
            return Err(AzcostError::validation(
                "max_concurrent_queries must be greater than zero",
            ));
        }
        if self.timeout_secs == 0 {
            return Err(AzcostError::validation("timeout_secs must be greater than zero"));
        }
        if self.management_endpoint.trim().is_empty() {
            return Err(AzcostError::validation("management_endpoint must not be empty"));
        }
        Ok(())
    }

    /// Override the subscription.
    pub fn with_subscription_id(mut self, subscription_id: impl Into<String>) -> Self {
        self.subscription_id = Some(subscription_id.into());
        self
    }

    /// Override the number of top resources shown.
    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    /// Override the query fan-out.
    pub fn with_max_concurrent_queries(mut self, max: usize) -> Self {
        self.max_concurrent_queries = max;
        self
    }

    /// Override the export directory.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Full path of the per-resource export.
    pub fn detailed_path(&self) -> PathBuf {
        self.output_dir.join(&self.detailed_file)
    }

    /// Full path of the per-resource-group export.
    pub fn summary_path(&self) -> PathBuf {
        self.output_dir.join(&self.summary_file)
    }
}

/// Default configuration path: `~/.azcost/config.yaml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".azcost").join("config.yaml"))
}
