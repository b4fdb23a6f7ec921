//! Embed configuration (goembed.yaml) data structures

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::error::config::{invalid, parse_failed, unknown_runtime};
use crate::error::fs::read_failed;
use crate::hash::HashProfile;
use crate::resolver::LoadOptions;

/// Conventional configuration file name
pub const CONFIG_FILE: &str = "goembed.yaml";

/// Settings for resolving and building bundles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedConfig {
    /// Target Go release (e.g., "go1.22"), used to pick the hash profile
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<String>,

    /// Explicit hash profile; takes precedence over `runtime`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash_profile: Option<HashProfile>,

    /// Reuse bundles through the process-wide cache
    #[serde(default = "default_cache")]
    pub cache: bool,

    /// Deadline for a single load, checked between patterns
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline_ms: Option<u64>,
}

fn default_cache() -> bool {
    true
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            runtime: None,
            hash_profile: None,
            cache: default_cache(),
            deadline_ms: None,
        }
    }
}

impl EmbedConfig {
    /// Configuration targeting a Go release
    pub fn for_runtime(runtime: impl Into<String>) -> Self {
        Self {
            runtime: Some(runtime.into()),
            ..Self::default()
        }
    }

    /// Configuration with an explicit hash profile
    pub fn with_profile(profile: HashProfile) -> Self {
        Self {
            hash_profile: Some(profile),
            ..Self::default()
        }
    }

    /// Parse configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path).map_err(|e| read_failed(path, &e))?;
        let config: Self = serde_yaml::from_str(&yaml)
            .map_err(|e| parse_failed(path.display().to_string(), e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Validate the configuration
    ///
    /// A runtime must be known to the registry unless an explicit profile
    /// overrides it.
    pub fn validate(&self) -> Result<()> {
        if self.runtime.as_deref().is_some_and(|r| r.trim().is_empty()) {
            return Err(invalid("runtime cannot be empty"));
        }
        if let (Some(runtime), None) = (&self.runtime, self.hash_profile) {
            HashProfile::for_runtime(runtime)?;
        }
        if self.deadline_ms == Some(0) {
            return Err(invalid("deadline_ms must be greater than zero"));
        }
        Ok(())
    }

    /// Hash profile to build with
    ///
    /// # Errors
    ///
    /// Fails with [`crate::error::EmbedError::UnknownRuntime`] when neither an
    /// explicit profile nor a known runtime is configured.
    pub fn hash_profile(&self) -> Result<HashProfile> {
        match (self.hash_profile, &self.runtime) {
            (Some(profile), _) => Ok(profile),
            (None, Some(runtime)) => HashProfile::for_runtime(runtime),
            (None, None) => Err(unknown_runtime("<unset>")),
        }
    }

    /// Resolver options, with the deadline starting now
    pub fn load_options(&self) -> LoadOptions {
        match self.deadline_ms {
            Some(ms) => LoadOptions::with_timeout(Duration::from_millis(ms)),
            None => LoadOptions::default(),
        }
    }
}
