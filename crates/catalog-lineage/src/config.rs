//! Lineage service configuration and builder pattern.

use crate::error::{LineageError, Result};

/// Environment variable overriding [`LineageConfig::default_depth`].
pub const ENV_DEFAULT_DEPTH: &str = "STRATA_LINEAGE_DEFAULT_DEPTH";
/// Environment variable overriding [`LineageConfig::max_depth`].
pub const ENV_MAX_DEPTH: &str = "STRATA_LINEAGE_MAX_DEPTH";
/// Environment variable overriding [`LineageConfig::with_run_facets`].
pub const ENV_RUN_FACETS: &str = "STRATA_LINEAGE_RUN_FACETS";

/// Configuration for the lineage service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineageConfig {
    /// Traversal depth used when the caller does not pick one (default: 20)
    pub default_depth: u32,
    /// Upper bound applied to every requested depth (default: 100)
    pub max_depth: u32,
    /// Whether default lookups fetch run facets (default: false)
    pub with_run_facets: bool,
}

impl Default for LineageConfig {
    fn default() -> Self {
        Self {
            default_depth: 20,
            max_depth: 100,
            with_run_facets: false,
        }
    }
}

impl LineageConfig {
    /// Create a new configuration builder.
    pub fn builder() -> LineageConfigBuilder {
        LineageConfigBuilder::new()
    }

    /// Load configuration from the environment
    ///
    /// # Environment Variables
    /// - `STRATA_LINEAGE_DEFAULT_DEPTH`: default traversal depth (default: 20)
    /// - `STRATA_LINEAGE_MAX_DEPTH`: maximum traversal depth (default: 100)
    /// - `STRATA_LINEAGE_RUN_FACETS`: `true`/`1` to fetch run facets by default
    ///
    /// Unparseable values fall back to the defaults.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let default_depth = std::env::var(ENV_DEFAULT_DEPTH)
            .ok()
            .and_then(|s| s.trim().parse::<u32>().ok())
            .unwrap_or(defaults.default_depth);
        let max_depth = std::env::var(ENV_MAX_DEPTH)
            .ok()
            .and_then(|s| s.trim().parse::<u32>().ok())
            .unwrap_or(defaults.max_depth);
        let with_run_facets = std::env::var(ENV_RUN_FACETS)
            .ok()
            .and_then(|s| parse_bool(&s))
            .unwrap_or(defaults.with_run_facets);

        let config = Self {
            default_depth,
            max_depth,
            with_run_facets,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.max_depth == 0 {
            return Err(LineageError::Config("max_depth must be > 0".to_string()));
        }

        if self.default_depth == 0 {
            return Err(LineageError::Config(
                "default_depth must be > 0".to_string(),
            ));
        }

        if self.default_depth > self.max_depth {
            return Err(LineageError::Config(format!(
                "default_depth ({}) must be <= max_depth ({})",
                self.default_depth, self.max_depth
            )));
        }

        Ok(())
    }

    /// Clamp a requested depth into `min..=max_depth`.
    pub fn clamp_depth(&self, requested: u32, min: u32) -> u32 {
        let clamped = requested.clamp(min.min(self.max_depth), self.max_depth);
        if clamped != requested {
            tracing::debug!(requested, clamped, "Clamped lineage depth");
        }
        clamped
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Builder for lineage configuration.
#[derive(Debug, Default)]
pub struct LineageConfigBuilder {
    config: LineageConfig,
}

impl LineageConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default traversal depth.
    pub fn default_depth(mut self, depth: u32) -> Self {
        self.config.default_depth = depth;
        self
    }

    /// Set the maximum traversal depth.
    pub fn max_depth(mut self, depth: u32) -> Self {
        self.config.max_depth = depth;
        self
    }

    /// Fetch run facets on default lookups.
    pub fn with_run_facets(mut self, enabled: bool) -> Self {
        self.config.with_run_facets = enabled;
        self
    }

    /// Build the configuration, validating all settings.
    pub fn build(self) -> Result<LineageConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
