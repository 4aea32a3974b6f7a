//! Engine configuration.
//!
//! Loaded from TOML:
//!
//! ```toml
//! max_steps = 4096
//! restrict_policy = "strict"      # or "zero_fallback"
//! parallel_threshold = 64
//! enumeration = "calkin_wilf"     # or "cantor_pairs", "naturals"
//! ```
//!
//! Every key is optional; missing keys take the defaults above.

use crate::enumeration::EnumerationKind;
use crate::error::{KernelError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// What `restrict` does when handed a non-measurable set.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum RestrictPolicy {
    /// Fail with `KernelError::NonMeasurable`.
    #[default]
    Strict,

    /// Return the identically-zero function and log a warning.
    ZeroFallback,
}

impl std::fmt::Display for RestrictPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Strict => write!(f, "strict"),
            Self::ZeroFallback => write!(f, "zero_fallback"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Upper bound on approximation steps taken by `integral`.
    pub max_steps: usize,

    pub restrict_policy: RestrictPolicy,

    /// Ranges larger than this are integrated term-parallel.
    pub parallel_threshold: usize,

    /// Enumeration used by the convenience entry points.
    pub enumeration: EnumerationKind,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_steps: 4096,
            restrict_policy: RestrictPolicy::Strict,
            parallel_threshold: 64,
            enumeration: EnumerationKind::CalkinWilf,
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Self::parse(text, "<inline>")
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| KernelError::ReadConfig {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&text, &path.display().to_string())
    }

    fn parse(text: &str, origin: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|source| KernelError::ParseConfig {
            path: origin.to_string(),
            source,
        })?;
        tracing::debug!(
            origin,
            max_steps = config.max_steps,
            restrict_policy = %config.restrict_policy,
            "loaded engine config"
        );
        Ok(config)
    }

    pub fn with_restrict_policy(mut self, policy: RestrictPolicy) -> Self {
        self.restrict_policy = policy;
        self
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }
}
