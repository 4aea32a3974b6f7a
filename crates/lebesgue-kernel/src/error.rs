//! Error types for kernel operations.

use crate::ennreal::ENNReal;

/// Convenience alias used throughout the kernel.
pub type Result<T> = std::result::Result<T, KernelError>;

/// Errors arising from malformed inputs or violated engine invariants.
#[derive(Debug, thiserror::Error)]
pub enum KernelError {
    /// A set (or function) that must be measurable is not.
    #[error("non-measurable: {description}")]
    NonMeasurable { description: String },

    /// Preimages do not partition the domain.
    #[error("invalid partition: {description}")]
    InvalidPartition { description: String },

    /// Two simple functions live on different domains.
    #[error("domain mismatch: {description}")]
    DomainMismatch { description: String },

    /// A measure was built from inconsistent data.
    #[error("invalid measure: {description}")]
    InvalidMeasure { description: String },

    /// The approximation sequence did not settle within the step budget.
    #[error("step budget exhausted after {steps} steps (lower bound {lower_bound})")]
    StepBudgetExhausted { steps: usize, lower_bound: ENNReal },

    /// A negative number was offered where only nonnegative values live.
    #[error("negative value: {0}")]
    NegativeValue(String),

    /// Text could not be parsed as an extended nonnegative rational.
    #[error("cannot parse value: {0}")]
    ParseValue(String),

    #[error("failed to read config: {path}: {source}")]
    ReadConfig {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid toml at {path}: {source}")]
    ParseConfig {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

impl KernelError {
    /// Stable snake_case tag for the variant, used in fixture output.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NonMeasurable { .. } => "non_measurable",
            Self::InvalidPartition { .. } => "invalid_partition",
            Self::DomainMismatch { .. } => "domain_mismatch",
            Self::InvalidMeasure { .. } => "invalid_measure",
            Self::StepBudgetExhausted { .. } => "step_budget_exhausted",
            Self::NegativeValue(_) => "negative_value",
            Self::ParseValue(_) => "parse_value",
            Self::ReadConfig { .. } => "read_config",
            Self::ParseConfig { .. } => "parse_config",
        }
    }

    pub fn non_measurable(description: impl Into<String>) -> Self {
        Self::NonMeasurable {
            description: description.into(),
        }
    }

    pub fn invalid_partition(description: impl Into<String>) -> Self {
        Self::InvalidPartition {
            description: description.into(),
        }
    }

    pub fn domain_mismatch(description: impl Into<String>) -> Self {
        Self::DomainMismatch {
            description: description.into(),
        }
    }
}
