//! Error types for scenario assembly, plugins and generation
//!
//! - [`ScenarioError`]: building a scenario tree from the file system
//! - [`ContractError`]: tagging and validating plugins
//! - [`PluginError`]: resolving plugin bundles by name
//! - [`Error`]: everything the entry points can fail with

use std::fmt::Display;
use std::path::{Path, PathBuf};

use locustgen_syntax::SyntaxError;

use crate::plugins::Contract;

/// Errors raised while turning a path into a [`Scenario`](crate::Scenario)
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    /// Path can't become a scenario (unreadable, not a HAR file, empty
    /// directory). A parent directory skips such a child with a warning.
    #[error("can't make a scenario from {path}: {reason}")]
    Skippable { path: PathBuf, reason: String },

    /// Weight files without a matching recording or subdirectory
    #[error("{path} contains weight files that don't correspond to any scenario: {}", join_paths(.files, ", "))]
    DanglingWeights { path: PathBuf, files: Vec<PathBuf> },

    /// Sibling scenarios ending up with the same name
    #[error("{path} contains scenarios with colliding names: {}", join_groups(.groups))]
    CollidingNames {
        path: PathBuf,
        /// Origins of the scenarios in each group sharing a name
        groups: Vec<Vec<PathBuf>>,
    },

    /// Weight file whose contents is not a positive integer
    #[error("invalid weight file {path}: weights must be positive integers, got {value:?}")]
    InvalidWeight { path: PathBuf, value: String },
}

impl ScenarioError {
    /// Create skippable error for path
    pub fn skippable(path: impl Into<PathBuf>, reason: impl Display) -> Self {
        Self::Skippable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether a parent directory may skip the failing child.
    ///
    /// Integrity errors (dangling weights, colliding names, invalid weights)
    /// are never skippable.
    #[inline]
    #[must_use]
    pub fn is_skippable(&self) -> bool {
        matches!(self, Self::Skippable { .. })
    }

    /// Path the error is about
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Skippable { path, .. }
            | Self::DanglingWeights { path, .. }
            | Self::CollidingNames { path, .. }
            | Self::InvalidWeight { path, .. } => path,
        }
    }
}

fn join_paths(paths: &[PathBuf], separator: &str) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(separator)
}

fn join_groups(groups: &[Vec<PathBuf>]) -> String {
    groups
        .iter()
        .map(|group| join_paths(group, " vs "))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors raised when tagging or validating a plugin
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContractError {
    /// Tag outside of the known contracts
    #[error("{bits:#06b} is not a valid contract, expected a combination of {}", Contract::suggestions())]
    InvalidContract { bits: u8 },

    /// Plugin that can't honor what it declares
    #[error("invalid plugin {name:?}: {reason}")]
    InvalidPlugin { name: String, reason: String },
}

/// Errors raised when resolving plugins by name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PluginError {
    /// No bundle registered under that name
    #[error("no plugin bundle named {name:?} (known: {})", .known.join(", "))]
    NotFound { name: String, known: Vec<String> },

    /// Bundle without any usable plugin
    #[error("plugin bundle {0:?} doesn't contain any valid plugin")]
    NoPlugins(String),
}

/// Result type alias for scenario assembly
pub type ScenarioResult<T> = std::result::Result<T, ScenarioError>;

/// Errors of the conversion entry points
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("plugin error: {0}")]
    Plugin(#[from] PluginError),

    #[error("scenario error: {0}")]
    Scenario(#[from] ScenarioError),

    #[error("generation error: {0}")]
    Syntax(#[from] SyntaxError),

    #[error("io error writing locustfile: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for the conversion entry points
pub type Result<T> = std::result::Result<T, Error>;
