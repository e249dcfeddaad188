//! Construction errors for syntax tree nodes
//!
//! All of these are programmer errors: they are raised as soon as an invalid
//! node is built, never deferred to rendering.

/// Errors raised when building a node that would render to invalid code
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyntaxError {
    /// Opaque block made only of whitespace
    #[error("opaque block can't be empty, got {0:?}")]
    EmptyOpaqueBlock(String),

    /// Conditional without any `if` branch
    #[error("can't have an if without at least one block")]
    EmptyIfElse,

    /// Import statement without anything to import
    #[error("expected at least one import target")]
    NoImportTargets,

    /// Alias given for an import of several targets
    #[error("alias {alias:?} forbidden for multiple import targets: {targets:?}")]
    AliasWithMultipleTargets {
        /// Offending alias
        alias: String,
        /// Targets that were given along with the alias
        targets: Vec<String>,
    },
}

/// Result alias for node construction
pub type SyntaxResult<T> = Result<T, SyntaxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alias_error_display_names_targets() {
        let err = SyntaxError::AliasWithMultipleTargets {
            alias: "z".to_string(),
            targets: vec!["a".to_string(), "b".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("\"z\""));
        assert!(msg.contains("\"a\""));
    }
}
