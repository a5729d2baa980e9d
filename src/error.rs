//! Build error types.
//!
//! Defines [`BuildError`], the typed error for conditions the pipeline must
//! distinguish from plain I/O failures. Messages are self-contained: a user
//! seeing one should understand what happened without extra context. All
//! variants are fatal — the build never emits a partial output directory.

use std::fmt;
use std::path::PathBuf;

/// Typed error for fatal build conditions.
#[derive(Debug)]
pub enum BuildError {
    /// The dependency-list files declare a circular ordering constraint.
    DependencyCycle {
        /// The offending chain of paths, first element repeated at the end.
        chain: Vec<String>,
    },

    /// A configuration file could not be parsed.
    Config {
        /// Path to the configuration file.
        path: PathBuf,
        /// Human-readable description of the problem.
        detail: String,
    },

    /// A mask rule carries a malformed regular expression.
    InvalidMaskRule {
        /// The offending pattern.
        mask: String,
        /// The regex compile error.
        detail: String,
    },
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DependencyCycle { chain } => {
                write!(
                    f,
                    "dependency cycle detected: {}\n  Fix the *_deps.txt files so no file (transitively) precedes itself.",
                    chain.join(" -> ")
                )
            }
            Self::Config { path, detail } => {
                write!(f, "invalid configuration in {}: {detail}", path.display())
            }
            Self::InvalidMaskRule { mask, detail } => {
                write!(f, "invalid mask rule '{mask}': {detail}")
            }
        }
    }
}

impl std::error::Error for BuildError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_message_names_the_chain() {
        let err = BuildError::DependencyCycle {
            chain: vec!["a.sql".into(), "b.sql".into(), "a.sql".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("a.sql -> b.sql -> a.sql"), "message: {msg}");
    }

    #[test]
    fn mask_rule_message_names_the_pattern() {
        let err = BuildError::InvalidMaskRule {
            mask: "^(unclosed".into(),
            detail: "missing )".into(),
        };
        assert!(err.to_string().contains("^(unclosed"));
    }
}
