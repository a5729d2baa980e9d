//! Mask-rule configuration (`.flygen.toml`).
//!
//! Defines the typed configuration for the classifier's mask rules.
//! Missing fields use sensible defaults. Missing file → all defaults
//! (no error).
//!
//! ```toml
//! use_default_masks = true
//!
//! [[masks]]
//! mask = '^PCK_.*\.SQL$'
//! mode = "A"
//! priority = 6
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

use crate::error::BuildError;

/// One classification rule: a path mask, a change-mode pattern and the
/// priority assigned on match.
///
/// Both `mask` and `mode` are regular expressions; `mask` is matched against
/// the uppercased base name, `mode` against the raw git status code. The
/// priority may be negative to exclude matching files from the build.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MaskRule {
    pub mask: String,
    pub mode: String,
    pub priority: i32,
}

impl MaskRule {
    pub fn new(mask: &str, mode: &str, priority: i32) -> Self {
        Self {
            mask: mask.to_owned(),
            mode: mode.to_owned(),
            priority,
        }
    }
}

/// Top-level flygen configuration.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Prepend the built-in DDL/DML rule set (default: true).
    #[serde(default = "default_use_default_masks")]
    pub use_default_masks: bool,

    /// Extra mask rules, scanned after the built-in ones in declared order.
    #[serde(default)]
    pub masks: Vec<MaskRule>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            use_default_masks: default_use_default_masks(),
            masks: Vec::new(),
        }
    }
}

const fn default_use_default_masks() -> bool {
    true
}

impl Config {
    /// Load configuration from `path`. A missing file yields the defaults;
    /// an unreadable or malformed file is a fatal configuration error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config = toml::from_str(&raw).map_err(|err| BuildError::Config {
            path: path.to_owned(),
            detail: err.to_string(),
        })?;
        Ok(config)
    }

    /// The full ordered rule list: built-in defaults (when enabled)
    /// followed by the configured extras.
    pub fn mask_rules(&self) -> Vec<MaskRule> {
        let mut rules = if self.use_default_masks {
            default_rules()
        } else {
            Vec::new()
        };
        rules.extend(self.masks.iter().cloned());
        rules
    }
}

/// Built-in rule set for the common DDL/DML naming convention:
/// creates, then alters, then content, then drops. Modified DDL is
/// excluded — a committed DDL script is never replayed.
fn default_rules() -> Vec<MaskRule> {
    vec![
        MaskRule::new(r"^DDL_.*\.SQL$", "M", -4),
        MaskRule::new(r"^DDL_CR.*\.SQL$", "A", 1),
        MaskRule::new(r"^DDL_AL.*\.SQL$", "A", 2),
        MaskRule::new(r"^DML_.*\.SQL$", "A", 4),
        MaskRule::new(r"^DML_.*\.JAVA$", "A", 4),
        MaskRule::new(r"^DDL_DR.*\.SQL$", "A", 5),
    ]
}
