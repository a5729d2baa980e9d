//! Priority classification of changed-file records.
//!
//! Every record gets a signed priority from an ordered rule scan: built-in
//! deletion/rename and dependency-list rules first, then the configured mask
//! rules in declared order (first match wins), then the default `.SQL`
//! fallback. Anything left over is excluded with priority -1. No record is
//! dropped here — excluded records still matter downstream (rename aliases,
//! dependency-list contents).

use regex::Regex;
use tracing::debug;

use crate::config::MaskRule;
use crate::error::BuildError;
use crate::record::{ChangeMode, FileRecord};

/// Priority of the dependency-list sentinel.
pub const DEPS_FILE_PRIORITY: i32 = -3;

/// Default priority for `.sql` files not matched by any mask rule.
pub const DEFAULT_SQL_PRIORITY: i32 = 3;

/// Dependency-list file names, matched against the uppercased base name.
const DEPS_FILE_PATTERN: &str = r"^.*_DEPS\.TXT$";

struct CompiledRule {
    mask: Regex,
    mode: Regex,
    priority: i32,
}

/// Ordered mask-rule set compiled once at startup.
///
/// Mask patterns match the uppercased base name of the record's path; mode
/// patterns match the raw `--name-status` code. Rule order is significant:
/// it is the tie-break for overlapping masks.
pub struct Classifier {
    deps_file: Regex,
    rules: Vec<CompiledRule>,
}

impl Classifier {
    /// Compile the rule list. A malformed pattern is a fatal
    /// configuration error.
    pub fn new(rules: &[MaskRule]) -> Result<Self, BuildError> {
        let compile = |pattern: &str, rule: &MaskRule| {
            Regex::new(pattern).map_err(|err| BuildError::InvalidMaskRule {
                mask: rule.mask.clone(),
                detail: err.to_string(),
            })
        };
        let mut compiled = Vec::with_capacity(rules.len());
        for rule in rules {
            compiled.push(CompiledRule {
                mask: compile(&rule.mask, rule)?,
                mode: compile(&rule.mode, rule)?,
                priority: rule.priority,
            });
        }
        Ok(Self {
            deps_file: Regex::new(DEPS_FILE_PATTERN).map_err(|err| BuildError::InvalidMaskRule {
                mask: DEPS_FILE_PATTERN.to_owned(),
                detail: err.to_string(),
            })?,
            rules: compiled,
        })
    }

    /// Assign a priority and exclusion flag to one record.
    ///
    /// Total and deterministic: the same `(mode, path)` always yields the
    /// same priority for a given rule list.
    pub fn classify(&self, rec: &mut FileRecord) {
        let base = rec.base_name().to_uppercase();

        // Deletions and renames never build. A pure rename lives on as a
        // rewrite rule for other records, see record::resolve_renames.
        if matches!(rec.mode, ChangeMode::Deleted | ChangeMode::Renamed { .. }) {
            debug!(path = %rec.path, "skip: deleted or renamed");
            rec.priority = -2;
            rec.excluded = true;
            return;
        }

        // Dependency lists are retained so the graph builder can read them,
        // but never appear in the build output.
        if self.deps_file.is_match(&base) {
            debug!(path = %rec.path, "found dependency-list file");
            rec.priority = DEPS_FILE_PRIORITY;
            rec.excluded = true;
            return;
        }

        for rule in &self.rules {
            if rule.mask.is_match(&base) && rule.mode.is_match(&rec.code) {
                rec.priority = rule.priority;
                rec.excluded = rule.priority <= 0;
                return;
            }
        }

        if base.ends_with(".SQL") {
            rec.priority = DEFAULT_SQL_PRIORITY;
            return;
        }

        debug!(path = %rec.path, "skip: unrecognized file");
        rec.priority = -1;
        rec.excluded = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn default_classifier() -> Classifier {
        Classifier::new(&Config::default().mask_rules()).expect("default rules compile")
    }

    fn classify_one(classifier: &Classifier, code: &str, path: &str) -> FileRecord {
        let mut rec = FileRecord::new(code, path);
        classifier.classify(&mut rec);
        rec
    }

    #[test]
    fn default_rules_priority_table() {
        let c = default_classifier();
        let cases = [
            ("A", "ddl_cr_a.sql", 1),
            ("A", "ddl_al_a.sql", 2),
            ("A", "ddl_dr_a.sql", 5),
            ("A", "dml_a.sql", 4),
            ("A", "dml_b.java", 4),
            ("A", "a.sql", 3),
            ("A", "a.java", -1),
            ("A", "my_deps.txt", -3),
            ("A", "/tmp/a/dml_1.sql", 4),
            ("M", "ddl_cr_a.sql", -4),
        ];
        for (code, path, priority) in cases {
            let rec = classify_one(&c, code, path);
            assert_eq!(rec.priority, priority, "{code} {path}");
            assert_eq!(rec.excluded, priority <= 0, "{code} {path}");
        }
    }

    #[test]
    fn deleted_and_renamed_are_skipped() {
        let c = default_classifier();
        assert_eq!(classify_one(&c, "D", "ddl_cr_a.sql").priority, -2);
        let mut rec = FileRecord::parse("R100\tddl_cr_a.sql\tlib/ddl_cr_a.sql").expect("rename");
        c.classify(&mut rec);
        assert_eq!(rec.priority, -2);
        assert!(rec.excluded);
    }

    #[test]
    fn rule_order_breaks_overlapping_masks() {
        let rules = vec![
            MaskRule::new(r"^DDL_CR.*\.SQL$", "A", 1),
            MaskRule::new(r"^DDL_.*\.SQL$", "M", -4),
            MaskRule::new(r"^.*\.PKG$", ".*", -100),
        ];
        let c = Classifier::new(&rules).expect("rules compile");
        assert_eq!(classify_one(&c, "A", "ddl_cr_a.sql").priority, 1);
        assert_eq!(classify_one(&c, "M", "ddl_cr_a.sql").priority, -4);
        assert_eq!(classify_one(&c, "M", "a.pkg").priority, -100);
    }

    #[test]
    fn mask_matches_uppercased_base_name_only() {
        let rules = vec![MaskRule::new(r"^DDL_CR.*\.SQL$", "A", 1)];
        let c = Classifier::new(&rules).expect("rules compile");
        assert_eq!(classify_one(&c, "A", "some/dir/ddl_cr_a.sql").priority, 1);
        assert_eq!(classify_one(&c, "A", "ddlxcr_a.sql").priority, 3);
    }

    #[test]
    fn malformed_pattern_is_a_config_error() {
        let rules = vec![MaskRule::new(r"^(unclosed", "A", 1)];
        assert!(Classifier::new(&rules).is_err());
    }
}
