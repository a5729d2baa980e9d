//! Release and snapshot version tokens.
//!
//! The CLI takes either a concrete version (`1.1`) or the `SNAPSHOT`
//! sentinel. A concrete version produces `release_<v>` output and triggers
//! the release step; a snapshot produces a timestamped `snapshot_<ts>`
//! directory and skips it.

use chrono::NaiveDateTime;

/// Sentinel version token for timestamp-named builds.
pub const SNAPSHOT: &str = "SNAPSHOT";

/// Parsed version token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VersionSpec {
    /// Run the release step (tag + push) after a successful build.
    pub release: bool,
    /// Flyway version prefix, e.g. `V1_1` or `V2009_11_17_20_34_58`.
    pub version: String,
    /// Output directory name under `src/`.
    pub dir_name: String,
}

/// Parse a version token against the given clock reading.
pub fn parse(token: &str, now: NaiveDateTime) -> VersionSpec {
    if token == SNAPSHOT {
        let ts = now.format("%Y_%m_%d_%H_%M_%S").to_string();
        return VersionSpec {
            release: false,
            version: format!("V{ts}"),
            dir_name: format!("snapshot_{ts}"),
        };
    }
    let v = token.replace('.', "_");
    VersionSpec {
        release: true,
        version: format!("V{v}"),
        dir_name: format!("release_{v}"),
    }
}
