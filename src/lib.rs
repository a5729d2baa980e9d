//! flygen library crate — re-exports for integration tests.
//!
//! The primary interface is the `flygen` binary. This lib.rs exposes the
//! build-sequencing engine and its collaborator traits so integration tests
//! can exercise the pipeline directly without going through the CLI.

pub mod build;
pub mod classify;
pub mod config;
pub mod error;
pub mod fs;
pub mod git;
pub mod graph;
pub mod record;
pub mod sequence;
pub mod telemetry;
pub mod version;
