use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use flygen::build::{self, Outcome};
use flygen::classify::Classifier;
use flygen::config::Config;
use flygen::fs::OsFs;
use flygen::git::CommandGit;
use flygen::{telemetry, version};

/// Generate ordered Flyway migration builds from git diffs
///
/// flygen reads the diff between the last released commit and HEAD of the
/// current repository, classifies the changed files into priority classes
/// (creates before alters before content before drops), honors explicit
/// ordering constraints from *_deps.txt files, and copies the result into
/// a flyway repository as V<version>_<n>__<name> migrations.
///
/// With a concrete --next-version the build is committed, tagged and pushed
/// in the flyway repository; with SNAPSHOT (the default) a timestamped
/// build directory is produced and nothing is published.
///
/// Exit code 0 means a build was produced; 1 means nothing to do (commit
/// already processed, diverged history, empty build set) or a fatal error.
#[derive(Parser)]
#[command(name = "flygen")]
#[command(version, about)]
struct Cli {
    /// Path of the flyway repository receiving the build
    #[arg(long, default_value = "../flyway")]
    flyway_repo_path: PathBuf,

    /// Version of the next release, or SNAPSHOT for a timestamped build
    #[arg(long, default_value = version::SNAPSHOT)]
    next_version: String,

    /// Path of the mask-rule configuration file
    #[arg(long, default_value = ".flygen.toml")]
    config: PathBuf,
}

fn main() -> ExitCode {
    telemetry::init();
    let cli = Cli::parse();

    match execute(&cli) {
        Ok(Outcome::Built) => {
            println!("=> the end.");
            ExitCode::SUCCESS
        }
        Ok(Outcome::Noop(reason)) => {
            println!(" > {reason}");
            println!("=> the end.");
            ExitCode::FAILURE
        }
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn execute(cli: &Cli) -> Result<Outcome> {
    println!("=> read config");
    let config = Config::load(&cli.config)?;
    let classifier = Classifier::new(&config.mask_rules())?;
    let git = CommandGit::new(PathBuf::from("."));
    let fs = OsFs::new(PathBuf::from("."));

    build::run(
        &cli.next_version,
        &cli.flyway_repo_path,
        &classifier,
        &git,
        &fs,
    )
}
