//! Subcommand handlers.

mod apply;
mod doctor;
mod init;
mod plan;
mod validate;

pub use doctor::DoctorReport;

use crate::cli::{Cli, Command};

/// Run the parsed command line.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli.config.as_deref();
    match cli.command {
        Command::Init => init::run(config_path),
        Command::Plan { prompt, dir } => plan::plan(config_path, &prompt, dir.as_deref()).await,
        Command::Dryrun { prompt, dir } => plan::dryrun(config_path, &prompt, dir.as_deref()).await,
        Command::Apply { approve, dir } => apply::run(config_path, approve, dir.as_deref()).await,
        Command::Validate { file } => validate::run(&file),
        Command::Doctor => doctor::run(config_path).await,
    }
}
