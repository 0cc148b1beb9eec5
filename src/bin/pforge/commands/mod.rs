mod derive;
mod export;
mod import;
mod validate;

use std::process::ExitCode;

use anyhow::Result;

use crate::cli::Command;

pub fn dispatch(command: Command) -> Result<ExitCode> {
    match command {
        Command::Import(args) => import::run(args),
        Command::Export(args) => export::run(args),
        Command::Validate(args) => validate::run(args),
        Command::DeriveReq(args) => derive::run(args),
    }
}
