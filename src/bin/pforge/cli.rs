use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "pforge",
    about = "Force-field parameter packages: import, validate, resolve, export",
    version,
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Import an MSI .frc file into a package bundle
    Import(ImportArgs),

    /// Export a bundle back to .frc text
    Export(ExportArgs),

    /// Validate a bundle or a .frc file
    Validate(ValidateArgs),

    /// Derive a requirements JSON from a toy structure JSON
    #[command(name = "derive-req")]
    DeriveReq(DeriveReqArgs),
}

#[derive(Args)]
pub struct ImportArgs {
    /// Input .frc file
    #[arg(value_name = "FRC")]
    pub input: PathBuf,

    /// Package name recorded in the manifest
    #[arg(long, value_name = "NAME")]
    pub name: String,

    /// Package version recorded in the manifest
    #[arg(long, value_name = "VERSION", default_value = "0.1.0")]
    pub version: String,

    /// Bundle output directory
    #[arg(short, long, value_name = "DIR")]
    pub out: PathBuf,

    /// Save the bundle even when validation reports issues
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct ExportArgs {
    /// Bundle directory
    #[arg(value_name = "BUNDLE")]
    pub bundle: PathBuf,

    /// Output .frc file
    #[arg(short, long, value_name = "FILE")]
    pub out: PathBuf,

    /// Which rows to emit
    #[arg(long, value_enum, default_value_t = ExportMode::Full)]
    pub mode: ExportMode,

    /// Requirements JSON (minimal mode only)
    #[arg(long, value_name = "FILE")]
    pub requirements: Option<PathBuf>,

    /// Proceed despite missing terms; they are still reported
    #[arg(long)]
    pub allow_missing: bool,

    /// Re-emit preserved unknown sections after the supported ones
    #[arg(long)]
    pub include_raw: bool,

    /// Write the missing-terms report to this JSON file
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Recompute and check every manifest hash before loading
    #[arg(long)]
    pub verify: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportMode {
    /// Every populated table
    Full,
    /// Only the rows a requirements set resolves to
    Minimal,
}

#[derive(Args)]
pub struct ValidateArgs {
    /// Bundle directory or .frc file
    #[arg(value_name = "BUNDLE|FRC")]
    pub input: PathBuf,

    /// For bundles: recompute and check every manifest hash
    #[arg(long)]
    pub verify: bool,
}

#[derive(Args)]
pub struct DeriveReqArgs {
    /// Toy structure JSON
    #[arg(value_name = "STRUCTURE")]
    pub structure: PathBuf,

    /// Output requirements JSON
    #[arg(short, long, value_name = "FILE")]
    pub out: PathBuf,
}

pub fn parse() -> Cli {
    Cli::parse()
}
