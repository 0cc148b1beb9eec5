use std::fs;
use std::process::ExitCode;

use anyhow::{Context, Result};

use param_forge::bundle;
use param_forge::io::frc;
use param_forge::model::package::Package;
use param_forge::validate::{report, validate};

use crate::cli::ValidateArgs;

pub fn run(args: ValidateArgs) -> Result<ExitCode> {
    let pkg = load_input(&args)?;

    let issues = validate(&pkg);
    if issues.is_empty() {
        println!(
            "ok: {} rows, {} unknown section(s)",
            pkg.row_count(),
            pkg.unknown_sections.len()
        );
        Ok(ExitCode::SUCCESS)
    } else {
        eprintln!("{}", report(&issues));
        Ok(ExitCode::FAILURE)
    }
}

/// A directory is a bundle, anything else is `.frc` text.
fn load_input(args: &ValidateArgs) -> Result<Package> {
    if args.input.is_dir() {
        let loaded = bundle::load_package(&args.input, args.verify)
            .with_context(|| format!("failed to load bundle {}", args.input.display()))?;
        Ok(loaded.package)
    } else {
        let text = fs::read_to_string(&args.input)
            .with_context(|| format!("failed to read {}", args.input.display()))?;
        let import = frc::reader::parse_str(&text)
            .with_context(|| format!("failed to parse {}", args.input.display()))?;
        for err in &import.row_errors {
            eprintln!("warning: skipped row: {err}");
        }
        Ok(import.package)
    }
}
