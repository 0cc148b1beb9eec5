use std::fs::File;
use std::process::ExitCode;

use anyhow::{Context, Result};

use param_forge::io::requirements::{requirements_from_structure_json, write_requirements_json};

use crate::cli::DeriveReqArgs;

pub fn run(args: DeriveReqArgs) -> Result<ExitCode> {
    let structure = File::open(&args.structure)
        .with_context(|| format!("failed to open {}", args.structure.display()))?;
    let req = requirements_from_structure_json(structure)
        .with_context(|| format!("failed to derive requirements from {}", args.structure.display()))?;

    let mut out = File::create(&args.out)
        .with_context(|| format!("failed to create {}", args.out.display()))?;
    write_requirements_json(&mut out, &req)?;

    println!("{}", args.out.display());
    Ok(ExitCode::SUCCESS)
}
