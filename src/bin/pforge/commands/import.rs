use std::fs;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};

use param_forge::bundle;
use param_forge::bundle::manifest::sha256_bytes;
use param_forge::io::frc;
use param_forge::validate::{report, validate};

use crate::cli::ImportArgs;

pub fn run(args: ImportArgs) -> Result<ExitCode> {
    let text = fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;

    let import = frc::reader::parse_str(&text)
        .with_context(|| format!("failed to parse {}", args.input.display()))?;

    for err in &import.row_errors {
        eprintln!("warning: skipped row: {err}");
    }

    let mut pkg = import.package;
    pkg.provenance.source_path = Some(args.input.clone());
    pkg.provenance.source_sha256 = Some(sha256_bytes(text.as_bytes()));
    pkg.provenance.features = vec!["frc".to_string()];

    let issues = validate(&pkg);
    if !issues.is_empty() {
        eprintln!("{}", report(&issues));
        if !args.force {
            bail!(
                "validation reported {} issue(s); rerun with --force to save anyway",
                issues.len()
            );
        }
        eprintln!("warning: saving despite validation issues (--force)");
    }

    let manifest = bundle::save_package(&args.out, &pkg, &args.name, &args.version, &text)
        .with_context(|| format!("failed to save bundle at {}", args.out.display()))?;

    println!(
        "imported {} as {} {} ({} rows, {} skipped) -> {}",
        args.input.display(),
        manifest.name,
        manifest.version,
        pkg.row_count(),
        import.row_errors.len(),
        args.out.display()
    );
    Ok(ExitCode::SUCCESS)
}
