use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};

use param_forge::bundle;
use param_forge::io::frc::writer::{write_full, write_minimal};
use param_forge::io::frc::WriteOptions;
use param_forge::io::requirements::{read_requirements_json, write_missing_report};
use param_forge::model::resolved::MissingKey;
use param_forge::resolve::{resolve_minimal, MissingPolicy};

use crate::cli::{ExportArgs, ExportMode};

pub fn run(args: ExportArgs) -> Result<ExitCode> {
    let loaded = bundle::load_package(&args.bundle, args.verify)
        .with_context(|| format!("failed to load bundle {}", args.bundle.display()))?;

    let opts = WriteOptions {
        include_raw: args.include_raw,
    };

    let mut out = BufWriter::new(
        File::create(&args.out)
            .with_context(|| format!("failed to create {}", args.out.display()))?,
    );

    match args.mode {
        ExportMode::Full => {
            write_full(&mut out, &loaded.package, opts)?;
        }
        ExportMode::Minimal => {
            let Some(req_path) = &args.requirements else {
                bail!("--mode minimal requires --requirements <FILE>");
            };
            let req_file = File::open(req_path)
                .with_context(|| format!("failed to open {}", req_path.display()))?;
            let req = read_requirements_json(req_file)
                .with_context(|| format!("failed to read {}", req_path.display()))?;

            let policy = if args.allow_missing {
                MissingPolicy::Permit
            } else {
                MissingPolicy::Fail
            };
            let resolution = match resolve_minimal(&loaded.package, &req, policy) {
                Ok(r) => r,
                Err(e) => {
                    report_missing(&e.resolution.missing, args.report.as_deref())?;
                    bail!(
                        "export aborted: {} required term(s) missing (use --allow-missing to override)",
                        e.resolution.missing.len()
                    );
                }
            };
            if !resolution.missing.is_empty() {
                report_missing(&resolution.missing, args.report.as_deref())?;
                eprintln!(
                    "warning: exporting despite {} missing term(s)",
                    resolution.missing.len()
                );
            }
            write_minimal(&mut out, &resolution.ff, opts)?;
        }
    }

    println!("exported {} -> {}", args.bundle.display(), args.out.display());
    Ok(ExitCode::SUCCESS)
}

fn report_missing(missing: &[MissingKey], report_path: Option<&Path>) -> Result<()> {
    for key in missing {
        eprintln!("missing: {key}");
    }
    if let Some(path) = report_path {
        let mut file = File::create(path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        write_missing_report(&mut file, missing)?;
    }
    Ok(())
}
