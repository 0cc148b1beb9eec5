//! On-disk package bundles.
//!
//! A bundle is a directory holding everything needed to reproduce and audit a
//! parameter package:
//!
//! ```text
//! <root>/
//!   manifest.json
//!   tables/<name>.json        canonical rows, one file per populated table
//!   raw/source.frc            the imported text, byte-exact
//!   raw/unknown_sections.json preserved opaque sections, encounter order
//! ```
//!
//! Every persisted file is listed in the manifest with its SHA-256, so a
//! loader can prove the bundle has not been edited out from under it.

pub mod manifest;

use std::fs;
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error as ThisError;

use crate::model::package::{Package, UnknownSection};

use manifest::{
    now_utc, read_manifest, sha256_bytes, sha256_file, write_manifest, Manifest, SourceEntry,
    TableEntry, SCHEMA_VERSION,
};

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("I/O operation failed: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("failed to encode or decode JSON: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    #[error("invalid manifest: {0}")]
    Manifest(String),

    #[error("hash mismatch for '{path}': manifest says {expected}, file is {actual}")]
    HashMismatch {
        path: String,
        expected: String,
        actual: String,
    },
}

/// A loaded bundle: the re-canonicalized package, its manifest, and the
/// original source text.
#[derive(Debug, Clone)]
pub struct PackageBundle {
    pub root: PathBuf,
    pub manifest: Manifest,
    pub package: Package,
    pub source_text: String,
}

const SOURCE_REL: &str = "raw/source.frc";
const UNKNOWN_REL: &str = "raw/unknown_sections.json";

/// Saves a package under `root` and returns the written manifest. Existing
/// bundle files at the same paths are overwritten.
pub fn save_package(
    root: &Path,
    pkg: &Package,
    name: &str,
    version: &str,
    source_text: &str,
) -> Result<Manifest, Error> {
    if name.trim().is_empty() {
        return Err(Error::Manifest("name must be non-empty".to_string()));
    }
    if version.trim().is_empty() {
        return Err(Error::Manifest("version must be non-empty".to_string()));
    }

    fs::create_dir_all(root.join("tables"))?;
    fs::create_dir_all(root.join("raw"))?;

    fs::write(root.join(SOURCE_REL), source_text.as_bytes())?;
    write_json_stable(&root.join(UNKNOWN_REL), &pkg.unknown_sections)?;

    let mut tables = std::collections::BTreeMap::new();
    write_table(root, "atom_types", &pkg.atom_types, &mut tables)?;
    write_table(root, "bonds", &pkg.bonds, &mut tables)?;
    write_table(root, "angles", &pkg.angles, &mut tables)?;
    write_table(root, "dihedrals", &pkg.dihedrals, &mut tables)?;
    write_table(root, "pair_overrides", &pkg.pair_overrides, &mut tables)?;

    let manifest = Manifest {
        created_utc: now_utc(),
        features: pkg.provenance.features.clone(),
        name: name.to_string(),
        nonbonded: pkg.provenance.nonbonded,
        schema_version: SCHEMA_VERSION.to_string(),
        sources: vec![
            SourceEntry {
                path: SOURCE_REL.to_string(),
                sha256: sha256_bytes(source_text.as_bytes()),
            },
            SourceEntry {
                path: UNKNOWN_REL.to_string(),
                sha256: sha256_file(&root.join(UNKNOWN_REL))?,
            },
        ],
        tables,
        units: pkg.provenance.units.clone(),
        version: version.to_string(),
    };

    write_manifest(&root.join("manifest.json"), &manifest)?;
    Ok(manifest)
}

/// Loads a bundle back. With `verify_hashes` every SHA-256 in the manifest is
/// recomputed and compared before any content is interpreted.
pub fn load_package(root: &Path, verify_hashes: bool) -> Result<PackageBundle, Error> {
    let manifest = read_manifest(&root.join("manifest.json"))?;
    if manifest.schema_version != SCHEMA_VERSION {
        return Err(Error::Manifest(format!(
            "unsupported schema_version '{}' (expected '{}')",
            manifest.schema_version, SCHEMA_VERSION
        )));
    }

    if verify_hashes {
        for source in &manifest.sources {
            verify_file(root, &source.path, &source.sha256)?;
        }
        for entry in manifest.tables.values() {
            verify_file(root, &entry.path, &entry.sha256)?;
        }
    }

    let source_text = fs::read_to_string(root.join(SOURCE_REL))?;
    let unknown_text = fs::read_to_string(root.join(UNKNOWN_REL))?;
    let unknown_sections: Vec<UnknownSection> = serde_json::from_str(&unknown_text)?;

    let mut pkg = Package::new();
    for (name, entry) in &manifest.tables {
        let path = root.join(&entry.path);
        match name.as_str() {
            "atom_types" => pkg.atom_types = read_table(&path)?,
            "bonds" => pkg.bonds = read_table(&path)?,
            "angles" => pkg.angles = read_table(&path)?,
            "dihedrals" => pkg.dihedrals = read_table(&path)?,
            "pair_overrides" => pkg.pair_overrides = read_table(&path)?,
            other => {
                return Err(Error::Manifest(format!("unknown table '{other}'")));
            }
        }
    }

    pkg.unknown_sections = unknown_sections;
    pkg.provenance.units = manifest.units.clone();
    pkg.provenance.nonbonded = manifest.nonbonded;
    pkg.provenance.features = manifest.features.clone();
    pkg.provenance.source_path = Some(root.join(SOURCE_REL));
    pkg.provenance.source_sha256 = Some(sha256_bytes(source_text.as_bytes()));
    pkg.canonicalize();

    Ok(PackageBundle {
        root: root.to_path_buf(),
        manifest,
        package: pkg,
        source_text,
    })
}

fn write_json_stable<T: Serialize>(path: &Path, value: &T) -> Result<(), Error> {
    let mut text = serde_json::to_string_pretty(value)?;
    text.push('\n');
    fs::write(path, text)?;
    Ok(())
}

/// Empty tables are not persisted; presence in the manifest implies rows.
fn write_table<T: Serialize>(
    root: &Path,
    name: &str,
    rows: &[T],
    entries: &mut std::collections::BTreeMap<String, TableEntry>,
) -> Result<(), Error> {
    if rows.is_empty() {
        return Ok(());
    }
    let rel = format!("tables/{name}.json");
    let path = root.join(&rel);
    write_json_stable(&path, &rows)?;
    entries.insert(
        name.to_string(),
        TableEntry {
            path: rel,
            rows: rows.len(),
            sha256: sha256_file(&path)?,
        },
    );
    Ok(())
}

fn read_table<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, Error> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

fn verify_file(root: &Path, rel: &str, expected: &str) -> Result<(), Error> {
    let actual = sha256_file(&root.join(rel))?;
    if actual != expected {
        return Err(Error::HashMismatch {
            path: rel.to_string(),
            expected: expected.to_string(),
            actual,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::tables::{AtomType, Bond, PairOverride};

    fn sample_package() -> Package {
        let mut pkg = Package::new();
        let mut c3 = AtomType::new("c3");
        c3.element = Some("C".to_string());
        c3.mass_amu = Some(12.011);
        c3.lj_a = Some(1790340.7);
        c3.lj_b = Some(528.48);
        let mut o = AtomType::new("o");
        o.element = Some("O".to_string());
        o.mass_amu = Some(15.999);
        o.lj_a = Some(272894.8);
        o.lj_b = Some(498.88);
        pkg.atom_types = vec![c3, o];
        pkg.bonds.push(Bond::new("o", "c3", 320.0, 1.43));
        pkg.pair_overrides
            .push(PairOverride::new("c3", "o", 900000.0, 560.0));
        pkg.unknown_sections.push(UnknownSection::new(
            "#out_of_plane",
            vec![" c3 o o o 10 0".to_string()],
        ));
        pkg.provenance.features = vec!["frc".to_string()];
        pkg.canonicalize();
        pkg
    }

    #[test]
    fn save_then_load_round_trips_package_and_raw_text() {
        let dir = tempfile::tempdir().unwrap();
        let source = "#atom_types\n c3 C 12.011\n";
        let pkg = sample_package();

        let manifest = save_package(dir.path(), &pkg, "demo", "0.1.0", source).unwrap();
        assert_eq!(manifest.schema_version, SCHEMA_VERSION);
        assert_eq!(manifest.table("atom_types").unwrap().rows, 2);
        assert!(manifest.table("angles").is_none());

        let bundle = load_package(dir.path(), true).unwrap();
        assert_eq!(bundle.source_text, source);
        assert_eq!(bundle.package.atom_types, pkg.atom_types);
        assert_eq!(bundle.package.bonds, pkg.bonds);
        assert_eq!(bundle.package.pair_overrides, pkg.pair_overrides);
        assert_eq!(bundle.package.unknown_sections, pkg.unknown_sections);
        assert_eq!(
            bundle.package.provenance.source_sha256.as_deref(),
            Some(sha256_bytes(source.as_bytes()).as_str())
        );
    }

    #[test]
    fn tampered_table_fails_hash_verification() {
        let dir = tempfile::tempdir().unwrap();
        let source = "#atom_types\n c3 C 12.011\n";
        let pkg = sample_package();
        save_package(dir.path(), &pkg, "demo", "0.1.0", source).unwrap();

        let table = dir.path().join("tables/atom_types.json");
        let mut text = fs::read_to_string(&table).unwrap();
        text = text.replace("12.011", "13.0");
        fs::write(&table, text).unwrap();

        let err = load_package(dir.path(), true).unwrap_err();
        assert!(matches!(err, Error::HashMismatch { .. }));

        // Without verification the tampered bundle still loads.
        let bundle = load_package(dir.path(), false).unwrap();
        assert_eq!(bundle.package.atom_type("c3").unwrap().mass_amu, Some(13.0));
    }

    #[test]
    fn empty_name_or_version_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let pkg = sample_package();
        assert!(matches!(
            save_package(dir.path(), &pkg, " ", "0.1.0", ""),
            Err(Error::Manifest(_))
        ));
        assert!(matches!(
            save_package(dir.path(), &pkg, "demo", "", ""),
            Err(Error::Manifest(_))
        ));
    }

    #[test]
    fn unknown_schema_version_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let source = "#atom_types\n c3 C 12.011\n";
        let pkg = sample_package();
        save_package(dir.path(), &pkg, "demo", "0.1.0", source).unwrap();

        let path = dir.path().join("manifest.json");
        let text = fs::read_to_string(&path)
            .unwrap()
            .replace(SCHEMA_VERSION, "upm-9.9");
        fs::write(&path, text).unwrap();

        let err = load_package(dir.path(), false).unwrap_err();
        assert!(matches!(err, Error::Manifest(_)));
    }
}
