//! Bundle manifest: hashes, timestamps, JSON read/write.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::model::package::{NonbondedConvention, Units};

use super::Error;

pub const SCHEMA_VERSION: &str = "pforge-1.0";

/// One persisted file the manifest vouches for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceEntry {
    pub path: String,
    pub sha256: String,
}

/// One persisted table file plus its row count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableEntry {
    pub path: String,
    pub rows: usize,
    pub sha256: String,
}

/// `manifest.json`. Fields are declared in alphabetical order so the stable
/// writer emits sorted keys without a post-pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub created_utc: String,
    #[serde(default)]
    pub features: Vec<String>,
    pub name: String,
    #[serde(default)]
    pub nonbonded: NonbondedConvention,
    pub schema_version: String,
    pub sources: Vec<SourceEntry>,
    pub tables: BTreeMap<String, TableEntry>,
    #[serde(default = "Units::default")]
    pub units: Units,
    pub version: String,
}

impl Manifest {
    pub fn table(&self, name: &str) -> Option<&TableEntry> {
        self.tables.get(name)
    }
}

pub fn now_utc() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn sha256_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

pub fn sha256_file(path: &Path) -> Result<String, Error> {
    let bytes = fs::read(path)?;
    Ok(sha256_bytes(&bytes))
}

pub fn read_manifest(path: &Path) -> Result<Manifest, Error> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

pub fn write_manifest(path: &Path, manifest: &Manifest) -> Result<(), Error> {
    let mut text = serde_json::to_string_pretty(manifest)?;
    text.push('\n');
    fs::write(path, text)?;
    Ok(())
}
