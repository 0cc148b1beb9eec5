//! Canonical table rows.
//!
//! Rows are plain owned structs; keyed rows canonicalize their key in the
//! constructor. Anything conditional (LJ parameters required for the declared
//! vdW style, finite numerics) is the validator's job, because the `.frc`
//! parser legitimately builds atom rows before the nonbonded section merges
//! their LJ values in.

use serde::{Deserialize, Serialize};

use super::keys::{AngleKey, BondKey, DihedralKey};
use super::types::{AngleStyle, BondStyle, DihedralStyle, VdwStyle};

/// One `atom_types` row, keyed by the unique `atom_type` name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtomType {
    pub atom_type: String,
    #[serde(default)]
    pub element: Option<String>,
    #[serde(default)]
    pub mass_amu: Option<f64>,
    #[serde(default)]
    pub vdw_style: VdwStyle,
    #[serde(default)]
    pub lj_a: Option<f64>,
    #[serde(default)]
    pub lj_b: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl AtomType {
    pub fn new(atom_type: &str) -> Self {
        Self {
            atom_type: atom_type.trim().to_string(),
            element: None,
            mass_amu: None,
            vdw_style: VdwStyle::default(),
            lj_a: None,
            lj_b: None,
            notes: None,
        }
    }
}

/// One `bonds` row: quadratic stretch `E = k * (r - r0)^2`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bond {
    pub key: BondKey,
    #[serde(default)]
    pub style: BondStyle,
    pub k: f64,
    pub r0: f64,
    #[serde(default)]
    pub source: Option<String>,
}

impl Bond {
    pub fn new(t1: &str, t2: &str, k: f64, r0: f64) -> Self {
        Self {
            key: BondKey::new(t1, t2),
            style: BondStyle::Quadratic,
            k,
            r0,
            source: None,
        }
    }

    pub fn with_source(mut self, source: Option<String>) -> Self {
        self.source = source;
        self
    }

    pub(crate) fn sort_key(&self) -> (&BondKey, BondStyle) {
        (&self.key, self.style)
    }
}

/// One `angles` row: quadratic bend about the central type `t2`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Angle {
    pub key: AngleKey,
    #[serde(default)]
    pub style: AngleStyle,
    pub k: f64,
    pub theta0_deg: f64,
    #[serde(default)]
    pub source: Option<String>,
}

impl Angle {
    pub fn new(t1: &str, t2: &str, t3: &str, k: f64, theta0_deg: f64) -> Self {
        Self {
            key: AngleKey::new(t1, t2, t3),
            style: AngleStyle::Quadratic,
            k,
            theta0_deg,
            source: None,
        }
    }

    pub fn with_source(mut self, source: Option<String>) -> Self {
        self.source = source;
        self
    }

    pub(crate) fn sort_key(&self) -> (&AngleKey, AngleStyle) {
        (&self.key, self.style)
    }
}

/// One `dihedrals` row: `E = k_phi * (1 + cos(n*phi - phi0))`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dihedral {
    pub key: DihedralKey,
    #[serde(default)]
    pub style: DihedralStyle,
    pub k_phi: f64,
    pub n: i32,
    pub phi0_deg: f64,
    #[serde(default)]
    pub source: Option<String>,
}

impl Dihedral {
    pub fn new(t1: &str, t2: &str, t3: &str, t4: &str, k_phi: f64, n: i32, phi0_deg: f64) -> Self {
        Self {
            key: DihedralKey::new(t1, t2, t3, t4),
            style: DihedralStyle::Torsion1,
            k_phi,
            n,
            phi0_deg,
            source: None,
        }
    }

    pub fn with_source(mut self, source: Option<String>) -> Self {
        self.source = source;
        self
    }

    pub(crate) fn sort_key(&self) -> (&DihedralKey, DihedralStyle) {
        (&self.key, self.style)
    }
}

/// One `pair_overrides` row: explicit A/B parameters for a type pair,
/// overriding the package-level combination rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairOverride {
    pub key: BondKey,
    pub lj_a: f64,
    pub lj_b: f64,
}

impl PairOverride {
    pub fn new(t1: &str, t2: &str, lj_a: f64, lj_b: f64) -> Self {
        Self {
            key: BondKey::new(t1, t2),
            lj_a,
            lj_b,
        }
    }
}
