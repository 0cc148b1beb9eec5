use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::keys::{AngleKey, BondKey, DihedralKey};
use super::tables::{Angle, AtomType, Bond, Dihedral, PairOverride};
use super::types::{CombinationRule, PairwiseForm};

/// A section the codec did not interpret: the exact header line plus its body
/// lines, verbatim. Text before the first real section is carried as a
/// synthetic section with header `#preamble`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnknownSection {
    pub header: String,
    pub body: Vec<String>,
}

pub const PREAMBLE_HEADER: &str = "#preamble";

impl UnknownSection {
    pub fn new(header: impl Into<String>, body: Vec<String>) -> Self {
        Self {
            header: header.into(),
            body,
        }
    }

    pub fn is_preamble(&self) -> bool {
        self.header == PREAMBLE_HEADER
    }
}

/// Declared measurement units for a package's numeric columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Units {
    pub length: String,
    pub energy: String,
    pub mass: String,
    pub angle: String,
}

impl Default for Units {
    fn default() -> Self {
        Self {
            length: "angstrom".to_string(),
            energy: "kcal/mol".to_string(),
            mass: "amu".to_string(),
            angle: "degree".to_string(),
        }
    }
}

/// Nonbonded convention declared by the source: pairwise parameter form and
/// the mixing rule for cross pairs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonbondedConvention {
    pub pairwise: PairwiseForm,
    pub combination: CombinationRule,
}

/// Where a package came from and under which conventions it was authored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Provenance {
    #[serde(default)]
    pub source_path: Option<PathBuf>,
    #[serde(default)]
    pub source_sha256: Option<String>,
    #[serde(default = "Units::default")]
    pub units: Units,
    #[serde(default)]
    pub nonbonded: NonbondedConvention,
    #[serde(default)]
    pub features: Vec<String>,
}

/// The aggregate every codec and resolver call operates on: all canonical
/// tables, the preserved unknown sections, and provenance metadata.
///
/// Equality is insertion-order independent for canonicalized packages: two
/// packages holding the same rows compare equal and serialize identically
/// after [`Package::canonicalize`]. The parser and the bundle loader both
/// canonicalize before handing a package out.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Package {
    pub atom_types: Vec<AtomType>,
    #[serde(default)]
    pub bonds: Vec<Bond>,
    #[serde(default)]
    pub angles: Vec<Angle>,
    #[serde(default)]
    pub dihedrals: Vec<Dihedral>,
    #[serde(default)]
    pub pair_overrides: Vec<PairOverride>,
    #[serde(default)]
    pub unknown_sections: Vec<UnknownSection>,
    #[serde(default)]
    pub provenance: Provenance,
}

impl Package {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-canonicalizes every row key and stable-sorts every table by its
    /// canonical key, in place. Unknown sections keep encounter order.
    pub fn canonicalize(&mut self) {
        for at in &mut self.atom_types {
            at.atom_type = at.atom_type.trim().to_string();
        }
        for b in &mut self.bonds {
            b.key = BondKey::new(&b.key.t1, &b.key.t2);
        }
        for a in &mut self.angles {
            a.key = AngleKey::new(&a.key.t1, &a.key.t2, &a.key.t3);
        }
        for d in &mut self.dihedrals {
            d.key = DihedralKey::new(&d.key.t1, &d.key.t2, &d.key.t3, &d.key.t4);
        }
        for p in &mut self.pair_overrides {
            p.key = BondKey::new(&p.key.t1, &p.key.t2);
        }

        self.atom_types
            .sort_by(|a, b| a.atom_type.cmp(&b.atom_type));
        self.bonds.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        self.angles.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        self.dihedrals
            .sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        self.pair_overrides.sort_by(|a, b| a.key.cmp(&b.key));
    }

    pub fn atom_type(&self, name: &str) -> Option<&AtomType> {
        self.atom_types.iter().find(|at| at.atom_type == name)
    }

    pub fn has_atom_type(&self, name: &str) -> bool {
        self.atom_type(name).is_some()
    }

    #[inline]
    pub fn row_count(&self) -> usize {
        self.atom_types.len()
            + self.bonds.len()
            + self.angles.len()
            + self.dihedrals.len()
            + self.pair_overrides.len()
    }

    pub fn preamble(&self) -> Option<&UnknownSection> {
        self.unknown_sections.iter().find(|s| s.is_preamble())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Package {
        let mut pkg = Package::new();
        pkg.atom_types.push(AtomType::new("o"));
        pkg.atom_types.push(AtomType::new("c3"));
        pkg.bonds.push(Bond::new("o", "c3", 320.0, 1.43));
        pkg.bonds.push(Bond::new("c3", "h", 340.0, 1.09));
        pkg
    }

    #[test]
    fn canonicalize_is_insertion_order_independent() {
        let mut fwd = sample();
        fwd.canonicalize();

        let mut rev = Package::new();
        rev.bonds.push(Bond::new("h", "c3", 340.0, 1.09));
        rev.bonds.push(Bond::new("c3", "o", 320.0, 1.43));
        rev.atom_types.push(AtomType::new("c3"));
        rev.atom_types.push(AtomType::new("o"));
        rev.canonicalize();

        assert_eq!(fwd, rev);
    }

    #[test]
    fn canonicalize_repairs_uncanonical_keys() {
        let mut pkg = Package::new();
        pkg.bonds.push(Bond {
            key: BondKey {
                t1: "o".to_string(),
                t2: "c3".to_string(),
            },
            ..Bond::new("c3", "o", 1.0, 1.0)
        });
        pkg.canonicalize();
        assert!(pkg.bonds[0].key.is_canonical());
    }

    #[test]
    fn atom_type_lookup() {
        let pkg = sample();
        assert!(pkg.has_atom_type("c3"));
        assert!(!pkg.has_atom_type("n4"));
    }
}
