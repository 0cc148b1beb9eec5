use std::fmt;

use serde::Serialize;

use super::keys::{AngleKey, BondKey, DihedralKey};
use super::requirements::Requirements;
use super::tables::{Angle, AtomType, Bond, Dihedral, PairOverride};

/// Requirement category a missing key belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    AtomTypes,
    BondTypes,
    AngleTypes,
    DihedralTypes,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::AtomTypes => write!(f, "atom_types"),
            Category::BondTypes => write!(f, "bond_types"),
            Category::AngleTypes => write!(f, "angle_types"),
            Category::DihedralTypes => write!(f, "dihedral_types"),
        }
    }
}

/// A requirement entry no package row satisfied. Serializes to
/// `{"category": ..., "key": ...}` for the missing-terms report.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(tag = "category", content = "key", rename_all = "snake_case")]
pub enum MissingKey {
    AtomTypes(String),
    BondTypes(BondKey),
    AngleTypes(AngleKey),
    DihedralTypes(DihedralKey),
}

impl MissingKey {
    pub fn category(&self) -> Category {
        match self {
            MissingKey::AtomTypes(_) => Category::AtomTypes,
            MissingKey::BondTypes(_) => Category::BondTypes,
            MissingKey::AngleTypes(_) => Category::AngleTypes,
            MissingKey::DihedralTypes(_) => Category::DihedralTypes,
        }
    }
}

impl fmt::Display for MissingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingKey::AtomTypes(t) => write!(f, "atom_types: {}", t),
            MissingKey::BondTypes(k) => write!(f, "bond_types: {}", k),
            MissingKey::AngleTypes(k) => write!(f, "angle_types: {}", k),
            MissingKey::DihedralTypes(k) => write!(f, "dihedral_types: {}", k),
        }
    }
}

/// The resolver's output: per-table subsets (already in canonical order,
/// since they are filtered from canonicalized tables) plus the requirement
/// set they were resolved against.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedFF {
    pub requirements: Requirements,
    pub atom_types: Vec<AtomType>,
    pub bonds: Vec<Bond>,
    pub angles: Vec<Angle>,
    pub dihedrals: Vec<Dihedral>,
    pub pair_overrides: Vec<PairOverride>,
}

impl ResolvedFF {
    #[inline]
    pub fn row_count(&self) -> usize {
        self.atom_types.len()
            + self.bonds.len()
            + self.angles.len()
            + self.dihedrals.len()
            + self.pair_overrides.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_serializes_with_category_tag() {
        let mk = MissingKey::BondTypes(BondKey::new("o", "c3"));
        let json = serde_json::to_string(&mk).unwrap();
        assert_eq!(json, r#"{"category":"bond_types","key":["c3","o"]}"#);
    }

    #[test]
    fn missing_atom_type_serializes_plain_key() {
        let mk = MissingKey::AtomTypes("x".to_string());
        let json = serde_json::to_string(&mk).unwrap();
        assert_eq!(json, r#"{"category":"atom_types","key":"x"}"#);
    }

    #[test]
    fn category_accessor_matches_variant() {
        assert_eq!(
            MissingKey::AtomTypes("x".into()).category(),
            Category::AtomTypes
        );
        assert_eq!(
            MissingKey::DihedralTypes(DihedralKey::new("a", "b", "c", "d")).category(),
            Category::DihedralTypes
        );
    }
}
