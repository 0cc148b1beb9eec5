use std::collections::BTreeSet;

use thiserror::Error;

use super::keys::{AngleKey, BondKey, DihedralKey};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequirementsError {
    #[error("{field}[{index}]: atom type names must be non-empty")]
    EmptyTypeName { field: &'static str, index: usize },
}

/// The declared need-set a consumer wants satisfied: atom-type names plus
/// canonicalized bond/angle/dihedral type keys.
///
/// Construction always canonicalizes. `BTreeSet` storage makes each category
/// unique and sorted, so iteration order is deterministic and two
/// requirement sets built from differently ordered input compare equal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Requirements {
    atom_types: BTreeSet<String>,
    bond_types: BTreeSet<BondKey>,
    angle_types: BTreeSet<AngleKey>,
    dihedral_types: BTreeSet<DihedralKey>,
}

impl Requirements {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a canonical requirement set from raw tuples. Empty or
    /// whitespace-only names are rejected; duplicates collapse.
    pub fn from_parts(
        atom_types: impl IntoIterator<Item = String>,
        bond_types: impl IntoIterator<Item = [String; 2]>,
        angle_types: impl IntoIterator<Item = [String; 3]>,
        dihedral_types: impl IntoIterator<Item = [String; 4]>,
    ) -> Result<Self, RequirementsError> {
        let mut req = Self::new();
        for (i, at) in atom_types.into_iter().enumerate() {
            req.insert_atom_type(&at)
                .map_err(|_| RequirementsError::EmptyTypeName {
                    field: "atom_types",
                    index: i,
                })?;
        }
        for (i, [a, b]) in bond_types.into_iter().enumerate() {
            check_parts("bond_types", i, &[&a, &b])?;
            req.insert_bond_type(BondKey::new(&a, &b));
        }
        for (i, [a, b, c]) in angle_types.into_iter().enumerate() {
            check_parts("angle_types", i, &[&a, &b, &c])?;
            req.insert_angle_type(AngleKey::new(&a, &b, &c));
        }
        for (i, [a, b, c, d]) in dihedral_types.into_iter().enumerate() {
            check_parts("dihedral_types", i, &[&a, &b, &c, &d])?;
            req.insert_dihedral_type(DihedralKey::new(&a, &b, &c, &d));
        }
        Ok(req)
    }

    pub fn insert_atom_type(&mut self, name: &str) -> Result<(), RequirementsError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(RequirementsError::EmptyTypeName {
                field: "atom_types",
                index: self.atom_types.len(),
            });
        }
        self.atom_types.insert(trimmed.to_string());
        Ok(())
    }

    pub fn insert_bond_type(&mut self, key: BondKey) {
        self.bond_types.insert(key);
    }

    pub fn insert_angle_type(&mut self, key: AngleKey) {
        self.angle_types.insert(key);
    }

    pub fn insert_dihedral_type(&mut self, key: DihedralKey) {
        self.dihedral_types.insert(key);
    }

    pub fn atom_types(&self) -> &BTreeSet<String> {
        &self.atom_types
    }

    pub fn bond_types(&self) -> &BTreeSet<BondKey> {
        &self.bond_types
    }

    pub fn angle_types(&self) -> &BTreeSet<AngleKey> {
        &self.angle_types
    }

    pub fn dihedral_types(&self) -> &BTreeSet<DihedralKey> {
        &self.dihedral_types
    }

    pub fn is_empty(&self) -> bool {
        self.atom_types.is_empty()
            && self.bond_types.is_empty()
            && self.angle_types.is_empty()
            && self.dihedral_types.is_empty()
    }
}

fn check_parts(field: &'static str, index: usize, parts: &[&str]) -> Result<(), RequirementsError> {
    if parts.iter().any(|p| p.trim().is_empty()) {
        return Err(RequirementsError::EmptyTypeName { field, index });
    }
    Ok(())
}
