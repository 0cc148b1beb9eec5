//! Minimal-subset resolution.
//!
//! `resolve_minimal` selects, per category, exactly the rows whose canonical
//! key appears in the requirement set, and reports every requirement with no
//! matching row as a [`MissingKey`]. The default policy fails closed: a
//! missing physical parameter is a correctness hazard, never something to
//! paper over with a default value.

use std::collections::BTreeSet;
use std::fmt;

use thiserror::Error;

use crate::model::package::Package;
use crate::model::requirements::Requirements;
use crate::model::resolved::{MissingKey, ResolvedFF};

/// What to do when requirement keys have no matching row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissingPolicy {
    /// Fail resolution (the caller still receives the partial subset and the
    /// complete missing list through the error).
    #[default]
    Fail,
    /// Return `Ok` despite missing keys; the missing list is still fully
    /// populated and the caller is expected to report it.
    Permit,
}

/// A resolution outcome: the selected subset plus every unsatisfied
/// requirement key, deterministically ordered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    pub ff: ResolvedFF,
    pub missing: Vec<MissingKey>,
}

impl Resolution {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Resolution failed because required terms are missing. Carries the partial
/// resolution so callers can inspect both the subset and the full missing
/// list.
#[derive(Debug, Clone, Error)]
pub struct MissingTermsError {
    pub resolution: Resolution,
}

impl fmt::Display for MissingTermsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "missing required terms:")?;
        for mk in &self.resolution.missing {
            write!(f, " [{}]", mk)?;
        }
        Ok(())
    }
}

/// Resolves the minimal subset of `pkg` needed to satisfy `req`.
///
/// Tuple requirements (bonds, angles, dihedrals) must also declare every atom
/// type they reference in the atom-type requirement set; an undeclared
/// referenced type is a modeling-input error and surfaces as a missing
/// atom-type key rather than being silently dropped.
///
/// Borrows both inputs read-only and never mutates them.
pub fn resolve_minimal(
    pkg: &Package,
    req: &Requirements,
    policy: MissingPolicy,
) -> Result<Resolution, MissingTermsError> {
    let mut missing: BTreeSet<MissingKey> = BTreeSet::new();

    // Atom types referenced by tuple requirements but not declared.
    for key in req.bond_types() {
        for t in key.atom_types() {
            if !req.atom_types().contains(t) {
                missing.insert(MissingKey::AtomTypes(t.to_string()));
            }
        }
    }
    for key in req.angle_types() {
        for t in key.atom_types() {
            if !req.atom_types().contains(t) {
                missing.insert(MissingKey::AtomTypes(t.to_string()));
            }
        }
    }
    for key in req.dihedral_types() {
        for t in key.atom_types() {
            if !req.atom_types().contains(t) {
                missing.insert(MissingKey::AtomTypes(t.to_string()));
            }
        }
    }

    let mut ff = ResolvedFF {
        requirements: req.clone(),
        ..ResolvedFF::default()
    };

    let present_atoms: BTreeSet<&str> =
        pkg.atom_types.iter().map(|a| a.atom_type.as_str()).collect();
    for name in req.atom_types() {
        if !present_atoms.contains(name.as_str()) {
            missing.insert(MissingKey::AtomTypes(name.clone()));
        }
    }
    ff.atom_types = pkg
        .atom_types
        .iter()
        .filter(|a| req.atom_types().contains(&a.atom_type))
        .cloned()
        .collect();

    ff.bonds = pkg
        .bonds
        .iter()
        .filter(|b| req.bond_types().contains(&b.key))
        .cloned()
        .collect();
    let present: BTreeSet<_> = ff.bonds.iter().map(|b| &b.key).collect();
    for key in req.bond_types() {
        if !present.contains(key) {
            missing.insert(MissingKey::BondTypes(key.clone()));
        }
    }

    ff.angles = pkg
        .angles
        .iter()
        .filter(|a| req.angle_types().contains(&a.key))
        .cloned()
        .collect();
    let present: BTreeSet<_> = ff.angles.iter().map(|a| &a.key).collect();
    for key in req.angle_types() {
        if !present.contains(key) {
            missing.insert(MissingKey::AngleTypes(key.clone()));
        }
    }

    ff.dihedrals = pkg
        .dihedrals
        .iter()
        .filter(|d| req.dihedral_types().contains(&d.key))
        .cloned()
        .collect();
    let present: BTreeSet<_> = ff.dihedrals.iter().map(|d| &d.key).collect();
    for key in req.dihedral_types() {
        if !present.contains(key) {
            missing.insert(MissingKey::DihedralTypes(key.clone()));
        }
    }

    // No requirement category exists for pair overrides; an override travels
    // with its endpoints when both are required atom types.
    ff.pair_overrides = pkg
        .pair_overrides
        .iter()
        .filter(|p| {
            req.atom_types().contains(&p.key.t1) && req.atom_types().contains(&p.key.t2)
        })
        .cloned()
        .collect();

    let resolution = Resolution {
        ff,
        missing: missing.into_iter().collect(),
    };

    match policy {
        MissingPolicy::Fail if !resolution.is_complete() => {
            Err(MissingTermsError { resolution })
        }
        _ => Ok(resolution),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::keys::BondKey;
    use crate::model::tables::{AtomType, Bond, PairOverride};

    fn atom(name: &str) -> AtomType {
        AtomType {
            lj_a: Some(1000.0),
            lj_b: Some(20.0),
            ..AtomType::new(name)
        }
    }

    fn sample_package() -> Package {
        let mut pkg = Package::new();
        for name in ["c3", "o", "h", "n"] {
            pkg.atom_types.push(atom(name));
        }
        pkg.bonds.push(Bond::new("c3", "o", 320.0, 1.43));
        pkg.bonds.push(Bond::new("c3", "h", 340.0, 1.09));
        pkg.bonds.push(Bond::new("n", "o", 400.0, 1.20));
        pkg.canonicalize();
        pkg
    }

    fn req(atoms: &[&str], bonds: &[[&str; 2]]) -> Requirements {
        Requirements::from_parts(
            atoms.iter().map(|s| s.to_string()),
            bonds
                .iter()
                .map(|[a, b]| [a.to_string(), b.to_string()]),
            vec![],
            vec![],
        )
        .unwrap()
    }

    #[test]
    fn resolves_exact_subset_with_canonicalized_input_pairs() {
        // ["o","c3"] canonicalizes to (c3,o).
        let r = req(&["c3", "o", "h"], &[["o", "c3"], ["c3", "h"]]);
        let res = resolve_minimal(&sample_package(), &r, MissingPolicy::Fail).unwrap();

        let names: Vec<_> = res.ff.atom_types.iter().map(|a| a.atom_type.as_str()).collect();
        assert_eq!(names, ["c3", "h", "o"]);
        assert_eq!(res.ff.bonds.len(), 2);
        assert!(res.ff.bonds.iter().any(|b| b.key == BondKey::new("c3", "o")));
        assert!(res.ff.bonds.iter().any(|b| b.key == BondKey::new("c3", "h")));
        assert!(res.missing.is_empty());
    }

    #[test]
    fn missing_atom_type_fails_by_default() {
        let r = req(&["c3", "o", "h", "x"], &[]);
        let err = resolve_minimal(&sample_package(), &r, MissingPolicy::Fail).unwrap_err();
        assert_eq!(
            err.resolution.missing,
            vec![MissingKey::AtomTypes("x".to_string())]
        );
        // Partial subset still carries the rows that did resolve.
        assert_eq!(err.resolution.ff.atom_types.len(), 3);
    }

    #[test]
    fn permit_mode_still_surfaces_every_missing_key() {
        let r = req(&["c3", "x"], &[["x", "c3"]]);
        let res = resolve_minimal(&sample_package(), &r, MissingPolicy::Permit).unwrap();
        assert!(res
            .missing
            .contains(&MissingKey::AtomTypes("x".to_string())));
        assert!(res
            .missing
            .contains(&MissingKey::BondTypes(BondKey::new("c3", "x"))));
    }

    #[test]
    fn undeclared_referenced_atom_type_is_a_modeling_error() {
        // Bond requirement references "o", which is absent from atom_types.
        let r = req(&["c3"], &[["c3", "o"]]);
        let err = resolve_minimal(&sample_package(), &r, MissingPolicy::Fail).unwrap_err();
        assert!(err
            .resolution
            .missing
            .contains(&MissingKey::AtomTypes("o".to_string())));
        // The bond row itself exists in the package, so it resolves.
        assert_eq!(err.resolution.ff.bonds.len(), 1);
    }

    #[test]
    fn pair_overrides_follow_required_atom_types() {
        let mut pkg = sample_package();
        pkg.pair_overrides.push(PairOverride::new("c3", "o", 900.0, 18.0));
        pkg.pair_overrides.push(PairOverride::new("c3", "n", 800.0, 15.0));
        pkg.canonicalize();

        let r = req(&["c3", "o"], &[]);
        let res = resolve_minimal(&pkg, &r, MissingPolicy::Fail).unwrap();
        assert_eq!(res.ff.pair_overrides.len(), 1);
        assert_eq!(res.ff.pair_overrides[0].key, BondKey::new("c3", "o"));
    }

    #[test]
    fn inputs_are_not_mutated() {
        let pkg = sample_package();
        let before = pkg.clone();
        let r = req(&["c3"], &[]);
        let _ = resolve_minimal(&pkg, &r, MissingPolicy::Fail);
        assert_eq!(pkg, before);
    }

    #[test]
    fn empty_requirements_resolve_to_empty_subset() {
        let res =
            resolve_minimal(&sample_package(), &Requirements::new(), MissingPolicy::Fail).unwrap();
        assert_eq!(res.ff.row_count(), 0);
        assert!(res.is_complete());
    }
}
