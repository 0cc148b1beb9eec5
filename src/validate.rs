//! Schema and semantic validation over a canonical [`Package`].
//!
//! Validation is split from canonicalization: [`Package::canonicalize`] fixes
//! key ordering and sorting, this module reports what it cannot fix. The
//! whole issue list is returned rather than failing on the first problem, so
//! callers get bulk diagnostics and decide for themselves what is fatal.

use std::collections::BTreeSet;
use std::fmt;

use crate::model::package::Package;

/// One validation finding, identified by table and a stable message.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ValidationIssue {
    pub table: &'static str,
    pub message: String,
}

impl ValidationIssue {
    fn new(table: &'static str, message: impl Into<String>) -> Self {
        Self {
            table,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.table, self.message)
    }
}

/// Renders an issue list in the stable multi-line shape the CLI prints and
/// tests assert against.
pub fn report(issues: &[ValidationIssue]) -> String {
    let mut out = String::from("package validation failed:");
    for issue in issues {
        out.push_str("\n  - ");
        out.push_str(&issue.to_string());
    }
    out
}

/// Validates a package and returns every issue found, deterministically
/// ordered. Never mutates its input. An empty result means the package
/// satisfies all v0.1 invariants.
pub fn validate(pkg: &Package) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    check_atom_types(pkg, &mut issues);
    check_bonds(pkg, &mut issues);
    check_angles(pkg, &mut issues);
    check_dihedrals(pkg, &mut issues);
    check_pair_overrides(pkg, &mut issues);
    check_references(pkg, &mut issues);

    issues.sort();
    issues.dedup();
    issues
}

fn check_finite(
    table: &'static str,
    col: &str,
    value: f64,
    issues: &mut Vec<ValidationIssue>,
) {
    if !value.is_finite() {
        issues.push(ValidationIssue::new(
            table,
            format!("{}: contains non-finite values", col),
        ));
    }
}

fn check_atom_types(pkg: &Package, issues: &mut Vec<ValidationIssue>) {
    let table = "atom_types";
    let mut seen = BTreeSet::new();

    for at in &pkg.atom_types {
        if at.atom_type.trim().is_empty() {
            issues.push(ValidationIssue::new(
                table,
                "atom_type: contains empty/whitespace-only names",
            ));
            continue;
        }
        if !seen.insert(at.atom_type.as_str()) {
            issues.push(ValidationIssue::new(
                table,
                format!("duplicate key row for atom_type '{}'", at.atom_type),
            ));
        }

        // v0.1: every row declares lj_ab_12_6, so LJ parameters are required.
        match (at.lj_a, at.lj_b) {
            (Some(a), Some(b)) => {
                check_finite(table, "lj_a", a, issues);
                check_finite(table, "lj_b", b, issues);
            }
            _ => issues.push(ValidationIssue::new(
                table,
                format!(
                    "atom_type '{}': lj_a/lj_b required for vdw_style {}",
                    at.atom_type, at.vdw_style
                ),
            )),
        }

        if let Some(mass) = at.mass_amu {
            check_finite(table, "mass_amu", mass, issues);
            if mass.is_finite() && mass <= 0.0 {
                issues.push(ValidationIssue::new(
                    table,
                    format!("atom_type '{}': mass_amu must be positive", at.atom_type),
                ));
            }
        }
    }
}

fn check_bonds(pkg: &Package, issues: &mut Vec<ValidationIssue>) {
    let table = "bonds";
    let mut seen = BTreeSet::new();

    for b in &pkg.bonds {
        if b.key.t1.is_empty() || b.key.t2.is_empty() {
            issues.push(ValidationIssue::new(
                table,
                "t1/t2: contains empty/whitespace-only names",
            ));
            continue;
        }
        if !b.key.is_canonical() {
            issues.push(ValidationIssue::new(
                table,
                format!("key {} must satisfy t1 <= t2 (canonicalize before validate)", b.key),
            ));
        }
        if !seen.insert(b.sort_key()) {
            issues.push(ValidationIssue::new(
                table,
                format!("duplicate key row for {}", b.key),
            ));
        }
        check_finite(table, "k", b.k, issues);
        check_finite(table, "r0", b.r0, issues);
    }
}

fn check_angles(pkg: &Package, issues: &mut Vec<ValidationIssue>) {
    let table = "angles";
    let mut seen = BTreeSet::new();

    for a in &pkg.angles {
        if a.key.atom_types().iter().any(|t| t.is_empty()) {
            issues.push(ValidationIssue::new(
                table,
                "t1/t2/t3: contains empty/whitespace-only names",
            ));
            continue;
        }
        if !a.key.is_canonical() {
            issues.push(ValidationIssue::new(
                table,
                format!("key {} must satisfy t1 <= t3 (canonicalize before validate)", a.key),
            ));
        }
        if !seen.insert(a.sort_key()) {
            issues.push(ValidationIssue::new(
                table,
                format!("duplicate key row for {}", a.key),
            ));
        }
        check_finite(table, "k", a.k, issues);
        check_finite(table, "theta0_deg", a.theta0_deg, issues);
    }
}

fn check_dihedrals(pkg: &Package, issues: &mut Vec<ValidationIssue>) {
    let table = "dihedrals";
    let mut seen = BTreeSet::new();

    for d in &pkg.dihedrals {
        if d.key.atom_types().iter().any(|t| t.is_empty()) {
            issues.push(ValidationIssue::new(
                table,
                "t1..t4: contains empty/whitespace-only names",
            ));
            continue;
        }
        if !d.key.is_canonical() {
            issues.push(ValidationIssue::new(
                table,
                format!(
                    "key {} must be the smaller of forward and reversed order",
                    d.key
                ),
            ));
        }
        if !seen.insert(d.sort_key()) {
            issues.push(ValidationIssue::new(
                table,
                format!("duplicate key row for {}", d.key),
            ));
        }
        check_finite(table, "k_phi", d.k_phi, issues);
        check_finite(table, "phi0_deg", d.phi0_deg, issues);
        if d.n <= 0 {
            issues.push(ValidationIssue::new(
                table,
                format!("key {}: periodicity n must be positive", d.key),
            ));
        }
    }
}

fn check_pair_overrides(pkg: &Package, issues: &mut Vec<ValidationIssue>) {
    let table = "pair_overrides";
    let mut seen = BTreeSet::new();

    for p in &pkg.pair_overrides {
        if p.key.t1.is_empty() || p.key.t2.is_empty() {
            issues.push(ValidationIssue::new(
                table,
                "t1/t2: contains empty/whitespace-only names",
            ));
            continue;
        }
        if !p.key.is_canonical() {
            issues.push(ValidationIssue::new(
                table,
                format!("key {} must satisfy t1 <= t2 (canonicalize before validate)", p.key),
            ));
        }
        if !seen.insert(&p.key) {
            issues.push(ValidationIssue::new(
                table,
                format!("duplicate key row for {}", p.key),
            ));
        }
        check_finite(table, "lj_a", p.lj_a, issues);
        check_finite(table, "lj_b", p.lj_b, issues);
    }
}

/// Every type name referenced by a bonded or pairwise row must resolve to an
/// `atom_types` row.
fn check_references(pkg: &Package, issues: &mut Vec<ValidationIssue>) {
    let known: BTreeSet<&str> = pkg.atom_types.iter().map(|a| a.atom_type.as_str()).collect();

    let dangling = |table: &'static str, types: &[&str], issues: &mut Vec<ValidationIssue>| {
        for t in types {
            if !t.is_empty() && !known.contains(t) {
                issues.push(ValidationIssue::new(
                    table,
                    format!("references unknown atom_type '{}'", t),
                ));
            }
        }
    };

    for b in &pkg.bonds {
        dangling("bonds", &b.key.atom_types(), issues);
    }
    for a in &pkg.angles {
        dangling("angles", &a.key.atom_types(), issues);
    }
    for d in &pkg.dihedrals {
        dangling("dihedrals", &d.key.atom_types(), issues);
    }
    for p in &pkg.pair_overrides {
        dangling("pair_overrides", &p.key.atom_types(), issues);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::tables::{Angle, AtomType, Bond, Dihedral, PairOverride};

    fn atom(name: &str) -> AtomType {
        AtomType {
            lj_a: Some(1000.0),
            lj_b: Some(20.0),
            mass_amu: Some(12.011),
            ..AtomType::new(name)
        }
    }

    fn valid_package() -> Package {
        let mut pkg = Package::new();
        pkg.atom_types.push(atom("c3"));
        pkg.atom_types.push(atom("h"));
        pkg.atom_types.push(atom("o"));
        pkg.bonds.push(Bond::new("c3", "o", 320.0, 1.43));
        pkg.angles.push(Angle::new("h", "c3", "o", 50.0, 109.5));
        pkg.dihedrals.push(Dihedral::new("h", "c3", "o", "h", 0.5, 3, 0.0));
        pkg.pair_overrides.push(PairOverride::new("c3", "o", 900.0, 18.0));
        pkg.canonicalize();
        pkg
    }

    #[test]
    fn valid_package_has_no_issues() {
        assert!(validate(&valid_package()).is_empty());
    }

    #[test]
    fn duplicate_atom_type_is_reported() {
        let mut pkg = valid_package();
        pkg.atom_types.push(atom("c3"));
        pkg.canonicalize();
        let issues = validate(&pkg);
        assert!(issues
            .iter()
            .any(|i| i.table == "atom_types" && i.message.contains("duplicate")));
    }

    #[test]
    fn missing_lj_parameters_are_reported() {
        let mut pkg = valid_package();
        pkg.atom_types[0].lj_a = None;
        let issues = validate(&pkg);
        assert!(issues
            .iter()
            .any(|i| i.table == "atom_types" && i.message.contains("lj_a/lj_b required")));
    }

    #[test]
    fn uncanonical_bond_key_is_reported() {
        let mut pkg = valid_package();
        // Bypass the constructor to simulate a corrupted table.
        pkg.bonds[0].key.t1 = "o".to_string();
        pkg.bonds[0].key.t2 = "c3".to_string();
        let issues = validate(&pkg);
        assert!(issues.iter().any(|i| i.message.contains("t1 <= t2")));
    }

    #[test]
    fn dangling_reference_is_reported() {
        let mut pkg = valid_package();
        pkg.bonds.push(Bond::new("c3", "zz", 100.0, 1.5));
        pkg.canonicalize();
        let issues = validate(&pkg);
        assert!(issues
            .iter()
            .any(|i| i.table == "bonds" && i.message.contains("unknown atom_type 'zz'")));
    }

    #[test]
    fn non_finite_numerics_are_reported() {
        let mut pkg = valid_package();
        pkg.bonds[0].k = f64::NAN;
        pkg.angles[0].theta0_deg = f64::INFINITY;
        let issues = validate(&pkg);
        assert!(issues
            .iter()
            .any(|i| i.table == "bonds" && i.message.contains("non-finite")));
        assert!(issues
            .iter()
            .any(|i| i.table == "angles" && i.message.contains("non-finite")));
    }

    #[test]
    fn nonpositive_mass_is_reported() {
        let mut pkg = valid_package();
        pkg.atom_types[0].mass_amu = Some(-1.0);
        let issues = validate(&pkg);
        assert!(issues.iter().any(|i| i.message.contains("must be positive")));
    }

    #[test]
    fn report_shape_is_stable() {
        let issues = vec![ValidationIssue::new("bonds", "duplicate key row for (c3, o)")];
        let text = report(&issues);
        assert_eq!(
            text,
            "package validation failed:\n  - bonds: duplicate key row for (c3, o)"
        );
    }
}
