use std::io::Write;

use crate::io::error::Error;
use crate::model::package::{Package, UnknownSection};
use crate::model::resolved::ResolvedFF;
use crate::model::tables::{Angle, AtomType, Bond, Dihedral, PairOverride};

/// Downstream MSI tooling refuses files without the `!BIOSYM` banner, so a
/// minimal one is emitted whenever no preserved preamble exists.
const MINIMAL_PREAMBLE: &[&str] = &[
    "!BIOSYM forcefield          1",
    "",
    "#version pforge.frc\t1.0",
    "",
];

#[derive(Debug, Clone, Copy, Default)]
pub struct WriteOptions {
    /// Re-emit preserved unknown sections after the supported ones, in
    /// encounter order. Off by default: unknown content is retained for
    /// inspection, not silently round-tripped into derived exports.
    pub include_raw: bool,
}

/// Exports every populated table of a package.
pub fn write_full<W: Write>(writer: &mut W, pkg: &Package, opts: WriteOptions) -> Result<(), Error> {
    let view = TableView {
        atom_types: &pkg.atom_types,
        bonds: &pkg.bonds,
        angles: &pkg.angles,
        dihedrals: &pkg.dihedrals,
        pair_overrides: &pkg.pair_overrides,
        unknown_sections: &pkg.unknown_sections,
    };
    write_view(writer, &view, opts)
}

/// Exports exactly the rows a resolution selected, through the same section
/// formatters as [`write_full`], so shared rows are byte-identical across the
/// two modes.
pub fn write_minimal<W: Write>(
    writer: &mut W,
    ff: &ResolvedFF,
    opts: WriteOptions,
) -> Result<(), Error> {
    let view = TableView {
        atom_types: &ff.atom_types,
        bonds: &ff.bonds,
        angles: &ff.angles,
        dihedrals: &ff.dihedrals,
        pair_overrides: &ff.pair_overrides,
        unknown_sections: &[],
    };
    write_view(writer, &view, opts)
}

/// The single serialization input both export modes reduce to.
struct TableView<'a> {
    atom_types: &'a [AtomType],
    bonds: &'a [Bond],
    angles: &'a [Angle],
    dihedrals: &'a [Dihedral],
    pair_overrides: &'a [PairOverride],
    unknown_sections: &'a [UnknownSection],
}

fn write_view<W: Write>(writer: &mut W, view: &TableView<'_>, opts: WriteOptions) -> Result<(), Error> {
    let mut lines: Vec<String> = Vec::new();

    let preamble = view.unknown_sections.iter().find(|s| s.is_preamble());
    match preamble {
        Some(p) if !p.body.is_empty() => lines.extend(p.body.iter().cloned()),
        _ => lines.extend(MINIMAL_PREAMBLE.iter().map(|s| s.to_string())),
    }

    if !view.atom_types.is_empty() {
        push_atom_types(&mut lines, view.atom_types);
    }
    if !view.bonds.is_empty() {
        push_bonds(&mut lines, view.bonds);
    }
    if !view.angles.is_empty() {
        push_angles(&mut lines, view.angles);
    }
    if !view.dihedrals.is_empty() {
        push_torsions(&mut lines, view.dihedrals);
    }
    if view.atom_types.iter().any(|a| a.lj_a.is_some()) || !view.pair_overrides.is_empty() {
        push_nonbond(&mut lines, view.atom_types, view.pair_overrides);
    }

    if opts.include_raw {
        for section in view.unknown_sections.iter().filter(|s| !s.is_preamble()) {
            lines.push(section.header.clone());
            lines.extend(section.body.iter().cloned());
        }
    }

    for line in &lines {
        writeln!(writer, "{}", line)?;
    }
    Ok(())
}

fn push_atom_types(lines: &mut Vec<String>, rows: &[AtomType]) {
    lines.push("#atom_types".to_string());
    for at in rows {
        let mass = match at.mass_amu {
            Some(m) => fmt_float(m),
            None => "0.0".to_string(),
        };
        let element = at.element.as_deref().unwrap_or("?");
        let mut parts = vec![
            "1.0".to_string(),
            "1".to_string(),
            at.atom_type.clone(),
            mass,
            element.to_string(),
        ];
        if let Some(notes) = &at.notes {
            parts.push(notes.clone());
        }
        lines.push(format!("  {}", parts.join("  ")));
    }
    lines.push(String::new());
}

/// Bond rows re-import through the magnitude test in the reader's bond
/// decoder: a first value `<= 10` followed by one `> 10` reads back as
/// `(r0, k)`, anything else reads back in file order as `(k, r0)`. The column
/// order here is chosen per row so that test recovers this row's values, so
/// neither side can change its rule without the other.
fn push_bonds(lines: &mut Vec<String>, rows: &[Bond]) {
    lines.push("#quadratic_bond".to_string());
    for b in rows {
        let (first, second) = if b.r0 <= 10.0 && b.k > 10.0 {
            (b.r0, b.k)
        } else {
            (b.k, b.r0)
        };
        let mut parts = vec![
            "1.0".to_string(),
            "1".to_string(),
            b.key.t1.clone(),
            b.key.t2.clone(),
            fmt_float(first),
            fmt_float(second),
        ];
        if let Some(source) = &b.source {
            parts.push(source.clone());
        }
        lines.push(format!("  {}", parts.join("  ")));
    }
    lines.push(String::new());
}

fn push_angles(lines: &mut Vec<String>, rows: &[Angle]) {
    lines.push("#quadratic_angle".to_string());
    for a in rows {
        let mut parts = vec![
            "1.0".to_string(),
            "1".to_string(),
            a.key.t1.clone(),
            a.key.t2.clone(),
            a.key.t3.clone(),
            fmt_float(a.theta0_deg),
            fmt_float(a.k),
        ];
        if let Some(source) = &a.source {
            parts.push(source.clone());
        }
        lines.push(format!("  {}", parts.join("  ")));
    }
    lines.push(String::new());
}

fn push_torsions(lines: &mut Vec<String>, rows: &[Dihedral]) {
    lines.push("#torsion_1".to_string());
    for d in rows {
        let mut parts = vec![
            "1.0".to_string(),
            "1".to_string(),
            d.key.t1.clone(),
            d.key.t2.clone(),
            d.key.t3.clone(),
            d.key.t4.clone(),
            fmt_float(d.k_phi),
            d.n.to_string(),
            fmt_float(d.phi0_deg),
        ];
        if let Some(source) = &d.source {
            parts.push(source.clone());
        }
        lines.push(format!("  {}", parts.join("  ")));
    }
    lines.push(String::new());
}

fn push_nonbond(lines: &mut Vec<String>, atoms: &[AtomType], overrides: &[PairOverride]) {
    lines.push("#nonbond(12-6)".to_string());
    lines.push("  @type A-B".to_string());
    lines.push("  @combination geometric".to_string());
    for at in atoms {
        if let (Some(a), Some(b)) = (at.lj_a, at.lj_b) {
            lines.push(format!(
                "  1.0  1  {}  {}  {}",
                at.atom_type,
                fmt_float(a),
                fmt_float(b)
            ));
        }
    }
    for p in overrides {
        lines.push(format!(
            "  1.0  1  {}  {}  {}  {}",
            p.key.t1,
            p.key.t2,
            fmt_float(p.lj_a),
            fmt_float(p.lj_b)
        ));
    }
    lines.push(String::new());
}

/// `%.8g`-equivalent formatting: 8 significant digits, fixed notation while
/// the decimal exponent is in `[-4, 7]`, scientific otherwise, trailing zeros
/// trimmed. Implemented locally so output bytes are identical on every
/// platform.
pub(crate) fn fmt_float(x: f64) -> String {
    if x == 0.0 {
        return "0".to_string();
    }
    if !x.is_finite() {
        return x.to_string();
    }

    let sci = format!("{:.7e}", x);
    let (mantissa, exp) = match sci.split_once('e') {
        Some((m, e)) => (m.to_string(), e.parse::<i32>().unwrap_or(0)),
        None => (sci, 0),
    };

    if (-4..8).contains(&exp) {
        let decimals = (7 - exp).max(0) as usize;
        let mut out = format!("{:.*}", decimals, x);
        trim_trailing_zeros(&mut out);
        out
    } else {
        let mut m = mantissa;
        trim_trailing_zeros(&mut m);
        format!("{}e{}{:02}", m, if exp < 0 { '-' } else { '+' }, exp.abs())
    }
}

fn trim_trailing_zeros(s: &mut String) {
    if s.contains('.') {
        while s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::frc::reader;
    use crate::model::package::PREAMBLE_HEADER;
    use crate::model::requirements::Requirements;
    use crate::model::resolved::ResolvedFF;

    fn sample_package() -> Package {
        let mut pkg = Package::new();
        let mut c3 = AtomType::new("c3");
        c3.element = Some("C".to_string());
        c3.mass_amu = Some(12.01115);
        c3.lj_a = Some(1790340.7);
        c3.lj_b = Some(528.48);
        let mut h = AtomType::new("h");
        h.element = Some("H".to_string());
        h.mass_amu = Some(1.00797);
        h.lj_a = Some(7516.0);
        h.lj_b = Some(32.0);
        let mut o = AtomType::new("o");
        o.element = Some("O".to_string());
        o.mass_amu = Some(15.9994);
        o.lj_a = Some(272894.8);
        o.lj_b = Some(498.88);
        pkg.atom_types = vec![c3, h, o];
        pkg.bonds.push(Bond::new("c3", "o", 320.0, 1.43));
        pkg.bonds
            .push(Bond::new("c3", "h", 340.0, 1.09).with_source(Some("gaff".to_string())));
        pkg.angles.push(Angle::new("h", "c3", "o", 50.0, 109.5));
        pkg.dihedrals
            .push(Dihedral::new("h", "c3", "o", "h", 0.16, 3, 0.0));
        pkg.pair_overrides
            .push(PairOverride::new("c3", "o", 900000.0, 560.0));
        pkg.canonicalize();
        pkg
    }

    fn export_full_string(pkg: &Package, opts: WriteOptions) -> String {
        let mut buf = Vec::new();
        write_full(&mut buf, pkg, opts).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn fmt_float_matches_printf_g8() {
        assert_eq!(fmt_float(0.0), "0");
        assert_eq!(fmt_float(1.43), "1.43");
        assert_eq!(fmt_float(320.0), "320");
        assert_eq!(fmt_float(12.01115), "12.01115");
        assert_eq!(fmt_float(-0.03), "-0.03");
        assert_eq!(fmt_float(1790340.7), "1790340.7");
        assert_eq!(fmt_float(0.00012345678), "0.00012345678");
        assert_eq!(fmt_float(123456789.0), "1.2345679e+08");
        assert_eq!(fmt_float(0.000012345678), "1.2345678e-05");
        assert_eq!(fmt_float(1e10), "1e+10");
    }

    #[test]
    fn round_trips_every_supported_table() {
        let pkg = sample_package();
        let text = export_full_string(&pkg, WriteOptions::default());
        let reparsed = reader::parse_str(&text).unwrap();
        assert!(reparsed.row_errors.is_empty());
        assert_eq!(reparsed.package.atom_types, pkg.atom_types);
        assert_eq!(reparsed.package.bonds, pkg.bonds);
        assert_eq!(reparsed.package.angles, pkg.angles);
        assert_eq!(reparsed.package.dihedrals, pkg.dihedrals);
        assert_eq!(reparsed.package.pair_overrides, pkg.pair_overrides);
    }

    #[test]
    fn small_magnitude_bonds_round_trip() {
        let mut pkg = sample_package();
        pkg.bonds.push(Bond::new("c3", "c3", 5.0, 1.2));
        pkg.canonicalize();

        let text = export_full_string(&pkg, WriteOptions::default());
        let reparsed = reader::parse_str(&text).unwrap();
        assert!(reparsed.row_errors.is_empty());
        assert_eq!(reparsed.package.bonds, pkg.bonds);
    }

    #[test]
    fn round_trips_absent_element_and_mass() {
        let mut pkg = sample_package();
        pkg.atom_types[0].element = None;
        pkg.atom_types[0].mass_amu = None;
        let text = export_full_string(&pkg, WriteOptions::default());
        let reparsed = reader::parse_str(&text).unwrap();
        let at = reparsed.package.atom_type("c3").unwrap();
        assert_eq!(at.element, None);
        assert_eq!(at.mass_amu, None);
    }

    #[test]
    fn export_is_byte_deterministic() {
        let pkg = sample_package();
        let a = export_full_string(&pkg, WriteOptions::default());
        let b = export_full_string(&pkg, WriteOptions::default());
        assert_eq!(a, b);
    }

    #[test]
    fn minimal_preamble_is_emitted_when_none_preserved() {
        let pkg = sample_package();
        let text = export_full_string(&pkg, WriteOptions::default());
        assert!(text.starts_with("!BIOSYM forcefield"));
    }

    #[test]
    fn preserved_preamble_wins_over_minimal_one() {
        let mut pkg = sample_package();
        pkg.unknown_sections.push(UnknownSection::new(
            PREAMBLE_HEADER,
            vec!["!BIOSYM forcefield          1".to_string(), "! custom".to_string()],
        ));
        let text = export_full_string(&pkg, WriteOptions::default());
        assert!(text.starts_with("!BIOSYM forcefield          1\n! custom\n"));
    }

    #[test]
    fn unknown_sections_only_with_include_raw() {
        let mut pkg = sample_package();
        pkg.unknown_sections.push(UnknownSection::new(
            "#out_of_plane",
            vec!["  c3  o  o  o  10.0  0.0".to_string()],
        ));

        let without = export_full_string(&pkg, WriteOptions::default());
        assert!(!without.contains("#out_of_plane"));

        let with = export_full_string(&pkg, WriteOptions { include_raw: true });
        assert!(with.contains("#out_of_plane\n  c3  o  o  o  10.0  0.0\n"));
    }

    #[test]
    fn minimal_mode_shares_row_bytes_with_full_mode() {
        let pkg = sample_package();
        let full = export_full_string(&pkg, WriteOptions::default());

        let ff = ResolvedFF {
            requirements: Requirements::new(),
            atom_types: pkg.atom_types.clone(),
            bonds: pkg.bonds.clone(),
            angles: vec![],
            dihedrals: vec![],
            pair_overrides: vec![],
        };
        let mut buf = Vec::new();
        write_minimal(&mut buf, &ff, WriteOptions::default()).unwrap();
        let minimal = String::from_utf8(buf).unwrap();

        for line in minimal.lines().filter(|l| l.starts_with("  1.0")) {
            assert!(full.contains(line), "row not shared byte-for-byte: {line}");
        }
    }
}
