use std::collections::BTreeMap;
use std::fmt;
use std::io::BufRead;

use crate::io::error::Error;
use crate::model::package::{Package, UnknownSection, PREAMBLE_HEADER};
use crate::model::tables::{Angle, AtomType, Bond, Dihedral, PairOverride};

use super::scan::{is_float_like, is_ignorable, last_float_run, strip_inline_comment, trailing_source};
use super::SectionKind;

/// A data row the decoder could not interpret. The row is skipped and the
/// rest of the section continues; callers decide whether any row error is
/// fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    pub section: String,
    pub line: usize,
    pub raw: String,
    pub details: String,
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (line {}): {}: {:?}",
            self.section, self.line, self.details, self.raw
        )
    }
}

/// Parse result: the decoded package plus every skipped row.
#[derive(Debug, Clone)]
pub struct FrcImport {
    pub package: Package,
    pub row_errors: Vec<RowError>,
}

pub fn read<R: BufRead>(mut reader: R) -> Result<FrcImport, Error> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    parse_str(&text)
}

pub fn parse_str(text: &str) -> Result<FrcImport, Error> {
    let (sections, mut unknown) = split_sections(text);

    let mut pkg = Package::new();
    let mut errors = Vec::new();
    // atom_type -> (lj_a, lj_b); last section wins in file order.
    let mut nonbond: BTreeMap<String, (f64, f64)> = BTreeMap::new();

    for section in &sections {
        let mut header_tokens = section.header.split_whitespace();
        let key = header_tokens
            .next()
            .map(|t| t.to_ascii_lowercase())
            .unwrap_or_default();
        let suffix = {
            let rest = header_tokens.collect::<Vec<_>>().join(" ");
            if rest.is_empty() { None } else { Some(rest) }
        };

        match SectionKind::from_header_key(&key) {
            Some(SectionKind::AtomTypes) => {
                decode_atom_types(section, &mut pkg.atom_types);
            }
            Some(SectionKind::QuadraticBond) => {
                decode_bonds(section, suffix.as_deref(), &mut pkg.bonds, &mut errors);
            }
            Some(SectionKind::QuadraticAngle) => {
                decode_angles(section, suffix.as_deref(), &mut pkg.angles, &mut errors);
            }
            Some(SectionKind::Torsion1) => {
                decode_torsions(section, suffix.as_deref(), &mut pkg.dihedrals, &mut errors);
            }
            Some(SectionKind::Nonbond12_6) => {
                match check_nonbond_directives(section) {
                    Ok(()) => decode_nonbond(
                        section,
                        &mut nonbond,
                        &mut pkg.pair_overrides,
                        &mut errors,
                    ),
                    // An unfamiliar or absent directive means the rows follow
                    // a convention this version does not model. Preserving the
                    // section opaquely is the only reading that cannot assign
                    // parameters a wrong meaning.
                    Err(_) => unknown.push(UnknownSection::new(
                        section.header.clone(),
                        section.body.iter().map(|(_, l)| l.clone()).collect(),
                    )),
                }
            }
            None => unknown.push(UnknownSection::new(
                section.header.clone(),
                section.body.iter().map(|(_, l)| l.clone()).collect(),
            )),
        }
    }

    if pkg.atom_types.is_empty() {
        return Err(Error::MissingSection("#atom_types"));
    }

    for at in &mut pkg.atom_types {
        if let Some(&(a, b)) = nonbond.get(&at.atom_type) {
            at.lj_a = Some(a);
            at.lj_b = Some(b);
        }
    }

    pkg.unknown_sections = unknown;
    pkg.canonicalize();

    Ok(FrcImport {
        package: pkg,
        row_errors: errors,
    })
}

struct RawSection {
    header: String,
    body: Vec<(usize, String)>,
}

/// Splits text into `#`-headed sections. Lines before the first header become
/// a synthetic `#preamble` unknown section so exports can reproduce them.
fn split_sections(text: &str) -> (Vec<RawSection>, Vec<UnknownSection>) {
    let mut sections: Vec<RawSection> = Vec::new();
    let mut unknown = Vec::new();
    let mut preamble: Vec<String> = Vec::new();
    let mut in_preamble = true;

    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        if line.trim_start().starts_with('#') {
            in_preamble = false;
            sections.push(RawSection {
                header: line.to_string(),
                body: Vec::new(),
            });
        } else if in_preamble {
            preamble.push(line.to_string());
        } else if let Some(current) = sections.last_mut() {
            current.body.push((line_no, line.to_string()));
        }
    }

    if !preamble.is_empty() {
        unknown.push(UnknownSection::new(PREAMBLE_HEADER, preamble));
    }

    (sections, unknown)
}

/// Yields `(line_no, content)` for decodable rows, with prose lines dropped
/// and inline comments stripped.
fn data_rows(section: &RawSection) -> impl Iterator<Item = (usize, &str)> {
    section.body.iter().filter_map(|(line_no, raw)| {
        if is_ignorable(raw) {
            return None;
        }
        let s = strip_inline_comment(raw);
        if s.trim().is_empty() {
            None
        } else {
            Some((*line_no, s))
        }
    })
}

fn row_error(kind: SectionKind, line: usize, raw: &str, details: impl Into<String>) -> RowError {
    RowError {
        section: kind.name().to_string(),
        line,
        raw: raw.trim().to_string(),
        details: details.into(),
    }
}

/// `?` and non-positive masses are the export sentinels for absent values, so
/// both read back as `None`.
fn element_from(tok: &str) -> Option<String> {
    if tok == "?" {
        None
    } else {
        Some(tok.to_string())
    }
}

fn mass_from(value: f64) -> Option<f64> {
    if value > 0.0 {
        Some(value)
    } else {
        None
    }
}

/// Accepts both the minimal layout `type element mass [notes...]` and the MSI
/// asset layout `ver ref type mass element [notes...]`. Deliberately lenient:
/// a row with a bare type name is still a declaration.
fn decode_atom_types(section: &RawSection, out: &mut Vec<AtomType>) {
    for (_, row) in data_rows(section) {
        let toks: Vec<&str> = row.split_whitespace().collect();
        if toks.is_empty() {
            continue;
        }

        // Asset layout: numeric ver, ref and mass columns around the name.
        if toks.len() >= 5
            && is_float_like(toks[0])
            && is_float_like(toks[1])
            && is_float_like(toks[3])
        {
            if let Ok(mass) = toks[3].parse::<f64>() {
                let mut at = AtomType::new(toks[2]);
                at.mass_amu = mass_from(mass);
                at.element = element_from(toks[4]);
                at.notes = trailing_source(&toks, 5);
                out.push(at);
                continue;
            }
        }

        let mut at = AtomType::new(toks[0]);
        at.element = toks.get(1).and_then(|t| element_from(t));
        at.mass_amu = toks
            .get(2)
            .and_then(|t| t.parse::<f64>().ok())
            .and_then(mass_from);
        at.notes = trailing_source(&toks, 3);
        out.push(at);
    }
}

/// Recovers `(k, r0)` from the trailing numeric pair by magnitude: a first
/// value `<= 10` followed by one `> 10` is `(r0, k)`, any other combination is
/// taken in file order as `(k, r0)`. The bond emitter in the writer picks its
/// column order against this same test, so the two must change together.
fn decode_bonds(
    section: &RawSection,
    source_default: Option<&str>,
    out: &mut Vec<Bond>,
    errors: &mut Vec<RowError>,
) {
    const KIND: SectionKind = SectionKind::QuadraticBond;
    for (line, row) in data_rows(section) {
        let toks: Vec<&str> = row.split_whitespace().collect();
        if toks.len() < 4 {
            errors.push(row_error(KIND, line, row, "expected at least 4 columns"));
            continue;
        }
        let Some(i) = last_float_run(&toks, 2) else {
            errors.push(row_error(KIND, line, row, "no trailing numeric pair"));
            continue;
        };
        if i < 2 {
            errors.push(row_error(KIND, line, row, "no (t1, t2) before numeric pair"));
            continue;
        }
        let (a, b) = parse_pair(toks[i], toks[i + 1]);

        // Typical magnitudes: r0 is 0.9-3.5 angstrom, k is O(100)+. When both
        // land on the same side of 10 the minimal-layout order (k, r0) holds.
        let (k, r0) = if a <= 10.0 && b > 10.0 {
            (b, a)
        } else {
            (a, b)
        };

        let source = source_default
            .map(str::to_string)
            .or_else(|| trailing_source(&toks, i + 2));
        out.push(Bond::new(toks[i - 2], toks[i - 1], k, r0).with_source(source));
    }
}

fn decode_angles(
    section: &RawSection,
    source_default: Option<&str>,
    out: &mut Vec<Angle>,
    errors: &mut Vec<RowError>,
) {
    const KIND: SectionKind = SectionKind::QuadraticAngle;
    for (line, row) in data_rows(section) {
        let toks: Vec<&str> = row.split_whitespace().collect();
        if toks.len() < 5 {
            errors.push(row_error(KIND, line, row, "expected at least 5 columns"));
            continue;
        }
        let Some(i) = last_float_run(&toks, 2) else {
            errors.push(row_error(KIND, line, row, "no trailing numeric (theta0, k) pair"));
            continue;
        };
        if i < 3 {
            errors.push(row_error(KIND, line, row, "no (t1, t2, t3) before numeric pair"));
            continue;
        }
        let (theta0, k) = parse_pair(toks[i], toks[i + 1]);
        let source = source_default
            .map(str::to_string)
            .or_else(|| trailing_source(&toks, i + 2));
        out.push(
            Angle::new(toks[i - 3], toks[i - 2], toks[i - 1], k, theta0).with_source(source),
        );
    }
}

fn decode_torsions(
    section: &RawSection,
    source_default: Option<&str>,
    out: &mut Vec<Dihedral>,
    errors: &mut Vec<RowError>,
) {
    const KIND: SectionKind = SectionKind::Torsion1;
    for (line, row) in data_rows(section) {
        let toks: Vec<&str> = row.split_whitespace().collect();
        if toks.len() < 7 {
            errors.push(row_error(KIND, line, row, "expected at least 7 columns"));
            continue;
        }
        let Some(i) = last_float_run(&toks, 3) else {
            errors.push(row_error(
                KIND,
                line,
                row,
                "no trailing numeric (k_phi, n, phi0) triple",
            ));
            continue;
        };
        if i < 4 {
            errors.push(row_error(KIND, line, row, "no four type names before numeric triple"));
            continue;
        }
        let k_phi = parse_float(toks[i]);
        let n_raw = parse_float(toks[i + 1]);
        let phi0 = parse_float(toks[i + 2]);
        if n_raw.fract() != 0.0 || n_raw < i32::MIN as f64 || n_raw > i32::MAX as f64 {
            errors.push(row_error(KIND, line, row, "periodicity n must be an integer"));
            continue;
        }
        let source = source_default
            .map(str::to_string)
            .or_else(|| trailing_source(&toks, i + 3));
        out.push(
            Dihedral::new(
                toks[i - 4],
                toks[i - 3],
                toks[i - 2],
                toks[i - 1],
                k_phi,
                n_raw as i32,
                phi0,
            )
            .with_source(source),
        );
    }
}

/// The only convention this version decodes: pairwise A-B parameters combined
/// geometrically. Anything else demotes the section.
fn check_nonbond_directives(section: &RawSection) -> Result<(), ()> {
    let mut saw_type = false;
    let mut saw_comb = false;
    for (_, row) in data_rows(section) {
        let s = row.trim_start();
        if !s.starts_with('@') {
            continue;
        }
        let lowered = s.to_ascii_lowercase();
        let mut words = lowered.split_whitespace();
        match (words.next(), words.next()) {
            (Some("@type"), Some("a-b")) => saw_type = true,
            (Some("@combination"), Some("geometric")) => saw_comb = true,
            _ => return Err(()),
        }
    }
    if saw_type && saw_comb {
        Ok(())
    } else {
        Err(())
    }
}

/// Rows carry either a single type (merged into the atom table) or a type
/// pair (a cross-term override). The two tokens before the numeric pair
/// disambiguate: both non-numeric means a pair, since the asset bookkeeping
/// columns are numeric.
fn decode_nonbond(
    section: &RawSection,
    singles: &mut BTreeMap<String, (f64, f64)>,
    overrides: &mut Vec<PairOverride>,
    errors: &mut Vec<RowError>,
) {
    const KIND: SectionKind = SectionKind::Nonbond12_6;
    for (line, row) in data_rows(section) {
        if row.trim_start().starts_with('@') {
            continue;
        }
        let toks: Vec<&str> = row.split_whitespace().collect();
        if toks.len() < 3 {
            errors.push(row_error(KIND, line, row, "expected at least 3 columns"));
            continue;
        }
        let Some(i) = last_float_run(&toks, 2) else {
            errors.push(row_error(KIND, line, row, "no trailing numeric (A, B) pair"));
            continue;
        };
        if i < 1 {
            errors.push(row_error(KIND, line, row, "no atom type before (A, B) pair"));
            continue;
        }
        let (a, b) = parse_pair(toks[i], toks[i + 1]);

        if i >= 2 && !is_float_like(toks[i - 1]) && !is_float_like(toks[i - 2]) {
            overrides.push(PairOverride::new(toks[i - 2], toks[i - 1], a, b));
        } else {
            singles.insert(toks[i - 1].to_string(), (a, b));
        }
    }
}

// Callers only pass tokens that already passed the float-likeness scan.
fn parse_float(tok: &str) -> f64 {
    tok.parse::<f64>().unwrap_or(f64::NAN)
}

fn parse_pair(a: &str, b: &str) -> (f64, f64) {
    (parse_float(a), parse_float(b))
}
