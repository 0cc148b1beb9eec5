//! Requirements and report JSON I/O.
//!
//! The requirements document is a JSON object with four optional arrays. A
//! missing member means empty, an explicit `null` is rejected: a tool that
//! writes `null` where it means "none" is confused about its own schema, and
//! guessing would hide that.

use std::collections::{BTreeMap, BTreeSet};
use std::io::{Read, Write};

use serde::Serialize;
use serde_json::Value;

use crate::io::error::Error;
use crate::model::keys::{AngleKey, BondKey, DihedralKey};
use crate::model::package::UnknownSection;
use crate::model::requirements::Requirements;
use crate::model::resolved::MissingKey;

pub fn read_requirements_json<R: Read>(reader: R) -> Result<Requirements, Error> {
    let data: Value = serde_json::from_reader(reader)?;
    let obj = data
        .as_object()
        .ok_or_else(|| Error::Model("requirements: expected a JSON object".to_string()))?;

    let atom_types = string_array(obj, "atom_types")?;
    let bond_types = tuple_array::<2>(obj, "bond_types")?;
    let angle_types = tuple_array::<3>(obj, "angle_types")?;
    let dihedral_types = tuple_array::<4>(obj, "dihedral_types")?;

    Requirements::from_parts(atom_types, bond_types, angle_types, dihedral_types)
        .map_err(|e| Error::Model(e.to_string()))
}

/// Field order is alphabetical so serialization matches a sorted-keys policy.
#[derive(Serialize)]
struct RequirementsDoc<'a> {
    angle_types: Vec<&'a AngleKey>,
    atom_types: Vec<&'a String>,
    bond_types: Vec<&'a BondKey>,
    dihedral_types: Vec<&'a DihedralKey>,
}

/// Stable writer: sorted keys, 2-space indent, trailing newline.
pub fn write_requirements_json<W: Write>(writer: &mut W, req: &Requirements) -> Result<(), Error> {
    let doc = RequirementsDoc {
        angle_types: req.angle_types().iter().collect(),
        atom_types: req.atom_types().iter().collect(),
        bond_types: req.bond_types().iter().collect(),
        dihedral_types: req.dihedral_types().iter().collect(),
    };
    serde_json::to_writer_pretty(&mut *writer, &doc)?;
    writeln!(writer)?;
    Ok(())
}

/// Serializes a missing-terms list as an ordered report array.
pub fn write_missing_report<W: Write>(writer: &mut W, missing: &[MissingKey]) -> Result<(), Error> {
    serde_json::to_writer_pretty(&mut *writer, missing)?;
    writeln!(writer)?;
    Ok(())
}

/// Serializes preserved unknown sections, in encounter order.
pub fn write_unknown_sections_report<W: Write>(
    writer: &mut W,
    sections: &[UnknownSection],
) -> Result<(), Error> {
    serde_json::to_writer_pretty(&mut *writer, sections)?;
    writeln!(writer)?;
    Ok(())
}

/// Derives requirements from a toy structure document:
/// `{"atoms": [{"aid": 0, "atom_type": "c3"}, ...], "bonds": [{"a1": 0,
/// "a2": 1}, ...]}`. Bond keys come from the edges; angle keys are enumerated
/// from the sorted, deduplicated adjacency of each center atom, so the result
/// is independent of input order. Dihedral requirements are never derived.
pub fn requirements_from_structure_json<R: Read>(reader: R) -> Result<Requirements, Error> {
    let data: Value = serde_json::from_reader(reader)?;
    let obj = data
        .as_object()
        .ok_or_else(|| Error::Model("structure: expected a JSON object".to_string()))?;

    let types_by_aid = atom_types_by_aid(obj)?;
    let n_atoms = types_by_aid.len();
    let edges = unique_bond_pairs(obj, n_atoms)?;

    let mut bond_types: BTreeSet<[String; 2]> = BTreeSet::new();
    let mut neighbors: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); n_atoms];
    for &(a1, a2) in &edges {
        bond_types.insert([types_by_aid[a1].clone(), types_by_aid[a2].clone()]);
        neighbors[a1].insert(a2);
        neighbors[a2].insert(a1);
    }

    let mut angle_types: BTreeSet<[String; 3]> = BTreeSet::new();
    for (center, nbrs) in neighbors.iter().enumerate() {
        let nbrs: Vec<usize> = nbrs.iter().copied().collect();
        for (pos, &i) in nbrs.iter().enumerate() {
            for &k in &nbrs[pos + 1..] {
                angle_types.insert([
                    types_by_aid[i].clone(),
                    types_by_aid[center].clone(),
                    types_by_aid[k].clone(),
                ]);
            }
        }
    }

    Requirements::from_parts(
        types_by_aid.into_iter().collect::<BTreeSet<_>>(),
        bond_types,
        angle_types,
        Vec::<[String; 4]>::new(),
    )
    .map_err(|e| Error::Model(e.to_string()))
}

fn field_array<'a>(
    obj: &'a serde_json::Map<String, Value>,
    key: &str,
) -> Result<&'a [Value], Error> {
    match obj.get(key) {
        None => Ok(&[]),
        Some(Value::Null) => Err(Error::Model(format!(
            "requirements: '{key}' must be an array, got null"
        ))),
        Some(Value::Array(items)) => Ok(items),
        Some(other) => Err(Error::Model(format!(
            "requirements: '{key}' must be an array, got {}",
            json_kind(other)
        ))),
    }
}

fn string_array(
    obj: &serde_json::Map<String, Value>,
    key: &str,
) -> Result<Vec<String>, Error> {
    field_array(obj, key)?
        .iter()
        .enumerate()
        .map(|(i, v)| {
            v.as_str().map(str::to_string).ok_or_else(|| {
                Error::Model(format!("requirements: '{key}[{i}]' must be a string"))
            })
        })
        .collect()
}

fn tuple_array<const N: usize>(
    obj: &serde_json::Map<String, Value>,
    key: &str,
) -> Result<Vec<[String; N]>, Error> {
    field_array(obj, key)?
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let items = v.as_array().ok_or_else(|| {
                Error::Model(format!("requirements: '{key}[{i}]' must be an array"))
            })?;
            if items.len() != N {
                return Err(Error::Model(format!(
                    "requirements: '{key}[{i}]' must have {N} entries, got {}",
                    items.len()
                )));
            }
            let mut out: [String; N] = std::array::from_fn(|_| String::new());
            for (j, item) in items.iter().enumerate() {
                out[j] = item
                    .as_str()
                    .map(str::to_string)
                    .ok_or_else(|| {
                        Error::Model(format!("requirements: '{key}[{i}][{j}]' must be a string"))
                    })?;
            }
            Ok(out)
        })
        .collect()
}

fn atom_types_by_aid(obj: &serde_json::Map<String, Value>) -> Result<Vec<String>, Error> {
    let atoms = match obj.get("atoms") {
        None | Some(Value::Null) => {
            return Err(Error::Model(
                "structure: missing required 'atoms' array".to_string(),
            ))
        }
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(Error::Model(format!(
                "structure: 'atoms' must be an array, got {}",
                json_kind(other)
            )))
        }
    };

    let n = atoms.len();
    let mut by_aid: BTreeMap<usize, String> = BTreeMap::new();
    for (i, atom) in atoms.iter().enumerate() {
        let aobj = atom.as_object().ok_or_else(|| {
            Error::Model(format!("structure: 'atoms[{i}]' must be an object"))
        })?;
        let aid = index_field(aobj, "aid", i, n)?;
        let atom_type = aobj
            .get("atom_type")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                Error::Model(format!(
                    "structure: 'atoms[{i}].atom_type' must be a non-empty string"
                ))
            })?;
        if by_aid.insert(aid, atom_type.to_string()).is_some() {
            return Err(Error::Model(format!(
                "structure: duplicate aid {aid} in 'atoms[{i}]'"
            )));
        }
    }

    // In-range and duplicate-free implies the aids cover 0..n exactly.
    Ok(by_aid.into_values().collect())
}

fn unique_bond_pairs(
    obj: &serde_json::Map<String, Value>,
    n_atoms: usize,
) -> Result<Vec<(usize, usize)>, Error> {
    let bonds = match obj.get("bonds") {
        None => return Ok(Vec::new()),
        Some(Value::Null) => {
            return Err(Error::Model(
                "structure: 'bonds' must be an array, got null".to_string(),
            ))
        }
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(Error::Model(format!(
                "structure: 'bonds' must be an array, got {}",
                json_kind(other)
            )))
        }
    };

    let mut pairs: BTreeSet<(usize, usize)> = BTreeSet::new();
    for (i, bond) in bonds.iter().enumerate() {
        let bobj = bond.as_object().ok_or_else(|| {
            Error::Model(format!("structure: 'bonds[{i}]' must be an object"))
        })?;
        let a1 = index_field(bobj, "a1", i, n_atoms)?;
        let a2 = index_field(bobj, "a2", i, n_atoms)?;
        if a1 == a2 {
            return Err(Error::Model(format!(
                "structure: 'bonds[{i}]' is a self-bond (aid {a1})"
            )));
        }
        pairs.insert(if a1 <= a2 { (a1, a2) } else { (a2, a1) });
    }
    Ok(pairs.into_iter().collect())
}

fn index_field(
    obj: &serde_json::Map<String, Value>,
    key: &str,
    entry: usize,
    n: usize,
) -> Result<usize, Error> {
    let value = obj
        .get(key)
        .and_then(Value::as_u64)
        .ok_or_else(|| {
            Error::Model(format!(
                "structure: entry {entry} field '{key}' must be a non-negative integer"
            ))
        })?;
    let idx = value as usize;
    if idx >= n {
        return Err(Error::Model(format!(
            "structure: entry {entry} field '{key}' out of range: {idx} (n_atoms={n})"
        )));
    }
    Ok(idx)
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_missing_members_as_empty() {
        let req = read_requirements_json(r#"{"atom_types": ["c3", "o"]}"#.as_bytes()).unwrap();
        assert_eq!(req.atom_types().len(), 2);
        assert!(req.bond_types().is_empty());
        assert!(req.dihedral_types().is_empty());
    }

    #[test]
    fn explicit_null_member_is_rejected() {
        let err = read_requirements_json(r#"{"bond_types": null}"#.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("got null"));
    }

    #[test]
    fn tuples_canonicalize_on_read() {
        let req = read_requirements_json(
            r#"{"atom_types": ["c3", "o"], "bond_types": [["o", "c3"]]}"#.as_bytes(),
        )
        .unwrap();
        assert!(req.bond_types().contains(&BondKey::new("c3", "o")));
    }

    #[test]
    fn wrong_tuple_arity_is_rejected() {
        let err = read_requirements_json(r#"{"bond_types": [["c3"]]}"#.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("2 entries"));
    }

    #[test]
    fn writer_output_is_stable_and_newline_terminated() {
        let req = Requirements::from_parts(
            vec!["o".to_string(), "c3".to_string()],
            vec![["o".to_string(), "c3".to_string()]],
            vec![],
            vec![],
        )
        .unwrap();

        let mut buf = Vec::new();
        write_requirements_json(&mut buf, &req).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.ends_with('\n'));

        let expected = "{\n  \"angle_types\": [],\n  \"atom_types\": [\n    \"c3\",\n    \"o\"\n  ],\n  \"bond_types\": [\n    [\n      \"c3\",\n      \"o\"\n    ]\n  ],\n  \"dihedral_types\": []\n}\n";
        assert_eq!(text, expected);

        // Read-back equals what was written.
        let back = read_requirements_json(text.as_bytes()).unwrap();
        assert_eq!(back, req);
    }

    const STRUCTURE: &str = r#"{
        "atoms": [
            {"aid": 0, "atom_type": "o"},
            {"aid": 1, "atom_type": "c3"},
            {"aid": 2, "atom_type": "h"},
            {"aid": 3, "atom_type": "h"}
        ],
        "bonds": [
            {"a1": 1, "a2": 0},
            {"a1": 1, "a2": 2},
            {"a1": 3, "a2": 1}
        ]
    }"#;

    #[test]
    fn derives_bond_and_angle_requirements() {
        let req = requirements_from_structure_json(STRUCTURE.as_bytes()).unwrap();

        let atoms: Vec<&str> = req.atom_types().iter().map(String::as_str).collect();
        assert_eq!(atoms, ["c3", "h", "o"]);

        assert!(req.bond_types().contains(&BondKey::new("c3", "o")));
        assert!(req.bond_types().contains(&BondKey::new("c3", "h")));
        assert_eq!(req.bond_types().len(), 2);

        // Center c3 has neighbors {o, h, h}: angles h-c3-h, h-c3-o.
        assert!(req.angle_types().contains(&AngleKey::new("h", "c3", "h")));
        assert!(req.angle_types().contains(&AngleKey::new("h", "c3", "o")));
        assert_eq!(req.angle_types().len(), 2);

        assert!(req.dihedral_types().is_empty());
    }

    #[test]
    fn derivation_is_input_order_independent() {
        let shuffled = r#"{
            "atoms": [
                {"aid": 3, "atom_type": "h"},
                {"aid": 0, "atom_type": "o"},
                {"aid": 2, "atom_type": "h"},
                {"aid": 1, "atom_type": "c3"}
            ],
            "bonds": [
                {"a1": 3, "a2": 1},
                {"a1": 0, "a2": 1},
                {"a1": 2, "a2": 1}
            ]
        }"#;
        let a = requirements_from_structure_json(STRUCTURE.as_bytes()).unwrap();
        let b = requirements_from_structure_json(shuffled.as_bytes()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn structure_violations_are_hard_errors() {
        let dup = r#"{"atoms": [{"aid": 0, "atom_type": "c3"}, {"aid": 0, "atom_type": "o"}]}"#;
        assert!(requirements_from_structure_json(dup.as_bytes())
            .unwrap_err()
            .to_string()
            .contains("duplicate aid"));

        let gap = r#"{"atoms": [{"aid": 0, "atom_type": "c3"}, {"aid": 2, "atom_type": "o"}]}"#;
        assert!(requirements_from_structure_json(gap.as_bytes())
            .unwrap_err()
            .to_string()
            .contains("out of range"));

        let self_bond = r#"{
            "atoms": [{"aid": 0, "atom_type": "c3"}, {"aid": 1, "atom_type": "o"}],
            "bonds": [{"a1": 1, "a2": 1}]
        }"#;
        assert!(requirements_from_structure_json(self_bond.as_bytes())
            .unwrap_err()
            .to_string()
            .contains("self-bond"));
    }

    #[test]
    fn missing_report_is_an_ordered_array() {
        let missing = vec![
            MissingKey::AtomTypes("x".to_string()),
            MissingKey::BondTypes(BondKey::new("c3", "x")),
        ];
        let mut buf = Vec::new();
        write_missing_report(&mut buf, &missing).unwrap();
        let value: Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value[0]["category"], "atom_types");
        assert_eq!(value[1]["key"][1], "x");
    }

    #[test]
    fn unknown_sections_report_keeps_order() {
        let sections = vec![
            UnknownSection::new("#preamble", vec!["!BIOSYM".to_string()]),
            UnknownSection::new("#out_of_plane", vec![" c3 o o o 10 0".to_string()]),
        ];
        let mut buf = Vec::new();
        write_unknown_sections_report(&mut buf, &sections).unwrap();
        let value: Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value[0]["header"], "#preamble");
        assert_eq!(value[1]["header"], "#out_of_plane");
    }
}
