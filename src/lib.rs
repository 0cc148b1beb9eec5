//! A pure Rust toolkit for force-field parameter packages: parse MSI `.frc`
//! files into canonical tables, validate them, persist them as auditable
//! bundles, and resolve the minimal parameter subset a structure needs before
//! exporting it back to `.frc`.
//!
//! # Features
//!
//! - **Canonical data model** — Atom type, bond, angle, dihedral, and pair
//!   override tables with order-independent equality and deterministic
//!   serialization
//! - **`.frc` codec** — Tolerant section-based parser that preserves unknown
//!   sections verbatim, plus a byte-stable exporter shared by full and
//!   minimal modes
//! - **Resolution** — Minimal-subset selection against a declared
//!   requirements set, with fail-loud reporting of missing terms
//! - **Bundles** — Directory bundles with a hashed manifest for tamper
//!   evidence
//!
//! # Quick Start
//!
//! ```
//! use param_forge::io::frc;
//! use param_forge::model::requirements::Requirements;
//! use param_forge::resolve::{resolve_minimal, MissingPolicy};
//!
//! let text = "\
//! #atom_types
//!  c3  C  12.011
//!  o   O  15.999
//!  h   H  1.008
//!
//! #quadratic_bond
//!  o  c3  320.0  1.43
//!  c3 h  340.0  1.09
//!
//! #nonbond(12-6)
//! @type A-B
//! @combination geometric
//!  c3  1790340.7  528.48
//!  o   272894.8   498.88
//!  h   7516.0     32.0
//! ";
//!
//! let import = frc::reader::parse_str(text)?;
//! assert!(import.row_errors.is_empty());
//!
//! let req = Requirements::from_parts(
//!     ["c3", "o"].map(String::from),
//!     [["o".to_string(), "c3".to_string()]],
//!     Vec::<[String; 3]>::new(),
//!     Vec::<[String; 4]>::new(),
//! )?;
//!
//! let resolution = resolve_minimal(&import.package, &req, MissingPolicy::Fail)?;
//! assert_eq!(resolution.ff.atom_types.len(), 2);
//! assert_eq!(resolution.ff.bonds.len(), 1);
//! assert!(resolution.missing.is_empty());
//!
//! let mut out = Vec::new();
//! frc::writer::write_minimal(&mut out, &resolution.ff, frc::WriteOptions::default())?;
//! let exported = String::from_utf8(out).unwrap();
//! assert!(exported.contains("#quadratic_bond"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Module Organization
//!
//! - [`model`] — Canonical tables, keys, requirements, and resolution output
//! - [`validate`] — Semantic checks over a whole [`Package`]
//! - [`io`] — The `.frc` codec, the `.prm` stub, and requirements JSON I/O
//! - [`resolve`] — Minimal-subset resolution
//! - [`bundle`] — On-disk package bundles with hashed manifests
//!
//! [`Package`]: model::package::Package

pub mod bundle;
pub mod io;
pub mod model;
pub mod resolve;
pub mod validate;

pub use model::package::Package;
pub use model::requirements::Requirements;
pub use model::resolved::{MissingKey, ResolvedFF};
pub use resolve::{resolve_minimal, MissingPolicy, MissingTermsError, Resolution};
pub use validate::{validate, ValidationIssue};
