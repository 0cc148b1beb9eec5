//! MSI/BIOSYM `.frc` codec.
//!
//! A `.frc` file is a sequence of sections. A line whose first non-blank
//! character is `#` opens a section; everything until the next header belongs
//! to it. Recognized section kinds are decoded into canonical tables, every
//! other section is preserved verbatim as an [`UnknownSection`], and text
//! before the first header is carried as a synthetic `#preamble` section.
//!
//! [`UnknownSection`]: crate::model::package::UnknownSection

pub mod reader;
pub mod writer;

mod scan;

pub use reader::{FrcImport, RowError};
pub use writer::WriteOptions;

/// Section header kinds the decoder understands. Anything else is opaque.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SectionKind {
    AtomTypes,
    QuadraticBond,
    QuadraticAngle,
    Torsion1,
    Nonbond12_6,
}

impl SectionKind {
    pub(crate) fn from_header_key(key: &str) -> Option<Self> {
        match key {
            "#atom_types" => Some(SectionKind::AtomTypes),
            "#quadratic_bond" => Some(SectionKind::QuadraticBond),
            "#quadratic_angle" => Some(SectionKind::QuadraticAngle),
            "#torsion_1" => Some(SectionKind::Torsion1),
            "#nonbond(12-6)" => Some(SectionKind::Nonbond12_6),
            _ => None,
        }
    }

    pub(crate) fn name(self) -> &'static str {
        match self {
            SectionKind::AtomTypes => "#atom_types",
            SectionKind::QuadraticBond => "#quadratic_bond",
            SectionKind::QuadraticAngle => "#quadratic_angle",
            SectionKind::Torsion1 => "#torsion_1",
            SectionKind::Nonbond12_6 => "#nonbond(12-6)",
        }
    }
}
