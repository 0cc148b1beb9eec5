use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid or unsupported style string: '{0}'")]
pub struct ParseStyleError(pub(crate) String);

/// Van der Waals functional form declared per atom type.
///
/// v0.1 supports the A/B 12-6 Lennard-Jones form only; the enum exists so the
/// text form stays a closed vocabulary rather than a free string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VdwStyle {
    #[default]
    #[serde(rename = "lj_ab_12_6")]
    LjAb12_6,
}

impl fmt::Display for VdwStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VdwStyle::LjAb12_6 => write!(f, "lj_ab_12_6"),
        }
    }
}

impl FromStr for VdwStyle {
    type Err = ParseStyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "lj_ab_12_6" => Ok(VdwStyle::LjAb12_6),
            other => Err(ParseStyleError(other.to_string())),
        }
    }
}

/// Bond stretching functional form. Only the quadratic (harmonic) form is
/// supported in v0.1.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BondStyle {
    #[default]
    #[serde(rename = "quadratic")]
    Quadratic,
}

impl fmt::Display for BondStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BondStyle::Quadratic => write!(f, "quadratic"),
        }
    }
}

impl FromStr for BondStyle {
    type Err = ParseStyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "quadratic" => Ok(BondStyle::Quadratic),
            other => Err(ParseStyleError(other.to_string())),
        }
    }
}

/// Angle bending functional form, mirroring [`BondStyle`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AngleStyle {
    #[default]
    #[serde(rename = "quadratic")]
    Quadratic,
}

impl fmt::Display for AngleStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AngleStyle::Quadratic => write!(f, "quadratic"),
        }
    }
}

impl FromStr for AngleStyle {
    type Err = ParseStyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "quadratic" => Ok(AngleStyle::Quadratic),
            other => Err(ParseStyleError(other.to_string())),
        }
    }
}

/// Torsion functional form: `E = k_phi * (1 + cos(n*phi - phi0))`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DihedralStyle {
    #[default]
    #[serde(rename = "torsion_1")]
    Torsion1,
}

impl fmt::Display for DihedralStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DihedralStyle::Torsion1 => write!(f, "torsion_1"),
        }
    }
}

impl FromStr for DihedralStyle {
    type Err = ParseStyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "torsion_1" => Ok(DihedralStyle::Torsion1),
            other => Err(ParseStyleError(other.to_string())),
        }
    }
}

/// Pairwise nonbonded parameter form declared by the `@type` directive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PairwiseForm {
    /// `@type A-B`: rows carry the raw A (repulsive) and B (dispersive) terms.
    #[default]
    #[serde(rename = "A-B")]
    AB,
}

impl fmt::Display for PairwiseForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PairwiseForm::AB => write!(f, "A-B"),
        }
    }
}

/// Mixing rule used to derive cross-pair nonbonded parameters when no
/// explicit pair override exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CombinationRule {
    #[default]
    #[serde(rename = "geometric")]
    Geometric,
}

impl fmt::Display for CombinationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CombinationRule::Geometric => write!(f, "geometric"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vdw_style_round_trips_through_text() {
        let s: VdwStyle = "lj_ab_12_6".parse().unwrap();
        assert_eq!(s, VdwStyle::LjAb12_6);
        assert_eq!(s.to_string(), "lj_ab_12_6");
    }

    #[test]
    fn unknown_styles_are_rejected() {
        assert!("lj_96".parse::<VdwStyle>().is_err());
        assert!("morse".parse::<BondStyle>().is_err());
        assert!("cosine".parse::<AngleStyle>().is_err());
        assert!("torsion_3".parse::<DihedralStyle>().is_err());
    }

    #[test]
    fn style_parsing_trims_whitespace() {
        assert_eq!(
            " quadratic ".parse::<BondStyle>().unwrap(),
            BondStyle::Quadratic
        );
    }
}
