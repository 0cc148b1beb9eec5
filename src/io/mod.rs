use std::fmt;

pub mod error;

pub mod frc;
pub mod prm;
pub mod requirements;

/// Parameter-file formats this crate knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// MSI/BIOSYM `.frc` section format.
    Frc,
    /// Plain-column `.prm` format (recognized but not yet implemented).
    Prm,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Frc => write!(f, "FRC"),
            Format::Prm => write!(f, "PRM"),
        }
    }
}
