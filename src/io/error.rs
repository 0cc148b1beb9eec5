use super::Format;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O operation failed: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("required section '{0}' is missing or empty")]
    MissingSection(&'static str),

    #[error("the '{0}' format is not supported for this read operation")]
    UnsupportedReadFormat(Format),

    #[error("the '{0}' format is not supported for this write operation")]
    UnsupportedWriteFormat(Format),

    #[error("failed to encode or decode JSON: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    #[error("invalid model data: {0}")]
    Model(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_formats_name_the_format() {
        assert_eq!(
            Error::UnsupportedReadFormat(Format::Prm).to_string(),
            "the 'PRM' format is not supported for this read operation"
        );
        assert_eq!(format!("{}", Format::Frc), "FRC");
    }

    #[test]
    fn missing_section_names_the_section() {
        assert_eq!(
            Error::MissingSection("#atom_types").to_string(),
            "required section '#atom_types' is missing or empty"
        );
    }
}
