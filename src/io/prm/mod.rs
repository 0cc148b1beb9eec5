//! CHARMM `.prm` codec surface.
//!
//! Reserved: the format is recognized so callers get a stable error instead
//! of a misparse, but no decoding or encoding is implemented yet.

use std::io::{BufRead, Write};

use crate::io::error::Error;
use crate::io::Format;
use crate::model::package::Package;

pub fn read<R: BufRead>(_reader: R) -> Result<Package, Error> {
    Err(Error::UnsupportedReadFormat(Format::Prm))
}

pub fn write<W: Write>(_writer: &mut W, _pkg: &Package) -> Result<(), Error> {
    Err(Error::UnsupportedWriteFormat(Format::Prm))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_and_write_fail_immediately() {
        let err = read(&b"BONDS\n"[..]).unwrap_err();
        assert!(matches!(err, Error::UnsupportedReadFormat(Format::Prm)));

        let mut buf = Vec::new();
        let err = write(&mut buf, &Package::new()).unwrap_err();
        assert!(matches!(err, Error::UnsupportedWriteFormat(Format::Prm)));
        assert!(buf.is_empty());
    }
}
