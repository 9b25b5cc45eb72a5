use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid {what} length: expected {expected} bytes, found {found} bytes")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("Unknown SPHINCS+ parameter set '{0}'")]
    UnknownParameterSet(String),
    #[error("Invalid SPHINCS+ parameter set: {0}")]
    InvalidParameterSet(&'static str),
}

impl Error {
    /// Returns `Err(LengthMismatch)` unless `data` is exactly `expected` bytes long.
    pub(crate) fn check_len(what: &'static str, expected: usize, data: &[u8]) -> Result<()> {
        if data.len() != expected {
            Err(Error::LengthMismatch {
                what,
                expected,
                found: data.len(),
            })
        } else {
            Ok(())
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
