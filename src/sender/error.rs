use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum Error {
    InvalidFilename,
    Io(std::io::Error),
    Codec(crate::codec::error::Error),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidFilename => write!(f, "path has no filename component"),
            Error::Io(err) => write!(f, "{}", err),
            Error::Codec(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for Error {}
