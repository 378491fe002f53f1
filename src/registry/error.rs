use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum Error {
    InvalidKey,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidKey => write!(f, "stream key is not of the form <ip>-<port>-<marker>"),
        }
    }
}

impl std::error::Error for Error {}
