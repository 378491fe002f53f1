use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum Error {
    PayloadTooLarge,
    Malformed,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::PayloadTooLarge => write!(f, "payload exceeds MAX_DATA_SIZE"),
            Error::Malformed => write!(f, "datagram shorter than header or longer than MAX_PACKAGE_SIZE"),
        }
    }
}

impl std::error::Error for Error {}
