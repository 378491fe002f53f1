use std::fmt::{Display, Formatter};
use std::net::Ipv4Addr;
use std::str::FromStr;

use crate::registry::error::Error;

/// Identifies one transfer: the sender's address, the sender's source port,
/// and the sender-chosen marker. Two concurrent transfers from the same
/// endpoint sharing a marker collide into a single (corrupted) transfer —
/// that is a sender-side correctness requirement, not something the
/// receiver can detect.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StreamKey {
    pub ip: Ipv4Addr,
    pub port: u16,
    pub marker: u32,
}

impl StreamKey {
    pub fn new(ip: Ipv4Addr, port: u16, marker: u32) -> Self {
        Self { ip, port, marker }
    }
}

/// `"<ip>-<port>-<marker>"`. Opaque outside the registry, but the format is
/// fixed because diagnostics parse it back with `FromStr`.
impl Display for StreamKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}-{}", self.ip, self.port, self.marker)
    }
}

impl FromStr for StreamKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let first = s.find('-').ok_or(Error::InvalidKey)?;
        let last = s.rfind('-').ok_or(Error::InvalidKey)?;
        if first == last {
            return Err(Error::InvalidKey);
        }

        let ip: Ipv4Addr = s[..first].parse().map_err(|_| Error::InvalidKey)?;
        let port: u16 = s[first + 1..last].parse().map_err(|_| Error::InvalidKey)?;
        let marker: u32 = s[last + 1..].parse().map_err(|_| Error::InvalidKey)?;

        Ok(Self { ip, port, marker })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let key = StreamKey::new(Ipv4Addr::new(192, 168, 1, 7), 5432, 0xdead_beef);
        let text = key.to_string();
        assert_eq!(text, "192.168.1.7-5432-3735928559");
        assert_eq!(text.parse::<StreamKey>().unwrap(), key);
    }

    #[test]
    fn rejects_malformed_keys() {
        assert!("no-dashes-here-but-not-numbers".parse::<StreamKey>().is_err());
        assert!("onlyonedash".parse::<StreamKey>().is_err());
    }
}
