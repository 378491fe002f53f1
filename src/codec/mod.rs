//! The on-wire datagram format: a 9-byte header followed by up to
//! `MAX_DATA_SIZE` bytes of payload. Purely in-memory — no I/O here.

pub mod error;

use std::fmt::{Debug, Formatter};

use error::Error;

pub mod consts {
    pub const HEADER_SIZE: usize = 9;
    pub const MAX_PACKAGE_SIZE: usize = 1400;
    pub const MAX_DATA_SIZE: usize = MAX_PACKAGE_SIZE - HEADER_SIZE;
    pub const FLAG_LAST_PACKAGE: u8 = 1;
    pub const FLAG_NOT_LAST_PACKAGE: u8 = 0;

    const NUMBER_OFFSET: usize = 0;
    const MARKER_OFFSET: usize = 4;
    const FLAG_OFFSET: usize = 8;
    pub(super) const DATA_OFFSET: usize = HEADER_SIZE;

    pub(super) const NUMBER_RANGE: std::ops::Range<usize> = NUMBER_OFFSET..NUMBER_OFFSET + 4;
    pub(super) const MARKER_RANGE: std::ops::Range<usize> = MARKER_OFFSET..MARKER_OFFSET + 4;
    pub(super) const FLAG_INDEX: usize = FLAG_OFFSET;
}

/// `true` for any byte string that could plausibly be a datagram: within
/// `[HEADER_SIZE, MAX_PACKAGE_SIZE]`. No semantic validation happens here;
/// that is the reassembler's job.
pub fn valid(bytes: &[u8]) -> bool {
    bytes.len() >= consts::HEADER_SIZE && bytes.len() <= consts::MAX_PACKAGE_SIZE
}

/// A datagram view over a byte buffer. Generic over the buffer type so the
/// same accessors work over a borrowed slice (decoding a freshly-received
/// datagram without copying) or an owned `Vec<u8>` (building one to send).
pub struct Datagram<Buf> {
    buffer: Buf,
}

impl<Buf> Datagram<Buf>
where
    Buf: AsRef<[u8]>,
{
    pub fn new_unchecked(buffer: Buf) -> Self {
        Datagram { buffer }
    }

    pub fn new_checked(buffer: Buf) -> Result<Self, Error> {
        if !valid(buffer.as_ref()) {
            return Err(Error::Malformed);
        }
        Ok(Self::new_unchecked(buffer))
    }

    pub fn number(&self) -> u32 {
        let b = self.buffer.as_ref();
        u32::from_le_bytes([
            b[consts::NUMBER_RANGE.start],
            b[consts::NUMBER_RANGE.start + 1],
            b[consts::NUMBER_RANGE.start + 2],
            b[consts::NUMBER_RANGE.start + 3],
        ])
    }

    pub fn marker(&self) -> u32 {
        let b = self.buffer.as_ref();
        u32::from_le_bytes([
            b[consts::MARKER_RANGE.start],
            b[consts::MARKER_RANGE.start + 1],
            b[consts::MARKER_RANGE.start + 2],
            b[consts::MARKER_RANGE.start + 3],
        ])
    }

    pub fn flag(&self) -> u8 {
        self.buffer.as_ref()[consts::FLAG_INDEX]
    }

    pub fn is_last(&self) -> bool {
        self.flag() == consts::FLAG_LAST_PACKAGE
    }

    pub fn payload(&self) -> &[u8] {
        &self.buffer.as_ref()[consts::DATA_OFFSET..]
    }
}

impl<Buf> AsRef<[u8]> for Datagram<Buf>
where
    Buf: AsRef<[u8]>,
{
    fn as_ref(&self) -> &[u8] {
        self.buffer.as_ref()
    }
}

impl<Buf> Debug for Datagram<Buf>
where
    Buf: AsRef<[u8]>,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "number: {}, marker: {}, flag: {}, payload len: {}",
            self.number(),
            self.marker(),
            self.flag(),
            self.payload().len()
        )
    }
}

/// Builds an owned, encoded datagram.
pub struct DatagramBuilder {
    number: u32,
    marker: u32,
    flag: u8,
    payload: Vec<u8>,
}

impl DatagramBuilder {
    pub fn number(mut self, number: u32) -> Self {
        self.number = number;
        self
    }

    pub fn marker(mut self, marker: u32) -> Self {
        self.marker = marker;
        self
    }

    pub fn flag(mut self, flag: u8) -> Self {
        self.flag = flag;
        self
    }

    pub fn payload(mut self, payload: Vec<u8>) -> Self {
        self.payload = payload;
        self
    }

    pub fn build(self) -> Result<Vec<u8>, Error> {
        if self.payload.len() > consts::MAX_DATA_SIZE {
            return Err(Error::PayloadTooLarge);
        }

        let mut buffer = vec![0u8; consts::DATA_OFFSET + self.payload.len()];
        buffer[consts::NUMBER_RANGE].copy_from_slice(&self.number.to_le_bytes());
        buffer[consts::MARKER_RANGE].copy_from_slice(&self.marker.to_le_bytes());
        buffer[consts::FLAG_INDEX] = self.flag;
        buffer[consts::DATA_OFFSET..].copy_from_slice(&self.payload);

        Ok(buffer)
    }
}

impl Default for DatagramBuilder {
    fn default() -> Self {
        Self {
            number: 0,
            marker: 0,
            flag: consts::FLAG_NOT_LAST_PACKAGE,
            payload: Vec::new(),
        }
    }
}

/// Encode a single datagram. Fails if `payload.len() > MAX_DATA_SIZE`.
pub fn encode(number: u32, marker: u32, flag: u8, payload: &[u8]) -> Result<Vec<u8>, Error> {
    DatagramBuilder::default()
        .number(number)
        .marker(marker)
        .flag(flag)
        .payload(payload.to_vec())
        .build()
}

/// Decode a datagram view over a borrowed buffer, or `Error::Malformed` if
/// the length is outside `[HEADER_SIZE, MAX_PACKAGE_SIZE]`.
pub fn decode(bytes: &[u8]) -> Result<Datagram<&[u8]>, Error> {
    Datagram::new_checked(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let payload = vec![1u8, 2, 3, 4, 5];
        let bytes = encode(7, 0xdead_beef, consts::FLAG_LAST_PACKAGE, &payload).unwrap();
        let datagram = decode(&bytes).unwrap();

        assert_eq!(datagram.number(), 7);
        assert_eq!(datagram.marker(), 0xdead_beef);
        assert_eq!(datagram.flag(), consts::FLAG_LAST_PACKAGE);
        assert!(datagram.is_last());
        assert_eq!(datagram.payload(), payload.as_slice());
    }

    #[test]
    fn round_trip_empty_payload() {
        let bytes = encode(2, 1, consts::FLAG_LAST_PACKAGE, &[]).unwrap();
        let datagram = decode(&bytes).unwrap();
        assert_eq!(datagram.payload().len(), 0);
        assert!(datagram.is_last());
    }

    #[test]
    fn payload_too_large_rejected() {
        let payload = vec![0u8; consts::MAX_DATA_SIZE + 1];
        let err = encode(1, 1, consts::FLAG_NOT_LAST_PACKAGE, &payload).unwrap_err();
        assert!(matches!(err, Error::PayloadTooLarge));
    }

    #[test]
    fn oversize_datagram_is_malformed() {
        let bytes = vec![0u8; consts::MAX_PACKAGE_SIZE + 100];
        assert!(!valid(&bytes));
        assert!(decode(&bytes).is_err());
    }

    #[test]
    fn undersize_datagram_is_malformed() {
        let bytes = vec![0u8; consts::HEADER_SIZE - 1];
        assert!(!valid(&bytes));
        assert!(decode(&bytes).is_err());
    }

    #[test]
    fn trailing_shorter_payload_is_valid() {
        let bytes = vec![0u8; consts::HEADER_SIZE + 1];
        assert!(valid(&bytes));
        assert!(decode(&bytes).is_ok());
    }
}
