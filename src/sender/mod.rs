//! Mirrors the codec: sends a filename frame followed by payload frames,
//! setting the last-frame flag on the final read.

pub mod error;

use std::fs::File;
use std::io::Read;
use std::net::UdpSocket;
use std::path::Path;
use std::thread::sleep;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::codec::consts::{FLAG_LAST_PACKAGE, FLAG_NOT_LAST_PACKAGE, MAX_DATA_SIZE};
use crate::codec::encode;
use error::Error;

/// Brief pause between emissions so a single-threaded receiver's socket
/// buffer isn't overrun by a fast local sender.
const INTER_FRAME_DELAY: Duration = Duration::from_millis(1);

pub struct Sender {
    socket: UdpSocket,
}

impl Sender {
    pub fn connect(server_addr: &str, server_port: u16) -> Result<Self, Error> {
        let socket = UdpSocket::bind("0.0.0.0:0").map_err(Error::Io)?;
        socket.connect((server_addr, server_port)).map_err(Error::Io)?;
        Ok(Self { socket })
    }

    /// Sends `path`'s contents, stripping any directory component to obtain
    /// the filename frame. Returns the number of payload bytes transmitted.
    pub fn send_file(&self, path: &Path) -> Result<u64, Error> {
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or(Error::InvalidFilename)?;

        let mut file = File::open(path).map_err(Error::Io)?;
        let marker = random_marker();

        let name_frame =
            encode(1, marker, FLAG_NOT_LAST_PACKAGE, filename.as_bytes()).map_err(Error::Codec)?;
        self.socket.send(&name_frame).map_err(Error::Io)?;
        sleep(INTER_FRAME_DELAY);

        let mut total: u64 = 0;
        let mut number: u32 = 2;
        let mut buf = vec![0u8; MAX_DATA_SIZE];

        loop {
            let read = file.read(&mut buf).map_err(Error::Io)?;
            let is_last = read < buf.len();
            let flag = if is_last { FLAG_LAST_PACKAGE } else { FLAG_NOT_LAST_PACKAGE };

            let frame = encode(number, marker, flag, &buf[..read]).map_err(Error::Codec)?;
            self.socket.send(&frame).map_err(Error::Io)?;

            total += read as u64;
            number += 1;
            sleep(INTER_FRAME_DELAY);

            if is_last {
                break;
            }
        }

        Ok(total)
    }
}

/// A 32-bit marker, uniform over the full range, varying across process
/// invocations via a wall-clock seed. Not cryptographic — the transfer
/// identifier only needs to avoid accidental collisions between runs.
fn random_marker() -> u32 {
    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64;
    splitmix64(seed) as u32
}

fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::decode;
    use std::io::Write;
    use std::net::UdpSocket as TestSocket;

    #[test]
    fn markers_vary_across_calls() {
        let a = random_marker();
        std::thread::sleep(Duration::from_millis(2));
        let b = random_marker();
        assert_ne!(a, b);
    }

    #[test]
    fn send_file_emits_name_frame_then_payload_frames() {
        let server = TestSocket::bind("127.0.0.1:0").unwrap();
        server.set_read_timeout(Some(Duration::from_secs(2))).unwrap();
        let server_port = server.local_addr().unwrap().port();

        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("greeting.txt");
        {
            let mut f = File::create(&file_path).unwrap();
            f.write_all(b"Hello world\n").unwrap();
        }

        let sender = Sender::connect("127.0.0.1", server_port).unwrap();
        let sent = sender.send_file(&file_path).unwrap();
        assert_eq!(sent, 12);

        let mut buf = [0u8; 1400];
        let (n, _) = server.recv_from(&mut buf).unwrap();
        let name_frame = decode(&buf[..n]).unwrap();
        assert_eq!(name_frame.number(), 1);
        assert_eq!(name_frame.payload(), b"greeting.txt");

        let (n, _) = server.recv_from(&mut buf).unwrap();
        let body_frame = decode(&buf[..n]).unwrap();
        assert_eq!(body_frame.number(), 2);
        assert!(body_frame.is_last());
        assert_eq!(body_frame.marker(), name_frame.marker());
        assert_eq!(body_frame.payload(), b"Hello world\n");
    }
}
