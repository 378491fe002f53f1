//! Owns the bound datagram socket and the stream registry. Each iteration:
//! a bounded-wait receive, a decode-and-dispatch, then maintenance sweeps.

pub mod error;

use std::net::{IpAddr, SocketAddr, UdpSocket};
use std::path::Path;

use log::{error, info, warn};

use crate::codec;
use crate::reassembler::Outcome;
use crate::registry::{EvictReason, StreamKey, StreamRegistry};
use error::Error;

pub mod consts {
    use std::time::Duration;

    /// Bounded-wait budget per receive. On expiry control returns to the
    /// maintenance sweeps so stalled streams can be evicted even when no
    /// traffic arrives.
    pub const RECEIVE_TIMEOUT: Duration = Duration::from_secs(2);
}

pub struct Receiver {
    socket: UdpSocket,
    registry: StreamRegistry,
    recv_buf: Vec<u8>,
}

impl Receiver {
    pub fn bind(addr: &str, port: u16, dir: &Path) -> Result<Self, Error> {
        if !dir.is_dir() {
            return Err(Error::DirectoryNotFound(dir.to_path_buf()));
        }

        let socket = UdpSocket::bind((addr, port)).map_err(Error::Io)?;
        socket.set_read_timeout(Some(consts::RECEIVE_TIMEOUT)).map_err(Error::Io)?;

        Ok(Self {
            socket,
            registry: StreamRegistry::new(dir.to_path_buf()),
            recv_buf: vec![0u8; codec::consts::MAX_PACKAGE_SIZE],
        })
    }

    /// Runs the receive loop indefinitely. Only an unrecoverable failure in
    /// socket setup would return an error, and none is expected here — this
    /// only returns if a caller-supplied hook (see `tick`) decides to stop.
    pub fn run(&mut self) -> Result<(), Error> {
        loop {
            self.tick();
        }
    }

    /// One iteration: a single bounded-wait receive, then the stream and
    /// black-list maintenance sweeps. Exposed separately from `run` so
    /// callers (and tests) can drive the loop a bounded number of times.
    pub fn tick(&mut self) {
        self.receive_one();
        self.run_maintenance();
    }

    fn receive_one(&mut self) {
        let mut buf = std::mem::take(&mut self.recv_buf);
        match self.socket.recv_from(&mut buf) {
            Ok((len, addr)) => self.dispatch(&buf[..len], addr),
            Err(err) if is_timeout(&err) => {}
            Err(err) => error!("{}", err),
        }
        self.recv_buf = buf;
    }

    fn dispatch(&mut self, bytes: &[u8], addr: SocketAddr) {
        let ip = match addr.ip() {
            IpAddr::V4(v4) => v4,
            IpAddr::V6(_) => {
                warn!("incoming bad package from [{}]: IPv6 source unsupported", addr);
                return;
            }
        };
        let port = addr.port();

        let datagram = match codec::decode(bytes) {
            Ok(datagram) => datagram,
            Err(_) => {
                warn!("incoming bad package from [{}:{}]", ip, port);
                return;
            }
        };

        let key = StreamKey::new(ip, port, datagram.marker());
        let number = datagram.number();
        let marker = datagram.marker();
        let flag = datagram.flag();
        let payload = datagram.payload().to_vec();

        let report = self.registry.handle(key, number, marker, flag, &payload);

        if report.created {
            info!("incoming new file from [{}:{}]", ip, port);
        }

        match report.outcome {
            None | Some(Outcome::Waiting) => {}
            Some(Outcome::Ok) => info!(
                "received and saved file \"{}\" from [{}:{}]",
                report.filename.as_deref().unwrap_or(""),
                ip,
                port
            ),
            Some(Outcome::BadName) => warn!("invalid filename from [{}:{}]", ip, port),
            Some(Outcome::CannotOpen(err)) => error!(
                "could not create file \"{}\" from [{}:{}]: {}",
                report.filename.as_deref().unwrap_or(""),
                ip,
                port,
                err
            ),
            Some(Outcome::IoError(err)) => error!(
                "could not write to file \"{}\" from [{}:{}]: {}",
                report.filename.as_deref().unwrap_or(""),
                ip,
                port,
                err
            ),
        }
    }

    fn run_maintenance(&mut self) {
        for evicted in self.registry.sweep_streams() {
            if evicted.reason == EvictReason::TimedOut {
                info!(
                    "deleting file ({}) from [{}] by timeout",
                    evicted.filename.as_deref().unwrap_or("Unknown"),
                    evicted.key
                );
            }
        }
        self.registry.sweep_black_list();
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }
}

fn is_timeout(err: &std::io::Error) -> bool {
    matches!(err.kind(), std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut)
}
