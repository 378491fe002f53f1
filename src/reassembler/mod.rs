//! Per-transfer reassembly: buffers out-of-order frames in a min-heap keyed
//! on sequence number, consumes them in order, and writes the reconstructed
//! file to disk.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Instant;

use regex::Regex;

use crate::codec::consts::FLAG_LAST_PACKAGE;

fn filename_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[\w\d.&,:;]+$").expect("filename regex is valid"))
}

/// The outcome of draining as many in-order frames as are available.
#[derive(Debug)]
pub enum Outcome {
    /// The transfer is complete; the file has been written and closed.
    Ok,
    /// More frames are needed before progress can continue.
    Waiting,
    /// The filename frame failed validation. The transfer is aborted.
    BadName,
    /// The filesystem refused to create the output file.
    CannotOpen(std::io::Error),
    /// A write or close failed on an already-open output file.
    IoError(std::io::Error),
}

/// A buffered frame awaiting its turn, ordered so that `BinaryHeap` pops the
/// smallest `number` first (a min-heap).
struct PendingFrame {
    number: u32,
    flag: u8,
    payload: Vec<u8>,
}

impl PartialEq for PendingFrame {
    fn eq(&self, other: &Self) -> bool {
        self.number == other.number
    }
}

impl Eq for PendingFrame {}

impl PartialOrd for PendingFrame {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PendingFrame {
    fn cmp(&self, other: &Self) -> Ordering {
        other.number.cmp(&self.number)
    }
}

/// Reassembles the frames of a single transfer, identified by `marker`,
/// into a file under `dir`.
pub struct Reassembler {
    dir: PathBuf,
    marker: u32,
    next_expected: u32,
    pending: BinaryHeap<PendingFrame>,
    filename: String,
    output: Option<File>,
    output_path: Option<PathBuf>,
    filename_ready: bool,
    body_ready: bool,
    last_progress: Instant,
}

impl Reassembler {
    pub fn new(dir: PathBuf, marker: u32) -> Self {
        Self {
            dir,
            marker,
            next_expected: 1,
            pending: BinaryHeap::new(),
            filename: String::new(),
            output: None,
            output_path: None,
            filename_ready: false,
            body_ready: false,
            last_progress: Instant::now(),
        }
    }

    /// `marker` must match the reassembler's own marker — a mismatch is a
    /// dispatch bug in the caller, not a runtime condition. Frames numbered
    /// below `next_expected` (late duplicates) are silently dropped.
    pub fn insert(&mut self, number: u32, marker: u32, flag: u8, payload: &[u8]) {
        assert_eq!(marker, self.marker, "misrouted datagram: marker does not match stream");
        if number < self.next_expected {
            return;
        }
        self.pending.push(PendingFrame {
            number,
            flag,
            payload: payload.to_vec(),
        });
    }

    /// Drains every frame that can be consumed in order right now.
    pub fn process(&mut self) -> Outcome {
        while !self.is_complete() {
            match self.pending.peek() {
                Some(frame) if frame.number == self.next_expected => {}
                _ => break,
            }
            let frame = self.pending.pop().expect("peek just confirmed a match");

            if frame.number == 1 {
                match self.consume_filename_frame(&frame.payload) {
                    Ok(()) => {}
                    Err(outcome) => return outcome,
                }
            } else if let Err(outcome) = self.consume_payload_frame(&frame) {
                return outcome;
            }

            self.next_expected += 1;
            self.last_progress = Instant::now();
        }

        if self.is_complete() {
            Outcome::Ok
        } else {
            Outcome::Waiting
        }
    }

    fn consume_filename_frame(&mut self, payload: &[u8]) -> Result<(), Outcome> {
        let name = String::from_utf8_lossy(payload);
        if name.is_empty() || !filename_regex().is_match(&name) {
            return Err(Outcome::BadName);
        }

        let path = self.dir.join(name.as_ref());
        let file = File::create(&path).map_err(Outcome::CannotOpen)?;

        self.filename = name.into_owned();
        self.output_path = Some(path);
        self.output = Some(file);
        self.filename_ready = true;
        Ok(())
    }

    fn consume_payload_frame(&mut self, frame: &PendingFrame) -> Result<(), Outcome> {
        let file = self.output.as_mut().expect("filename frame precedes payload frames");
        file.write_all(&frame.payload).map_err(Outcome::IoError)?;

        if frame.flag == FLAG_LAST_PACKAGE {
            file.flush().map_err(Outcome::IoError)?;
            self.output = None;
            self.body_ready = true;
        }
        Ok(())
    }

    pub fn filename_ready(&self) -> bool {
        self.filename_ready
    }

    pub fn body_ready(&self) -> bool {
        self.body_ready
    }

    pub fn is_complete(&self) -> bool {
        self.filename_ready && self.body_ready
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn last_progress(&self) -> Instant {
        self.last_progress
    }
}

impl Drop for Reassembler {
    fn drop(&mut self) {
        self.output = None;
        if !self.body_ready {
            if let Some(path) = &self.output_path {
                let _ = fs::remove_file(path);
            }
        }
    }
}
