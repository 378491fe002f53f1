//! End-to-end scenarios driven over a real loopback socket: one `Receiver`
//! ticked by hand against datagrams written directly with the wire codec,
//! exercising reordering, duplicate streams, and malformed input without
//! depending on timing-sensitive maintenance sweeps.

use std::net::UdpSocket;
use std::time::Duration;

use dgram_relay::codec::consts::{FLAG_LAST_PACKAGE, FLAG_NOT_LAST_PACKAGE};
use dgram_relay::codec::encode;
use dgram_relay::receiver::Receiver;

fn wait_for<F: Fn() -> bool>(receiver: &mut Receiver, predicate: F) {
    for _ in 0..20 {
        receiver.tick();
        if predicate() {
            return;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
}

#[test]
fn out_of_order_delivery_reassembles_correctly() {
    let dir = tempfile::tempdir().unwrap();
    let mut receiver = Receiver::bind("127.0.0.1", 0, dir.path()).unwrap();
    let addr = receiver.local_addr().unwrap();

    let client = UdpSocket::bind("127.0.0.1:0").unwrap();
    client.connect(addr).unwrap();

    let body: Vec<u8> = (0..200u32).map(|b| b as u8).collect();
    client.send(&encode(3, 10, FLAG_NOT_LAST_PACKAGE, &body[100..150]).unwrap()).unwrap();
    client.send(&encode(2, 10, FLAG_NOT_LAST_PACKAGE, &body[0..100]).unwrap()).unwrap();
    client.send(&encode(4, 10, FLAG_LAST_PACKAGE, &body[150..]).unwrap()).unwrap();
    client.send(&encode(1, 10, FLAG_NOT_LAST_PACKAGE, b"reordered.bin").unwrap()).unwrap();

    let path = dir.path().join("reordered.bin");
    wait_for(&mut receiver, || path.exists());

    assert_eq!(std::fs::read(&path).unwrap(), body);
}

#[test]
fn distinct_streams_from_same_endpoint_stay_isolated() {
    let dir = tempfile::tempdir().unwrap();
    let mut receiver = Receiver::bind("127.0.0.1", 0, dir.path()).unwrap();
    let addr = receiver.local_addr().unwrap();

    let client = UdpSocket::bind("127.0.0.1:0").unwrap();
    client.connect(addr).unwrap();

    // Two transfers interleaved from the same socket, distinguished only by marker.
    client.send(&encode(1, 100, FLAG_NOT_LAST_PACKAGE, b"first.bin").unwrap()).unwrap();
    client.send(&encode(1, 200, FLAG_NOT_LAST_PACKAGE, b"second.bin").unwrap()).unwrap();
    client.send(&encode(2, 200, FLAG_LAST_PACKAGE, b"SECOND").unwrap()).unwrap();
    client.send(&encode(2, 100, FLAG_LAST_PACKAGE, b"FIRST").unwrap()).unwrap();

    let first = dir.path().join("first.bin");
    let second = dir.path().join("second.bin");
    wait_for(&mut receiver, || first.exists() && second.exists());

    assert_eq!(std::fs::read(&first).unwrap(), b"FIRST");
    assert_eq!(std::fs::read(&second).unwrap(), b"SECOND");
}

#[test]
fn malformed_filename_creates_no_file_and_suppresses_the_stream() {
    let dir = tempfile::tempdir().unwrap();
    let mut receiver = Receiver::bind("127.0.0.1", 0, dir.path()).unwrap();
    let addr = receiver.local_addr().unwrap();

    let client = UdpSocket::bind("127.0.0.1:0").unwrap();
    client.connect(addr).unwrap();

    client.send(&encode(1, 55, FLAG_NOT_LAST_PACKAGE, b"../escape.bin").unwrap()).unwrap();
    receiver.tick();
    client.send(&encode(2, 55, FLAG_LAST_PACKAGE, b"payload").unwrap()).unwrap();
    receiver.tick();

    assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
}

#[test]
fn oversize_datagram_is_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let mut receiver = Receiver::bind("127.0.0.1", 0, dir.path()).unwrap();
    let addr = receiver.local_addr().unwrap();

    let client = UdpSocket::bind("127.0.0.1:0").unwrap();
    client.connect(addr).unwrap();

    client.send(&vec![0u8; 1401]).unwrap();
    receiver.tick();

    assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
}
