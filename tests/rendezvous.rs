// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 chanrs contributors
//
// Scenario 2 (§8): an unbuffered channel rendezvous between a putter and a
// getter regardless of which side arrives first, staggered by 10ms in
// either order.

use std::thread;
use std::time::Duration;

use chanrs::{op, Channel, OpKind, OpStatus, Timeout};

#[test]
fn putter_arrives_first_then_getter_completes_the_rendezvous() {
    let ch: Channel<i32> = Channel::unbuffered();
    let putter = ch.clone();
    let t = thread::spawn(move || {
        let (status, _) = op(&putter, OpKind::Put, Some(42), false, Timeout::Forever).unwrap();
        assert_eq!(status, OpStatus::Put);
        putter.close();
    });
    thread::sleep(Duration::from_millis(10));
    let (status, value) = op(&ch, OpKind::Get, None, false, Timeout::Forever).unwrap();
    assert_eq!(status, OpStatus::Get);
    assert_eq!(value, Some(42));
    t.join().unwrap();
    ch.close();
}

#[test]
fn getter_arrives_first_then_putter_completes_the_rendezvous() {
    let ch: Channel<i32> = Channel::unbuffered();
    let getter = ch.clone();
    let t = thread::spawn(move || {
        let (status, value) = op(&getter, OpKind::Get, None, false, Timeout::Forever).unwrap();
        assert_eq!(status, OpStatus::Get);
        assert_eq!(value, Some(42));
        getter.close();
    });
    thread::sleep(Duration::from_millis(10));
    let (status, _) = op(&ch, OpKind::Put, Some(42), false, Timeout::Forever).unwrap();
    assert_eq!(status, OpStatus::Put);
    t.join().unwrap();
    ch.close();
}
