// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 chanrs contributors
//
// Minimal two-thread rendezvous over an unbuffered channel (§8 scenario 2):
// one thread puts, another gets, whichever one reaches the channel first
// blocks until the other arrives.

use std::thread;
use std::time::Duration;

use chanrs::{op, Channel, OpKind, OpStatus, Timeout};

fn main() {
    let ch: Channel<i32> = Channel::unbuffered();

    let putter = ch.clone();
    let put_thread = thread::spawn(move || {
        let (status, _) = op(&putter, OpKind::Put, Some(42), false, Timeout::Forever).unwrap();
        println!("put returned {status:?}");
        putter.close();
    });

    thread::sleep(Duration::from_millis(10));
    let (status, value) = op(&ch, OpKind::Get, None, false, Timeout::Forever).unwrap();
    println!("get returned {status:?} with value {value:?}");
    assert_eq!(status, OpStatus::Get);
    assert_eq!(value, Some(42));

    put_thread.join().unwrap();
    ch.close();
}
