// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 chanrs contributors
//
// Scenario 6 (§8): twenty threads blocked on Get of a shared channel; a
// single shut() must wake every one of them, each reporting Sht, within a
// bounded interval.

use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use chanrs::{op, Channel, OpKind, OpStatus, Timeout};

#[test]
fn shut_wakes_all_twenty_blocked_getters() {
    let ch: Channel<i32> = Channel::unbuffered();
    let (tx, rx) = mpsc::channel();

    let handles: Vec<_> = (0..20)
        .map(|_| {
            let ch = ch.clone();
            let tx = tx.clone();
            thread::spawn(move || {
                let (status, _) = op(&ch, OpKind::Get, None, false, Timeout::Forever).unwrap();
                tx.send(status).unwrap();
                ch.close();
            })
        })
        .collect();
    drop(tx);

    thread::sleep(Duration::from_millis(50));
    ch.shut();

    let deadline = Instant::now() + Duration::from_secs(2);
    let mut received = Vec::new();
    while received.len() < 20 {
        let remaining = deadline.saturating_duration_since(Instant::now());
        assert!(!remaining.is_zero(), "not all waiters woke within the bound");
        received.push(rx.recv_timeout(remaining).expect("waiter should report before the deadline"));
    }
    assert!(received.iter().all(|&s| s == OpStatus::Sht));

    for h in handles {
        h.join().unwrap();
    }
}
