// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 chanrs contributors
//
// Scenario 5 (§8): three producer threads each blocked on Put to a
// different channel; a consumer repeatedly calls select_one across all
// three. Across many rounds every channel must be serviced, and no
// channel may be starved for more than 3x its fair share.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use chanrs::{op, select_one, Channel, OpKind, OpStatus, SelectEntry, Timeout};

#[test]
fn select_one_services_every_channel_without_starvation() {
    const ROUNDS: usize = 300;
    const CHANNELS: usize = 3;

    let channels: Vec<Channel<u32>> = (0..CHANNELS).map(|_| Channel::unbuffered()).collect();
    let stop = Arc::new(AtomicBool::new(false));

    let producers: Vec<_> = channels
        .iter()
        .map(|ch| {
            let ch = ch.clone();
            let stop = Arc::clone(&stop);
            thread::spawn(move || {
                let mut n = 0u32;
                while !stop.load(Ordering::Relaxed) {
                    let (status, _) =
                        op(&ch, OpKind::Put, Some(n), false, Timeout::After(Duration::from_millis(50))).unwrap();
                    if status == OpStatus::Put {
                        n += 1;
                    }
                }
                ch.close();
            })
        })
        .collect();

    let mut serviced = [0usize; CHANNELS];
    for _ in 0..ROUNDS {
        let mut entries = [
            SelectEntry::get(&channels[0]),
            SelectEntry::get(&channels[1]),
            SelectEntry::get(&channels[2]),
        ];
        let idx = select_one(&mut entries, Timeout::Forever).unwrap();
        assert_eq!(entries[idx].status, OpStatus::Get);
        serviced[idx] += 1;
    }

    stop.store(true, Ordering::Relaxed);
    for p in producers {
        p.join().ok();
    }
    for ch in channels {
        ch.close();
    }

    let fair_share = ROUNDS / CHANNELS;
    for (i, &count) in serviced.iter().enumerate() {
        assert!(count > 0, "channel {i} was never serviced across {ROUNDS} rounds");
        assert!(
            count <= fair_share * 3,
            "channel {i} serviced {count} times, exceeding 3x its fair share of {fair_share}"
        );
    }
}
