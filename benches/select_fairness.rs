// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 chanrs contributors
//
// Characterizes select_one's throughput and fairness bias (§8 scenario 5):
// three producer threads each blocked on Put to a distinct channel, one
// consumer thread repeatedly calling select_one across all three. The
// benchmark reports wall time for a fixed number of rounds; the companion
// integration test (not this file) asserts the no-channel-starved bound.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use chanrs::{op, select_one, Channel, OpKind, OpStatus, SelectEntry, Timeout};
use criterion::{criterion_group, criterion_main, Criterion};

fn run_rounds(rounds: usize) {
    let channels: Vec<Channel<u32>> = (0..3).map(|_| Channel::unbuffered()).collect();
    let stop = Arc::new(AtomicBool::new(false));

    let producers: Vec<_> = channels
        .iter()
        .enumerate()
        .map(|(i, ch)| {
            let ch = ch.clone();
            let stop = Arc::clone(&stop);
            thread::spawn(move || {
                let mut n = 0u32;
                while !stop.load(Ordering::Relaxed) {
                    let (status, _) = op(&ch, OpKind::Put, Some(i as u32 * 1_000_000 + n), false, Timeout::After(std::time::Duration::from_millis(50))).unwrap();
                    if status == OpStatus::Put {
                        n += 1;
                    }
                }
                ch.close();
            })
        })
        .collect();

    for _ in 0..rounds {
        let mut entries = [
            SelectEntry::get(&channels[0]),
            SelectEntry::get(&channels[1]),
            SelectEntry::get(&channels[2]),
        ];
        let _ = select_one(&mut entries, Timeout::Forever).unwrap();
    }

    stop.store(true, Ordering::Relaxed);
    for p in producers {
        p.join().ok();
    }
    for ch in channels {
        ch.close();
    }
}

fn bench_select_one_fairness(c: &mut Criterion) {
    c.bench_function("select_one_three_producers_1000_rounds", |b| {
        b.iter(|| run_rounds(1000));
    });
}

criterion_group!(benches, bench_select_one_fairness);
criterion_main!(benches);
