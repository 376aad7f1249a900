// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 chanrs contributors
//
// Port of examples/primes.c: a chain of threads connected by channels acts
// as a sieve, each thread keeping the first number it sees (which must be
// prime) and forwarding only the numbers its own prime doesn't divide.
//
// Usage: demo_primes [goal]

use std::env;
use std::thread;

use chanrs::config::DynamicFifoConfig;
use chanrs::store::dynamic_fifo::DynamicFifo;
use chanrs::{op, Channel, OpKind, OpStatus, Timeout};

fn sieve_link(goal: u32, input: Channel<u32>) {
    let (status, value) = op(&input, OpKind::Get, None, false, Timeout::Forever).unwrap();
    let Some(prime) = (if status == OpStatus::Get { value } else { None }) else {
        input.shut();
        input.close();
        return;
    };
    println!("{prime}");
    if prime > goal {
        input.shut();
        input.close();
        return;
    }

    // Proportionally fewer messages survive further down the chain, so
    // size each link's store down with it (§4.1 dynamic FIFO, matching the
    // original's `chanFifoDySa(i, i / 2)` sizing by remaining distance).
    let remaining = ((goal - prime) / 500).max(1) as usize;
    let next: Channel<u32> = if remaining > 1 {
        let config = DynamicFifoConfig::new(remaining, remaining * 2);
        Channel::with_store(Box::new(DynamicFifo::new(config).unwrap()), None)
    } else {
        Channel::unbuffered()
    };
    let child = next.clone();
    let handle = thread::spawn(move || sieve_link(goal, child));

    loop {
        let (status, value) = op(&input, OpKind::Get, None, false, Timeout::Forever).unwrap();
        let Some(n) = (if status == OpStatus::Get { value } else { None }) else { break };
        if n % prime != 0 {
            let (status, _) = op(&next, OpKind::Put, Some(n), false, Timeout::Forever).unwrap();
            if status != OpStatus::Put {
                break;
            }
        }
    }

    println!("{prime} done");
    next.shut();
    next.close();
    input.shut();
    while let (OpStatus::Get, _) = op(&input, OpKind::Get, None, false, Timeout::Forever).unwrap() {}
    input.close();
    handle.join().ok();
}

fn main() {
    let goal: u32 = env::args().nth(1).and_then(|s| s.parse().ok()).filter(|g| *g >= 2).unwrap_or(100);
    println!("Goal = {goal}");

    let remaining = ((goal - 2) / 500).max(1) as usize;
    let head: Channel<u32> = if remaining > 1 {
        let config = DynamicFifoConfig::new(remaining, remaining * 2);
        Channel::with_store(Box::new(DynamicFifo::new(config).unwrap()), None)
    } else {
        Channel::unbuffered()
    };
    let child = head.clone();
    let handle = thread::spawn(move || sieve_link(goal, child));

    println!("2");
    let mut n = 3u32;
    loop {
        let (status, _) = op(&head, OpKind::Put, Some(n), false, Timeout::Forever).unwrap();
        if status != OpStatus::Put {
            break;
        }
        n = n.wrapping_add(2);
        if n == 1 {
            break; // wrapped around u32::MAX, stop rather than loop forever
        }
    }
    println!("2 done");
    head.shut();
    head.close();
    handle.join().ok();
}
