// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 chanrs contributors
//
// Per-thread waiter record (§3, §4.4). Each thread gets exactly one of
// these, created lazily on its first blocking channel operation. Channels
// that enroll a waiter hold an `Arc` clone of it; the waiter is only
// actually torn down once every such reference is gone, which in Rust
// falls directly out of `Arc`'s refcount — no manual exists/refcount
// bookkeeping is needed here, unlike a hand-rolled C implementation.
//
// The `signaled` set doubles as the wait predicate: a channel always takes
// this same mutex before inserting into it and notifying the condvar, so a
// thread about to sleep can check-then-wait atomically under one lock and
// never loses a wakeup that raced ahead of it.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::Instant;

static NEXT_CHANNEL_ID: AtomicU64 = AtomicU64::new(1);

/// Allocates a process-wide unique id for a newly created channel. Used to
/// identify "which channel signaled me" in a waiter's `signaled` set.
pub(crate) fn next_channel_id() -> u64 {
    NEXT_CHANNEL_ID.fetch_add(1, Ordering::Relaxed)
}

struct WaiterState {
    signaled: HashSet<u64>,
}

/// The per-thread cooperation point. See module docs.
pub(crate) struct WaiterInner {
    state: Mutex<WaiterState>,
    cv: Condvar,
}

impl WaiterInner {
    fn new() -> Self {
        Self { state: Mutex::new(WaiterState { signaled: HashSet::new() }), cv: Condvar::new() }
    }

    /// Called by a channel, which must already hold its own lock, to wake
    /// this waiter. Lock order is channel -> waiter (§5).
    pub(crate) fn signal(&self, channel_id: u64) {
        let mut st = self.state.lock().unwrap();
        st.signaled.insert(channel_id);
        self.cv.notify_all();
    }

    /// Whether `channel_id` is among the channels that signaled this waiter
    /// since the last `clear_signals`. Used by select's re-check phase to
    /// prefer the channel that actually woke us (§4.4 tie-break).
    pub(crate) fn was_signaled_by(&self, channel_id: u64) -> bool {
        self.state.lock().unwrap().signaled.contains(&channel_id)
    }

    pub(crate) fn clear_signals(&self) {
        self.state.lock().unwrap().signaled.clear();
    }

    /// Block until some channel signals us, or `deadline` passes. Must be
    /// called with no channel lock held. Returns `false` on timeout.
    pub(crate) fn wait_for_signal(&self, deadline: Option<Instant>) -> bool {
        let mut guard = self.state.lock().unwrap();
        loop {
            if !guard.signaled.is_empty() {
                return true;
            }
            guard = match deadline {
                None => self.cv.wait(guard).unwrap(),
                Some(d) => {
                    let now = Instant::now();
                    if now >= d {
                        return false;
                    }
                    let (g, result) = self.cv.wait_timeout(guard, d - now).unwrap();
                    if result.timed_out() && g.signaled.is_empty() {
                        return false;
                    }
                    g
                }
            };
        }
    }
}

thread_local! {
    static WAITER: Arc<WaiterInner> = Arc::new(WaiterInner::new());
}

/// Returns this thread's waiter record, creating it on first use.
pub(crate) fn current_waiter() -> Arc<WaiterInner> {
    WAITER.with(Arc::clone)
}

pub(crate) type WaiterRef = Arc<WaiterInner>;
