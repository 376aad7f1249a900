// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 chanrs contributors
//
// select-one and select-all (§4.4, §4.5): the atomic multi-channel
// operations every other entry point (`op.rs`) is built from.
//
// Both algorithms share the same four phases: a lock-free fast path, a
// lock-all-with-try_lock-and-restart phase (the deadlock-avoidance trick
// that lets one thread hold several channel mutexes at once without ever
// blocking on a second one), enrollment into the matching waiter queue per
// entry, and a condition-variable wait that re-runs the lock-all phase on
// every wake until something is ready or the timeout elapses.

use std::sync::MutexGuard;
use std::time::{Duration, Instant};

use tracing::trace;

use crate::channel::{Channel, ChannelState, Queue};
use crate::error::ChanError;
use crate::waiter::{self, WaiterInner, WaiterRef};

/// The four operation kinds at the library boundary (§6.1 `op_kind`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    Nop,
    Sht,
    Get,
    Put,
}

/// The five outcomes an entry (or a single `op` call) can report (§6.1
/// `op_status`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpStatus {
    Nop,
    Sht,
    Get,
    Put,
    Timeout,
}

/// Timeout convention from §4.3/§6.1: `0` blocks forever, `-1` never
/// blocks, `>0` nanoseconds is a bounded wait.
#[derive(Debug, Clone, Copy)]
pub enum Timeout {
    Forever,
    NonBlocking,
    After(Duration),
}

/// One entry in a select array (§3 "Array descriptor").
pub struct SelectEntry<'a, T: Send> {
    pub channel: &'a Channel<T>,
    pub kind: OpKind,
    /// `true` requests "event" mode — §4.3's `value_slot = null`: wait for
    /// a matching counterpart without consuming or producing a value.
    pub event: bool,
    /// `Put`: the value to send (ignored when `event`). `Get`: filled with
    /// the received value on success (left `None` when `event`).
    pub value: Option<T>,
    pub status: OpStatus,
}

impl<'a, T: Send> SelectEntry<'a, T> {
    fn new(channel: &'a Channel<T>, kind: OpKind, event: bool, value: Option<T>) -> Self {
        Self { channel, kind, event, value, status: OpStatus::Nop }
    }

    /// Build an entry from the four-way `op_kind` boundary shape (§6.1),
    /// used by `op()` to express a single operation as a one-entry select.
    pub(crate) fn raw(channel: &'a Channel<T>, kind: OpKind, event: bool, value: Option<T>) -> Self {
        Self::new(channel, kind, event, value)
    }

    pub fn sht(channel: &'a Channel<T>) -> Self {
        Self::new(channel, OpKind::Sht, false, None)
    }

    pub fn get(channel: &'a Channel<T>) -> Self {
        Self::new(channel, OpKind::Get, false, None)
    }

    pub fn get_event(channel: &'a Channel<T>) -> Self {
        Self::new(channel, OpKind::Get, true, None)
    }

    pub fn put(channel: &'a Channel<T>, value: T) -> Self {
        Self::new(channel, OpKind::Put, false, Some(value))
    }

    pub fn put_event(channel: &'a Channel<T>) -> Self {
        Self::new(channel, OpKind::Put, true, None)
    }

    fn target_queue(&self) -> Option<Queue> {
        match (self.kind, self.event) {
            (OpKind::Nop, _) => None,
            (OpKind::Sht, _) => Some(Queue::Shutdowns),
            (OpKind::Get, false) => Some(Queue::Gets),
            (OpKind::Get, true) => Some(Queue::GetEvents),
            (OpKind::Put, false) => Some(Queue::Puts),
            (OpKind::Put, true) => Some(Queue::PutEvents),
        }
    }
}

fn deadline_for(timeout: Timeout) -> Option<Instant> {
    match timeout {
        Timeout::After(d) => Some(Instant::now() + d),
        Timeout::Forever | Timeout::NonBlocking => None,
    }
}

/// Attempts to complete `entry` given its channel is already locked.
/// Returns `true` if it completed (status/value are filled in).
fn try_complete<T: Send>(entry: &mut SelectEntry<'_, T>, state: &mut ChannelState<T>, channel_id: u64) -> bool {
    if entry.kind == OpKind::Nop {
        return false;
    }
    if state.is_shut() {
        // §3: "A channel with Shut set never blocks a getter and always
        // fails a putter that carries a value." A buffered value already
        // in the store is still deliverable to a getter after shutdown.
        if entry.kind == OpKind::Get && !entry.event && state.status().can_get() {
            entry.value = Some(state.do_get(channel_id));
            entry.status = OpStatus::Get;
        } else {
            entry.status = OpStatus::Sht;
        }
        return true;
    }
    match (entry.kind, entry.event) {
        (OpKind::Sht, _) => false,
        (OpKind::Get, false) => {
            if state.status().can_get() {
                entry.value = Some(state.do_get(channel_id));
                entry.status = OpStatus::Get;
                true
            } else {
                false
            }
        }
        (OpKind::Get, true) => {
            if state.puts_waiting() {
                entry.status = OpStatus::Get;
                true
            } else {
                false
            }
        }
        (OpKind::Put, false) => {
            if state.status().can_put() {
                let value = entry.value.take().expect("put entry missing a value");
                state.do_put(value, channel_id);
                entry.status = OpStatus::Put;
                true
            } else {
                false
            }
        }
        (OpKind::Put, true) => {
            if state.gets_waiting() {
                entry.status = OpStatus::Put;
                true
            } else {
                false
            }
        }
        (OpKind::Nop, _) => unreachable!(),
    }
}

fn is_ready<T: Send>(entry: &SelectEntry<'_, T>, state: &ChannelState<T>) -> bool {
    if entry.kind == OpKind::Nop {
        return false;
    }
    if state.is_shut() {
        return true;
    }
    match (entry.kind, entry.event) {
        (OpKind::Sht, _) => false,
        (OpKind::Get, false) => state.status().can_get(),
        (OpKind::Get, true) => state.puts_waiting(),
        (OpKind::Put, false) => state.status().can_put(),
        (OpKind::Put, true) => state.gets_waiting(),
        (OpKind::Nop, _) => unreachable!(),
    }
}

/// §4.4 tie-break: "waking prefers waiters that were actually signaled by
/// the matching channel ... over arbitrary others." Returns entry indices
/// in the order the re-check phase should try them: entries whose channel
/// is in `me`'s signaled set first (in their original relative order),
/// then the rest in their original relative order. Before any enrollment
/// (`me = None`) this is just `0..entries.len()` — plain index order, i.e.
/// "earliest index wins."
fn check_order<T: Send>(entries: &[SelectEntry<'_, T>], me: Option<&WaiterInner>) -> Vec<usize> {
    let Some(me) = me else { return (0..entries.len()).collect() };
    let (mut signaled, mut rest) = (Vec::new(), Vec::new());
    for (i, entry) in entries.iter().enumerate() {
        if me.was_signaled_by(entry.channel.id()) {
            signaled.push(i);
        } else {
            rest.push(i);
        }
    }
    signaled.append(&mut rest);
    signaled
}

/// Phase 1: try every entry under its own lock, without blocking on any of
/// them. Returns the first entry that completed.
fn try_fast_path<T: Send>(entries: &mut [SelectEntry<'_, T>]) -> Option<usize> {
    for i in 0..entries.len() {
        let channel_id = entries[i].channel.id();
        let Some(mut state) = entries[i].channel.try_lock() else { continue };
        if try_complete(&mut entries[i], &mut state, channel_id) {
            return Some(i);
        }
    }
    None
}

/// Phase 3: lock every distinct channel referenced by the array, in array
/// order, using `try_lock` on each after the first; on contention, release
/// everything acquired so far, yield, and restart. Returns the first ready
/// entry's index, performing its operation, or `None` if nothing was ready.
/// `me` is consulted for the §4.4 tie-break (see `check_order`) once a
/// waiter exists; pass `None` before the first enrollment.
fn lock_all_and_check_one<'a, T: Send>(entries: &mut [SelectEntry<'a, T>], me: Option<&WaiterInner>) -> Option<usize> {
    let channels: Vec<&'a Channel<T>> = entries.iter().map(|e| e.channel).collect();
    loop {
        let mut guards: Vec<(u64, MutexGuard<'a, ChannelState<T>>)> = Vec::with_capacity(channels.len());
        let mut contended = false;
        for ch in &channels {
            let id = ch.id();
            if guards.iter().any(|(gid, _)| *gid == id) {
                continue;
            }
            match ch.try_lock() {
                Some(g) => guards.push((id, g)),
                None => {
                    contended = true;
                    break;
                }
            }
        }
        if contended {
            drop(guards);
            std::thread::yield_now();
            continue;
        }
        for i in check_order(entries, me) {
            let id = entries[i].channel.id();
            let pos = guards.iter().position(|(gid, _)| *gid == id).unwrap();
            let completed = try_complete(&mut entries[i], &mut guards[pos].1, id);
            if completed {
                return Some(i);
            }
        }
        return None;
    }
}

/// §4.4 step 4: before enrolling, wake one event watcher on the opposite
/// queue, since enrolling genuinely creates the condition that watcher is
/// waiting for (a getting select creates a blocked getter for `GetEvent`
/// watchers; a putting select creates a blocked putter for `PutEvent`
/// watchers). Only done on first enrollment, not on head re-enrollment
/// after a spurious wake, to avoid re-notifying the same watcher repeatedly.
fn enroll_all<T: Send>(entries: &[SelectEntry<'_, T>], me: &WaiterRef, requeue: bool) {
    for entry in entries {
        let Some(q) = entry.target_queue() else { continue };
        let id = entry.channel.id();
        let mut state = entry.channel.lock();
        if requeue {
            state.enroll_head(q, std::sync::Arc::clone(me));
        } else {
            state.enroll_tail(q, std::sync::Arc::clone(me));
            match q {
                Queue::Gets => state.wake_one_get_event(id),
                Queue::Puts => state.wake_one_put_event(id),
                _ => {}
            }
        }
    }
}

fn deenroll_all<T: Send>(entries: &[SelectEntry<'_, T>], me: &WaiterRef) {
    for entry in entries {
        let Some(q) = entry.target_queue() else { continue };
        let mut state = entry.channel.lock();
        state.remove(q, me);
    }
}

/// §4.4: perform exactly one operable request in `entries`, or report a
/// timeout on the first entry. Exactly one entry's status is set to
/// something other than `Nop`.
pub fn select_one<T: Send>(entries: &mut [SelectEntry<'_, T>], timeout: Timeout) -> Result<usize, ChanError> {
    if entries.is_empty() {
        return Err(ChanError::EmptyArray);
    }
    if let Some(idx) = try_fast_path(entries) {
        return Ok(idx);
    }
    if matches!(timeout, Timeout::NonBlocking) {
        entries[0].status = OpStatus::Timeout;
        return Ok(0);
    }

    let deadline = deadline_for(timeout);
    let me = waiter::current_waiter();
    me.clear_signals();

    loop {
        if let Some(idx) = lock_all_and_check_one(entries, None) {
            return Ok(idx);
        }

        enroll_all(entries, &me, false);
        let woke = me.wait_for_signal(deadline);

        // Consult the signaled set for the tie-break before clearing it —
        // clearing first would throw away exactly the information that
        // distinguishes "actually signaled" from "arbitrary other" entry.
        if let Some(idx) = lock_all_and_check_one(entries, Some(&me)) {
            me.clear_signals();
            deenroll_all(entries, &me);
            return Ok(idx);
        }
        me.clear_signals();
        if !woke {
            deenroll_all(entries, &me);
            entries[0].status = OpStatus::Timeout;
            return Ok(0);
        }
        deenroll_all(entries, &me);
        enroll_all(entries, &me, true);
        trace!("select_one spurious wake, re-enrolled at head");
    }
}

/// Overall outcome of a `select_all` call (§6.1 `select_all` return shape,
/// minus `Error` which is a `Result::Err` in this API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectAllStatus {
    /// At least one channel was shut; no operation was performed on any
    /// entry. Per-entry `status` fields distinguish which.
    Event,
    /// Every entry's operation succeeded simultaneously.
    Op,
    Timeout,
}

fn any_shut<T: Send>(entries: &[SelectEntry<'_, T>]) -> bool {
    entries.iter().any(|e| e.channel.is_shut())
}

fn mark_shutdown_event<T: Send>(entries: &mut [SelectEntry<'_, T>]) {
    for entry in entries {
        entry.status = if entry.channel.is_shut() { OpStatus::Sht } else { OpStatus::Nop };
    }
}

/// `me` is accepted for the same §4.4 tie-break `lock_all_and_check_one`
/// applies, consulted via `check_order` below. It never changes *whether*
/// this returns `Op` or `Event` (select-all's contract is universal
/// readiness: every entry completes together, or none do), only the order
/// entries are written in — kept anyway so both select algorithms apply
/// the tie-break consistently rather than only where it's load-bearing.
fn lock_all_and_check_all<'a, T: Send>(entries: &mut [SelectEntry<'a, T>], me: Option<&WaiterInner>) -> Option<SelectAllStatus> {
    let channels: Vec<&'a Channel<T>> = entries.iter().map(|e| e.channel).collect();
    loop {
        let mut guards: Vec<(u64, MutexGuard<'a, ChannelState<T>>)> = Vec::with_capacity(channels.len());
        let mut contended = false;
        for ch in &channels {
            let id = ch.id();
            if guards.iter().any(|(gid, _)| *gid == id) {
                continue;
            }
            match ch.try_lock() {
                Some(g) => guards.push((id, g)),
                None => {
                    contended = true;
                    break;
                }
            }
        }
        if contended {
            drop(guards);
            std::thread::yield_now();
            continue;
        }

        if entries.iter().any(|e| {
            let pos = guards.iter().position(|(gid, _)| *gid == e.channel.id()).unwrap();
            guards[pos].1.is_shut()
        }) {
            for entry in entries.iter_mut() {
                let pos = guards.iter().position(|(gid, _)| *gid == entry.channel.id()).unwrap();
                entry.status = if guards[pos].1.is_shut() { OpStatus::Sht } else { OpStatus::Nop };
            }
            return Some(SelectAllStatus::Event);
        }

        let all_ready = entries.iter().all(|e| {
            let pos = guards.iter().position(|(gid, _)| *gid == e.channel.id()).unwrap();
            is_ready(e, &guards[pos].1)
        });
        if !all_ready {
            return None;
        }
        for i in check_order(entries, me) {
            let id = entries[i].channel.id();
            let pos = guards.iter().position(|(gid, _)| *gid == id).unwrap();
            let completed = try_complete(&mut entries[i], &mut guards[pos].1, id);
            debug_assert!(completed);
        }
        return Some(SelectAllStatus::Op);
    }
}

/// §4.5: either every entry's operation succeeds at once, or (if any
/// channel is shut) none do and every entry's status reflects shutdown
/// visibility, or the call times out.
pub fn select_all<T: Send>(entries: &mut [SelectEntry<'_, T>], timeout: Timeout) -> Result<SelectAllStatus, ChanError> {
    if entries.is_empty() {
        return Err(ChanError::EmptyArray);
    }
    if any_shut(entries) {
        mark_shutdown_event(entries);
        return Ok(SelectAllStatus::Event);
    }
    if let Some(status) = lock_all_and_check_all(entries, None) {
        return Ok(status);
    }
    if matches!(timeout, Timeout::NonBlocking) {
        for entry in entries.iter_mut() {
            entry.status = OpStatus::Timeout;
        }
        return Ok(SelectAllStatus::Timeout);
    }

    let deadline = deadline_for(timeout);
    let me = waiter::current_waiter();
    me.clear_signals();

    loop {
        if let Some(status) = lock_all_and_check_all(entries, None) {
            return Ok(status);
        }
        enroll_all(entries, &me, false);
        let woke = me.wait_for_signal(deadline);

        if let Some(status) = lock_all_and_check_all(entries, Some(&me)) {
            me.clear_signals();
            deenroll_all(entries, &me);
            return Ok(status);
        }
        me.clear_signals();
        if !woke {
            deenroll_all(entries, &me);
            for entry in entries.iter_mut() {
                entry.status = OpStatus::Timeout;
            }
            return Ok(SelectAllStatus::Timeout);
        }
        deenroll_all(entries, &me);
        enroll_all(entries, &me, true);
    }
}
