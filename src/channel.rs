// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 chanrs contributors
//
// The rendezvous engine (§3, §4.2): a channel's mutex-protected state, its
// five waiter queues, status bits, open count, and lifecycle. Single-
// operation and select semantics live in `op.rs`/`select.rs`, which only
// touch this module through the `pub(crate)` accessors below; everything
// that needs the channel mutex held is expressed as a method here so the
// lock is never taken from two places for the same critical section.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, TryLockError};

use tracing::{debug, trace};

use crate::store::{Store, StoreOper, StoreStatus, StoreWait};
use crate::waiter::{self, WaiterRef};

/// Which of a channel's five waiter queues a given wait belongs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Queue {
    Gets,
    Puts,
    GetEvents,
    PutEvents,
    Shutdowns,
}

pub(crate) struct ChannelState<T> {
    store: Box<dyn Store<T>>,
    /// Last status the store reported; always overwritten by the next
    /// `step`, never read before the first call (§3: "the store's reported
    /// status is authoritative; the engine never caches it across a store
    /// call" — this field is the engine's copy of that authoritative value,
    /// kept in lockstep with it, not an independent cache).
    status: StoreStatus,
    shut: bool,
    open_count: u32,
    gets: VecDeque<WaiterRef>,
    puts: VecDeque<WaiterRef>,
    get_events: VecDeque<WaiterRef>,
    put_events: VecDeque<WaiterRef>,
    shutdowns: VecDeque<WaiterRef>,
    dequeue: Option<Box<dyn Fn(T) + Send + Sync>>,
}

impl<T> ChannelState<T> {
    fn queue(&mut self, q: Queue) -> &mut VecDeque<WaiterRef> {
        match q {
            Queue::Gets => &mut self.gets,
            Queue::Puts => &mut self.puts,
            Queue::GetEvents => &mut self.get_events,
            Queue::PutEvents => &mut self.put_events,
            Queue::Shutdowns => &mut self.shutdowns,
        }
    }

    pub(crate) fn status(&self) -> StoreStatus {
        self.status
    }

    pub(crate) fn is_shut(&self) -> bool {
        self.shut
    }

    pub(crate) fn open_count(&self) -> u32 {
        self.open_count
    }

    /// Enroll `w` at the tail of queue `q`, unless it is already present
    /// (§3 invariant: "a waiter appears in any given channel queue at most
    /// once").
    pub(crate) fn enroll_tail(&mut self, q: Queue, w: WaiterRef) {
        let queue = self.queue(q);
        if !queue.iter().any(|existing| Arc::ptr_eq(existing, &w)) {
            queue.push_back(w);
        }
    }

    /// Re-enroll `w` at the head of queue `q` after a spurious wake, ahead
    /// of everyone still waiting (§4.4 step 6 fairness bias).
    pub(crate) fn enroll_head(&mut self, q: Queue, w: WaiterRef) {
        let queue = self.queue(q);
        queue.retain(|existing| !Arc::ptr_eq(existing, &w));
        queue.push_front(w);
    }

    /// Remove `w` from queue `q` if present. Used once an enrolled wait
    /// either completes or is abandoned for a different channel in the
    /// same select array.
    pub(crate) fn remove(&mut self, q: Queue, w: &WaiterRef) {
        self.queue(q).retain(|existing| !Arc::ptr_eq(existing, w));
    }

    fn wake_one(&mut self, q: Queue, channel_id: u64) {
        if let Some(w) = self.queue(q).pop_front() {
            w.signal(channel_id);
        }
    }

    pub(crate) fn puts_waiting(&self) -> bool {
        !self.puts.is_empty()
    }

    pub(crate) fn gets_waiting(&self) -> bool {
        !self.gets.is_empty()
    }

    /// Called right after a getter newly enrolls (§4.4 step 4): a
    /// `GetEvent` watcher's wait condition ("a getter is blocked") is now
    /// genuinely true, so wake one if present.
    pub(crate) fn wake_one_get_event(&mut self, channel_id: u64) {
        self.wake_one(Queue::GetEvents, channel_id);
    }

    /// Symmetric counterpart for a newly enrolled putter and `PutEvent`
    /// watchers.
    pub(crate) fn wake_one_put_event(&mut self, channel_id: u64) {
        self.wake_one(Queue::PutEvents, channel_id);
    }

    /// Wakes all waiters on every queue, used by `shut` and the drain loop.
    fn wake_all(&mut self, channel_id: u64) {
        for q in [Queue::Gets, Queue::Puts, Queue::GetEvents, Queue::PutEvents, Queue::Shutdowns] {
            for w in self.queue(q).drain(..) {
                w.signal(channel_id);
            }
        }
    }

    pub(crate) fn all_queues_empty(&self) -> bool {
        self.gets.is_empty()
            && self.puts.is_empty()
            && self.get_events.is_empty()
            && self.put_events.is_empty()
            && self.shutdowns.is_empty()
    }

    /// Perform a value-producing `Get`, assuming the caller already checked
    /// `status().can_get()`. Updates cached status, wakes one putter (or a
    /// `PutEvent` watcher if none), and returns the value.
    pub(crate) fn do_get(&mut self, channel_id: u64) -> T {
        let wait = StoreWait::new(self.gets.is_empty(), self.puts.is_empty());
        let mut slot = None;
        let new_status = self.store.step(StoreOper::Get, wait, &mut slot);
        self.apply_status(new_status, channel_id);
        if self.puts.is_empty() {
            self.wake_one(Queue::PutEvents, channel_id);
        } else {
            self.wake_one(Queue::Puts, channel_id);
        }
        slot.expect("store reported can_get but produced no value")
    }

    /// Perform a value-consuming `Put`, assuming the caller already checked
    /// `status().can_put()`.
    pub(crate) fn do_put(&mut self, value: T, channel_id: u64) {
        let wait = StoreWait::new(self.gets.is_empty(), self.puts.is_empty());
        let mut slot = Some(value);
        let new_status = self.store.step(StoreOper::Put, wait, &mut slot);
        self.apply_status(new_status, channel_id);
        if self.gets.is_empty() {
            self.wake_one(Queue::GetEvents, channel_id);
        } else {
            self.wake_one(Queue::Gets, channel_id);
        }
    }

    fn apply_status(&mut self, new_status: StoreStatus, channel_id: u64) {
        self.status = new_status;
        if new_status.is_shutdown_signal() {
            debug!(channel_id, "store signaled shutdown");
            self.shut_locked(channel_id);
        }
    }

    fn shut_locked(&mut self, channel_id: u64) {
        if !self.shut {
            self.shut = true;
            self.wake_all(channel_id);
        }
    }
}

/// A cloneable handle to a channel (§4.2 "Open"). Cloning increments the
/// open count, mirroring `channel_open`; dropping decrements it and drains
/// the channel's state on the last handle, mirroring `channel_close`.
pub struct Channel<T: Send> {
    id: u64,
    inner: Arc<Mutex<ChannelState<T>>>,
}

impl<T: Send> Clone for Channel<T> {
    fn clone(&self) -> Self {
        self.inner.lock().unwrap().open_count += 1;
        trace!(channel_id = self.id, "channel opened");
        Self { id: self.id, inner: Arc::clone(&self.inner) }
    }
}

impl<T: Send> Channel<T> {
    /// Create a channel backed by `store`, with an optional per-item
    /// dequeue callback invoked on every item dropped during a shutdown
    /// drain (§4.2 "Create", §7).
    pub fn with_store(store: Box<dyn Store<T>>, dequeue: Option<Box<dyn Fn(T) + Send + Sync>>) -> Self {
        let status = store.initial_status();
        let id = waiter::next_channel_id();
        trace!(channel_id = id, "channel created");
        Self {
            id,
            inner: Arc::new(Mutex::new(ChannelState {
                store,
                status,
                shut: false,
                open_count: 1,
                gets: VecDeque::new(),
                puts: VecDeque::new(),
                get_events: VecDeque::new(),
                put_events: VecDeque::new(),
                shutdowns: VecDeque::new(),
                dequeue,
            })),
        }
    }

    /// Create a channel using the built-in unbuffered store (§4.2 "Create":
    /// "If no store, use the built-in unbuffered store").
    pub fn unbuffered() -> Self {
        Self::with_store(Box::new(crate::store::unbuffered::Unbuffered::new()), None)
    }

    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, ChannelState<T>> {
        self.inner.lock().unwrap()
    }

    pub(crate) fn try_lock(&self) -> Option<MutexGuard<'_, ChannelState<T>>> {
        match self.inner.try_lock() {
            Ok(g) => Some(g),
            Err(TryLockError::WouldBlock) => None,
            Err(TryLockError::Poisoned(p)) => Some(p.into_inner()),
        }
    }

    /// §4.2 "Shut": sets `Shut`, wakes every waiter on every queue.
    /// Idempotent.
    pub fn shut(&self) {
        let mut state = self.lock();
        debug!(channel_id = self.id, "channel shut");
        state.shut_locked(self.id);
    }

    pub fn is_shut(&self) -> bool {
        self.lock().is_shut()
    }

    pub fn open_count(&self) -> u32 {
        self.lock().open_count()
    }

    /// §4.2 "Close": decrements the open count. On the last handle, drains
    /// every waiter queue (waking and yielding until all five are empty)
    /// and invokes the store's deallocator with the final status.
    pub fn close(self) {
        let remaining = {
            let mut state = self.lock();
            state.open_count -= 1;
            state.open_count
        };
        if remaining > 0 {
            trace!(channel_id = self.id, remaining, "channel closed (handles remain)");
            return;
        }
        debug!(channel_id = self.id, "channel closed, draining");
        loop {
            let mut state = self.lock();
            if state.all_queues_empty() {
                let final_status = state.status();
                let dequeue = state.dequeue.take();
                state.store.dealloc(
                    final_status,
                    &mut |item| {
                        if let Some(cb) = dequeue.as_ref() {
                            cb(item);
                        }
                    },
                );
                break;
            }
            state.wake_all(self.id);
            drop(state);
            std::thread::yield_now();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_unbuffered_channel_can_put_not_get() {
        let ch: Channel<i32> = Channel::unbuffered();
        let st = ch.lock().status();
        assert!(st.can_put());
        assert!(!st.can_get());
    }

    #[test]
    fn open_increments_and_close_decrements_open_count() {
        let ch: Channel<i32> = Channel::unbuffered();
        let ch2 = ch.clone();
        assert_eq!(ch.open_count(), 2);
        ch2.close();
        assert_eq!(ch.open_count(), 1);
    }

    #[test]
    fn shut_is_idempotent() {
        let ch: Channel<i32> = Channel::unbuffered();
        ch.shut();
        ch.shut();
        assert!(ch.is_shut());
    }

    #[test]
    fn do_put_then_do_get_round_trips() {
        let ch: Channel<i32> = Channel::unbuffered();
        {
            let mut state = ch.lock();
            assert!(state.status().can_put());
            state.do_put(5, ch.id());
        }
        let mut state = ch.lock();
        assert!(state.status().can_get());
        assert_eq!(state.do_get(ch.id()), 5);
    }

    #[test]
    fn close_last_handle_drains_residual_item_via_dequeue_callback() {
        use std::sync::atomic::{AtomicI32, Ordering};
        let dropped = Arc::new(AtomicI32::new(0));
        let dropped2 = Arc::clone(&dropped);
        let ch: Channel<i32> =
            Channel::with_store(Box::new(crate::store::unbuffered::Unbuffered::new()), Some(Box::new(move |v| {
                dropped2.fetch_add(v, Ordering::SeqCst);
            })));
        ch.lock().do_put(11, ch.id());
        ch.close();
        assert_eq!(dropped.load(Ordering::SeqCst), 11);
    }
}
