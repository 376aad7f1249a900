// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 chanrs contributors
//
// The store backend contract (§4.1). A store owns the items queued behind
// a channel; the channel never inspects queue contents itself, only the
// status bits a store reports after each `step`.
//
// `step` runs with the channel mutex held by the caller (`channel.rs`), so
// stores never need their own internal locking for the in-process backends
// here. `wait` hints at whether a waiter of the *opposite* kind is present,
// letting latency-sensitive stores like `dynamic_fifo` grow or shrink
// opportunistically instead of on a fixed schedule.

pub mod dynamic_fifo;
#[cfg(feature = "external-store")]
pub mod external;
pub mod fifo;
pub mod lifo;
pub mod unbuffered;

use crate::error::ChanError;

/// Which operation a `step` call is performing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOper {
    Get,
    Put,
}

/// Readiness bits a store reports after every `step` (§3: "the store's
/// reported status is authoritative; the engine never caches it across a
/// store call" — the channel keeps a copy of the *last* returned value, but
/// always overwrites it with whatever the next `step` returns).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StoreStatus(u8);

impl StoreStatus {
    pub const NONE: StoreStatus = StoreStatus(0);
    pub const CAN_PUT: StoreStatus = StoreStatus(0b01);
    pub const CAN_GET: StoreStatus = StoreStatus(0b10);

    pub const fn can_put(self) -> bool {
        self.0 & Self::CAN_PUT.0 != 0
    }

    pub const fn can_get(self) -> bool {
        self.0 & Self::CAN_GET.0 != 0
    }

    /// A store returning `NONE` from `step` is the signal to shut the
    /// channel down immediately (§4.1 "Failure").
    pub const fn is_shutdown_signal(self) -> bool {
        self.0 == 0
    }

    pub const fn union(self, other: StoreStatus) -> StoreStatus {
        StoreStatus(self.0 | other.0)
    }
}

impl std::ops::BitOr for StoreStatus {
    type Output = StoreStatus;
    fn bitor(self, rhs: StoreStatus) -> StoreStatus {
        self.union(rhs)
    }
}

/// Hints passed into `step`, reflecting whether a waiter of the *matching*
/// queue (not the caller) is currently absent (§4.4 "Store-dispatch").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StoreWait(u8);

impl StoreWait {
    pub const NONE: StoreWait = StoreWait(0);
    pub const NO_GET: StoreWait = StoreWait(0b01);
    pub const NO_PUT: StoreWait = StoreWait(0b10);

    pub const fn no_get(self) -> bool {
        self.0 & Self::NO_GET.0 != 0
    }

    pub const fn no_put(self) -> bool {
        self.0 & Self::NO_PUT.0 != 0
    }

    pub fn new(no_get: bool, no_put: bool) -> Self {
        let mut bits = 0;
        if no_get {
            bits |= Self::NO_GET.0;
        }
        if no_put {
            bits |= Self::NO_PUT.0;
        }
        StoreWait(bits)
    }
}

/// Pluggable queueing policy behind a channel (§4.1).
///
/// Implementors run entirely under the owning channel's mutex: `step` may
/// assume exclusive access and must not block except for the external
/// store's deliberate, documented exception of doing I/O under the lock.
pub trait Store<T>: Send {
    /// Status this store reports immediately after construction.
    fn initial_status(&self) -> StoreStatus;

    /// Perform one Get or Put. `value` is consumed on `Put`, produced on
    /// `Get`. Returns the store's new status, or `StoreStatus::NONE` to
    /// request immediate channel shutdown.
    fn step(&mut self, oper: StoreOper, wait: StoreWait, value: &mut Option<T>) -> StoreStatus;

    /// Called once, under the channel mutex, during final close. If
    /// `final_status` reports `CAN_GET`, the store must hand every residual
    /// item to `drain` before dropping its own state, giving the owner a
    /// chance to release them (§4.1, §7 "dropped item ... reported by
    /// invoking the per-item dequeue callback").
    fn dealloc(&mut self, final_status: StoreStatus, drain: &mut dyn FnMut(T));
}

/// Shared constructor-argument-validation error for the bounded backends
/// below (zero-capacity FIFO/LIFO, zero-slot dynamic FIFO ceiling, an
/// external store whose backing file can't be opened) — one place to
/// build a `ChanError::InvalidArgument` instead of each backend
/// constructing the variant directly.
pub(crate) fn invalid_argument(msg: &'static str) -> ChanError {
    ChanError::InvalidArgument(msg)
}
