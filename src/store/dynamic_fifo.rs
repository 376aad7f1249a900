// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 chanrs contributors
//
// Latency-sensitive dynamic FIFO (§4.1), ported from the grow/shrink
// hysteresis in `chanStrFLSO.c`. That file implements the ring as a fixed
// C array of `max` slots with a separately tracked *effective* capacity
// `s` that grows and shrinks between 1 and `max`; `h == t` is ambiguous
// between empty and full there and is disambiguated only by which branch
// (`Put` is only ever invoked when not full, `Get` only when not empty)
// is executing. A `VecDeque` already tracks emptiness exactly, so this
// port keeps the effective-capacity bookkeeping (the actual behavior
// worth preserving) and drops the raw index/shift arithmetic, which was
// purely an artifact of the fixed-array representation.
//
// Thresholds ("capacity > 2") are taken verbatim from the original:
//
//   Put: if the queue is empty and no getter is waiting (`NoGet`) and the
//        effective capacity is > 2, shrink by one before inserting.
//        After inserting, if the queue is now full: grow by one if a
//        getter *is* waiting (`NoGet` clear) and there is room below
//        `max`; otherwise report CanGet only (full).
//   Get: if the queue is full and a putter *is* waiting (`NoPut` clear)
//        and there is room below `max`, grow by one before removing.
//        After removing, if the queue is now empty: shrink by one if no
//        putter is waiting (`NoPut`) and the effective capacity is > 2;
//        report CanPut only (empty).

use std::collections::VecDeque;

use super::{invalid_argument, Store, StoreOper, StoreStatus, StoreWait};
use crate::config::DynamicFifoConfig;
use crate::error::ChanError;

#[derive(Debug)]
pub struct DynamicFifo<T> {
    items: VecDeque<T>,
    /// Current effective capacity; grows/shrinks within `1..=max`.
    capacity: usize,
    max: usize,
}

impl<T> DynamicFifo<T> {
    pub fn new(config: DynamicFifoConfig) -> Result<Self, ChanError> {
        if config.max == 0 {
            return Err(invalid_argument("dynamic fifo max must be >= 1"));
        }
        Ok(Self {
            items: VecDeque::with_capacity(config.initial),
            capacity: config.initial,
            max: config.max,
        })
    }
}

impl<T: Send> Store<T> for DynamicFifo<T> {
    fn initial_status(&self) -> StoreStatus {
        StoreStatus::CAN_PUT
    }

    fn step(&mut self, oper: StoreOper, wait: StoreWait, value: &mut Option<T>) -> StoreStatus {
        match oper {
            StoreOper::Put => {
                if self.items.is_empty() && wait.no_get() && self.capacity > 2 {
                    self.capacity -= 1;
                }
                self.items.push_back(value.take().expect("put without a value"));
                if self.items.len() == self.capacity {
                    if !wait.no_get() && self.capacity < self.max {
                        self.capacity += 1;
                        StoreStatus::CAN_GET | StoreStatus::CAN_PUT
                    } else {
                        StoreStatus::CAN_GET
                    }
                } else {
                    StoreStatus::CAN_GET | StoreStatus::CAN_PUT
                }
            }
            StoreOper::Get => {
                if self.items.len() == self.capacity && !wait.no_put() && self.capacity < self.max {
                    self.capacity += 1;
                }
                *value = self.items.pop_front();
                if self.items.is_empty() {
                    if wait.no_put() && self.capacity > 2 {
                        self.capacity -= 1;
                    }
                    StoreStatus::CAN_PUT
                } else {
                    StoreStatus::CAN_GET | StoreStatus::CAN_PUT
                }
            }
        }
    }

    fn dealloc(&mut self, final_status: StoreStatus, drain: &mut dyn FnMut(T)) {
        if final_status.can_get() {
            while let Some(item) = self.items.pop_front() {
                drain(item);
            }
        }
    }
}
