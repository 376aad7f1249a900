// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 chanrs contributors
//
// Static (fixed-capacity) FIFO store (§4.1): "Circular array of fixed size
// s>=1. Full when tail advances into head." Backed by a `VecDeque` bounded
// to `capacity`, which gives the same circular-array behavior without hand
// rolled index arithmetic.

use std::collections::VecDeque;

use super::{invalid_argument, Store, StoreOper, StoreStatus, StoreWait};
use crate::error::ChanError;

#[derive(Debug)]
pub struct Fifo<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> Fifo<T> {
    pub fn new(capacity: usize) -> Result<Self, ChanError> {
        if capacity == 0 {
            return Err(invalid_argument("fifo capacity must be >= 1"));
        }
        Ok(Self { items: VecDeque::with_capacity(capacity), capacity })
    }
}

impl<T: Send> Store<T> for Fifo<T> {
    fn initial_status(&self) -> StoreStatus {
        StoreStatus::CAN_PUT
    }

    fn step(&mut self, oper: StoreOper, _wait: StoreWait, value: &mut Option<T>) -> StoreStatus {
        match oper {
            StoreOper::Put => {
                self.items.push_back(value.take().expect("put without a value"));
                if self.items.len() == self.capacity {
                    StoreStatus::CAN_GET
                } else {
                    StoreStatus::CAN_GET | StoreStatus::CAN_PUT
                }
            }
            StoreOper::Get => {
                *value = self.items.pop_front();
                if self.items.is_empty() {
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
