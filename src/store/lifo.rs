// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 chanrs contributors
//
// LIFO store (§4.1): "Linear stack of size s." Puts push, gets pop from the
// same end, so gets observe reverse insertion order once several items are
// buffered (§8 testable property: puts v1..vn, gets yield vn..v1).

use super::{invalid_argument, Store, StoreOper, StoreStatus, StoreWait};
use crate::error::ChanError;

#[derive(Debug)]
pub struct Lifo<T> {
    items: Vec<T>,
    capacity: usize,
}

impl<T> Lifo<T> {
    pub fn new(capacity: usize) -> Result<Self, ChanError> {
        if capacity == 0 {
            return Err(invalid_argument("lifo capacity must be >= 1"));
        }
        Ok(Self { items: Vec::with_capacity(capacity), capacity })
    }
}

impl<T: Send> Store<T> for Lifo<T> {
    fn initial_status(&self) -> StoreStatus {
        StoreStatus::CAN_PUT
    }

    fn step(&mut self, oper: StoreOper, _wait: StoreWait, value: &mut Option<T>) -> StoreStatus {
        match oper {
            StoreOper::Put => {
                self.items.push(value.take().expect("put without a value"));
                if self.items.len() == self.capacity {
                    StoreStatus::CAN_GET
                } else {
                    StoreStatus::CAN_GET | StoreStatus::CAN_PUT
                }
            }
            StoreOper::Get => {
                *value = self.items.pop();
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
            while let Some(item) = self.items.pop() {
                drain(item);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifo_reverses_order() {
        let mut s: Lifo<i32> = Lifo::new(4).unwrap();
        for v in [1, 2, 3] {
            let mut val = Some(v);
            s.step(StoreOper::Put, StoreWait::NONE, &mut val);
        }
        let mut out = Vec::new();
        for _ in 0..3 {
            let mut v = None;
            s.step(StoreOper::Get, StoreWait::NONE, &mut v);
            out.push(v.unwrap());
        }
        assert_eq!(out, vec![3, 2, 1]);
    }
}
