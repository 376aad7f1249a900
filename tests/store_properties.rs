// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 chanrs contributors
//
// Quantified store properties from spec §8: FIFO preserves put order, LIFO
// reverses it, for arbitrary sequences a single thread drives synchronously
// (no blocking involved, so these exercise the store backends directly
// through the channel's op/select boundary rather than the bare Store
// trait, unlike the per-backend unit tests colocated with each store).

use chanrs::store::fifo::Fifo;
use chanrs::store::lifo::Lifo;
use chanrs::{op, Channel, OpKind, OpStatus, Timeout};
use proptest::prelude::*;

fn put_all_then_get_all(ch: &Channel<i32>, values: &[i32]) -> Vec<i32> {
    for &v in values {
        let (status, _) = op(ch, OpKind::Put, Some(v), false, Timeout::NonBlocking).unwrap();
        assert_eq!(status, OpStatus::Put, "store should accept up to its capacity");
    }
    let mut out = Vec::with_capacity(values.len());
    for _ in 0..values.len() {
        let (status, value) = op(ch, OpKind::Get, None, false, Timeout::NonBlocking).unwrap();
        assert_eq!(status, OpStatus::Get);
        out.push(value.unwrap());
    }
    out
}

proptest! {
    #[test]
    fn fifo_preserves_put_order(values in prop::collection::vec(any::<i32>(), 0..64)) {
        let ch: Channel<i32> = Channel::with_store(Box::new(Fifo::new(values.len().max(1)).unwrap()), None);
        let out = put_all_then_get_all(&ch, &values);
        prop_assert_eq!(out, values);
    }

    #[test]
    fn lifo_reverses_put_order(values in prop::collection::vec(any::<i32>(), 0..64)) {
        let ch: Channel<i32> = Channel::with_store(Box::new(Lifo::new(values.len().max(1)).unwrap()), None);
        let out = put_all_then_get_all(&ch, &values);
        let mut expected = values.clone();
        expected.reverse();
        prop_assert_eq!(out, expected);
    }
}
