// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 chanrs contributors
//
// Single-channel operation (§4.3), built directly atop select-one with a
// one-entry array — the spec calls this out explicitly ("implemented atop
// the select-one engine") rather than treating it as a separate algorithm.

use crate::channel::Channel;
use crate::error::ChanError;
use crate::select::{select_one, OpKind, OpStatus, SelectEntry, Timeout};

/// Perform one blocking, non-blocking, or timed operation on a single
/// channel (§4.3).
///
/// `value` is `Some(v)` to put `v`, or `None` for a consuming `Get` or a
/// `Sht` watch. `monitor` selects §4.3's `value_slot = null` "monitor" mode
/// explicitly — wait for a matching counterpart (a blocked putter for
/// `Get`, a blocked getter for `Put`) without consuming or producing
/// anything; it is ignored for `Sht`, and must be paired with `value =
/// None` for `Get`/`Put` (a monitoring `Put` has nothing to send). Returns
/// the completed status and, for a consuming `Get`, the received value.
pub fn op<T: Send>(
    channel: &Channel<T>,
    kind: OpKind,
    value: Option<T>,
    monitor: bool,
    timeout: Timeout,
) -> Result<(OpStatus, Option<T>), ChanError> {
    debug_assert!(!monitor || value.is_none(), "monitor op must not carry a value");
    let event = monitor && kind != OpKind::Sht;
    let mut entries = [SelectEntry::raw(channel, kind, event, value)];
    select_one(&mut entries, timeout)?;
    let entry = &mut entries[0];
    Ok((entry.status, entry.value.take()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::Channel;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn put_then_get_rendezvous() {
        let ch: Channel<i32> = Channel::unbuffered();
        let putter = ch.clone();
        let t = thread::spawn(move || {
            let (status, _) = op(&putter, OpKind::Put, Some(42), false, Timeout::Forever).unwrap();
            assert_eq!(status, OpStatus::Put);
        });
        thread::sleep(Duration::from_millis(10));
        let (status, value) = op(&ch, OpKind::Get, None, false, Timeout::Forever).unwrap();
        assert_eq!(status, OpStatus::Get);
        assert_eq!(value, Some(42));
        t.join().unwrap();
    }

    #[test]
    fn get_monitor_mode_waits_for_a_blocked_putter_without_consuming() {
        let ch: Channel<i32> = Channel::unbuffered();
        let putter = ch.clone();
        let t = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            op(&putter, OpKind::Put, Some(7), false, Timeout::Forever).unwrap();
        });
        let (status, value) = op(&ch, OpKind::Get, None, true, Timeout::After(Duration::from_secs(1))).unwrap();
        assert_eq!(status, OpStatus::Get);
        assert_eq!(value, None);
        t.join().unwrap();
        // The put is still pending on the channel's built-in slot.
        let (status, value) = op(&ch, OpKind::Get, None, false, Timeout::NonBlocking).unwrap();
        assert_eq!(status, OpStatus::Get);
        assert_eq!(value, Some(7));
    }

    #[test]
    fn non_blocking_get_on_empty_channel_times_out() {
        let ch: Channel<i32> = Channel::unbuffered();
        let (status, _) = op(&ch, OpKind::Get, None, false, Timeout::NonBlocking).unwrap();
        assert_eq!(status, OpStatus::Timeout);
    }

    #[test]
    fn sht_op_waits_for_shutdown() {
        let ch: Channel<i32> = Channel::unbuffered();
        let shutter = ch.clone();
        let t = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            shutter.shut();
        });
        let (status, _) = op(&ch, OpKind::Sht, None, false, Timeout::After(Duration::from_secs(1))).unwrap();
        assert_eq!(status, OpStatus::Sht);
        t.join().unwrap();
    }

    #[test]
    fn put_after_shut_fails() {
        let ch: Channel<i32> = Channel::unbuffered();
        ch.shut();
        let (status, value) = op(&ch, OpKind::Put, Some(1), false, Timeout::NonBlocking).unwrap();
        assert_eq!(status, OpStatus::Sht);
        assert_eq!(value, None);
    }
}
