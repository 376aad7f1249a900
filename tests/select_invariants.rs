// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 chanrs contributors
//
// Select invariants from §8: select_one completes exactly one entry and
// that operation actually took effect; select_all either completes every
// entry at once or completes none (marking Sht where a channel is shut)
// and leaves every channel's state untouched in that case.

use chanrs::store::fifo::Fifo;
use chanrs::{op, select_all, select_one, Channel, OpKind, OpStatus, SelectAllStatus, SelectEntry, Timeout};

fn buffered(capacity: usize) -> Channel<i32> {
    Channel::with_store(Box::new(Fifo::new(capacity).unwrap()), None)
}

fn fill(ch: &Channel<i32>, value: i32) {
    let (status, _) = op(ch, OpKind::Put, Some(value), false, Timeout::NonBlocking).unwrap();
    assert_eq!(status, OpStatus::Put);
}

#[test]
fn select_one_completes_exactly_one_entry_and_its_effect_is_visible() {
    let a = buffered(1);
    let b = buffered(1);
    let c = buffered(1);
    fill(&a, 10);
    fill(&c, 30);

    let mut entries = [SelectEntry::get(&a), SelectEntry::get(&b), SelectEntry::get(&c)];
    let idx = select_one(&mut entries, Timeout::NonBlocking).unwrap();

    let non_nop_count = entries.iter().filter(|e| e.status != OpStatus::Nop).count();
    assert_eq!(non_nop_count, 1);
    assert_eq!(entries[idx].status, OpStatus::Get);
    assert!(entries[idx].value.is_some());
}

#[test]
fn select_all_is_all_or_nothing() {
    let a = buffered(1);
    let b = buffered(1);
    fill(&a, 1);
    // `b` has nothing buffered: select_all must time out without touching `a`.
    let mut entries = [SelectEntry::get(&a), SelectEntry::get(&b)];
    let status = select_all(&mut entries, Timeout::NonBlocking).unwrap();
    assert_eq!(status, SelectAllStatus::Timeout);
    assert!(entries.iter().all(|e| e.value.is_none()));

    fill(&b, 2);
    let mut entries = [SelectEntry::get(&a), SelectEntry::get(&b)];
    let status = select_all(&mut entries, Timeout::NonBlocking).unwrap();
    assert_eq!(status, SelectAllStatus::Op);
    assert_eq!(entries[0].value, Some(1));
    assert_eq!(entries[1].value, Some(2));
}

#[test]
fn select_all_reports_shutdown_without_touching_any_channel() {
    let a = buffered(1);
    let b = buffered(1);
    fill(&a, 1);
    b.shut();

    let mut entries = [SelectEntry::get(&a), SelectEntry::get(&b)];
    let status = select_all(&mut entries, Timeout::NonBlocking).unwrap();
    assert_eq!(status, SelectAllStatus::Event);
    assert!(entries.iter().all(|e| e.value.is_none()));
    assert_eq!(entries[1].status, OpStatus::Sht);

    // `a` still has its buffered value; nothing was consumed.
    let (status, value) = op(&a, OpKind::Get, None, false, Timeout::NonBlocking).unwrap();
    assert_eq!(status, OpStatus::Get);
    assert_eq!(value, Some(1));
}
