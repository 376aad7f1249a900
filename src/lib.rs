// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 chanrs contributors
//
// A CSP-style rendezvous channel for native threads.
//
// The centerpiece is the rendezvous engine (`channel`, `select`, `op`,
// `waiter`): a mutex-protected channel object, single-operation and
// select-one/select-all semantics over arrays of heterogeneous operations,
// and a per-thread waiter record threads sleep on. Pluggable `store`
// backends give the channel its queueing policy. Around that core sits a
// smaller blob-framing subsystem (`blob`, `codec`, `transport`,
// `supervisor`) that turns byte streams into channels of length-delimited
// messages.

pub mod config;
pub mod error;

mod waiter;

pub mod store;

mod channel;
pub use channel::Channel;

mod op;
pub use op::op;

mod select;
pub use select::{select_all, select_one, OpKind, OpStatus, SelectAllStatus, SelectEntry, Timeout};

pub mod blob;
pub mod codec;
pub mod transport;

pub mod supervisor;
