// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 chanrs contributors
//
// Blob supervisor (§4.6): spawns an egress and/or ingress framer thread,
// propagates shutdown between them, and performs final resource release
// once both have terminated.
//
// Each framer thread runs its codec's `egress`/`ingress` loop to
// completion, then shuts its own channel regardless of whether it exited
// cleanly or on a transport error (§4.7 "after loop exit, shut its channel
// and invoke the codec's finalizer" — the finalizer here is exactly "shut
// the channel", since there is no separate per-direction resource to
// release beyond what `Direction::transport`'s `Drop` already handles).
// A monitor thread then waits for whichever direction shuts first, gives
// the other a bounded grace period to exit on its own, and cancels it via
// an out-of-band canceller if it doesn't (§4.6, §9 Open Question (b)).

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::blob::Blob;
use crate::channel::Channel;
use crate::codec::Codec;
use crate::config::SupervisorConfig;
use crate::select::{select_one, SelectEntry, Timeout};
use crate::transport::Transport;

/// One direction (egress or ingress) of a framed connection.
pub struct Direction {
    pub channel: Channel<Blob>,
    pub transport: Box<dyn Transport>,
    pub codec: Arc<dyn Codec>,
    /// Out-of-band cancellation hook, independent of `transport`, invoked
    /// by the monitor thread if this direction outlives its peer by more
    /// than the configured retry ceiling. Typically a cloned socket
    /// handle's `shutdown()` — it must be safely callable while this
    /// direction's own I/O call is in flight, which `transport` itself
    /// generally is not (§9 "Cleanup-on-cancel": cooperative cancellation
    /// replaces the original's asynchronous thread cancellation).
    pub cancel: Option<Box<dyn Fn() + Send>>,
}

struct Worker {
    channel: Channel<Blob>,
    cancel: Option<Box<dyn Fn() + Send>>,
    join: JoinHandle<()>,
}

/// A running supervisor. Dropping this does not stop the framer threads —
/// call `join` (or let the channels shut down on their own) to wait for
/// them.
pub struct SupervisorHandle {
    monitor: JoinHandle<()>,
}

impl SupervisorHandle {
    pub fn join(self) {
        let _ = self.monitor.join();
    }
}

fn spawn_framer(label: &'static str, direction: Direction, run: impl FnOnce(&dyn Codec, &Channel<Blob>, &mut dyn Transport) -> Result<(), crate::error::FramingError> + Send + 'static) -> Worker {
    let Direction { channel, mut transport, codec, cancel } = direction;
    let chan_for_thread = channel.clone();
    let join = thread::spawn(move || {
        let result = run(codec.as_ref(), &chan_for_thread, transport.as_mut());
        if let Err(e) = &result {
            warn!(direction = label, error = %e, "framer exited on error");
        } else {
            debug!(direction = label, "framer exited cleanly");
        }
        chan_for_thread.shut();
        transport.close();
        chan_for_thread.close();
    });
    Worker { channel, cancel, join }
}

/// Spawns the given directions' framer threads and a monitor thread that
/// propagates shutdown between them, finally invoking `final_close` once
/// both have terminated (or the single given direction has, if only one
/// was supplied).
pub fn spawn(
    egress: Option<Direction>,
    ingress: Option<Direction>,
    config: SupervisorConfig,
    final_close: impl FnOnce() + Send + 'static,
) -> SupervisorHandle {
    let egress_worker = egress.map(|d| spawn_framer("egress", d, |codec, chan, transport| codec.egress(chan, transport)));
    let ingress_worker = ingress.map(|d| spawn_framer("ingress", d, |codec, chan, transport| codec.ingress(chan, transport)));

    let monitor = thread::spawn(move || {
        match (egress_worker, ingress_worker) {
            (Some(e), Some(i)) => run_both(e, i, config),
            (Some(w), None) | (None, Some(w)) => run_one(w),
            (None, None) => {}
        }
        final_close();
    });

    SupervisorHandle { monitor }
}

fn run_one(w: Worker) {
    let _ = w.join.join();
    w.channel.close();
}

fn run_both(a: Worker, b: Worker, config: SupervisorConfig) {
    // Wait for whichever direction shuts first (§4.3 Sht op, used as a
    // monitor: "wait until Shut is set").
    let mut entries = [SelectEntry::sht(&a.channel), SelectEntry::sht(&b.channel)];
    let _ = select_one(&mut entries, Timeout::Forever);

    let (first, second) = if a.channel.is_shut() { (a, b) } else { (b, a) };
    let _ = first.join.join();
    first.channel.close();

    // Give the other direction a bounded grace period to exit on its own
    // (§4.6 "bounded retry with 1-second polls, up to ~30 minutes").
    let deadline = Instant::now() + config.retry_ceiling;
    while !second.channel.is_shut() {
        if Instant::now() >= deadline {
            warn!("direction outlived its peer past the retry ceiling, cancelling");
            if let Some(cancel) = &second.cancel {
                cancel();
            }
            break;
        }
        let remaining = deadline.saturating_duration_since(Instant::now());
        thread::sleep(config.poll_interval.min(remaining.max(Duration::from_millis(1))));
    }
    let _ = second.join.join();
    second.channel.close();
}
