// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 chanrs contributors
//
// Construction-time configuration records.
//
// The original C library takes a variadic argument list keyed by store
// backend type (§9 design note: "variadic store allocation"). In Rust this
// collapses to a plain config struct per backend plus one for the
// supervisor's retry policy.

use std::time::Duration;

/// Tuning for the dynamic, latency-sensitive FIFO store (§4.1).
#[derive(Debug, Clone, Copy)]
pub struct DynamicFifoConfig {
    /// Starting capacity.
    pub initial: usize,
    /// Capacity ceiling; the ring never grows past this.
    pub max: usize,
}

impl DynamicFifoConfig {
    /// Build a config, clamping `initial` to be within `1..=max`.
    pub fn new(initial: usize, max: usize) -> Self {
        let max = max.max(1);
        let initial = initial.clamp(1, max);
        Self { initial, max }
    }
}

impl Default for DynamicFifoConfig {
    fn default() -> Self {
        Self { initial: 4, max: 1024 }
    }
}

/// Tuning for the blob supervisor's teardown retry loop (§4.6, §9 Open
/// Question (b): the ~30-minute ceiling is a configurable parameter, not a
/// hardcoded constant).
#[derive(Debug, Clone, Copy)]
pub struct SupervisorConfig {
    /// How often the monitor thread polls both channels' shutdown state.
    pub poll_interval: Duration,
    /// Total time to wait for the non-failing direction to exit on its own
    /// before cancelling it.
    pub retry_ceiling: Duration,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            retry_ceiling: Duration::from_secs(30 * 60),
        }
    }
}

/// Maximum frame size accepted by ingress codecs, in bytes (§4.7).
#[derive(Debug, Clone, Copy)]
pub struct CodecConfig {
    /// Hard ceiling on a single decoded frame. `None` means unbounded.
    pub max_frame: Option<usize>,
    /// Chunk size used by the raw codec's ingress reads.
    pub raw_read_size: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self { max_frame: None, raw_read_size: 65536 }
    }
}
