// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 chanrs contributors
//
// Error types for the few entry points that can genuinely fail.
//
// Most of the engine reports control flow through `OpStatus` / `SelectStatus`
// (Nop/Sht/Get/Put/Timeout) rather than `Result` — those are not errors, they
// are the expected outcomes of a blocking rendezvous. `ChanError` exists for
// the remaining cases: bad construction arguments and I/O failures surfacing
// out of a transport or frame codec.
//
// §4.1's "allocation failure during grow is recoverable" path (the store
// acts as if full/empty rather than failing) has no `ChanError` variant: it
// never leaves `Store::step`, which reports it through `StoreStatus` like
// any other transient backpressure, not through a `Result`.

use thiserror::Error;

/// Errors surfaced at channel construction and select entry points.
#[derive(Debug, Error)]
pub enum ChanError {
    /// `select_one`/`select_all` was called with an empty entry array.
    #[error("select array must not be empty")]
    EmptyArray,
    /// Invalid construction argument, e.g. zero-capacity FIFO.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
}

/// Errors surfaced by frame codecs and transport adapters.
#[derive(Debug, Error)]
pub enum FramingError {
    /// The underlying transport's `input`/`output` callback failed.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// A frame exceeded the codec's configured maximum size.
    #[error("frame too large: {size} bytes (max {max})")]
    FrameTooLarge {
        /// Size the frame claimed or reached.
        size: usize,
        /// Configured maximum for this codec instance.
        max: usize,
    },
    /// The wire bytes did not parse as a well-formed frame.
    #[error("malformed frame: {0}")]
    Malformed(String),
    /// The transport reached end-of-stream before a frame completed.
    #[error("end of stream mid-frame")]
    Eof,
}
