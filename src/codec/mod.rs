// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 chanrs contributors
//
// Frame codec contract (§4.7): each wire framing is a pair of directional
// functions, egress (blobs -> bytes) and ingress (bytes -> blobs), that run
// single-threaded inside a framer thread and interact with the rendezvous
// engine only through blocking channel `op` calls plus a transport's
// synchronous `input`/`output`.

pub mod fastcgi;
pub mod http1;
pub mod netconf10;
pub mod netconf11;
pub mod netstring;
pub mod raw;
pub mod vlq;

use crate::blob::Blob;
use crate::channel::Channel;
use crate::config::CodecConfig;
use crate::error::FramingError;
use crate::op::op;
use crate::select::{OpKind, Timeout};
use crate::transport::Transport;

/// A wire framing, instantiated as an egress/ingress function pair (§4.7,
/// glossary "Frame codec: stateless description of a wire framing").
pub trait Codec: Send + Sync {
    /// Drain `chan` and write each blob to `transport` until the channel is
    /// shut. Returns on clean shutdown (`Ok`) or transport failure (`Err`,
    /// per §4.7 "propagate I/O errors by returning").
    fn egress(&self, chan: &Channel<Blob>, transport: &mut dyn Transport) -> Result<(), FramingError>;

    /// Read frames from `transport` and put each one onto `chan` until the
    /// transport reaches end-of-stream or the channel is shut.
    fn ingress(&self, chan: &Channel<Blob>, transport: &mut dyn Transport) -> Result<(), FramingError>;
}

/// Reads a blob off `chan`, blocking forever. Returns `None` once the
/// channel is shut (egress loops treat that as "stop, nothing left to
/// send" per §8 "after shut, every subsequent Put returns Sht" — the
/// mirror image for a getter is exactly this: a shut channel with nothing
/// buffered yields `Sht` too).
pub(crate) fn next_blob(chan: &Channel<Blob>) -> Result<Option<Blob>, FramingError> {
    let (status, value) = op(chan, OpKind::Get, None, false, Timeout::Forever)
        .map_err(|e| FramingError::Malformed(e.to_string()))?;
    Ok(if status == crate::select::OpStatus::Get { value } else { None })
}

/// Puts `blob` onto `chan`, blocking forever. Returns `false` if the
/// channel was shut before the put could complete.
pub(crate) fn put_blob(chan: &Channel<Blob>, blob: Blob) -> Result<bool, FramingError> {
    let (status, _) = op(chan, OpKind::Put, Some(blob), false, Timeout::Forever)
        .map_err(|e| FramingError::Malformed(e.to_string()))?;
    Ok(status == crate::select::OpStatus::Put)
}

/// Accumulates bytes pulled from a `Transport` so an ingress codec can look
/// ahead for a delimiter, grow its lookahead window, and split leftover
/// bytes off into the next frame — the Rust equivalent of the reusable
/// staging buffer (`b[16]`, shifted and re-filled in place) the C codecs
/// use for the same purpose, without the manual index arithmetic.
pub(crate) struct ByteSource<'t> {
    transport: &'t mut dyn Transport,
    buf: std::collections::VecDeque<u8>,
    chunk: usize,
}

impl<'t> ByteSource<'t> {
    pub(crate) fn new(transport: &'t mut dyn Transport, chunk: usize) -> Self {
        Self { transport, buf: std::collections::VecDeque::new(), chunk: chunk.max(1) }
    }

    /// Pull one more chunk from the transport into the lookahead buffer.
    /// Returns `false` on end-of-stream.
    pub(crate) fn pull(&mut self) -> Result<bool, FramingError> {
        let mut tmp = vec![0u8; self.chunk];
        let n = self.transport.input(&mut tmp)?;
        if n == 0 {
            return Ok(false);
        }
        self.buf.extend(&tmp[..n]);
        Ok(true)
    }

    pub(crate) fn len(&self) -> usize {
        self.buf.len()
    }

    /// Ensures at least `n` bytes are buffered, pulling more as needed.
    /// Returns `false` if end-of-stream arrives first.
    pub(crate) fn ensure(&mut self, n: usize) -> Result<bool, FramingError> {
        while self.buf.len() < n {
            if !self.pull()? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    pub(crate) fn peek(&self, i: usize) -> Option<u8> {
        self.buf.get(i).copied()
    }

    pub(crate) fn take(&mut self, n: usize) -> Vec<u8> {
        self.buf.drain(..n.min(self.buf.len())).collect()
    }

    pub(crate) fn drop_front(&mut self, n: usize) {
        self.buf.drain(..n.min(self.buf.len()));
    }
}

pub(crate) fn check_max(len: usize, config: &CodecConfig) -> Result<(), FramingError> {
    if let Some(max) = config.max_frame {
        if len > max {
            return Err(FramingError::FrameTooLarge { size: len, max });
        }
    }
    Ok(())
}
