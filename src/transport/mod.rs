// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 chanrs contributors
//
// Transport adapter contract (§4.8): three calls wrapping a file
// descriptor or equivalent I/O endpoint. Zero bytes from `input`/`output`
// means failure; codecs treat it as end-of-stream and exit their loop.
//
// The reliable-UDP (KCP) adapter is named in §1/§4.8 as a pluggable,
// out-of-scope collaborator ("process-level allocation plumbing and the
// reliable-UDP algorithm (KCP) are pluggable transports and are
// replaceable"). We expose the trait it would implement but do not ship a
// KCP adapter — same non-goal boundary as the SQL-backed store example.

pub mod datagram;
pub mod stream;

pub use datagram::DatagramTransport;
pub use stream::StreamTransport;

/// A byte-level I/O endpoint a frame codec reads from or writes to (§4.8).
///
/// `input`/`output` return the number of bytes actually moved; `0` is
/// end-of-stream or failure, matching the C original's `int(*)(ctx,buf,len)`
/// convention (§4.8: "Zero means failure; codecs treat it as end-of-stream").
pub trait Transport: Send {
    fn input(&mut self, buf: &mut [u8]) -> std::io::Result<usize>;
    fn output(&mut self, buf: &[u8]) -> std::io::Result<usize>;

    /// Called by a codec's egress loop once it has written a complete,
    /// self-delimited frame. Stream transports have already delivered
    /// every byte by the time `output` returns, so this is a no-op for
    /// them; `DatagramTransport` overrides it to flush the accumulated
    /// frame as a single packet, since UDP only preserves message
    /// boundaries that align with one `sendto`.
    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }

    fn close(&mut self) {}
}
