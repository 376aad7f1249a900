// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 chanrs contributors
//
// Stream transport (§4.8 "file-descriptor stream"): any ordered byte
// stream, generalized from a raw fd to `Read + Write` so the same adapter
// covers a `TcpStream`, a `UnixStream`, or a plain `File` without
// unsafe fd plumbing (§9 design note: adapt the original's OS-specific
// surface to the idiom the target language actually provides for it).

use std::io::{self, Read, Write};

use super::Transport;

/// Wraps any `Read + Write` endpoint as a frame-codec transport.
pub struct StreamTransport<S> {
    inner: S,
}

impl<S> StreamTransport<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: Read + Write + Send> Transport for StreamTransport<S> {
    fn input(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.inner.read(buf) {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => Ok(0),
            Err(e) => Err(e),
        }
    }

    fn output(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.inner.write(buf) {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => Ok(0),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn reads_and_writes_through_the_wrapped_stream() {
        let mut t = StreamTransport::new(Cursor::new(b"abcdef".to_vec()));
        let mut buf = [0u8; 3];
        assert_eq!(t.input(&mut buf).unwrap(), 3);
        assert_eq!(&buf, b"abc");

        let mut sink = StreamTransport::new(Vec::new());
        assert_eq!(sink.output(b"xyz").unwrap(), 3);
        assert_eq!(sink.into_inner(), b"xyz");
    }

    #[test]
    fn read_at_eof_returns_zero() {
        let mut t = StreamTransport::new(Cursor::new(Vec::<u8>::new()));
        let mut buf = [0u8; 4];
        assert_eq!(t.input(&mut buf).unwrap(), 0);
    }
}
