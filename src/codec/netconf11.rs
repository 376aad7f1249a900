// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 chanrs contributors
//
// NETCONF/1.1 chunked framing (§4.7): each chunk is `\n#<n>\n` followed by
// `n` bytes of payload; the message ends with `\n##\n`. A multi-chunk
// message is concatenated into a single blob before being handed to the
// channel.

use super::{check_max, next_blob, put_blob, ByteSource, Codec};
use crate::blob::Blob;
use crate::channel::Channel;
use crate::config::CodecConfig;
use crate::error::FramingError;
use crate::transport::Transport;

const MAX_CHUNKS_PER_MESSAGE: usize = 1 << 20;

pub struct Netconf11 {
    config: CodecConfig,
}

impl Netconf11 {
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }
}

impl Default for Netconf11 {
    fn default() -> Self {
        Self::new(CodecConfig::default())
    }
}

impl Codec for Netconf11 {
    fn egress(&self, chan: &Channel<Blob>, transport: &mut dyn Transport) -> Result<(), FramingError> {
        while let Some(blob) = next_blob(chan)? {
            let bytes = blob.into_bytes();
            let mut framed = format!("\n#{}\n", bytes.len()).into_bytes();
            framed.extend_from_slice(&bytes);
            framed.extend_from_slice(b"\n##\n");
            let mut off = 0;
            while off < framed.len() {
                let n = transport.output(&framed[off..])?;
                if n == 0 {
                    return Err(FramingError::Eof);
                }
                off += n;
            }
            transport.flush()?;
        }
        Ok(())
    }

    fn ingress(&self, chan: &Channel<Blob>, transport: &mut dyn Transport) -> Result<(), FramingError> {
        let mut src = ByteSource::new(transport, self.config.raw_read_size.min(4096));
        loop {
            let mut message = Vec::new();
            let mut chunks = 0usize;
            let done = loop {
                if !src.ensure(2)? {
                    if message.is_empty() && chunks == 0 {
                        return Ok(());
                    }
                    return Err(FramingError::Eof);
                }
                if src.peek(0) != Some(b'\n') || src.peek(1) != Some(b'#') {
                    return Err(FramingError::Malformed("netconf/1.1 chunk header must start with \\n#".into()));
                }
                // Terminator: "\n##\n".
                if src.peek(2) == Some(b'#') {
                    if !src.ensure(4)? || src.peek(3) != Some(b'\n') {
                        return Err(FramingError::Malformed("malformed netconf/1.1 terminator".into()));
                    }
                    src.drop_front(4);
                    break true;
                }
                // Chunk header: "\n#<digits>\n".
                let mut i = 2;
                loop {
                    if !src.ensure(i + 1)? {
                        return Err(FramingError::Eof);
                    }
                    match src.peek(i) {
                        Some(b) if b.is_ascii_digit() => i += 1,
                        Some(b'\n') => break,
                        _ => return Err(FramingError::Malformed("malformed netconf/1.1 chunk size".into())),
                    }
                }
                if i == 2 {
                    return Err(FramingError::Malformed("netconf/1.1 chunk with no size".into()));
                }
                let digits = {
                    let header: Vec<u8> = (2..i).map(|j| src.peek(j).unwrap()).collect();
                    header
                };
                let size: usize = std::str::from_utf8(&digits)
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .ok_or_else(|| FramingError::Malformed("netconf/1.1 chunk size not decimal".into()))?;
                src.drop_front(i + 1); // consume "\n#<digits>\n"
                check_max(message.len() + size, &self.config)?;
                if !src.ensure(size)? {
                    return Err(FramingError::Eof);
                }
                message.extend(src.take(size));
                chunks += 1;
                if chunks > MAX_CHUNKS_PER_MESSAGE {
                    return Err(FramingError::Malformed("too many netconf/1.1 chunks in one message".into()));
                }
                continue;
            };
            if done && !put_blob(chan, Blob::new(message))? {
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::op::op;
    use crate::select::{OpKind, Timeout};
    use crate::transport::StreamTransport;
    use std::io::Cursor;

    #[test]
    fn decodes_a_single_chunk_message() {
        let codec = Netconf11::default();
        let chan: Channel<Blob> = Channel::with_store(Box::new(crate::store::fifo::Fifo::new(2).unwrap()), None);
        let mut t = StreamTransport::new(Cursor::new(b"\n#5\nhello\n##\n".to_vec()));
        codec.ingress(&chan, &mut t).unwrap();
        let (_, v) = op(&chan, OpKind::Get, None, false, Timeout::NonBlocking).unwrap();
        assert_eq!(v.unwrap().into_bytes(), b"hello");
    }

    #[test]
    fn concatenates_multiple_chunks_into_one_blob() {
        let codec = Netconf11::default();
        let chan: Channel<Blob> = Channel::with_store(Box::new(crate::store::fifo::Fifo::new(2).unwrap()), None);
        let mut t = StreamTransport::new(Cursor::new(b"\n#3\nfoo\n#3\nbar\n##\n".to_vec()));
        codec.ingress(&chan, &mut t).unwrap();
        let (_, v) = op(&chan, OpKind::Get, None, false, Timeout::NonBlocking).unwrap();
        assert_eq!(v.unwrap().into_bytes(), b"foobar");
    }

    #[test]
    fn round_trips_through_egress() {
        let chan: Channel<Blob> = Channel::unbuffered();
        let putter = chan.clone();
        let t = std::thread::spawn(move || {
            put_blob(&putter, Blob::from(b"hi".to_vec())).unwrap();
            putter.shut();
        });
        let mut sink = StreamTransport::new(Vec::new());
        Netconf11::default().egress(&chan, &mut sink).unwrap();
        t.join().unwrap();
        assert_eq!(sink.into_inner(), b"\n#2\nhi\n##\n");
    }
}
