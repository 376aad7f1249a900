// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 chanrs contributors
//
// VLQ codec (§4.7, §6.2): length-prefixed with a little-endian base-128
// varint — the standard LEB128 unsigned-integer encoding. Each byte
// contributes its low 7 bits, least-significant group first; the high bit
// marks "more bytes follow".

use super::{check_max, next_blob, put_blob, ByteSource, Codec};
use crate::blob::Blob;
use crate::channel::Channel;
use crate::config::CodecConfig;
use crate::error::FramingError;
use crate::transport::Transport;

fn encode_len(mut len: u64) -> Vec<u8> {
    let mut out = Vec::new();
    loop {
        let byte = (len & 0x7f) as u8;
        len >>= 7;
        if len == 0 {
            out.push(byte);
            break;
        }
        out.push(byte | 0x80);
    }
    out
}

pub struct Vlq {
    config: CodecConfig,
}

impl Vlq {
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }
}

impl Default for Vlq {
    fn default() -> Self {
        Self::new(CodecConfig::default())
    }
}

impl Codec for Vlq {
    fn egress(&self, chan: &Channel<Blob>, transport: &mut dyn Transport) -> Result<(), FramingError> {
        while let Some(blob) = next_blob(chan)? {
            let bytes = blob.into_bytes();
            let mut framed = encode_len(bytes.len() as u64);
            framed.extend_from_slice(&bytes);
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
            let mut len: u64 = 0;
            let mut shift = 0u32;
            let mut i = 0;
            let len = loop {
                if !src.ensure(i + 1)? {
                    if i == 0 {
                        return Ok(());
                    }
                    return Err(FramingError::Eof);
                }
                let byte = src.peek(i).unwrap();
                len |= ((byte & 0x7f) as u64) << shift;
                i += 1;
                if byte & 0x80 == 0 {
                    break len;
                }
                shift += 7;
                if shift >= 64 {
                    return Err(FramingError::Malformed("vlq varint too long".into()));
                }
            };
            src.drop_front(i);
            let len = len as usize;
            check_max(len, &self.config)?;
            if !src.ensure(len)? {
                return Err(FramingError::Eof);
            }
            let payload = src.take(len);
            if !put_blob(chan, Blob::new(payload))? {
                return Ok(());
            }
        }
    }
}
