// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 chanrs contributors
//
// NetString codec (§4.7 `<len>:<data>,`): decimal length, colon, payload,
// comma. Ingress validates the trailing comma and optionally enforces a
// maximum frame size.

use super::{check_max, next_blob, put_blob, ByteSource, Codec};
use crate::blob::Blob;
use crate::channel::Channel;
use crate::config::CodecConfig;
use crate::error::FramingError;
use crate::transport::Transport;

pub struct NetString {
    config: CodecConfig,
}

impl NetString {
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }
}

impl Default for NetString {
    fn default() -> Self {
        Self::new(CodecConfig::default())
    }
}

impl Codec for NetString {
    fn egress(&self, chan: &Channel<Blob>, transport: &mut dyn Transport) -> Result<(), FramingError> {
        while let Some(blob) = next_blob(chan)? {
            let bytes = blob.into_bytes();
            let mut framed = format!("{}:", bytes.len()).into_bytes();
            framed.extend_from_slice(&bytes);
            framed.push(b',');
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
            // Read decimal digits up to the colon.
            let mut i = 0;
            loop {
                match src.peek(i) {
                    Some(b) if b.is_ascii_digit() => i += 1,
                    Some(_) => break,
                    None => {
                        if !src.ensure(i + 1)? {
                            if i == 0 {
                                return Ok(());
                            }
                            return Err(FramingError::Eof);
                        }
                    }
                }
            }
            if i == 0 {
                return Err(FramingError::Malformed("netstring missing length".into()));
            }
            if src.peek(i) != Some(b':') {
                if !src.ensure(i + 1)? {
                    return Err(FramingError::Eof);
                }
                if src.peek(i) != Some(b':') {
                    return Err(FramingError::Malformed("netstring missing ':'".into()));
                }
            }
            let digits = src.take(i);
            src.drop_front(1); // ':'
            let len: usize = std::str::from_utf8(&digits)
                .ok()
                .and_then(|s| s.parse().ok())
                .ok_or_else(|| FramingError::Malformed("netstring length not decimal".into()))?;
            check_max(len, &self.config)?;
            if !src.ensure(len + 1)? {
                return Err(FramingError::Eof);
            }
            let payload = src.take(len);
            if src.peek(0) != Some(b',') {
                return Err(FramingError::Malformed("netstring missing trailing ','".into()));
            }
            src.drop_front(1);
            if !put_blob(chan, Blob::new(payload))? {
                return Ok(());
            }
        }
    }
}
