// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 chanrs contributors
//
// NETCONF/1.0 codec (§4.7): frames are terminated by the literal
// `]]>]]>`; there is no length prefix, so ingress has to scan the
// lookahead window for the six-byte terminator as bytes arrive.

use super::{check_max, next_blob, put_blob, ByteSource, Codec};
use crate::blob::Blob;
use crate::channel::Channel;
use crate::config::CodecConfig;
use crate::error::FramingError;
use crate::transport::Transport;

const TERMINATOR: &[u8] = b"]]>]]>";

pub struct Netconf10 {
    config: CodecConfig,
}

impl Netconf10 {
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }
}

impl Default for Netconf10 {
    fn default() -> Self {
        Self::new(CodecConfig::default())
    }
}

impl Codec for Netconf10 {
    fn egress(&self, chan: &Channel<Blob>, transport: &mut dyn Transport) -> Result<(), FramingError> {
        while let Some(blob) = next_blob(chan)? {
            let mut framed = blob.into_bytes();
            framed.extend_from_slice(TERMINATOR);
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
            let mut scan_from = 0;
            let frame_len = loop {
                let mut found = None;
                let mut i = scan_from;
                while src.peek(i + TERMINATOR.len() - 1).is_some() {
                    if (0..TERMINATOR.len()).all(|j| src.peek(i + j) == Some(TERMINATOR[j])) {
                        found = Some(i);
                        break;
                    }
                    i += 1;
                }
                if let Some(at) = found {
                    break at;
                }
                scan_from = src.len().saturating_sub(TERMINATOR.len() - 1);
                if !src.pull()? {
                    if src.len() == 0 {
                        return Ok(());
                    }
                    return Err(FramingError::Eof);
                }
            };
            check_max(frame_len, &self.config)?;
            let payload = src.take(frame_len);
            src.drop_front(TERMINATOR.len());
            if !put_blob(chan, Blob::new(payload))? {
                return Ok(());
            }
        }
    }
}
