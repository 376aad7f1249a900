// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 chanrs contributors
//
// Raw codec (§4.7 "Raw (default)"): egress writes `blob.bytes` directly;
// ingress reads up to N bytes per chunk (N = `CodecConfig::raw_read_size`,
// default 65536) and publishes each chunk as its own blob. No framing at
// all — the simplest codec, and the default when none is requested.

use super::{next_blob, put_blob, Codec};
use crate::blob::Blob;
use crate::channel::Channel;
use crate::config::CodecConfig;
use crate::error::FramingError;
use crate::transport::Transport;

pub struct Raw {
    config: CodecConfig,
}

impl Raw {
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }
}

impl Default for Raw {
    fn default() -> Self {
        Self::new(CodecConfig::default())
    }
}

impl Codec for Raw {
    fn egress(&self, chan: &Channel<Blob>, transport: &mut dyn Transport) -> Result<(), FramingError> {
        while let Some(blob) = next_blob(chan)? {
            let bytes = blob.into_bytes();
            let mut off = 0;
            while off < bytes.len() {
                let n = transport.output(&bytes[off..])?;
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
        let mut buf = vec![0u8; self.config.raw_read_size];
        loop {
            let n = transport.input(&mut buf)?;
            if n == 0 {
                return Ok(());
            }
            if !put_blob(chan, Blob::new(buf[..n].to_vec()))? {
                return Ok(());
            }
        }
    }
}
