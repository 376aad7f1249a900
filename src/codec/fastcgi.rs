// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 chanrs contributors
//
// FastCGI record codec (§4.7, §6.2): fixed 8-byte header (version=1,
// type, request id, content length, padding length, reserved byte),
// followed by up to 65535 bytes of content and `padding_len` bytes of
// padding. The blob carries the content only — header framing fields are
// not part of the item the rest of the system sees; this is a deliberate
// simplification since the spec's `Blob` model has no header side-channel
// and FastCGI's type/request-id fields have no counterpart in the rest of
// the crate's item model.

use super::{check_max, next_blob, put_blob, ByteSource, Codec};
use crate::blob::Blob;
use crate::channel::Channel;
use crate::config::CodecConfig;
use crate::error::FramingError;
use crate::transport::Transport;

const VERSION: u8 = 1;
const TYPE_STDIN: u8 = 5;
const MAX_CONTENT: usize = 0xffff;
const HEADER_LEN: usize = 8;

pub struct FastCgi {
    config: CodecConfig,
}

impl FastCgi {
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }
}

impl Default for FastCgi {
    fn default() -> Self {
        Self::new(CodecConfig::default())
    }
}

fn header(request_id: u16, content_len: u16, padding_len: u8) -> [u8; HEADER_LEN] {
    let id = request_id.to_be_bytes();
    let len = content_len.to_be_bytes();
    [VERSION, TYPE_STDIN, id[0], id[1], len[0], len[1], padding_len, 0]
}

impl Codec for FastCgi {
    fn egress(&self, chan: &Channel<Blob>, transport: &mut dyn Transport) -> Result<(), FramingError> {
        while let Some(blob) = next_blob(chan)? {
            let bytes = blob.into_bytes();
            // A zero-length blob still emits one empty record, matching
            // stdin's empty-record end-of-stream convention.
            let chunks: Vec<&[u8]> =
                if bytes.is_empty() { vec![&[][..]] } else { bytes.chunks(MAX_CONTENT).collect() };
            for chunk in chunks {
                let padding_len = (4 - (chunk.len() % 4)) % 4;
                let mut framed = header(1, chunk.len() as u16, padding_len as u8).to_vec();
                framed.extend_from_slice(chunk);
                framed.extend(std::iter::repeat(0u8).take(padding_len));
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
        }
        Ok(())
    }

    fn ingress(&self, chan: &Channel<Blob>, transport: &mut dyn Transport) -> Result<(), FramingError> {
        let mut src = ByteSource::new(transport, self.config.raw_read_size.min(4096));
        loop {
            if !src.ensure(HEADER_LEN)? {
                return Ok(());
            }
            let raw: Vec<u8> = (0..HEADER_LEN).map(|i| src.peek(i).unwrap()).collect();
            if raw[0] != VERSION {
                return Err(FramingError::Malformed(format!("unsupported fastcgi version {}", raw[0])));
            }
            let content_len = u16::from_be_bytes([raw[4], raw[5]]) as usize;
            let padding_len = raw[6] as usize;
            check_max(content_len, &self.config)?;
            src.drop_front(HEADER_LEN);
            if !src.ensure(content_len + padding_len)? {
                return Err(FramingError::Eof);
            }
            let content = src.take(content_len);
            src.drop_front(padding_len);
            if content.is_empty() {
                // Empty stdin record: end of this request's input stream.
                continue;
            }
            if !put_blob(chan, Blob::new(content))? {
                return Ok(());
            }
        }
    }
}
