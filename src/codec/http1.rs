// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 chanrs contributors
//
// HTTP/1.1 ingress codec (§4.7): parses a request line and headers looking
// for `Content-Length` and `Transfer-Encoding: chunked` (case-insensitive),
// then consumes the body either by length or by chunked transfer coding
// (hex size, optional trailers, final `\r\n\r\n`). Each complete request
// becomes one blob containing the header block plus body bytes. There is
// no egress side in the original (§4.7 lists "HTTP/1.1 ingress" only) —
// this codec is ingress-only; calling `egress` is a programming error.

use super::{check_max, put_blob, ByteSource, Codec};
use crate::blob::Blob;
use crate::channel::Channel;
use crate::config::CodecConfig;
use crate::error::FramingError;
use crate::transport::Transport;

pub struct Http1 {
    config: CodecConfig,
}

impl Http1 {
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }
}

impl Default for Http1 {
    fn default() -> Self {
        Self::new(CodecConfig::default())
    }
}

/// Bytes that abort parsing outright if seen outside an allowed context
/// (control characters other than `\r`/`\n`/`\t`, plus DEL).
fn is_forbidden_control(b: u8) -> bool {
    (b < 0x20 && b != b'\r' && b != b'\n' && b != b'\t') || b == 0x7f
}

fn find_header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n").map(|p| p + 4)
}

fn header_value<'a>(headers: &'a str, name: &str) -> Option<&'a str> {
    for line in headers.split("\r\n") {
        if let Some((key, value)) = line.split_once(':') {
            if key.trim().eq_ignore_ascii_case(name) {
                return Some(value.trim());
            }
        }
    }
    None
}

impl Codec for Http1 {
    fn egress(&self, _chan: &Channel<Blob>, _transport: &mut dyn Transport) -> Result<(), FramingError> {
        Err(FramingError::Malformed("HTTP/1.1 codec is ingress-only".into()))
    }

    fn ingress(&self, chan: &Channel<Blob>, transport: &mut dyn Transport) -> Result<(), FramingError> {
        let mut src = ByteSource::new(transport, self.config.raw_read_size.min(4096));
        loop {
            let header_end = loop {
                let snapshot: Vec<u8> = (0..src.len()).map(|i| src.peek(i).unwrap()).collect();
                if let Some(e) = find_header_end(&snapshot) {
                    break e;
                }
                if snapshot.iter().any(|&b| is_forbidden_control(b)) {
                    return Err(FramingError::Malformed("control character in HTTP header block".into()));
                }
                if !src.pull()? {
                    if snapshot.is_empty() {
                        return Ok(());
                    }
                    return Err(FramingError::Eof);
                }
            };
            check_max(header_end, &self.config)?;
            let header_bytes = src.take(header_end);
            let headers = String::from_utf8_lossy(&header_bytes).into_owned();
            let request_line = headers.split("\r\n").next().unwrap_or_default();
            let mut parts = request_line.split(' ');
            let (Some(_method), Some(_target), Some(version)) = (parts.next(), parts.next(), parts.next()) else {
                return Err(FramingError::Malformed("malformed HTTP request line".into()));
            };
            if !version.starts_with("HTTP/") {
                return Err(FramingError::Malformed("malformed HTTP version token".into()));
            }

            let chunked = header_value(&headers, "Transfer-Encoding")
                .map(|v| v.eq_ignore_ascii_case("chunked"))
                .unwrap_or(false);
            let content_length: usize = header_value(&headers, "Content-Length")
                .map(|v| v.parse().map_err(|_| FramingError::Malformed("non-numeric Content-Length".into())))
                .transpose()?
                .unwrap_or(0);

            let mut body = header_bytes;
            if chunked {
                loop {
                    let mut i = 0;
                    loop {
                        if !src.ensure(i + 1)? {
                            return Err(FramingError::Eof);
                        }
                        match src.peek(i) {
                            Some(b';') | Some(b'\r') => break,
                            Some(b) if b.is_ascii_hexdigit() => i += 1,
                            _ => return Err(FramingError::Malformed("malformed chunk size".into())),
                        }
                    }
                    let size_digits: Vec<u8> = (0..i).map(|j| src.peek(j).unwrap()).collect();
                    let size = usize::from_str_radix(std::str::from_utf8(&size_digits).unwrap(), 16)
                        .map_err(|_| FramingError::Malformed("malformed chunk size".into()))?;
                    // Skip to end of the chunk-size line (past any extensions).
                    loop {
                        if !src.ensure(2)? {
                            return Err(FramingError::Eof);
                        }
                        if src.peek(0) == Some(b'\r') && src.peek(1) == Some(b'\n') {
                            src.drop_front(2);
                            break;
                        }
                        src.drop_front(1);
                    }
                    check_max(body.len() + size, &self.config)?;
                    if size == 0 {
                        // Trailers, terminated by a blank line.
                        loop {
                            if !src.ensure(2)? {
                                return Err(FramingError::Eof);
                            }
                            if src.peek(0) == Some(b'\r') && src.peek(1) == Some(b'\n') {
                                src.drop_front(2);
                                break;
                            }
                            let line_end = loop {
                                let buf: Vec<u8> = (0..src.len()).map(|k| src.peek(k).unwrap()).collect();
                                if let Some(p) = buf.windows(2).position(|w| w == b"\r\n") {
                                    break p + 2;
                                }
                                if !src.pull()? {
                                    return Err(FramingError::Eof);
                                }
                            };
                            src.drop_front(line_end);
                        }
                        break;
                    }
                    if !src.ensure(size + 2)? {
                        return Err(FramingError::Eof);
                    }
                    body.extend(src.take(size));
                    if src.peek(0) != Some(b'\r') || src.peek(1) != Some(b'\n') {
                        return Err(FramingError::Malformed("chunk data missing trailing CRLF".into()));
                    }
                    src.drop_front(2);
                }
            } else if content_length > 0 {
                check_max(body.len() + content_length, &self.config)?;
                if !src.ensure(content_length)? {
                    return Err(FramingError::Eof);
                }
                body.extend(src.take(content_length));
            }

            if !put_blob(chan, Blob::new(body))? {
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
    fn decodes_a_chunked_post_body() {
        let codec = Http1::default();
        let chan: Channel<Blob> = Channel::with_store(Box::new(crate::store::fifo::Fifo::new(2).unwrap()), None);
        let request = b"POST /x HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n5\r\nhello\r\n0\r\n\r\n";
        let mut t = StreamTransport::new(Cursor::new(request.to_vec()));
        codec.ingress(&chan, &mut t).unwrap();
        let (_, v) = op(&chan, OpKind::Get, None, false, Timeout::NonBlocking).unwrap();
        let blob = v.unwrap().into_bytes();
        assert!(blob.ends_with(b"hello"));
    }

    #[test]
    fn decodes_a_content_length_body() {
        let codec = Http1::default();
        let chan: Channel<Blob> = Channel::with_store(Box::new(crate::store::fifo::Fifo::new(2).unwrap()), None);
        let request = b"POST /y HTTP/1.1\r\nContent-Length: 3\r\n\r\nabc";
        let mut t = StreamTransport::new(Cursor::new(request.to_vec()));
        codec.ingress(&chan, &mut t).unwrap();
        let (_, v) = op(&chan, OpKind::Get, None, false, Timeout::NonBlocking).unwrap();
        assert!(v.unwrap().into_bytes().ends_with(b"abc"));
    }

    #[test]
    fn rejects_control_characters_in_headers() {
        let codec = Http1::default();
        let chan: Channel<Blob> = Channel::with_store(Box::new(crate::store::fifo::Fifo::new(2).unwrap()), None);
        let mut bad = b"GET / HTTP/1.1\r\nX-Bad:".to_vec();
        bad.push(0x01);
        bad.extend_from_slice(b"\r\n\r\n");
        let mut t = StreamTransport::new(Cursor::new(bad));
        assert!(codec.ingress(&chan, &mut t).is_err());
    }

    #[test]
    fn egress_is_unsupported() {
        let codec = Http1::default();
        let chan: Channel<Blob> = Channel::unbuffered();
        chan.shut();
        let mut sink = StreamTransport::new(Vec::new());
        assert!(codec.egress(&chan, &mut sink).is_err());
    }
}
