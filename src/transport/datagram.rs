// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 chanrs contributors
//
// Datagram transport (§4.8): a UDP socket where the peer address is
// prepended on ingress and consumed on egress "as an extra byte-length-
// prefixed sockaddr block", so the frame codec above stays transport-
// agnostic — it just sees address bytes as the start of the byte stream,
// the same way it would see any other header.
//
// UDP only preserves message boundaries that line up with a single
// `sendto`/`recvfrom`, so unlike `StreamTransport` this adapter buffers
// `output` calls and only actually sends on `flush` (called by a codec's
// egress loop once a full frame has been written), and buffers one
// `recvfrom`'s worth of bytes per fill on the input side.

use std::collections::VecDeque;
use std::io;
use std::net::{SocketAddr, UdpSocket};

use super::Transport;

const MAX_DATAGRAM: usize = 65507;

/// Encodes `addr` as `{len: u8}{addr as UTF-8 text}`.
fn encode_addr(addr: SocketAddr) -> Vec<u8> {
    let text = addr.to_string();
    let mut out = Vec::with_capacity(1 + text.len());
    out.push(text.len() as u8);
    out.extend_from_slice(text.as_bytes());
    out
}

/// Parses the `{len}{addr}` prefix written by `encode_addr`. Returns the
/// address and the offset where the payload begins.
fn decode_addr(buf: &[u8]) -> Option<(SocketAddr, usize)> {
    let len = *buf.first()? as usize;
    let text = buf.get(1..1 + len)?;
    let addr: SocketAddr = std::str::from_utf8(text).ok()?.parse().ok()?;
    Some((addr, 1 + len))
}

pub struct DatagramTransport {
    socket: UdpSocket,
    /// Destination for the datagram currently being assembled by `output`.
    /// Consumed from the leading address block the first time it appears
    /// in a write.
    default_dest: Option<SocketAddr>,
    read_buf: VecDeque<u8>,
    write_buf: Vec<u8>,
}

impl DatagramTransport {
    pub fn new(socket: UdpSocket) -> Self {
        Self { socket, default_dest: None, read_buf: VecDeque::new(), write_buf: Vec::new() }
    }

    /// Bind a fresh UDP socket and wrap it.
    pub fn bind(addr: impl std::net::ToSocketAddrs) -> io::Result<Self> {
        Ok(Self::new(UdpSocket::bind(addr)?))
    }

    /// Pre-seat the destination address so egress frames don't need to
    /// carry the address block themselves (point-to-point usage).
    pub fn connect_default(&mut self, addr: SocketAddr) {
        self.default_dest = Some(addr);
    }
}

impl Transport for DatagramTransport {
    fn input(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.read_buf.is_empty() {
            let mut packet = vec![0u8; MAX_DATAGRAM];
            let (n, peer) = self.socket.recv_from(&mut packet)?;
            self.read_buf.extend(encode_addr(peer));
            self.read_buf.extend(&packet[..n]);
        }
        let n = buf.len().min(self.read_buf.len());
        for slot in buf.iter_mut().take(n) {
            *slot = self.read_buf.pop_front().unwrap();
        }
        Ok(n)
    }

    fn output(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.write_buf.is_empty() {
            return Ok(());
        }
        let payload_at = match decode_addr(&self.write_buf) {
            Some((addr, offset)) => {
                self.default_dest = Some(addr);
                offset
            }
            None => 0,
        };
        let dest = self.default_dest.ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotConnected, "datagram transport has no destination")
        })?;
        self.socket.send_to(&self.write_buf[payload_at..], dest)?;
        self.write_buf.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_packet_with_address_framing() {
        let mut a = DatagramTransport::bind("127.0.0.1:0").unwrap();
        let mut b = DatagramTransport::bind("127.0.0.1:0").unwrap();
        let b_addr = b.socket.local_addr().unwrap();
        a.connect_default(b_addr);

        a.output(b"hello").unwrap();
        a.flush().unwrap();

        let mut buf = [0u8; 64];
        let n = b.input(&mut buf).unwrap();
        let (peer, offset) = decode_addr(&buf[..n]).unwrap();
        assert_eq!(peer, a.socket.local_addr().unwrap());
        assert_eq!(&buf[offset..n], b"hello");
    }
}
