// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 chanrs contributors
//
// Two-party NetString-framed chat over TCP (§6.3 "Example CLIs": server and
// client address families), exercising the codec + transport + supervisor
// stack end to end. One side listens, the other connects; once linked both
// sides read stdin lines and print whatever arrives from the peer.
//
// Usage:
//   demo_chat -l <port>             listen and wait for one peer
//   demo_chat -H <host> -P <port>   connect to a listening peer
//
// Type a line and press Enter to send it; type "q" to quit.

use std::io::{self, BufRead, Write};
use std::net::{Shutdown, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;

use chanrs::blob::Blob;
use chanrs::codec::netstring::NetString;
use chanrs::config::SupervisorConfig;
use chanrs::supervisor::{self, Direction};
use chanrs::transport::StreamTransport;
use chanrs::{op, Channel, OpKind, OpStatus, Timeout};

const QUIT: &str = "q";

fn connect_as_listener(port: &str) -> TcpStream {
    let listener = TcpListener::bind(("0.0.0.0", port.parse::<u16>().expect("invalid port"))).expect("bind");
    println!("listening on {}", listener.local_addr().unwrap());
    let (stream, peer) = listener.accept().expect("accept");
    println!("connected to {peer}");
    stream
}

fn connect_as_client(host: &str, port: &str) -> TcpStream {
    let stream = TcpStream::connect((host, port.parse::<u16>().expect("invalid port"))).expect("connect");
    println!("connected to {}", stream.peer_addr().unwrap());
    stream
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let stream = match args.get(1).map(String::as_str) {
        Some("-l") => connect_as_listener(args.get(2).expect("usage: demo_chat -l <port>")),
        Some("-H") => {
            let host = args.get(2).expect("usage: demo_chat -H <host> -P <port>");
            let port = args.get(4).expect("usage: demo_chat -H <host> -P <port>");
            connect_as_client(host, port)
        }
        _ => {
            eprintln!("usage: demo_chat -l <port> | demo_chat -H <host> -P <port>");
            std::process::exit(1);
        }
    };

    let outgoing: Channel<Blob> = Channel::unbuffered();
    let incoming: Channel<Blob> = Channel::unbuffered();

    let write_stream = stream.try_clone().expect("clone for writer");
    let read_stream = stream.try_clone().expect("clone for reader");
    let egress_cancel = stream.try_clone().expect("clone for egress cancel");
    let ingress_cancel = stream.try_clone().expect("clone for ingress cancel");

    let egress = Direction {
        channel: outgoing.clone(),
        transport: Box::new(StreamTransport::new(write_stream)),
        codec: Arc::new(NetString::default()),
        cancel: Some(Box::new(move || {
            let _ = egress_cancel.shutdown(Shutdown::Both);
        })),
    };
    let ingress = Direction {
        channel: incoming.clone(),
        transport: Box::new(StreamTransport::new(read_stream)),
        codec: Arc::new(NetString::default()),
        cancel: Some(Box::new(move || {
            let _ = ingress_cancel.shutdown(Shutdown::Both);
        })),
    };
    let handle = supervisor::spawn(Some(egress), Some(ingress), SupervisorConfig::default(), || {
        println!("connection closed");
    });

    let printer_incoming = incoming.clone();
    let printer = thread::spawn(move || loop {
        match op(&printer_incoming, OpKind::Get, None, false, Timeout::Forever) {
            Ok((OpStatus::Get, Some(blob))) => {
                println!("peer> {}", String::from_utf8_lossy(blob.as_bytes()));
            }
            _ => break,
        }
    });

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush().ok();
        let mut line = String::new();
        if stdin.lock().read_line(&mut line).unwrap_or(0) == 0 {
            break;
        }
        let trimmed = line.trim();
        if trimmed == QUIT {
            break;
        }
        let (status, _) = op(&outgoing, OpKind::Put, Some(Blob::from(trimmed.as_bytes().to_vec())), false, Timeout::Forever).unwrap();
        if status != OpStatus::Put {
            break;
        }
    }

    outgoing.shut();
    incoming.shut();
    printer.join().ok();
    handle.join();
}
