// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 chanrs contributors
//
// TCP stream proxy (based on examples/sockproxy.c): for each accepted
// client connection, open a matching connection to the target and bridge
// the two in both directions through the Raw codec, each direction its own
// channel shared between an ingress framer (reading one side) and an
// egress framer (writing the other).
//
// Usage: demo_proxy -l <listen-port> -H <target-host> -P <target-port>

use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;

use chanrs::blob::Blob;
use chanrs::codec::raw::Raw;
use chanrs::config::SupervisorConfig;
use chanrs::supervisor::{self, Direction};
use chanrs::transport::StreamTransport;
use chanrs::Channel;

fn relay(from: TcpStream, to: TcpStream) -> supervisor::SupervisorHandle {
    let chan: Channel<Blob> = Channel::unbuffered();
    let ingress = Direction {
        channel: chan.clone(),
        transport: Box::new(StreamTransport::new(from)),
        codec: Arc::new(Raw::default()),
        cancel: None,
    };
    let egress = Direction {
        channel: chan,
        transport: Box::new(StreamTransport::new(to)),
        codec: Arc::new(Raw::default()),
        cancel: None,
    };
    supervisor::spawn(Some(egress), Some(ingress), SupervisorConfig::default(), || {})
}

fn serve(client: TcpStream, target_host: String, target_port: u16) {
    let server = match TcpStream::connect((target_host.as_str(), target_port)) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("connect to {target_host}:{target_port} failed: {e}");
            return;
        }
    };
    let client_read = client.try_clone().expect("clone client");
    let server_write = server.try_clone().expect("clone server");

    let forward = relay(client_read, server_write);
    let backward = relay(server, client);
    forward.join();
    backward.join();
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let listen_port: u16 = args
        .iter()
        .position(|a| a == "-l")
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            eprintln!("usage: demo_proxy -l <listen-port> -H <target-host> -P <target-port>");
            std::process::exit(1);
        });
    let target_host = args
        .iter()
        .position(|a| a == "-H")
        .and_then(|i| args.get(i + 1))
        .cloned()
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let target_port: u16 = args
        .iter()
        .position(|a| a == "-P")
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
        .expect("usage: demo_proxy -l <listen-port> -H <target-host> -P <target-port>");

    let listener = TcpListener::bind(("0.0.0.0", listen_port)).expect("bind");
    println!("proxying {} -> {target_host}:{target_port}", listener.local_addr().unwrap());
    for conn in listener.incoming() {
        let Ok(client) = conn else { continue };
        let host = target_host.clone();
        thread::spawn(move || serve(client, host, target_port));
    }
}
