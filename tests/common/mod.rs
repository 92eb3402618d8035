//! Minimal HTTP/1.1 stub server for exercising the HTTP backend over a
//! real socket.

#![allow(dead_code)]

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

/// One request as the stub saw it.
pub struct Received {
    pub method: String,
    pub path: String,
    pub body: Vec<u8>,
}

/// Serves scripted responses on a random local port, recording each
/// request. Every response carries `connection: close` so the client
/// reconnects per request and the script advances deterministically.
pub struct StubServer {
    pub port: u16,
    requests: Receiver<Received>,
}

impl StubServer {
    /// Serves the given status codes in order, then stops accepting.
    pub fn serve(responses: Vec<u16>) -> StubServer {
        Self::start(responses, false)
    }

    /// Serves the given status code to every connection for the rest of
    /// the test process.
    pub fn serve_forever(status: u16) -> StubServer {
        Self::start(vec![status], true)
    }

    fn start(responses: Vec<u16>, repeat: bool) -> StubServer {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            if repeat {
                let status = responses[0];
                loop {
                    match listener.accept() {
                        Ok((stream, _)) => handle(stream, status, &tx),
                        Err(_) => return,
                    }
                }
            } else {
                for status in responses {
                    match listener.accept() {
                        Ok((stream, _)) => handle(stream, status, &tx),
                        Err(_) => return,
                    }
                }
            }
        });

        StubServer { port, requests: rx }
    }

    /// Next recorded request; panics if none arrives within five seconds.
    pub fn recv(&self) -> Received {
        self.requests
            .recv_timeout(Duration::from_secs(5))
            .expect("no request arrived at the stub server")
    }
}

fn handle(stream: TcpStream, status: u16, tx: &Sender<Received>) {
    let mut reader = BufReader::new(stream);

    let mut request_line = String::new();
    if reader.read_line(&mut request_line).is_err() {
        return;
    }
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let path = parts.next().unwrap_or_default().to_string();

    let mut content_length = 0usize;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).is_err() {
            return;
        }
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some(value) = line.to_ascii_lowercase().strip_prefix("content-length:") {
            content_length = value.trim().parse().unwrap_or(0);
        }
    }

    let mut body = vec![0u8; content_length];
    if reader.read_exact(&mut body).is_err() {
        return;
    }

    let _ = tx.send(Received { method, path, body });

    let mut stream = reader.into_inner();
    let _ = write!(
        stream,
        "HTTP/1.1 {} Stub\r\ncontent-length: 2\r\nconnection: close\r\n\r\nok",
        status
    );
    let _ = stream.flush();
}
