//! Minimal HTTP/1.1 server that serves a bootstrap index and artifact files.
//!
//! `GET /batch/index` returns the index body; `GET /batch/file?name=X` returns
//! the bytes registered for `X` or 404. Every request target is recorded so
//! tests can assert exactly which requests were made.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;

#[derive(Debug, Clone, Default)]
pub struct ServerContent {
    /// `None` makes the index endpoint answer 500.
    pub index: Option<String>,
    /// Artifact bodies by filename.
    pub files: HashMap<String, Vec<u8>>,
}

pub struct BootstrapServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl BootstrapServer {
    /// Request targets seen so far, in arrival order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

/// Starts a server in a background thread. Runs until the process exits.
pub fn start(content: ServerContent) -> BootstrapServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let content = Arc::new(content);
    let requests = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&requests);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let content = Arc::clone(&content);
            let seen = Arc::clone(&seen);
            thread::spawn(move || handle(stream, &content, &seen));
        }
    });
    BootstrapServer {
        base_url: format!("http://127.0.0.1:{}", port),
        requests,
    }
}

fn handle(mut stream: std::net::TcpStream, content: &ServerContent, seen: &Mutex<Vec<String>>) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(n) => n,
    };
    let request = match std::str::from_utf8(&buf[..n]) {
        Ok(s) => s,
        Err(_) => return,
    };
    let mut parts = request.lines().next().unwrap_or("").split_whitespace();
    let method = parts.next().unwrap_or("");
    let target = parts.next().unwrap_or("").to_string();
    seen.lock().unwrap().push(target.clone());

    if !method.eq_ignore_ascii_case("GET") {
        let _ = stream.write_all(b"HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 0\r\n\r\n");
        return;
    }

    let (status, body): (&str, Vec<u8>) = match target.split_once('?') {
        None if target == "/batch/index" => match &content.index {
            Some(index) => ("200 OK", index.clone().into_bytes()),
            None => ("500 Internal Server Error", Vec::new()),
        },
        Some(("/batch/file", query)) => {
            let name = query.strip_prefix("name=").unwrap_or("");
            match content.files.get(name) {
                Some(bytes) => ("200 OK", bytes.clone()),
                None => ("404 Not Found", Vec::new()),
            }
        }
        _ => ("404 Not Found", Vec::new()),
    };

    let head = format!(
        "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        body.len()
    );
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(&body);
}
