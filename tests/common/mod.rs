//! In-process stub backend for HTTP-level tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;

#[derive(Clone)]
pub struct Route {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl Route {
    pub fn json(body: &str) -> Self {
        Self {
            status: 200,
            content_type: "application/json",
            body: body.to_string(),
        }
    }

    pub fn status(status: u16, body: &str) -> Self {
        Self {
            status,
            content_type: "text/html",
            body: body.to_string(),
        }
    }
}

/// Serves fixed routes on 127.0.0.1 and records every requested path.
pub struct StubServer {
    pub base_url: String,
    pub hits: Arc<Mutex<Vec<String>>>,
}

impl StubServer {
    pub fn start(routes: Vec<(&str, Route)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub server");
        let addr = listener.local_addr().expect("local addr");
        let routes: HashMap<String, Route> =
            routes.into_iter().map(|(p, r)| (p.to_string(), r)).collect();
        let hits = Arc::new(Mutex::new(Vec::new()));
        let seen = hits.clone();

        thread::spawn(move || {
            for stream in listener.incoming() {
                let mut stream = match stream {
                    Ok(s) => s,
                    Err(_) => continue,
                };
                let mut reader = BufReader::new(&stream);
                let mut request_line = String::new();
                if reader.read_line(&mut request_line).is_err() {
                    continue;
                }
                // Drain headers.
                let mut header = String::new();
                while reader.read_line(&mut header).map(|n| n > 2).unwrap_or(false) {
                    header.clear();
                }
                let path = request_line
                    .split_whitespace()
                    .nth(1)
                    .unwrap_or("/")
                    .to_string();
                seen.lock().unwrap().push(path.clone());

                let route = routes
                    .get(&path)
                    .cloned()
                    .unwrap_or_else(|| Route::status(404, "Not Found"));
                let response = format!(
                    "HTTP/1.1 {} STUB\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    route.status,
                    route.content_type,
                    route.body.len(),
                    route.body
                );
                let _ = stream.write_all(response.as_bytes());
            }
        });

        Self {
            base_url: format!("http://{}", addr),
            hits,
        }
    }

    pub fn hits(&self) -> Vec<String> {
        self.hits.lock().unwrap().clone()
    }

    pub fn count(&self, path: &str) -> usize {
        self.hits().iter().filter(|p| *p == path).count()
    }
}

/// A base URL nothing listens on.
pub fn dead_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    format!("http://{}", addr)
}
