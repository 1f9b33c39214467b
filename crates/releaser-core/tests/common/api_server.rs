//! Minimal HTTP/1.1 server standing in for GitHub and the release bot.
//!
//! Routes map (method, path-with-query) to a canned response. A route can
//! answer 404 for its first N hits to mimic assets that are still being
//! published. Every request is recorded for later assertions.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone)]
struct Route {
    status: u16,
    body: Vec<u8>,
    misses: usize,
}

#[derive(Default)]
struct State {
    routes: HashMap<(String, String), Route>,
    hits: HashMap<(String, String), usize>,
    requests: Vec<RecordedRequest>,
}

#[derive(Clone)]
pub struct ApiServer {
    base: String,
    state: Arc<Mutex<State>>,
}

impl ApiServer {
    /// Starts the server on an ephemeral port. Runs until the process exits.
    pub fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().unwrap().port();
        let state = Arc::new(Mutex::new(State::default()));
        let shared = Arc::clone(&state);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let state = Arc::clone(&shared);
                thread::spawn(move || handle(stream, &state));
            }
        });
        Self {
            base: format!("http://127.0.0.1:{}", port),
            state,
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub fn route(&self, method: &str, path: &str, status: u16, body: impl Into<Vec<u8>>) {
        self.route_after(method, path, 0, status, body);
    }

    /// Answer 404 for the first `misses` hits, then `status` with `body`.
    pub fn route_after(&self, method: &str, path: &str, misses: usize, status: u16, body: impl Into<Vec<u8>>) {
        let mut st = self.state.lock().unwrap();
        st.routes.insert(
            (method.to_string(), path.to_string()),
            Route {
                status,
                body: body.into(),
                misses,
            },
        );
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn requests_to(&self, method: &str, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path == path)
            .collect()
    }

    pub fn hits(&self, method: &str, path: &str) -> usize {
        let st = self.state.lock().unwrap();
        st.hits
            .get(&(method.to_string(), path.to_string()))
            .copied()
            .unwrap_or(0)
    }
}

fn handle(mut stream: TcpStream, state: &Mutex<State>) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(5)));
    let Some(req) = read_request(&mut stream) else {
        return;
    };

    let key = (req.method.clone(), req.path.clone());
    let (status, body) = {
        let mut st = state.lock().unwrap();
        st.requests.push(req);
        let hit = {
            let n = st.hits.entry(key.clone()).or_insert(0);
            *n += 1;
            *n
        };
        match st.routes.get(&key) {
            Some(route) if hit > route.misses => (route.status, route.body.clone()),
            _ => (404, b"{\"message\":\"Not Found\"}".to_vec()),
        }
    };

    let head = format!(
        "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        reason(status),
        body.len()
    );
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(&body);
}

fn read_request(stream: &mut TcpStream) -> Option<RecordedRequest> {
    let mut data = Vec::new();
    let mut buf = [0u8; 8192];
    let header_end = loop {
        let n = stream.read(&mut buf).ok()?;
        if n == 0 {
            return None;
        }
        data.extend_from_slice(&buf[..n]);
        if let Some(i) = find(&data, b"\r\n\r\n") {
            break i;
        }
    };

    let head = std::str::from_utf8(&data[..header_end]).ok()?;
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|l| l.split_once(':'))
        .map(|(n, v)| (n.trim().to_string(), v.trim().to_string()))
        .collect();
    let content_length = headers
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);

    let mut body = data[header_end + 4..].to_vec();
    while body.len() < content_length {
        let n = stream.read(&mut buf).ok()?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&buf[..n]);
    }
    body.truncate(content_length);

    Some(RecordedRequest {
        method,
        path,
        headers,
        body,
    })
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Status",
    }
}
