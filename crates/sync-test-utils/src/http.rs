//! Scripted HTTP server on a loopback port.
//!
//! Answers connections in order with canned responses and records each
//! request. Every response closes its connection, so one response is used
//! per request.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};

/// A request as received by [`StubServer`].
#[derive(Debug, Clone)]
pub struct Recorded {
    /// `GET /user HTTP/1.1`
    pub request_line: String,
    /// Lowercased names
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl Recorded {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

pub struct StubServer {
    url: String,
    handle: JoinHandle<Vec<Recorded>>,
}

impl StubServer {
    /// Serve `responses` (status, JSON body) to the next connections.
    pub fn start(responses: Vec<(u16, String)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());

        let handle = thread::spawn(move || {
            responses
                .into_iter()
                .map(|(status, body)| {
                    let (stream, _) = listener.accept().unwrap();
                    answer(stream, status, &body)
                })
                .collect()
        });

        Self { url, handle }
    }

    /// Serve a single response.
    pub fn once(status: u16, body: impl Into<String>) -> Self {
        Self::start(vec![(status, body.into())])
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Wait until every scripted response was served.
    ///
    /// # Panics
    /// Blocks forever if fewer requests arrive than were scripted.
    pub fn finish(self) -> Vec<Recorded> {
        self.handle.join().unwrap()
    }
}

fn answer(mut stream: std::net::TcpStream, status: u16, body: &str) -> Recorded {
    let mut reader = BufReader::new(stream.try_clone().unwrap());

    let mut request_line = String::new();
    reader.read_line(&mut request_line).unwrap();

    let mut headers = Vec::new();
    let mut content_length = 0usize;
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).unwrap();
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((key, value)) = line.split_once(':') {
            let key = key.trim().to_ascii_lowercase();
            let value = value.trim().to_string();
            if key == "content-length" {
                content_length = value.parse().unwrap();
            }
            headers.push((key, value));
        }
    }

    let mut request_body = vec![0u8; content_length];
    reader.read_exact(&mut request_body).unwrap();

    let response = if status == 204 {
        "HTTP/1.1 204 No Content\r\nConnection: close\r\n\r\n".to_string()
    } else {
        let reason = match status {
            200 => "OK",
            201 => "Created",
            401 => "Unauthorized",
            409 => "Conflict",
            _ => "Error",
        };
        format!(
            "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        )
    };
    stream.write_all(response.as_bytes()).unwrap();
    stream.flush().unwrap();

    Recorded {
        request_line: request_line.trim_end().to_string(),
        headers,
        body: String::from_utf8(request_body).unwrap(),
    }
}
