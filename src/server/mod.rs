use std::io::{self, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::time::Duration;

use crate::data::catalog::Catalog;

pub mod api;
pub mod routes;

/// Upper bound on a request's headers plus body.
const MAX_REQUEST_BYTES: usize = 8 * 1024 * 1024;

/// How long a client may stall mid-request before the connection is dropped.
const READ_TIMEOUT: Duration = Duration::from_secs(5);

pub fn run_server(bind_addr: &str, catalog: &Catalog) -> io::Result<()> {
    let listener = TcpListener::bind(bind_addr)?;
    tracing::info!(
        products = catalog.len(),
        "swarm-catalog editor listening on http://{bind_addr}"
    );

    for stream in listener.incoming() {
        match stream {
            Ok(mut stream) => {
                if let Err(err) = handle_connection(&mut stream, catalog, READ_TIMEOUT) {
                    tracing::warn!("request error: {err}");
                }
            }
            Err(err) => tracing::warn!("connection failed: {err}"),
        }
    }

    Ok(())
}

fn handle_connection(
    stream: &mut TcpStream,
    catalog: &Catalog,
    read_timeout: Duration,
) -> io::Result<()> {
    stream.set_read_timeout(Some(read_timeout))?;
    let Some(request) = read_request(stream)? else {
        return Ok(());
    };

    let response = routes::route_request(catalog, &request.method, &request.path, &request.body);
    tracing::info!(
        method = %request.method,
        path = %request.path,
        status = response.status_code,
        "handled request"
    );
    stream.write_all(response.to_http_string().as_bytes())?;
    stream.flush()?;
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: String,
    pub path: String,
    pub body: String,
}

fn find_header_end(buffer: &[u8]) -> Option<usize> {
    buffer
        .windows(4)
        .position(|window| window == b"\r\n\r\n")
        .map(|position| position + 4)
}

fn too_large() -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, "request exceeds size limit")
}

/// Read one HTTP/1.1 request: headers up to the blank line, then `Content-Length` bytes of body.
/// Returns `None` when the peer closes without sending anything.
pub fn read_request(stream: &mut impl Read) -> io::Result<Option<Request>> {
    let mut buffer = Vec::new();
    let mut chunk = [0_u8; 16_384];

    let header_end = loop {
        if let Some(end) = find_header_end(&buffer) {
            break end;
        }
        let bytes_read = stream.read(&mut chunk)?;
        if bytes_read == 0 {
            if buffer.is_empty() {
                return Ok(None);
            }
            break buffer.len();
        }
        buffer.extend_from_slice(&chunk[..bytes_read]);
        if buffer.len() > MAX_REQUEST_BYTES {
            return Err(too_large());
        }
    };

    let head = String::from_utf8_lossy(&buffer[..header_end]).into_owned();
    let mut lines = head.lines();
    let request_line = lines.next().unwrap_or_default();
    let mut request_parts = request_line.split_whitespace();
    let method = request_parts.next().unwrap_or("GET").to_string();
    let path = request_parts.next().unwrap_or("/").to_string();

    let content_length = lines
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);
    if content_length > MAX_REQUEST_BYTES {
        return Err(too_large());
    }

    let body_end = header_end + content_length;
    while buffer.len() < body_end {
        let bytes_read = stream.read(&mut chunk)?;
        if bytes_read == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..bytes_read]);
    }
    let body_end = body_end.min(buffer.len());
    let body = String::from_utf8_lossy(&buffer[header_end..body_end]).into_owned();

    Ok(Some(Request { method, path, body }))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::time::Instant;

    use super::*;

    #[test]
    fn reads_body_by_content_length() {
        let raw = "POST /api/products/preview HTTP/1.1\r\nHost: x\r\nContent-Length: 2\r\n\r\n{}trailing";
        let request = read_request(&mut Cursor::new(raw.as_bytes())).unwrap().unwrap();
        assert_eq!(request.method, "POST");
        assert_eq!(request.path, "/api/products/preview");
        assert_eq!(request.body, "{}");
    }

    #[test]
    fn request_without_body_has_empty_body() {
        let raw = "GET /api/health HTTP/1.1\r\n\r\n";
        let request = read_request(&mut Cursor::new(raw.as_bytes())).unwrap().unwrap();
        assert_eq!(request.path, "/api/health");
        assert!(request.body.is_empty());
    }

    #[test]
    fn closed_connection_yields_none() {
        assert!(read_request(&mut Cursor::new(Vec::new())).unwrap().is_none());
    }

    #[test]
    fn oversized_content_length_is_rejected() {
        let raw = format!("POST / HTTP/1.1\r\nContent-Length: {}\r\n\r\n", MAX_REQUEST_BYTES + 1);
        assert!(read_request(&mut Cursor::new(raw.into_bytes())).is_err());
    }

    #[test]
    fn stalled_body_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let mut client = TcpStream::connect(listener.local_addr().unwrap()).unwrap();
        client
            .write_all(b"POST /api/products/preview HTTP/1.1\r\nContent-Length: 64\r\n\r\n{}")
            .unwrap();
        let (mut server_side, _) = listener.accept().unwrap();

        let started = Instant::now();
        let result = handle_connection(
            &mut server_side,
            &Catalog::default(),
            Duration::from_millis(100),
        );
        assert!(result.is_err());
        assert!(started.elapsed() < Duration::from_secs(5));
        drop(client);
    }
}
