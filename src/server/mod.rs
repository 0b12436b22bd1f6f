use std::io::{self, BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::time::Duration;

use thiserror::Error;
use tracing::{info, warn};

pub mod api;
pub mod routes;

/// Environment variable overriding the default bind address.
pub const BIND_ENV: &str = "STAFFING_BIND";
pub const DEFAULT_BIND: &str = "127.0.0.1:3000";

/// Largest accepted request body; larger bodies get 413.
pub const MAX_BODY_BYTES: usize = 8 * 1024 * 1024;
/// Budget for the request line plus all header lines.
pub const MAX_HEADER_BYTES: usize = 16 * 1024;

const READ_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: String,
    pub path: String,
    pub body: String,
}

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("connection error: {0}")]
    Io(#[from] io::Error),
    #[error("malformed request line")]
    BadRequestLine,
    #[error("request headers exceed {} bytes", MAX_HEADER_BYTES)]
    HeadersTooLarge,
    #[error("invalid content-length '{0}'")]
    BadContentLength(String),
    #[error("request body of {0} bytes exceeds {max} bytes", max = MAX_BODY_BYTES)]
    BodyTooLarge(usize),
}

pub fn run_server(bind_addr: &str) -> io::Result<()> {
    let listener = TcpListener::bind(bind_addr)?;
    info!("staffing server listening on http://{bind_addr}");
    serve(listener)
}

/// Accepts connections on `listener` until it fails, one request each.
pub fn serve(listener: TcpListener) -> io::Result<()> {
    for stream in listener.incoming() {
        match stream {
            Ok(stream) => {
                if let Err(err) = handle_connection(&stream) {
                    warn!(%err, "request error");
                }
            }
            Err(err) => warn!(%err, "connection failed"),
        }
    }

    Ok(())
}

fn handle_connection(stream: &TcpStream) -> io::Result<()> {
    stream.set_read_timeout(Some(READ_TIMEOUT))?;
    let mut reader = BufReader::new(stream);

    let response = match read_request(&mut reader) {
        Ok(Some(request)) => {
            let response = routes::route_request(&request.method, &request.path, &request.body);
            info!(
                method = %request.method,
                path = %request.path,
                body_bytes = request.body.len(),
                status = response.status_code,
                "handled request"
            );
            response
        }
        Ok(None) => return Ok(()),
        Err(RequestError::Io(err)) => return Err(err),
        Err(err @ RequestError::BodyTooLarge(_)) => {
            warn!(%err, "rejected request");
            routes::error_response(413, "Payload Too Large", &err.to_string())
        }
        Err(err) => {
            warn!(%err, "rejected request");
            routes::error_response(400, "Bad Request", &err.to_string())
        }
    };

    let mut writer = stream;
    writer.write_all(response.to_http_string().as_bytes())?;
    writer.flush()
}

/// Reads one request: the request line, headers up to the blank line, then
/// exactly `Content-Length` body bytes. Returns `None` when the peer closed
/// the connection without sending anything.
pub fn read_request<R: BufRead>(reader: &mut R) -> Result<Option<HttpRequest>, RequestError> {
    let mut budget = MAX_HEADER_BYTES;

    let request_line = read_header_line(reader, &mut budget)?;
    if request_line.is_empty() {
        return Ok(None);
    }
    let mut parts = request_line.split_whitespace();
    let (Some(method), Some(path)) = (parts.next(), parts.next()) else {
        return Err(RequestError::BadRequestLine);
    };
    let (method, path) = (method.to_string(), path.to_string());

    let mut content_length = 0;
    loop {
        let line = read_header_line(reader, &mut budget)?;
        let line = line.trim_end_matches(['\r', '\n']);
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("content-length") {
                let value = value.trim();
                content_length = value
                    .parse::<usize>()
                    .map_err(|_| RequestError::BadContentLength(value.to_string()))?;
            }
        }
    }

    if content_length > MAX_BODY_BYTES {
        return Err(RequestError::BodyTooLarge(content_length));
    }
    let mut body = vec![0_u8; content_length];
    reader.read_exact(&mut body)?;

    Ok(Some(HttpRequest {
        method,
        path,
        body: String::from_utf8_lossy(&body).into_owned(),
    }))
}

/// One line including its terminator; empty at end of stream.
fn read_header_line<R: BufRead>(reader: &mut R, budget: &mut usize) -> Result<String, RequestError> {
    let mut line = String::new();
    let read = reader
        .by_ref()
        .take(*budget as u64 + 1)
        .read_line(&mut line)?;
    if read > *budget {
        return Err(RequestError::HeadersTooLarge);
    }
    *budget -= read;
    Ok(line)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn parse(raw: &str) -> Result<Option<HttpRequest>, RequestError> {
        read_request(&mut Cursor::new(raw.as_bytes().to_vec()))
    }

    #[test]
    fn body_is_read_to_content_length() {
        let request = parse("POST /api/rank HTTP/1.1\r\nHost: x\r\ncontent-LENGTH: 4\r\n\r\n{}{}trailing")
            .unwrap()
            .unwrap();
        assert_eq!(request.method, "POST");
        assert_eq!(request.path, "/api/rank");
        assert_eq!(request.body, "{}{}");
    }

    #[test]
    fn missing_content_length_means_empty_body() {
        let request = parse("POST /api/optimize HTTP/1.1\r\n\r\n").unwrap().unwrap();
        assert!(request.body.is_empty());
    }

    #[test]
    fn short_body_is_an_io_error() {
        let err = parse("POST / HTTP/1.1\r\nContent-Length: 10\r\n\r\nabc").unwrap_err();
        assert!(matches!(err, RequestError::Io(ref e) if e.kind() == io::ErrorKind::UnexpectedEof));
    }

    #[test]
    fn oversized_and_invalid_lengths_are_rejected() {
        let raw = format!("POST / HTTP/1.1\r\nContent-Length: {}\r\n\r\n", MAX_BODY_BYTES + 1);
        assert!(matches!(parse(&raw), Err(RequestError::BodyTooLarge(_))));
        assert!(matches!(
            parse("POST / HTTP/1.1\r\nContent-Length: -1\r\n\r\n"),
            Err(RequestError::BadContentLength(_))
        ));
    }

    #[test]
    fn header_budget_is_enforced() {
        let raw = format!("GET / HTTP/1.1\r\nX-Long: {}\r\n\r\n", "a".repeat(MAX_HEADER_BYTES));
        assert!(matches!(parse(&raw), Err(RequestError::HeadersTooLarge)));
    }

    #[test]
    fn empty_connection_yields_nothing() {
        assert!(parse("").unwrap().is_none());
        assert!(matches!(parse("GARBAGE\r\n\r\n"), Err(RequestError::BadRequestLine)));
    }
}
