//! Just enough HTTP/1.1 to serve GET requests and close-delimited streaming bodies.

use std::io::{self, BufRead, Read, Write};

use crate::foundation::error::{ShoutError, ShoutResult};

/// Upper bound on request line plus headers.
pub const MAX_HEAD_BYTES: u64 = 8 * 1024;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Request {
    pub method: String,
    /// Percent-decoded path, always starting with `/`.
    pub path: String,
    /// Decoded query pairs in request order.
    pub query: Vec<(String, String)>,
}

impl Request {
    /// First value for any of `keys` (short and long spellings of one parameter).
    pub fn param(&self, keys: &[&str]) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| keys.contains(&k.as_str()))
            .map(|(_, v)| v.as_str())
    }
}

/// Read the request head. Headers are consumed and discarded.
pub fn read_request<R: BufRead>(reader: &mut R) -> ShoutResult<Request> {
    let mut limited = reader.take(MAX_HEAD_BYTES);
    let mut line = String::new();
    if limited.read_line(&mut line)? == 0 {
        return Err(ShoutError::invalid_option("empty request"));
    }

    let mut parts = line.split_whitespace();
    let (Some(method), Some(target), Some(version)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(ShoutError::invalid_option("malformed request line"));
    };
    if !version.starts_with("HTTP/1.") {
        return Err(ShoutError::invalid_option(format!(
            "unsupported protocol '{version}'"
        )));
    }
    if !target.starts_with('/') {
        return Err(ShoutError::invalid_option("request target must be a path"));
    }

    let (raw_path, raw_query) = target.split_once('?').unwrap_or((target, ""));
    let request = Request {
        method: method.to_string(),
        path: percent_decode(raw_path, false),
        query: parse_query(raw_query),
    };

    loop {
        let mut header = String::new();
        if limited.read_line(&mut header)? == 0 {
            if limited.limit() == 0 {
                return Err(ShoutError::invalid_option("request head too large"));
            }
            break;
        }
        if header == "\r\n" || header == "\n" {
            break;
        }
    }
    Ok(request)
}

/// Decode `%XX` escapes; `+` becomes a space only when `plus_as_space` is set.
/// Malformed escapes are kept literally.
pub fn percent_decode(input: &str, plus_as_space: bool) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' if i + 2 < bytes.len() => {
                match (hex_val(bytes[i + 1]), hex_val(bytes[i + 2])) {
                    (Some(h), Some(l)) => {
                        out.push((h << 4) | l);
                        i += 3;
                        continue;
                    }
                    _ => out.push(b'%'),
                }
            }
            b'+' if plus_as_space => out.push(b' '),
            b => out.push(b),
        }
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_val(b: u8) -> Option<u8> {
    (b as char).to_digit(16).map(|d| d as u8)
}

pub fn parse_query(raw: &str) -> Vec<(String, String)> {
    raw.split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
            (percent_decode(k, true), percent_decode(v, true))
        })
        .collect()
}

pub fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        405 => "Method Not Allowed",
        503 => "Service Unavailable",
        _ => "Internal Server Error",
    }
}

/// Response head. Without a length the body is delimited by closing the connection.
pub fn head(status: u16, content_type: &str, content_length: Option<usize>) -> String {
    let mut head = format!(
        "HTTP/1.1 {status} {}\r\nContent-Type: {content_type}\r\nCache-Control: no-cache\r\nConnection: close\r\n",
        reason(status)
    );
    match content_length {
        Some(len) => head.push_str(&format!("Content-Length: {len}\r\n")),
        None => head.push_str("X-Accel-Buffering: no\r\n"),
    }
    head.push_str("\r\n");
    head
}

pub fn write_response<W: Write>(
    out: &mut W,
    status: u16,
    content_type: &str,
    body: &str,
) -> io::Result<()> {
    out.write_all(head(status, content_type, Some(body.len())).as_bytes())?;
    out.write_all(body.as_bytes())?;
    out.flush()
}

/// Writer that emits a response head before the first body byte.
///
/// Lets a streaming handler fail before producing output and still answer with an error
/// status instead of a truncated 200.
pub struct HeadOnFirstWrite<'a, W: Write> {
    inner: &'a mut W,
    head: Option<String>,
}

impl<'a, W: Write> HeadOnFirstWrite<'a, W> {
    pub fn new(inner: &'a mut W, head: String) -> Self {
        Self {
            inner,
            head: Some(head),
        }
    }

    pub fn head_written(&self) -> bool {
        self.head.is_none()
    }
}

impl<W: Write> Write for HeadOnFirstWrite<'_, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let Some(head) = self.head.take() {
            self.inner.write_all(head.as_bytes())?;
        }
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn parses_request_line_and_query() {
        let raw = "GET /party/HELLO%20WORLD?f=doom&c=fire&s=7 HTTP/1.1\r\nHost: x\r\nUser-Agent: curl\r\n\r\n";
        let req = read_request(&mut Cursor::new(raw)).unwrap();
        assert_eq!(req.method, "GET");
        assert_eq!(req.path, "/party/HELLO WORLD");
        assert_eq!(req.param(&["f", "font"]), Some("doom"));
        assert_eq!(req.param(&["s", "speed"]), Some("7"));
        assert_eq!(req.param(&["t", "timeout"]), None);
    }

    #[test]
    fn path_keeps_plus_query_decodes_it() {
        assert_eq!(percent_decode("A+B", false), "A+B");
        assert_eq!(percent_decode("A+B", true), "A B");
        assert_eq!(parse_query("c=neon+pink&x"), vec![
            ("c".to_string(), "neon pink".to_string()),
            ("x".to_string(), String::new()),
        ]);
    }

    #[test]
    fn malformed_escapes_are_literal() {
        assert_eq!(percent_decode("100%", false), "100%");
        assert_eq!(percent_decode("%zz", false), "%zz");
        assert_eq!(percent_decode("%4", false), "%4");
        assert_eq!(percent_decode("%C3%A9", false), "é");
    }

    #[test]
    fn rejects_garbage() {
        assert!(read_request(&mut Cursor::new("")).is_err());
        assert!(read_request(&mut Cursor::new("HELLO\r\n\r\n")).is_err());
        assert!(read_request(&mut Cursor::new("GET http://x/ HTTP/1.1\r\n\r\n")).is_err());
        assert!(read_request(&mut Cursor::new("GET / SPDY/3\r\n\r\n")).is_err());
    }

    #[test]
    fn oversized_head_is_rejected() {
        let raw = format!("GET / HTTP/1.1\r\nX-Big: {}\r\n\r\n", "a".repeat(10_000));
        assert!(read_request(&mut Cursor::new(raw)).is_err());
    }

    #[test]
    fn lazy_head_only_precedes_real_output() {
        let mut buf = Vec::new();
        {
            let mut w = HeadOnFirstWrite::new(&mut buf, head(200, "text/plain", None));
            assert!(!w.head_written());
            w.flush().unwrap();
            assert!(!w.head_written());
        }
        assert!(buf.is_empty());

        let mut w = HeadOnFirstWrite::new(&mut buf, head(200, "text/plain", None));
        w.write_all(b"frame").unwrap();
        assert!(w.head_written());
        drop(w);
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(text.ends_with("\r\n\r\nframe"));
    }

    #[test]
    fn fixed_responses_carry_length() {
        let mut buf = Vec::new();
        write_response(&mut buf, 503, "text/plain", "busy\n").unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("HTTP/1.1 503 Service Unavailable\r\n"));
        assert!(text.contains("Content-Length: 5\r\n"));
        assert!(text.ends_with("busy\n"));
    }
}
