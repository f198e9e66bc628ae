use crate::http::request::{Method, Request};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("empty request")]
    EmptyRequest,
    #[error("malformed request line")]
    MalformedRequestLine,
    #[error("unknown method {0:?}")]
    UnknownMethod(String),
}

/// Parses a request out of a single read buffer.
///
/// `bytes_read` is the count returned by the read; anything past it is
/// treated as padding. The whole request must be present in `buf`: a request
/// split across reads, or larger than the read buffer, is not reassembled.
pub fn parse_http_request(buf: &[u8], bytes_read: usize) -> Result<Request, ParseError> {
    if bytes_read == 0 || buf.is_empty() {
        return Err(ParseError::EmptyRequest);
    }
    let data = &buf[..bytes_read.min(buf.len())];

    let mut lines = split_crlf(data);

    // Request line
    let request_line = String::from_utf8_lossy(lines.next().unwrap_or_default());
    let parts: Vec<&str> = request_line.split_whitespace().collect();
    let [method_str, path, version] = parts.as_slice() else {
        return Err(ParseError::MalformedRequestLine);
    };

    let method = Method::from_str(method_str)
        .ok_or_else(|| ParseError::UnknownMethod(method_str.to_string()))?;

    // Headers, up to the first empty line
    let mut headers = HashMap::new();

    for line in lines.by_ref() {
        if line.is_empty() {
            break;
        }

        let line = String::from_utf8_lossy(line);
        // Lines without ": " are skipped
        if let Some((key, value)) = line.split_once(": ") {
            headers.insert(key.to_ascii_lowercase(), value.to_string());
        }
    }

    // Body
    let body = lines.collect::<Vec<_>>().join(&b'\n');

    Ok(Request {
        method,
        path: path.to_string(),
        version: version.to_string(),
        headers,
        body: trim_body(&body).to_vec(),
    })
}

fn split_crlf(buf: &[u8]) -> impl Iterator<Item = &[u8]> {
    let mut rest = Some(buf);
    std::iter::from_fn(move || {
        let current = rest?;
        match current.windows(2).position(|w| w == b"\r\n") {
            Some(pos) => {
                rest = Some(&current[pos + 2..]);
                Some(&current[..pos])
            }
            None => {
                rest = None;
                Some(current)
            }
        }
    })
}

/// Strips NUL padding and ASCII whitespace from both ends.
fn trim_body(body: &[u8]) -> &[u8] {
    let junk = |b: &u8| *b == 0 || b.is_ascii_whitespace();
    let start = body.iter().position(|b| !junk(b)).unwrap_or(body.len());
    let end = body.iter().rposition(|b| !junk(b)).map_or(start, |p| p + 1);
    &body[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_get() {
        let req = b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n";

        let parsed = parse_http_request(req, req.len()).unwrap();

        assert_eq!(parsed.path, "/");
        assert_eq!(parsed.headers.get("host").unwrap(), "example.com");
    }

    #[test]
    fn split_keeps_trailing_segment() {
        let lines: Vec<&[u8]> = split_crlf(b"a\r\nb\r\n\r\nc").collect();
        let expected: Vec<&[u8]> = vec![&b"a"[..], &b"b"[..], &b""[..], &b"c"[..]];
        assert_eq!(lines, expected);
    }

    #[test]
    fn trim_body_handles_all_padding() {
        assert_eq!(trim_body(b"\0\0 \r\n"), b"");
        assert_eq!(trim_body(b" hi \0\0"), b"hi");
    }
}
