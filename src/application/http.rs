//! Just enough HTTP/1.1 to serve one JSON request per connection.
use std::io;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

pub const MAX_BODY_LEN: usize = 64 * 1024;
/// Longest accepted request or header line, terminator included.
pub const MAX_LINE_LEN: usize = 8 * 1024;
const MAX_HEADERS: usize = 100;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Request {
    pub method: String,
    /// Request target without the query string.
    pub path: String,
    pub body: Vec<u8>,
}

#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("malformed request: {0}")]
    Malformed(&'static str),
    #[error("request body of {0} bytes exceeds the limit")]
    BodyTooLarge(usize),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Read a request line, headers and a `Content-Length` delimited body.
pub async fn read_request<R: AsyncBufRead + Unpin>(reader: &mut R) -> Result<Request, HttpError> {
    let Some(line) = read_line(reader).await? else {
        return Err(HttpError::Malformed("empty request"));
    };
    let mut parts = line.split_whitespace();
    let (Some(method), Some(target), Some(version), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(HttpError::Malformed("request line"));
    };
    if !version.starts_with("HTTP/1.") {
        return Err(HttpError::Malformed("unsupported version"));
    }
    let method = method.to_string();
    let path = target.split('?').next().unwrap_or_default().to_string();

    let mut content_length = 0;
    let mut num_headers = 0;
    loop {
        let Some(line) = read_line(reader).await? else {
            return Err(HttpError::Malformed("unterminated headers"));
        };
        let header = line.trim_end_matches(['\r', '\n']);
        if header.is_empty() {
            break;
        }
        num_headers += 1;
        if num_headers > MAX_HEADERS {
            return Err(HttpError::Malformed("too many headers"));
        }
        let Some((name, value)) = header.split_once(':') else {
            return Err(HttpError::Malformed("header"));
        };
        if name.trim().eq_ignore_ascii_case("content-length") {
            content_length = value
                .trim()
                .parse()
                .map_err(|_| HttpError::Malformed("content length"))?;
        }
    }

    if content_length > MAX_BODY_LEN {
        return Err(HttpError::BodyTooLarge(content_length));
    }
    let mut body = vec![0; content_length];
    reader.read_exact(&mut body).await?;

    Ok(Request { method, path, body })
}

/// One line of at most [`MAX_LINE_LEN`] bytes, or `None` at end of input.
async fn read_line<R: AsyncBufRead + Unpin>(reader: &mut R) -> Result<Option<String>, HttpError> {
    let mut buf = Vec::new();
    let limit = MAX_LINE_LEN as u64 + 1;
    if (&mut *reader).take(limit).read_until(b'\n', &mut buf).await? == 0 {
        return Ok(None);
    }
    if buf.len() > MAX_LINE_LEN {
        return Err(HttpError::Malformed("line too long"));
    }
    String::from_utf8(buf)
        .map(Some)
        .map_err(|_| HttpError::Malformed("encoding"))
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub headers: Vec<(&'static str, String)>,
    pub body: String,
}

impl Response {
    pub fn json(status: u16, body: String) -> Self {
        Self {
            status,
            headers: vec![("Content-Type", "application/json".to_string())],
            body,
        }
    }

    pub fn with_header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    pub async fn write_to<W: AsyncWrite + Unpin>(&self, writer: &mut W) -> io::Result<()> {
        let mut head = format!("HTTP/1.1 {} {}\r\n", self.status, reason(self.status));
        for (name, value) in &self.headers {
            head.push_str(&format!("{name}: {value}\r\n"));
        }
        head.push_str(&format!(
            "Content-Length: {}\r\nConnection: close\r\n\r\n",
            self.body.len()
        ));
        writer.write_all(head.as_bytes()).await?;
        writer.write_all(self.body.as_bytes()).await?;
        writer.flush().await
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        405 => "Method Not Allowed",
        408 => "Request Timeout",
        413 => "Payload Too Large",
        422 => "Unprocessable Entity",
        500 => "Internal Server Error",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn parse(raw: &str) -> Result<Request, HttpError> {
        let mut reader = raw.as_bytes();
        read_request(&mut reader).await
    }

    #[tokio::test]
    async fn reads_post_with_body() {
        let request = parse(
            "POST /api/v1/calculate?x=1 HTTP/1.1\r\n\
             Host: localhost\r\n\
             content-length: 4\r\n\
             \r\n\
             1+1!",
        )
        .await
        .unwrap();
        assert_eq!(
            request,
            Request {
                method: "POST".to_string(),
                path: "/api/v1/calculate".to_string(),
                body: b"1+1!".to_vec(),
            }
        );
    }

    #[tokio::test]
    async fn bodyless_request() {
        let request = parse("GET / HTTP/1.0\r\n\r\n").await.unwrap();
        assert_eq!(request.method, "GET");
        assert!(request.body.is_empty());
    }

    #[tokio::test]
    async fn rejects_garbage() {
        assert!(matches!(parse("").await, Err(HttpError::Malformed(_))));
        assert!(matches!(parse("hello\r\n\r\n").await, Err(HttpError::Malformed(_))));
        assert!(matches!(
            parse("GET / SPDY/3\r\n\r\n").await,
            Err(HttpError::Malformed(_))
        ));
        assert!(matches!(
            parse("GET / HTTP/1.1\r\nbroken\r\n\r\n").await,
            Err(HttpError::Malformed(_))
        ));
        assert!(matches!(
            parse("GET / HTTP/1.1\r\nHost: x\r\n").await,
            Err(HttpError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn rejects_overlong_lines() {
        let raw = format!("POST /{} HTTP/1.1\r\n\r\n", "a".repeat(50_000));
        assert!(matches!(
            parse(&raw).await,
            Err(HttpError::Malformed("line too long"))
        ));

        let raw = format!(
            "POST / HTTP/1.1\r\nX-Padding: {}\r\n\r\n",
            "a".repeat(MAX_LINE_LEN)
        );
        assert!(matches!(
            parse(&raw).await,
            Err(HttpError::Malformed("line too long"))
        ));
    }

    #[tokio::test]
    async fn line_at_the_limit_is_accepted() {
        let target = format!("/{}", "a".repeat(MAX_LINE_LEN - "GET  HTTP/1.1\r\n".len() - 1));
        let raw = format!("GET {target} HTTP/1.1\r\n\r\n");
        assert_eq!(parse(&raw).await.unwrap().path, target);
    }

    #[tokio::test]
    async fn rejects_non_utf8_header() {
        let mut reader = &b"POST /api/v1/calculate HTTP/1.1\r\nX: \xff\r\n\r\n"[..];
        assert!(matches!(
            read_request(&mut reader).await,
            Err(HttpError::Malformed("encoding"))
        ));
    }

    #[tokio::test]
    async fn truncated_body_is_io_error() {
        let result = parse("POST / HTTP/1.1\r\nContent-Length: 10\r\n\r\n123").await;
        assert!(matches!(result, Err(HttpError::Io(_))));
    }

    #[tokio::test]
    async fn rejects_oversized_body() {
        let raw = format!("POST / HTTP/1.1\r\nContent-Length: {}\r\n\r\n", MAX_BODY_LEN + 1);
        assert!(matches!(
            parse(&raw).await,
            Err(HttpError::BodyTooLarge(len)) if len == MAX_BODY_LEN + 1
        ));
    }

    #[tokio::test]
    async fn writes_status_headers_and_body() {
        let response = Response::json(405, r#"{"error":"Method not allowed"}"#.to_string())
            .with_header("Allow", "POST");
        let mut out = Vec::new();
        response.write_to(&mut out).await.unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "HTTP/1.1 405 Method Not Allowed\r\n\
             Content-Type: application/json\r\n\
             Allow: POST\r\n\
             Content-Length: 30\r\n\
             Connection: close\r\n\
             \r\n\
             {\"error\":\"Method not allowed\"}"
        );
    }
}
