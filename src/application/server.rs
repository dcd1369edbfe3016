use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncWrite, BufReader};
use tokio::net::TcpListener;
use tokio::time::timeout;

use super::audit::AuditLog;
use super::config::Config;
use super::http::{read_request, HttpError, Request, Response};
use super::ApplicationError;
use crate::{evaluate, CalcError};

pub const CALCULATE_PATH: &str = "/api/v1/calculate";

/// How long a client gets to deliver a complete request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct CalculateRequest {
    #[serde(default)]
    pub expression: String,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct CalculateResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Status code and client-facing message for each evaluation failure.
///
/// `UnsupportedSymbol` is reported as a server error even though the input
/// is at fault; existing clients depend on the 500.
pub fn error_status(error: &CalcError) -> (u16, &'static str) {
    match error {
        CalcError::DivisionByZero => (422, "Expression is not valid: division by zero"),
        CalcError::InvalidNumberFormat { .. } => {
            (422, "Expression is not valid: invalid number format")
        }
        CalcError::UnsupportedSymbol { .. } => (
            500,
            "Internal server error: expression is not valid: unsupported symbol",
        ),
        CalcError::UnbalancedBrackets => (422, "Expression is not valid: unbalanced brackets"),
        CalcError::InvalidExpression => (422, "Expression is not valid"),
        CalcError::NotEnoughOperands => (422, "Expression is not valid: not enough operands"),
    }
}

/// Bind to `config.port` on all interfaces and serve until the listener fails.
pub async fn serve(config: &Config) -> Result<(), ApplicationError> {
    let listener = TcpListener::bind(SocketAddr::from(([0, 0, 0, 0], config.port))).await?;
    info!("listening on {}", listener.local_addr()?);
    serve_on(listener, AuditLog::new(&config.audit_log)).await
}

/// Accept connections from `listener`, one task per connection.
pub async fn serve_on(listener: TcpListener, audit: AuditLog) -> Result<(), ApplicationError> {
    let audit = Arc::new(audit);
    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                warn!("failed to accept connection: {e}");
                continue;
            }
        };
        let audit = audit.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, &audit, REQUEST_TIMEOUT).await {
                debug!("connection from {peer} ended with error: {e}");
            }
        });
    }
}

async fn handle_connection<S: AsyncRead + AsyncWrite + Unpin>(
    stream: S,
    audit: &AuditLog,
    deadline: Duration,
) -> io::Result<()> {
    let (reader, mut writer) = tokio::io::split(stream);
    let mut reader = BufReader::new(reader);
    let response = match timeout(deadline, read_request(&mut reader)).await {
        Err(_) => {
            debug!("no complete request within {deadline:?}");
            error_response(408, "Request timeout")
        }
        Ok(Ok(request)) => handle(&request, audit).await,
        Ok(Err(HttpError::Io(e))) => return Err(e),
        Ok(Err(HttpError::BodyTooLarge(len))) => {
            debug!("rejecting {len} byte body");
            error_response(413, "Request body too large")
        }
        Ok(Err(e)) => {
            debug!("{e}");
            error_response(400, "Invalid request")
        }
    };
    response.write_to(&mut writer).await
}

/// Route and answer a single request.
pub async fn handle(request: &Request, audit: &AuditLog) -> Response {
    if request.path != CALCULATE_PATH {
        return error_response(404, "Not found");
    }
    if request.method != "POST" {
        return error_response(405, "Method not allowed").with_header("Allow", "POST");
    }
    let Ok(CalculateRequest { expression }) =
        serde_json::from_slice::<CalculateRequest>(&request.body)
    else {
        return error_response(400, "Invalid request");
    };

    record(audit, &format!("input expression: {expression}")).await;
    match evaluate(&expression) {
        Ok(result) => {
            info!("{expression} = {result}");
            record(audit, &format!("{expression} = {result}")).await;
            json_response(
                200,
                &CalculateResponse {
                    result: Some(result),
                    error: None,
                },
            )
        }
        Err(e) => {
            let (status, message) = error_status(&e);
            info!("{expression:?} rejected: {e}");
            record(audit, &format!("error: {}", message.to_lowercase())).await;
            error_response(status, message)
        }
    }
}

async fn record(audit: &AuditLog, line: &str) {
    if let Err(e) = audit.append(line).await {
        warn!("failed to write audit log {}: {e}", audit.path().display());
    }
}

fn error_response(status: u16, message: &str) -> Response {
    json_response(
        status,
        &CalculateResponse {
            result: None,
            error: Some(message.to_string()),
        },
    )
}

fn json_response(status: u16, body: &CalculateResponse) -> Response {
    match serde_json::to_string(body) {
        Ok(body) => Response::json(status, body),
        Err(e) => {
            warn!("failed to serialize response: {e}");
            Response::json(500, r#"{"error":"Internal server error"}"#.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn audit() -> AuditLog {
        AuditLog::new(std::env::temp_dir().join(format!(
            "infix-calc-server-unit-{}.txt",
            std::process::id()
        )))
    }

    fn post(body: &str) -> Request {
        Request {
            method: "POST".to_string(),
            path: CALCULATE_PATH.to_string(),
            body: body.as_bytes().to_vec(),
        }
    }

    fn decode(response: &Response) -> CalculateResponse {
        serde_json::from_str(&response.body).unwrap()
    }

    #[tokio::test]
    async fn evaluates_expression() {
        let response = handle(&post(r#"{"expression": "2+3*4"}"#), &audit()).await;
        assert_eq!(response.status, 200);
        assert_eq!(response.body, r#"{"result":14.0}"#);
    }

    #[tokio::test]
    async fn zero_result_is_still_reported() {
        let response = handle(&post(r#"{"expression": "1-1"}"#), &audit()).await;
        assert_eq!(response.status, 200);
        assert_eq!(decode(&response).result, Some(0.0));
    }

    #[tokio::test]
    async fn maps_every_error_kind() {
        let cases = [
            ("5/0", 422, "Expression is not valid: division by zero"),
            ("1.1.1", 422, "Expression is not valid: invalid number format"),
            (
                "10a",
                500,
                "Internal server error: expression is not valid: unsupported symbol",
            ),
            ("(1", 422, "Expression is not valid: unbalanced brackets"),
            ("", 422, "Expression is not valid"),
            ("1+", 422, "Expression is not valid: not enough operands"),
        ];
        for (expression, status, message) in cases {
            let body = serde_json::to_string(&CalculateRequest {
                expression: expression.to_string(),
            })
            .unwrap();
            let response = handle(&post(&body), &audit()).await;
            assert_eq!(response.status, status, "{expression}");
            assert_eq!(
                decode(&response),
                CalculateResponse {
                    result: None,
                    error: Some(message.to_string()),
                },
                "{expression}"
            );
        }
    }

    #[tokio::test]
    async fn missing_expression_field_is_empty() {
        let response = handle(&post("{}"), &audit()).await;
        assert_eq!(response.status, 422);
    }

    #[tokio::test]
    async fn rejects_before_evaluating() {
        let response = handle(&post("not json"), &audit()).await;
        assert_eq!(response.status, 400);
        assert_eq!(decode(&response).error.as_deref(), Some("Invalid request"));

        let mut get = post("");
        get.method = "GET".to_string();
        let response = handle(&get, &audit()).await;
        assert_eq!(response.status, 405);
        assert!(response.headers.contains(&("Allow", "POST".to_string())));

        let mut elsewhere = post(r#"{"expression": "1"}"#);
        elsewhere.path = "/".to_string();
        assert_eq!(handle(&elsewhere, &audit()).await.status, 404);
    }

    #[tokio::test]
    async fn stalled_client_times_out() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let (mut client, server) = tokio::io::duplex(4096);
        client.write_all(b"POST /api/v1/calculate HTTP/1.1\r\n").await.unwrap();
        handle_connection(server, &audit(), Duration::from_millis(50))
            .await
            .unwrap();

        let mut response = String::new();
        client.read_to_string(&mut response).await.unwrap();
        assert!(
            response.starts_with("HTTP/1.1 408 Request Timeout\r\n"),
            "{response}"
        );
        assert!(response.ends_with(r#"{"error":"Request timeout"}"#), "{response}");
    }

    #[tokio::test]
    async fn unwritable_audit_log_does_not_fail_request() {
        let audit = AuditLog::new("/nonexistent-infix-calc-dir/log.txt");
        let response = handle(&post(r#"{"expression": "1/2"}"#), &audit).await;
        assert_eq!(response.status, 200);
        assert_eq!(decode(&response).result, Some(0.5));
    }
}
