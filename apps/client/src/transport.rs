//! HTTP capability for talking to the portfolio API.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use folio_forms::{FieldViolation, SubmitResponse};
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::controller::Draft;

#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection refused, DNS failure, timeout, or an unreadable body.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered but did not accept the submission.
    #[error("server rejected submission (status {status}): {message}")]
    Rejected {
        status: u16,
        message: String,
        errors: Vec<FieldViolation>,
    },
}

impl TransportError {
    /// True when the server could not be reached at all.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, TransportError::Http(_))
    }
}

/// A publicly listed testimonial as returned by `GET /testimonials`.
#[derive(Debug, Clone, Deserialize)]
pub struct ListedTestimonial {
    pub name: String,
    pub message: String,
    pub date_created: DateTime<Utc>,
}

#[async_trait]
pub trait SubmissionTransport: Send + Sync {
    /// `Ok` only when the server reports `success: true`.
    async fn submit(&self, draft: &Draft) -> Result<SubmitResponse, TransportError>;

    async fn fetch_testimonials(&self) -> Result<Vec<ListedTestimonial>, TransportError>;
}

#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    /// Every request is bounded by `timeout`; expiry surfaces as `Http`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, TransportError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

#[async_trait]
impl SubmissionTransport for HttpTransport {
    async fn submit(&self, draft: &Draft) -> Result<SubmitResponse, TransportError> {
        let url = self.url(draft.kind().endpoint());
        debug!("POST {url}");

        let response = self.client.post(&url).json(draft).send().await?;
        let status = response.status();
        let body = response.text().await?;

        match serde_json::from_str::<SubmitResponse>(&body) {
            Ok(parsed) if status.is_success() && parsed.success => Ok(parsed),
            Ok(parsed) => {
                warn!("Submission to {url} rejected with {status}: {}", parsed.message);
                Err(TransportError::Rejected {
                    status: status.as_u16(),
                    message: parsed.message,
                    errors: parsed.errors,
                })
            }
            Err(_) => {
                warn!("Submission to {url} returned {status} with an unexpected body");
                Err(TransportError::Rejected {
                    status: status.as_u16(),
                    message: body,
                    errors: vec![],
                })
            }
        }
    }

    async fn fetch_testimonials(&self) -> Result<Vec<ListedTestimonial>, TransportError> {
        let response = self
            .client
            .get(self.url("testimonials"))
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }
}


#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    use super::testing::unreachable_error;
    use super::*;

    #[tokio::test]
    async fn test_unreachable_classification() {
        assert!(unreachable_error().await.is_unreachable());
        let rejected = TransportError::Rejected {
            status: 500,
            message: "boom".into(),
            errors: vec![],
        };
        assert!(!rejected.is_unreachable());
    }

    #[test]
    fn test_url_joins_base_and_endpoint() {
        let transport =
            HttpTransport::new("http://localhost:3000/api", Duration::from_secs(1)).unwrap();
        assert_eq!(transport.url("contact"), "http://localhost:3000/api/contact");
    }

    /// Accepts one connection, drains the request, then answers with the
    /// canned status line and body.
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            read_request(&mut socket).await;
            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\n\
                 Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });
        format!("http://{addr}/api")
    }

    async fn read_request(socket: &mut TcpStream) {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                return;
            }
            buf.extend_from_slice(&chunk[..n]);
            let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
                continue;
            };
            let headers = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
            let length = headers
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + length {
                return;
            }
        }
    }

    fn testimonial() -> Draft {
        Draft::Testimonial(folio_forms::TestimonialDraft {
            name: "Ann".into(),
            email: "ann@site.io".into(),
            message: "Working with Jo was a real pleasure.".into(),
        })
    }

    #[tokio::test]
    async fn test_success_true_is_accepted() {
        let base = serve_once("200 OK", r#"{"success":true,"message":"Thanks"}"#).await;
        let transport = HttpTransport::new(base, Duration::from_secs(5)).unwrap();
        let response = transport.submit(&testimonial()).await.unwrap();
        assert_eq!(response.message, "Thanks");
    }

    #[tokio::test]
    async fn test_ok_status_with_success_false_is_rejected() {
        let base = serve_once("200 OK", r#"{"success":false,"message":"Not today"}"#).await;
        let transport = HttpTransport::new(base, Duration::from_secs(5)).unwrap();
        match transport.submit(&testimonial()).await.unwrap_err() {
            TransportError::Rejected {
                status, message, ..
            } => {
                assert_eq!(status, 200);
                assert_eq!(message, "Not today");
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_server_violations_are_kept() {
        let base = serve_once(
            "400 Bad Request",
            r#"{"success":false,"message":"Validation failed","errors":[{"field":"name","message":"Name must be at least 2 characters"}]}"#,
        )
        .await;
        let transport = HttpTransport::new(base, Duration::from_secs(5)).unwrap();
        let err = transport.submit(&testimonial()).await.unwrap_err();
        assert!(!err.is_unreachable());
        match err {
            TransportError::Rejected { status, errors, .. } => {
                assert_eq!(status, 400);
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].field, folio_forms::Field::Name);
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_non_json_body_is_rejected_with_status() {
        let base = serve_once("502 Bad Gateway", "<html>Bad gateway</html>").await;
        let transport = HttpTransport::new(base, Duration::from_secs(5)).unwrap();
        match transport.submit(&testimonial()).await.unwrap_err() {
            TransportError::Rejected { status, message, errors } => {
                assert_eq!(status, 502);
                assert!(message.contains("Bad gateway"));
                assert!(errors.is_empty());
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_silent_server_times_out_as_unreachable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            read_request(&mut socket).await;
            tokio::time::sleep(Duration::from_secs(30)).await;
            drop(socket);
        });

        let transport =
            HttpTransport::new(format!("http://{addr}/api"), Duration::from_millis(200)).unwrap();
        let err = transport.submit(&testimonial()).await.unwrap_err();
        assert!(err.is_unreachable());
        assert!(matches!(&err, TransportError::Http(e) if e.is_timeout()));
    }

    #[tokio::test]
    async fn test_connection_refused_is_http_error() {
        // Port 9 (discard) on loopback is closed in test environments.
        let transport = HttpTransport::new("http://127.0.0.1:9/api", Duration::from_secs(2)).unwrap();
        let draft = Draft::Testimonial(folio_forms::TestimonialDraft::default());
        let err = transport.submit(&draft).await.unwrap_err();
        assert!(err.is_unreachable());
    }
}
