//! Where the access code comes from.
//!
//! [`AccessCodeSource`] returns the raw payload; [`HttpAccessSource`] fetches
//! it with a single GET.  Parsing and comparison live in
//! [`super::gate`].

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::AuthConfig;

// ---------------------------------------------------------------------------
// AuthError
// ---------------------------------------------------------------------------

/// Reasons the access check could not be completed.  Every variant means
/// "not authenticated".
#[derive(Debug, Error)]
pub enum AuthError {
    #[error(
        "Connection to the authentication server timed out. \
         Please check your internet connection and try again."
    )]
    Timeout,

    #[error(
        "Could not connect to the authentication server. \
         Please check your internet connection and try again."
    )]
    Connection,

    #[error(
        "Could not connect to the authentication server (HTTP {0}). \
         Please check your internet connection and try again."
    )]
    Status(u16),

    #[error("The password verification data is corrupted. Please contact the administrator.")]
    MalformedPayload,

    #[error("The password verification data is invalid. Please contact the administrator.")]
    MissingAccessCode,

    #[error("Authentication request failed: {0}")]
    Request(String),
}

impl From<reqwest::Error> for AuthError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            AuthError::Timeout
        } else if e.is_connect() {
            AuthError::Connection
        } else {
            AuthError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// AccessCodeSource
// ---------------------------------------------------------------------------

/// Supplies the payload holding the expected access code.
#[async_trait]
pub trait AccessCodeSource: Send + Sync {
    async fn fetch(&self) -> Result<String, AuthError>;
}

/// GETs the payload from a URL.
pub struct HttpAccessSource {
    client: reqwest::Client,
    url: String,
}

impl HttpAccessSource {
    pub fn from_config(config: &AuthConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self::with_client(config.access_url.clone(), client)
    }

    pub fn with_client(url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl AccessCodeSource for HttpAccessSource {
    async fn fetch(&self) -> Result<String, AuthError> {
        log::debug!("auth: GET {}", self.url);
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            log::warn!("auth: server returned HTTP {}", status.as_u16());
            return Err(AuthError::Status(status.as_u16()));
        }

        Ok(response.text().await?)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve `response` verbatim to the first connection; return its URL.
    pub(crate) async fn serve_once(response: String) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        });
        format!("http://{addr}/raw")
    }

    pub(crate) fn http_response(status: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {status}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        )
    }

    pub(crate) fn test_client(timeout: Duration) -> reqwest::Client {
        reqwest::Client::builder()
            .no_proxy()
            .timeout(timeout)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn fetch_returns_body_on_200() {
        let url = serve_once(http_response("200 OK", r#"{"access_code":"x"}"#)).await;
        let source = HttpAccessSource::with_client(url, test_client(Duration::from_secs(5)));
        assert_eq!(source.fetch().await.unwrap(), r#"{"access_code":"x"}"#);
    }

    #[tokio::test]
    async fn non_200_is_a_status_error() {
        let url = serve_once(http_response("500 Internal Server Error", "oops")).await;
        let source = HttpAccessSource::with_client(url, test_client(Duration::from_secs(5)));

        let err = source.fetch().await.unwrap_err();
        assert!(matches!(err, AuthError::Status(500)));
        assert!(err.to_string().contains("HTTP 500"));
    }

    #[tokio::test]
    async fn silent_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hold = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
            drop(socket);
        });

        let source = HttpAccessSource::with_client(
            format!("http://{addr}/raw"),
            test_client(Duration::from_millis(200)),
        );
        assert!(matches!(source.fetch().await, Err(AuthError::Timeout)));
        hold.abort();
    }

    #[tokio::test]
    async fn refused_connection_is_a_connection_error() {
        let addr = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap()
        };
        let source = HttpAccessSource::with_client(
            format!("http://{addr}/raw"),
            test_client(Duration::from_secs(5)),
        );
        assert!(matches!(source.fetch().await, Err(AuthError::Connection)));
    }

    #[test]
    fn from_config_keeps_url() {
        let source = HttpAccessSource::from_config(&AuthConfig::default());
        assert_eq!(source.url(), "https://pastebin.com/raw/eKiZCNbX");
    }
}
