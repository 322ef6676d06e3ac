//! Comparing an entered password against the fetched access code.

use super::source::{AccessCodeSource, AuthError};

/// Key holding the expected password in the fetched JSON object.
pub const ACCESS_CODE_KEY: &str = "access_code";

/// Parse `body` and compare `password` with its access code.
///
/// The comparison is exact; nothing is trimmed.
///
/// ```
/// use auto_type::auth::check_payload;
///
/// assert!(check_payload(r#"{"access_code":"s3cret"}"#, "s3cret").unwrap());
/// assert!(!check_payload(r#"{"access_code":"s3cret"}"#, "S3CRET").unwrap());
/// ```
pub fn check_payload(body: &str, password: &str) -> Result<bool, AuthError> {
    let json: serde_json::Value =
        serde_json::from_str(body).map_err(|_| AuthError::MalformedPayload)?;

    if !json.is_object() {
        return Err(AuthError::MalformedPayload);
    }

    let code = &json[ACCESS_CODE_KEY];
    if is_blank(code) {
        return Err(AuthError::MissingAccessCode);
    }

    // A present but non-string code can never equal a typed password.
    Ok(code.as_str() == Some(password))
}

/// Absent, `null`, `false`, zero and empty values count as no code at all.
fn is_blank(value: &serde_json::Value) -> bool {
    use serde_json::Value;

    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

// ---------------------------------------------------------------------------
// AccessGate
// ---------------------------------------------------------------------------

/// Application gate in front of the main window.
///
/// This only keeps casual users out; anyone with the binary can bypass it.
pub struct AccessGate<S: AccessCodeSource> {
    source: S,
}

impl<S: AccessCodeSource> AccessGate<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// `Ok(true)` iff `password` matches the current access code.
    pub async fn verify(&self, password: &str) -> Result<bool, AuthError> {
        let body = self.source.fetch().await?;
        let accepted = check_payload(&body, password)?;
        log::info!("auth: password {}", if accepted { "accepted" } else { "rejected" });
        Ok(accepted)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::auth::source::tests::{http_response, serve_once, test_client};
    use crate::auth::HttpAccessSource;

    struct Fixed(Result<&'static str, fn() -> AuthError>);

    #[async_trait]
    impl AccessCodeSource for Fixed {
        async fn fetch(&self) -> Result<String, AuthError> {
            match &self.0 {
                Ok(body) => Ok(body.to_string()),
                Err(make) => Err(make()),
            }
        }
    }

    #[test]
    fn matching_and_mismatching_passwords() {
        let body = r#"{"access_code": "open sesame"}"#;
        assert!(check_payload(body, "open sesame").unwrap());
        assert!(!check_payload(body, "open sesame ").unwrap());
        assert!(!check_payload(body, "").unwrap());
    }

    #[test]
    fn missing_or_empty_code_is_rejected() {
        for body in [
            r#"{}"#,
            r#"{"access_code": ""}"#,
            r#"{"access_code": null}"#,
            r#"{"access_code": 0}"#,
            r#"{"access_code": false}"#,
        ] {
            assert!(
                matches!(check_payload(body, ""), Err(AuthError::MissingAccessCode)),
                "{body}"
            );
        }
    }

    #[test]
    fn non_string_code_never_matches() {
        for body in [
            r#"{"access_code": 42}"#,
            r#"{"access_code": true}"#,
            r#"{"access_code": ["42"]}"#,
        ] {
            assert!(!check_payload(body, "42").unwrap(), "{body}");
        }
    }

    #[test]
    fn malformed_json_is_rejected() {
        for body in ["not json", "{\"access_code\":", "[\"access_code\"]", ""] {
            assert!(
                matches!(check_payload(body, "x"), Err(AuthError::MalformedPayload)),
                "{body:?}"
            );
        }
    }

    #[tokio::test]
    async fn gate_propagates_source_errors() {
        let gate = AccessGate::new(Fixed(Err(|| AuthError::Timeout)));
        assert!(matches!(gate.verify("pw").await, Err(AuthError::Timeout)));
    }

    #[tokio::test]
    async fn gate_accepts_matching_password() {
        let gate = AccessGate::new(Fixed(Ok(r#"{"access_code":"pw"}"#)));
        assert!(gate.verify("pw").await.unwrap());
        assert!(!gate.verify("nope").await.unwrap());
    }

    #[tokio::test]
    async fn http_500_is_not_authenticated_and_mentions_status() {
        let url = serve_once(http_response("500 Internal Server Error", "")).await;
        let gate = AccessGate::new(HttpAccessSource::with_client(
            url,
            test_client(Duration::from_secs(5)),
        ));

        let err = gate.verify("anything").await.unwrap_err();
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn http_200_with_valid_json_authenticates() {
        let url = serve_once(http_response("200 OK", r#"{"access_code":"letmein"}"#)).await;
        let gate = AccessGate::new(HttpAccessSource::with_client(
            url,
            test_client(Duration::from_secs(5)),
        ));
        assert!(gate.verify("letmein").await.unwrap());
    }

    #[tokio::test]
    async fn http_200_with_garbage_is_malformed() {
        let url = serve_once(http_response("200 OK", "<html>moved</html>")).await;
        let gate = AccessGate::new(HttpAccessSource::with_client(
            url,
            test_client(Duration::from_secs(5)),
        ));
        assert!(matches!(
            gate.verify("x").await,
            Err(AuthError::MalformedPayload)
        ));
    }
}
