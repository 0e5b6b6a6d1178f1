//! Common utilities shared by both service clients.
//!
//! HTTP client creation, settings validation, URL building and status
//! handling live here so the v2 and v3 clients stay symmetrical.

use reqwest::{Client, RequestBuilder, Response, Url};
use std::time::Duration;

use crate::config::ConnectionSettings;
use crate::error::{Error, Result};

/// Connect timeout for both services.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Creates a configured HTTP client.
///
/// Without a request timeout a stalled call blocks its caller indefinitely.
pub fn create_http_client(timeout: Option<Duration>) -> Result<Client> {
    let mut builder = Client::builder().connect_timeout(CONNECT_TIMEOUT);
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    Ok(builder.build()?)
}

/// Validates connection settings before any request is made.
pub fn validate_settings(settings: &ConnectionSettings) -> Result<()> {
    if settings.scheme != "http" && settings.scheme != "https" {
        return Err(Error::Config(format!(
            "Invalid scheme '{}'. Allowed: http, https",
            settings.scheme
        )));
    }

    if settings.host.trim().is_empty() {
        return Err(Error::Config("host cannot be empty".to_string()));
    }

    Ok(())
}

/// Appends percent-encoded path segments to a base URL.
pub fn endpoint(base: &str, segments: &[&str]) -> Result<Url> {
    let mut url =
        Url::parse(base).map_err(|e| Error::Config(format!("Invalid URL '{}': {}", base, e)))?;
    url.path_segments_mut()
        .map_err(|()| Error::Config(format!("URL '{}' cannot take a path", base)))?
        .extend(segments);
    Ok(url)
}

/// Adds the OAuth token header to a request.
pub fn authorize(request: RequestBuilder, token: &str) -> RequestBuilder {
    request
        .header("Authorization", format!("OAuth {}", token))
        .header("Accept", "application/json")
}

/// Handles HTTP error responses and returns appropriate errors.
pub fn handle_http_error(status_code: u16, body: &str, service: &'static str) -> Error {
    match status_code {
        401 | 403 => Error::Authentication(format!("{} auth failed: {}", service, body)),
        404 => Error::NotFound(format!("{}: {}", service, body)),
        _ => Error::Api {
            service,
            status: status_code,
            body: body.to_string(),
        },
    }
}

/// Passes successful responses through and turns the rest into errors.
pub async fn check_status(response: Response, service: &'static str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(handle_http_error(status.as_u16(), &body, service))
}

/// Decodes a JSON response body.
pub async fn decode<T: serde::de::DeserializeOwned>(
    response: Response,
    what: &str,
) -> Result<T> {
    response
        .json()
        .await
        .map_err(|e| Error::Decode(format!("{}: {}", what, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_http_error_auth() {
        let err = handle_http_error(401, "unauthorized", "v2");
        assert!(matches!(err, Error::Authentication(_)));
        let err = handle_http_error(403, "forbidden", "v3");
        assert!(matches!(err, Error::Authentication(_)));
    }

    #[test]
    fn test_handle_http_error_not_found() {
        let err = handle_http_error(404, "Queue not found", "v2");
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_handle_http_error_other() {
        let err = handle_http_error(503, "unavailable", "v3");
        assert!(matches!(err, Error::Api { status: 503, service: "v3", .. }));
    }

    #[test]
    fn test_validate_settings() {
        assert!(validate_settings(&ConnectionSettings::source()).is_ok());

        let mut settings = ConnectionSettings::destination();
        settings.scheme = "file".to_string();
        assert!(validate_settings(&settings).is_err());

        let mut settings = ConnectionSettings::destination();
        settings.host = "  ".to_string();
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let url = endpoint("https://mq.example.com/1/projects/p", &["queues", "my queue/1"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://mq.example.com/1/projects/p/queues/my%20queue%2F1"
        );
    }

    #[test]
    fn test_endpoint_invalid_base() {
        assert!(endpoint("not a url", &["queues"]).is_err());
    }

    #[test]
    fn test_create_http_client() {
        let client = create_http_client(Some(Duration::from_secs(5))).unwrap();
        assert!(client.get("http://example.com").build().is_ok());
    }
}
