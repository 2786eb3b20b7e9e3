// ABOUTME: HTML document loader: issues the single outbound GET and validates the response.
// ABOUTME: Maps transport errors, HTTP >= 400, oversized and blank bodies to typed failures; decodes as UTF-8.

use std::collections::HashMap;

use bytes::Bytes;
use reqwest::header::{ACCEPT, USER_AGENT};
use tracing::debug;

use crate::error::IngestError;

/// Maximum allowed content length (10 MB).
pub const MAX_CONTENT_LENGTH: usize = 10 * 1024 * 1024;

const OP: &str = "Fetch";

/// Per-request headers for a fetch.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    pub user_agent: String,
    pub accept: String,
    pub headers: HashMap<String, String>,
}

/// A successfully fetched page body, before parsing.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub status: u16,
    pub url: String,
    pub final_url: String,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl RawDocument {
    /// Decode the body as UTF-8 regardless of any declared charset.
    ///
    /// Invalid sequences become U+FFFD and a leading BOM is dropped.
    pub fn text(&self) -> String {
        decode_utf8(&self.body)
    }
}

fn decode_utf8(body: &[u8]) -> String {
    let (decoded, had_errors) = encoding_rs::UTF_8.decode_with_bom_removal(body);
    if had_errors {
        debug!("body contained invalid UTF-8; replaced with U+FFFD");
    }
    decoded.into_owned()
}

/// Fetch `url` with a single GET.
///
/// Redirects are followed by the client's policy. Non-2xx statuses are not
/// transport errors; the status is inspected here instead.
pub async fn fetch(
    client: &reqwest::Client,
    url: &str,
    opts: &FetchOptions,
) -> Result<RawDocument, IngestError> {
    let mut request = client.get(url);
    if !opts.user_agent.is_empty() {
        request = request.header(USER_AGENT, opts.user_agent.as_str());
    }
    if !opts.accept.is_empty() {
        request = request.header(ACCEPT, opts.accept.as_str());
    }
    for (key, value) in &opts.headers {
        request = request.header(key.as_str(), value.as_str());
    }

    let response = request.send().await.map_err(|e| {
        let cause = if e.is_timeout() {
            anyhow::anyhow!("request timed out: {}", e)
        } else {
            anyhow::anyhow!("request failed: {}", e)
        };
        IngestError::connection(url, OP, Some(cause))
    })?;

    let status = response.status().as_u16();
    let final_url = response.url().to_string();
    debug!(url, final_url = %final_url, status, "received response");

    if status >= 400 {
        return Err(IngestError::remote(url, OP, status));
    }

    if let Some(len) = response.content_length() {
        if len as usize > MAX_CONTENT_LENGTH {
            return Err(IngestError::too_large(
                url,
                OP,
                Some(anyhow::anyhow!("content-length {} exceeds limit", len)),
            ));
        }
    }

    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_lowercase());

    let body = response.bytes().await.map_err(|e| {
        IngestError::connection(
            url,
            OP,
            Some(anyhow::anyhow!("failed to read body: {}", e)),
        )
    })?;

    if body.len() > MAX_CONTENT_LENGTH {
        return Err(IngestError::too_large(
            url,
            OP,
            Some(anyhow::anyhow!("body of {} bytes exceeds limit", body.len())),
        ));
    }

    let doc = RawDocument {
        status,
        url: url.to_string(),
        final_url,
        content_type,
        body,
    };

    if doc.text().trim().is_empty() {
        return Err(IngestError::empty_content(url, OP));
    }

    debug!(url, bytes = doc.body.len(), "fetched document");
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn create_test_client() -> reqwest::Client {
        reqwest::Client::builder().build().unwrap()
    }

    fn default_opts() -> FetchOptions {
        FetchOptions {
            user_agent: "test-agent".to_string(),
            accept: "text/html".to_string(),
            headers: HashMap::new(),
        }
    }

    #[tokio::test]
    async fn test_fetch_ok_utf8() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/test");
            then.status(200)
                .header("content-type", "text/html; charset=utf-8")
                .body("<p>你好</p>");
        });

        let result = fetch(&create_test_client(), &server.url("/test"), &default_opts()).await;
        mock.assert();

        let doc = result.expect("fetch should succeed");
        assert_eq!(doc.status, 200);
        assert_eq!(doc.text(), "<p>你好</p>");
        assert_eq!(doc.content_type.as_deref(), Some("text/html; charset=utf-8"));
    }

    #[tokio::test]
    async fn test_fetch_sends_identifying_headers() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/headers")
                .header("user-agent", "test-agent")
                .header("accept", "text/html")
                .header("x-extra", "1");
            then.status(200).body("<p>ok</p>");
        });

        let mut opts = default_opts();
        opts.headers.insert("x-extra".to_string(), "1".to_string());
        let result = fetch(&create_test_client(), &server.url("/headers"), &opts).await;
        mock.assert();
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_fetch_404_is_remote_error() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/notfound");
            then.status(404).body("not found");
        });

        let result = fetch(&create_test_client(), &server.url("/notfound"), &default_opts()).await;
        mock.assert();

        let err = result.expect_err("should fail on 404");
        assert!(err.is_remote());
        assert_eq!(err.status(), Some(404));
    }

    #[tokio::test]
    async fn test_fetch_500_is_remote_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/boom");
            then.status(503).body("<html><body>maintenance</body></html>");
        });

        let err = fetch(&create_test_client(), &server.url("/boom"), &default_opts())
            .await
            .expect_err("should fail on 503");
        assert_eq!(err.status(), Some(503));
    }

    #[tokio::test]
    async fn test_fetch_blank_body_is_empty_content() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/blank");
            then.status(200).body("  \n\t ");
        });

        let err = fetch(&create_test_client(), &server.url("/blank"), &default_opts())
            .await
            .expect_err("should fail on blank body");
        assert!(err.is_empty_content());
    }

    #[tokio::test]
    async fn test_fetch_refused_is_connection_failure() {
        // Bind then drop to get a port nothing listens on.
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let url = format!("http://127.0.0.1:{}/", port);

        let err = fetch(&create_test_client(), &url, &default_opts())
            .await
            .expect_err("nothing is listening");
        assert!(err.is_connection());
        assert!(std::error::Error::source(&err).is_some());
    }

    #[tokio::test]
    async fn test_fetch_follows_redirect() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/old");
            then.status(301).header("location", "/new");
        });
        server.mock(|when, then| {
            when.method(GET).path("/new");
            then.status(200).body("<p>moved</p>");
        });

        let doc = fetch(&create_test_client(), &server.url("/old"), &default_opts())
            .await
            .expect("redirect should be followed");
        assert!(doc.final_url.ends_with("/new"));
        assert_eq!(doc.text(), "<p>moved</p>");
    }

    #[test]
    fn test_max_content_length_constant() {
        assert_eq!(MAX_CONTENT_LENGTH, 10 * 1024 * 1024);
    }

    #[test]
    fn test_decode_ignores_declared_charset() {
        let body = "<meta charset=\"iso-8859-1\"><p>café</p>".as_bytes();
        assert_eq!(decode_utf8(body), "<meta charset=\"iso-8859-1\"><p>café</p>");
    }

    #[test]
    fn test_decode_replaces_invalid_bytes() {
        let body: &[u8] = &[0x63, 0x61, 0x66, 0xe9];
        assert_eq!(decode_utf8(body), "caf\u{FFFD}");
    }

    #[test]
    fn test_decode_strips_bom() {
        let body: &[u8] = &[0xEF, 0xBB, 0xBF, b'h', b'i'];
        assert_eq!(decode_utf8(body), "hi");
    }
}
