// ABOUTME: The Client struct that runs the content ingestion pipeline for a URL or an HTML string.
// ABOUTME: Sequences fetch, main-content location, sanitization and metadata extraction into a FetchResult.

use tracing::{debug, warn};
use url::Url;

use crate::dom::{body_html, parse_lenient};
use crate::error::IngestError;
use crate::locator::locate_with_threshold;
use crate::metadata::{extract_description, extract_title};
use crate::options::{ClientBuilder, Options};
use crate::resource::{fetch, FetchOptions};
use crate::result::FetchResult;
use crate::sanitize::{sanitize_with, SanitizeOptions};

/// The content ingestion client.
///
/// Holds no per-call state, so one client can serve any number of
/// concurrent calls for different URLs.
#[derive(Debug, Clone)]
pub struct Client {
    opts: Options,
    http_client: reqwest::Client,
}

/// Reject URLs the loader cannot fetch before any network I/O happens.
fn validate_url(url: &str, op: &str) -> Result<Url, IngestError> {
    if url.is_empty() {
        return Err(IngestError::invalid_url(url, op, None));
    }
    let parsed = Url::parse(url).map_err(|e| {
        IngestError::invalid_url(url, op, Some(anyhow::anyhow!("malformed URL: {}", e)))
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        scheme => Err(IngestError::invalid_url(
            url,
            op,
            Some(anyhow::anyhow!("scheme must be http or https, got {}", scheme)),
        )),
    }
}

impl Client {
    /// Create a new ClientBuilder for configuring the client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Create a new Client with the given options.
    ///
    /// The built HTTP client follows redirects up to `opts.max_redirects`,
    /// applies `opts.timeout` to the whole request and keeps no cookies.
    pub fn new(opts: Options) -> Result<Self, IngestError> {
        let http_client = match opts.http_client.clone() {
            Some(client) => client,
            None => reqwest::Client::builder()
                .redirect(reqwest::redirect::Policy::limited(opts.max_redirects))
                .user_agent(opts.user_agent.as_str())
                .timeout(opts.timeout)
                .gzip(true)
                .brotli(true)
                .deflate(true)
                .build()
                .map_err(|e| {
                    IngestError::connection(
                        "",
                        "NewClient",
                        Some(anyhow::anyhow!("failed to build HTTP client: {}", e)),
                    )
                })?,
        };

        Ok(Self { opts, http_client })
    }

    /// The options this client was built with.
    pub fn options(&self) -> &Options {
        &self.opts
    }

    /// Fetch `url` and return its sanitized main content with title and
    /// description.
    ///
    /// Fails with `RemoteError` on HTTP status >= 400, `EmptyContent` on a
    /// blank body and `NoUsableContent` when nothing survives sanitization.
    pub async fn fetch_and_sanitize(&self, url: &str) -> Result<FetchResult, IngestError> {
        const OP: &str = "FetchAndSanitize";
        validate_url(url, OP)?;

        let fetch_opts = FetchOptions {
            user_agent: self.opts.user_agent.clone(),
            accept: self.opts.accept.clone(),
            headers: self.opts.headers.clone(),
        };

        let raw = match fetch(&self.http_client, url, &fetch_opts).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(url, error = %e, "fetch failed");
                return Err(e);
            }
        };

        let base_url = if self.opts.absolutize_urls {
            Url::parse(&raw.final_url).ok()
        } else {
            None
        };

        self.process(&raw.text(), url, base_url, OP)
    }

    /// Run the pipeline on markup that was already fetched.
    ///
    /// `url` is only used in errors and, with `absolutize_urls`, as the base
    /// for relative links.
    pub fn ingest_html(&self, html: &str, url: &str) -> Result<FetchResult, IngestError> {
        const OP: &str = "IngestHTML";
        if html.trim().is_empty() {
            return Err(IngestError::empty_content(url, OP));
        }

        let base_url = if self.opts.absolutize_urls {
            Some(validate_url(url, OP)?)
        } else {
            None
        };

        self.process(html, url, base_url, OP)
    }

    fn process(
        &self,
        html: &str,
        url: &str,
        base_url: Option<Url>,
        op: &str,
    ) -> Result<FetchResult, IngestError> {
        let doc = parse_lenient(html);

        // Only the located subtree is sanitized, never the whole page.
        let located = locate_with_threshold(&doc, self.opts.min_content_chars);
        debug!(url, by = ?located.by, bytes = located.html.len(), "located content");
        let content = if located.html.trim().is_empty() {
            debug!(url, "located content blank; using body");
            body_html(&doc)
        } else {
            located.html
        };

        let sanitize_opts = SanitizeOptions {
            policy: self.opts.policy,
            base_url,
        };
        let sanitized = sanitize_with(&content, &sanitize_opts);
        if sanitized.trim().is_empty() {
            warn!(url, policy = %self.opts.policy, "no usable content after sanitization");
            return Err(IngestError::no_usable_content(url, op));
        }

        Ok(FetchResult {
            title: extract_title(&doc),
            description: extract_description(&doc),
            html: sanitized,
        })
    }
}
