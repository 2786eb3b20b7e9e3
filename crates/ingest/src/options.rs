// ABOUTME: Configuration options for the ingestion client including SanitizePolicy, Options, and ClientBuilder.
// ABOUTME: ClientBuilder provides a fluent API for constructing Client instances with custom settings.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use crate::client::Client;
use crate::error::IngestError;

/// Default request timeout for the single outbound GET.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default identifying User-Agent.
pub const DEFAULT_USER_AGENT: &str = "PortalContentFetcher/1.0 (+department portal)";

/// Default Accept header, favoring HTML.
pub const DEFAULT_ACCEPT: &str = "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8";

/// Minimum visible text length for a candidate to win within its query.
pub const DEFAULT_MIN_CONTENT_CHARS: usize = 200;

/// How the sanitizer treats markup outside the known-dangerous set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SanitizePolicy {
    /// Remove disallowed tags with their subtree, strip `on*` handlers and
    /// `javascript:` URLs, keep everything else as-is.
    #[default]
    Compatible,
    /// Allow-list: unknown tags are unwrapped and only a fixed set of
    /// attributes and URL schemes survive.
    Strict,
}

impl fmt::Display for SanitizePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SanitizePolicy::Compatible => "compatible",
            SanitizePolicy::Strict => "strict",
        };
        write!(f, "{}", s)
    }
}

impl From<&str> for SanitizePolicy {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "strict" | "allow-list" | "allowlist" => SanitizePolicy::Strict,
            _ => SanitizePolicy::Compatible,
        }
    }
}

/// Configuration options for the ingestion client.
#[derive(Debug, Clone)]
pub struct Options {
    pub timeout: Duration,
    pub user_agent: String,
    pub accept: String,
    pub max_redirects: usize,
    pub min_content_chars: usize,
    pub policy: SanitizePolicy,
    pub absolutize_urls: bool,
    pub http_client: Option<reqwest::Client>,
    pub headers: HashMap<String, String>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept: DEFAULT_ACCEPT.to_string(),
            max_redirects: 10,
            min_content_chars: DEFAULT_MIN_CONTENT_CHARS,
            policy: SanitizePolicy::Compatible,
            absolutize_urls: false,
            http_client: None,
            headers: HashMap::new(),
        }
    }
}

/// Builder for constructing Client instances with custom configuration.
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    opts: Options,
}

impl ClientBuilder {
    /// Create a new ClientBuilder with default options.
    pub fn new() -> Self {
        Self {
            opts: Options::default(),
        }
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.opts.timeout = timeout;
        self
    }

    /// Set the User-Agent header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.opts.user_agent = user_agent.into();
        self
    }

    /// Set the Accept header.
    pub fn accept(mut self, accept: impl Into<String>) -> Self {
        self.opts.accept = accept.into();
        self
    }

    /// Set the maximum number of redirects followed.
    pub fn max_redirects(mut self, max: usize) -> Self {
        self.opts.max_redirects = max;
        self
    }

    /// Set the candidate text-length threshold used by the locator.
    pub fn min_content_chars(mut self, chars: usize) -> Self {
        self.opts.min_content_chars = chars;
        self
    }

    /// Set the sanitizer policy.
    pub fn policy(mut self, policy: SanitizePolicy) -> Self {
        self.opts.policy = policy;
        self
    }

    /// Resolve relative href/src values against the fetched page URL.
    pub fn absolutize_urls(mut self, enabled: bool) -> Self {
        self.opts.absolutize_urls = enabled;
        self
    }

    /// Use a custom HTTP client. Timeout, redirect and header settings are
    /// then the caller's responsibility.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.opts.http_client = Some(client);
        self
    }

    /// Add a custom header to all requests.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.opts.headers.insert(key.into(), value.into());
        self
    }

    /// Build the Client with the configured options.
    pub fn build(self) -> Result<Client, IngestError> {
        Client::new(self.opts)
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
