// ABOUTME: Main library entry point for the portal content ingestion pipeline.
// ABOUTME: Re-exports the public API: Client, ClientBuilder, FetchResult, IngestError, FailureKind, Options.

//! Remote content ingestion for portal posts.
//!
//! Given a URL, the pipeline fetches the page, locates its main content with
//! an ordered structural heuristic, sanitizes that content against script
//! injection and returns it together with the page title and description.
//!
//! # Example
//!
//! ```no_run
//! use portal_ingest::{Client, IngestError};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), IngestError> {
//!     let client = Client::builder().build()?;
//!     let result = client.fetch_and_sanitize("https://example.com/news/1").await?;
//!     println!("{}", result.html);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod dom;
pub mod error;
pub mod locator;
pub mod metadata;
pub mod options;
pub mod resource;
pub mod result;
pub mod sanitize;

pub use crate::client::Client;
pub use crate::error::{FailureKind, IngestError};
pub use crate::locator::{locate, CANDIDATE_QUERIES};
pub use crate::metadata::{extract_description, extract_title};
pub use crate::options::{ClientBuilder, Options, SanitizePolicy};
pub use crate::result::FetchResult;
pub use crate::sanitize::{sanitize, sanitize_with, SanitizeOptions, DISALLOWED_TAGS};
