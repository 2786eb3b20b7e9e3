// ABOUTME: CLI binary for the portal content ingestion pipeline.
// ABOUTME: Fetches URLs or reads HTML files and prints sanitized content or the full result as JSON.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::Parser;
use portal_ingest::options::{DEFAULT_ACCEPT, DEFAULT_USER_AGENT};
use portal_ingest::{Client, FetchResult, SanitizePolicy};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ingest")]
#[command(about = "Fetch a page and extract sanitized post content")]
struct Args {
    /// Output the full result (title, description, html) as JSON
    #[arg(long = "json")]
    json_output: bool,

    /// Output file path (default: stdout)
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// HTML file to ingest instead of fetching (requires --url)
    #[arg(long = "html")]
    html: Option<PathBuf>,

    /// URL context for HTML file ingestion (required with --html)
    #[arg(long = "url")]
    url: Option<String>,

    /// Sanitizer policy: compatible (default) or strict
    #[arg(long = "policy", env = "INGEST_POLICY", default_value = "compatible")]
    policy: String,

    /// Resolve relative href/src values against the page URL
    #[arg(long = "absolutize", env = "INGEST_ABSOLUTIZE")]
    absolutize: bool,

    /// Request timeout in seconds
    #[arg(long = "timeout", env = "INGEST_TIMEOUT_SECS", default_value_t = 10)]
    timeout_secs: u64,

    /// User-Agent sent with the request
    #[arg(long = "user-agent", env = "INGEST_USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    user_agent: String,

    /// Accept header sent with the request
    #[arg(long = "accept", env = "INGEST_ACCEPT", default_value = DEFAULT_ACCEPT)]
    accept: String,

    /// Minimum visible characters for a content candidate
    #[arg(long = "min-chars", env = "INGEST_MIN_CHARS", default_value_t = 200)]
    min_chars: usize,

    /// Print elapsed time in ms to stderr
    #[arg(long = "timing")]
    timing: bool,

    /// Log pipeline steps to stderr (overridden by RUST_LOG)
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    /// URLs to ingest (fetch mode)
    #[arg()]
    urls: Vec<String>,
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "portal_ingest=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

/// JSON mode prints the full result(s); otherwise only the sanitized HTML.
fn format_output(results: &[FetchResult], json_output: bool) -> Result<String, serde_json::Error> {
    if json_output {
        if results.len() == 1 {
            serde_json::to_string_pretty(&results[0])
        } else {
            serde_json::to_string_pretty(results)
        }
    } else {
        Ok(results
            .iter()
            .map(|r| r.html.as_str())
            .collect::<Vec<_>>()
            .join("\n\n"))
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    if args.html.is_some() && args.url.is_none() {
        eprintln!("error: --url is required when using --html");
        return ExitCode::from(1);
    }

    if args.html.is_none() && args.urls.is_empty() {
        eprintln!("error: at least one URL is required, or use --html with --url");
        return ExitCode::from(1);
    }

    if args.html.is_some() && !args.urls.is_empty() {
        eprintln!("error: cannot use both --html and positional URLs");
        return ExitCode::from(1);
    }

    let client = match Client::builder()
        .policy(SanitizePolicy::from(args.policy.as_str()))
        .absolutize_urls(args.absolutize)
        .timeout(Duration::from_secs(args.timeout_secs))
        .user_agent(args.user_agent.clone())
        .accept(args.accept.clone())
        .min_content_chars(args.min_chars)
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::from(1);
        }
    };

    let start = Instant::now();
    let mut results: Vec<FetchResult> = Vec::new();
    let mut had_error = false;

    if let (Some(html_path), Some(url)) = (&args.html, &args.url) {
        match fs::read_to_string(html_path) {
            Ok(html_content) => match client.ingest_html(&html_content, url) {
                Ok(result) => results.push(result),
                Err(e) => {
                    eprintln!("error ingesting HTML: {}", e);
                    had_error = true;
                }
            },
            Err(e) => {
                eprintln!("error reading file {:?}: {}", html_path, e);
                had_error = true;
            }
        }
    } else {
        for url in &args.urls {
            match client.fetch_and_sanitize(url).await {
                Ok(result) => results.push(result),
                Err(e) => {
                    eprintln!("error ingesting {}: {}", url, e);
                    had_error = true;
                }
            }
        }
    }

    let elapsed = start.elapsed();

    if !results.is_empty() {
        match format_output(&results, args.json_output) {
            Ok(output_str) => {
                if let Some(output_path) = &args.output {
                    if let Err(e) = fs::write(output_path, &output_str) {
                        eprintln!("error writing to {:?}: {}", output_path, e);
                        had_error = true;
                    }
                } else {
                    println!("{}", output_str);
                }
            }
            Err(e) => {
                eprintln!("error encoding JSON: {}", e);
                had_error = true;
            }
        }
    }

    if args.timing {
        let _ = writeln!(io::stderr(), "elapsed: {}ms", elapsed.as_millis());
    }

    if had_error {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}
