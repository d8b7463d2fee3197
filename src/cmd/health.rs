//! `stubtree health`: check the health of a running instance.
//!
//! Sends a `GET /health` request to the specified URL and displays
//! the response as formatted text or raw JSON.

use http_body_util::BodyExt;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;

use crate::cli::HealthArgs;
use crate::error::StubError;
use crate::health::HealthResponse;

pub async fn execute(args: HealthArgs) -> Result<(), StubError> {
    let url = format!("{}/health", args.url.trim_end_matches('/'));
    let uri: hyper::Uri = url
        .parse()
        .map_err(|e: hyper::http::uri::InvalidUri| StubError::UriParse {
            source: Box::new(e),
        })?;

    let connector = hyper_util::client::legacy::connect::HttpConnector::new();
    let client = Client::builder(TokioExecutor::new()).build(connector);

    let req = hyper::Request::builder()
        .uri(uri)
        .body(http_body_util::Full::new(bytes::Bytes::new()))
        .map_err(|e| StubError::HttpRequest {
            source: Box::new(e),
        })?;

    let response = tokio::time::timeout(std::time::Duration::from_secs(10), client.request(req))
        .await
        .map_err(|_| StubError::HttpRequest {
            source: "health check timed out after 10s".into(),
        })?
        .map_err(|e| StubError::HttpRequest {
            source: Box::new(e),
        })?;

    let status = response.status();
    let body = response
        .into_body()
        .collect()
        .await
        .map_err(|e| StubError::HttpRequest {
            source: Box::new(e),
        })?
        .to_bytes();

    if !status.is_success() {
        return Err(StubError::HealthCheckFailed(status));
    }

    if args.json {
        println!("{}", String::from_utf8_lossy(&body));
        return Ok(());
    }

    match serde_json::from_slice::<HealthResponse>(&body) {
        Ok(health) => print_report(&args.url, &health),
        Err(e) => {
            eprintln!("Failed to parse health response: {e}");
            println!("{}", String::from_utf8_lossy(&body));
        }
    }

    Ok(())
}

fn print_report(url: &str, health: &HealthResponse) {
    let mark = if health.status == "healthy" { "\u{2713}" } else { "\u{2717}" };
    println!("{mark} stubtree is {} ({url})", health.status);
    println!("  uptime:         {}", format_uptime(health.uptime_seconds));
    println!(
        "  config source:  {} ({})",
        health.config.source, health.config.location
    );
    println!(
        "  config version: {} (loaded {}s ago)",
        health.config.version.as_deref().unwrap_or("-"),
        health.config.loaded_ago_seconds
    );
    println!("  endpoints:      {}", health.config.endpoints);
    println!(
        "  requests:       {} matched, {} unmatched, {} failed",
        health.stats.requests_matched, health.stats.requests_unmatched, health.stats.requests_failed
    );
    println!("  config loads:   {}", health.stats.config_loads);
    if let Some(error) = &health.config.error {
        println!("\n{error}");
    }
}

fn format_uptime(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{hours}h {minutes}m {secs}s")
    } else if minutes > 0 {
        format!("{minutes}m {secs}s")
    } else {
        format!("{secs}s")
    }
}
