//! Booker CLI binary.
//!
//! Issues one API call, or walks a paginated listing, and prints the result
//! as JSON. Configuration comes from `BOOKER_BASE_URL`, `BOOKER_CLIENT_ID`,
//! `BOOKER_CLIENT_SECRET` and `BOOKER_API_DEBUG`.

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use booker_sdk::client::Method;
use booker_sdk::{BookerClient, ClientConfig, PageRequest, TracingIssueLogger};
use clap::Parser;
use serde_json::{Map, Value};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "booker-cli", version, about = "Booker API CLI")]
struct Cli {
    /// HTTP method (GET, POST or PUT)
    method: String,

    /// Path relative to the base URL, e.g. /appointments
    path: String,

    /// Walk the listing in pages of this size
    #[arg(long)]
    page_size: Option<u32>,

    /// Stop after the first page
    #[arg(long, default_value_t = false, requires = "page_size")]
    first_page_only: bool,

    /// Request parameter as KEY=VALUE; repeatable
    #[arg(long = "param", value_parser = parse_param)]
    params: Vec<(String, Value)>,
}

/// Splits `KEY=VALUE`. The value is read as JSON when it parses, otherwise
/// kept as a string.
fn parse_param(raw: &str) -> Result<(String, Value)> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("expected KEY=VALUE, got {}", raw))?;
    if key.is_empty() {
        return Err(anyhow!("empty parameter name in {}", raw));
    }

    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::from(value));
    Ok((key.to_string(), value))
}

fn parse_method(raw: &str) -> Result<Method> {
    match raw.to_ascii_uppercase().as_str() {
        "GET" => Ok(Method::GET),
        "POST" => Ok(Method::POST),
        "PUT" => Ok(Method::PUT),
        other => Err(anyhow!("unsupported method {}", other)),
    }
}

async fn run(cli: Cli) -> Result<Value> {
    let method = parse_method(&cli.method)?;
    let params: Map<String, Value> = cli.params.into_iter().collect();

    let config = ClientConfig::from_env();
    tracing::info!("Using Booker API at {}", config.base_url);

    let client = BookerClient::new(config)
        .context("failed to create client")?
        .with_issue_logger(Arc::new(TracingIssueLogger));

    if let Some(page_size) = cli.page_size {
        let page = PageRequest {
            params,
            ..PageRequest::new(page_size)
        };
        let results = client
            .paginate_raw(method, &cli.path, &page, None, !cli.first_page_only)
            .await
            .with_context(|| format!("paginated request to {} failed", cli.path))?;
        tracing::info!("Fetched {} records", results.len());
        return Ok(Value::Array(results));
    }

    let (query, body) = if method == Method::GET {
        (Some(params), None)
    } else {
        (None, Some(Value::Object(params)))
    };

    client
        .execute(method, &cli.path, query, body, None)
        .await
        .with_context(|| format!("request to {} failed", cli.path))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,booker_sdk=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let result = run(cli).await?;

    println!("{}", serde_json::to_string_pretty(&result)?);

    Ok(())
}
