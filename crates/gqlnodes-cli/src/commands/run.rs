use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::Args;
use gqlnodes::{Client, GraphQLRequest, Variable};
use tokio::io::AsyncReadExt;

use crate::output::{self, Format};

/// Send a document to an endpoint and print the response.
///
/// Examples:
///   gqlnodes run --url https://api.example.com/graphql --query '{ viewer { login } }'
///   gqlnodes run --file query.graphql --variables '{"login":"octocat"}' -H 'Authorization: Bearer t'
#[derive(Debug, Args)]
pub struct RunCmd {
    /// GraphQL endpoint URL.
    #[arg(long, env = "GQLNODES_URL")]
    pub url: String,
    /// Document text.
    #[arg(long, conflicts_with = "file", required_unless_present = "file")]
    pub query: Option<String>,
    /// Read the document from a file ("-" for stdin).
    #[arg(long)]
    pub file: Option<PathBuf>,
    /// Variables as a JSON object.
    #[arg(long)]
    pub variables: Option<String>,
    /// Extra request header as `Name: value`. Repeatable.
    #[arg(short = 'H', long = "header", value_parser = parse_header)]
    pub headers: Vec<(String, String)>,
    /// Request timeout in seconds.
    #[arg(long)]
    pub timeout: Option<u64>,
}

pub async fn run(cmd: RunCmd, format: Format) -> anyhow::Result<()> {
    let document = match (cmd.query, cmd.file) {
        (Some(query), _) => query,
        (None, Some(path)) => read_document(&path).await?,
        (None, None) => anyhow::bail!("one of --query or --file is required"),
    };
    let variables = parse_variables(cmd.variables.as_deref())?;

    let request = GraphQLRequest::builder()
        .url(cmd.url)
        .headers(cmd.headers)
        .document(document)
        .variables(variables)
        .build()?;
    tracing::debug!(%request, "sending document");

    let mut builder = Client::builder();
    if let Some(secs) = cmd.timeout {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    let client = builder.build()?;

    let response = match client.execute::<serde_json::Value>(&request).await {
        Ok(response) => response,
        Err(e) => {
            output::print_failure(&e);
            return Err(e.into());
        }
    };
    output::print_response(&response, format)
}

async fn read_document(path: &Path) -> anyhow::Result<String> {
    if path.as_os_str() == "-" {
        let mut document = String::new();
        tokio::io::stdin()
            .read_to_string(&mut document)
            .await
            .context("failed to read document from stdin")?;
        return Ok(document);
    }
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read document from {}", path.display()))
}

fn parse_variables(raw: Option<&str>) -> anyhow::Result<Vec<Variable>> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };
    let value: serde_json::Value =
        serde_json::from_str(raw).context("--variables is not valid JSON")?;
    match value {
        serde_json::Value::Object(map) => Ok(map
            .into_iter()
            .map(|(name, value)| Variable::new(name, value))
            .collect()),
        _ => anyhow::bail!("--variables must be a JSON object"),
    }
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected `Name: value`, got '{raw}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("header name is empty in '{raw}'"));
    }
    Ok((name.to_string(), value.trim().to_string()))
}
