use colored::Colorize;
use gqlnodes::{GraphQLError, GraphQLResponse, NodesError};
use serde_json::{json, Value};
use std::io::IsTerminal;

/// Output format selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    Human,
    Json,
}

/// Determine the output format based on the user's choice and terminal detection.
pub fn resolve_format(format: Option<Format>) -> Format {
    match format {
        Some(f) => f,
        None => {
            if std::io::stdout().is_terminal() {
                Format::Human
            } else {
                Format::Json
            }
        }
    }
}

/// Print the `data`/`errors` envelope as pretty JSON on stdout.
///
/// In human mode, GraphQL errors are also summarized on stderr.
pub fn print_response(response: &GraphQLResponse<Value>, format: Format) -> anyhow::Result<()> {
    let envelope = json!({
        "data": response.data,
        "errors": response.errors,
    });
    println!("{}", serde_json::to_string_pretty(&envelope)?);

    if format == Format::Human {
        if let Some(errors) = response.errors.as_deref().filter(|e| !e.is_empty()) {
            eprintln!(
                "{} response carries {} GraphQL error(s)",
                "warning:".yellow().bold(),
                errors.len()
            );
            print_errors(errors);
        }
    }
    Ok(())
}

/// Print what the error knows beyond its message: status, description, GraphQL errors.
pub fn print_failure(error: &NodesError) {
    if let Some(status) = error.status() {
        eprintln!("  {} {}", "status:".dimmed(), status);
    }
    if let Some(description) = error.description() {
        eprintln!("  {} {}", "description:".dimmed(), description);
    }
    if let Some(errors) = error.errors() {
        print_errors(errors);
    }
}

fn print_errors(errors: &[GraphQLError]) {
    for error in errors {
        let at = error
            .locations
            .iter()
            .map(|l| format!("{}:{}", l.line, l.column))
            .collect::<Vec<_>>()
            .join(", ");
        if at.is_empty() {
            eprintln!("  - {}", error.message);
        } else {
            eprintln!("  - {} (at {})", error.message, at);
        }
    }
}
