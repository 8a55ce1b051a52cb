//! Subcommand implementations. Each returns the text to print.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, info};
use logql_lens_config::OutputFormat;
use logql_lens_engine::filters::{LabelTypes, QueryFilters};
use logql_lens_engine::{
    Filter, NodePosition, SyntaxKind, is_logs_query, is_query_with_node, is_valid_query,
    matchers_from_query, nodes_from_query, parser_from_query, query_filters,
    service_name_from_query,
};
use serde::Serialize;

/// The query argument, or standard input when it is `-`.
pub fn read_query(arg: &str) -> Result<String> {
    if arg != "-" {
        return Ok(arg.to_string());
    }

    let mut query = String::new();
    std::io::stdin()
        .read_to_string(&mut query)
        .context("Failed to read query from stdin")?;
    Ok(query.trim_end_matches(['\n', '\r']).to_string())
}

/// A TOML table of `label = "I" | "S" | "P"`.
pub fn load_label_types(path: &Path) -> Result<LabelTypes> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read label types from {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse label types in {}", path.display()))
}

#[derive(Debug, Serialize)]
struct NodeOutput {
    kind: String,
    from: usize,
    to: usize,
    text: String,
}

pub fn nodes(query: &str, kinds: &[SyntaxKind], format: OutputFormat) -> Result<String> {
    let kinds = (!kinds.is_empty()).then_some(kinds);
    let nodes: Vec<NodeOutput> = nodes_from_query(query, kinds)
        .into_iter()
        .map(|node| {
            let position = NodePosition::from_node(node);
            NodeOutput {
                kind: position.kind.to_string(),
                from: position.from,
                to: position.to,
                text: position.extract_text(query).to_string(),
            }
        })
        .collect();

    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&nodes)?),
        OutputFormat::Text => Ok(nodes
            .iter()
            .map(|n| format!("{}@{}..{} {:?}", n.kind, n.from, n.to, n.text))
            .collect::<Vec<_>>()
            .join("\n")),
    }
}

pub fn matchers(query: &str, format: OutputFormat) -> Result<String> {
    let filters = matchers_from_query(query);
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&filters)?),
        OutputFormat::Text => Ok(matchers_text(&filters)),
    }
}

fn matchers_text(filters: &[Filter]) -> String {
    filters
        .iter()
        .map(|filter| {
            let values: Vec<_> = filter.values.iter().map(|v| format!("{v:?}")).collect();
            format!(
                "{:?} {} {} {}",
                filter.filter_type,
                filter.key,
                filter.op,
                values.join(" ")
            )
            .trim_end()
            .to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn parser(query: &str, format: OutputFormat) -> Result<String> {
    let parser = parser_from_query(query);
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(
            &serde_json::json!({ "parser": parser }),
        )?),
        OutputFormat::Text => Ok(parser.unwrap_or("none").to_string()),
    }
}

pub fn filters(
    query: &str,
    label_types: Option<&LabelTypes>,
    format: OutputFormat,
) -> Result<String> {
    let filters = query_filters(query, label_types);
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&filters)?),
        OutputFormat::Text => Ok(filters_text(&filters)),
    }
}

fn filters_text(filters: &QueryFilters) -> String {
    let mut lines = Vec::new();
    for f in &filters.label_filters {
        lines.push(format!(
            "label   {} {} {:?} ({:?})",
            f.key, f.operator, f.value, f.label_type
        ));
    }
    for f in &filters.line_filters {
        lines.push(format!("line    {} {} {:?}", f.key, f.operator.as_str(), f.value));
    }
    for f in &filters.fields {
        let parser = f.parser.map_or("no parser", |p| p.as_str());
        lines.push(format!(
            "field   {} {} {:?} ({:?}, {})",
            f.key, f.operator, f.value, f.label_type, parser
        ));
    }
    for f in &filters.pattern_filters {
        lines.push(format!("pattern {} {:?}", f.operator.as_str(), f.value));
    }
    lines.join("\n")
}

pub fn check(query: &str, service_label: &str, format: OutputFormat) -> Result<String> {
    let valid = is_valid_query(query);
    let kind = if is_logs_query(query) {
        "logs"
    } else if is_query_with_node(query, SyntaxKind::METRIC_EXPR) {
        "metric"
    } else {
        "unknown"
    };
    let service = service_name_from_query(query, service_label);

    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&serde_json::json!({
            "valid": valid,
            "kind": kind,
            "service": service,
        }))?),
        OutputFormat::Text => Ok(format!(
            "valid: {valid}\nkind: {kind}\nservice: {}",
            service.unwrap_or("none")
        )),
    }
}

#[derive(Debug, Serialize)]
struct SavedQuery {
    file: PathBuf,
    line: usize,
    query: String,
    matchers: Vec<Filter>,
}

/// Run the matcher extractor over every query line of `files`.
///
/// Blank lines and `#` comments are skipped.
pub fn batch(files: &[PathBuf], format: OutputFormat) -> Result<String> {
    info!("running matchers over {} saved query files", files.len());

    let mut queries = Vec::new();
    for file in files {
        let content = std::fs::read_to_string(file)
            .with_context(|| format!("Failed to read saved queries from {}", file.display()))?;
        for (index, line) in content.lines().enumerate() {
            let query = line.trim();
            if query.is_empty() || query.starts_with('#') {
                continue;
            }
            queries.push(SavedQuery {
                file: file.clone(),
                line: index + 1,
                query: query.to_string(),
                matchers: matchers_from_query(query),
            });
        }
    }
    debug!("found {} saved queries", queries.len());

    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&queries)?),
        OutputFormat::Text => Ok(queries
            .iter()
            .map(|q| {
                let mut block = format!("{}:{}: {}", q.file.display(), q.line, q.query);
                for matcher in matchers_text(&q.matchers).lines() {
                    block.push_str("\n  ");
                    block.push_str(matcher);
                }
                block
            })
            .collect::<Vec<_>>()
            .join("\n")),
    }
}
