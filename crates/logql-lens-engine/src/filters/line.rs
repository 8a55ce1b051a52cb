//! Line and pattern filters: `|= "x"`, `!~ "y"`, `|> "<_> z"`.

use log::warn;
use logql_lens_syntax::{SyntaxElement, SyntaxKind};

use super::types::{LineFilter, LineFilterOp, PatternFilter, PatternFilterOp};
use crate::node::{GrammarNode, NodePosition};
use crate::walker::{positions_in_node, walk};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    Line(LineFilterOp),
    Pattern(PatternFilterOp),
}

/// The first operator present in the filter, checked in a fixed order.
fn operator(filter: &SyntaxElement) -> Option<Operator> {
    let candidates = [
        (SyntaxKind::PIPE_EXACT, Operator::Line(LineFilterOp::Match)),
        (SyntaxKind::NEQ, Operator::Line(LineFilterOp::NegativeMatch)),
        (SyntaxKind::NRE, Operator::Line(LineFilterOp::NegativeRegex)),
        (SyntaxKind::PIPE_MATCH, Operator::Line(LineFilterOp::Regex)),
        (SyntaxKind::PIPE_PATTERN, Operator::Pattern(PatternFilterOp::Match)),
        (SyntaxKind::NPA, Operator::Pattern(PatternFilterOp::NegativeMatch)),
    ];

    candidates
        .into_iter()
        .find(|(kind, _)| !positions_in_node(filter, *kind).is_empty())
        .map(|(_, op)| op)
}

/// String values of a line filter and its chained `or` filters.
///
/// A level holding an `ip(...)` filter contributes nothing.
fn values(filter: &SyntaxElement) -> Vec<SyntaxElement> {
    let mut values = Vec::new();
    let mut level = Some(filter.clone());

    while let Some(node) = level {
        let children = node.named_children();
        let has_filter_op = children
            .iter()
            .any(|child| GrammarNode::kind(child) == SyntaxKind::FILTER_OP);
        let string = children
            .iter()
            .find(|child| GrammarNode::kind(*child) == SyntaxKind::STRING);
        if let Some(string) = string
            && !has_filter_op
        {
            values.push(string.clone());
        }

        level = children
            .into_iter()
            .find(|child| GrammarNode::kind(child) == SyntaxKind::OR_FILTER);
    }

    values
}

pub(super) fn line_and_pattern_filters(
    root: &SyntaxElement,
    query: &str,
) -> (Vec<LineFilter>, Vec<PatternFilter>) {
    let mut line_filters = Vec::new();
    let mut pattern_filters = Vec::new();

    for (index, filter) in walk(root, Some(&[SyntaxKind::LINE_FILTER]))
        .into_iter()
        .enumerate()
    {
        let operator = operator(&filter);

        for value in values(&filter) {
            let value = NodePosition::from_node(value);
            let quote = query.get(value.from..value.from + 1).unwrap_or("");
            let text = value.extract_unquoted(query);
            if text.is_empty() {
                continue;
            }

            match operator {
                Some(Operator::Line(op)) => {
                    line_filters.push(line_filter(text, quote, index, op));
                }
                Some(Operator::Pattern(op)) => {
                    pattern_filters.push(PatternFilter {
                        operator: op,
                        value: text.replace("\\\"", "\""),
                    });
                }
                None => {
                    let filter = NodePosition::from_node(filter.clone());
                    warn!("unknown line filter: {}", filter.extract_text(query));
                }
            }
        }
    }

    (line_filters, pattern_filters)
}

/// Double-quoted values are stored unescaped, backticked ones as is.
fn line_filter(text: &str, quote: &str, index: usize, op: LineFilterOp) -> LineFilter {
    let case_insensitive = op.is_regex() && text.contains("(?i)");

    let mut value = if quote != "\"" {
        text.to_string()
    } else if op.is_regex() {
        text.replace("\\\\", "\\")
    } else {
        text.replace("\\\\\"", "\"").replace("\\\\", "\\")
    };

    let key = if case_insensitive {
        value = value.replacen("(?i)", "", 1);
        "caseInsensitive".to_string()
    } else {
        format!("caseSensitive,{index}")
    };

    LineFilter {
        key,
        operator: op,
        value,
    }
}
