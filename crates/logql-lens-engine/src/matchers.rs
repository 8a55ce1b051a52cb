//! Label matcher extraction.
//!
//! Matchers inside the first stream selector are indexed labels. Matchers
//! anywhere else (label filter stages, `drop`/`keep` lists) are not.

use log::debug;
use logql_lens_syntax::{SyntaxElement, SyntaxKind};

use crate::filter::{Filter, FilterOp, FilterType};
use crate::node::NodePosition;
use crate::walker::{positions_in_node, root_of, walk};

/// Extract every label matcher of `query`, in document order.
///
/// Returns nothing for a query without a stream selector.
pub fn matchers_from_query(query: &str) -> Vec<Filter> {
    let root = root_of(query);

    let Some(selector) = walk(&root, Some(&[SyntaxKind::SELECTOR]))
        .into_iter()
        .next()
    else {
        debug!("no stream selector, skipping matcher extraction");
        return Vec::new();
    };
    let selector = NodePosition::from_node(selector);

    let filters: Vec<Filter> = walk(&root, Some(&[SyntaxKind::MATCHER]))
        .into_iter()
        .filter_map(|matcher| filter_from_matcher(query, &selector, matcher))
        .collect();

    debug!("extracted {} matchers", filters.len());
    filters
}

fn filter_from_matcher(
    query: &str,
    selector: &NodePosition,
    matcher: SyntaxElement,
) -> Option<Filter> {
    let matcher = NodePosition::from_node(matcher);

    let Some(identifier) = positions_in_node(&matcher.node, SyntaxKind::IDENTIFIER)
        .into_iter()
        .next()
    else {
        debug!("matcher at {}..{} has no label name", matcher.from, matcher.to);
        return None;
    };

    let strings = positions_in_node(&matcher.node, SyntaxKind::STRING);
    let values = strings
        .iter()
        .map(|value| value.extract_unquoted(query).to_string())
        .collect();

    // Without a value the operator runs to the end of the matcher
    let op_end = strings.first().map_or(matcher.to, |value| value.from);
    let op_text = query.get(identifier.to..op_end).unwrap_or("");

    let filter_type = if selector.contains(&matcher) {
        FilterType::IndexedLabel
    } else {
        FilterType::NonIndexedLabel
    };

    Some(Filter {
        key: identifier.extract_text(query).to_string(),
        op: FilterOp::from_operator_text(op_text),
        values,
        filter_type,
    })
}
