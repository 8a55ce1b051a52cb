//! Structural questions about a whole query.

use logql_lens_syntax::{SyntaxElement, SyntaxKind};

use crate::node::{GrammarNode, NodePosition};
use crate::walker::{is_query_with_node, root_of, walk};

/// True if the query parses without any error node.
pub fn is_valid_query(query: &str) -> bool {
    !is_query_with_node(query, SyntaxKind::ERROR)
}

/// True for a log query: at least `{}` long and without metric expressions.
pub fn is_logs_query(query: &str) -> bool {
    query.trim().len() > 2 && !is_query_with_node(query, SyntaxKind::METRIC_EXPR)
}

/// The quoted value of the first matcher on `label`, quotes included.
pub fn service_name_from_query<'q>(query: &'q str, label: &str) -> Option<&'q str> {
    walk(&root_of(query), Some(&[SyntaxKind::MATCHER]))
        .into_iter()
        .find_map(|matcher| {
            let name = first_child(&matcher, SyntaxKind::IDENTIFIER)?;
            let value = first_child(&matcher, SyntaxKind::STRING)?;
            (name.extract_text(query) == label).then(|| value.extract_text(query))
        })
}

fn first_child(node: &SyntaxElement, kind: SyntaxKind) -> Option<NodePosition> {
    node.named_children()
        .into_iter()
        .find(|child| GrammarNode::kind(child) == kind)
        .map(NodePosition::from_node)
}
