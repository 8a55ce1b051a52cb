//! Pre-order traversal of parsed queries.

use log::debug;
use logql_lens_syntax::{SyntaxElement, SyntaxKind, parse};

use crate::node::{GrammarNode, NodePosition};

/// Collect every named node under `root` (itself included) in document order,
/// keeping only `kinds` when given.
///
/// Filtering never prunes: children of a skipped node are still visited.
pub fn walk<N: GrammarNode>(root: &N, kinds: Option<&[SyntaxKind]>) -> Vec<N> {
    let mut found = Vec::new();
    let mut stack = vec![root.clone()];

    while let Some(node) = stack.pop() {
        let children = node.named_children();
        if kinds.is_none_or(|kinds| kinds.contains(&node.kind())) {
            found.push(node);
        }
        stack.extend(children.into_iter().rev());
    }

    found
}

/// Parse `query` and walk the whole tree.
pub fn nodes_from_query(query: &str, kinds: Option<&[SyntaxKind]>) -> Vec<SyntaxElement> {
    let nodes = walk(&root_of(query), kinds);
    debug!("found {} nodes of {:?} in query", nodes.len(), kinds);
    nodes
}

/// Positions of `kind` in `node` or below it, in document order.
///
/// A matching node is not searched any further.
pub fn positions_in_node<N: GrammarNode>(node: &N, kind: SyntaxKind) -> Vec<NodePosition<N>> {
    if node.kind() == kind {
        return vec![NodePosition::from_node(node.clone())];
    }

    node.named_children()
        .iter()
        .flat_map(|child| positions_in_node(child, kind))
        .collect()
}

/// For every outermost node of `kinds`, follow first children while they are
/// of `kinds` too and return the deepest one.
///
/// Used to get the left-most filter of `a="1" and b="2"` style chains.
pub fn lhs_leaf_nodes<N: GrammarNode>(root: &N, kinds: &[SyntaxKind]) -> Vec<N> {
    let mut found = Vec::new();
    let mut stack = vec![root.clone()];

    while let Some(node) = stack.pop() {
        if kinds.contains(&node.kind()) {
            let mut current = node.clone();
            let mut leaf = None;
            while let Some(first) = current.named_children().into_iter().next() {
                if !kinds.contains(&first.kind()) {
                    leaf = Some(current);
                    break;
                }
                current = first;
            }
            if let Some(leaf) = leaf {
                found.push(leaf);
                continue;
            }
        }
        stack.extend(node.named_children().into_iter().rev());
    }

    found
}

pub fn lhs_leaf_nodes_from_query(query: &str, kinds: &[SyntaxKind]) -> Vec<SyntaxElement> {
    lhs_leaf_nodes(&root_of(query), kinds)
}

/// True if parsing `query` yields at least one named node of `kind`.
pub fn is_query_with_node(query: &str, kind: SyntaxKind) -> bool {
    kind.is_named()
        && parse(query)
            .descendants_with_tokens()
            .any(|element| element.kind() == kind)
}

pub(crate) fn root_of(query: &str) -> SyntaxElement {
    SyntaxElement::Node(parse(query))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn kinds(nodes: &[SyntaxElement]) -> Vec<SyntaxKind> {
        nodes.iter().map(GrammarNode::kind).collect()
    }

    #[test]
    fn walks_simple_selector_in_pre_order() {
        let nodes = nodes_from_query(r#"{foo="bar"}"#, None);
        assert_eq!(
            kinds(&nodes),
            vec![
                SyntaxKind::LOG_QL,
                SyntaxKind::EXPR,
                SyntaxKind::LOG_EXPR,
                SyntaxKind::SELECTOR,
                SyntaxKind::MATCHERS,
                SyntaxKind::MATCHER,
                SyntaxKind::IDENTIFIER,
                SyntaxKind::EQ,
                SyntaxKind::STRING,
            ]
        );
    }

    #[test]
    fn root_spans_the_whole_query() {
        let query = r#"  {foo="bar"} "#;
        let nodes = nodes_from_query(query, None);
        assert_eq!(nodes[0].span(), 0..query.len());
    }

    #[rstest]
    #[case(r#"{foo="bar"}"#)]
    #[case(r#"{a="b", c!~"d"} |= "x" | json | y > 2"#)]
    #[case(r#"sum by (a) (rate({a="b"}[5m])) / 2"#)]
    #[case(r#"{broken="#)]
    fn filtering_never_reorders(#[case] query: &str) {
        let wanted = [SyntaxKind::MATCHER, SyntaxKind::STRING, SyntaxKind::ERROR];
        let spans = |nodes: Vec<SyntaxElement>| -> Vec<_> {
            nodes.iter().map(|n| (GrammarNode::kind(n), n.span())).collect()
        };
        let expected: Vec<_> = spans(nodes_from_query(query, None))
            .into_iter()
            .filter(|(kind, _)| wanted.contains(kind))
            .collect();
        assert_eq!(spans(nodes_from_query(query, Some(&wanted))), expected);
    }

    #[test]
    fn traversal_is_deterministic() {
        let query = r#"{a="b"} | logfmt | c=~"d.*" or e="f""#;
        let spans = |nodes: Vec<SyntaxElement>| -> Vec<_> {
            nodes.iter().map(|n| (GrammarNode::kind(n), n.span())).collect()
        };
        assert_eq!(
            spans(nodes_from_query(query, None)),
            spans(nodes_from_query(query, None))
        );
    }

    #[test]
    fn filtered_out_ancestors_do_not_hide_children() {
        let nodes = nodes_from_query(r#"{a="1"} | b="2""#, Some(&[SyntaxKind::IDENTIFIER]));
        assert_eq!(nodes.len(), 2);
    }

    #[test]
    fn positions_stop_at_the_first_match() {
        let root = root_of(r#"{a="1"} | b="2" and c="3""#);
        let filters = positions_in_node(&root, SyntaxKind::LABEL_FILTER);
        assert_eq!(filters.len(), 1);
        assert_eq!(
            filters[0].extract_text(r#"{a="1"} | b="2" and c="3""#),
            r#"b="2" and c="3""#
        );
    }

    #[test]
    fn lhs_leaf_takes_the_left_most_filter() {
        let query = r#"{a="1"} | b="2" and c="3" | d="4""#;
        let leaves = lhs_leaf_nodes_from_query(query, &[SyntaxKind::LABEL_FILTER]);
        let texts: Vec<_> = leaves
            .into_iter()
            .map(|n| NodePosition::from_node(n).extract_text(query).to_string())
            .collect();
        assert_eq!(texts, vec![r#"b="2""#, r#"d="4""#]);
    }

    #[test]
    fn query_with_node() {
        assert!(is_query_with_node(r#"{a="b"} | json"#, SyntaxKind::JSON));
        assert!(!is_query_with_node(r#"{json="b"}"#, SyntaxKind::JSON));
        assert!(!is_query_with_node(r#"{a="b"}"#, SyntaxKind::L_BRACE));
    }
}
