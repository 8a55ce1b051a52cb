use logql_lens_syntax::SyntaxKind;

use super::types::{FilterOperator, IndexedLabelFilter, LabelType};
use crate::node::NodePosition;
use crate::walker::{nodes_from_query, positions_in_node};

/// Indexed label filters of a stream selector, given the selector text alone.
///
/// Matchers with an empty name or value, or an operator a selector does not
/// accept, are skipped.
pub(super) fn label_filters(selector: &str) -> Vec<IndexedLabelFilter> {
    nodes_from_query(selector, Some(&[SyntaxKind::MATCHER]))
        .into_iter()
        .filter_map(|matcher| {
            let matcher = NodePosition::from_node(matcher);
            let key = positions_in_node(&matcher.node, SyntaxKind::IDENTIFIER)
                .into_iter()
                .next()?;
            let value = positions_in_node(&matcher.node, SyntaxKind::STRING)
                .into_iter()
                .next()?;

            let operator = selector
                .get(key.to..value.from)
                .and_then(|text| text.parse::<FilterOperator>().ok())
                .filter(|op| op.is_label_matcher())?;
            let key = key.extract_text(selector);
            let value = value.extract_unquoted(selector);
            if key.is_empty() || value.is_empty() {
                return None;
            }

            Some(IndexedLabelFilter {
                key: key.to_string(),
                operator,
                value: value.to_string(),
                label_type: LabelType::Indexed,
            })
        })
        .collect()
}
