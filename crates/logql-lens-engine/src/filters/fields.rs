//! Field filters: label filter stages on parsed fields and structured metadata.

use log::warn;
use logql_lens_syntax::{SyntaxElement, SyntaxKind};

use super::types::{FieldFilter, FilterOperator, LabelType, LabelTypes, ParserType};
use crate::node::NodePosition;
use crate::walker::{is_query_with_node, lhs_leaf_nodes, positions_in_node};

const STRING_OPERATORS: [(SyntaxKind, FilterOperator); 4] = [
    (SyntaxKind::EQ, FilterOperator::Equal),
    (SyntaxKind::NEQ, FilterOperator::NotEqual),
    (SyntaxKind::RE, FilterOperator::RegexEqual),
    (SyntaxKind::NRE, FilterOperator::RegexNotEqual),
];

const NUMERIC_OPERATORS: [(SyntaxKind, FilterOperator); 4] = [
    (SyntaxKind::LTE, FilterOperator::Lte),
    (SyntaxKind::LSS, FilterOperator::Lt),
    (SyntaxKind::GTE, FilterOperator::Gte),
    (SyntaxKind::GTR, FilterOperator::Gt),
];

const NUMERIC_VALUES: [SyntaxKind; 3] = [SyntaxKind::NUMBER, SyntaxKind::DURATION, SyntaxKind::BYTES];

/// The left-most filter of every label filter stage, skipping `__error__`
/// checks.
pub(super) fn field_filters(
    root: &SyntaxElement,
    query: &str,
    label_types: Option<&LabelTypes>,
) -> Vec<FieldFilter> {
    lhs_leaf_nodes(root, &[SyntaxKind::LABEL_FILTER])
        .into_iter()
        .map(NodePosition::from_node)
        .filter(|filter| !filter.extract_text(query).starts_with("__error__"))
        .filter_map(|filter| field_filter(&filter, query, label_types))
        .collect()
}

fn field_filter(
    filter: &NodePosition,
    query: &str,
    label_types: Option<&LabelTypes>,
) -> Option<FieldFilter> {
    let key = first_position(&filter.node, SyntaxKind::IDENTIFIER)?
        .extract_text(query)
        .to_string();

    let (operator, value) = match first_position(&filter.node, SyntaxKind::STRING) {
        Some(string) => {
            let operator = first_operator(&filter.node, &STRING_OPERATORS)?;
            (operator, string.extract_unquoted(query).to_string())
        }
        None => {
            let value = NUMERIC_VALUES
                .iter()
                .find_map(|kind| first_position(&filter.node, *kind))?;
            let Some(operator) = first_operator(&filter.node, &NUMERIC_OPERATORS) else {
                warn!("unknown numeric operator in {}", filter.extract_text(query));
                return None;
            };
            (operator, value.extract_text(query).to_string())
        }
    };

    let mut label_type = label_types.and_then(|types| types.get(&key));
    let parser = parser_before(query, filter.to);
    if parser.is_none() {
        label_type = Some(LabelType::StructuredMetadata);
    }

    Some(FieldFilter {
        key,
        operator,
        value,
        label_type: label_type.unwrap_or(LabelType::Parsed),
        parser,
    })
}

/// Which of `logfmt` and `json` appear in the query up to `end`.
fn parser_before(query: &str, end: usize) -> Option<ParserType> {
    let prefix = query.get(..end).unwrap_or(query);
    let logfmt = is_query_with_node(prefix, SyntaxKind::LOGFMT);
    let json = is_query_with_node(prefix, SyntaxKind::JSON);

    match (logfmt, json) {
        (true, true) => Some(ParserType::Mixed),
        (true, false) => Some(ParserType::Logfmt),
        (false, true) => Some(ParserType::Json),
        (false, false) => None,
    }
}

fn first_position(node: &SyntaxElement, kind: SyntaxKind) -> Option<NodePosition> {
    positions_in_node(node, kind).into_iter().next()
}

fn first_operator(
    node: &SyntaxElement,
    operators: &[(SyntaxKind, FilterOperator)],
) -> Option<FilterOperator> {
    operators
        .iter()
        .find(|(kind, _)| first_position(node, *kind).is_some())
        .map(|(_, op)| *op)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::walker::root_of;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn fields(query: &str) -> Vec<FieldFilter> {
        field_filters(&root_of(query), query, None)
    }

    fn field(
        key: &str,
        operator: FilterOperator,
        value: &str,
        label_type: LabelType,
        parser: Option<ParserType>,
    ) -> FieldFilter {
        FieldFilter {
            key: key.to_string(),
            operator,
            value: value.to_string(),
            label_type,
            parser,
        }
    }

    #[rstest]
    #[case(r#"{a="b"} | logfmt | level="error""#, FilterOperator::Equal)]
    #[case(r#"{a="b"} | logfmt | level!="error""#, FilterOperator::NotEqual)]
    #[case(r#"{a="b"} | logfmt | level=~"error""#, FilterOperator::RegexEqual)]
    #[case(r#"{a="b"} | logfmt | level!~"error""#, FilterOperator::RegexNotEqual)]
    fn string_operators(#[case] query: &str, #[case] operator: FilterOperator) {
        assert_eq!(
            fields(query),
            vec![field("level", operator, "error", LabelType::Parsed, Some(ParserType::Logfmt))]
        );
    }

    #[rstest]
    #[case(r#"{a="b"} | json | n > 5"#, FilterOperator::Gt, "5")]
    #[case(r#"{a="b"} | json | n >= 5"#, FilterOperator::Gte, "5")]
    #[case(r#"{a="b"} | json | n < 1.5"#, FilterOperator::Lt, "1.5")]
    #[case(r#"{a="b"} | json | n <= 10s"#, FilterOperator::Lte, "10s")]
    #[case(r#"{a="b"} | json | n > 20KB"#, FilterOperator::Gt, "20KB")]
    fn numeric_operators(
        #[case] query: &str,
        #[case] operator: FilterOperator,
        #[case] value: &str,
    ) {
        assert_eq!(
            fields(query),
            vec![field("n", operator, value, LabelType::Parsed, Some(ParserType::Json))]
        );
    }

    #[test]
    fn numeric_equality_is_skipped() {
        assert_eq!(fields(r#"{a="b"} | json | n == 5"#), vec![]);
    }

    #[test]
    fn without_parser_fields_are_metadata() {
        assert_eq!(
            fields(r#"{a="b"} | pod="x""#),
            vec![field(
                "pod",
                FilterOperator::Equal,
                "x",
                LabelType::StructuredMetadata,
                None
            )]
        );
    }

    #[test]
    fn parser_must_come_before_the_filter() {
        let query = r#"{a="b"} | pod="x" | json | level="info""#;
        let found = fields(query);
        assert_eq!(found[0].parser, None);
        assert_eq!(found[1].parser, Some(ParserType::Json));
    }

    #[test]
    fn mixed_parsers() {
        let query = r#"{a="b"} | json | logfmt | level="info""#;
        assert_eq!(fields(query)[0].parser, Some(ParserType::Mixed));
    }

    #[test]
    fn error_checks_are_skipped() {
        assert_eq!(fields(r#"{a="b"} | json | __error__="""#), vec![]);
    }

    #[test]
    fn only_the_left_most_of_a_chain() {
        let found = fields(r#"{a="b"} | logfmt | x="1" and y="2""#);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].key, "x");
    }

    #[test]
    fn label_types_override_parsed() {
        let types: LabelTypes = [("level", "S")].into_iter().collect();
        let query = r#"{a="b"} | logfmt | level="info""#;
        let found = field_filters(&root_of(query), query, Some(&types));
        assert_eq!(found[0].label_type, LabelType::StructuredMetadata);
        assert_eq!(found[0].parser, Some(ParserType::Logfmt));
    }
}
