//! Drilldown filters: the parts of a log query a drilldown UI lets users
//! toggle one at a time.
//!
//! [`query_filters`] splits a query into its indexed label filters (the
//! stream selector), line filters, pattern filters and field filters.
//! Anything it cannot classify is skipped with a warning rather than failing
//! the whole extraction.

mod fields;
mod labels;
mod line;
mod types;

pub use types::{
    FieldFilter, FilterOperator, IndexedLabelFilter, LabelType, LabelTypes, LineFilter,
    LineFilterOp, ParserType, PatternFilter, PatternFilterOp, QueryFilters,
};

use log::debug;
use logql_lens_syntax::SyntaxKind;

use crate::node::NodePosition;
use crate::walker::{root_of, walk};

/// Split `query` into drilldown filters.
///
/// `label_types` maps label names to the `I`/`S`/`P` codes Loki reports and
/// decides the type of field filters whose name it knows. A query without a
/// stream selector yields no filters at all.
pub fn query_filters(query: &str, label_types: Option<&LabelTypes>) -> QueryFilters {
    let root = root_of(query);

    let Some(selector) = walk(&root, Some(&[SyntaxKind::SELECTOR]))
        .into_iter()
        .next()
    else {
        debug!("no stream selector in query");
        return QueryFilters::default();
    };
    let selector = NodePosition::from_node(selector);

    let (line_filters, pattern_filters) = line::line_and_pattern_filters(&root, query);
    let filters = QueryFilters {
        label_filters: labels::label_filters(selector.extract_text(query)),
        line_filters,
        fields: fields::field_filters(&root, query, label_types),
        pattern_filters,
    };

    debug!(
        "query filters: {} labels, {} line, {} fields, {} patterns",
        filters.label_filters.len(),
        filters.line_filters.len(),
        filters.fields.len(),
        filters.pattern_filters.len()
    );
    filters
}
