//! Questions about LogQL queries, answered from their syntax trees.
//!
//! Every entry point takes the query text, parses it with
//! [`logql_lens_syntax::parse`] and walks the result. Parsing never fails, so
//! none of these functions do either: a broken query simply yields fewer
//! results.

pub mod filter;
pub mod filters;
pub mod matchers;
pub mod node;
pub mod parser_stage;
pub mod query;
pub mod walker;

// Re-export key types for easier usage
pub use filter::{Filter, FilterOp, FilterType, ParseOperatorError};
pub use filters::{QueryFilters, query_filters};
pub use logql_lens_syntax::{SyntaxElement, SyntaxKind, parse};
pub use matchers::matchers_from_query;
pub use node::{GrammarNode, NodePosition};
pub use parser_stage::parser_from_query;
pub use query::{is_logs_query, is_valid_query, service_name_from_query};
pub use walker::{
    is_query_with_node, lhs_leaf_nodes, lhs_leaf_nodes_from_query, nodes_from_query,
    positions_in_node, walk,
};
