use log::debug;
use logql_lens_syntax::SyntaxKind;

use crate::node::NodePosition;
use crate::walker::{root_of, walk};

/// The text of the first `json` or `logfmt` stage keyword, trimmed.
///
/// Does not say which of the two matched; callers compare the text.
pub fn parser_from_query(query: &str) -> Option<&str> {
    let parser = walk(&root_of(query), Some(&[SyntaxKind::JSON, SyntaxKind::LOGFMT]))
        .into_iter()
        .next()
        .map(|node| NodePosition::from_node(node).extract_text(query).trim());

    debug!("parser stage: {parser:?}");
    parser
}
