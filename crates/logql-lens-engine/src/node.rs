//! Positions of syntax elements within the query text.
//!
//! The walker and the extractors only need three things from a tree node: its
//! kind, its byte span and its named children. [`GrammarNode`] captures that,
//! so the algorithms stay independent of rowan.

use std::ops::Range;

use logql_lens_syntax::{NodeOrToken, SyntaxElement, SyntaxKind};

/// A node of a parsed query, as seen by the walker.
pub trait GrammarNode: Clone {
    fn kind(&self) -> SyntaxKind;

    /// Half-open byte range `[from, to)` into the query.
    fn span(&self) -> Range<usize>;

    /// Children that carry meaning, in document order.
    ///
    /// Trivia and bare punctuation are left out.
    fn named_children(&self) -> Vec<Self>;
}

impl GrammarNode for SyntaxElement {
    fn kind(&self) -> SyntaxKind {
        match self {
            NodeOrToken::Node(node) => node.kind(),
            NodeOrToken::Token(token) => token.kind(),
        }
    }

    fn span(&self) -> Range<usize> {
        let range = match self {
            NodeOrToken::Node(node) => node.text_range(),
            NodeOrToken::Token(token) => token.text_range(),
        };
        usize::from(range.start())..usize::from(range.end())
    }

    fn named_children(&self) -> Vec<Self> {
        match self {
            NodeOrToken::Node(node) => node
                .children_with_tokens()
                .filter(|child| GrammarNode::kind(child).is_named())
                .collect(),
            NodeOrToken::Token(_) => Vec::new(),
        }
    }
}

/// A syntax node together with its span and kind.
///
/// Invariant: `from <= to`, both within the query the node was parsed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodePosition<N = SyntaxElement> {
    pub from: usize,
    pub to: usize,
    pub kind: SyntaxKind,
    pub node: N,
}

impl<N: GrammarNode> NodePosition<N> {
    pub fn from_node(node: N) -> Self {
        let span = node.span();
        Self {
            from: span.start,
            to: span.end,
            kind: node.kind(),
            node,
        }
    }
}

impl<N> NodePosition<N> {
    /// Closed containment: equal bounds count as contained.
    pub fn contains<M>(&self, other: &NodePosition<M>) -> bool {
        self.from <= other.from && self.to >= other.to
    }

    /// The query text covered by this node.
    ///
    /// Returns `""` if the span does not fit `query`.
    pub fn extract_text<'q>(&self, query: &'q str) -> &'q str {
        query.get(self.from..self.to).unwrap_or("")
    }

    /// The covered text without its first and last character, i.e. a string
    /// literal without its quotes.
    pub fn extract_unquoted<'q>(&self, query: &'q str) -> &'q str {
        if self.to < self.from + 2 {
            return "";
        }
        query.get(self.from + 1..self.to - 1).unwrap_or("")
    }
}
