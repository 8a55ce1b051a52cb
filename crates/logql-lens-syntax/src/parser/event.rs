//! # Parser Events
//!
//! The parser does not build the tree directly. It emits a **flat sequence**
//! of events that the [`Sink`](super::sink::Sink) turns into a Rowan tree:
//!
//! ```text
//! Start(SELECTOR)
//!   Token(L_BRACE)
//!   Start(MATCHERS)
//!     Start(MATCHER)
//!       Token(IDENTIFIER)
//!       Token(EQ)
//!       Token(STRING)
//!     Finish
//!   Finish
//!   Token(R_BRACE)
//! Finish
//! ```
//!
//! Trivia never shows up as an event. The parser only sees significant
//! tokens and the sink interleaves whitespace and comments while building.
//!
//! ## Forward Parent Links
//!
//! The `forward_parent` field in `Start` handles cases where we need to wrap
//! an already-parsed node, e.g. the left operand of `a + b` or of
//! `x="1" and y="2"`. Instead of restructuring the event list, we store a link
//! that says "when you process me, also process that other Start first."

use crate::syntax_kind::SyntaxKind;

/// An event emitted by the parser during tree construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Begin a new composite node.
    ///
    /// If `forward_parent` is set it points to another `Start` event that
    /// should become this node's parent.
    Start {
        kind: SyntaxKind,
        forward_parent: Option<usize>,
    },

    /// Add the next significant token to the current node.
    ///
    /// `kind` is usually the lexer kind, but the grammar may remap it, e.g.
    /// an `IDENTIFIER` spelled `json` becomes `JSON` in a pipeline stage.
    Token { kind: SyntaxKind },

    /// Finish the current node.
    Finish,

    /// A placeholder that will be replaced by `Start`, or ignored if the
    /// marker was abandoned.
    Placeholder,
}

impl Event {
    /// Create a start event with no forward parent.
    pub fn start(kind: SyntaxKind) -> Self {
        Event::Start {
            kind,
            forward_parent: None,
        }
    }

    /// Create a token event.
    pub fn token(kind: SyntaxKind) -> Self {
        Event::Token { kind }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_start_creation() {
        let event = Event::start(SyntaxKind::SELECTOR);
        assert_eq!(
            event,
            Event::Start {
                kind: SyntaxKind::SELECTOR,
                forward_parent: None
            }
        );
    }

    #[test]
    fn event_token_creation() {
        let event = Event::token(SyntaxKind::JSON);
        assert_eq!(
            event,
            Event::Token {
                kind: SyntaxKind::JSON
            }
        );
    }
}
