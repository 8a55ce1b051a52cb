//! Sink for converting parser events into a Rowan green tree.
//!
//! Trivia is attached here. Whitespace and comments that precede a node go
//! into the enclosing node, so every child span starts and ends on a
//! significant token. The root node takes whatever trivia is left at the
//! edges, which makes it span the whole query.

use rowan::GreenNodeBuilder;

use crate::lexer::Token;
use crate::parser::event::Event;
use crate::syntax_kind::{SyntaxKind, SyntaxNode};

/// Converts parser events and tokens into a Rowan syntax tree.
pub struct Sink<'t, 'input> {
    builder: GreenNodeBuilder<'static>,
    /// All lexer tokens, trivia included.
    tokens: &'t [Token<'input>],
    cursor: usize,
    events: Vec<Event>,
    depth: usize,
}

impl<'t, 'input> Sink<'t, 'input> {
    /// Create a new sink over the full token stream.
    pub fn new(tokens: &'t [Token<'input>], events: Vec<Event>) -> Self {
        Self {
            builder: GreenNodeBuilder::new(),
            tokens,
            cursor: 0,
            events,
            depth: 0,
        }
    }

    /// Consume the sink and build the syntax tree.
    pub fn finish(mut self) -> SyntaxNode {
        let mut forward_parents = Vec::new();

        for i in 0..self.events.len() {
            match std::mem::replace(&mut self.events[i], Event::Placeholder) {
                Event::Start {
                    kind,
                    forward_parent,
                } => {
                    forward_parents.push(kind);
                    let mut fp = forward_parent;

                    while let Some(parent_idx) = fp {
                        match std::mem::replace(&mut self.events[parent_idx], Event::Placeholder) {
                            Event::Start {
                                kind,
                                forward_parent,
                            } => {
                                fp = forward_parent;
                                forward_parents.push(kind);
                            }
                            _ => unreachable!(),
                        }
                    }

                    if self.depth > 0 {
                        self.eat_trivia();
                    }

                    // Outermost first
                    for kind in forward_parents.drain(..).rev() {
                        self.builder.start_node(kind.into());
                        self.depth += 1;
                    }
                }
                Event::Token { kind } => {
                    self.eat_trivia();
                    self.token(kind);
                }
                Event::Finish => {
                    if self.depth == 1 {
                        self.eat_trivia();
                    }
                    self.builder.finish_node();
                    self.depth -= 1;
                }
                Event::Placeholder => {}
            }
        }

        SyntaxNode::new_root(self.builder.finish())
    }

    fn token(&mut self, kind: SyntaxKind) {
        if let Some(token) = self.tokens.get(self.cursor) {
            self.builder.token(kind.into(), token.text);
            self.cursor += 1;
        }
    }

    fn eat_trivia(&mut self) {
        while let Some(token) = self.tokens.get(self.cursor) {
            if !token.kind.is_trivia() {
                break;
            }
            self.builder.token(token.kind.into(), token.text);
            self.cursor += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;
    use pretty_assertions::assert_eq;

    fn token(kind: SyntaxKind, text: &str) -> Token<'_> {
        Token { kind, text }
    }

    #[test]
    fn sink_builds_simple_tree() {
        let tokens = vec![token(SyntaxKind::NUMBER, "42")];

        let events = vec![
            Event::start(SyntaxKind::LOG_QL),
            Event::start(SyntaxKind::LITERAL_EXPR),
            Event::token(SyntaxKind::NUMBER),
            Event::Finish,
            Event::Finish,
        ];

        let tree = Sink::new(&tokens, events).finish();

        assert_eq!(tree.kind(), SyntaxKind::LOG_QL);
        assert_eq!(tree.children().count(), 1);
    }

    #[test]
    fn sink_attaches_trivia_to_the_parent() {
        let input = " 42 ";
        let tokens = lex(input);

        let events = vec![
            Event::start(SyntaxKind::LOG_QL),
            Event::start(SyntaxKind::LITERAL_EXPR),
            Event::token(SyntaxKind::NUMBER),
            Event::Finish,
            Event::Finish,
        ];

        let tree = Sink::new(&tokens, events).finish();
        let literal = tree.children().next().unwrap();

        assert_eq!(tree.text().to_string(), input);
        assert_eq!(u32::from(tree.text_range().end()), 4);
        assert_eq!(u32::from(literal.text_range().start()), 1);
        assert_eq!(u32::from(literal.text_range().end()), 3);
    }

    #[test]
    fn sink_follows_forward_parents() {
        let tokens = lex("1+2");

        // LITERAL "1" is preceded by the BIN_OP_EXPR started at index 4
        let events = vec![
            Event::start(SyntaxKind::LOG_QL),
            Event::Start {
                kind: SyntaxKind::LITERAL_EXPR,
                forward_parent: Some(4),
            },
            Event::token(SyntaxKind::NUMBER),
            Event::Finish,
            Event::start(SyntaxKind::BIN_OP_EXPR),
            Event::token(SyntaxKind::ADD),
            Event::start(SyntaxKind::LITERAL_EXPR),
            Event::token(SyntaxKind::NUMBER),
            Event::Finish,
            Event::Finish,
            Event::Finish,
        ];

        let tree = Sink::new(&tokens, events).finish();
        let bin = tree.children().next().unwrap();

        assert_eq!(bin.kind(), SyntaxKind::BIN_OP_EXPR);
        assert_eq!(bin.children().count(), 2);
        assert_eq!(bin.text().to_string(), "1+2");
    }
}
