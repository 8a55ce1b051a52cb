//! # Parser - Event-Based Tree Construction
//!
//! This module transforms a token stream into a syntax tree using the
//! **event-based** architecture from rust-analyzer.
//!
//! The grammar never builds tree nodes itself. It emits a flat list of
//! [`Event`]s (Start, Token, Finish) and the [`Sink`] builds the Rowan tree
//! afterwards. This keeps error recovery simple: a half-parsed matcher is
//! just a Start without the tokens you hoped for, never a dangling node.
//!
//! ## Significant tokens only
//!
//! The [`Parser`] only sees significant tokens. Whitespace and comments are
//! filtered out before parsing, so grammar rules never have to skip trivia,
//! and the [`Sink`] puts them back while building the tree.
//!
//! ## The Marker System
//!
//! When you call `parser.start()`, you get a [`Marker`]. This marker **must**
//! be either:
//!
//! - Completed with `marker.complete(parser, KIND)` → emits Start+Finish
//! - Abandoned with `marker.abandon(parser)` → removes the placeholder
//!
//! If you drop a marker without doing either, **the program panics**.
//!
//! ```ignore
//! let m = p.start();
//! p.bump(); // IDENTIFIER
//! p.bump(); // EQ
//! p.bump(); // STRING
//! m.complete(p, SyntaxKind::MATCHER);
//! ```
//!
//! ## Forward Parent Links
//!
//! Binary expressions are only recognised once the operator shows up, after
//! the left operand has been completed. `CompletedMarker::precede()` wraps
//! the finished operand in a new parent through a **forward parent link**
//! that the Sink resolves.
//!
//! ## Public API
//!
//! ```
//! use logql_lens_syntax::{parse, SyntaxKind};
//!
//! let tree = parse(r#"{app="api"} | json"#);
//! assert_eq!(tree.kind(), SyntaxKind::LOG_QL);
//! ```

pub mod event;
pub mod sink;

mod grammar;

use crate::lexer::{Token, lex};
use crate::syntax_kind::{SyntaxKind, SyntaxNode};
use event::Event;
use sink::Sink;

/// The parser state machine.
///
/// Holds the significant token stream, current position, and accumulated
/// events. Grammar functions receive `&mut Parser` and use its methods to:
///
/// - Inspect tokens: `current()`, `nth()`, `at()`, `at_end()`, `at_keyword()`
/// - Consume tokens: `bump()`, `bump_remap()`, `eat()`
/// - Build structure: `start()` → `Marker` → `complete()`/`abandon()`
/// - Bound recursion: `enter()`/`leave()` around nested rules
pub struct Parser<'t, 'input> {
    tokens: &'t [Token<'input>],
    pos: usize,
    events: Vec<Event>,
    depth: usize,
}

/// How deep nested rules (parentheses, chained operators) may recurse.
pub const MAX_DEPTH: usize = 256;

impl<'t, 'input> Parser<'t, 'input> {
    /// Create a new parser from a slice of significant tokens.
    pub fn new(tokens: &'t [Token<'input>]) -> Self {
        Self {
            tokens,
            pos: 0,
            events: Vec::new(),
            depth: 0,
        }
    }

    /// Run the grammar and return the events describing the tree.
    pub fn parse(mut self) -> Vec<Event> {
        grammar::root(&mut self);
        self.events
    }

    /// Start a new node and return a marker.
    pub fn start(&mut self) -> Marker {
        let pos = self.events.len();
        self.events.push(Event::Placeholder);
        Marker {
            pos,
            completed: false,
        }
    }

    /// Current token kind, or EOF if past end.
    pub fn current(&self) -> SyntaxKind {
        self.nth(0)
    }

    /// Look ahead n tokens.
    pub fn nth(&self, n: usize) -> SyntaxKind {
        self.tokens
            .get(self.pos + n)
            .map(|t| t.kind)
            .unwrap_or(SyntaxKind::EOF)
    }

    /// Check if at end of input.
    pub fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Check if current token is of given kind.
    pub fn at(&self, kind: SyntaxKind) -> bool {
        self.current() == kind
    }

    /// Check if current token is any of the given kinds.
    pub fn at_any(&self, kinds: &[SyntaxKind]) -> bool {
        kinds.contains(&self.current())
    }

    /// Check if the token `n` ahead is an identifier spelled `keyword`.
    pub fn nth_at_keyword(&self, n: usize, keyword: &str) -> bool {
        self.nth(n) == SyntaxKind::IDENTIFIER && self.nth_text(n) == keyword
    }

    /// Check if the current token is an identifier spelled `keyword`.
    pub fn at_keyword(&self, keyword: &str) -> bool {
        self.nth_at_keyword(0, keyword)
    }

    /// Consume the current token if it matches.
    pub fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Consume the current token unconditionally.
    pub fn bump(&mut self) {
        if !self.at_end() {
            let kind = self.current();
            self.bump_remap(kind);
        }
    }

    /// Consume the current token, recording it as `kind`.
    ///
    /// Used to turn contextual keywords into their own kinds.
    pub fn bump_remap(&mut self, kind: SyntaxKind) {
        if !self.at_end() {
            self.events.push(Event::token(kind));
            self.pos += 1;
        }
    }

    /// Go one nesting level deeper. Returns false once [`MAX_DEPTH`] is reached.
    pub fn enter(&mut self) -> bool {
        if self.depth >= MAX_DEPTH {
            return false;
        }
        self.depth += 1;
        true
    }

    /// Leave a level entered with [`Parser::enter`].
    pub fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Get the text of the current token.
    pub fn current_text(&self) -> &'input str {
        self.nth_text(0)
    }

    /// Get the text of the token `n` ahead.
    pub fn nth_text(&self, n: usize) -> &'input str {
        self.tokens.get(self.pos + n).map(|t| t.text).unwrap_or("")
    }
}

/// A marker for a node being constructed.
///
/// When you call `parser.start()`, a `Placeholder` event is pushed and you
/// get a `Marker` pointing to it. It must be completed or abandoned; the
/// `Drop` impl panics otherwise.
#[must_use = "Markers must be completed or abandoned, dropping them is a bug"]
pub struct Marker {
    /// Position in the events vector where our Placeholder lives
    pos: usize,
    /// Tracks whether complete() or abandon() was called
    completed: bool,
}

impl Marker {
    /// Complete this marker, creating a node of the given kind.
    pub fn complete(mut self, p: &mut Parser<'_, '_>, kind: SyntaxKind) -> CompletedMarker {
        self.completed = true;
        let event_at_pos = &mut p.events[self.pos];
        assert!(matches!(event_at_pos, Event::Placeholder));
        *event_at_pos = Event::Start {
            kind,
            forward_parent: None,
        };
        p.events.push(Event::Finish);
        CompletedMarker { pos: self.pos }
    }

    /// Abandon this marker without creating a node.
    ///
    /// Only removes the placeholder if it's the last event; otherwise it
    /// stays inert and the Sink ignores it.
    pub fn abandon(mut self, p: &mut Parser<'_, '_>) {
        self.completed = true;
        if self.pos == p.events.len() - 1 {
            match p.events.pop() {
                Some(Event::Placeholder) => {}
                _ => unreachable!(),
            }
        }
    }
}

impl Drop for Marker {
    fn drop(&mut self) {
        if !self.completed && !std::thread::panicking() {
            panic!("Marker must be either completed or abandoned");
        }
    }
}

/// A marker for a node that has been completed.
///
/// The only thing you can do with a `CompletedMarker` is call `precede()`
/// to wrap the completed node in a new parent:
///
/// ```ignore
/// let lhs = label_filter_atom(p)?;      // x="1"
/// if p.at_keyword("and") {
///     let m = lhs.precede(p);           // new parent BEFORE x="1"
///     p.bump_remap(SyntaxKind::AND);
///     label_filter_atom(p);             // y="2"
///     m.complete(p, SyntaxKind::LABEL_FILTER);
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct CompletedMarker {
    /// Position of the Start event for this completed node
    pos: usize,
}

impl CompletedMarker {
    /// Create a new parent node that will contain this node.
    pub fn precede(self, p: &mut Parser<'_, '_>) -> Marker {
        let new_pos = p.events.len();
        p.events.push(Event::Placeholder);

        if let Event::Start { forward_parent, .. } = &mut p.events[self.pos] {
            *forward_parent = Some(new_pos);
        }

        Marker {
            pos: new_pos,
            completed: false,
        }
    }
}

/// Parse a LogQL query into a syntax tree.
///
/// Never fails: malformed input yields `ERROR` nodes, and the root always
/// spans the whole query.
pub fn parse(source: &str) -> SyntaxNode {
    let tokens = lex(source);
    let significant: Vec<Token<'_>> = tokens
        .iter()
        .filter(|t| !t.kind.is_trivia())
        .cloned()
        .collect();
    let events = Parser::new(&significant).parse();
    Sink::new(&tokens, events).finish()
}
