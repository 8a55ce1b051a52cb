//! # logql-lens-syntax
//!
//! A lossless, error-tolerant LogQL syntax tree using [Rowan] + [Logos],
//! following the [rust-analyzer] architecture model.
//!
//! [Rowan]: https://docs.rs/rowan
//! [Logos]: https://docs.rs/logos
//! [rust-analyzer]: https://rust-analyzer.github.io/book/contributing/syntax.html
//!
//! ## What is a Lossless CST?
//!
//! Unlike an Abstract Syntax Tree (AST) which discards formatting details, a
//! Concrete Syntax Tree (CST) preserves **every byte** of the original query:
//! whitespace, comments and even characters that make no sense. Every node
//! knows its byte range, so callers can slice the query text for any node:
//!
//! - **Filter extraction**: read the label, operator and value of a matcher
//!   straight from the query text
//! - **Positions**: ranges map exactly to byte offsets in the query
//! - **Half-typed queries**: a query being edited still yields a full tree
//!
//! ## Architecture Overview
//!
//! The parsing pipeline has three stages:
//!
//! ```text
//! Query → Lexer → Tokens → Parser → Events → Sink → Rowan Tree
//!         (Logos)          (Grammar)        (GreenNodeBuilder)
//! ```
//!
//! ### 1. Lexer ([`lexer`] module)
//!
//! The lexer uses [Logos] to tokenize input into a flat sequence of tokens.
//! Every character becomes part of some token - nothing is discarded.
//!
//! ```text
//! {app="api"} → [L_BRACE, IDENTIFIER("app"), EQ, STRING("\"api\""), R_BRACE]
//! ```
//!
//! ### 2. Parser ([`parser`] module)
//!
//! The parser consumes the significant tokens and emits **events** (Start,
//! Token, Finish). It uses a **marker system** to build nested structures.
//! Keywords such as `json` or `sum` are recognised here, by context.
//!
//! ### 3. Sink ([`parser::sink`] module)
//!
//! The sink consumes events and builds a Rowan green tree using
//! `GreenNodeBuilder`, putting whitespace and comments back in. The
//! resulting tree is immutable and cheap to clone.
//!
//! ## Module Structure
//!
//! ```text
//! logql-lens-syntax/
//! ├── lib.rs           # This file - public API and integration tests
//! ├── syntax_kind.rs   # SyntaxKind enum (tokens + nodes) and Rowan integration
//! ├── lexer.rs         # Logos-based tokenizer
//! └── parser/
//!     ├── mod.rs       # Parser struct, Marker system, public parse() function
//!     ├── event.rs     # Event enum (Start, Token, Finish, Placeholder)
//!     ├── sink.rs      # Converts events to Rowan GreenNode
//!     └── grammar/
//!         ├── mod.rs   # Root rule, expressions, binary operators
//!         ├── log.rs   # Selectors and pipelines
//!         └── metric.rs# Range and vector aggregations
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use logql_lens_syntax::{parse, SyntaxKind};
//!
//! let tree = parse(r#"{app="api"} | json"#);
//!
//! // The tree preserves all text
//! assert_eq!(tree.text().to_string(), r#"{app="api"} | json"#);
//!
//! // Navigate the tree structure
//! assert_eq!(tree.kind(), SyntaxKind::LOG_QL);
//! let expr = tree.first_child().unwrap();
//! assert_eq!(expr.kind(), SyntaxKind::EXPR);
//! ```

pub mod lexer;
pub mod parser;
pub mod syntax_kind;

pub use parser::parse;
pub use rowan::{NodeOrToken, TextRange, TextSize};
pub use syntax_kind::{
    LogQlLang, ParseSyntaxKindError, SyntaxElement, SyntaxKind, SyntaxNode, SyntaxToken,
};

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;

    /// Helper to format a syntax tree for snapshot testing.
    fn format_tree(node: &SyntaxNode, indent: usize) -> String {
        let mut result = String::new();
        let prefix = "  ".repeat(indent);

        result.push_str(&format!(
            "{}{:?}@{:?}\n",
            prefix,
            node.kind(),
            node.text_range()
        ));

        for child in node.children_with_tokens() {
            match child {
                NodeOrToken::Node(n) => {
                    result.push_str(&format_tree(&n, indent + 1));
                }
                NodeOrToken::Token(t) => {
                    result.push_str(&format!(
                        "{}  {:?}@{:?} {:?}\n",
                        prefix,
                        t.kind(),
                        t.text_range(),
                        t.text()
                    ));
                }
            }
        }

        result
    }

    #[test]
    fn snapshot_simple_selector() {
        let tree = parse(r#"{foo="bar"}"#);
        assert_snapshot!(format_tree(&tree, 0), @r#"
        LOG_QL@0..11
          EXPR@0..11
            LOG_EXPR@0..11
              SELECTOR@0..11
                L_BRACE@0..1 "{"
                MATCHERS@1..10
                  MATCHER@1..10
                    IDENTIFIER@1..4 "foo"
                    EQ@4..5 "="
                    STRING@5..10 "\"bar\""
                R_BRACE@10..11 "}"
        "#);
    }

    #[test]
    fn snapshot_trivia_goes_to_the_parent() {
        let tree = parse(r#" {app="api"} | json "#);
        assert_snapshot!(format_tree(&tree, 0), @r#"
        LOG_QL@0..20
          WHITESPACE@0..1 " "
          EXPR@1..19
            LOG_EXPR@1..19
              SELECTOR@1..12
                L_BRACE@1..2 "{"
                MATCHERS@2..11
                  MATCHER@2..11
                    IDENTIFIER@2..5 "app"
                    EQ@5..6 "="
                    STRING@6..11 "\"api\""
                R_BRACE@11..12 "}"
              WHITESPACE@12..13 " "
              PIPELINE_EXPR@13..19
                PIPELINE_STAGE@13..19
                  PIPE@13..14 "|"
                  WHITESPACE@14..15 " "
                  LABEL_PARSER@15..19
                    JSON@15..19 "json"
          WHITESPACE@19..20 " "
        "#);
    }

    #[test]
    fn error_tree_for_empty_query() {
        let tree = parse("");
        assert_snapshot!(format_tree(&tree, 0), @r"
        LOG_QL@0..0
          ERROR@0..0
        ");
    }

    #[test]
    fn comments_are_trivia() {
        let input = "# errors only\n{app=\"api\"} |= \"error\"";
        let tree = parse(input);
        assert_eq!(tree.text().to_string(), input);
        assert!(
            tree.descendants()
                .all(|n| n.kind() != SyntaxKind::ERROR)
        );
    }

    #[test]
    fn messy_queries_keep_every_byte() {
        let inputs = [
            r#"{app="api""#,
            r#"{app=}"#,
            r#"{app="api"} | json | "#,
            r#"sum by (app (count_over_time({app="api"}[5m]))"#,
            r#"{app="api"} |= "unterminated"#,
            r#"}{)(]["#,
            "{app=\"api\"} | line_format `{{.msg}}` \u{1F600}",
        ];

        for input in inputs {
            let tree = parse(input);
            assert_eq!(
                tree.text().to_string(),
                input,
                "Roundtrip failed for: {:?}",
                input
            );
        }
    }

    #[test]
    fn roundtrip_preserves_text() {
        let inputs = [
            r#"{app="api"}"#,
            r#"{app="api", env=~"prod|staging"}"#,
            r#"{app="api"} |= "error" != "debug""#,
            r#"{app="api"} | json | status >= 500"#,
            r#"{app="api"} | logfmt --strict | level="error" or level="warn""#,
            r#"sum by (app) (rate({app="api"}[5m]))"#,
            r#"quantile_over_time(0.99, {app="api"} | unwrap latency [5m]) by (route)"#,
            r#"count_over_time({app="api"}[1m]) > bool 10"#,
        ];

        for input in inputs {
            let tree = parse(input);
            assert_eq!(
                tree.text().to_string(),
                input,
                "Roundtrip failed for: {:?}",
                input
            );
            assert!(
                tree.descendants().all(|n| n.kind() != SyntaxKind::ERROR),
                "unexpected error in {:?}",
                input
            );
        }
    }
}
