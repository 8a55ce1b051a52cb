//! # Grammar Rules
//!
//! This module contains the grammar rules that drive parsing. Each function
//! takes a `&mut Parser` and uses its methods to:
//!
//! 1. Inspect the current token (`p.current()`, `p.at()`, `p.nth()`, `p.at_keyword()`)
//! 2. Consume tokens (`p.bump()`, `p.bump_remap()`, `p.eat()`)
//! 3. Build tree structure (`p.start()` → marker → `complete()`/`abandon()`)
//!
//! ## Module Structure
//!
//! - this module - the root rule, expressions and binary operators
//! - [`log`] - stream selectors and pipelines (line filters, parsers, label filters)
//! - [`metric`] - range and vector aggregations, ranges, unwrap, grouping
//!
//! ## Expression Shapes
//!
//! Every expression is an `EXPR` holding either a `LOG_EXPR` or a
//! `METRIC_EXPR`. Binary operators are metric expressions whose operands are
//! expressions again:
//!
//! ```text
//! a + b   =>   EXPR(METRIC_EXPR(BIN_OP_EXPR(EXPR(a), ADD, EXPR(b))))
//! ```
//!
//! Operators bind, loosest first: `or`, then `and`/`unless`, then the
//! comparisons, then `+ -`, then `* / %`, then `^` (right associative).
//!
//! ## Error Recovery
//!
//! Grammar functions are lenient and always produce a tree:
//!
//! - Unexpected tokens are wrapped in an `ERROR` node
//! - A missing token becomes an empty `ERROR` node at that position
//! - Whatever the expression rules leave behind is wrapped in `ERROR` by the root
//! - Nesting deeper than [`MAX_DEPTH`](crate::parser::MAX_DEPTH) turns the rest
//!   of the input into one `ERROR`

mod log;
mod metric;

use crate::parser::{CompletedMarker, Parser};
use crate::syntax_kind::SyntaxKind;

/// Whether an expression turned out to be a log or a metric expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExprKind {
    Log,
    Metric,
}

impl ExprKind {
    fn node_kind(self) -> SyntaxKind {
        match self {
            ExprKind::Log => SyntaxKind::LOG_EXPR,
            ExprKind::Metric => SyntaxKind::METRIC_EXPR,
        }
    }
}

/// Parse the root query.
///
/// This is the entry point for parsing. It creates a LOG_QL node holding one
/// expression and an ERROR node for anything left over.
pub fn root(p: &mut Parser<'_, '_>) {
    let m = p.start();

    if expr(p).is_none() && p.at_end() {
        error_empty(p);
    }

    if !p.at_end() {
        let e = p.start();
        while !p.at_end() {
            p.bump();
        }
        e.complete(p, SyntaxKind::ERROR);
    }

    m.complete(p, SyntaxKind::LOG_QL);
}

/// Parse a full expression.
fn expr(p: &mut Parser<'_, '_>) -> Option<CompletedMarker> {
    expr_bp(p, 0).map(|(cm, _)| cm)
}

/// Pratt loop over binary operators.
fn expr_bp(p: &mut Parser<'_, '_>, min_bp: u8) -> Option<(CompletedMarker, ExprKind)> {
    nested(p, |p| binary_expr(p, min_bp))
}

fn binary_expr(p: &mut Parser<'_, '_>, min_bp: u8) -> Option<(CompletedMarker, ExprKind)> {
    let (mut lhs, mut kind) = expr_atom(p)?;

    while let Some((op, l_bp, r_bp)) = binary_op(p) {
        if l_bp < min_bp {
            break;
        }

        let bin = lhs.precede(p);
        p.bump_remap(op);
        if p.at_keyword("bool") {
            let b = p.start();
            p.bump_remap(SyntaxKind::BOOL);
            b.complete(p, SyntaxKind::BOOL_MODIFIER);
        }
        if expr_bp(p, r_bp).is_none() {
            error_empty(p);
        }
        let bin = bin.complete(p, SyntaxKind::BIN_OP_EXPR);
        let metric = bin.precede(p).complete(p, SyntaxKind::METRIC_EXPR);
        lhs = metric.precede(p).complete(p, SyntaxKind::EXPR);
        kind = ExprKind::Metric;
    }

    Some((lhs, kind))
}

/// The operator at the current position with its binding powers.
fn binary_op(p: &Parser<'_, '_>) -> Option<(SyntaxKind, u8, u8)> {
    let op = match p.current() {
        SyntaxKind::IDENTIFIER => match p.current_text() {
            "or" => (SyntaxKind::OR, 1, 2),
            "and" => (SyntaxKind::AND, 3, 4),
            "unless" => (SyntaxKind::UNLESS, 3, 4),
            _ => return None,
        },
        SyntaxKind::EQL
        | SyntaxKind::NEQ
        | SyntaxKind::GTR
        | SyntaxKind::GTE
        | SyntaxKind::LSS
        | SyntaxKind::LTE => (p.current(), 5, 6),
        SyntaxKind::ADD | SyntaxKind::SUB => (p.current(), 7, 8),
        SyntaxKind::MUL | SyntaxKind::DIV | SyntaxKind::MOD => (p.current(), 9, 10),
        SyntaxKind::POW => (SyntaxKind::POW, 12, 11),
        _ => return None,
    };
    Some(op)
}

/// Parse a single operand, wrapped in EXPR.
fn expr_atom(p: &mut Parser<'_, '_>) -> Option<(CompletedMarker, ExprKind)> {
    let m = p.start();

    let kind = match p.current() {
        SyntaxKind::L_BRACE => {
            log::log_expr(p);
            ExprKind::Log
        }
        SyntaxKind::L_PAREN => paren_expr(p),
        SyntaxKind::NUMBER => {
            literal_expr(p);
            ExprKind::Metric
        }
        SyntaxKind::ADD | SyntaxKind::SUB if p.nth(1) == SyntaxKind::NUMBER => {
            literal_expr(p);
            ExprKind::Metric
        }
        SyntaxKind::IDENTIFIER if metric::at_metric_keyword(p) => {
            let mm = p.start();
            metric::metric_call(p);
            mm.complete(p, SyntaxKind::METRIC_EXPR);
            ExprKind::Metric
        }
        _ => {
            m.abandon(p);
            return None;
        }
    };

    Some((m.complete(p, SyntaxKind::EXPR), kind))
}

/// `( expr )`, a log expression if the inner one is.
fn paren_expr(p: &mut Parser<'_, '_>) -> ExprKind {
    let m = p.start();
    p.bump(); // (

    let kind = match expr_bp(p, 0) {
        Some((_, kind)) => kind,
        None => {
            error_empty(p);
            ExprKind::Metric
        }
    };
    expect(p, SyntaxKind::R_PAREN);

    m.complete(p, kind.node_kind());
    kind
}

/// `42`, `-1.5`
fn literal_expr(p: &mut Parser<'_, '_>) {
    let mm = p.start();
    let m = p.start();
    if p.at_any(&[SyntaxKind::ADD, SyntaxKind::SUB]) {
        p.bump();
    }
    p.bump(); // NUMBER
    m.complete(p, SyntaxKind::LITERAL_EXPR);
    mm.complete(p, SyntaxKind::METRIC_EXPR);
}

/// Run a recursive rule one nesting level deeper.
///
/// Past [`MAX_DEPTH`](crate::parser::MAX_DEPTH) the rule is skipped and
/// everything left becomes a single ERROR node, so the tree stays lossless.
fn nested<T>(
    p: &mut Parser<'_, '_>,
    rule: impl FnOnce(&mut Parser<'_, '_>) -> Option<T>,
) -> Option<T> {
    if !p.enter() {
        error_until(p, &[]);
        return None;
    }
    let result = rule(p);
    p.leave();
    result
}

/// Consume `kind`, or record an empty ERROR where it was expected.
fn expect(p: &mut Parser<'_, '_>, kind: SyntaxKind) -> bool {
    if p.eat(kind) {
        true
    } else {
        error_empty(p);
        false
    }
}

/// A zero-width ERROR node marking something missing.
fn error_empty(p: &mut Parser<'_, '_>) {
    let m = p.start();
    m.complete(p, SyntaxKind::ERROR);
}

/// Wrap tokens in one ERROR node until one of `stop` or the end of input.
///
/// Does nothing if already at a stop token.
fn error_until(p: &mut Parser<'_, '_>, stop: &[SyntaxKind]) {
    if p.at_end() || p.at_any(stop) {
        return;
    }
    let m = p.start();
    while !p.at_end() && !p.at_any(stop) {
        p.bump();
    }
    m.complete(p, SyntaxKind::ERROR);
}

#[cfg(test)]
mod tests {
    use crate::parse;
    use crate::syntax_kind::{SyntaxKind, SyntaxNode};
    use pretty_assertions::assert_eq;

    fn child_kinds(node: &SyntaxNode) -> Vec<SyntaxKind> {
        node.children().map(|n| n.kind()).collect()
    }

    fn has_error(node: &SyntaxNode) -> bool {
        node.descendants().any(|n| n.kind() == SyntaxKind::ERROR)
    }

    #[test]
    fn binary_ops_nest_by_precedence() {
        let tree = parse("1 + 2 * 3");
        let expr = tree.first_child().unwrap();
        let metric = expr.first_child().unwrap();
        assert_eq!(metric.kind(), SyntaxKind::METRIC_EXPR);

        let bin = metric.first_child().unwrap();
        assert_eq!(bin.kind(), SyntaxKind::BIN_OP_EXPR);
        assert_eq!(child_kinds(&bin), vec![SyntaxKind::EXPR, SyntaxKind::EXPR]);

        // The right operand holds the multiplication
        let rhs = bin.children().nth(1).unwrap();
        assert_eq!(rhs.text().to_string(), "2 * 3");
        assert!(!has_error(&tree));
    }

    #[test]
    fn left_associative_subtraction() {
        let tree = parse("3 - 2 - 1");
        let bin = tree
            .descendants()
            .find(|n| n.kind() == SyntaxKind::BIN_OP_EXPR)
            .unwrap();
        let lhs = bin.first_child().unwrap();
        assert_eq!(lhs.text().to_string(), "3 - 2");
    }

    #[test]
    fn power_is_right_associative() {
        let tree = parse("2 ^ 3 ^ 2");
        let bin = tree
            .descendants()
            .find(|n| n.kind() == SyntaxKind::BIN_OP_EXPR)
            .unwrap();
        let rhs = bin.children().nth(1).unwrap();
        assert_eq!(rhs.text().to_string(), "3 ^ 2");
    }

    #[test]
    fn comparison_with_bool_modifier() {
        let tree = parse("1 > bool 0");
        assert!(
            tree.descendants()
                .any(|n| n.kind() == SyntaxKind::BOOL_MODIFIER)
        );
        assert!(!has_error(&tree));
    }

    #[test]
    fn parenthesised_log_expr_stays_a_log_expr() {
        let tree = parse(r#"({app="api"})"#);
        let expr = tree.first_child().unwrap();
        assert_eq!(child_kinds(&expr), vec![SyntaxKind::LOG_EXPR]);
        assert!(!has_error(&tree));
    }

    #[test]
    fn negative_literal() {
        let tree = parse("-1");
        assert!(
            tree.descendants()
                .any(|n| n.kind() == SyntaxKind::LITERAL_EXPR)
        );
        assert!(!has_error(&tree));
    }

    #[test]
    fn missing_rhs_is_an_error() {
        let tree = parse("1 +");
        assert!(has_error(&tree));
        assert_eq!(tree.text().to_string(), "1 +");
    }

    #[test]
    fn leftover_tokens_are_wrapped_in_error() {
        let tree = parse(r#"{app="api"} )"#);
        assert_eq!(child_kinds(&tree), vec![SyntaxKind::EXPR, SyntaxKind::ERROR]);
    }

    #[test]
    fn garbage_input_is_a_single_error() {
        let tree = parse("@@@");
        assert_eq!(child_kinds(&tree), vec![SyntaxKind::ERROR]);
        assert_eq!(tree.text().to_string(), "@@@");
    }
}
