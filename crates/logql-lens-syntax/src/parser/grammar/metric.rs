//! # Metric Expression Grammar
//!
//! Metric expressions turn log streams into samples:
//!
//! ```text
//! sum by (app) (count_over_time({app="api"} |= "err" [5m]))
//! └VECTOR_OP┘└GROUPING┘ └RANGE_OP┘ └──── LOG_RANGE_EXPR ────┘
//! ```
//!
//! The operator names are contextual keywords: they are only remapped from
//! `IDENTIFIER` when they open a call.

use super::log::{at_label_filter, at_pipeline_stage, label_filter, pipeline_expr, selector};
use super::{error_empty, expect, expr};
use crate::parser::Parser;
use crate::syntax_kind::SyntaxKind;

const RANGE_OPS: &[(&str, SyntaxKind)] = &[
    ("rate", SyntaxKind::RATE),
    ("rate_counter", SyntaxKind::RATE_COUNTER),
    ("count_over_time", SyntaxKind::COUNT_OVER_TIME),
    ("bytes_rate", SyntaxKind::BYTES_RATE),
    ("bytes_over_time", SyntaxKind::BYTES_OVER_TIME),
    ("avg_over_time", SyntaxKind::AVG_OVER_TIME),
    ("sum_over_time", SyntaxKind::SUM_OVER_TIME),
    ("min_over_time", SyntaxKind::MIN_OVER_TIME),
    ("max_over_time", SyntaxKind::MAX_OVER_TIME),
    ("stddev_over_time", SyntaxKind::STDDEV_OVER_TIME),
    ("stdvar_over_time", SyntaxKind::STDVAR_OVER_TIME),
    ("quantile_over_time", SyntaxKind::QUANTILE_OVER_TIME),
    ("first_over_time", SyntaxKind::FIRST_OVER_TIME),
    ("last_over_time", SyntaxKind::LAST_OVER_TIME),
    ("absent_over_time", SyntaxKind::ABSENT_OVER_TIME),
];

const VECTOR_OPS: &[(&str, SyntaxKind)] = &[
    ("sum", SyntaxKind::SUM),
    ("avg", SyntaxKind::AVG),
    ("count", SyntaxKind::COUNT),
    ("max", SyntaxKind::MAX),
    ("min", SyntaxKind::MIN),
    ("stddev", SyntaxKind::STDDEV),
    ("stdvar", SyntaxKind::STDVAR),
    ("bottomk", SyntaxKind::BOTTOMK),
    ("topk", SyntaxKind::TOPK),
    ("sort", SyntaxKind::SORT),
    ("sort_desc", SyntaxKind::SORT_DESC),
];

const CONV_OPS: &[(&str, SyntaxKind)] = &[
    ("bytes", SyntaxKind::BYTES_CONV),
    ("duration", SyntaxKind::DURATION_CONV),
    ("duration_seconds", SyntaxKind::DURATION_SECONDS_CONV),
];

fn lookup(table: &[(&str, SyntaxKind)], text: &str) -> Option<SyntaxKind> {
    table
        .iter()
        .find(|(name, _)| *name == text)
        .map(|(_, kind)| *kind)
}

/// True if the current identifier opens a metric call.
pub(super) fn at_metric_keyword(p: &Parser<'_, '_>) -> bool {
    let text = p.current_text();
    lookup(RANGE_OPS, text).is_some() || lookup(VECTOR_OPS, text).is_some() || text == "vector"
}

/// Parse the call the current keyword opens. The caller wraps it in METRIC_EXPR.
pub(super) fn metric_call(p: &mut Parser<'_, '_>) {
    let text = p.current_text();
    if let Some(op) = lookup(RANGE_OPS, text) {
        range_aggregation_expr(p, op);
    } else if let Some(op) = lookup(VECTOR_OPS, text) {
        vector_aggregation_expr(p, op);
    } else {
        vector_expr(p);
    }
}

/// `count_over_time({...}[5m])`, `quantile_over_time(0.99, ...) by (x)`
fn range_aggregation_expr(p: &mut Parser<'_, '_>, op: SyntaxKind) {
    let m = p.start();

    let o = p.start();
    p.bump_remap(op);
    o.complete(p, SyntaxKind::RANGE_OP);

    if expect(p, SyntaxKind::L_PAREN) {
        if p.at(SyntaxKind::NUMBER) && p.nth(1) == SyntaxKind::COMMA {
            p.bump(); // NUMBER
            p.bump(); // ,
        }
        log_range_expr(p);
        expect(p, SyntaxKind::R_PAREN);
    }
    if at_grouping(p) {
        grouping(p);
    }

    m.complete(p, SyntaxKind::RANGE_AGGREGATION_EXPR);
}

/// `sum by (a) (expr)`, `topk(5, expr) without (b)`
fn vector_aggregation_expr(p: &mut Parser<'_, '_>, op: SyntaxKind) {
    let m = p.start();

    let o = p.start();
    p.bump_remap(op);
    o.complete(p, SyntaxKind::VECTOR_OP);

    if at_grouping(p) {
        grouping(p);
    }
    if expect(p, SyntaxKind::L_PAREN) {
        if p.at(SyntaxKind::NUMBER) && p.nth(1) == SyntaxKind::COMMA {
            p.bump(); // NUMBER
            p.bump(); // ,
        }
        if expr(p).is_none() {
            error_empty(p);
        }
        expect(p, SyntaxKind::R_PAREN);
    }
    if at_grouping(p) {
        grouping(p);
    }

    m.complete(p, SyntaxKind::VECTOR_AGGREGATION_EXPR);
}

/// `vector(1)`
fn vector_expr(p: &mut Parser<'_, '_>) {
    let m = p.start();
    p.bump_remap(SyntaxKind::VECTOR);
    if expect(p, SyntaxKind::L_PAREN) {
        expect(p, SyntaxKind::NUMBER);
        expect(p, SyntaxKind::R_PAREN);
    }
    m.complete(p, SyntaxKind::VECTOR_EXPR);
}

/// The log part of a range aggregation, in any of the accepted orders:
/// `{...} [5m] | json`, `{...} | json [5m]`, `({...} | json)[5m]`,
/// `{...} | unwrap x [5m] offset 1h`.
fn log_range_expr(p: &mut Parser<'_, '_>) {
    let m = p.start();

    if p.at(SyntaxKind::L_PAREN) && p.nth(1) == SyntaxKind::L_BRACE {
        p.bump(); // (
        selector(p);
        if at_pipeline_stage(p) {
            pipeline_expr(p);
        }
        expect(p, SyntaxKind::R_PAREN);
    } else if p.at(SyntaxKind::L_BRACE) {
        selector(p);
    } else {
        error_empty(p);
    }

    if p.at(SyntaxKind::L_BRACKET) {
        range(p);
    }
    if at_pipeline_stage(p) {
        pipeline_expr(p);
    }
    if p.at(SyntaxKind::PIPE) && p.nth_at_keyword(1, "unwrap") {
        unwrap_expr(p);
    }
    if p.at(SyntaxKind::L_BRACKET) {
        range(p);
    }
    if p.at_keyword("offset") {
        offset_expr(p);
    }

    m.complete(p, SyntaxKind::LOG_RANGE_EXPR);
}

/// `[5m]`
fn range(p: &mut Parser<'_, '_>) {
    let m = p.start();
    p.bump(); // [
    expect(p, SyntaxKind::DURATION);
    expect(p, SyntaxKind::R_BRACKET);
    m.complete(p, SyntaxKind::RANGE);
}

/// `offset 1h`
fn offset_expr(p: &mut Parser<'_, '_>) {
    let m = p.start();
    p.bump_remap(SyntaxKind::OFFSET);
    expect(p, SyntaxKind::DURATION);
    m.complete(p, SyntaxKind::OFFSET_EXPR);
}

/// `| unwrap latency`, `| unwrap duration(took) | __error__=""`
fn unwrap_expr(p: &mut Parser<'_, '_>) {
    let m = p.start();
    p.bump(); // |
    p.bump_remap(SyntaxKind::UNWRAP);

    let conv = if p.at(SyntaxKind::IDENTIFIER) && p.nth(1) == SyntaxKind::L_PAREN {
        lookup(CONV_OPS, p.current_text())
    } else {
        None
    };
    if let Some(conv) = conv {
        let c = p.start();
        p.bump_remap(conv);
        c.complete(p, SyntaxKind::CONV_OP);
        p.bump(); // (
        expect(p, SyntaxKind::IDENTIFIER);
        expect(p, SyntaxKind::R_PAREN);
    } else {
        expect(p, SyntaxKind::IDENTIFIER);
    }

    // Post-unwrap filters
    while p.at(SyntaxKind::PIPE) && at_label_filter(p, 1) {
        p.bump(); // |
        label_filter(p);
    }

    m.complete(p, SyntaxKind::UNWRAP_EXPR);
}

fn at_grouping(p: &Parser<'_, '_>) -> bool {
    (p.at_keyword("by") || p.at_keyword("without")) && p.nth(1) == SyntaxKind::L_PAREN
}

/// `by (a, b)` / `without ()`
fn grouping(p: &mut Parser<'_, '_>) {
    let m = p.start();
    let keyword = if p.at_keyword("by") {
        SyntaxKind::BY
    } else {
        SyntaxKind::WITHOUT
    };
    p.bump_remap(keyword);
    p.bump(); // (

    if p.at(SyntaxKind::IDENTIFIER) {
        let labels = p.start();
        p.bump();
        while p.at(SyntaxKind::COMMA) && p.nth(1) == SyntaxKind::IDENTIFIER {
            p.bump(); // ,
            p.bump(); // IDENTIFIER
        }
        labels.complete(p, SyntaxKind::LABELS);
    }
    expect(p, SyntaxKind::R_PAREN);

    m.complete(p, SyntaxKind::GROUPING);
}
