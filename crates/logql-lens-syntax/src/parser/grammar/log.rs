//! # Log Expression Grammar
//!
//! A log expression is a stream selector followed by an optional pipeline:
//!
//! ```text
//! {app="api", env!="dev"} |= "timeout" | json | status >= 500
//! └────── SELECTOR ─────┘ └──────────── PIPELINE_EXPR ───────┘
//! ```
//!
//! ## Pipeline Stages
//!
//! | Starts with | Stage |
//! |-------------|-------|
//! | `\|=` `!=` `\|~` `!~` `\|>` `!>` | `LINE_FILTERS` |
//! | `\|` + label comparison or `(` | `LABEL_FILTER` |
//! | `\| json` / `\| logfmt` / `\| regexp` ... | parser stages |
//! | `\| line_format` / `\| label_format` | format stages |
//! | `\| drop` / `\| keep` / `\| decolorize` | label list stages |
//!
//! `!=` and `!~` only start a line filter when a string (or `ip(...)`)
//! follows, otherwise they are left for the binary operator rules.
//!
//! A keyword followed by a comparison (`| json="x"`) is a label filter on a
//! label with that name, not a parser stage.

use super::{error_empty, error_until, expect, nested};
use crate::parser::{CompletedMarker, Parser};
use crate::syntax_kind::SyntaxKind;

const MATCHER_OPS: &[SyntaxKind] = &[
    SyntaxKind::EQ,
    SyntaxKind::NEQ,
    SyntaxKind::RE,
    SyntaxKind::NRE,
];

/// Operators allowed between a label name and a number, duration or bytes.
const COMPARISON_OPS: &[SyntaxKind] = &[
    SyntaxKind::EQ,
    SyntaxKind::NEQ,
    SyntaxKind::EQL,
    SyntaxKind::GTR,
    SyntaxKind::GTE,
    SyntaxKind::LSS,
    SyntaxKind::LTE,
];

/// Parse `SELECTOR PIPELINE_EXPR?` as a LOG_EXPR.
pub(super) fn log_expr(p: &mut Parser<'_, '_>) {
    let m = p.start();
    selector(p);
    if at_pipeline_stage(p) {
        pipeline_expr(p);
    }
    m.complete(p, SyntaxKind::LOG_EXPR);
}

/// Parse a stream selector: `{` matchers `}`
pub(super) fn selector(p: &mut Parser<'_, '_>) {
    let m = p.start();
    debug_assert!(p.at(SyntaxKind::L_BRACE));
    p.bump(); // {

    if p.at(SyntaxKind::IDENTIFIER) {
        matchers(p);
    }
    p.eat(SyntaxKind::COMMA);

    error_until(
        p,
        &[
            SyntaxKind::R_BRACE,
            SyntaxKind::PIPE,
            SyntaxKind::PIPE_EXACT,
            SyntaxKind::PIPE_MATCH,
            SyntaxKind::PIPE_PATTERN,
            SyntaxKind::L_BRACKET,
            SyntaxKind::R_PAREN,
        ],
    );
    expect(p, SyntaxKind::R_BRACE);

    m.complete(p, SyntaxKind::SELECTOR);
}

fn matchers(p: &mut Parser<'_, '_>) {
    let m = p.start();
    matcher(p);
    while p.at(SyntaxKind::COMMA) && p.nth(1) == SyntaxKind::IDENTIFIER {
        p.bump(); // ,
        matcher(p);
    }
    m.complete(p, SyntaxKind::MATCHERS);
}

/// `name <op> "value"`
///
/// Stray characters between the operator and the value (`baz=!"qux"`) are
/// kept inside the matcher as an ERROR node.
fn matcher(p: &mut Parser<'_, '_>) -> CompletedMarker {
    let m = p.start();
    p.bump(); // IDENTIFIER, never remapped

    if p.at_any(MATCHER_OPS) {
        p.bump();
    } else {
        error_empty(p);
    }

    if p.at(SyntaxKind::UNKNOWN) {
        let e = p.start();
        while p.at(SyntaxKind::UNKNOWN) {
            p.bump();
        }
        e.complete(p, SyntaxKind::ERROR);
    }
    expect(p, SyntaxKind::STRING);

    m.complete(p, SyntaxKind::MATCHER)
}

/// True if the next token starts a pipeline stage.
///
/// `| unwrap` is not a stage, it belongs to the enclosing range expression.
pub(super) fn at_pipeline_stage(p: &Parser<'_, '_>) -> bool {
    at_line_filter(p) || (p.at(SyntaxKind::PIPE) && !p.nth_at_keyword(1, "unwrap"))
}

pub(super) fn pipeline_expr(p: &mut Parser<'_, '_>) {
    let m = p.start();
    while at_pipeline_stage(p) {
        pipeline_stage(p);
    }
    m.complete(p, SyntaxKind::PIPELINE_EXPR);
}

fn pipeline_stage(p: &mut Parser<'_, '_>) {
    let m = p.start();

    if at_line_filter(p) {
        line_filters(p);
    } else {
        p.bump(); // |
        if at_label_filter(p, 0) {
            label_filter(p);
        } else if p.at(SyntaxKind::IDENTIFIER) {
            match p.current_text() {
                "json" => json_parser(p),
                "logfmt" => logfmt_parser(p),
                "regexp" => string_parser(p, SyntaxKind::REGEXP),
                "pattern" => string_parser(p, SyntaxKind::PATTERN),
                "unpack" => {
                    let lp = p.start();
                    p.bump_remap(SyntaxKind::UNPACK);
                    lp.complete(p, SyntaxKind::LABEL_PARSER);
                }
                "line_format" => line_format_expr(p),
                "label_format" => label_format_expr(p),
                "drop" => label_list_expr(p, LabelListKinds::DROP),
                "keep" => label_list_expr(p, LabelListKinds::KEEP),
                "decolorize" => {
                    let d = p.start();
                    p.bump_remap(SyntaxKind::DECOLORIZE);
                    d.complete(p, SyntaxKind::DECOLORIZE_EXPR);
                }
                _ => {
                    let e = p.start();
                    p.bump();
                    e.complete(p, SyntaxKind::ERROR);
                }
            }
        } else {
            error_empty(p);
        }
    }

    m.complete(p, SyntaxKind::PIPELINE_STAGE);
}

// === Line filters ===

fn at_line_filter(p: &Parser<'_, '_>) -> bool {
    match p.current() {
        SyntaxKind::PIPE_EXACT | SyntaxKind::PIPE_MATCH | SyntaxKind::PIPE_PATTERN => true,
        SyntaxKind::NEQ | SyntaxKind::NRE | SyntaxKind::NPA => at_line_filter_value(p, 1),
        _ => false,
    }
}

fn at_line_filter_value(p: &Parser<'_, '_>, n: usize) -> bool {
    p.nth(n) == SyntaxKind::STRING || p.nth_at_keyword(n, "ip")
}

fn line_filters(p: &mut Parser<'_, '_>) {
    let m = p.start();
    while at_line_filter(p) {
        line_filter(p);
    }
    m.complete(p, SyntaxKind::LINE_FILTERS);
}

/// `|= "a"`, `!= ip("10.0.0.1")`, `|~ "a" or "b"`
fn line_filter(p: &mut Parser<'_, '_>) {
    let m = p.start();

    let f = p.start();
    p.bump();
    f.complete(p, SyntaxKind::FILTER);

    line_filter_value(p);
    if p.at_keyword("or") && at_line_filter_value(p, 1) {
        or_filter(p);
    }

    m.complete(p, SyntaxKind::LINE_FILTER);
}

fn line_filter_value(p: &mut Parser<'_, '_>) {
    if p.at_keyword("ip") && p.nth(1) == SyntaxKind::L_PAREN {
        let f = p.start();
        p.bump_remap(SyntaxKind::IP);
        f.complete(p, SyntaxKind::FILTER_OP);
        p.bump(); // (
        expect(p, SyntaxKind::STRING);
        expect(p, SyntaxKind::R_PAREN);
    } else {
        expect(p, SyntaxKind::STRING);
    }
}

fn or_filter(p: &mut Parser<'_, '_>) {
    nested(p, |p| {
        let m = p.start();
        p.bump_remap(SyntaxKind::OR);
        line_filter_value(p);
        if p.at_keyword("or") && at_line_filter_value(p, 1) {
            or_filter(p);
        }
        Some(m.complete(p, SyntaxKind::OR_FILTER))
    });
}

// === Label filters ===

/// True if a label filter starts `n` tokens ahead.
pub(super) fn at_label_filter(p: &Parser<'_, '_>, n: usize) -> bool {
    match p.nth(n) {
        SyntaxKind::L_PAREN => true,
        SyntaxKind::IDENTIFIER => {
            let op = p.nth(n + 1);
            MATCHER_OPS.contains(&op) || COMPARISON_OPS.contains(&op)
        }
        _ => false,
    }
}

/// Parse a label filter, combining filters with `and`, `or`, `,` or
/// plain juxtaposition. `or` binds loosest.
pub(super) fn label_filter(p: &mut Parser<'_, '_>) -> Option<CompletedMarker> {
    label_filter_bp(p, 0)
}

fn label_filter_bp(p: &mut Parser<'_, '_>, min_bp: u8) -> Option<CompletedMarker> {
    nested(p, |p| label_filter_chain(p, min_bp))
}

fn label_filter_chain(p: &mut Parser<'_, '_>, min_bp: u8) -> Option<CompletedMarker> {
    let mut lhs = label_filter_atom(p)?;

    loop {
        let (connective, l_bp, r_bp) = if p.at_keyword("or") && at_label_filter(p, 1) {
            (Some(SyntaxKind::OR), 1, 2)
        } else if p.at_keyword("and") && at_label_filter(p, 1) {
            (Some(SyntaxKind::AND), 3, 4)
        } else if p.at(SyntaxKind::COMMA) && at_label_filter(p, 1) {
            (Some(SyntaxKind::COMMA), 3, 4)
        } else if at_label_filter(p, 0) {
            (None, 3, 4)
        } else {
            break;
        };

        if l_bp < min_bp {
            break;
        }

        let m = lhs.precede(p);
        if let Some(kind) = connective {
            p.bump_remap(kind);
        }
        if label_filter_bp(p, r_bp).is_none() {
            error_empty(p);
        }
        lhs = m.complete(p, SyntaxKind::LABEL_FILTER);
    }

    Some(lhs)
}

fn label_filter_atom(p: &mut Parser<'_, '_>) -> Option<CompletedMarker> {
    let m = p.start();

    if p.at(SyntaxKind::L_PAREN) {
        p.bump(); // (
        if label_filter(p).is_none() {
            error_empty(p);
        }
        expect(p, SyntaxKind::R_PAREN);
        return Some(m.complete(p, SyntaxKind::LABEL_FILTER));
    }

    if !at_label_filter(p, 0) {
        m.abandon(p);
        return None;
    }

    let op = p.nth(1);
    let value = p.nth(2);
    if (op == SyntaxKind::EQ || op == SyntaxKind::NEQ)
        && p.nth_at_keyword(2, "ip")
        && p.nth(3) == SyntaxKind::L_PAREN
    {
        ip_label_filter(p);
    } else if MATCHER_OPS.contains(&op) && value != SyntaxKind::NUMBER
        && value != SyntaxKind::DURATION
        && value != SyntaxKind::BYTES
    {
        matcher(p);
    } else {
        match value {
            SyntaxKind::DURATION => unit_filter(p, SyntaxKind::DURATION_FILTER),
            SyntaxKind::BYTES => unit_filter(p, SyntaxKind::BYTES_FILTER),
            _ => comparison(p, SyntaxKind::NUMBER, SyntaxKind::NUMBER_FILTER),
        }
    }

    Some(m.complete(p, SyntaxKind::LABEL_FILTER))
}

/// `addr = ip("10.0.0.0/8")`
fn ip_label_filter(p: &mut Parser<'_, '_>) {
    let m = p.start();
    p.bump(); // IDENTIFIER
    p.bump(); // = or !=
    p.bump_remap(SyntaxKind::IP);
    p.bump(); // (
    expect(p, SyntaxKind::STRING);
    expect(p, SyntaxKind::R_PAREN);
    m.complete(p, SyntaxKind::IP_LABEL_FILTER);
}

fn unit_filter(p: &mut Parser<'_, '_>, kind: SyntaxKind) {
    let m = p.start();
    let value = if kind == SyntaxKind::DURATION_FILTER {
        SyntaxKind::DURATION
    } else {
        SyntaxKind::BYTES
    };
    comparison(p, value, kind);
    m.complete(p, SyntaxKind::UNIT_FILTER);
}

/// `name <op> value` for numbers, durations and bytes.
fn comparison(p: &mut Parser<'_, '_>, value: SyntaxKind, kind: SyntaxKind) {
    let m = p.start();
    p.bump(); // IDENTIFIER
    p.bump(); // operator
    expect(p, value);
    m.complete(p, kind);
}

// === Parser stages ===

/// `json` or `json a, b="c.d"`
fn json_parser(p: &mut Parser<'_, '_>) {
    let m = p.start();
    p.bump_remap(SyntaxKind::JSON);
    if p.at(SyntaxKind::IDENTIFIER) {
        label_extraction_list(p);
        m.complete(p, SyntaxKind::JSON_EXPRESSION_PARSER);
    } else {
        m.complete(p, SyntaxKind::LABEL_PARSER);
    }
}

/// `logfmt`, `logfmt --strict --keep-empty`, `logfmt a, b="c"`
fn logfmt_parser(p: &mut Parser<'_, '_>) {
    let m = p.start();
    p.bump_remap(SyntaxKind::LOGFMT);

    let mut has_flags = false;
    while p.eat(SyntaxKind::PARSER_FLAG) {
        has_flags = true;
    }

    let kind = if p.at(SyntaxKind::IDENTIFIER) {
        label_extraction_list(p);
        SyntaxKind::LOGFMT_EXPRESSION_PARSER
    } else if has_flags {
        SyntaxKind::LOGFMT_PARSER
    } else {
        SyntaxKind::LABEL_PARSER
    };
    m.complete(p, kind);
}

/// `regexp "<re>"` or `pattern "<pattern>"`
fn string_parser(p: &mut Parser<'_, '_>, keyword: SyntaxKind) {
    let m = p.start();
    p.bump_remap(keyword);
    expect(p, SyntaxKind::STRING);
    m.complete(p, SyntaxKind::LABEL_PARSER);
}

fn label_extraction_list(p: &mut Parser<'_, '_>) {
    let m = p.start();
    label_extraction(p);
    while p.at(SyntaxKind::COMMA) && p.nth(1) == SyntaxKind::IDENTIFIER {
        p.bump(); // ,
        label_extraction(p);
    }
    m.complete(p, SyntaxKind::LABEL_EXTRACTION_EXPRESSION_LIST);
}

fn label_extraction(p: &mut Parser<'_, '_>) {
    let m = p.start();
    p.bump(); // IDENTIFIER
    if p.eat(SyntaxKind::EQ) {
        expect(p, SyntaxKind::STRING);
    }
    m.complete(p, SyntaxKind::LABEL_EXTRACTION_EXPRESSION);
}

// === Format stages ===

fn line_format_expr(p: &mut Parser<'_, '_>) {
    let m = p.start();
    p.bump_remap(SyntaxKind::LINE_FORMAT);
    expect(p, SyntaxKind::STRING);
    m.complete(p, SyntaxKind::LINE_FORMAT_EXPR);
}

/// `label_format dst=src, msg="{{.a}}"`
fn label_format_expr(p: &mut Parser<'_, '_>) {
    let m = p.start();
    p.bump_remap(SyntaxKind::LABEL_FORMAT);

    let list = p.start();
    label_format_matcher(p);
    while p.at(SyntaxKind::COMMA) && p.nth(1) == SyntaxKind::IDENTIFIER {
        p.bump(); // ,
        label_format_matcher(p);
    }
    list.complete(p, SyntaxKind::LABELS_FORMAT);

    m.complete(p, SyntaxKind::LABEL_FORMAT_EXPR);
}

fn label_format_matcher(p: &mut Parser<'_, '_>) {
    let m = p.start();
    expect(p, SyntaxKind::IDENTIFIER);
    expect(p, SyntaxKind::EQ);
    if !p.eat(SyntaxKind::STRING) {
        expect(p, SyntaxKind::IDENTIFIER);
    }
    m.complete(p, SyntaxKind::LABEL_FORMAT_MATCHER);
}

/// Node kinds for `drop` and `keep`, which share a shape.
struct LabelListKinds {
    keyword: SyntaxKind,
    expr: SyntaxKind,
    list: SyntaxKind,
    item: SyntaxKind,
}

impl LabelListKinds {
    const DROP: Self = Self {
        keyword: SyntaxKind::DROP,
        expr: SyntaxKind::DROP_LABELS_EXPR,
        list: SyntaxKind::DROP_LABELS,
        item: SyntaxKind::DROP_LABEL,
    };

    const KEEP: Self = Self {
        keyword: SyntaxKind::KEEP,
        expr: SyntaxKind::KEEP_LABELS_EXPR,
        list: SyntaxKind::KEEP_LABELS,
        item: SyntaxKind::KEEP_LABEL,
    };
}

/// `drop a, b="c"` / `keep a, b`
fn label_list_expr(p: &mut Parser<'_, '_>, kinds: LabelListKinds) {
    let m = p.start();
    p.bump_remap(kinds.keyword);

    let list = p.start();
    label_list_item(p, kinds.item);
    while p.at(SyntaxKind::COMMA) && p.nth(1) == SyntaxKind::IDENTIFIER {
        p.bump(); // ,
        label_list_item(p, kinds.item);
    }
    list.complete(p, kinds.list);

    m.complete(p, kinds.expr);
}

fn label_list_item(p: &mut Parser<'_, '_>, kind: SyntaxKind) {
    let m = p.start();
    if p.at(SyntaxKind::IDENTIFIER) && MATCHER_OPS.contains(&p.nth(1)) {
        matcher(p);
    } else {
        expect(p, SyntaxKind::IDENTIFIER);
    }
    m.complete(p, kind);
}

#[cfg(test)]
mod tests {
    use crate::parse;
    use crate::syntax_kind::{SyntaxKind, SyntaxNode};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn find(node: &SyntaxNode, kind: SyntaxKind) -> Option<SyntaxNode> {
        node.descendants().find(|n| n.kind() == kind)
    }

    fn count(node: &SyntaxNode, kind: SyntaxKind) -> usize {
        node.descendants().filter(|n| n.kind() == kind).count()
    }

    fn has_error(node: &SyntaxNode) -> bool {
        count(node, SyntaxKind::ERROR) > 0
    }

    #[test]
    fn selector_with_several_matchers() {
        let tree = parse(r#"{app="api", env!="dev", pod=~"a.*", ns!~"kube-.*"}"#);
        assert_eq!(count(&tree, SyntaxKind::MATCHER), 4);
        assert!(!has_error(&tree));
    }

    #[test]
    fn selector_span_is_tight() {
        let tree = parse(r#"  {foo="bar"}  "#);
        let selector = find(&tree, SyntaxKind::SELECTOR).unwrap();
        assert_eq!(u32::from(selector.text_range().start()), 2);
        assert_eq!(u32::from(selector.text_range().end()), 13);
    }

    #[test]
    fn empty_selector_and_trailing_comma() {
        assert!(!has_error(&parse("{}")));
        assert!(!has_error(&parse(r#"{app="api",}"#)));
    }

    #[test]
    fn label_named_like_a_keyword() {
        let tree = parse(r#"{json="x", by="y"}"#);
        assert_eq!(count(&tree, SyntaxKind::MATCHER), 2);
        assert!(!has_error(&tree));
    }

    #[test]
    fn stray_bang_stays_inside_the_matcher() {
        let tree = parse(r#"{foo="bar", baz=!"qux"}"#);
        let matchers: Vec<_> = tree
            .descendants()
            .filter(|n| n.kind() == SyntaxKind::MATCHER)
            .collect();
        assert_eq!(matchers.len(), 2);
        assert_eq!(matchers[1].text().to_string(), r#"baz=!"qux""#);
        assert!(find(&matchers[1], SyntaxKind::ERROR).is_some());
    }

    #[test]
    fn unclosed_selector_is_recovered() {
        let tree = parse(r#"{foo="bar" | json"#);
        assert!(has_error(&tree));
        assert!(find(&tree, SyntaxKind::LABEL_PARSER).is_some());
    }

    #[rstest]
    #[case(r#"{a="b"} |= "x""#)]
    #[case(r#"{a="b"} != "x""#)]
    #[case(r#"{a="b"} |~ "x""#)]
    #[case(r#"{a="b"} !~ "x""#)]
    #[case(r#"{a="b"} |> "<_> x""#)]
    #[case(r#"{a="b"} !> "<_> x""#)]
    fn line_filter_operators(#[case] query: &str) {
        let tree = parse(query);
        assert_eq!(count(&tree, SyntaxKind::LINE_FILTER), 1);
        assert!(!has_error(&tree));
    }

    #[test]
    fn consecutive_line_filters_share_a_stage() {
        let tree = parse(r#"{a="b"} |= "x" != "y" |~ "z""#);
        assert_eq!(count(&tree, SyntaxKind::LINE_FILTERS), 1);
        assert_eq!(count(&tree, SyntaxKind::LINE_FILTER), 3);
    }

    #[test]
    fn or_filters_nest() {
        let tree = parse(r#"{a="b"} |= "x" or "y" or "z""#);
        assert_eq!(count(&tree, SyntaxKind::OR_FILTER), 2);
        assert!(!has_error(&tree));
    }

    #[test]
    fn ip_line_filter() {
        let tree = parse(r#"{a="b"} |= ip("10.0.0.1")"#);
        assert!(find(&tree, SyntaxKind::FILTER_OP).is_some());
        assert!(!has_error(&tree));
    }

    #[rstest]
    #[case(r#"{a="b"} | json"#, SyntaxKind::LABEL_PARSER)]
    #[case(r#"{a="b"} | logfmt"#, SyntaxKind::LABEL_PARSER)]
    #[case(r#"{a="b"} | unpack"#, SyntaxKind::LABEL_PARSER)]
    #[case(r#"{a="b"} | regexp "(?P<x>\\w+)""#, SyntaxKind::LABEL_PARSER)]
    #[case(r#"{a="b"} | pattern "<ip> <_>""#, SyntaxKind::LABEL_PARSER)]
    #[case(r#"{a="b"} | json x, y="a.b""#, SyntaxKind::JSON_EXPRESSION_PARSER)]
    #[case(r#"{a="b"} | logfmt --strict"#, SyntaxKind::LOGFMT_PARSER)]
    #[case(r#"{a="b"} | logfmt --keep-empty x"#, SyntaxKind::LOGFMT_EXPRESSION_PARSER)]
    #[case(r#"{a="b"} | line_format "{{.msg}}""#, SyntaxKind::LINE_FORMAT_EXPR)]
    #[case(r#"{a="b"} | label_format x=y, z="{{.a}}""#, SyntaxKind::LABEL_FORMAT_EXPR)]
    #[case(r#"{a="b"} | drop x, y="z""#, SyntaxKind::DROP_LABELS_EXPR)]
    #[case(r#"{a="b"} | keep x, y"#, SyntaxKind::KEEP_LABELS_EXPR)]
    #[case(r#"{a="b"} | decolorize"#, SyntaxKind::DECOLORIZE_EXPR)]
    fn pipeline_stages(#[case] query: &str, #[case] expected: SyntaxKind) {
        let tree = parse(query);
        assert!(find(&tree, expected).is_some(), "no {expected} in {query}");
        assert!(!has_error(&tree), "unexpected error in {query}");
    }

    #[rstest]
    #[case(r#"{a="b"} | x="1""#, SyntaxKind::MATCHER)]
    #[case(r#"{a="b"} | x > 1"#, SyntaxKind::NUMBER_FILTER)]
    #[case(r#"{a="b"} | x == 1.5"#, SyntaxKind::NUMBER_FILTER)]
    #[case(r#"{a="b"} | d >= 10s"#, SyntaxKind::DURATION_FILTER)]
    #[case(r#"{a="b"} | size < 1KB"#, SyntaxKind::BYTES_FILTER)]
    #[case(r#"{a="b"} | addr = ip("10.0.0.0/8")"#, SyntaxKind::IP_LABEL_FILTER)]
    fn label_filter_forms(#[case] query: &str, #[case] expected: SyntaxKind) {
        let tree = parse(query);
        assert!(find(&tree, SyntaxKind::LABEL_FILTER).is_some());
        assert!(find(&tree, expected).is_some(), "no {expected} in {query}");
        assert!(!has_error(&tree), "unexpected error in {query}");
    }

    #[rstest]
    #[case(r#"{a="b"} | x="1" and y="2""#)]
    #[case(r#"{a="b"} | x="1" or y="2""#)]
    #[case(r#"{a="b"} | x="1", y="2""#)]
    #[case(r#"{a="b"} | x="1" y="2""#)]
    #[case(r#"{a="b"} | (x="1" or y="2")"#)]
    fn combined_label_filters(#[case] query: &str) {
        let tree = parse(query);
        let outer = find(&tree, SyntaxKind::LABEL_FILTER).unwrap();
        assert_eq!(count(&outer, SyntaxKind::MATCHER), 2);
        assert!(!has_error(&tree), "unexpected error in {query}");
    }

    #[test]
    fn or_binds_looser_than_and() {
        let tree = parse(r#"{a="b"} | x="1" and y="2" or z="3""#);
        let outer = find(&tree, SyntaxKind::LABEL_FILTER).unwrap();
        let left = outer.first_child().unwrap();
        assert_eq!(left.text().to_string(), r#"x="1" and y="2""#);
    }

    #[test]
    fn keyword_followed_by_comparison_is_a_label() {
        let tree = parse(r#"{a="b"} | json="x""#);
        assert!(find(&tree, SyntaxKind::LABEL_PARSER).is_none());
        assert!(find(&tree, SyntaxKind::LABEL_FILTER).is_some());
    }

    #[test]
    fn dangling_pipe_is_an_error() {
        let tree = parse(r#"{a="b"} |"#);
        assert!(has_error(&tree));
    }

    #[test]
    fn unknown_stage_is_an_error() {
        let tree = parse(r#"{a="b"} | frobnicate"#);
        assert!(has_error(&tree));
        assert_eq!(tree.text().to_string(), r#"{a="b"} | frobnicate"#);
    }

    #[test]
    fn deeply_nested_label_filter_keeps_the_selector() {
        let depth = 20_000;
        let input = format!(
            r#"{{app="api"}} | {}x="y"{}"#,
            "(".repeat(depth),
            ")".repeat(depth)
        );
        let tree = parse(&input);

        assert_eq!(tree.text().to_string(), input);
        assert!(has_error(&tree));
        assert_eq!(count(&tree, SyntaxKind::SELECTOR), 1);
        assert_eq!(count(&tree, SyntaxKind::MATCHER), 1);
    }

    #[test]
    fn long_or_filter_chain_is_cut_off() {
        let input = format!(r#"{{a="b"}} |= "x"{}"#, r#" or "y""#.repeat(20_000));
        let tree = parse(&input);

        assert_eq!(tree.text().to_string(), input);
        assert!(has_error(&tree));
        assert!(count(&tree, SyntaxKind::OR_FILTER) < crate::parser::MAX_DEPTH);
    }
}
