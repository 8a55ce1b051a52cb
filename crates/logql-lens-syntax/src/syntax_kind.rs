//! SyntaxKind enum for all tokens and nodes in the LogQL CST.
//!
//! Following the rust-analyzer model, all tokens and nodes share a single enum.
//! Every byte in the source must appear as a token in the tree.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// All syntax kinds for the LogQL CST.
///
/// This enum represents both tokens (lexer output and keywords remapped by the
/// grammar) and composite nodes (parser output). The `repr(u16)` ensures
/// efficient storage in rowan's green tree.
///
/// We use SCREAMING_CASE following the rust-analyzer convention for SyntaxKind.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(non_camel_case_types)]
pub enum SyntaxKind {
    // === Trivia ===
    /// Spaces, tabs and line endings
    WHITESPACE,
    /// `# ...` up to the end of the line
    COMMENT,

    // === Punctuation (anonymous) ===
    L_BRACE,
    R_BRACE,
    L_PAREN,
    R_PAREN,
    L_BRACKET,
    R_BRACKET,
    COMMA,
    /// Character the lexer does not recognise
    UNKNOWN,

    // === Literals ===
    /// Label or field name
    IDENTIFIER,
    /// Double-quoted or backtick-quoted string, quotes included
    STRING,
    NUMBER,
    /// `5m`, `1h30m`, `250ms`
    DURATION,
    /// `10kb`, `3MiB`
    BYTES,
    /// `--strict`, `--keep-empty`
    PARSER_FLAG,

    // === Operators ===
    /// `=`
    EQ,
    /// `!=`
    NEQ,
    /// `=~`
    RE,
    /// `!~`
    NRE,
    /// `!>`
    NPA,
    /// `==`
    EQL,
    /// `>`
    GTR,
    /// `>=`
    GTE,
    /// `<`
    LSS,
    /// `<=`
    LTE,
    /// `|`
    PIPE,
    /// `|=`
    PIPE_EXACT,
    /// `|~`
    PIPE_MATCH,
    /// `|>`
    PIPE_PATTERN,
    ADD,
    SUB,
    MUL,
    DIV,
    MOD,
    POW,

    // === Contextual keywords (remapped from IDENTIFIER by the grammar) ===
    JSON,
    LOGFMT,
    REGEXP,
    UNPACK,
    PATTERN,
    LINE_FORMAT,
    LABEL_FORMAT,
    DROP,
    KEEP,
    DECOLORIZE,
    UNWRAP,
    OFFSET,
    BY,
    WITHOUT,
    BOOL,
    AND,
    OR,
    UNLESS,
    IP,
    VECTOR,

    // Range aggregation operators
    RATE,
    RATE_COUNTER,
    COUNT_OVER_TIME,
    BYTES_RATE,
    BYTES_OVER_TIME,
    AVG_OVER_TIME,
    SUM_OVER_TIME,
    MIN_OVER_TIME,
    MAX_OVER_TIME,
    STDDEV_OVER_TIME,
    STDVAR_OVER_TIME,
    QUANTILE_OVER_TIME,
    FIRST_OVER_TIME,
    LAST_OVER_TIME,
    ABSENT_OVER_TIME,

    // Vector aggregation operators
    SUM,
    AVG,
    COUNT,
    MAX,
    MIN,
    STDDEV,
    STDVAR,
    BOTTOMK,
    TOPK,
    SORT,
    SORT_DESC,

    // Unwrap conversion functions
    BYTES_CONV,
    DURATION_CONV,
    DURATION_SECONDS_CONV,

    /// End of file marker
    EOF,

    // === Composite Nodes (parser output) ===
    /// Root node, always spans the whole query
    LOG_QL,
    EXPR,
    LOG_EXPR,
    METRIC_EXPR,
    /// Stream selector `{...}`
    SELECTOR,
    MATCHERS,
    /// `key <op> "value"`
    MATCHER,
    PIPELINE_EXPR,
    PIPELINE_STAGE,
    LINE_FILTERS,
    LINE_FILTER,
    FILTER,
    FILTER_OP,
    OR_FILTER,
    LABEL_PARSER,
    JSON_EXPRESSION_PARSER,
    LOGFMT_PARSER,
    LOGFMT_EXPRESSION_PARSER,
    LABEL_EXTRACTION_EXPRESSION_LIST,
    LABEL_EXTRACTION_EXPRESSION,
    LABEL_FILTER,
    IP_LABEL_FILTER,
    UNIT_FILTER,
    DURATION_FILTER,
    BYTES_FILTER,
    NUMBER_FILTER,
    LINE_FORMAT_EXPR,
    LABEL_FORMAT_EXPR,
    LABELS_FORMAT,
    LABEL_FORMAT_MATCHER,
    DROP_LABELS_EXPR,
    DROP_LABELS,
    DROP_LABEL,
    KEEP_LABELS_EXPR,
    KEEP_LABELS,
    KEEP_LABEL,
    DECOLORIZE_EXPR,
    RANGE_AGGREGATION_EXPR,
    RANGE_OP,
    LOG_RANGE_EXPR,
    /// `[5m]`
    RANGE,
    OFFSET_EXPR,
    UNWRAP_EXPR,
    CONV_OP,
    VECTOR_AGGREGATION_EXPR,
    VECTOR_OP,
    /// `by (...)` / `without (...)`
    GROUPING,
    LABELS,
    BIN_OP_EXPR,
    BOOL_MODIFIER,
    LITERAL_EXPR,
    VECTOR_EXPR,

    /// Error recovery node
    ERROR,
}

impl SyntaxKind {
    /// Returns true if this kind represents a token (lexer output).
    pub fn is_token(self) -> bool {
        (self as u16) <= (Self::EOF as u16)
    }

    /// Returns true if this kind represents a composite node.
    pub fn is_node(self) -> bool {
        !self.is_token()
    }

    /// Returns true if this kind is trivia (whitespace/comments).
    pub fn is_trivia(self) -> bool {
        matches!(self, Self::WHITESPACE | Self::COMMENT)
    }

    /// Returns true for punctuation that only delimits structure.
    pub fn is_punctuation(self) -> bool {
        matches!(
            self,
            Self::L_BRACE
                | Self::R_BRACE
                | Self::L_PAREN
                | Self::R_PAREN
                | Self::L_BRACKET
                | Self::R_BRACKET
                | Self::COMMA
        )
    }

    /// Returns true if elements of this kind show up when walking the tree.
    ///
    /// Every composite node is named. Tokens are named unless they are
    /// trivia, punctuation or unrecognised input (which always sits inside
    /// an `ERROR` node anyway).
    pub fn is_named(self) -> bool {
        self.is_node()
            || !(self.is_trivia()
                || self.is_punctuation()
                || matches!(self, Self::UNKNOWN | Self::EOF))
    }

    /// Converts a raw rowan kind back, returning `None` when out of range.
    pub fn from_raw(raw: u16) -> Option<Self> {
        if raw <= SyntaxKind::ERROR as u16 {
            // SAFETY: bounds checked above and SyntaxKind is repr(u16) with
            // contiguous discriminants starting at zero.
            Some(unsafe { std::mem::transmute::<u16, SyntaxKind>(raw) })
        } else {
            None
        }
    }

    /// Iterates every kind in declaration order.
    pub fn all() -> impl Iterator<Item = SyntaxKind> {
        (0..=SyntaxKind::ERROR as u16).filter_map(SyntaxKind::from_raw)
    }
}

impl fmt::Display for SyntaxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown syntax kind `{0}`")]
pub struct ParseSyntaxKindError(pub String);

impl FromStr for SyntaxKind {
    type Err = ParseSyntaxKindError;

    /// Parses the SCREAMING_CASE name, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SyntaxKind::all()
            .find(|kind| kind.to_string().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseSyntaxKindError(s.to_string()))
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

/// Language definition for rowan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogQlLang {}

impl rowan::Language for LogQlLang {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        match SyntaxKind::from_raw(raw.0) {
            Some(kind) => kind,
            None => panic!("raw syntax kind {} out of range", raw.0),
        }
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

/// Type alias for our syntax nodes.
pub type SyntaxNode = rowan::SyntaxNode<LogQlLang>;
/// Type alias for our syntax tokens.
pub type SyntaxToken = rowan::SyntaxToken<LogQlLang>;
/// Type alias for syntax elements (node or token).
pub type SyntaxElement = rowan::SyntaxElement<LogQlLang>;
