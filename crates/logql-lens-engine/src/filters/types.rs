use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::filter::ParseOperatorError;

/// Operator of an indexed label or field filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterOperator {
    #[serde(rename = "=")]
    Equal,
    #[serde(rename = "!=")]
    NotEqual,
    #[serde(rename = "=~")]
    RegexEqual,
    #[serde(rename = "!~")]
    RegexNotEqual,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">=")]
    Gte,
    #[serde(rename = "<=")]
    Lte,
}

impl FilterOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            FilterOperator::Equal => "=",
            FilterOperator::NotEqual => "!=",
            FilterOperator::RegexEqual => "=~",
            FilterOperator::RegexNotEqual => "!~",
            FilterOperator::Gt => ">",
            FilterOperator::Lt => "<",
            FilterOperator::Gte => ">=",
            FilterOperator::Lte => "<=",
        }
    }

    /// `=`, `!=`, `=~` and `!~`, the operators a stream selector accepts.
    pub fn is_label_matcher(self) -> bool {
        matches!(
            self,
            FilterOperator::Equal
                | FilterOperator::NotEqual
                | FilterOperator::RegexEqual
                | FilterOperator::RegexNotEqual
        )
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterOperator {
    type Err = ParseOperatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let op = match s {
            "=" => FilterOperator::Equal,
            "!=" => FilterOperator::NotEqual,
            "=~" => FilterOperator::RegexEqual,
            "!~" => FilterOperator::RegexNotEqual,
            ">" => FilterOperator::Gt,
            "<" => FilterOperator::Lt,
            ">=" => FilterOperator::Gte,
            "<=" => FilterOperator::Lte,
            other => return Err(ParseOperatorError(other.to_string())),
        };
        Ok(op)
    }
}

/// Where a label comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LabelType {
    Indexed,
    StructuredMetadata,
    Parsed,
}

impl LabelType {
    /// Decode the one-letter codes Loki reports: `I`, `S` or `P`.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "I" => Some(LabelType::Indexed),
            "S" => Some(LabelType::StructuredMetadata),
            "P" => Some(LabelType::Parsed),
            _ => None,
        }
    }
}

/// Which parser stages precede a field filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParserType {
    Logfmt,
    Json,
    Mixed,
    StructuredMetadata,
}

impl ParserType {
    pub fn as_str(self) -> &'static str {
        match self {
            ParserType::Logfmt => "logfmt",
            ParserType::Json => "json",
            ParserType::Mixed => "mixed",
            ParserType::StructuredMetadata => "structuredMetadata",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LineFilterOp {
    #[serde(rename = "|=")]
    Match,
    #[serde(rename = "!=")]
    NegativeMatch,
    #[serde(rename = "|~")]
    Regex,
    #[serde(rename = "!~")]
    NegativeRegex,
}

impl LineFilterOp {
    pub fn as_str(self) -> &'static str {
        match self {
            LineFilterOp::Match => "|=",
            LineFilterOp::NegativeMatch => "!=",
            LineFilterOp::Regex => "|~",
            LineFilterOp::NegativeRegex => "!~",
        }
    }

    pub fn is_regex(self) -> bool {
        matches!(self, LineFilterOp::Regex | LineFilterOp::NegativeRegex)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PatternFilterOp {
    #[serde(rename = "|>")]
    Match,
    #[serde(rename = "!>")]
    NegativeMatch,
}

impl PatternFilterOp {
    pub fn as_str(self) -> &'static str {
        match self {
            PatternFilterOp::Match => "|>",
            PatternFilterOp::NegativeMatch => "!>",
        }
    }
}

/// A matcher from the stream selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedLabelFilter {
    pub key: String,
    pub operator: FilterOperator,
    pub value: String,
    #[serde(rename = "type")]
    pub label_type: LabelType,
}

/// A label filter stage on a parsed or metadata field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldFilter {
    pub key: String,
    pub operator: FilterOperator,
    pub value: String,
    #[serde(rename = "type")]
    pub label_type: LabelType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parser: Option<ParserType>,
}

/// `|= "text"` and friends.
///
/// `key` is `caseInsensitive` for `(?i)` regexes, otherwise
/// `caseSensitive,<index of the line filter>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineFilter {
    pub key: String,
    pub operator: LineFilterOp,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternFilter {
    pub operator: PatternFilterOp,
    pub value: String,
}

/// Everything the drilldown views need from a query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryFilters {
    pub label_filters: Vec<IndexedLabelFilter>,
    pub line_filters: Vec<LineFilter>,
    pub fields: Vec<FieldFilter>,
    pub pattern_filters: Vec<PatternFilter>,
}

/// Label name to type code (`I`, `S`, `P`), as reported alongside log lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelTypes(HashMap<String, String>);

impl LabelTypes {
    pub fn get(&self, label: &str) -> Option<LabelType> {
        self.0.get(label).and_then(|code| LabelType::from_code(code))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for LabelTypes {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
