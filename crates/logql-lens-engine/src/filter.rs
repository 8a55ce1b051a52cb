//! Label matchers as extracted from a query.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown operator `{0}`")]
pub struct ParseOperatorError(pub String);

/// Matcher operator, as far as the matcher extractor tells them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterOp {
    #[serde(rename = "=")]
    Equal,
    #[serde(rename = "!=")]
    NotEqual,
}

impl FilterOp {
    /// Classify the raw text between label name and value.
    ///
    /// Only a literal `=` is `Equal`. Everything else, regex operators
    /// included, is `NotEqual`.
    pub fn from_operator_text(text: &str) -> Self {
        if text == "=" {
            FilterOp::Equal
        } else {
            FilterOp::NotEqual
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FilterOp::Equal => "=",
            FilterOp::NotEqual => "!=",
        }
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a matcher sits relative to the stream selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterType {
    /// Inside the stream selector
    IndexedLabel,
    /// In a label filter stage after the selector
    NonIndexedLabel,
}

/// One label matcher: `key <op> "value"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub key: String,
    pub op: FilterOp,
    /// Every string under the matcher, quotes stripped, in document order
    pub values: Vec<String>,
    #[serde(rename = "type")]
    pub filter_type: FilterType,
}
