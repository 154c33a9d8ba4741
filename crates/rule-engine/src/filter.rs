use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Token that accepts every process id.
pub const WILDCARD: &str = "*";

const RANGE_SEPARATOR: char = '-';
const LIST_SEPARATOR: char = ',';

/// Errors produced while turning a filter expression into a [`Filter`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterSyntaxError {
    #[error("filter expression is empty")]
    Empty,

    /// Not an unsigned 32-bit integer (signs, garbage, overflow).
    #[error("'{token}' is not a valid process id")]
    InvalidNumber { token: String },

    #[error("range {low}-{high} is inverted; the low bound must not exceed the high bound")]
    InvertedRange { low: u32, high: u32 },

    #[error("range '{expr}' is missing a bound")]
    MissingBound { expr: String },

    #[error("process id list is empty")]
    EmptyList,

    #[error("'{expr}' is not a wildcard, process id, range or list")]
    Malformed { expr: String },
}

/// A set-membership test over process ids.
///
/// Textual grammar, applied to the trimmed expression in this order:
///
/// 1. `*` accepts everything.
/// 2. `1234` accepts exactly that pid.
/// 3. `100-200` accepts the inclusive range. Pids are unsigned, so `-` never
///    appears inside a number and always means "range".
/// 4. `4, 8, 15` accepts any listed pid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "FilterNode", into = "FilterNode")]
pub enum Filter {
    Any,
    Exact(u32),
    Set(PidSet),
    Range(PidRange),
}

/// Inclusive pid range. Bounds are never inverted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PidRange {
    low: u32,
    high: u32,
}

impl PidRange {
    pub fn new(low: u32, high: u32) -> Result<Self, FilterSyntaxError> {
        if low > high {
            return Err(FilterSyntaxError::InvertedRange { low, high });
        }
        Ok(Self { low, high })
    }

    pub fn low(&self) -> u32 {
        self.low
    }

    pub fn high(&self) -> u32 {
        self.high
    }

    pub fn contains(&self, pid: u32) -> bool {
        (self.low..=self.high).contains(&pid)
    }
}

/// Non-empty set of pids, kept sorted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PidSet(BTreeSet<u32>);

impl PidSet {
    /// An empty set would silently match nothing, so it is rejected.
    pub fn new(values: impl IntoIterator<Item = u32>) -> Result<Self, FilterSyntaxError> {
        let values: BTreeSet<u32> = values.into_iter().collect();
        if values.is_empty() {
            return Err(FilterSyntaxError::EmptyList);
        }
        Ok(Self(values))
    }

    pub fn contains(&self, pid: u32) -> bool {
        self.0.contains(&pid)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Never true for a constructed set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Members in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.iter().copied()
    }
}

impl Filter {
    /// Build an inclusive range, rejecting inverted bounds.
    pub fn range(low: u32, high: u32) -> Result<Self, FilterSyntaxError> {
        PidRange::new(low, high).map(Self::Range)
    }

    /// Build a set filter, rejecting an empty set.
    pub fn set(values: impl IntoIterator<Item = u32>) -> Result<Self, FilterSyntaxError> {
        PidSet::new(values).map(Self::Set)
    }

    /// Convert a raw configuration node into a filter.
    pub fn parse(node: &FilterNode) -> Result<Self, FilterSyntaxError> {
        match node {
            FilterNode::Number(n) => Ok(Self::Exact(pid_from_int(*n)?)),
            FilterNode::List(items) => {
                let values = items
                    .iter()
                    .map(|n| pid_from_int(*n))
                    .collect::<Result<Vec<_>, _>>()?;
                Self::set(values)
            }
            FilterNode::Text(expr) => expr.parse(),
        }
    }

    pub fn accepts(&self, pid: u32) -> bool {
        match self {
            Self::Any => true,
            Self::Exact(value) => pid == *value,
            Self::Set(values) => values.contains(pid),
            Self::Range(range) => range.contains(pid),
        }
    }
}

impl FromStr for Filter {
    type Err = FilterSyntaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let expr = s.trim();
        if expr.is_empty() {
            return Err(FilterSyntaxError::Empty);
        }
        if expr == WILDCARD {
            return Ok(Self::Any);
        }
        if is_digits(expr) {
            return Ok(Self::Exact(parse_pid(expr)?));
        }

        if let Some((low, high)) = expr.split_once(RANGE_SEPARATOR) {
            let (low, high) = (low.trim(), high.trim());
            if low.is_empty() || high.is_empty() {
                return Err(FilterSyntaxError::MissingBound {
                    expr: expr.to_string(),
                });
            }
            return Self::range(parse_pid(low)?, parse_pid(high)?);
        }

        if expr.contains(LIST_SEPARATOR) {
            let values = expr
                .split(LIST_SEPARATOR)
                .map(|token| {
                    let token = token.trim();
                    if token.is_empty() {
                        return Err(FilterSyntaxError::Malformed {
                            expr: expr.to_string(),
                        });
                    }
                    parse_pid(token)
                })
                .collect::<Result<Vec<_>, _>>()?;
            return Self::set(values);
        }

        Err(FilterSyntaxError::Malformed {
            expr: expr.to_string(),
        })
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str(WILDCARD),
            Self::Exact(value) => write!(f, "{value}"),
            Self::Range(range) => write!(f, "{}{RANGE_SEPARATOR}{}", range.low, range.high),
            Self::Set(values) => {
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, "{LIST_SEPARATOR} ")?;
                    }
                    write!(f, "{value}")?;
                }
                Ok(())
            }
        }
    }
}

/// A filter exactly as it appears in the YAML document, before
/// classification: a bare integer, a sequence of integers, or a string
/// expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterNode {
    Number(i64),
    List(Vec<i64>),
    Text(String),
}

impl TryFrom<FilterNode> for Filter {
    type Error = FilterSyntaxError;

    fn try_from(node: FilterNode) -> Result<Self, Self::Error> {
        Filter::parse(&node)
    }
}

impl From<Filter> for FilterNode {
    fn from(filter: Filter) -> Self {
        match filter {
            Filter::Exact(value) => FilterNode::Number(i64::from(value)),
            Filter::Set(values) => FilterNode::List(values.iter().map(i64::from).collect()),
            other => FilterNode::Text(other.to_string()),
        }
    }
}

fn is_digits(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit())
}

// `u32::from_str` tolerates a leading `+`; only plain digits are accepted.
fn parse_pid(token: &str) -> Result<u32, FilterSyntaxError> {
    let invalid = || FilterSyntaxError::InvalidNumber {
        token: token.to_string(),
    };
    if !is_digits(token) {
        return Err(invalid());
    }
    token.parse().map_err(|_| invalid())
}

fn pid_from_int(n: i64) -> Result<u32, FilterSyntaxError> {
    u32::try_from(n).map_err(|_| FilterSyntaxError::InvalidNumber {
        token: n.to_string(),
    })
}
