use serde::{Deserialize, Serialize};

use crate::filter::FilterNode;
use crate::target::Target;

/// Root of the rules file, as written by the operator.
///
/// Filters are kept as raw [`FilterNode`]s here; they are classified when the
/// document is turned into a [`RuleSet`](crate::RuleSet) so that a bad filter
/// can be reported together with the rule it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleDocument {
    /// Rules in declaration order; the first one that matches wins.
    pub rules: Vec<RuleEntry>,
}

/// A single declared rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RuleEntry {
    /// Optional label, only used in logs and decision provenance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub target: Target,
    pub filter: FilterNode,
    pub is_allowed: bool,
    pub is_permanent: bool,
}
