use serde::Serialize;

use crate::ruleset::Rule;

/// The outcome of evaluating an access request against the loaded rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    /// Whether any rule applied. `false` must be treated as deny.
    pub matched: bool,
    pub is_allowed: bool,
    /// Whether the host may cache this answer for the device/process pair.
    pub is_permanent: bool,
    /// Declaration index of the rule that produced the decision.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule: Option<usize>,
}

impl Decision {
    /// The no-match decision: nothing applied, access denied.
    pub fn deny() -> Self {
        Self {
            matched: false,
            is_allowed: false,
            is_permanent: false,
            rule: None,
        }
    }

    pub(crate) fn from_rule(index: usize, rule: &Rule) -> Self {
        Self {
            matched: true,
            is_allowed: rule.is_allowed(),
            is_permanent: rule.is_permanent(),
            rule: Some(index),
        }
    }

    /// Collapse to the host's `(matched, is_allowed, is_permanent)` triple.
    pub fn into_parts(self) -> (bool, bool, bool) {
        (self.matched, self.is_allowed, self.is_permanent)
    }
}

impl Default for Decision {
    fn default() -> Self {
        Self::deny()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deny_has_all_flags_cleared() {
        let d = Decision::deny();
        assert_eq!(d.into_parts(), (false, false, false));
        assert!(d.rule.is_none());
        assert_eq!(Decision::default(), d);
    }

    #[test]
    fn serializes_camel_case_without_empty_rule() {
        let json = serde_json::to_value(Decision::deny()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"matched": false, "isAllowed": false, "isPermanent": false})
        );

        let matched = Decision {
            matched: true,
            is_allowed: true,
            is_permanent: false,
            rule: Some(3),
        };
        let json = serde_json::to_value(matched).unwrap();
        assert_eq!(json["rule"], 3);
        assert_eq!(json["isAllowed"], true);
    }
}
