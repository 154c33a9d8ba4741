use tracing::{debug, trace};

use crate::decision::Decision;
use crate::ruleset::RuleSet;
use crate::target::Target;

/// Find the first rule whose target equals `target` and whose filter accepts
/// `pid`, and return its decision. No match yields [`Decision::deny`].
pub fn evaluate(rules: &RuleSet, target: &Target, pid: u32) -> Decision {
    match rules.first_match(target, pid) {
        Some((index, rule)) => {
            trace!(index, name = ?rule.name(), "rule matched access request");
            Decision::from_rule(index, rule)
        }
        None => Decision::deny(),
    }
}

/// Answers access requests from a loaded [`RuleSet`].
///
/// The engine owns its rules and never mutates them, so it can be shared
/// across threads behind an `Arc` without locking. Replacing the rules means
/// building a new engine.
pub struct DecisionEngine {
    rules: RuleSet,
}

impl std::fmt::Debug for DecisionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecisionEngine")
            .field("num_rules", &self.rules.len())
            .finish()
    }
}

impl DecisionEngine {
    pub fn new(rules: RuleSet) -> Self {
        Self { rules }
    }

    pub fn rule_set(&self) -> &RuleSet {
        &self.rules
    }

    pub fn evaluate(&self, target: &Target, pid: u32) -> Decision {
        debug!(
            hardware_id = target.hardware_id(),
            device_id = target.device_id(),
            instance_id = target.instance_id(),
            pid,
            "evaluating access request"
        );
        let decision = evaluate(&self.rules, target, pid);
        debug!(
            matched = decision.matched,
            allowed = decision.is_allowed,
            permanent = decision.is_permanent,
            "access request evaluated"
        );
        decision
    }

    /// Host-facing form of [`evaluate`](Self::evaluate).
    pub fn process_access_request(
        &self,
        hardware_id: &str,
        device_id: &str,
        instance_id: &str,
        process_id: u32,
    ) -> Decision {
        self.evaluate(&Target::new(hardware_id, device_id, instance_id), process_id)
    }
}
