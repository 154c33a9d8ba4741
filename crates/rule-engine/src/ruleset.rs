use crate::filter::{Filter, FilterNode};
use crate::schema::{RuleDocument, RuleEntry};
use crate::target::Target;

/// A target, a process filter and the decision to hand out when both match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    name: Option<String>,
    target: Target,
    filter: Filter,
    is_allowed: bool,
    is_permanent: bool,
}

impl Rule {
    pub(crate) fn new(
        name: Option<String>,
        target: Target,
        filter: Filter,
        is_allowed: bool,
        is_permanent: bool,
    ) -> Self {
        Self {
            name,
            target,
            filter,
            is_allowed,
            is_permanent,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn is_allowed(&self) -> bool {
        self.is_allowed
    }

    pub fn is_permanent(&self) -> bool {
        self.is_permanent
    }

    /// True when the target is identical and the filter accepts `pid`.
    pub fn applies_to(&self, target: &Target, pid: u32) -> bool {
        self.target == *target && self.filter.accepts(pid)
    }
}

/// The loaded rules, in declaration order.
///
/// Only the loader constructs a `RuleSet`, and nothing mutates it afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub(crate) fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Rule> {
        self.rules.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }

    /// The first declared rule that applies, with its index.
    pub fn first_match(&self, target: &Target, pid: u32) -> Option<(usize, &Rule)> {
        self.rules
            .iter()
            .enumerate()
            .find(|(_, rule)| rule.applies_to(target, pid))
    }

    /// Re-emit the rules as a document that loads back into an equivalent set.
    pub fn to_document(&self) -> RuleDocument {
        RuleDocument {
            rules: self
                .iter()
                .map(|rule| RuleEntry {
                    name: rule.name.clone(),
                    target: rule.target.clone(),
                    filter: FilterNode::from(rule.filter.clone()),
                    is_allowed: rule.is_allowed,
                    is_permanent: rule.is_permanent,
                })
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}
