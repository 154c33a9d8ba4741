use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::filter::{Filter, FilterSyntaxError};
use crate::ruleset::{Rule, RuleSet};
use crate::schema::RuleDocument;

/// Errors that prevent a [`RuleSet`] from being produced.
///
/// Any single bad rule fails the whole load; there is no partial rule set.
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read rules file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse rules document: {0}")]
    Parse(#[from] serde_yml::Error),

    #[error("rule #{index}{} has an invalid filter: {source}", describe(.name))]
    InvalidRule {
        index: usize,
        name: Option<String>,
        #[source]
        source: FilterSyntaxError,
    },
}

fn describe(name: &Option<String>) -> String {
    name.as_ref()
        .map(|n| format!(" ('{n}')"))
        .unwrap_or_default()
}

/// Load a [`RuleSet`] from a YAML file on disk.
pub fn load_rules(path: impl AsRef<Path>) -> Result<RuleSet, ConfigLoadError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigLoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let rules = load_rules_from_str(&contents)?;
    info!(path = %path.display(), rules = rules.len(), "loaded rules file");
    Ok(rules)
}

/// Parse and validate a [`RuleSet`] from a YAML string.
pub fn load_rules_from_str(yaml: &str) -> Result<RuleSet, ConfigLoadError> {
    let document: RuleDocument = serde_yml::from_str(yaml)?;
    load_rules_from_document(document)
}

/// Classify every filter in an already decoded document.
pub fn load_rules_from_document(document: RuleDocument) -> Result<RuleSet, ConfigLoadError> {
    let rules = document
        .rules
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            let filter = Filter::parse(&entry.filter).map_err(|source| {
                ConfigLoadError::InvalidRule {
                    index,
                    name: entry.name.clone(),
                    source,
                }
            })?;
            debug!(index, name = ?entry.name, %filter, "rule accepted");
            Ok(Rule::new(
                entry.name,
                entry.target,
                filter,
                entry.is_allowed,
                entry.is_permanent,
            ))
        })
        .collect::<Result<Vec<_>, ConfigLoadError>>()?;

    Ok(RuleSet::new(rules))
}
