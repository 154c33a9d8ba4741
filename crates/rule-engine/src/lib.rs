//! # rule-engine
//!
//! Access decisions for HID devices. A rules file lists device targets,
//! process-id filters and the decision to return; requests are answered by
//! the first declared rule whose target and filter both match.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use rule_engine::{loader, DecisionEngine};
//!
//! let rules = loader::load_rules("rules.yaml").unwrap();
//! let engine = DecisionEngine::new(rules);
//! let decision = engine.process_access_request(r"HID\VID_054C&PID_09CC", "pad", "0", 4242);
//! println!("{:?}", decision);
//! ```

mod decision;
mod evaluator;
pub mod filter;
pub mod loader;
mod ruleset;
mod schema;
mod target;

// Re-export primary public API at crate root.
pub use decision::Decision;
pub use evaluator::{evaluate, DecisionEngine};
pub use filter::{Filter, FilterNode, FilterSyntaxError, PidRange, PidSet};
pub use loader::ConfigLoadError;
pub use ruleset::{Rule, RuleSet};
pub use schema::{RuleDocument, RuleEntry};
pub use target::Target;
