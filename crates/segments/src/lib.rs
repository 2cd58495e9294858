//! Rule evaluation for audience segments.
//!
//! This crate provides:
//! - FieldMatcher trait and one matcher per contact field
//! - SegmentEngine for AND-composing rules over a contact pool
//! - Phone normalization used by the `phoneNumber` matcher
//! - Clock abstraction for the relative-time operators
//!
//! ## Architecture
//! A rule-set is a list of `(field, operator, value)` rules joined by AND.
//! For each rule the engine looks up the matcher registered for the field;
//! unregistered fields fall through to `RejectAll`. Matchers never fail:
//! anything they cannot interpret is a non-match.
//!
//! ## Example Usage
//! ```ignore
//! use contacts::{Field, FilterRule, Operator, RuleValue};
//! use segments::{FixedClock, SegmentEngine};
//!
//! let engine = SegmentEngine::builder()
//!     .clock(FixedClock::new(now))
//!     .build();
//!
//! let rules = vec![
//!     FilterRule::new(Field::Tags, Operator::HasAnyOf, RuleValue::list(["VIP"])),
//!     FilterRule::new(Field::CountryIso, Operator::Equals, RuleValue::text("SA")),
//! ];
//! let ids = engine.matching_ids(book.contacts(), &rules);
//! ```

pub mod clock;
pub mod engine;
pub mod matchers;
pub mod phone;
pub mod traits;

// Re-export main types
pub use clock::{Clock, FixedClock, SystemClock};
pub use engine::{Explanation, RuleOutcome, SegmentEngine, SegmentEngineBuilder};
pub use phone::{CallingCodeNormalizer, PhoneDetection, PhoneNormalizer, PhoneValidation, normalize_phone};
pub use traits::{FieldMatcher, MatchContext};

use contacts::{Contact, ContactId, FilterRule};
use std::collections::HashSet;
use std::sync::OnceLock;

fn default_engine() -> &'static SegmentEngine {
    static ENGINE: OnceLock<SegmentEngine> = OnceLock::new();
    ENGINE.get_or_init(SegmentEngine::new)
}

/// Evaluate one rule with the default engine (system clock, no phone
/// default region).
pub fn matches(contact: &Contact, rule: &FilterRule) -> bool {
    default_engine().matches(contact, rule)
}

/// Contacts satisfying every rule, using the default engine.
pub fn matching_ids(contacts: &[Contact], rules: &[FilterRule]) -> HashSet<ContactId> {
    default_engine().matching_ids(contacts, rules)
}
