//! Core trait for per-field rule evaluation.
//!
//! The engine keeps one `FieldMatcher` per `Field`. A rule is evaluated by
//! looking up the matcher for its field and handing it the operator and
//! value; fields without a matcher go to `RejectAll`.

use crate::phone::PhoneNormalizer;
use chrono::{DateTime, Utc};
use contacts::{Contact, Operator, RuleValue};

/// Everything a matcher may need besides the contact and the rule.
pub struct MatchContext<'a> {
    /// Reference instant for the relative-day operators
    pub now: DateTime<Utc>,
    pub phone: &'a dyn PhoneNormalizer,
}

/// Decides one `(operator, value)` pair against one contact attribute.
///
/// Implementations must be total: an operator they do not support, or a
/// value of the wrong shape, yields `false`.
pub trait FieldMatcher: Send + Sync {
    /// Returns the name of this matcher (for logging/debugging)
    fn name(&self) -> &str;

    fn matches(
        &self,
        contact: &Contact,
        operator: Operator,
        value: &RuleValue,
        context: &MatchContext<'_>,
    ) -> bool;
}
