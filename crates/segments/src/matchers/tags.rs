//! Matcher for the contact's tag set.
//!
//! Tags are compared exactly (no case folding). Order and duplicates in the
//! contact's tag list do not matter.

use super::{with_list, with_text};
use crate::traits::{FieldMatcher, MatchContext};
use contacts::{Contact, Operator, RuleValue};

/// Set operators over `Contact::tags`.
///
/// ## Operators
/// - `isEmpty` / `isNotEmpty`: the contact has no tags / some tags
/// - `hasAnyOf` / `hasAllOf` / `hasNoneOf`: list operand
/// - `equals`: string operand, holds when it is one of the tags
pub struct TagsMatcher;

impl FieldMatcher for TagsMatcher {
    fn name(&self) -> &str {
        "tags"
    }

    fn matches(
        &self,
        contact: &Contact,
        operator: Operator,
        value: &RuleValue,
        _context: &MatchContext<'_>,
    ) -> bool {
        let tags = &contact.tags;
        let has = |tag: &String| tags.contains(tag);

        match operator {
            Operator::IsEmpty => tags.is_empty(),
            Operator::IsNotEmpty => !tags.is_empty(),
            Operator::HasAnyOf => with_list(value, |wanted| wanted.iter().any(has)),
            Operator::HasAllOf => with_list(value, |wanted| wanted.iter().all(has)),
            Operator::HasNoneOf => with_list(value, |wanted| !wanted.iter().any(has)),
            Operator::Equals => with_text(value, |tag| tags.iter().any(|t| t == tag)),
            _ => false,
        }
    }
}
