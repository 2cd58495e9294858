//! Matcher for single-valued categorical attributes.
//!
//! Covers `countryISO`, `channel`, `conversationStatus`, `language`,
//! `botStatus`, `assignee` and `lastInteractedChannel`. They differ only in
//! case folding and in which operators they accept.

use super::{CaseFold, text_attribute, with_list, with_text};
use crate::traits::{FieldMatcher, MatchContext};
use contacts::{Contact, Field, Operator, RuleValue};

/// Compares one text attribute against a value or a list of values.
///
/// An absent attribute compares as `""`.
pub struct KeywordMatcher {
    field: Field,
    case: CaseFold,
    operators: &'static [Operator],
}

impl KeywordMatcher {
    /// Create a new KeywordMatcher.
    ///
    /// # Arguments
    /// * `field` - Contact attribute to read
    /// * `case` - Folding applied to both sides before comparing
    /// * `operators` - Operators this field accepts; all others yield `false`
    pub fn new(field: Field, case: CaseFold, operators: &'static [Operator]) -> Self {
        Self {
            field,
            case,
            operators,
        }
    }
}

impl FieldMatcher for KeywordMatcher {
    fn name(&self) -> &str {
        self.field.as_str()
    }

    fn matches(
        &self,
        contact: &Contact,
        operator: Operator,
        value: &RuleValue,
        _context: &MatchContext<'_>,
    ) -> bool {
        if !self.operators.contains(&operator) {
            return false;
        }

        let case = self.case;
        let actual = case.apply(text_attribute(contact, self.field));

        match operator {
            Operator::Equals => with_text(value, |v| case.apply(v) == actual),
            Operator::NotEquals => with_text(value, |v| case.apply(v) != actual),
            Operator::In | Operator::HasAnyOf => {
                with_list(value, |list| list.iter().any(|v| case.apply(v) == actual))
            }
            Operator::NotIn | Operator::HasNoneOf => {
                with_list(value, |list| !list.iter().any(|v| case.apply(v) == actual))
            }
            // Single-valued: every listed value has to be this one
            Operator::HasAllOf => with_list(value, |list| list.iter().all(|v| case.apply(v) == actual)),
            Operator::Exists | Operator::IsNotEmpty => !actual.is_empty(),
            Operator::DoesNotExist | Operator::IsEmpty => actual.is_empty(),
            _ => false,
        }
    }
}
