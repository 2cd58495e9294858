//! Fallback matcher for fields with no registered matcher.

use crate::traits::{FieldMatcher, MatchContext};
use contacts::{Contact, Operator, RuleValue};

/// Matches nothing. A rule on an unrecognized field therefore excludes
/// every contact instead of being ignored.
pub struct RejectAll;

impl FieldMatcher for RejectAll {
    fn name(&self) -> &str {
        "rejectAll"
    }

    fn matches(
        &self,
        _contact: &Contact,
        _operator: Operator,
        _value: &RuleValue,
        _context: &MatchContext<'_>,
    ) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matchers::test_support::context;

    #[test]
    fn test_reject_all() {
        let contact = Contact {
            tags: vec!["VIP".to_string()],
            ..Contact::new("c")
        };
        let ctx = context();

        for op in Operator::ALL {
            assert!(!RejectAll.matches(&contact, op, &RuleValue::Null, &ctx));
            assert!(!RejectAll.matches(&contact, op, &RuleValue::list(["VIP"]), &ctx));
        }
    }
}
