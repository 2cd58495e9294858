//! Matcher for free-text attributes (names, email address).

use super::{text_attribute, with_text};
use crate::traits::{FieldMatcher, MatchContext};
use contacts::{Contact, Field, Operator, RuleValue};

/// Free-text comparisons.
///
/// `equals` / `notEquals` compare exactly. The substring operators
/// (`contains`, `notContains`, `startsWith`, `endsWith`) lowercase both
/// sides first. An absent attribute reads as `""`.
pub struct TextMatcher {
    field: Field,
    operators: &'static [Operator],
}

impl TextMatcher {
    pub fn new(field: Field, operators: &'static [Operator]) -> Self {
        Self { field, operators }
    }
}

impl FieldMatcher for TextMatcher {
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

        let actual = text_attribute(contact, self.field);
        let lowered = || actual.to_lowercase();

        match operator {
            Operator::Equals => with_text(value, |v| actual == v),
            Operator::NotEquals => with_text(value, |v| actual != v),
            Operator::Contains => with_text(value, |v| lowered().contains(&v.to_lowercase())),
            Operator::NotContains => with_text(value, |v| !lowered().contains(&v.to_lowercase())),
            Operator::StartsWith => with_text(value, |v| lowered().starts_with(&v.to_lowercase())),
            Operator::EndsWith => with_text(value, |v| lowered().ends_with(&v.to_lowercase())),
            Operator::IsEmpty | Operator::DoesNotExist => actual.is_empty(),
            Operator::IsNotEmpty | Operator::Exists => !actual.is_empty(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matchers::test_support::context;
    use crate::matchers::{EMAIL_OPERATORS, NAME_OPERATORS};

    fn named(first: Option<&str>) -> Contact {
        Contact {
            first_name: first.map(str::to_string),
            ..Contact::new("c")
        }
    }

    #[test]
    fn test_name_substring_ops_ignore_case() {
        let m = TextMatcher::new(Field::FirstName, NAME_OPERATORS);
        let contact = named(Some("Abdullah"));
        let ctx = context();

        assert!(m.matches(&contact, Operator::Contains, &RuleValue::text("DULL"), &ctx));
        assert!(!m.matches(&contact, Operator::NotContains, &RuleValue::text("dull"), &ctx));
        assert!(m.matches(&contact, Operator::StartsWith, &RuleValue::text("abd"), &ctx));
        assert!(m.matches(&contact, Operator::EndsWith, &RuleValue::text("LAH"), &ctx));
        assert!(m.matches(&contact, Operator::NotContains, &RuleValue::text("xyz"), &ctx));
    }

    #[test]
    fn test_name_equality_is_exact() {
        let m = TextMatcher::new(Field::FirstName, NAME_OPERATORS);
        let contact = named(Some("Abdullah"));
        let ctx = context();

        assert!(m.matches(&contact, Operator::Equals, &RuleValue::text("Abdullah"), &ctx));
        assert!(!m.matches(&contact, Operator::Equals, &RuleValue::text("abdullah"), &ctx));
        assert!(m.matches(&contact, Operator::NotEquals, &RuleValue::text("abdullah"), &ctx));
    }

    #[test]
    fn test_absent_name_defaults_to_empty() {
        let m = TextMatcher::new(Field::FirstName, NAME_OPERATORS);
        let ctx = context();

        for contact in [named(None), named(Some(""))] {
            assert!(m.matches(&contact, Operator::IsEmpty, &RuleValue::Null, &ctx));
            assert!(!m.matches(&contact, Operator::IsNotEmpty, &RuleValue::Null, &ctx));
            assert!(!m.matches(&contact, Operator::Contains, &RuleValue::text("a"), &ctx));
            assert!(m.matches(&contact, Operator::NotContains, &RuleValue::text("a"), &ctx));
        }
        assert!(m.matches(&named(Some("Sara")), Operator::IsNotEmpty, &RuleValue::Null, &ctx));
    }

    #[test]
    fn test_name_rejects_exists() {
        let m = TextMatcher::new(Field::LastName, NAME_OPERATORS);
        let contact = Contact {
            last_name: Some("Haddad".to_string()),
            ..Contact::new("c")
        };
        assert!(!m.matches(&contact, Operator::Exists, &RuleValue::Null, &context()));
        assert!(m.matches(&contact, Operator::EndsWith, &RuleValue::text("dad"), &context()));
    }

    #[test]
    fn test_email_operators() {
        let m = TextMatcher::new(Field::EmailAddress, EMAIL_OPERATORS);
        let contact = Contact {
            email_address: Some("Noura@Example.com".to_string()),
            ..Contact::new("c")
        };
        let ctx = context();

        assert!(m.matches(&contact, Operator::EndsWith, &RuleValue::text("@example.com"), &ctx));
        assert!(m.matches(&contact, Operator::StartsWith, &RuleValue::text("noura"), &ctx));
        assert!(m.matches(&contact, Operator::Contains, &RuleValue::text("EXAMPLE"), &ctx));
        assert!(m.matches(&contact, Operator::Exists, &RuleValue::Null, &ctx));
        assert!(!m.matches(&contact, Operator::DoesNotExist, &RuleValue::Null, &ctx));
        assert!(!m.matches(&contact, Operator::NotContains, &RuleValue::text("x"), &ctx));
        assert!(!m.matches(&contact, Operator::IsEmpty, &RuleValue::Null, &ctx));
        assert!(m.matches(&Contact::new("d"), Operator::DoesNotExist, &RuleValue::Null, &ctx));
    }
}
