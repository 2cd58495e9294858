//! Matcher for `phoneNumber`.
//!
//! Both the stored number and the rule operand go through
//! [`normalize_phone`] before comparing, so `0501234567`, `+966 50 123 4567`
//! and `00966501234567` can all be made to agree.

use super::{text_attribute, with_pattern, with_text};
use crate::phone::{digits_only, national_number, normalize_phone};
use crate::traits::{FieldMatcher, MatchContext};
use contacts::{Contact, Field, Operator, RuleValue};

/// Phone comparisons.
///
/// ## Operators
/// - `equals` / `notEquals`: normalized forms
/// - `contains` / `startsWith`: normalized forms, or the raw strings
/// - `endsWith`: the contact's national number (calling code stripped)
/// - `exists` / `doesNotExist`
///
/// A blank operand never satisfies `contains`, `startsWith` or `endsWith`.
pub struct PhoneMatcher;

impl PhoneMatcher {
    /// Suffix an `endsWith` operand stands for.
    ///
    /// A full international operand is reduced to its national number;
    /// anything else contributes its digits.
    fn suffix(operand: &str, context: &MatchContext<'_>) -> String {
        let normalized = normalize_phone(context.phone, operand);
        if normalized.starts_with('+') {
            national_number(&normalized)
        } else {
            digits_only(operand)
        }
    }
}

impl FieldMatcher for PhoneMatcher {
    fn name(&self) -> &str {
        "phoneNumber"
    }

    fn matches(
        &self,
        contact: &Contact,
        operator: Operator,
        value: &RuleValue,
        context: &MatchContext<'_>,
    ) -> bool {
        let raw = text_attribute(contact, Field::PhoneNumber);
        let stored = || normalize_phone(context.phone, raw);
        let operand = |v: &str| normalize_phone(context.phone, v);

        match operator {
            Operator::Exists => !raw.is_empty(),
            Operator::DoesNotExist => raw.is_empty(),
            Operator::Equals => with_text(value, |v| stored() == operand(v)),
            Operator::NotEquals => with_text(value, |v| stored() != operand(v)),
            Operator::Contains => with_pattern(value, |v| {
                stored().contains(operand(v).as_str()) || raw.contains(v)
            }),
            Operator::StartsWith => with_pattern(value, |v| {
                stored().starts_with(operand(v).as_str()) || raw.starts_with(v)
            }),
            Operator::EndsWith => with_pattern(value, |v| {
                let suffix = Self::suffix(v, context);
                !suffix.is_empty() && national_number(&stored()).ends_with(&suffix)
            }),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matchers::test_support::context;
    use crate::phone::CallingCodeNormalizer;
    use chrono::Utc;

    fn with_phone(phone: &str) -> Contact {
        Contact {
            phone_number: Some(phone.to_string()),
            ..Contact::new("c")
        }
    }

    #[test]
    fn test_contains_falls_back_to_raw_substring() {
        let contact = with_phone("+966501234567");
        assert!(PhoneMatcher.matches(
            &contact,
            Operator::Contains,
            &RuleValue::text("501234567"),
            &context()
        ));
    }

    #[test]
    fn test_equals_across_formats() {
        let contact = with_phone("+966501234567");
        let ctx = context();

        for input in ["+966 50 123 4567", "00966501234567", "966501234567", "+9660501234567"] {
            assert!(
                PhoneMatcher.matches(&contact, Operator::Equals, &RuleValue::text(input), &ctx),
                "{input} should equal the stored number"
            );
        }
        assert!(PhoneMatcher.matches(&contact, Operator::NotEquals, &RuleValue::text("+966501234568"), &ctx));
    }

    #[test]
    fn test_default_region_resolves_national_input() {
        let normalizer = CallingCodeNormalizer::with_default_region("SA");
        let ctx = MatchContext {
            now: Utc::now(),
            phone: &normalizer,
        };
        let contact = with_phone("+966501234567");

        assert!(PhoneMatcher.matches(&contact, Operator::Equals, &RuleValue::text("0501234567"), &ctx));
        assert!(!PhoneMatcher.matches(&contact, Operator::Equals, &RuleValue::text("0501234567"), &context()));
    }

    #[test]
    fn test_starts_with() {
        let contact = with_phone("+966501234567");
        let ctx = context();

        assert!(PhoneMatcher.matches(&contact, Operator::StartsWith, &RuleValue::text("+966"), &ctx));
        assert!(PhoneMatcher.matches(&contact, Operator::StartsWith, &RuleValue::text("+96650"), &ctx));
        assert!(!PhoneMatcher.matches(&contact, Operator::StartsWith, &RuleValue::text("+971"), &ctx));
    }

    #[test]
    fn test_ends_with_uses_national_number() {
        let contact = with_phone("+966501234567");
        let ctx = context();

        assert!(PhoneMatcher.matches(&contact, Operator::EndsWith, &RuleValue::text("4567"), &ctx));
        assert!(PhoneMatcher.matches(&contact, Operator::EndsWith, &RuleValue::text("+966501234567"), &ctx));
        assert!(PhoneMatcher.matches(&contact, Operator::EndsWith, &RuleValue::text("50 123 4567"), &ctx));
        assert!(!PhoneMatcher.matches(&contact, Operator::EndsWith, &RuleValue::text("9999"), &ctx));
        assert!(!PhoneMatcher.matches(&contact, Operator::EndsWith, &RuleValue::text("none"), &ctx));
    }

    #[test]
    fn test_existence() {
        let ctx = context();
        assert!(PhoneMatcher.matches(&with_phone("+966501234567"), Operator::Exists, &RuleValue::Null, &ctx));
        assert!(PhoneMatcher.matches(&with_phone(""), Operator::DoesNotExist, &RuleValue::Null, &ctx));
        assert!(PhoneMatcher.matches(&Contact::new("d"), Operator::DoesNotExist, &RuleValue::Null, &ctx));
    }

    #[test]
    fn test_unsupported_operators_and_shapes() {
        let contact = with_phone("+966501234567");
        let ctx = context();

        assert!(!PhoneMatcher.matches(&contact, Operator::In, &RuleValue::list(["+966501234567"]), &ctx));
        assert!(!PhoneMatcher.matches(&contact, Operator::Equals, &RuleValue::days(966), &ctx));
        assert!(!PhoneMatcher.matches(&contact, Operator::IsEmpty, &RuleValue::Null, &ctx));
    }

    #[test]
    fn test_blank_operand_matches_nothing() {
        let ctx = context();
        for phone in ["+966501234567", "0501234567", ""] {
            let contact = with_phone(phone);
            for operator in [Operator::Contains, Operator::StartsWith, Operator::EndsWith] {
                for blank in ["", "  "] {
                    assert!(
                        !PhoneMatcher.matches(&contact, operator, &RuleValue::text(blank), &ctx),
                        "{operator} {blank:?} matched {phone:?}"
                    );
                }
            }
        }
    }
}
