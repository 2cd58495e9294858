//! Matcher for the date fields.
//!
//! Missing timestamps only satisfy `doesNotExist` and `isEmpty`. Every other
//! operator needs a timestamp to compare against and yields `false`.

use super::{timestamp_attribute, with_text};
use crate::traits::{FieldMatcher, MatchContext};
use chrono::{DateTime, Utc};
use contacts::{Contact, Field, Operator, RuleValue, parse_timestamp};

pub const MILLIS_PER_DAY: i64 = 86_400_000;

/// Whole days from `at` to `now`, rounded toward negative infinity.
///
/// A timestamp 5 days and 23 hours ago is 5 days old; one 1 hour in the
/// future is -1 days old.
pub fn elapsed_days(now: DateTime<Utc>, at: DateTime<Utc>) -> i64 {
    (now - at).num_milliseconds().div_euclid(MILLIS_PER_DAY)
}

/// Relative-day and absolute comparisons on one timestamp field.
///
/// ## Operators
/// - `exists` / `doesNotExist`
/// - `isLessThanTime` / `isGreaterThanTime`: numeric day count, strict
/// - `isTimestampAfter` / `isTimestampBefore`: ISO date string, strict
/// - `isTimestampBetween`: `{from, to}`, inclusive on both ends
pub struct TimestampMatcher {
    field: Field,
}

impl TimestampMatcher {
    pub fn new(field: Field) -> Self {
        Self { field }
    }
}

impl FieldMatcher for TimestampMatcher {
    fn name(&self) -> &str {
        self.field.as_str()
    }

    fn matches(
        &self,
        contact: &Contact,
        operator: Operator,
        value: &RuleValue,
        context: &MatchContext<'_>,
    ) -> bool {
        let Some(at) = timestamp_attribute(contact, self.field) else {
            return matches!(operator, Operator::DoesNotExist | Operator::IsEmpty);
        };

        match operator {
            Operator::Exists => true,
            Operator::IsLessThanTime => value
                .as_number()
                .is_some_and(|days| (elapsed_days(context.now, at) as f64) < days),
            Operator::IsGreaterThanTime => value
                .as_number()
                .is_some_and(|days| (elapsed_days(context.now, at) as f64) > days),
            Operator::IsTimestampAfter => {
                with_text(value, |v| parse_timestamp(v).is_some_and(|bound| at > bound))
            }
            Operator::IsTimestampBefore => {
                with_text(value, |v| parse_timestamp(v).is_some_and(|bound| at < bound))
            }
            Operator::IsTimestampBetween => value.as_range().is_some_and(|range| {
                match (parse_timestamp(&range.from), parse_timestamp(&range.to)) {
                    (Some(from), Some(to)) => from <= at && at <= to,
                    _ => false,
                }
            }),
            _ => false,
        }
    }
}
