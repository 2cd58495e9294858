//! Filter rules and segment definitions.
//!
//! A rule is a `(field, operator, value)` triple. Field and operator names
//! outside the known sets deserialize to `Unknown` instead of failing, so a
//! rule-set with a misspelled field still loads and simply matches nothing.

use crate::types::ContactId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Field
// =============================================================================

/// Contact attribute a rule inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    #[serde(rename = "countryISO")]
    CountryIso,
    Tags,
    Channel,
    ConversationStatus,
    FirstName,
    LastName,
    PhoneNumber,
    EmailAddress,
    Language,
    BotStatus,
    Assignee,
    LastInteractedChannel,
    CreatedAt,
    LastInteractionTime,
    ConversationOpenedTime,
    TimeSinceLastIncomingMessage,
    /// Any name not listed above
    #[serde(other)]
    Unknown,
}

impl Field {
    /// Every recognized field, in declaration order.
    pub const ALL: [Field; 16] = [
        Field::CountryIso,
        Field::Tags,
        Field::Channel,
        Field::ConversationStatus,
        Field::FirstName,
        Field::LastName,
        Field::PhoneNumber,
        Field::EmailAddress,
        Field::Language,
        Field::BotStatus,
        Field::Assignee,
        Field::LastInteractedChannel,
        Field::CreatedAt,
        Field::LastInteractionTime,
        Field::ConversationOpenedTime,
        Field::TimeSinceLastIncomingMessage,
    ];

    /// Wire name of the field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::CountryIso => "countryISO",
            Field::Tags => "tags",
            Field::Channel => "channel",
            Field::ConversationStatus => "conversationStatus",
            Field::FirstName => "firstName",
            Field::LastName => "lastName",
            Field::PhoneNumber => "phoneNumber",
            Field::EmailAddress => "emailAddress",
            Field::Language => "language",
            Field::BotStatus => "botStatus",
            Field::Assignee => "assignee",
            Field::LastInteractedChannel => "lastInteractedChannel",
            Field::CreatedAt => "createdAt",
            Field::LastInteractionTime => "lastInteractionTime",
            Field::ConversationOpenedTime => "conversationOpenedTime",
            Field::TimeSinceLastIncomingMessage => "timeSinceLastIncomingMessage",
            Field::Unknown => "unknown",
        }
    }

    pub fn is_timestamp(&self) -> bool {
        matches!(
            self,
            Field::CreatedAt
                | Field::LastInteractionTime
                | Field::ConversationOpenedTime
                | Field::TimeSinceLastIncomingMessage
        )
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = std::convert::Infallible;

    /// Unrecognized names parse to `Field::Unknown`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Field::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .unwrap_or(Field::Unknown))
    }
}

// =============================================================================
// Operator
// =============================================================================

/// Comparison a rule applies to its field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operator {
    Equals,
    NotEquals,
    In,
    NotIn,
    HasAnyOf,
    HasAllOf,
    HasNoneOf,
    IsEmpty,
    IsNotEmpty,
    Exists,
    DoesNotExist,
    Contains,
    NotContains,
    StartsWith,
    EndsWith,
    IsLessThanTime,
    IsGreaterThanTime,
    IsTimestampAfter,
    IsTimestampBefore,
    IsTimestampBetween,
    #[serde(other)]
    Unknown,
}

impl Operator {
    pub const ALL: [Operator; 20] = [
        Operator::Equals,
        Operator::NotEquals,
        Operator::In,
        Operator::NotIn,
        Operator::HasAnyOf,
        Operator::HasAllOf,
        Operator::HasNoneOf,
        Operator::IsEmpty,
        Operator::IsNotEmpty,
        Operator::Exists,
        Operator::DoesNotExist,
        Operator::Contains,
        Operator::NotContains,
        Operator::StartsWith,
        Operator::EndsWith,
        Operator::IsLessThanTime,
        Operator::IsGreaterThanTime,
        Operator::IsTimestampAfter,
        Operator::IsTimestampBefore,
        Operator::IsTimestampBetween,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Equals => "equals",
            Operator::NotEquals => "notEquals",
            Operator::In => "in",
            Operator::NotIn => "notIn",
            Operator::HasAnyOf => "hasAnyOf",
            Operator::HasAllOf => "hasAllOf",
            Operator::HasNoneOf => "hasNoneOf",
            Operator::IsEmpty => "isEmpty",
            Operator::IsNotEmpty => "isNotEmpty",
            Operator::Exists => "exists",
            Operator::DoesNotExist => "doesNotExist",
            Operator::Contains => "contains",
            Operator::NotContains => "notContains",
            Operator::StartsWith => "startsWith",
            Operator::EndsWith => "endsWith",
            Operator::IsLessThanTime => "isLessThanTime",
            Operator::IsGreaterThanTime => "isGreaterThanTime",
            Operator::IsTimestampAfter => "isTimestampAfter",
            Operator::IsTimestampBefore => "isTimestampBefore",
            Operator::IsTimestampBetween => "isTimestampBetween",
            Operator::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Operator::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .unwrap_or(Operator::Unknown))
    }
}

// =============================================================================
// Values
// =============================================================================

/// Inclusive date range used by `isTimestampBetween`.
///
/// Bounds are kept as the strings the rule author wrote; they are parsed at
/// evaluation time so that a bad bound only fails its own rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: String,
    pub to: String,
}

/// Operand of a rule. Which shape is expected depends on the operator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleValue {
    /// `null` or no value at all
    #[default]
    Null,
    Text(String),
    Number(f64),
    List(Vec<String>),
    Range(DateRange),
    /// Any other JSON shape; never satisfies an operator
    Unsupported(serde_json::Value),
}

impl RuleValue {
    pub fn text(value: impl Into<String>) -> Self {
        RuleValue::Text(value.into())
    }

    pub fn list<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        RuleValue::List(values.into_iter().map(Into::into).collect())
    }

    /// Day count for the relative-time operators.
    pub fn days(days: impl Into<f64>) -> Self {
        RuleValue::Number(days.into())
    }

    pub fn range(from: impl Into<String>, to: impl Into<String>) -> Self {
        RuleValue::Range(DateRange {
            from: from.into(),
            to: to.into(),
        })
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            RuleValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            RuleValue::List(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            RuleValue::Number(n) if n.is_finite() => Some(*n),
            _ => None,
        }
    }

    pub fn as_range(&self) -> Option<&DateRange> {
        match self {
            RuleValue::Range(range) => Some(range),
            _ => None,
        }
    }
}

// =============================================================================
// Rules and segments
// =============================================================================

/// One `(field, operator, value)` filter rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterRule {
    pub field: Field,
    pub operator: Operator,
    #[serde(default)]
    pub value: RuleValue,
}

impl FilterRule {
    pub fn new(field: Field, operator: Operator, value: RuleValue) -> Self {
        Self {
            field,
            operator,
            value,
        }
    }

    /// Rule whose operator takes no operand (`exists`, `isEmpty`, ...).
    pub fn unary(field: Field, operator: Operator) -> Self {
        Self::new(field, operator, RuleValue::Null)
    }
}

impl fmt::Display for FilterRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            RuleValue::Null => write!(f, "{} {}", self.field, self.operator),
            RuleValue::Text(text) => write!(f, "{} {} {:?}", self.field, self.operator, text),
            RuleValue::Number(n) => write!(f, "{} {} {}", self.field, self.operator, n),
            RuleValue::List(values) => {
                write!(f, "{} {} [{}]", self.field, self.operator, values.join(", "))
            }
            RuleValue::Range(range) => write!(
                f,
                "{} {} {}..={}",
                self.field, self.operator, range.from, range.to
            ),
            RuleValue::Unsupported(raw) => write!(f, "{} {} {}", self.field, self.operator, raw),
        }
    }
}

/// A named rule-set, as stored by the segment editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentDefinition {
    pub name: String,
    #[serde(default)]
    pub rules: Vec<FilterRule>,
}

/// A segment together with the contacts it currently matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterializedSegment {
    pub name: String,
    pub contact_ids: Vec<ContactId>,
}
