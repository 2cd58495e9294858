//! Field matcher implementations and the default field table.
//!
//! Each field maps to exactly one matcher. The operator lists below are the
//! complete set of operators a field accepts; anything else evaluates to
//! `false`.

pub mod keyword;
pub mod phone;
pub mod reject;
pub mod tags;
pub mod text;
pub mod timestamp;

// Re-export for convenience
pub use keyword::KeywordMatcher;
pub use phone::PhoneMatcher;
pub use reject::RejectAll;
pub use tags::TagsMatcher;
pub use text::TextMatcher;
pub use timestamp::TimestampMatcher;

use crate::traits::FieldMatcher;
use chrono::{DateTime, Utc};
use contacts::{Contact, Field, Operator, RuleValue, text_or_empty};
use std::borrow::Cow;

use Operator::*;

pub const COUNTRY_OPERATORS: &[Operator] = &[Equals, NotEquals, In, NotIn, HasAnyOf];
pub const CHANNEL_OPERATORS: &[Operator] =
    &[Equals, NotEquals, Exists, DoesNotExist, HasAnyOf, HasAllOf, HasNoneOf];
pub const STATUS_OPERATORS: &[Operator] = &[Equals, NotEquals, In, NotIn, HasAnyOf];
pub const ASSIGNEE_OPERATORS: &[Operator] =
    &[Equals, NotEquals, In, NotIn, HasAnyOf, IsEmpty, IsNotEmpty];
pub const LAST_CHANNEL_OPERATORS: &[Operator] = &[Equals, NotEquals, Exists, DoesNotExist];
pub const NAME_OPERATORS: &[Operator] = &[
    Equals,
    NotEquals,
    Contains,
    NotContains,
    StartsWith,
    EndsWith,
    IsEmpty,
    IsNotEmpty,
];
pub const EMAIL_OPERATORS: &[Operator] =
    &[Equals, NotEquals, Contains, StartsWith, EndsWith, Exists, DoesNotExist];

/// The field table used by `SegmentEngine::new`.
pub fn default_matchers() -> Vec<(Field, Box<dyn FieldMatcher>)> {
    let keyword = |field, case, operators| entry(field, KeywordMatcher::new(field, case, operators));

    let mut table = vec![
        keyword(Field::CountryIso, CaseFold::Upper, COUNTRY_OPERATORS),
        entry(Field::Tags, TagsMatcher),
        keyword(Field::Channel, CaseFold::Lower, CHANNEL_OPERATORS),
        keyword(Field::ConversationStatus, CaseFold::None, STATUS_OPERATORS),
        entry(Field::FirstName, TextMatcher::new(Field::FirstName, NAME_OPERATORS)),
        entry(Field::LastName, TextMatcher::new(Field::LastName, NAME_OPERATORS)),
        entry(Field::PhoneNumber, PhoneMatcher),
        entry(Field::EmailAddress, TextMatcher::new(Field::EmailAddress, EMAIL_OPERATORS)),
        keyword(Field::Language, CaseFold::None, STATUS_OPERATORS),
        keyword(Field::BotStatus, CaseFold::None, STATUS_OPERATORS),
        keyword(Field::Assignee, CaseFold::None, ASSIGNEE_OPERATORS),
        keyword(Field::LastInteractedChannel, CaseFold::Lower, LAST_CHANNEL_OPERATORS),
    ];
    table.extend(
        Field::ALL
            .into_iter()
            .filter(Field::is_timestamp)
            .map(|field| entry(field, TimestampMatcher::new(field))),
    );
    table
}

fn entry(field: Field, matcher: impl FieldMatcher + 'static) -> (Field, Box<dyn FieldMatcher>) {
    (field, Box::new(matcher))
}

/// Case normalization applied to both sides of a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseFold {
    None,
    Upper,
    Lower,
}

impl CaseFold {
    pub fn apply(self, text: &str) -> Cow<'_, str> {
        match self {
            CaseFold::None => Cow::Borrowed(text),
            CaseFold::Upper => Cow::Owned(text.to_uppercase()),
            CaseFold::Lower => Cow::Owned(text.to_lowercase()),
        }
    }
}

/// Text attribute behind `field`, with absent values read as `""`.
pub(crate) fn text_attribute(contact: &Contact, field: Field) -> &str {
    let value = match field {
        Field::CountryIso => &contact.country_iso,
        Field::Channel => &contact.channel,
        Field::ConversationStatus => &contact.conversation_status,
        Field::FirstName => &contact.first_name,
        Field::LastName => &contact.last_name,
        Field::PhoneNumber => &contact.phone_number,
        Field::EmailAddress => &contact.email_address,
        Field::Language => &contact.language,
        Field::BotStatus => &contact.bot_status,
        Field::Assignee => &contact.assignee,
        Field::LastInteractedChannel => &contact.last_interacted_channel,
        _ => return "",
    };
    text_or_empty(value)
}

/// Timestamp behind `field`, if it is one of the date fields.
pub(crate) fn timestamp_attribute(contact: &Contact, field: Field) -> Option<DateTime<Utc>> {
    match field {
        Field::CreatedAt => contact.created_at,
        Field::LastInteractionTime => contact.last_interaction_time,
        Field::ConversationOpenedTime => contact.conversation_opened_time,
        Field::TimeSinceLastIncomingMessage => contact.last_incoming_message_time(),
        _ => None,
    }
}

/// Run `check` on a single-string operand; any other shape is `false`.
pub(crate) fn with_text(value: &RuleValue, check: impl FnOnce(&str) -> bool) -> bool {
    value.as_text().is_some_and(check)
}

/// Like [`with_text`], but a blank operand is `false` without running `check`.
pub(crate) fn with_pattern(value: &RuleValue, check: impl FnOnce(&str) -> bool) -> bool {
    with_text(value, |v| !v.trim().is_empty() && check(v))
}

/// Run `check` on a string-list operand; any other shape is `false`.
pub(crate) fn with_list(value: &RuleValue, check: impl FnOnce(&[String]) -> bool) -> bool {
    value.as_list().is_some_and(check)
}
