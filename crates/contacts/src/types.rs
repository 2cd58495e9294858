//! Contact records as they arrive from the contacts repository.
//!
//! Every textual attribute is optional: `None`, a missing key and `""` are all
//! treated as "no value" by the filter engine.

use crate::timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Opaque unique key of a contact
pub type ContactId = String;

/// A person reachable through one or more messaging channels.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: ContactId,

    /// Two-letter country code
    #[serde(default, rename = "countryISO", skip_serializing_if = "Option::is_none")]
    pub country_iso: Option<String>,

    /// Free-text labels; order is irrelevant. `null` reads as no tags.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tags: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_status: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,

    /// Stored in international form, e.g. `+966501234567`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bot_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_interacted_channel: Option<String>,

    #[serde(
        default,
        deserialize_with = "timestamp::deserialize_optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "timestamp::deserialize_optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_interaction_time: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "timestamp::deserialize_optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub conversation_opened_time: Option<DateTime<Utc>>,
}

impl Contact {
    /// Create a contact with only an identifier set.
    pub fn new(id: impl Into<ContactId>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Timestamp used for the "time since last incoming message" field.
    ///
    /// Contacts carry no separate incoming-message timestamp, so this is the
    /// last interaction time.
    pub fn last_incoming_message_time(&self) -> Option<DateTime<Utc>> {
        self.last_interaction_time
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Vec<String>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Borrow an optional text attribute, mapping `None` to `""`.
pub fn text_or_empty(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("")
}
