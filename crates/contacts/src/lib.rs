//! # Contacts Crate
//!
//! Data model and loaders for the segmentation engine.
//!
//! ## Main Components
//!
//! - **types**: `Contact` records and the `ContactId` alias
//! - **rule**: `FilterRule` (`Field`, `Operator`, `RuleValue`) and segment definitions
//! - **timestamp**: lenient ISO / epoch-millis timestamp parsing
//! - **loader**: JSON and JSON Lines readers for contacts, rules and segments
//! - **book**: `ContactBook`, the indexed contact pool
//! - **error**: error types for loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use contacts::{ContactBook, loader};
//! use std::path::Path;
//!
//! let book = ContactBook::load_from_file(Path::new("data/contacts.jsonl"))?;
//! let rules = loader::load_rules(Path::new("data/vip_rules.json"))?;
//!
//! println!("{} contacts, {} rules", book.len(), rules.len());
//! ```

pub mod book;
pub mod error;
pub mod loader;
pub mod rule;
pub mod timestamp;
pub mod types;

// Re-export commonly used types for convenience
pub use book::ContactBook;
pub use error::{LoadError, Result};
pub use rule::{
    DateRange, Field, FilterRule, MaterializedSegment, Operator, RuleValue, SegmentDefinition,
};
pub use timestamp::parse_timestamp;
pub use types::{Contact, ContactId, text_or_empty};
