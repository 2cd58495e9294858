//! In-memory contact pool with id lookup.

use crate::error::{LoadError, Result};
use crate::loader;
use crate::types::{Contact, ContactId};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Owns the contact pool handed to the filter engine.
///
/// Contacts keep their load order; `by_id` maps identifiers to positions.
#[derive(Debug, Default)]
pub struct ContactBook {
    contacts: Vec<Contact>,
    by_id: HashMap<ContactId, usize>,
}

impl ContactBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a book from already-parsed contacts, rejecting duplicate ids.
    pub fn from_contacts(contacts: Vec<Contact>) -> Result<Self> {
        let mut book = Self {
            contacts: Vec::with_capacity(contacts.len()),
            by_id: HashMap::with_capacity(contacts.len()),
        };
        for contact in contacts {
            book.insert(contact)?;
        }
        Ok(book)
    }

    /// Load and index a contact file (`.json` or `.jsonl`).
    pub fn load_from_file(path: &Path) -> Result<Self> {
        tracing::info!("Loading contacts from {}", path.display());
        let contacts = loader::load_contacts(path)?;
        let book = Self::from_contacts(contacts)?;
        tracing::info!("Loaded {} contacts", book.len());
        Ok(book)
    }

    /// Insert a contact. Ids must be non-empty and unique.
    pub fn insert(&mut self, contact: Contact) -> Result<()> {
        if contact.id.trim().is_empty() {
            return Err(LoadError::ValidationError(
                "contact with empty id".to_string(),
            ));
        }
        if self.by_id.contains_key(&contact.id) {
            return Err(LoadError::DuplicateId { id: contact.id });
        }
        self.by_id.insert(contact.id.clone(), self.contacts.len());
        self.contacts.push(contact);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Contact> {
        self.by_id.get(id).map(|&idx| &self.contacts[idx])
    }

    /// All contacts in load order.
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Contact> {
        self.contacts.iter()
    }

    /// Count contacts by a derived key. Contacts whose key is `None` or
    /// empty are counted under `"(none)"`.
    pub fn counts_by<F>(&self, key: F) -> BTreeMap<String, usize>
    where
        F: Fn(&Contact) -> Option<&str>,
    {
        let mut counts = BTreeMap::new();
        for contact in &self.contacts {
            let bucket = match key(contact) {
                Some(value) if !value.is_empty() => value.to_string(),
                _ => "(none)".to_string(),
            };
            *counts.entry(bucket).or_insert(0) += 1;
        }
        counts
    }
}
