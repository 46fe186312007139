use indexmap::IndexMap;

use crate::error::ExtractError;

/// Escape a message for embedding inside a quoted PO string.
pub fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

/// A translatable string found in a source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrence {
    pub text: String,
    pub plural: Option<String>,
}

impl Occurrence {
    pub fn singular(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            plural: None,
        }
    }
}

/// One accumulated catalog entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Escaped message text
    pub msgid: String,
    /// Escaped plural text, if any occurrence supplied one
    pub msgid_plural: Option<String>,
    /// Location identifiers in first-seen order, without duplicates
    pub references: Vec<String>,
    /// Empty translation slots (one, or two with a plural)
    pub msgstr: Vec<String>,
}

impl CatalogEntry {
    fn new() -> Self {
        Self {
            msgid: String::new(),
            msgid_plural: None,
            references: Vec::new(),
            msgstr: vec![String::new()],
        }
    }

    pub fn is_plural(&self) -> bool {
        self.msgid_plural.is_some()
    }
}

/// Message text → catalog entry mapping for a single file pass.
///
/// Keys are the trimmed, unescaped message text. Iteration follows insertion order.
#[derive(Debug, Default)]
pub struct Registry {
    entries: IndexMap<String, CatalogEntry>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one occurrence of `message` into the registry.
    ///
    /// `resolve` maps the trimmed message and the plural to a location
    /// identifier. A plural that contradicts an earlier one is reported as
    /// [`ExtractError::IncompatiblePlural`]; the entry keeps the first plural.
    pub fn register<F>(
        &mut self,
        resolve: F,
        message: &str,
        plural: Option<&str>,
    ) -> Result<(), ExtractError>
    where
        F: FnOnce(&str, Option<&str>) -> String,
    {
        let message = message.trim();
        if message.is_empty() {
            return Ok(());
        }

        let reference = resolve(message, plural);
        let entry = self
            .entries
            .entry(message.to_string())
            .or_insert_with(CatalogEntry::new);

        entry.msgid = escape(message);
        if !entry.references.contains(&reference) {
            entry.references.push(reference);
        }

        let Some(plural) = plural.filter(|p| !p.is_empty()) else {
            return Ok(());
        };

        let escaped = escape(plural);
        if let Some(existing) = entry.msgid_plural.as_ref().filter(|p| **p != escaped) {
            return Err(ExtractError::IncompatiblePlural {
                message: message.to_string(),
                existing: existing.clone(),
                conflicting: escaped,
                references: entry.references.clone(),
            });
        }

        entry.msgid_plural = Some(escaped);
        entry.msgstr = vec![String::new(), String::new()];
        Ok(())
    }

    pub fn get(&self, message: &str) -> Option<&CatalogEntry> {
        self.entries.get(message)
    }

    pub fn into_entries(self) -> Vec<CatalogEntry> {
        self.entries.into_values().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
