// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeMap;

pub trait Translate {
    fn translate(&self, key: &str) -> String;
}

const BUILTIN: [(&str, &str); 14] = [
    ("Actions", "Actions"),
    ("Cancel", "Cancel"),
    ("ChangeFailed", "change failed"),
    ("Create", "Create"),
    ("CreateFailed", "create failed"),
    ("Delete", "Delete"),
    ("DeleteFailed", "delete failed"),
    ("Details", "Details"),
    ("Edit", "Edit"),
    ("Filter", "Filter"),
    ("InvalidRegex", "Search term must be a valid regex"),
    ("ListFailed", "refresh failed"),
    ("NoResults", "nothing to show"),
    ("Save", "Save"),
];

/// Key to text table. Lookups fall back to the built-in English strings and
/// then to the key itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    entries: BTreeMap<String, String>,
}

impl Catalog {
    pub fn new(entries: BTreeMap<String, String>) -> Self {
        Self { entries }
    }

    pub fn insert(&mut self, key: impl Into<String>, text: impl Into<String>) {
        self.entries.insert(key.into(), text.into());
    }
}

impl Translate for Catalog {
    fn translate(&self, key: &str) -> String {
        if let Some(text) = self.entries.get(key) {
            return text.clone();
        }
        BUILTIN
            .iter()
            .find(|(builtin, _)| *builtin == key)
            .map_or_else(|| key.to_owned(), |(_, text)| (*text).to_owned())
    }
}

impl<F> Translate for F
where
    F: Fn(&str) -> String,
{
    fn translate(&self, key: &str) -> String {
        self(key)
    }
}

#[cfg(test)]
mod tests {
    use super::{Catalog, Translate};

    #[test]
    fn entries_override_builtin_text() {
        let mut catalog = Catalog::default();
        assert_eq!(catalog.translate("Save"), "Save");
        catalog.insert("Save", "Speichern");
        assert_eq!(catalog.translate("Save"), "Speichern");
    }

    #[test]
    fn unknown_keys_fall_back_to_key() {
        assert_eq!(Catalog::default().translate("Jails"), "Jails");
    }

    #[test]
    fn closures_translate() {
        let upper = |key: &str| key.to_uppercase();
        assert_eq!(upper.translate("edit"), "EDIT");
    }
}
