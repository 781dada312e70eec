use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Flat field-name -> value mapping merged from every metadata source in a
/// BWF file (bext chunk, LIST-INFO tags, technical fields, embedded XMP).
///
/// Lookup of an absent key yields the empty string: a field the archivist
/// never filled in is normal, not an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetadataRecord {
    fields: BTreeMap<String, String>,
}

impl MetadataRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> &str {
        self.fields.get(key).map(String::as_str).unwrap_or("")
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Merges `fields` into the record; incoming values win on collision,
    /// mirroring the loader's source precedence (bext < INFO < tech < XMP).
    pub fn merge(&mut self, fields: impl IntoIterator<Item = (String, String)>) {
        self.fields.extend(fields);
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(String, String)> for MetadataRecord {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        MetadataRecord {
            fields: iter.into_iter().collect(),
        }
    }
}
