//! JSON document layout for persisted heading-check state.
//!
//! ```json
//! {
//!   "headerDone": { "Study/Bio.md": { "12": true } },
//!   "settings": { "includeRoots": ["Study/"], "excludeRoots": [] }
//! }
//! ```
//!
//! Absent or `null` fields fall back to their defaults. Line keys that are not
//! canonical non-negative integers and values other than `true` are skipped
//! when decoding.

use std::collections::BTreeMap;

use headcheck_core::model::{CompletionRecord, HeadingLine, ScopeSettingsDraft};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::repository::{PersistedState, StorageError};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_done: Option<BTreeMap<String, BTreeMap<String, Value>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<SettingsDocument>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_roots: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_roots: Option<Vec<String>>,
}

impl StateDocument {
    #[must_use]
    pub fn from_state(state: &PersistedState) -> Self {
        let mut header_done: BTreeMap<String, BTreeMap<String, Value>> = BTreeMap::new();
        for (path, line) in state.record.iter() {
            header_done
                .entry(path.to_owned())
                .or_default()
                .insert(line.to_string(), Value::Bool(true));
        }

        Self {
            header_done: Some(header_done),
            settings: Some(SettingsDocument {
                include_roots: Some(state.settings.include_roots().to_vec()),
                exclude_roots: Some(state.settings.exclude_roots().to_vec()),
            }),
        }
    }

    #[must_use]
    pub fn into_state(self) -> PersistedState {
        let mut record = CompletionRecord::new();
        for (path, lines) in self.header_done.unwrap_or_default() {
            for (key, value) in lines {
                if value != Value::Bool(true) {
                    continue;
                }
                if let Ok(line) = key.parse::<HeadingLine>() {
                    record.mark_done(&path, line);
                }
            }
        }

        let settings = self.settings.unwrap_or_default();
        let settings = ScopeSettingsDraft {
            include_roots: settings.include_roots.unwrap_or_default(),
            exclude_roots: settings.exclude_roots.unwrap_or_default(),
        }
        .validate();

        PersistedState::new(record, settings)
    }

    /// Parse a document from JSON text.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the text is not a document of
    /// this shape.
    pub fn from_json(text: &str) -> Result<Self, StorageError> {
        serde_json::from_str(text).map_err(|e| StorageError::Serialization(e.to_string()))
    }

    /// Render the document as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if encoding fails.
    pub fn to_json(&self) -> Result<String, StorageError> {
        serde_json::to_string_pretty(self).map_err(|e| StorageError::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use headcheck_core::model::ScopeSettings;

    fn line(n: u32) -> HeadingLine {
        HeadingLine::new(n)
    }

    #[test]
    fn decodes_done_lines_from_string_keys() {
        let doc = StateDocument::from_json(r#"{"headerDone": {"A.md": {"3": true}}}"#).unwrap();
        let state = doc.into_state();
        assert!(state.record.is_done("A.md", line(3)));
        assert!(!state.record.is_done("A.md", line(4)));
        assert_eq!(state.settings, ScopeSettings::default());
    }

    #[test]
    fn missing_and_null_fields_use_defaults() {
        for text in ["{}", r#"{"headerDone": null, "settings": null}"#, r#"{"settings": {}}"#] {
            let state = StateDocument::from_json(text).unwrap().into_state();
            assert_eq!(state, PersistedState::default(), "input {text}");
        }
    }

    #[test]
    fn skips_invalid_line_keys_and_non_true_values() {
        let text = r#"{
            "headerDone": {
                "A.md": {"1": true, "2": false, "x": true, "-4": true, "05": true, "6": 1},
                "B.md": {}
            }
        }"#;
        let state = StateDocument::from_json(text).unwrap().into_state();
        let all: Vec<_> = state.record.iter().map(|(p, l)| (p, l.value())).collect();
        assert_eq!(all, vec![("A.md", 1)]);
        assert_eq!(state.record.paths().count(), 1);
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let text = r#"{"headerDone": {}, "settings": {"includeRoots": ["Q/"], "theme": "dark"}, "v": 2}"#;
        let state = StateDocument::from_json(text).unwrap().into_state();
        assert_eq!(state.settings.include_roots(), ["Q/"]);
        assert!(state.settings.exclude_roots().is_empty());
    }

    #[test]
    fn rejects_documents_of_the_wrong_shape() {
        for text in ["", "[]", "42", r#"{"headerDone": []}"#, r#"{"settings": {"includeRoots": [1]}}"#] {
            assert!(
                matches!(StateDocument::from_json(text), Err(StorageError::Serialization(_))),
                "input {text:?}"
            );
        }
    }

    #[test]
    fn encodes_the_persisted_layout() {
        let record: CompletionRecord = [("Study/Bio.md", line(12)), ("Study/Bio.md", line(2))]
            .into_iter()
            .collect();
        let state = PersistedState::new(record, ScopeSettings::new(["Study/"], Vec::<String>::new()));

        let json: Value = serde_json::from_str(&StateDocument::from_state(&state).to_json().unwrap())
            .unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "headerDone": { "Study/Bio.md": { "2": true, "12": true } },
                "settings": { "includeRoots": ["Study/"], "excludeRoots": [] }
            })
        );
    }

    #[test]
    fn cleared_paths_are_not_written() {
        let mut record = CompletionRecord::new();
        record.toggle("A.md", line(1));
        record.toggle("A.md", line(1));
        let doc = StateDocument::from_state(&PersistedState::new(record, ScopeSettings::default()));
        assert_eq!(doc.header_done, Some(BTreeMap::new()));
    }
}
