use crate::error::{PresentserError, Result};
use crate::input;
use crate::projection::{AttendanceInput, GLOBAL_DEFAULT_TARGET};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;

pub const GUEST_KEY: &str = "guest";
pub const LOCAL_KEY: &str = "local";

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default)]
    pub present: f64,
    #[serde(default)]
    pub total: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Record {
    pub fn attendance(&self) -> AttendanceInput {
        AttendanceInput::new(self.present, self.total)
    }
}

// ---------------------------------------------------------------------------
// RecordPatch
// ---------------------------------------------------------------------------

/// A partial record: every field is optional and only supplied fields are
/// applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub present: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
}

impl RecordPatch {
    /// Build a patch from an untyped payload, dropping anything that does
    /// not parse.
    pub fn from_payload(payload: &Map<String, Value>) -> Self {
        Self {
            present: input::lenient_real(payload.get("present")),
            total: input::lenient_real(payload.get("total")),
            target: input::lenient_real(payload.get("target")),
            gender: input::text(payload.get("gender")),
            username: input::text(payload.get("username")),
            first_name: input::text(payload.get("first_name")),
        }
    }

    /// Store key for an autosave: username, then first name, then `local`.
    pub fn autosave_key(&self) -> String {
        self.username
            .clone()
            .or_else(|| self.first_name.clone())
            .unwrap_or_else(|| LOCAL_KEY.to_string())
    }

    fn into_record(self, now: DateTime<Utc>) -> Record {
        Record {
            present: self.present.unwrap_or(0.0),
            total: self.total.unwrap_or(0.0),
            target: self.target,
            gender: self.gender,
            username: self.username,
            first_name: self.first_name,
            updated_at: Some(now),
        }
    }
}

// ---------------------------------------------------------------------------
// RecordRow
// ---------------------------------------------------------------------------

/// Flattened view of one record for admin listings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordRow {
    pub username: String,
    pub present: f64,
    pub total: f64,
    pub target: Option<f64>,
    pub gender: Option<String>,
    pub first_name: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeSummary {
    pub inserted: usize,
    pub updated: usize,
}

// ---------------------------------------------------------------------------
// RecordStore
// ---------------------------------------------------------------------------

/// All saved records keyed by user, persisted as one JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordStore {
    pub records: BTreeMap<String, Record>,
}

impl RecordStore {
    // ---------------------------------------------------------------------------
    // Persistence
    // ---------------------------------------------------------------------------

    /// Load the store. A missing or blank file is an empty store; a malformed
    /// one is an error so that a later save cannot clobber it.
    pub fn load(path: &Path) -> Result<Self> {
        match crate::io::read_optional(path)? {
            Some(text) if !text.trim().is_empty() => Ok(serde_json::from_str(&text)?),
            _ => Ok(Self::default()),
        }
    }

    /// Write the store. Non-finite counts or targets are refused, since JSON
    /// would write them as `null` and the file would no longer load.
    pub fn save(&self, path: &Path) -> Result<()> {
        self.check_finite()?;
        let data = serde_json::to_string_pretty(self)?;
        crate::io::atomic_write(path, data.as_bytes())
    }

    fn check_finite(&self) -> Result<()> {
        for (key, rec) in &self.records {
            let fields = [
                ("present", Some(rec.present)),
                ("total", Some(rec.total)),
                ("target", rec.target),
            ];
            for (field, value) in fields {
                if let Some(v) = value.filter(|v| !v.is_finite()) {
                    return Err(PresentserError::InvalidInput {
                        field: format!("{key}.{field}"),
                        value: v.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    // ---------------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------------

    pub fn get(&self, key: &str) -> Option<&Record> {
        self.records.get(key)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Rows sorted by username, ignoring case.
    pub fn rows(&self) -> Vec<RecordRow> {
        let mut rows: Vec<RecordRow> = self
            .records
            .iter()
            .map(|(key, rec)| RecordRow {
                username: key.clone(),
                present: rec.present,
                total: rec.total,
                target: rec.target,
                gender: rec.gender.clone(),
                first_name: rec.first_name.clone(),
            })
            .collect();
        rows.sort_by_key(|r| r.username.to_lowercase());
        rows
    }

    // ---------------------------------------------------------------------------
    // Mutations
    // ---------------------------------------------------------------------------

    /// Explicit save: counts are always overwritten, gender and target only
    /// when supplied. Other fields of an existing record are kept.
    pub fn apply_save(&mut self, key: &str, patch: RecordPatch, now: DateTime<Utc>) -> &Record {
        let rec = self.records.entry(key.to_string()).or_default();
        rec.present = patch.present.unwrap_or(0.0);
        rec.total = patch.total.unwrap_or(0.0);
        if patch.gender.is_some() {
            rec.gender = patch.gender;
        }
        if patch.target.is_some() {
            rec.target = patch.target;
        }
        rec.updated_at = Some(now);
        rec
    }

    /// Autosave: the record is replaced wholesale. The target falls back to
    /// the previously stored one, then to the global default.
    pub fn apply_autosave(&mut self, key: &str, patch: RecordPatch, now: DateTime<Utc>) -> &Record {
        let previous_target = self.records.get(key).and_then(|r| r.target);
        let target = patch
            .target
            .or(previous_target)
            .unwrap_or(GLOBAL_DEFAULT_TARGET);
        let username = patch.username.clone().unwrap_or_else(|| key.to_string());
        let mut rec = patch.into_record(now);
        rec.target = Some(target);
        rec.username = Some(username);
        self.records.insert(key.to_string(), rec);
        &self.records[key]
    }

    /// Merge recovered records: unknown keys are inserted, known keys only
    /// take the fields the recovered patch actually carries.
    pub fn merge(
        &mut self,
        recovered: BTreeMap<String, RecordPatch>,
        now: DateTime<Utc>,
    ) -> MergeSummary {
        let mut summary = MergeSummary::default();
        for (key, patch) in recovered {
            match self.records.get_mut(&key) {
                None => {
                    self.records.insert(key, patch.into_record(now));
                    summary.inserted += 1;
                }
                Some(rec) => {
                    if let Some(v) = patch.present {
                        rec.present = v;
                    }
                    if let Some(v) = patch.total {
                        rec.total = v;
                    }
                    if let Some(v) = patch.target {
                        rec.target = Some(v);
                    }
                    if let Some(v) = patch.gender {
                        rec.gender = Some(v);
                    }
                    if let Some(v) = patch.username {
                        rec.username = Some(v);
                    }
                    if let Some(v) = patch.first_name {
                        rec.first_name = Some(v);
                    }
                    rec.updated_at = Some(now);
                    summary.updated += 1;
                }
            }
        }
        summary
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn payload(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    fn counts(present: f64, total: f64) -> RecordPatch {
        RecordPatch {
            present: Some(present),
            total: Some(total),
            ..Default::default()
        }
    }

    #[test]
    fn load_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = RecordStore::load(&dir.path().join("records.json")).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn load_blank_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("records.json");
        std::fs::write(&path, "  \n").unwrap();
        assert!(RecordStore::load(&path).unwrap().is_empty());
    }

    #[test]
    fn load_malformed_file_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("records.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(RecordStore::load(&path).is_err());
    }

    #[test]
    fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("records.json");
        let mut store = RecordStore::default();
        store.apply_save("alice", counts(30.0, 40.0), Utc::now());
        store.save(&path).unwrap();

        let loaded = RecordStore::load(&path).unwrap();
        let rec = loaded.get("alice").unwrap();
        assert_eq!(rec.present, 30.0);
        assert_eq!(rec.total, 40.0);
    }

    #[test]
    fn save_refuses_non_finite_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("records.json");
        let mut store = RecordStore::default();
        store.apply_save("bob", counts(f64::NAN, 10.0), Utc::now());

        let err = store.save(&path).unwrap_err();
        assert!(matches!(err, PresentserError::InvalidInput { ref field, .. } if field == "bob.present"));
        assert!(!path.exists());
    }

    #[test]
    fn save_refuses_infinite_target() {
        let dir = TempDir::new().unwrap();
        let mut store = RecordStore::default();
        let patch = RecordPatch {
            target: Some(f64::INFINITY),
            ..counts(1.0, 2.0)
        };
        store.apply_save("amy", patch, Utc::now());
        assert!(store.save(&dir.path().join("records.json")).is_err());
    }

    #[test]
    fn apply_save_keeps_unsupplied_fields() {
        let mut store = RecordStore::default();
        let first = RecordPatch {
            gender: Some("female".into()),
            target: Some(80.0),
            ..counts(10.0, 12.0)
        };
        store.apply_save("bob", first, Utc::now());
        store.apply_save("bob", counts(11.0, 13.0), Utc::now());

        let rec = store.get("bob").unwrap();
        assert_eq!(rec.present, 11.0);
        assert_eq!(rec.total, 13.0);
        assert_eq!(rec.gender.as_deref(), Some("female"));
        assert_eq!(rec.target, Some(80.0));
    }

    #[test]
    fn autosave_key_precedence() {
        let p = RecordPatch::from_payload(&payload(json!({"username": "u", "first_name": "f"})));
        assert_eq!(p.autosave_key(), "u");
        let p = RecordPatch::from_payload(&payload(json!({"first_name": "f"})));
        assert_eq!(p.autosave_key(), "f");
        let p = RecordPatch::from_payload(&payload(json!({"username": ""})));
        assert_eq!(p.autosave_key(), "local");
    }

    #[test]
    fn autosave_replaces_record_and_defaults_target() {
        let mut store = RecordStore::default();
        let patch = RecordPatch::from_payload(&payload(json!({
            "present": "30", "total": "oops", "first_name": "Asha"
        })));
        let key = patch.autosave_key();
        let rec = store.apply_autosave(&key, patch, Utc::now()).clone();
        assert_eq!(rec.present, 30.0);
        assert_eq!(rec.total, 0.0);
        assert_eq!(rec.target, Some(75.0));
        assert_eq!(rec.username.as_deref(), Some("Asha"));
    }

    #[test]
    fn autosave_keeps_previous_target() {
        let mut store = RecordStore::default();
        let first = RecordPatch {
            target: Some(85.0),
            gender: Some("male".into()),
            ..counts(1.0, 2.0)
        };
        store.apply_autosave("k", first, Utc::now());
        store.apply_autosave("k", counts(3.0, 4.0), Utc::now());

        let rec = store.get("k").unwrap();
        assert_eq!(rec.target, Some(85.0));
        assert_eq!(rec.present, 3.0);
        // Wholesale replace drops the earlier gender.
        assert_eq!(rec.gender, None);
    }

    #[test]
    fn merge_inserts_and_overlays() {
        let mut store = RecordStore::default();
        store.apply_save(
            "alice",
            RecordPatch {
                gender: Some("female".into()),
                ..counts(10.0, 20.0)
            },
            Utc::now(),
        );

        let mut recovered = BTreeMap::new();
        recovered.insert(
            "alice".to_string(),
            RecordPatch {
                present: Some(15.0),
                ..Default::default()
            },
        );
        recovered.insert("carol".to_string(), counts(5.0, 6.0));

        let summary = store.merge(recovered, Utc::now());
        assert_eq!(summary, MergeSummary { inserted: 1, updated: 1 });

        let alice = store.get("alice").unwrap();
        assert_eq!(alice.present, 15.0);
        assert_eq!(alice.total, 20.0);
        assert_eq!(alice.gender.as_deref(), Some("female"));
        assert_eq!(store.get("carol").unwrap().total, 6.0);
    }

    #[test]
    fn rows_sorted_case_insensitively() {
        let mut store = RecordStore::default();
        for key in ["bob", "Alice", "carol"] {
            store.apply_save(key, counts(1.0, 1.0), Utc::now());
        }
        let names: Vec<String> = store.rows().into_iter().map(|r| r.username).collect();
        assert_eq!(names, vec!["Alice", "bob", "carol"]);
    }
}
