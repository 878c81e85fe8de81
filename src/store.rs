/// JSON-file persistence for the clinic dataset.
///
/// One data directory holds the root clinic document plus two sibling
/// documents (patient profiles and feedback) and the session marker.
/// A document that is missing or fails to parse is replaced with its
/// default; that recovery is silent apart from a warning in the log.
use std::fs;
use std::io;
use std::path::PathBuf;

use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::models::{ClinicDocument, FeedbackEntry, PatientProfile};

const STATE_FILE: &str = "state.json";
const PROFILES_FILE: &str = "profiles.json";
const FEEDBACK_FILE: &str = "feedback.json";
const SESSION_FILE: &str = "session";

/// Storage failures. Parse-level corruption never appears here; only
/// genuine I/O and serialization failures do.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to serialize {what}: {source}")]
    Serialize {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Handle to the clinic's data directory.
pub struct Store {
    dir: PathBuf,
}

impl Store {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Store { dir })
    }

    fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    /// Load the clinic document. A missing or unparsable file is replaced
    /// with the default document, which is written back immediately so the
    /// next load sees well-formed data.
    pub fn load_state(&self) -> Result<ClinicDocument, StoreError> {
        let path = self.path(STATE_FILE);
        match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(doc) => Ok(doc),
                Err(err) => {
                    warn!(
                        "clinic state at {} is corrupt ({err}); resetting to defaults",
                        path.display()
                    );
                    let doc = ClinicDocument::default();
                    self.save_state(&doc)?;
                    Ok(doc)
                }
            },
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                let doc = ClinicDocument::default();
                self.save_state(&doc)?;
                Ok(doc)
            }
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    /// Write the full clinic document, replacing whatever was stored.
    pub fn save_state(&self, doc: &ClinicDocument) -> Result<(), StoreError> {
        self.write_json(STATE_FILE, doc, "clinic state")
    }

    /// Patient profiles live in their own slot and are read-only here.
    /// Corrupt profile data heals to an empty list without touching the
    /// file, since another flow owns it.
    pub fn load_profiles(&self) -> Result<Vec<PatientProfile>, StoreError> {
        self.load_list(PROFILES_FILE, "patient profiles")
    }

    pub fn load_feedback(&self) -> Result<Vec<FeedbackEntry>, StoreError> {
        self.load_list(FEEDBACK_FILE, "feedback")
    }

    pub fn save_feedback(&self, entries: &[FeedbackEntry]) -> Result<(), StoreError> {
        self.write_json(FEEDBACK_FILE, &entries, "feedback")
    }

    /// The logged-in user, if any. Presence of the marker file with a
    /// non-empty name is the whole session model.
    pub fn session(&self) -> Option<String> {
        fs::read_to_string(self.path(SESSION_FILE))
            .ok()
            .map(|raw| raw.trim().to_string())
            .filter(|name| !name.is_empty())
    }

    pub fn set_session(&self, user: &str) -> Result<(), StoreError> {
        let path = self.path(SESSION_FILE);
        fs::write(&path, user).map_err(|source| StoreError::Io { path, source })
    }

    pub fn clear_session(&self) -> Result<(), StoreError> {
        let path = self.path(SESSION_FILE);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    fn load_list<T: DeserializeOwned>(
        &self,
        file: &str,
        what: &'static str,
    ) -> Result<Vec<T>, StoreError> {
        let path = self.path(file);
        match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(list) => Ok(list),
                Err(err) => {
                    warn!("{what} at {} is corrupt ({err}); treating as empty", path.display());
                    Ok(Vec::new())
                }
            },
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    fn write_json<T: Serialize>(
        &self,
        file: &str,
        value: &T,
        what: &'static str,
    ) -> Result<(), StoreError> {
        let raw = serde_json::to_string_pretty(value)
            .map_err(|source| StoreError::Serialize { what, source })?;
        let path = self.path(file);
        fs::write(&path, raw).map_err(|source| StoreError::Io { path: path.clone(), source })?;
        debug!("wrote {what} to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{uid, Patient};
    use tempfile::tempdir;

    fn store() -> (tempfile::TempDir, Store) {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        (dir, store)
    }

    #[test]
    fn state_round_trips() {
        let (_dir, store) = store();
        let mut doc = ClinicDocument::default();
        doc.patients.push(Patient {
            id: uid("p"),
            name: "Ravi Kumar".to_string(),
            phone: "9876543210".to_string(),
            age: 36,
            sex: "M".to_string(),
        });
        store.save_state(&doc).unwrap();
        assert_eq!(store.load_state().unwrap(), doc);
    }

    #[test]
    fn missing_state_loads_and_persists_default() {
        let (dir, store) = store();
        let doc = store.load_state().unwrap();
        assert_eq!(doc, ClinicDocument::default());
        assert!(dir.path().join(STATE_FILE).exists());
    }

    #[test]
    fn corrupt_state_resets_to_default() {
        let (dir, store) = store();
        fs::write(dir.path().join(STATE_FILE), "{not json").unwrap();
        let doc = store.load_state().unwrap();
        assert_eq!(doc, ClinicDocument::default());
        // the reset is persisted, so a second load parses cleanly
        let raw = fs::read_to_string(dir.path().join(STATE_FILE)).unwrap();
        assert!(serde_json::from_str::<ClinicDocument>(&raw).is_ok());
    }

    #[test]
    fn feedback_round_trips_and_corrupt_reads_as_empty() {
        let (dir, store) = store();
        let entries = vec![FeedbackEntry {
            user: "Ravi".to_string(),
            text: "Great service".to_string(),
            date: "2025-06-01".to_string(),
        }];
        store.save_feedback(&entries).unwrap();
        assert_eq!(store.load_feedback().unwrap(), entries);

        fs::write(dir.path().join(FEEDBACK_FILE), "oops").unwrap();
        assert!(store.load_feedback().unwrap().is_empty());
    }

    #[test]
    fn missing_profiles_read_as_empty() {
        let (_dir, store) = store();
        assert!(store.load_profiles().unwrap().is_empty());
    }

    #[test]
    fn session_flag_set_read_clear() {
        let (_dir, store) = store();
        assert_eq!(store.session(), None);
        store.set_session("reception").unwrap();
        assert_eq!(store.session().as_deref(), Some("reception"));
        store.clear_session().unwrap();
        assert_eq!(store.session(), None);
        // clearing twice is fine
        store.clear_session().unwrap();
    }
}
