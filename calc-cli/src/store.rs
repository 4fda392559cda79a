use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use calc_core::{SnapshotStore, StoreError};
use serde_json::Value;
use tracing::warn;

/// [`SnapshotStore`] kept as one JSON object on disk.
///
/// Every call goes to the file, so several stores over the same path see
/// each other's writes. Writes replace the file atomically.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<BTreeMap<String, Value>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(text) if text.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    // An unreadable file is replaced rather than blocking every write.
    fn read_for_update(&self) -> Result<BTreeMap<String, Value>, StoreError> {
        match self.read() {
            Err(StoreError::Serialization(error)) => {
                warn!(path = %self.path.display(), %error, "replacing corrupt state file");
                Ok(BTreeMap::new())
            }
            other => other,
        }
    }

    fn write(
        &self,
        entries: &BTreeMap<String, Value>,
    ) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, serde_json::to_vec_pretty(entries)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl SnapshotStore for FileStore {
    fn get(
        &self,
        key: &str,
    ) -> Result<Option<Value>, StoreError> {
        Ok(self.read()?.remove(key))
    }

    fn set(
        &mut self,
        key: &str,
        value: Value,
    ) -> Result<(), StoreError> {
        let mut entries = self.read_for_update()?;
        entries.insert(key.to_string(), value);
        self.write(&entries)
    }

    fn clear(
        &mut self,
        prefix: &str,
    ) -> Result<(), StoreError> {
        let mut entries = self.read_for_update()?;
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(prefix));
        if entries.len() == before && self.path.exists() {
            return Ok(());
        }
        if entries.is_empty() {
            return match fs::remove_file(&self.path) {
                Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
                _ => Ok(()),
            };
        }
        self.write(&entries)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use calc_core::{
        Catalog, ContactUpdate, LeadRecord, LeadSink, ProjectCalculator, ProjectType, SinkError,
        Step,
    };
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("state.json"));

        assert_eq!(store.get("calculator_state").unwrap(), None);
    }

    #[test]
    fn values_survive_reopening() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");
        let mut store = FileStore::new(&path);

        store.set("calculator_state", json!({"currentStep": 2})).unwrap();
        let reopened = FileStore::new(&path);

        assert_eq!(
            reopened.get("calculator_state").unwrap(),
            Some(json!({"currentStep": 2}))
        );
        assert!(!dir.path().join("nested").join("state.json.tmp").exists());
    }

    #[test]
    fn clear_removes_only_prefixed_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path().join("state.json"));
        store.set("calculator_state", json!(1)).unwrap();
        store.set("theme", json!("dark")).unwrap();

        store.clear("calculator_").unwrap();

        assert_eq!(store.get("calculator_state").unwrap(), None);
        assert_eq!(store.get("theme").unwrap(), Some(json!("dark")));
    }

    #[test]
    fn clearing_last_key_deletes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let mut store = FileStore::new(&path);
        store.set("calculator_state", json!(1)).unwrap();

        store.clear("calculator_").unwrap();

        assert!(!path.exists());
    }

    struct NoopSink;

    #[async_trait::async_trait]
    impl LeadSink for NoopSink {
        async fn send(
            &self,
            _lead: &LeadRecord,
        ) -> Result<(), SinkError> {
            Ok(())
        }
    }

    fn calculator_over(path: &Path) -> ProjectCalculator {
        ProjectCalculator::new(
            Arc::new(Catalog::builtin()),
            Box::new(FileStore::new(path)),
            Arc::new(NoopSink),
        )
    }

    #[test]
    fn calculator_resumes_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        let mut calculator = calculator_over(&path);
        calculator.advance().unwrap();
        calculator.set_project_type(ProjectType::Website);
        let seo = calculator.available_addons()[0].clone();
        calculator.toggle_addon(&seo);
        calculator.advance().unwrap();
        calculator.set_notes("Strona na wiosnę");
        calculator.update_contact(ContactUpdate {
            first_name: Some("Jan".to_string()),
            email: Some("jan@example.com".to_string()),
            ..Default::default()
        });
        let before = calculator.state().clone();
        drop(calculator);

        let resumed = calculator_over(&path);

        assert_eq!(resumed.state(), &before);
        assert_eq!(resumed.current_step(), Step::Addons);
        assert_eq!(resumed.state().total_cost(), 15_490);
    }

    #[test]
    fn corrupt_file_fails_reads_but_not_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "{ not json").unwrap();
        let mut store = FileStore::new(&path);

        assert!(matches!(
            store.get("calculator_state"),
            Err(StoreError::Serialization(_))
        ));

        store.set("calculator_state", json!(3)).unwrap();
        assert_eq!(store.get("calculator_state").unwrap(), Some(json!(3)));
    }
}
