//! FILENAME: core/persistence/src/store.rs
//! Report stores.
//!
//! Stores are last-write-wins: `save` overwrites whatever is stored under
//! the report id, no conflict detection.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use report_engine::{log_enter, log_error, log_exit, log_info, log_warn, Report};

use crate::document::{parse_report, render_report};
use crate::PersistenceError;

pub trait ReportStore {
    fn get(&self, id: &str) -> Result<Report, PersistenceError>;

    /// All reports of an organization, most recently modified first.
    fn list(&self, organization: &str) -> Result<Vec<Report>, PersistenceError>;

    /// Stores a new report. Fails when the id is taken.
    fn create(&mut self, report: &Report) -> Result<(), PersistenceError>;

    /// Overwrites an existing report.
    fn save(&mut self, report: &Report) -> Result<(), PersistenceError>;

    fn delete(&mut self, id: &str) -> Result<(), PersistenceError>;
}

fn sort_for_listing(reports: &mut [Report]) {
    reports.sort_by(|a, b| {
        b.last_modified_on
            .cmp(&a.last_modified_on)
            .then_with(|| a.id.cmp(&b.id))
    });
}

// ============================================================================
// IN-MEMORY STORE
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct MemoryReportStore {
    reports: BTreeMap<String, Report>,
}

impl MemoryReportStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }
}

impl ReportStore for MemoryReportStore {
    fn get(&self, id: &str) -> Result<Report, PersistenceError> {
        self.reports
            .get(id)
            .cloned()
            .ok_or_else(|| PersistenceError::ReportNotFound(id.to_string()))
    }

    fn list(&self, organization: &str) -> Result<Vec<Report>, PersistenceError> {
        let mut reports: Vec<Report> = self
            .reports
            .values()
            .filter(|r| r.organization == organization)
            .cloned()
            .collect();
        sort_for_listing(&mut reports);
        Ok(reports)
    }

    fn create(&mut self, report: &Report) -> Result<(), PersistenceError> {
        if self.reports.contains_key(&report.id) {
            return Err(PersistenceError::ReportExists(report.id.clone()));
        }
        self.reports.insert(report.id.clone(), report.clone());
        Ok(())
    }

    fn save(&mut self, report: &Report) -> Result<(), PersistenceError> {
        match self.reports.get_mut(&report.id) {
            Some(stored) => {
                *stored = report.clone();
                Ok(())
            }
            None => Err(PersistenceError::ReportNotFound(report.id.clone())),
        }
    }

    fn delete(&mut self, id: &str) -> Result<(), PersistenceError> {
        self.reports
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| PersistenceError::ReportNotFound(id.to_string()))
    }
}

// ============================================================================
// JSON DIRECTORY STORE
// ============================================================================

/// One `<id>.json` document per report inside a directory.
#[derive(Debug, Clone)]
pub struct JsonDirReportStore {
    dir: PathBuf,
}

impl JsonDirReportStore {
    /// Opens the store, creating the directory if needed.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(JsonDirReportStore { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: &str) -> Result<PathBuf, PersistenceError> {
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(PersistenceError::InvalidFormat(format!("invalid report id '{}'", id)));
        }
        Ok(self.dir.join(format!("{}.json", id)))
    }

    fn write(&self, path: &Path, report: &Report) -> Result<(), PersistenceError> {
        fs::write(path, render_report(report)?).map_err(|e| {
            log_error!("STORE", "failed to write {}: {}", path.display(), e);
            PersistenceError::from(e)
        })
    }
}

impl ReportStore for JsonDirReportStore {
    fn get(&self, id: &str) -> Result<Report, PersistenceError> {
        let path = self.path_for(id)?;
        if !path.exists() {
            return Err(PersistenceError::ReportNotFound(id.to_string()));
        }
        parse_report(id, &fs::read_to_string(&path)?)
    }

    fn list(&self, organization: &str) -> Result<Vec<Report>, PersistenceError> {
        log_enter!("STORE", "list", "organization={}", organization);
        let mut reports = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(id) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match parse_report(id, &fs::read_to_string(&path)?) {
                Ok(report) if report.organization == organization => reports.push(report),
                Ok(_) => {}
                Err(e) => log_warn!("STORE", "skipping unreadable report {}: {}", path.display(), e),
            }
        }
        sort_for_listing(&mut reports);
        log_exit!("STORE", "list", "count={}", reports.len());
        Ok(reports)
    }

    fn create(&mut self, report: &Report) -> Result<(), PersistenceError> {
        let path = self.path_for(&report.id)?;
        if path.exists() {
            return Err(PersistenceError::ReportExists(report.id.clone()));
        }
        self.write(&path, report)?;
        log_info!("STORE", "created report {}", report.id);
        Ok(())
    }

    fn save(&mut self, report: &Report) -> Result<(), PersistenceError> {
        let path = self.path_for(&report.id)?;
        if !path.exists() {
            return Err(PersistenceError::ReportNotFound(report.id.clone()));
        }
        self.write(&path, report)?;
        log_info!("STORE", "saved report {}", report.id);
        Ok(())
    }

    fn delete(&mut self, id: &str) -> Result<(), PersistenceError> {
        let path = self.path_for(id)?;
        if !path.exists() {
            return Err(PersistenceError::ReportNotFound(id.to_string()));
        }
        fs::remove_file(&path)?;
        log_info!("STORE", "deleted report {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn report(org: &str, modified: i64) -> Report {
        Report::new_default(org, "ana", Utc.timestamp_opt(modified, 0).unwrap())
    }

    fn exercise(store: &mut dyn ReportStore) {
        let older = report("org1", 1_000);
        let newer = report("org1", 2_000);
        let other = report("org2", 3_000);
        for r in [&older, &newer, &other] {
            store.create(r).unwrap();
        }
        assert!(matches!(store.create(&older), Err(PersistenceError::ReportExists(_))));

        let listed: Vec<String> = store.list("org1").unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(listed, vec![newer.id.clone(), older.id.clone()]);

        let mut renamed = older.clone();
        renamed.name = "Renamed".to_string();
        store.save(&renamed).unwrap();
        assert_eq!(store.get(&older.id).unwrap().name, "Renamed");

        store.delete(&newer.id).unwrap();
        assert!(matches!(store.get(&newer.id), Err(PersistenceError::ReportNotFound(_))));
        assert!(matches!(store.delete(&newer.id), Err(PersistenceError::ReportNotFound(_))));
        assert!(matches!(store.save(&newer), Err(PersistenceError::ReportNotFound(_))));
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryReportStore::new();
        exercise(&mut store);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_json_dir_store() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonDirReportStore::open(dir.path().join("reports")).unwrap();
        exercise(&mut store);
        assert!(store.dir().join(format!("{}.json", store.list("org2").unwrap()[0].id)).exists());
    }

    #[test]
    fn test_json_dir_store_write_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonDirReportStore::open(dir.path().join("reports")).unwrap();
        let r = report("org1", 1_000);
        store.create(&r).unwrap();

        fs::remove_dir_all(store.dir()).unwrap();
        fs::create_dir_all(store.dir().join(format!("{}.json", r.id))).unwrap();
        assert!(matches!(store.save(&r), Err(PersistenceError::Io(_))));
    }

    #[test]
    fn test_json_dir_store_rejects_path_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonDirReportStore::open(dir.path()).unwrap();
        assert!(matches!(store.get("../secret"), Err(PersistenceError::InvalidFormat(_))));
    }

    #[test]
    fn test_json_dir_store_skips_unreadable_documents() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonDirReportStore::open(dir.path()).unwrap();
        store.create(&report("org1", 1_000)).unwrap();
        fs::write(dir.path().join("broken.json"), "{ nope").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        assert_eq!(store.list("org1").unwrap().len(), 1);
    }
}
