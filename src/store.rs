//! Persisting vocabulary tables, one per grade.
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::{info, warn};

use crate::enrich::VocabularyEntry;
use crate::error::{Error, Result};
use crate::grade::Grade;

pub trait VocabularyStore {
    /// Replace the table for `grade`, keeping a backup of any previous one. Returns where the
    /// table went, or `None` when there was nothing to write.
    fn save(&self, grade: Grade, entries: &[VocabularyEntry]) -> Result<Option<PathBuf>>;

    fn load(&self, grade: Grade) -> Result<Vec<VocabularyEntry>>;
}

/// Tables as pretty-printed JSON arrays, `grade_<code>.json` under `dir`.
#[derive(Debug, Clone)]
pub struct JsonStore {
    dir: PathBuf,
}

impl JsonStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn table_path(&self, grade: Grade) -> PathBuf {
        self.dir.join(format!("{}.json", grade.dir_name()))
    }

    fn backup_path(&self, grade: Grade) -> PathBuf {
        let stamp = Local::now().format("%Y-%m-%d_%H.%M.%S");
        let mut path = self.dir.join(format!("{}-backup_{}.json", grade.dir_name(), stamp));
        // two backups inside the same second
        let mut n = 1;
        while path.exists() {
            path = self.dir.join(format!("{}-backup_{}-{}.json", grade.dir_name(), stamp, n));
            n += 1;
        }
        path
    }
}

fn write_atomically(path: &Path, contents: &[u8]) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, contents).map_err(|e| Error::io(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| Error::io(path, e))
}

impl VocabularyStore for JsonStore {
    fn save(&self, grade: Grade, entries: &[VocabularyEntry]) -> Result<Option<PathBuf>> {
        if entries.is_empty() {
            warn!("grade {}: no words to save, leaving existing table alone", grade);
            return Ok(None);
        }
        fs::create_dir_all(&self.dir).map_err(|e| Error::io(&self.dir, e))?;

        let path = self.table_path(grade);
        if path.exists() {
            let backup = self.backup_path(grade);
            fs::rename(&path, &backup).map_err(|e| Error::io(&path, e))?;
            info!("grade {}: backed up previous table to {}", grade, backup.display());
        }

        let json = serde_json::to_vec_pretty(entries)?;
        write_atomically(&path, &json)?;
        info!("grade {}: wrote {} words to {}", grade, entries.len(), path.display());
        Ok(Some(path))
    }

    fn load(&self, grade: Grade) -> Result<Vec<VocabularyEntry>> {
        let path = self.table_path(grade);
        let contents = fs::read(&path).map_err(|e| Error::io(&path, e))?;
        Ok(serde_json::from_slice(&contents)?)
    }
}
