//! Backup manager for Defter
//!
//! Rolling backups of every data file, stored as one timestamped JSON
//! archive per run.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::config::settings::{BackupRetention, SCHEMA_VERSION};
use crate::config::DefterPaths;
use crate::error::{DefterError, DefterResult};

/// Metadata about a backup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupInfo {
    pub filename: String,
    pub path: PathBuf,
    pub created_at: DateTime<Utc>,
    pub size_bytes: u64,
    /// Oldest backup of its month; kept under the monthly allowance
    pub is_monthly: bool,
}

/// On-disk archive format
#[derive(Debug, Serialize, Deserialize)]
pub struct BackupArchive {
    pub schema_version: u32,
    pub created_at: DateTime<Utc>,
    /// Contents of each data file keyed by its name (`parties`, `debts`, ...)
    pub files: BTreeMap<String, serde_json::Value>,
}

pub struct BackupManager {
    backup_dir: PathBuf,
    paths: DefterPaths,
    retention: BackupRetention,
}

impl BackupManager {
    pub fn new(paths: DefterPaths, retention: BackupRetention) -> Self {
        let backup_dir = paths.backup_dir();
        Self {
            backup_dir,
            paths,
            retention,
        }
    }

    /// Write an archive of all data files and return its path
    pub fn create_backup(&self) -> DefterResult<PathBuf> {
        fs::create_dir_all(&self.backup_dir)
            .map_err(|e| DefterError::Backup(format!("Yedek dizini oluşturulamadı: {}", e)))?;

        let now = Utc::now();
        let filename = format!(
            "backup-{}-{:03}.json",
            now.format("%Y%m%d-%H%M%S"),
            now.timestamp_subsec_millis()
        );
        let backup_path = self.backup_dir.join(&filename);

        let archive = self.create_archive(now)?;
        let json = serde_json::to_string_pretty(&archive)?;
        fs::write(&backup_path, json)
            .map_err(|e| DefterError::Backup(format!("Yedek dosyası yazılamadı: {}", e)))?;

        tracing::info!(path = %backup_path.display(), "backup created");
        Ok(backup_path)
    }

    fn create_archive(&self, timestamp: DateTime<Utc>) -> DefterResult<BackupArchive> {
        let mut files = BTreeMap::new();
        for (name, path) in self.paths.data_files() {
            files.insert(name.to_string(), read_json_value(&path)?);
        }
        Ok(BackupArchive {
            schema_version: SCHEMA_VERSION,
            created_at: timestamp,
            files,
        })
    }

    /// All backups, newest first
    pub fn list_backups(&self) -> DefterResult<Vec<BackupInfo>> {
        if !self.backup_dir.exists() {
            return Ok(Vec::new());
        }

        let mut backups = Vec::new();
        for entry in fs::read_dir(&self.backup_dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                if let Some(info) = parse_backup_info(&path) {
                    backups.push(info);
                }
            }
        }

        backups.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        // The oldest backup in each month is the monthly one
        let mut seen_months = HashSet::new();
        for backup in backups.iter_mut().rev() {
            let month = (backup.created_at.year(), backup.created_at.month());
            backup.is_monthly = seen_months.insert(month);
        }

        Ok(backups)
    }

    /// Backups that fall outside the retention allowance
    ///
    /// The newest `daily_count` backups are kept, plus the newest
    /// `monthly_count` monthly backups.
    pub fn prune_candidates(&self) -> DefterResult<Vec<BackupInfo>> {
        let mut monthly_kept = 0u32;
        let mut candidates = Vec::new();
        for (index, backup) in self.list_backups()?.into_iter().enumerate() {
            if index < self.retention.daily_count as usize {
                continue;
            }
            if backup.is_monthly && monthly_kept < self.retention.monthly_count {
                monthly_kept += 1;
                continue;
            }
            candidates.push(backup);
        }
        Ok(candidates)
    }

    /// Delete backups beyond the retention allowance
    pub fn enforce_retention(&self) -> DefterResult<Vec<PathBuf>> {
        let mut deleted = Vec::new();
        for backup in self.prune_candidates()? {
            fs::remove_file(&backup.path)
                .map_err(|e| DefterError::Backup(format!("Eski yedek silinemedi: {}", e)))?;
            deleted.push(backup.path);
        }

        if !deleted.is_empty() {
            tracing::debug!(count = deleted.len(), "old backups removed");
        }
        Ok(deleted)
    }

    pub fn create_backup_with_retention(&self) -> DefterResult<(PathBuf, Vec<PathBuf>)> {
        let backup_path = self.create_backup()?;
        let deleted = self.enforce_retention()?;
        Ok((backup_path, deleted))
    }

    pub fn backup_dir(&self) -> &PathBuf {
        &self.backup_dir
    }

    /// Look up a backup by file name
    pub fn get_backup(&self, filename: &str) -> DefterResult<Option<BackupInfo>> {
        let path = self.backup_dir.join(filename);
        if path.exists() {
            Ok(parse_backup_info(&path))
        } else {
            Ok(None)
        }
    }

    pub fn get_latest_backup(&self) -> DefterResult<Option<BackupInfo>> {
        Ok(self.list_backups()?.into_iter().next())
    }
}

fn parse_backup_info(path: &Path) -> Option<BackupInfo> {
    let filename = path.file_name()?.to_string_lossy().to_string();
    let stamp = filename.strip_prefix("backup-")?.strip_suffix(".json")?;
    let created_at = parse_backup_timestamp(stamp)?;
    let size_bytes = fs::metadata(path).ok()?.len();

    Some(BackupInfo {
        filename,
        path: path.to_path_buf(),
        created_at,
        size_bytes,
        is_monthly: false,
    })
}

/// Missing files are archived as `null`
fn read_json_value(path: &Path) -> DefterResult<serde_json::Value> {
    if !path.exists() {
        return Ok(serde_json::Value::Null);
    }
    let contents = fs::read_to_string(path)
        .map_err(|e| DefterError::Backup(format!("{} okunamadı: {}", path.display(), e)))?;
    Ok(serde_json::from_str(&contents)?)
}

/// Parse `YYYYMMDD-HHMMSS` or `YYYYMMDD-HHMMSS-mmm`
fn parse_backup_timestamp(stamp: &str) -> Option<DateTime<Utc>> {
    let parts: Vec<&str> = stamp.split('-').collect();
    let (date_part, time_part, millis) = match parts.as_slice() {
        [date, time] => (*date, *time, 0u32),
        [date, time, millis] => (*date, *time, millis.parse().ok()?),
        _ => return None,
    };

    let date = NaiveDate::parse_from_str(date_part, "%Y%m%d").ok()?;
    let time = NaiveTime::parse_from_str(time_part, "%H%M%S").ok()?;
    let time = time.with_nanosecond(millis.checked_mul(1_000_000)?)?;
    Some(NaiveDateTime::new(date, time).and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Party, PartyKind};
    use crate::storage::Storage;
    use tempfile::TempDir;

    fn create_test_manager(daily_count: u32, monthly_count: u32) -> (BackupManager, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let paths = DefterPaths::with_base_dir(temp_dir.path().to_path_buf());
        paths.ensure_directories().unwrap();
        let retention = BackupRetention {
            daily_count,
            monthly_count,
        };
        (BackupManager::new(paths, retention), temp_dir)
    }

    fn touch_backup(manager: &BackupManager, stamp: &str) {
        let archive = BackupArchive {
            schema_version: SCHEMA_VERSION,
            created_at: Utc::now(),
            files: BTreeMap::new(),
        };
        let path = manager.backup_dir().join(format!("backup-{}.json", stamp));
        fs::write(path, serde_json::to_string(&archive).unwrap()).unwrap();
    }

    #[test]
    fn test_create_backup_contains_data_files() {
        let (manager, temp) = create_test_manager(3, 2);
        let storage = Storage::new(DefterPaths::with_base_dir(temp.path().to_path_buf())).unwrap();
        storage.parties.upsert(Party::new("Yedek AŞ", PartyKind::Supplier)).unwrap();
        storage.parties.save().unwrap();

        let backup_path = manager.create_backup().unwrap();
        assert!(backup_path.to_string_lossy().contains("backup-"));

        let archive: BackupArchive =
            serde_json::from_str(&fs::read_to_string(&backup_path).unwrap()).unwrap();
        assert_eq!(archive.files.len(), 8);
        assert!(archive.files["parties"].to_string().contains("Yedek AŞ"));
        assert!(archive.files["grants"].is_null());
    }

    #[test]
    fn test_list_backups_newest_first() {
        let (manager, _temp) = create_test_manager(3, 2);
        touch_backup(&manager, "20250101-090000-000");
        touch_backup(&manager, "20250103-090000-000");
        touch_backup(&manager, "20250102-090000-000");
        fs::write(manager.backup_dir().join("notes.txt"), "x").unwrap();

        let backups = manager.list_backups().unwrap();
        assert_eq!(backups.len(), 3);
        assert_eq!(backups[0].filename, "backup-20250103-090000-000.json");
        assert!(backups[2].is_monthly);
        assert!(!backups[0].is_monthly);
    }

    #[test]
    fn test_retention_keeps_daily_and_monthly() {
        let (manager, _temp) = create_test_manager(2, 1);
        touch_backup(&manager, "20250105-100000-000"); // monthly for January
        touch_backup(&manager, "20250120-100000-000");
        touch_backup(&manager, "20250203-100000-000"); // monthly for February
        touch_backup(&manager, "20250210-100000-000");
        touch_backup(&manager, "20250211-100000-000");

        let deleted = manager.enforce_retention().unwrap();
        let deleted: Vec<String> = deleted
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();

        // two newest stay, February's monthly uses the only monthly slot
        assert_eq!(
            deleted,
            vec![
                "backup-20250120-100000-000.json".to_string(),
                "backup-20250105-100000-000.json".to_string()
            ]
        );
        assert_eq!(manager.list_backups().unwrap().len(), 3);
    }

    #[test]
    fn test_get_latest_backup() {
        let (manager, _temp) = create_test_manager(3, 2);
        assert!(manager.get_latest_backup().unwrap().is_none());

        let path = manager.create_backup().unwrap();
        assert_eq!(manager.get_latest_backup().unwrap().unwrap().path, path);

        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(manager.get_backup(&name).unwrap().is_some());
        assert!(manager.get_backup("backup-19990101-000000.json").unwrap().is_none());
    }

    #[test]
    fn test_parse_backup_timestamp() {
        let timestamp = parse_backup_timestamp("20251127-143022").unwrap();
        assert_eq!((timestamp.year(), timestamp.month(), timestamp.day()), (2025, 11, 27));
        assert_eq!(timestamp.timestamp_subsec_millis(), 0);

        let timestamp = parse_backup_timestamp("20251127-143022-456").unwrap();
        assert_eq!(timestamp.timestamp_subsec_millis(), 456);

        assert!(parse_backup_timestamp("20251327-143022").is_none());
        assert!(parse_backup_timestamp("latest").is_none());
    }
}
