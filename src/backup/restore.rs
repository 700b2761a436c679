//! Backup restoration for Defter

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};

use crate::config::settings::SCHEMA_VERSION;
use crate::config::DefterPaths;
use crate::error::{DefterError, DefterResult};
use crate::storage::write_json_atomic;

use super::manager::BackupArchive;

pub struct RestoreManager {
    paths: DefterPaths,
}

impl RestoreManager {
    pub fn new(paths: DefterPaths) -> Self {
        Self { paths }
    }

    /// Overwrite the data files with the contents of a backup
    ///
    /// Files archived as `null` (absent at backup time) are removed so the
    /// data root matches the backup exactly.
    pub fn restore_from_file(&self, backup_path: &Path) -> DefterResult<RestoreResult> {
        let archive = read_archive(backup_path)?;
        self.restore_from_archive(&archive)
    }

    pub fn restore_from_archive(&self, archive: &BackupArchive) -> DefterResult<RestoreResult> {
        check_schema(archive)?;
        self.paths.ensure_directories()?;

        let mut result = RestoreResult {
            schema_version: archive.schema_version,
            backup_date: archive.created_at,
            restored: Vec::new(),
            cleared: Vec::new(),
        };

        for (name, path) in self.paths.data_files() {
            match archive.files.get(name) {
                Some(value) if !value.is_null() => {
                    write_json_atomic(&path, value)?;
                    result.restored.push(name);
                }
                _ => {
                    if path.exists() {
                        fs::remove_file(&path).map_err(|e| {
                            DefterError::Backup(format!("{} silinemedi: {}", path.display(), e))
                        })?;
                    }
                    result.cleared.push(name);
                }
            }
        }

        tracing::info!(restored = result.restored.len(), "backup restored");
        Ok(result)
    }

    /// Parse a backup and report what it contains without touching data
    pub fn validate_backup(&self, backup_path: &Path) -> DefterResult<ValidationResult> {
        let archive = read_archive(backup_path)?;
        check_schema(&archive)?;

        let mut present = Vec::new();
        let mut missing = Vec::new();
        for (name, _) in self.paths.data_files() {
            match archive.files.get(name) {
                Some(value) if value.is_object() => present.push(name),
                _ => missing.push(name),
            }
        }

        Ok(ValidationResult {
            schema_version: archive.schema_version,
            backup_date: archive.created_at,
            present,
            missing,
        })
    }
}

fn read_archive(backup_path: &Path) -> DefterResult<BackupArchive> {
    let contents = fs::read_to_string(backup_path)
        .map_err(|e| DefterError::Backup(format!("Yedek dosyası okunamadı: {}", e)))?;
    serde_json::from_str(&contents)
        .map_err(|e| DefterError::Backup(format!("Yedek dosyası çözümlenemedi: {}", e)))
}

fn check_schema(archive: &BackupArchive) -> DefterResult<()> {
    if archive.schema_version > SCHEMA_VERSION {
        return Err(DefterError::Backup(format!(
            "Yedek daha yeni bir sürümle alınmış (şema {})",
            archive.schema_version
        )));
    }
    Ok(())
}

#[derive(Debug)]
pub struct RestoreResult {
    pub schema_version: u32,
    pub backup_date: DateTime<Utc>,
    /// Data files written from the archive
    pub restored: Vec<&'static str>,
    /// Data files removed because the archive had none
    pub cleared: Vec<&'static str>,
}

impl RestoreResult {
    pub fn summary(&self) -> String {
        format!("Geri yüklendi: {}", self.restored.join(", "))
    }
}

#[derive(Debug)]
pub struct ValidationResult {
    pub schema_version: u32,
    pub backup_date: DateTime<Utc>,
    pub present: Vec<&'static str>,
    pub missing: Vec<&'static str>,
}

impl ValidationResult {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }

    pub fn summary(&self) -> String {
        if self.is_complete() {
            format!("Tam yedek (şema {})", self.schema_version)
        } else {
            format!(
                "Kısmi yedek (şema {}): mevcut [{}], eksik [{}]",
                self.schema_version,
                self.present.join(", "),
                self.missing.join(", ")
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::BackupManager;
    use crate::config::BackupRetention;
    use crate::models::{Party, PartyKind};
    use crate::storage::Storage;
    use tempfile::TempDir;

    fn create_test_env() -> (RestoreManager, BackupManager, DefterPaths, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let paths = DefterPaths::with_base_dir(temp_dir.path().to_path_buf());
        paths.ensure_directories().unwrap();
        let backup_manager = BackupManager::new(paths.clone(), BackupRetention::default());
        let restore_manager = RestoreManager::new(paths.clone());
        (restore_manager, backup_manager, paths, temp_dir)
    }

    #[test]
    fn test_restore_brings_back_deleted_party() {
        let (restore_manager, backup_manager, paths, _temp) = create_test_env();
        let storage = Storage::new(paths.clone()).unwrap();
        let party = Party::new("Geri Gelen", PartyKind::Customer);
        storage.parties.upsert(party.clone()).unwrap();
        storage.parties.save().unwrap();

        let backup_path = backup_manager.create_backup().unwrap();

        storage.parties.delete(party.id).unwrap();
        storage.parties.save().unwrap();

        let result = restore_manager.restore_from_file(&backup_path).unwrap();
        assert!(result.restored.contains(&"parties"));
        assert!(result.cleared.contains(&"debts"));

        let reopened = Storage::new(paths).unwrap();
        reopened.load_all().unwrap();
        assert!(reopened.parties.get(party.id).unwrap().is_some());
    }

    #[test]
    fn test_restore_clears_files_absent_from_backup() {
        let (restore_manager, backup_manager, paths, _temp) = create_test_env();
        let backup_path = backup_manager.create_backup().unwrap();

        std::fs::write(paths.grants_file(), r#"{"grants":[]}"#).unwrap();
        restore_manager.restore_from_file(&backup_path).unwrap();
        assert!(!paths.grants_file().exists());
    }

    #[test]
    fn test_validate_backup() {
        let (restore_manager, backup_manager, paths, _temp) = create_test_env();
        std::fs::write(paths.parties_file(), r#"{"parties":[]}"#).unwrap();
        let backup_path = backup_manager.create_backup().unwrap();

        let result = restore_manager.validate_backup(&backup_path).unwrap();
        assert_eq!(result.schema_version, SCHEMA_VERSION);
        assert_eq!(result.present, vec!["parties"]);
        assert!(!result.is_complete());
        assert!(result.summary().contains("Kısmi yedek"));
    }

    #[test]
    fn test_rejects_garbage_and_newer_schema() {
        let (restore_manager, _backup_manager, paths, temp) = create_test_env();
        let garbage = temp.path().join("garbage.json");
        std::fs::write(&garbage, "not json").unwrap();
        assert!(matches!(
            restore_manager.validate_backup(&garbage),
            Err(DefterError::Backup(_))
        ));

        let future = temp.path().join("future.json");
        std::fs::write(
            &future,
            r#"{"schema_version":99,"created_at":"2030-01-01T00:00:00Z","files":{}}"#,
        )
        .unwrap();
        assert!(restore_manager.restore_from_file(&future).is_err());
        assert!(!paths.parties_file().exists());
    }
}
