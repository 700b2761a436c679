//! Backup system for Defter
//!
//! `BackupManager` writes `backup-YYYYMMDD-HHMMSS-mmm.json` archives holding
//! every data file and prunes them by the retention settings;
//! `RestoreManager` validates an archive and writes it back.
//!
//! # Retention
//!
//! The newest `daily_count` backups are kept. Beyond those, the oldest
//! backup of each month counts as a monthly backup and the newest
//! `monthly_count` of them are kept as well.
//!
//! # Example
//!
//! ```rust,ignore
//! use defter::backup::{BackupManager, RestoreManager};
//! use defter::config::{BackupRetention, DefterPaths};
//!
//! let paths = DefterPaths::new()?;
//! let manager = BackupManager::new(paths.clone(), BackupRetention::default());
//! let (backup_path, _) = manager.create_backup_with_retention()?;
//!
//! let result = RestoreManager::new(paths).restore_from_file(&backup_path)?;
//! println!("{}", result.summary());
//! ```

mod manager;
mod restore;

pub use manager::{BackupArchive, BackupInfo, BackupManager};
pub use restore::{RestoreManager, RestoreResult, ValidationResult};
