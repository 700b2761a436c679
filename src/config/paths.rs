//! Path management for Defter
//!
//! ## Path Resolution Order
//!
//! 1. `DEFTER_DATA_DIR` environment variable (if set)
//! 2. The platform config directory from `directories`
//!    (`~/.config/defter` on Linux, `~/Library/Application Support/defter`
//!    on macOS, `%APPDATA%\defter` on Windows)

use std::path::PathBuf;

use directories::ProjectDirs;

use crate::error::{DefterError, DefterResult};

/// Environment variable that overrides the data root
pub const DATA_DIR_ENV: &str = "DEFTER_DATA_DIR";

/// Manages all paths used by Defter
#[derive(Debug, Clone)]
pub struct DefterPaths {
    base_dir: PathBuf,
}

impl DefterPaths {
    /// Resolve the data root
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined and no
    /// override is set.
    pub fn new() -> DefterResult<Self> {
        let base_dir = match std::env::var_os(DATA_DIR_ENV) {
            Some(custom) if !custom.is_empty() => PathBuf::from(custom),
            _ => ProjectDirs::from("", "", "defter")
                .map(|dirs| dirs.config_dir().to_path_buf())
                .ok_or_else(|| DefterError::Config("Ana dizin belirlenemedi".into()))?,
        };

        Ok(Self { base_dir })
    }

    /// Use an explicit base directory (tests, `--data-dir`)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    pub fn backup_dir(&self) -> PathBuf {
        self.base_dir.join("backups")
    }

    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    pub fn audit_log(&self) -> PathBuf {
        self.base_dir.join("audit.log")
    }

    pub fn parties_file(&self) -> PathBuf {
        self.data_dir().join("parties.json")
    }

    pub fn categories_file(&self) -> PathBuf {
        self.data_dir().join("categories.json")
    }

    pub fn transactions_file(&self) -> PathBuf {
        self.data_dir().join("transactions.json")
    }

    /// Debts and their installments
    pub fn debts_file(&self) -> PathBuf {
        self.data_dir().join("debts.json")
    }

    pub fn payments_file(&self) -> PathBuf {
        self.data_dir().join("payments.json")
    }

    /// Projects and milestones
    pub fn projects_file(&self) -> PathBuf {
        self.data_dir().join("projects.json")
    }

    pub fn grants_file(&self) -> PathBuf {
        self.data_dir().join("grants.json")
    }

    pub fn exchange_rates_file(&self) -> PathBuf {
        self.data_dir().join("exchange_rates.json")
    }

    /// Every data file, in backup order
    pub fn data_files(&self) -> Vec<(&'static str, PathBuf)> {
        vec![
            ("parties", self.parties_file()),
            ("categories", self.categories_file()),
            ("transactions", self.transactions_file()),
            ("debts", self.debts_file()),
            ("payments", self.payments_file()),
            ("projects", self.projects_file()),
            ("grants", self.grants_file()),
            ("exchange_rates", self.exchange_rates_file()),
        ]
    }

    /// Create the base, data and backup directories
    pub fn ensure_directories(&self) -> DefterResult<()> {
        for dir in [self.base_dir.clone(), self.data_dir(), self.backup_dir()] {
            std::fs::create_dir_all(&dir).map_err(|e| {
                DefterError::Io(format!("Dizin oluşturulamadı {}: {}", dir.display(), e))
            })?;
        }
        Ok(())
    }

    /// Whether `defter init` has run here
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}
