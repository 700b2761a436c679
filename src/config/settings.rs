//! Company settings for Defter
//!
//! Stored as `config.json` in the data root. Every field has a serde default
//! so older files keep loading as fields are added.

use serde::{Deserialize, Serialize};

use super::paths::DefterPaths;
use crate::error::{DefterError, DefterResult};
use crate::models::{Currency, Percent};

/// Current on-disk schema
pub const SCHEMA_VERSION: u32 = 1;

/// Backup retention settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupRetention {
    /// Number of most recent backups to keep
    pub daily_count: u32,
    /// Number of monthly backups (oldest of each month) to keep
    pub monthly_count: u32,
}

impl Default for BackupRetention {
    fn default() -> Self {
        Self {
            daily_count: 30,
            monthly_count: 12,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    #[serde(default)]
    pub company_name: String,

    /// Reporting currency; every transaction stores its net in this currency
    #[serde(default)]
    pub base_currency: Currency,

    /// VAT rate applied when a transaction gives none
    #[serde(default = "default_vat_rate")]
    pub default_vat_rate: Percent,

    /// Date format for display (strftime)
    #[serde(default = "default_date_format")]
    pub date_format: String,

    #[serde(default)]
    pub backup_retention: BackupRetention,

    /// Window for "upcoming" installments in the debt report
    #[serde(default = "default_upcoming_days")]
    pub upcoming_days: u32,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

fn default_vat_rate() -> Percent {
    Percent::whole(20)
}

fn default_date_format() -> String {
    "%d.%m.%Y".to_string()
}

fn default_upcoming_days() -> u32 {
    30
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            company_name: String::new(),
            base_currency: Currency::default(),
            default_vat_rate: default_vat_rate(),
            date_format: default_date_format(),
            backup_retention: BackupRetention::default(),
            upcoming_days: default_upcoming_days(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or defaults if the file doesn't exist
    pub fn load_or_create(paths: &DefterPaths) -> DefterResult<Self> {
        let settings_path = paths.settings_file();

        if !settings_path.exists() {
            return Ok(Settings::default());
        }

        let contents = std::fs::read_to_string(&settings_path)
            .map_err(|e| DefterError::Io(format!("Ayar dosyası okunamadı: {}", e)))?;

        let settings: Settings = serde_json::from_str(&contents)
            .map_err(|e| DefterError::Config(format!("Ayar dosyası çözümlenemedi: {}", e)))?;

        if settings.schema_version > SCHEMA_VERSION {
            return Err(DefterError::Config(format!(
                "Desteklenmeyen şema sürümü: {} (en fazla {})",
                settings.schema_version, SCHEMA_VERSION
            )));
        }

        Ok(settings)
    }

    pub fn save(&self, paths: &DefterPaths) -> DefterResult<()> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| DefterError::Config(format!("Ayarlar yazılamadı: {}", e)))?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| DefterError::Io(format!("Ayar dosyası yazılamadı: {}", e)))?;

        Ok(())
    }

    /// Apply a `key=value` change from the command line
    pub fn set(&mut self, key: &str, value: &str) -> DefterResult<()> {
        match key {
            "company_name" => self.company_name = value.trim().to_string(),
            "base_currency" => {
                self.base_currency = Currency::parse(value)
                    .ok_or_else(|| DefterError::invalid(key, format!("Bilinmeyen para birimi: {}", value)))?;
            }
            "default_vat_rate" => {
                self.default_vat_rate =
                    Percent::parse(value).map_err(|e| DefterError::invalid(key, e.to_string()))?;
            }
            "date_format" => self.date_format = value.to_string(),
            "upcoming_days" => {
                self.upcoming_days = value
                    .trim()
                    .parse()
                    .map_err(|_| DefterError::invalid(key, "Gün sayısı bir tamsayı olmalıdır"))?;
            }
            "backup_retention.daily_count" => {
                self.backup_retention.daily_count = value
                    .trim()
                    .parse()
                    .map_err(|_| DefterError::invalid(key, "Bir tamsayı olmalıdır"))?;
            }
            "backup_retention.monthly_count" => {
                self.backup_retention.monthly_count = value
                    .trim()
                    .parse()
                    .map_err(|_| DefterError::invalid(key, "Bir tamsayı olmalıdır"))?;
            }
            _ => {
                return Err(DefterError::Config(format!("Bilinmeyen ayar: {}", key)));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.base_currency, Currency::Try);
        assert_eq!(settings.default_vat_rate, Percent::whole(20));
        assert_eq!(settings.backup_retention.daily_count, 30);
        assert_eq!(settings.backup_retention.monthly_count, 12);
        assert_eq!(settings.upcoming_days, 30);
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let paths = DefterPaths::with_base_dir(temp_dir.path().to_path_buf());

        let mut settings = Settings::default();
        settings.company_name = "Örnek Yazılım Ltd".into();
        settings.base_currency = Currency::Eur;
        settings.save(&paths).unwrap();

        let loaded = Settings::load_or_create(&paths).unwrap();
        assert_eq!(loaded.company_name, "Örnek Yazılım Ltd");
        assert_eq!(loaded.base_currency, Currency::Eur);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"company_name":"X"}"#).unwrap();
        assert_eq!(settings.schema_version, SCHEMA_VERSION);
        assert_eq!(settings.upcoming_days, 30);
    }

    #[test]
    fn test_set_keys() {
        let mut settings = Settings::default();
        settings.set("base_currency", "usd").unwrap();
        settings.set("default_vat_rate", "%10").unwrap();
        settings.set("backup_retention.daily_count", "7").unwrap();
        assert_eq!(settings.base_currency, Currency::Usd);
        assert_eq!(settings.default_vat_rate, Percent::whole(10));
        assert_eq!(settings.backup_retention.daily_count, 7);

        assert!(settings.set("upcoming_days", "soon").unwrap_err().is_validation());
        assert!(settings.set("theme", "dark").is_err());
    }

    #[test]
    fn test_newer_schema_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let paths = DefterPaths::with_base_dir(temp_dir.path().to_path_buf());
        paths.ensure_directories().unwrap();
        std::fs::write(paths.settings_file(), r#"{"schema_version": 99}"#).unwrap();
        assert!(Settings::load_or_create(&paths).is_err());
    }
}
