//! Storage initialization
//!
//! First-run setup: directories, settings and the default category set.

use crate::config::{DefterPaths, Settings};
use crate::error::DefterResult;
use crate::models::Category;

use super::categories::CategoryData;
use super::file_io::write_json_atomic;

/// Prepare a data root for use
///
/// Existing files are left alone, so running it twice is harmless.
pub fn initialize_storage(paths: &DefterPaths, settings: &Settings) -> DefterResult<()> {
    paths.ensure_directories()?;

    if !paths.settings_file().exists() {
        settings.save(paths)?;
    }

    if !paths.categories_file().exists() {
        let data = CategoryData {
            categories: Category::defaults(),
        };
        write_json_atomic(paths.categories_file(), &data)?;
    }

    Ok(())
}

pub fn needs_initialization(paths: &DefterPaths) -> bool {
    !paths.is_initialized()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TransactionKind;
    use tempfile::TempDir;

    #[test]
    fn test_initialize_storage() {
        let temp_dir = TempDir::new().unwrap();
        let paths = DefterPaths::with_base_dir(temp_dir.path().to_path_buf());
        assert!(needs_initialization(&paths));

        initialize_storage(&paths, &Settings::default()).unwrap();

        assert!(!needs_initialization(&paths));
        assert!(paths.categories_file().exists());
        assert!(paths.backup_dir().exists());

        let content = std::fs::read_to_string(paths.categories_file()).unwrap();
        let data: CategoryData = serde_json::from_str(&content).unwrap();
        assert!(data.categories.iter().any(|c| c.kind == TransactionKind::Income));
    }

    #[test]
    fn test_doesnt_overwrite_existing() {
        let temp_dir = TempDir::new().unwrap();
        let paths = DefterPaths::with_base_dir(temp_dir.path().to_path_buf());
        initialize_storage(&paths, &Settings::default()).unwrap();

        let custom = CategoryData {
            categories: vec![Category::new("Özel", TransactionKind::Expense)],
        };
        write_json_atomic(paths.categories_file(), &custom).unwrap();

        let mut settings = Settings::default();
        settings.company_name = "İkinci".into();
        initialize_storage(&paths, &settings).unwrap();

        let content = std::fs::read_to_string(paths.categories_file()).unwrap();
        let data: CategoryData = serde_json::from_str(&content).unwrap();
        assert_eq!(data.categories.len(), 1);
        assert_eq!(Settings::load_or_create(&paths).unwrap().company_name, "");
    }
}
