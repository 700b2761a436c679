//! Category repository
//!
//! Manages loading and saving categories to categories.json

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::DefterResult;
use crate::models::{Category, CategoryId, TransactionKind};

use super::file_io::{read_json, read_lock, write_json_atomic, write_lock};
use super::unique_match;

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct CategoryData {
    pub categories: Vec<Category>,
}

pub struct CategoryRepository {
    path: PathBuf,
    data: RwLock<HashMap<CategoryId, Category>>,
}

impl CategoryRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    pub fn load(&self) -> DefterResult<()> {
        let file_data: CategoryData = read_json(&self.path)?;
        let mut data = write_lock(&self.data)?;
        data.clear();
        data.extend(file_data.categories.into_iter().map(|c| (c.id, c)));
        Ok(())
    }

    pub fn save(&self) -> DefterResult<()> {
        let categories = self.get_all()?;
        write_json_atomic(&self.path, &CategoryData { categories })
    }

    pub fn get(&self, id: CategoryId) -> DefterResult<Option<Category>> {
        Ok(read_lock(&self.data)?.get(&id).cloned())
    }

    /// Income categories first, then by name
    pub fn get_all(&self) -> DefterResult<Vec<Category>> {
        let data = read_lock(&self.data)?;
        let mut categories: Vec<_> = data.values().cloned().collect();
        categories.sort_by(|a, b| {
            a.kind
                .cmp(&b.kind)
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        });
        Ok(categories)
    }

    pub fn get_by_kind(&self, kind: TransactionKind) -> DefterResult<Vec<Category>> {
        Ok(self.get_all()?.into_iter().filter(|c| c.kind == kind).collect())
    }

    /// Case-insensitive name lookup, optionally restricted to one kind
    pub fn get_by_name(&self, name: &str, kind: Option<TransactionKind>) -> DefterResult<Option<Category>> {
        let needle = name.trim().to_lowercase();
        let data = read_lock(&self.data)?;
        let matches = data
            .values()
            .filter(|c| c.name.to_lowercase() == needle)
            .filter(|c| kind.map_or(true, |k| c.kind == k));
        unique_match(matches, name)
    }

    pub fn find(&self, input: &str, kind: Option<TransactionKind>) -> DefterResult<Option<Category>> {
        if let Some(category) = self.get_by_name(input, kind)? {
            return Ok(Some(category));
        }
        let data = read_lock(&self.data)?;
        unique_match(data.values().filter(|c| c.id.matches(input)), input)
    }

    pub fn upsert(&self, category: Category) -> DefterResult<()> {
        write_lock(&self.data)?.insert(category.id, category);
        Ok(())
    }

    pub fn delete(&self, id: CategoryId) -> DefterResult<bool> {
        Ok(write_lock(&self.data)?.remove(&id).is_some())
    }

    pub fn count(&self) -> DefterResult<usize> {
        Ok(read_lock(&self.data)?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, CategoryRepository) {
        let temp_dir = TempDir::new().unwrap();
        let repo = CategoryRepository::new(temp_dir.path().join("categories.json"));
        (temp_dir, repo)
    }

    #[test]
    fn test_same_name_in_both_kinds() {
        let (_temp, repo) = create_test_repo();
        let income = Category::new("Diğer", TransactionKind::Income);
        let expense = Category::new("Diğer", TransactionKind::Expense);
        repo.upsert(income.clone()).unwrap();
        repo.upsert(expense.clone()).unwrap();

        let found = repo.get_by_name("diğer", Some(TransactionKind::Expense)).unwrap().unwrap();
        assert_eq!(found.id, expense.id);
        // Ambiguous without a kind
        assert!(repo.get_by_name("Diğer", None).is_err());
    }

    #[test]
    fn test_get_all_orders_income_first() {
        let (_temp, repo) = create_test_repo();
        repo.upsert(Category::new("Kira", TransactionKind::Expense)).unwrap();
        repo.upsert(Category::new("Satış", TransactionKind::Income)).unwrap();

        let all = repo.get_all().unwrap();
        assert_eq!(all[0].kind, TransactionKind::Income);
        assert_eq!(repo.get_by_kind(TransactionKind::Expense).unwrap().len(), 1);
    }

    #[test]
    fn test_save_and_load() {
        let (temp, repo) = create_test_repo();
        for category in Category::defaults() {
            repo.upsert(category).unwrap();
        }
        repo.save().unwrap();

        let reloaded = CategoryRepository::new(temp.path().join("categories.json"));
        reloaded.load().unwrap();
        assert_eq!(reloaded.count().unwrap(), Category::defaults().len());
    }
}
