//! Category service
//!
//! Income and expense categories. Names are unique within a kind, so
//! "Diğer" may exist once as income and once as expense.

use chrono::Utc;

use crate::audit::EntityType;
use crate::error::{DefterError, DefterResult};
use crate::models::{Category, CategoryId, TransactionKind};
use crate::storage::Storage;

/// Service for category management
pub struct CategoryService<'a> {
    storage: &'a Storage,
}

impl<'a> CategoryService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    pub fn create(
        &self,
        name: &str,
        kind: TransactionKind,
        color: Option<String>,
    ) -> DefterResult<Category> {
        let name = name.trim();
        self.ensure_name_free(name, kind, None)?;

        let mut category = Category::new(name, kind);
        category.color = color;
        category.validate()?;

        self.storage.categories.upsert(category.clone())?;
        self.storage.categories.save()?;

        self.storage.log_create(
            EntityType::Category,
            category.id.to_string(),
            Some(category.name.clone()),
            &category,
        )?;

        Ok(category)
    }

    pub fn get(&self, id: CategoryId) -> DefterResult<Option<Category>> {
        self.storage.categories.get(id)
    }

    pub fn find(&self, identifier: &str, kind: Option<TransactionKind>) -> DefterResult<Option<Category>> {
        self.storage.categories.find(identifier, kind)
    }

    pub fn resolve(&self, identifier: &str, kind: Option<TransactionKind>) -> DefterResult<Category> {
        self.find(identifier, kind)?
            .ok_or_else(|| DefterError::category_not_found(identifier))
    }

    /// Categories ordered income first, optionally one kind only
    pub fn list(&self, kind: Option<TransactionKind>, include_archived: bool) -> DefterResult<Vec<Category>> {
        let categories = match kind {
            Some(kind) => self.storage.categories.get_by_kind(kind)?,
            None => self.storage.categories.get_all()?,
        };
        Ok(categories
            .into_iter()
            .filter(|c| include_archived || !c.archived)
            .collect())
    }

    /// Rename and/or recolor a category
    pub fn update(
        &self,
        id: CategoryId,
        name: Option<&str>,
        color: Option<Option<String>>,
    ) -> DefterResult<Category> {
        let mut category = self
            .storage
            .categories
            .get(id)?
            .ok_or_else(|| DefterError::category_not_found(id.to_string()))?;
        let before = category.clone();

        if let Some(name) = name {
            let name = name.trim();
            self.ensure_name_free(name, category.kind, Some(id))?;
            category.name = name.to_string();
        }
        if let Some(color) = color {
            category.color = color;
        }
        category.updated_at = Utc::now();
        category.validate()?;

        self.storage.categories.upsert(category.clone())?;
        self.storage.categories.save()?;

        self.storage.log_update(
            EntityType::Category,
            category.id.to_string(),
            Some(category.name.clone()),
            &before,
            &category,
        )?;

        Ok(category)
    }

    pub fn set_archived(&self, id: CategoryId, archived: bool) -> DefterResult<Category> {
        let mut category = self
            .storage
            .categories
            .get(id)?
            .ok_or_else(|| DefterError::category_not_found(id.to_string()))?;
        if category.archived == archived {
            return Ok(category);
        }

        let before = category.clone();
        category.archived = archived;
        category.updated_at = Utc::now();

        self.storage.categories.upsert(category.clone())?;
        self.storage.categories.save()?;

        self.storage.log_update(
            EntityType::Category,
            category.id.to_string(),
            Some(category.name.clone()),
            &before,
            &category,
        )?;

        Ok(category)
    }

    /// Delete a category no transaction uses
    pub fn delete(&self, id: CategoryId) -> DefterResult<Category> {
        let category = self
            .storage
            .categories
            .get(id)?
            .ok_or_else(|| DefterError::category_not_found(id.to_string()))?;

        let used = self.storage.transactions.get_by_category(id)?.len();
        if used > 0 {
            return Err(DefterError::Conflict(format!(
                "'{}' kategorisi {} işlemde kullanılıyor",
                category.name, used
            )));
        }

        self.storage.categories.delete(id)?;
        self.storage.categories.save()?;

        self.storage.log_delete(
            EntityType::Category,
            category.id.to_string(),
            Some(category.name.clone()),
            &category,
        )?;

        Ok(category)
    }

    fn ensure_name_free(
        &self,
        name: &str,
        kind: TransactionKind,
        except: Option<CategoryId>,
    ) -> DefterResult<()> {
        if let Some(existing) = self.storage.categories.get_by_name(name, Some(kind))? {
            if Some(existing.id) != except {
                return Err(DefterError::Duplicate {
                    entity_type: "Kategori",
                    identifier: name.to_string(),
                });
            }
        }
        Ok(())
    }
}
