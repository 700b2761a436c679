//! Grant repository

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::DefterResult;
use crate::models::{Grant, GrantId, ProjectId};

use super::file_io::{read_json, read_lock, write_json_atomic, write_lock};
use super::unique_match;

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct GrantData {
    grants: Vec<Grant>,
}

pub struct GrantRepository {
    path: PathBuf,
    data: RwLock<HashMap<GrantId, Grant>>,
}

impl GrantRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    pub fn load(&self) -> DefterResult<()> {
        let file_data: GrantData = read_json(&self.path)?;
        let mut data = write_lock(&self.data)?;
        data.clear();
        data.extend(file_data.grants.into_iter().map(|g| (g.id, g)));
        Ok(())
    }

    pub fn save(&self) -> DefterResult<()> {
        let grants = self.get_all()?;
        write_json_atomic(&self.path, &GrantData { grants })
    }

    pub fn get(&self, id: GrantId) -> DefterResult<Option<Grant>> {
        Ok(read_lock(&self.data)?.get(&id).cloned())
    }

    pub fn find(&self, input: &str) -> DefterResult<Option<Grant>> {
        let data = read_lock(&self.data)?;
        unique_match(data.values().filter(|g| g.id.matches(input)), input)
    }

    pub fn get_all(&self) -> DefterResult<Vec<Grant>> {
        let data = read_lock(&self.data)?;
        let mut grants: Vec<_> = data.values().cloned().collect();
        grants.sort_by_key(|g| (g.project_id, g.created_at));
        Ok(grants)
    }

    pub fn get_by_project(&self, project_id: ProjectId) -> DefterResult<Vec<Grant>> {
        Ok(self
            .get_all()?
            .into_iter()
            .filter(|g| g.project_id == project_id)
            .collect())
    }

    pub fn upsert(&self, grant: Grant) -> DefterResult<()> {
        write_lock(&self.data)?.insert(grant.id, grant);
        Ok(())
    }

    pub fn delete(&self, id: GrantId) -> DefterResult<bool> {
        Ok(write_lock(&self.data)?.remove(&id).is_some())
    }
}
