//! Party repository
//!
//! Manages loading and saving parties to parties.json

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::DefterResult;
use crate::models::{Party, PartyId};

use super::file_io::{read_json, read_lock, write_json_atomic, write_lock};
use super::unique_match;

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct PartyData {
    parties: Vec<Party>,
}

/// Case-insensitive key for the name index
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

pub struct PartyRepository {
    path: PathBuf,
    data: RwLock<HashMap<PartyId, Party>>,
    /// Index: normalized name -> party_id
    by_name: RwLock<HashMap<String, PartyId>>,
}

impl PartyRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
            by_name: RwLock::new(HashMap::new()),
        }
    }

    pub fn load(&self) -> DefterResult<()> {
        let file_data: PartyData = read_json(&self.path)?;

        let mut data = write_lock(&self.data)?;
        let mut by_name = write_lock(&self.by_name)?;
        data.clear();
        by_name.clear();

        for party in file_data.parties {
            by_name.insert(normalize_name(&party.name), party.id);
            data.insert(party.id, party);
        }

        Ok(())
    }

    pub fn save(&self) -> DefterResult<()> {
        let parties = self.get_all()?;
        write_json_atomic(&self.path, &PartyData { parties })
    }

    pub fn get(&self, id: PartyId) -> DefterResult<Option<Party>> {
        Ok(read_lock(&self.data)?.get(&id).cloned())
    }

    /// All parties sorted by name
    pub fn get_all(&self) -> DefterResult<Vec<Party>> {
        let data = read_lock(&self.data)?;
        let mut parties: Vec<_> = data.values().cloned().collect();
        parties.sort_by_key(|p| normalize_name(&p.name));
        Ok(parties)
    }

    pub fn get_by_name(&self, name: &str) -> DefterResult<Option<Party>> {
        let data = read_lock(&self.data)?;
        let by_name = read_lock(&self.by_name)?;
        Ok(by_name
            .get(&normalize_name(name))
            .and_then(|id| data.get(id))
            .cloned())
    }

    /// Look up by exact name or by ID (full or short form)
    pub fn find(&self, input: &str) -> DefterResult<Option<Party>> {
        if let Some(party) = self.get_by_name(input)? {
            return Ok(Some(party));
        }
        let data = read_lock(&self.data)?;
        unique_match(data.values().filter(|p| p.id.matches(input)), input)
    }

    pub fn upsert(&self, party: Party) -> DefterResult<()> {
        let mut data = write_lock(&self.data)?;
        let mut by_name = write_lock(&self.by_name)?;

        if let Some(old) = data.get(&party.id) {
            by_name.remove(&normalize_name(&old.name));
        }
        by_name.insert(normalize_name(&party.name), party.id);
        data.insert(party.id, party);
        Ok(())
    }

    pub fn delete(&self, id: PartyId) -> DefterResult<bool> {
        let mut data = write_lock(&self.data)?;
        let mut by_name = write_lock(&self.by_name)?;

        match data.remove(&id) {
            Some(party) => {
                by_name.remove(&normalize_name(&party.name));
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn count(&self) -> DefterResult<usize> {
        Ok(read_lock(&self.data)?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PartyKind;
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, PartyRepository) {
        let temp_dir = TempDir::new().unwrap();
        let repo = PartyRepository::new(temp_dir.path().join("parties.json"));
        (temp_dir, repo)
    }

    #[test]
    fn test_name_lookup_is_case_insensitive() {
        let (_temp, repo) = create_test_repo();
        let party = Party::new("Acme Ltd", PartyKind::Customer);
        repo.upsert(party.clone()).unwrap();

        let found = repo.get_by_name("  ACME ltd ").unwrap().unwrap();
        assert_eq!(found.id, party.id);
    }

    #[test]
    fn test_rename_updates_index() {
        let (_temp, repo) = create_test_repo();
        let mut party = Party::new("Eski Ad", PartyKind::Supplier);
        repo.upsert(party.clone()).unwrap();

        party.name = "Yeni Ad".into();
        repo.upsert(party).unwrap();

        assert!(repo.get_by_name("Eski Ad").unwrap().is_none());
        assert!(repo.get_by_name("Yeni Ad").unwrap().is_some());
    }

    #[test]
    fn test_find_by_short_id() {
        let (_temp, repo) = create_test_repo();
        let party = Party::new("Beta", PartyKind::Both);
        repo.upsert(party.clone()).unwrap();

        let found = repo.find(&party.id.to_string()).unwrap().unwrap();
        assert_eq!(found.name, "Beta");
        assert!(repo.find("Gamma").unwrap().is_none());
    }

    #[test]
    fn test_save_and_load() {
        let (temp, repo) = create_test_repo();
        repo.upsert(Party::new("Beta", PartyKind::Customer)).unwrap();
        repo.upsert(Party::new("Alfa", PartyKind::Customer)).unwrap();
        repo.save().unwrap();

        let reloaded = PartyRepository::new(temp.path().join("parties.json"));
        reloaded.load().unwrap();
        let names: Vec<_> = reloaded.get_all().unwrap().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Alfa", "Beta"]);
    }

    #[test]
    fn test_delete() {
        let (_temp, repo) = create_test_repo();
        let party = Party::new("Silinecek", PartyKind::Customer);
        repo.upsert(party.clone()).unwrap();

        assert!(repo.delete(party.id).unwrap());
        assert!(!repo.delete(party.id).unwrap());
        assert_eq!(repo.count().unwrap(), 0);
        assert!(repo.get_by_name("Silinecek").unwrap().is_none());
    }
}
