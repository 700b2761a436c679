//! Project repository
//!
//! Projects and their milestones are stored together in projects.json.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::DefterResult;
use crate::models::{Milestone, MilestoneId, PartyId, Project, ProjectId};

use super::file_io::{read_json, read_lock, write_json_atomic, write_lock};
use super::unique_match;

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct ProjectData {
    projects: Vec<Project>,
    #[serde(default)]
    milestones: Vec<Milestone>,
}

pub struct ProjectRepository {
    path: PathBuf,
    projects: RwLock<HashMap<ProjectId, Project>>,
    milestones: RwLock<HashMap<MilestoneId, Milestone>>,
}

impl ProjectRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            projects: RwLock::new(HashMap::new()),
            milestones: RwLock::new(HashMap::new()),
        }
    }

    pub fn load(&self) -> DefterResult<()> {
        let file_data: ProjectData = read_json(&self.path)?;

        let mut projects = write_lock(&self.projects)?;
        let mut milestones = write_lock(&self.milestones)?;
        projects.clear();
        milestones.clear();
        projects.extend(file_data.projects.into_iter().map(|p| (p.id, p)));
        milestones.extend(file_data.milestones.into_iter().map(|m| (m.id, m)));
        Ok(())
    }

    pub fn save(&self) -> DefterResult<()> {
        let projects = self.get_all()?;
        let mut milestones: Vec<_> = read_lock(&self.milestones)?.values().cloned().collect();
        milestones.sort_by_key(|m| (m.project_id, m.due_date));
        write_json_atomic(&self.path, &ProjectData { projects, milestones })
    }

    pub fn get(&self, id: ProjectId) -> DefterResult<Option<Project>> {
        Ok(read_lock(&self.projects)?.get(&id).cloned())
    }

    /// All projects, newest start first
    pub fn get_all(&self) -> DefterResult<Vec<Project>> {
        let projects = read_lock(&self.projects)?;
        let mut all: Vec<_> = projects.values().cloned().collect();
        all.sort_by(|a, b| b.start_date.cmp(&a.start_date).then_with(|| a.name.cmp(&b.name)));
        Ok(all)
    }

    pub fn get_by_name(&self, name: &str) -> DefterResult<Option<Project>> {
        let needle = name.trim().to_lowercase();
        let projects = read_lock(&self.projects)?;
        Ok(projects
            .values()
            .find(|p| p.name.to_lowercase() == needle)
            .cloned())
    }

    pub fn get_by_party(&self, party_id: PartyId) -> DefterResult<Vec<Project>> {
        Ok(self
            .get_all()?
            .into_iter()
            .filter(|p| p.party_id == Some(party_id))
            .collect())
    }

    /// Look up by exact name or by ID
    pub fn find(&self, input: &str) -> DefterResult<Option<Project>> {
        if let Some(project) = self.get_by_name(input)? {
            return Ok(Some(project));
        }
        let projects = read_lock(&self.projects)?;
        unique_match(projects.values().filter(|p| p.id.matches(input)), input)
    }

    pub fn upsert(&self, project: Project) -> DefterResult<()> {
        write_lock(&self.projects)?.insert(project.id, project);
        Ok(())
    }

    /// Remove a project together with its milestones
    pub fn delete(&self, id: ProjectId) -> DefterResult<bool> {
        let removed = write_lock(&self.projects)?.remove(&id).is_some();
        write_lock(&self.milestones)?.retain(|_, m| m.project_id != id);
        Ok(removed)
    }

    pub fn get_milestone(&self, id: MilestoneId) -> DefterResult<Option<Milestone>> {
        Ok(read_lock(&self.milestones)?.get(&id).cloned())
    }

    pub fn find_milestone(&self, input: &str) -> DefterResult<Option<Milestone>> {
        let milestones = read_lock(&self.milestones)?;
        unique_match(milestones.values().filter(|m| m.id.matches(input)), input)
    }

    /// A project's milestones by due date
    pub fn milestones_for(&self, project_id: ProjectId) -> DefterResult<Vec<Milestone>> {
        let milestones = read_lock(&self.milestones)?;
        let mut list: Vec<_> = milestones
            .values()
            .filter(|m| m.project_id == project_id)
            .cloned()
            .collect();
        list.sort_by_key(|m| (m.due_date, m.created_at));
        Ok(list)
    }

    pub fn upsert_milestone(&self, milestone: Milestone) -> DefterResult<()> {
        write_lock(&self.milestones)?.insert(milestone.id, milestone);
        Ok(())
    }

    pub fn delete_milestone(&self, id: MilestoneId) -> DefterResult<bool> {
        Ok(write_lock(&self.milestones)?.remove(&id).is_some())
    }

    pub fn count(&self) -> DefterResult<usize> {
        Ok(read_lock(&self.projects)?.len())
    }
}
