//! Agent configurations persisted as a JSON array in a single file.

use std::fs;
use std::path::{Path, PathBuf};

use crate::agent::AgentConfig;
use crate::error::{AssistError, AssistResult};

/// File-backed agent registry.
///
/// Every call reads the file afresh, so separate handles on the same path
/// see each other's writes. A missing file is an empty registry.
#[derive(Clone, Debug)]
pub struct AgentConfigStore {
    path: PathBuf,
}

impl AgentConfigStore {
    /// A store backed by the JSON file at `path`. The file is created on first save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All agents in insertion order.
    pub fn list(&self) -> AssistResult<Vec<AgentConfig>> {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        if data.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_slice(&data)?)
    }

    /// The agent with this id.
    pub fn get(&self, id: &str) -> AssistResult<AgentConfig> {
        self.list()?
            .into_iter()
            .find(|a| a.id == id)
            .ok_or_else(|| AssistError::AgentNotFound(id.to_string()))
    }

    /// Find an agent by id, or by case-insensitive name.
    pub fn find(&self, key: &str) -> AssistResult<AgentConfig> {
        let agents = self.list()?;
        agents
            .iter()
            .find(|a| a.id == key)
            .or_else(|| agents.iter().find(|a| a.name.eq_ignore_ascii_case(key)))
            .cloned()
            .ok_or_else(|| AssistError::AgentNotFound(key.to_string()))
    }

    /// Insert or replace by id. Replacing keeps the agent's position.
    pub fn save(&self, agent: AgentConfig) -> AssistResult<()> {
        agent.validate()?;
        let mut agents = self.list()?;
        match agents.iter_mut().find(|a| a.id == agent.id) {
            Some(existing) => *existing = agent,
            None => agents.push(agent),
        }
        self.write(&agents)
    }

    /// Remove by id. Returns `false` if no agent had that id.
    pub fn delete(&self, id: &str) -> AssistResult<bool> {
        let mut agents = self.list()?;
        let before = agents.len();
        agents.retain(|a| a.id != id);
        if agents.len() == before {
            return Ok(false);
        }
        self.write(&agents)?;
        Ok(true)
    }

    fn write(&self, agents: &[AgentConfig]) -> AssistResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(agents)?)?;
        fs::rename(&tmp, &self.path)?;
        tracing::debug!(path = %self.path.display(), agents = agents.len(), "saved agent registry");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentProvider;

    fn store() -> (tempfile::TempDir, AgentConfigStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = AgentConfigStore::new(dir.path().join("config").join("agents.json"));
        (dir, store)
    }

    #[test]
    fn missing_file_is_empty() {
        let (_dir, store) = store();
        assert!(store.list().unwrap().is_empty());
        assert!(matches!(store.get("x"), Err(AssistError::AgentNotFound(_))));
    }

    #[test]
    fn save_upserts_by_id() {
        let (_dir, store) = store();
        let mut modeler = AgentConfig::new("Modeler", AgentProvider::OpenAi, "sk-1", "");
        let reviewer = AgentConfig::new("Reviewer", AgentProvider::Anthropic, "sk-2", "");
        store.save(modeler.clone()).unwrap();
        store.save(reviewer.clone()).unwrap();

        modeler.model = "gpt-4o-mini".into();
        store.save(modeler.clone()).unwrap();

        let agents = store.list().unwrap();
        assert_eq!(agents, vec![modeler.clone(), reviewer]);
        assert_eq!(store.get(&modeler.id).unwrap().model, "gpt-4o-mini");
        assert_eq!(store.find("modeler").unwrap().id, modeler.id);
    }

    #[test]
    fn delete_reports_whether_removed() {
        let (_dir, store) = store();
        let agent = AgentConfig::new("Modeler", AgentProvider::OpenAi, "sk-1", "");
        store.save(agent.clone()).unwrap();

        assert!(store.delete(&agent.id).unwrap());
        assert!(!store.delete(&agent.id).unwrap());
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn invalid_agents_are_not_saved() {
        let (_dir, store) = store();
        let agent = AgentConfig::new("", AgentProvider::OpenAi, "sk-1", "");
        assert!(matches!(store.save(agent), Err(AssistError::InvalidAgent(_))));
        assert!(!store.path().exists());
    }

    #[test]
    fn corrupt_file_is_reported() {
        let (dir, store) = store();
        fs::create_dir_all(dir.path().join("config")).unwrap();
        fs::write(store.path(), "{not json").unwrap();
        assert!(matches!(store.list(), Err(AssistError::Serialization(_))));
    }
}
