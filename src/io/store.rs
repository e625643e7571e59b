//! Key-value persistence for the working plan.
//!
//! The plan is loaded once at startup and written back after every change.
//! The timeline itself never touches the store.

use std::path::{Path, PathBuf};

use crate::io::IoError;
use crate::model::Plan;

/// Key the working plan is stored under.
pub const PLAN_KEY: &str = "timelineTasks";

/// Minimal string key-value storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, IoError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), IoError>;
}

/// Stores each key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store rooted in the per-user application data directory.
    pub fn open_default() -> Result<Self, IoError> {
        let dirs = directories::ProjectDirs::from("", "", "LanePlanner").ok_or(IoError::NoDataDir)?;
        Ok(Self::new(dirs.data_dir()))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, IoError> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), IoError> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.path_for(key), value)?;
        Ok(())
    }
}

/// Load the stored plan, if any.
///
/// A stored value that no longer parses is logged and treated as absent so the
/// caller can fall back to a fresh plan.
pub fn load_plan(store: &dyn KeyValueStore) -> Result<Option<Plan>, IoError> {
    let Some(json) = store.get(PLAN_KEY)? else {
        return Ok(None);
    };
    match serde_json::from_str::<Plan>(&json) {
        Ok(raw) => {
            let (mut plan, rejected) = Plan::from_tasks(raw.name.clone(), raw.tasks().to_vec());
            plan.created = raw.created;
            plan.modified = raw.modified;
            tracing::info!(tasks = plan.tasks().len(), rejected, "restored stored plan");
            Ok(Some(plan))
        }
        Err(e) => {
            tracing::warn!(error = %e, "stored plan is corrupt, ignoring it");
            Ok(None)
        }
    }
}

pub fn save_plan(store: &mut dyn KeyValueStore, plan: &Plan) -> Result<(), IoError> {
    let json = serde_json::to_string(plan)?;
    store.set(PLAN_KEY, &json)?;
    tracing::debug!(tasks = plan.tasks().len(), "plan stored");
    Ok(())
}
