use crate::io::IoError;
use crate::model::Plan;
use std::path::Path;

/// Save a plan to a JSON file.
pub fn save_plan_file(plan: &Plan, path: &Path) -> Result<(), IoError> {
    let json = serde_json::to_string_pretty(plan)?;
    std::fs::write(path, json)?;
    tracing::info!(path = %path.display(), tasks = plan.tasks().len(), "plan saved");
    Ok(())
}

/// Load a plan from a JSON file, dropping tasks that fail validation.
pub fn load_plan_file(path: &Path) -> Result<Plan, IoError> {
    let json = std::fs::read_to_string(path)?;
    let raw: Plan = serde_json::from_str(&json)?;
    let (mut plan, rejected) = Plan::from_tasks(raw.name.clone(), raw.tasks().to_vec());
    plan.created = raw.created;
    plan.modified = raw.modified;
    tracing::info!(path = %path.display(), tasks = plan.tasks().len(), rejected, "plan loaded");
    Ok(plan)
}
