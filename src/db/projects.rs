//! The personal project list, persisted under `myProjects`.

use crate::errors::{AppError, AppResult, GridResult};
use crate::remote::RemoteProject;
use crate::types::{Project, ProjectId, project_label};

use super::KeyValueStore;

pub const PROJECTS_KEY: &str = "myProjects";

/// Loads the saved project list, or the default project alone when nothing
/// has been saved yet.
pub fn load_projects(store: &dyn KeyValueStore) -> GridResult<Vec<Project>> {
    match store.load(PROJECTS_KEY)? {
        Some(raw) => Ok(serde_json::from_str(&raw)?),
        None => Ok(vec![Project::default_project()]),
    }
}

pub fn save_projects(projects: &[Project], store: &mut dyn KeyValueStore) -> GridResult<()> {
    let raw = serde_json::to_string(projects)?;
    store.save(PROJECTS_KEY, &raw)?;
    Ok(())
}

/// Rows shown in the grid: non-archived projects in list order.
pub fn visible_projects(projects: &[Project]) -> Vec<Project> {
    projects.iter().filter(|p| !p.archived).cloned().collect()
}

/// `default` on the command line means the default project.
pub fn parse_project_id(raw: &str) -> ProjectId {
    match raw {
        "default" | "null" => None,
        other => Some(other.to_string()),
    }
}

pub fn add_project(projects: &mut Vec<Project>, id: &str, name: &str) -> AppResult<()> {
    let id = parse_project_id(id);
    if projects.iter().any(|p| p.id == id) {
        return Err(AppError::Project(format!(
            "'{}' is already in the list",
            project_label(&id)
        )));
    }
    projects.push(Project {
        id,
        name: name.to_string(),
        archived: false,
    });
    Ok(())
}

pub fn set_archived(projects: &mut [Project], id: &str, archived: bool) -> AppResult<()> {
    let id = parse_project_id(id);
    let project = projects
        .iter_mut()
        .find(|p| p.id == id)
        .ok_or_else(|| AppError::Project(format!("'{}' is not in the list", project_label(&id))))?;
    project.archived = archived;
    Ok(())
}

pub fn remove_project(projects: &mut Vec<Project>, id: &str) -> AppResult<Project> {
    let id = parse_project_id(id);
    if id.is_none() {
        return Err(AppError::Project("the default project cannot be removed".into()));
    }
    let index = projects
        .iter()
        .position(|p| p.id == id)
        .ok_or_else(|| AppError::Project(format!("'{}' is not in the list", project_label(&id))))?;
    Ok(projects.remove(index))
}

/// Append projects referenced remotely but missing locally. Names come from
/// `remote` when known, otherwise the id is used. Returns how many were added.
pub fn append_missing(
    projects: &mut Vec<Project>,
    referenced: &[ProjectId],
    remote: &[RemoteProject],
) -> usize {
    let mut added = 0;
    for id in referenced {
        let Some(raw) = id else {
            continue;
        };
        if projects.iter().any(|p| &p.id == id) {
            continue;
        }
        let name = remote
            .iter()
            .find(|r| &r.id == raw)
            .map(|r| r.name.clone())
            .unwrap_or_else(|| raw.clone());
        projects.push(Project::new(raw.clone(), name));
        added += 1;
    }
    added
}
