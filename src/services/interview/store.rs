//! Interview Persistence Contract
//!
//! The state machine never touches storage directly; it goes through
//! `InterviewStore`. Writes that move a project forward are compare-and-swap:
//! the caller passes the progress it observed, and the store refuses the write
//! with `AppError::Conflict` if another writer got there first.
//!
//! `MemoryInterviewStore` is a complete in-process implementation used by
//! tests and by callers that do not need durability.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use rfp_forge_core::{ProjectProgress, RecordedAnswer};

use crate::models::project::Project;
use crate::models::rfp::RfpDocument;
use crate::utils::error::{AppError, AppResult};

/// Everything one answer submission writes, applied atomically
#[derive(Debug, Clone)]
pub struct SubmissionCommit {
    pub answer: RecordedAnswer,
    /// Attempt count observed before this submission (0 if no row existed)
    pub expected_attempts: u32,
    /// Progress observed before this submission
    pub expected: ProjectProgress,
    /// Progress to store, or `None` to leave it untouched
    pub progress: Option<ProjectProgress>,
    pub updated_at: String,
}

/// Persistence collaborator for projects, recorded answers and documents
pub trait InterviewStore: Send + Sync {
    fn create_project(&self, project: &Project) -> AppResult<()>;

    fn load_project(&self, project_id: &str) -> AppResult<Option<Project>>;

    /// All projects, newest first
    fn list_projects(&self) -> AppResult<Vec<Project>>;

    /// Returns false if the project does not exist
    fn rename_project(&self, project_id: &str, name: &str, updated_at: &str) -> AppResult<bool>;

    /// Delete a project with its answers and documents. Returns false if it did not exist.
    fn delete_project(&self, project_id: &str) -> AppResult<bool>;

    /// Recorded answers ordered by step number
    fn load_recorded_answers(&self, project_id: &str) -> AppResult<Vec<RecordedAnswer>>;

    /// Insert or replace the answer row for `(project_id, step_number)`
    fn upsert_recorded_answer(&self, answer: &RecordedAnswer, updated_at: &str) -> AppResult<()>;

    /// Replace the project's progress if it still equals `expected`
    fn save_project_progress(
        &self,
        project_id: &str,
        expected: &ProjectProgress,
        progress: &ProjectProgress,
        updated_at: &str,
    ) -> AppResult<()>;

    /// Apply one submission: answer upsert plus optional progress change, all or nothing
    fn commit_submission(&self, commit: &SubmissionCommit) -> AppResult<()>;

    /// Store a document and snapshot its completion rate on the project
    fn save_document(&self, document: &RfpDocument) -> AppResult<()>;

    fn latest_document(&self, project_id: &str) -> AppResult<Option<RfpDocument>>;
}

/// Fail with `Conflict` unless the stored progress is what the caller saw
pub(crate) fn ensure_progress_unchanged(
    project_id: &str,
    current: &ProjectProgress,
    expected: &ProjectProgress,
) -> AppResult<()> {
    if current != expected {
        return Err(AppError::conflict(format!(
            "Project {} changed concurrently (now at step {})",
            project_id, current.current_step
        )));
    }
    Ok(())
}

pub(crate) fn ensure_attempts_unchanged(
    commit: &SubmissionCommit,
    stored_attempts: u32,
) -> AppResult<()> {
    if stored_attempts != commit.expected_attempts {
        return Err(AppError::conflict(format!(
            "Step {} of project {} was answered concurrently",
            commit.answer.step_number, commit.answer.project_id
        )));
    }
    Ok(())
}

#[derive(Default)]
struct MemoryState {
    projects: HashMap<String, Project>,
    answers: BTreeMap<(String, u32), RecordedAnswer>,
    documents: Vec<RfpDocument>,
}

/// In-memory `InterviewStore`; one lock serializes every write
#[derive(Default)]
pub struct MemoryInterviewStore {
    state: Mutex<MemoryState>,
}

impl MemoryInterviewStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|_| AppError::internal("memory store lock poisoned"))
    }
}

impl std::fmt::Debug for MemoryInterviewStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryInterviewStore").finish_non_exhaustive()
    }
}

impl InterviewStore for MemoryInterviewStore {
    fn create_project(&self, project: &Project) -> AppResult<()> {
        let mut state = self.lock()?;
        if state.projects.contains_key(&project.id) {
            return Err(AppError::conflict(format!("Project {} already exists", project.id)));
        }
        state.projects.insert(project.id.clone(), project.clone());
        Ok(())
    }

    fn load_project(&self, project_id: &str) -> AppResult<Option<Project>> {
        Ok(self.lock()?.projects.get(project_id).cloned())
    }

    fn list_projects(&self) -> AppResult<Vec<Project>> {
        let state = self.lock()?;
        let mut projects: Vec<Project> = state.projects.values().cloned().collect();
        projects.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(projects)
    }

    fn rename_project(&self, project_id: &str, name: &str, updated_at: &str) -> AppResult<bool> {
        let mut state = self.lock()?;
        match state.projects.get_mut(project_id) {
            Some(project) => {
                project.name = name.to_string();
                project.updated_at = updated_at.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete_project(&self, project_id: &str) -> AppResult<bool> {
        let mut state = self.lock()?;
        let existed = state.projects.remove(project_id).is_some();
        state.answers.retain(|(pid, _), _| pid != project_id);
        state.documents.retain(|d| d.project_id != project_id);
        Ok(existed)
    }

    fn load_recorded_answers(&self, project_id: &str) -> AppResult<Vec<RecordedAnswer>> {
        let state = self.lock()?;
        Ok(state
            .answers
            .iter()
            .filter(|((pid, _), _)| pid == project_id)
            .map(|(_, answer)| answer.clone())
            .collect())
    }

    fn upsert_recorded_answer(&self, answer: &RecordedAnswer, _updated_at: &str) -> AppResult<()> {
        let mut state = self.lock()?;
        if !state.projects.contains_key(&answer.project_id) {
            return Err(AppError::not_found(format!("Project {}", answer.project_id)));
        }
        state.answers.insert(
            (answer.project_id.clone(), answer.step_number),
            answer.clone(),
        );
        Ok(())
    }

    fn save_project_progress(
        &self,
        project_id: &str,
        expected: &ProjectProgress,
        progress: &ProjectProgress,
        updated_at: &str,
    ) -> AppResult<()> {
        let mut state = self.lock()?;
        let project = state
            .projects
            .get_mut(project_id)
            .ok_or_else(|| AppError::not_found(format!("Project {}", project_id)))?;
        ensure_progress_unchanged(project_id, &project.progress, expected)?;
        project.progress = progress.clone();
        project.updated_at = updated_at.to_string();
        Ok(())
    }

    fn commit_submission(&self, commit: &SubmissionCommit) -> AppResult<()> {
        let mut state = self.lock()?;
        let project_id = commit.answer.project_id.clone();
        let key = (project_id.clone(), commit.answer.step_number);

        let current = state
            .projects
            .get(&project_id)
            .map(|p| p.progress.clone())
            .ok_or_else(|| AppError::not_found(format!("Project {}", project_id)))?;
        ensure_progress_unchanged(&project_id, &current, &commit.expected)?;
        let stored_attempts = state.answers.get(&key).map(|a| a.attempt_count).unwrap_or(0);
        ensure_attempts_unchanged(commit, stored_attempts)?;

        state.answers.insert(key, commit.answer.clone());
        if let Some(project) = state.projects.get_mut(&project_id) {
            if let Some(progress) = &commit.progress {
                project.progress = progress.clone();
            }
            project.updated_at = commit.updated_at.clone();
        }
        Ok(())
    }

    fn save_document(&self, document: &RfpDocument) -> AppResult<()> {
        let mut state = self.lock()?;
        let project = state
            .projects
            .get_mut(&document.project_id)
            .ok_or_else(|| AppError::not_found(format!("Project {}", document.project_id)))?;
        project.completion_rate = document.completion_rate;
        project.updated_at = document.created_at.clone();
        state.documents.push(document.clone());
        Ok(())
    }

    fn latest_document(&self, project_id: &str) -> AppResult<Option<RfpDocument>> {
        let state = self.lock()?;
        Ok(state
            .documents
            .iter()
            .rev()
            .find(|d| d.project_id == project_id)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rfp_forge_core::{Answer, ProgressStatus};

    fn store_with_project(id: &str) -> MemoryInterviewStore {
        let store = MemoryInterviewStore::new();
        store
            .create_project(&Project::new(id, "demo", "2026-01-01T00:00:00Z"))
            .unwrap();
        store
    }

    fn commit_for(step: u32, expected_attempts: u32) -> SubmissionCommit {
        SubmissionCommit {
            answer: RecordedAnswer::confirmed("p1", step, Answer::text("ok"), expected_attempts),
            expected_attempts,
            expected: ProjectProgress::default(),
            progress: Some(ProjectProgress {
                current_step: 2,
                status: ProgressStatus::InProgress,
                ..ProjectProgress::default()
            }),
            updated_at: "2026-01-01T00:01:00Z".to_string(),
        }
    }

    #[test]
    fn test_create_rejects_duplicate_id() {
        let store = store_with_project("p1");
        let err = store
            .create_project(&Project::new("p1", "again", "2026-01-02T00:00:00Z"))
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[test]
    fn test_commit_submission_applies_answer_and_progress() {
        let store = store_with_project("p1");
        store.commit_submission(&commit_for(1, 0)).unwrap();

        let project = store.load_project("p1").unwrap().unwrap();
        assert_eq!(project.progress.current_step, 2);
        assert_eq!(project.updated_at, "2026-01-01T00:01:00Z");
        assert_eq!(store.load_recorded_answers("p1").unwrap().len(), 1);
    }

    #[test]
    fn test_commit_submission_detects_stale_progress() {
        let store = store_with_project("p1");
        store.commit_submission(&commit_for(1, 0)).unwrap();

        let err = store.commit_submission(&commit_for(1, 0)).unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[test]
    fn test_commit_submission_detects_stale_attempts() {
        let store = store_with_project("p1");
        store
            .upsert_recorded_answer(&RecordedAnswer::pending("p1", 1, 1), "t")
            .unwrap();

        let err = store.commit_submission(&commit_for(1, 0)).unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[test]
    fn test_delete_cascades() {
        let store = store_with_project("p1");
        store.commit_submission(&commit_for(1, 0)).unwrap();

        assert!(store.delete_project("p1").unwrap());
        assert!(store.load_recorded_answers("p1").unwrap().is_empty());
        assert!(!store.delete_project("p1").unwrap());
    }

    #[test]
    fn test_answers_come_back_in_step_order() {
        let store = store_with_project("p1");
        for step in [3, 1, 2] {
            store
                .upsert_recorded_answer(&RecordedAnswer::pending("p1", step, 1), "t")
                .unwrap();
        }
        let steps: Vec<u32> = store
            .load_recorded_answers("p1")
            .unwrap()
            .iter()
            .map(|a| a.step_number)
            .collect();
        assert_eq!(steps, vec![1, 2, 3]);
    }
}
