//! Interview State Persistence
//!
//! SQLite implementation of `InterviewStore`. Progress-changing writes run in
//! an IMMEDIATE transaction so the compare-and-swap check and the write see
//! the same snapshot.

use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};

use rfp_forge_core::{
    Answer, CompletionLevel, Phase, ProgressStatus, ProjectProgress, RecordedAnswer, TrustLevel,
};

use crate::models::project::Project;
use crate::models::rfp::{GenerationMode, RfpContent, RfpDocument};
use crate::storage::database::DbPool;
use crate::utils::error::{AppError, AppResult};

use super::store::{
    ensure_attempts_unchanged, ensure_progress_unchanged, InterviewStore, SubmissionCommit,
};

const PROJECT_COLUMNS: &str = "id, name, current_phase, current_step, status, \
     awaiting_transition, completion_rate, created_at, updated_at";

const DOCUMENT_COLUMNS: &str = "id, project_id, version, content, completion_rate, \
     completion_level, minimum_requirements_met, mode, created_at";

/// Project row as stored, before the text columns are decoded
struct ProjectRow {
    id: String,
    name: String,
    current_phase: String,
    current_step: u32,
    status: String,
    awaiting_transition: bool,
    completion_rate: u8,
    created_at: String,
    updated_at: String,
}

impl ProjectRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            current_phase: row.get(2)?,
            current_step: row.get(3)?,
            status: row.get(4)?,
            awaiting_transition: row.get(5)?,
            completion_rate: row.get(6)?,
            created_at: row.get(7)?,
            updated_at: row.get(8)?,
        })
    }

    fn into_project(self) -> AppResult<Project> {
        let current_phase = Phase::parse(&self.current_phase).ok_or_else(|| {
            AppError::database(format!(
                "Project {} has unknown phase '{}'",
                self.id, self.current_phase
            ))
        })?;
        let status = ProgressStatus::parse(&self.status).ok_or_else(|| {
            AppError::database(format!(
                "Project {} has unknown status '{}'",
                self.id, self.status
            ))
        })?;

        Ok(Project {
            id: self.id,
            name: self.name,
            progress: ProjectProgress {
                current_phase,
                current_step: self.current_step,
                status,
                awaiting_transition: self.awaiting_transition,
            },
            completion_rate: self.completion_rate,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

struct AnswerRow {
    project_id: String,
    step_number: u32,
    raw_answer: Option<String>,
    trust_level: String,
    attempt_count: u32,
}

impl AnswerRow {
    fn into_answer(self) -> AppResult<RecordedAnswer> {
        let raw_answer = self
            .raw_answer
            .as_deref()
            .map(serde_json::from_str::<Answer>)
            .transpose()?;
        let trust_level = TrustLevel::parse(&self.trust_level).ok_or_else(|| {
            AppError::database(format!("Unknown trust level '{}'", self.trust_level))
        })?;

        Ok(RecordedAnswer {
            project_id: self.project_id,
            step_number: self.step_number,
            raw_answer,
            trust_level,
            attempt_count: self.attempt_count,
        })
    }
}

struct DocumentRow {
    id: String,
    project_id: String,
    version: String,
    content: String,
    completion_rate: u8,
    completion_level: String,
    minimum_requirements_met: bool,
    mode: String,
    created_at: String,
}

impl DocumentRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            project_id: row.get(1)?,
            version: row.get(2)?,
            content: row.get(3)?,
            completion_rate: row.get(4)?,
            completion_level: row.get(5)?,
            minimum_requirements_met: row.get(6)?,
            mode: row.get(7)?,
            created_at: row.get(8)?,
        })
    }

    fn into_document(self) -> AppResult<RfpDocument> {
        let content: RfpContent = serde_json::from_str(&self.content)?;
        let completion_level = CompletionLevel::parse(&self.completion_level).ok_or_else(|| {
            AppError::database(format!("Unknown completion level '{}'", self.completion_level))
        })?;
        let mode = GenerationMode::parse(&self.mode)
            .ok_or_else(|| AppError::database(format!("Unknown generation mode '{}'", self.mode)))?;

        Ok(RfpDocument {
            id: self.id,
            project_id: self.project_id,
            version: self.version,
            content,
            completion_rate: self.completion_rate,
            completion_level,
            minimum_requirements_met: self.minimum_requirements_met,
            mode,
            created_at: self.created_at,
        })
    }
}

/// Manages interview state persistence in SQLite
#[derive(Clone)]
pub struct SqliteInterviewStore {
    pool: DbPool,
}

impl SqliteInterviewStore {
    /// Create a store over a pool whose schema is already initialized
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn get_connection(&self) -> AppResult<r2d2::PooledConnection<r2d2_sqlite::SqliteConnectionManager>> {
        self.pool
            .get()
            .map_err(|e| AppError::database(format!("Failed to get connection: {}", e)))
    }

    fn read_progress(conn: &Connection, project_id: &str) -> AppResult<Option<ProjectProgress>> {
        let sql = format!("SELECT {} FROM projects WHERE id = ?1", PROJECT_COLUMNS);
        let row = conn
            .query_row(&sql, params![project_id], ProjectRow::from_row)
            .optional()?;
        row.map(|r| r.into_project().map(|p| p.progress)).transpose()
    }

    fn write_progress(
        conn: &Connection,
        project_id: &str,
        progress: &ProjectProgress,
        updated_at: &str,
    ) -> AppResult<()> {
        conn.execute(
            "UPDATE projects
             SET current_phase = ?2, current_step = ?3, status = ?4,
                 awaiting_transition = ?5, updated_at = ?6
             WHERE id = ?1",
            params![
                project_id,
                progress.current_phase.as_str(),
                progress.current_step,
                progress.status.as_str(),
                progress.awaiting_transition,
                updated_at,
            ],
        )?;
        Ok(())
    }

    fn write_answer(conn: &Connection, answer: &RecordedAnswer, updated_at: &str) -> AppResult<()> {
        let raw = answer
            .raw_answer
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        conn.execute(
            "INSERT INTO recorded_answers
                (project_id, step_number, raw_answer, trust_level, attempt_count, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(project_id, step_number) DO UPDATE SET
                raw_answer = excluded.raw_answer,
                trust_level = excluded.trust_level,
                attempt_count = excluded.attempt_count,
                updated_at = excluded.updated_at",
            params![
                answer.project_id,
                answer.step_number,
                raw,
                answer.trust_level.as_str(),
                answer.attempt_count,
                updated_at,
            ],
        )?;
        Ok(())
    }

    fn touch_project(conn: &Connection, project_id: &str, updated_at: &str) -> AppResult<()> {
        conn.execute(
            "UPDATE projects SET updated_at = ?2 WHERE id = ?1",
            params![project_id, updated_at],
        )?;
        Ok(())
    }
}

impl std::fmt::Debug for SqliteInterviewStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteInterviewStore")
            .field("pool_size", &self.pool.max_size())
            .finish()
    }
}

impl InterviewStore for SqliteInterviewStore {
    fn create_project(&self, project: &Project) -> AppResult<()> {
        let conn = self.get_connection()?;
        let inserted = conn.execute(
            "INSERT INTO projects (id, name, current_phase, current_step, status,
                awaiting_transition, completion_rate, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             ON CONFLICT(id) DO NOTHING",
            params![
                project.id,
                project.name,
                project.progress.current_phase.as_str(),
                project.progress.current_step,
                project.progress.status.as_str(),
                project.progress.awaiting_transition,
                project.completion_rate,
                project.created_at,
                project.updated_at,
            ],
        )?;

        if inserted == 0 {
            return Err(AppError::conflict(format!("Project {} already exists", project.id)));
        }
        Ok(())
    }

    fn load_project(&self, project_id: &str) -> AppResult<Option<Project>> {
        let conn = self.get_connection()?;
        let sql = format!("SELECT {} FROM projects WHERE id = ?1", PROJECT_COLUMNS);

        match conn.query_row(&sql, params![project_id], ProjectRow::from_row) {
            Ok(row) => Ok(Some(row.into_project()?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(AppError::Sqlite(e)),
        }
    }

    fn list_projects(&self) -> AppResult<Vec<Project>> {
        let conn = self.get_connection()?;
        let sql = format!(
            "SELECT {} FROM projects ORDER BY created_at DESC, rowid DESC",
            PROJECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], ProjectRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(ProjectRow::into_project).collect()
    }

    fn rename_project(&self, project_id: &str, name: &str, updated_at: &str) -> AppResult<bool> {
        let conn = self.get_connection()?;
        let changed = conn.execute(
            "UPDATE projects SET name = ?2, updated_at = ?3 WHERE id = ?1",
            params![project_id, name, updated_at],
        )?;
        Ok(changed > 0)
    }

    fn delete_project(&self, project_id: &str) -> AppResult<bool> {
        let conn = self.get_connection()?;
        let deleted = conn.execute("DELETE FROM projects WHERE id = ?1", params![project_id])?;
        Ok(deleted > 0)
    }

    fn load_recorded_answers(&self, project_id: &str) -> AppResult<Vec<RecordedAnswer>> {
        let conn = self.get_connection()?;
        let mut stmt = conn.prepare(
            "SELECT project_id, step_number, raw_answer, trust_level, attempt_count
             FROM recorded_answers
             WHERE project_id = ?1
             ORDER BY step_number ASC",
        )?;

        let rows = stmt
            .query_map(params![project_id], |row| {
                Ok(AnswerRow {
                    project_id: row.get(0)?,
                    step_number: row.get(1)?,
                    raw_answer: row.get(2)?,
                    trust_level: row.get(3)?,
                    attempt_count: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(AnswerRow::into_answer).collect()
    }

    fn upsert_recorded_answer(&self, answer: &RecordedAnswer, updated_at: &str) -> AppResult<()> {
        let conn = self.get_connection()?;
        Self::write_answer(&conn, answer, updated_at)
    }

    fn save_project_progress(
        &self,
        project_id: &str,
        expected: &ProjectProgress,
        progress: &ProjectProgress,
        updated_at: &str,
    ) -> AppResult<()> {
        let mut conn = self.get_connection()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let current = Self::read_progress(&tx, project_id)?
            .ok_or_else(|| AppError::not_found(format!("Project {}", project_id)))?;
        ensure_progress_unchanged(project_id, &current, expected)?;
        Self::write_progress(&tx, project_id, progress, updated_at)?;

        tx.commit()?;
        Ok(())
    }

    fn commit_submission(&self, commit: &SubmissionCommit) -> AppResult<()> {
        let project_id = commit.answer.project_id.as_str();
        let mut conn = self.get_connection()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let current = Self::read_progress(&tx, project_id)?
            .ok_or_else(|| AppError::not_found(format!("Project {}", project_id)))?;
        ensure_progress_unchanged(project_id, &current, &commit.expected)?;

        let stored_attempts: u32 = tx
            .query_row(
                "SELECT attempt_count FROM recorded_answers
                 WHERE project_id = ?1 AND step_number = ?2",
                params![project_id, commit.answer.step_number],
                |row| row.get(0),
            )
            .optional()?
            .unwrap_or(0);
        ensure_attempts_unchanged(commit, stored_attempts)?;

        Self::write_answer(&tx, &commit.answer, &commit.updated_at)?;
        match &commit.progress {
            Some(progress) => Self::write_progress(&tx, project_id, progress, &commit.updated_at)?,
            None => Self::touch_project(&tx, project_id, &commit.updated_at)?,
        }

        tx.commit()?;
        Ok(())
    }

    fn save_document(&self, document: &RfpDocument) -> AppResult<()> {
        let content = serde_json::to_string(&document.content)?;
        let mut conn = self.get_connection()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let updated = tx.execute(
            "UPDATE projects SET completion_rate = ?2, updated_at = ?3 WHERE id = ?1",
            params![document.project_id, document.completion_rate, document.created_at],
        )?;
        if updated == 0 {
            return Err(AppError::not_found(format!("Project {}", document.project_id)));
        }

        tx.execute(
            "INSERT INTO rfp_documents (id, project_id, version, content, completion_rate,
                completion_level, minimum_requirements_met, mode, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                document.id,
                document.project_id,
                document.version,
                content,
                document.completion_rate,
                document.completion_level.as_str(),
                document.minimum_requirements_met,
                document.mode.as_str(),
                document.created_at,
            ],
        )?;

        tx.commit()?;
        Ok(())
    }

    fn latest_document(&self, project_id: &str) -> AppResult<Option<RfpDocument>> {
        let conn = self.get_connection()?;
        let sql = format!(
            "SELECT {} FROM rfp_documents WHERE project_id = ?1
             ORDER BY created_at DESC, rowid DESC LIMIT 1",
            DOCUMENT_COLUMNS
        );

        match conn.query_row(&sql, params![project_id], DocumentRow::from_row) {
            Ok(row) => Ok(Some(row.into_document()?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(AppError::Sqlite(e)),
        }
    }
}
