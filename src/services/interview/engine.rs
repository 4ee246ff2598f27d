//! Interview Engine
//!
//! Owns per-project progress: which step is current, when a phase checkpoint
//! is waiting on a decision, and when the interview is complete. Every write
//! goes through `InterviewStore` as a compare-and-swap against the progress
//! read at the start of the call.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use rfp_forge_core::{
    round_percent, Answer, Phase, ProgressStatus, ProjectProgress, RecordedAnswer, StepRegistry,
};

use crate::models::project::{normalize_project_name, Project};
use crate::utils::error::{AppError, AppResult};

use super::store::{InterviewStore, SubmissionCommit};
use super::validator::{AnswerValidator, Rejection, ValidationOutcome};

/// Result of submitting an answer for the current step
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SubmissionOutcome {
    /// Sent back; the step stays current
    Rejected {
        rejection: Rejection,
        progress: ProjectProgress,
    },
    /// Accepted and moved on to the next step
    Advanced { progress: ProjectProgress },
    /// Accepted at a phase checkpoint; waiting for a proceed/stop decision
    AwaitingTransition {
        progress: ProjectProgress,
        prompt: Option<String>,
        #[serde(rename = "nextPhase")]
        next_phase: Option<Phase>,
    },
    /// Accepted the final step
    Completed { progress: ProjectProgress },
}

impl SubmissionOutcome {
    pub fn progress(&self) -> &ProjectProgress {
        match self {
            Self::Rejected { progress, .. }
            | Self::Advanced { progress }
            | Self::AwaitingTransition { progress, .. }
            | Self::Completed { progress } => progress,
        }
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseCompletion {
    pub phase: Phase,
    pub label: String,
    pub completed: u32,
    pub total: u32,
    pub percentage: u8,
}

/// Snapshot of how far a project has come
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewProgress {
    pub project_id: String,
    #[serde(flatten)]
    pub progress: ProjectProgress,
    pub completed_step_count: u32,
    pub total_steps: u32,
    pub percentage: u8,
    pub per_phase_completion: Vec<PhaseCompletion>,
    pub completed_steps: Vec<u32>,
}

/// The interview state machine
#[derive(Clone)]
pub struct InterviewEngine {
    store: Arc<dyn InterviewStore>,
    registry: &'static StepRegistry,
    validator: AnswerValidator,
}

impl InterviewEngine {
    pub fn new(store: Arc<dyn InterviewStore>, registry: &'static StepRegistry) -> Self {
        Self {
            store,
            registry,
            validator: AnswerValidator::new(registry),
        }
    }

    /// Engine over the built-in step registry
    pub fn standard(store: Arc<dyn InterviewStore>) -> Self {
        Self::new(store, StepRegistry::standard())
    }

    pub fn registry(&self) -> &'static StepRegistry {
        self.registry
    }

    pub fn store(&self) -> &Arc<dyn InterviewStore> {
        &self.store
    }

    // ========================================================================
    // Projects
    // ========================================================================

    pub fn create_project(&self, name: &str) -> AppResult<Project> {
        let name = normalize_project_name(name).map_err(AppError::invalid_input)?;
        let project = Project::new(Uuid::new_v4().to_string(), name, now());
        self.store.create_project(&project)?;
        info!(project_id = %project.id, name = %project.name, "project created");
        Ok(project)
    }

    /// Load a project or fail with `NotFound`
    pub fn get_project(&self, project_id: &str) -> AppResult<Project> {
        self.store
            .load_project(project_id)?
            .ok_or_else(|| AppError::not_found(format!("Project {}", project_id)))
    }

    pub fn list_projects(&self) -> AppResult<Vec<Project>> {
        self.store.list_projects()
    }

    pub fn rename_project(&self, project_id: &str, name: &str) -> AppResult<Project> {
        let name = normalize_project_name(name).map_err(AppError::invalid_input)?;
        if !self.store.rename_project(project_id, &name, &now())? {
            return Err(AppError::not_found(format!("Project {}", project_id)));
        }
        info!(project_id, name = %name, "project renamed");
        self.get_project(project_id)
    }

    pub fn delete_project(&self, project_id: &str) -> AppResult<()> {
        if !self.store.delete_project(project_id)? {
            return Err(AppError::not_found(format!("Project {}", project_id)));
        }
        info!(project_id, "project deleted");
        Ok(())
    }

    /// Recorded answers of an existing project, ordered by step
    pub fn recorded_answers(&self, project_id: &str) -> AppResult<Vec<RecordedAnswer>> {
        self.get_project(project_id)?;
        self.store.load_recorded_answers(project_id)
    }

    /// Project together with its recorded answers
    pub fn load_with_answers(&self, project_id: &str) -> AppResult<(Project, Vec<RecordedAnswer>)> {
        let project = self.get_project(project_id)?;
        let answers = self.store.load_recorded_answers(project_id)?;
        Ok((project, answers))
    }

    // ========================================================================
    // State machine
    // ========================================================================

    /// Submit an answer for the project's current step.
    ///
    /// `supplement` is free text appended to a choice answer on steps that
    /// allow it; it may stand in for an empty selection.
    pub fn submit_answer(
        &self,
        project_id: &str,
        step_number: u32,
        answer: Answer,
        supplement: Option<&str>,
    ) -> AppResult<SubmissionOutcome> {
        let step = *self.registry.step_definition(step_number)?;
        let project = self.get_project(project_id)?;
        let expected = project.progress.clone();

        if expected.status == ProgressStatus::Completed {
            return Err(AppError::invalid_input(format!(
                "Interview for project {} is already completed",
                project_id
            )));
        }
        if expected.awaiting_transition {
            return Err(AppError::invalid_input(
                "A phase transition decision is pending",
            ));
        }
        if step_number != expected.current_step {
            return Err(AppError::invalid_input(format!(
                "Step {} is not the current step (current: {})",
                step_number, expected.current_step
            )));
        }

        let supplement = supplement.map(str::trim).filter(|s| !s.is_empty());
        let (checked, recorded) = match supplement {
            Some(_) if !step.allows_freeform_supplement => {
                return Err(AppError::invalid_input(format!(
                    "Step {} does not accept a free-form supplement",
                    step_number
                )));
            }
            Some(extra) => {
                let checked = if answer.is_blank() {
                    Answer::text(extra)
                } else {
                    answer.clone()
                };
                (checked, with_supplement(&answer, extra))
            }
            None => (answer.clone(), answer),
        };

        let attempt_count = self
            .store
            .load_recorded_answers(project_id)?
            .into_iter()
            .find(|a| a.step_number == step_number)
            .map(|a| a.attempt_count)
            .unwrap_or(0);

        let updated_at = now();
        match self.validator.validate(step_number, &checked, attempt_count)? {
            ValidationOutcome::Rejected(rejection) => {
                self.store.commit_submission(&SubmissionCommit {
                    answer: RecordedAnswer::pending(project_id, step_number, attempt_count + 1),
                    expected_attempts: attempt_count,
                    expected: expected.clone(),
                    progress: None,
                    updated_at,
                })?;
                Ok(SubmissionOutcome::Rejected {
                    rejection,
                    progress: expected,
                })
            }
            ValidationOutcome::Accepted => {
                let next = self.progress_after_acceptance(&expected)?;
                self.store.commit_submission(&SubmissionCommit {
                    answer: RecordedAnswer::confirmed(project_id, step_number, recorded, attempt_count),
                    expected_attempts: attempt_count,
                    expected,
                    progress: Some(next.clone()),
                    updated_at,
                })?;
                debug!(
                    project_id,
                    step = step_number,
                    next_step = next.current_step,
                    awaiting_transition = next.awaiting_transition,
                    "answer accepted"
                );
                Ok(self.describe_acceptance(next))
            }
        }
    }

    fn progress_after_acceptance(&self, current: &ProjectProgress) -> AppResult<ProjectProgress> {
        let step = current.current_step;

        if self.registry.is_final_step(step) {
            return Ok(ProjectProgress {
                status: ProgressStatus::Completed,
                ..current.clone()
            });
        }
        if self.registry.is_phase_checkpoint(step) {
            return Ok(ProjectProgress {
                status: ProgressStatus::InProgress,
                awaiting_transition: true,
                ..current.clone()
            });
        }

        let next_step = step + 1;
        let next_phase = self
            .registry
            .phase_of(next_step)
            .ok_or_else(|| AppError::internal(format!("Step {} has no phase", next_step)))?;
        Ok(ProjectProgress {
            current_phase: next_phase,
            current_step: next_step,
            status: ProgressStatus::InProgress,
            awaiting_transition: false,
        })
    }

    fn describe_acceptance(&self, progress: ProjectProgress) -> SubmissionOutcome {
        if progress.status == ProgressStatus::Completed {
            info!(step = progress.current_step, "interview completed");
            return SubmissionOutcome::Completed { progress };
        }
        if progress.awaiting_transition {
            let phase = progress.current_phase;
            return SubmissionOutcome::AwaitingTransition {
                prompt: phase.transition_prompt().map(str::to_string),
                next_phase: self.registry.next_phase(phase),
                progress,
            };
        }
        SubmissionOutcome::Advanced { progress }
    }

    /// Resolve a pending phase checkpoint.
    ///
    /// Proceeding moves to the next phase unless that phase is terminal.
    /// Declining, or running out of non-terminal phases, lands on the first
    /// step of the terminal phase.
    pub fn resolve_phase_transition(
        &self,
        project_id: &str,
        proceed: bool,
    ) -> AppResult<ProjectProgress> {
        let project = self.get_project(project_id)?;
        let expected = project.progress;
        if !expected.awaiting_transition {
            return Err(AppError::invalid_input(format!(
                "Project {} is not awaiting a phase transition",
                project_id
            )));
        }

        let terminal = self.registry.terminal_phase();
        let target = match self.registry.next_phase(expected.current_phase) {
            Some(next) if proceed && next != terminal => next,
            _ => terminal,
        };
        let first_step = self
            .registry
            .first_step_of(target)
            .ok_or_else(|| AppError::internal(format!("Phase {} has no steps", target)))?;

        let progress = ProjectProgress {
            current_phase: target,
            current_step: first_step,
            status: ProgressStatus::InProgress,
            awaiting_transition: false,
        };
        self.store
            .save_project_progress(project_id, &expected, &progress, &now())?;

        debug!(
            project_id,
            proceed,
            from = %expected.current_phase,
            to = %target,
            step = first_step,
            "phase transition resolved"
        );
        Ok(progress)
    }

    pub fn get_progress(&self, project_id: &str) -> AppResult<InterviewProgress> {
        let (project, answers) = self.load_with_answers(project_id)?;

        let completed_steps: Vec<u32> = answers
            .iter()
            .filter(|a| a.trust_level.is_filled() && self.registry.get(a.step_number).is_some())
            .map(|a| a.step_number)
            .collect();

        let per_phase_completion = self
            .registry
            .phases()
            .iter()
            .map(|span| {
                let completed = completed_steps.iter().filter(|s| span.contains(**s)).count() as u32;
                let total = span.step_count();
                PhaseCompletion {
                    phase: span.phase,
                    label: span.phase.label().to_string(),
                    completed,
                    total,
                    percentage: round_percent(u64::from(completed), u64::from(total)),
                }
            })
            .collect();

        let completed_step_count = completed_steps.len() as u32;
        let total_steps = self.registry.step_count();

        Ok(InterviewProgress {
            project_id: project.id,
            progress: project.progress,
            completed_step_count,
            total_steps,
            percentage: round_percent(u64::from(completed_step_count), u64::from(total_steps)),
            per_phase_completion,
            completed_steps,
        })
    }
}

impl std::fmt::Debug for InterviewEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterviewEngine")
            .field("steps", &self.registry.step_count())
            .finish_non_exhaustive()
    }
}

fn now() -> String {
    Utc::now().to_rfc3339()
}

/// Append a free-form entry to the selected options
fn with_supplement(answer: &Answer, extra: &str) -> Answer {
    let mut items: Vec<String> = answer.selected().into_iter().map(str::to_string).collect();
    items.push(extra.to_string());
    Answer::Choices(items)
}
