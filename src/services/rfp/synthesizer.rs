//! RFP Synthesizer
//!
//! Drafts an RFP document from recorded answers. With a text-generation
//! provider the body is drafted by the model; if there is no provider, the
//! call fails, or the reply does not conform, the body is assembled
//! deterministically from the answers instead. Degradation is logged and
//! never surfaced as an error.

use std::collections::HashSet;

use chrono::Utc;
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use rfp_forge_core::{
    completion_rate, minimum_requirements_met, CompletionLevel, RecordedAnswer, StepRegistry,
    TrustLevel, SECTIONS,
};
use rfp_forge_llm::LlmProvider;

use crate::models::project::Project;
use crate::models::rfp::{GenerationMode, RfpContent, RfpDocument, RfpSection, RFP_VERSION};
use crate::services::generation::parse_generated;
use crate::services::interview::InterviewEngine;
use crate::utils::error::AppResult;

use super::mapping::{fallback_content, map_answers_to_sections, SectionMap};

/// Reply shape expected from the provider
#[derive(Debug, Deserialize)]
struct DraftReply {
    sections: Vec<RfpSection>,
    summary: String,
}

#[derive(Clone, Copy)]
pub struct RfpSynthesizer<'a> {
    registry: &'static StepRegistry,
    provider: Option<&'a dyn LlmProvider>,
}

impl<'a> RfpSynthesizer<'a> {
    pub fn new(registry: &'static StepRegistry, provider: Option<&'a dyn LlmProvider>) -> Self {
        Self { registry, provider }
    }

    /// Build a document for `project`. Never fails; the worst case is the fallback body.
    pub async fn synthesize(&self, project: &Project, answers: &[RecordedAnswer]) -> RfpDocument {
        let (content, mode) = match self.draft(project, answers).await {
            Some(content) => (content, GenerationMode::Generated),
            None => (
                fallback_content(self.registry, &project.name, answers),
                GenerationMode::Fallback,
            ),
        };
        build_document(project, content, mode)
    }

    async fn draft(&self, project: &Project, answers: &[RecordedAnswer]) -> Option<RfpContent> {
        let provider = self.provider?;
        let mapped = map_answers_to_sections(self.registry, answers);
        let prompt = build_draft_prompt(&project.name, &mapped);

        let reply = match provider.generate_text(&prompt).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(
                    project_id = %project.id,
                    provider = provider.name(),
                    error = %e,
                    "RFP drafting failed, using fallback"
                );
                return None;
            }
        };

        match parse_generated::<DraftReply>(&reply).and_then(conform) {
            Ok(content) => Some(content),
            Err(reason) => {
                warn!(
                    project_id = %project.id,
                    provider = provider.name(),
                    reason = %reason,
                    "RFP draft did not conform, using fallback"
                );
                None
            }
        }
    }
}

impl std::fmt::Debug for RfpSynthesizer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RfpSynthesizer")
            .field("provider", &self.provider.map(|p| p.name()))
            .finish()
    }
}

/// Accept a drafted body only if it covers known sections once each and has a summary
fn conform(reply: DraftReply) -> Result<RfpContent, String> {
    if reply.sections.is_empty() {
        return Err("draft has no sections".to_string());
    }
    if reply.summary.trim().is_empty() {
        return Err("draft has no summary".to_string());
    }

    let mut seen = HashSet::new();
    let mut sections = Vec::with_capacity(reply.sections.len());
    for mut section in reply.sections {
        let Some(known) = SECTIONS.iter().find(|s| s.id == section.id) else {
            return Err(format!("draft names unknown section '{}'", section.id));
        };
        if !seen.insert(known.id) {
            return Err(format!("draft repeats section '{}'", section.id));
        }
        section.name = known.name.to_string();
        sections.push(section);
    }

    Ok(RfpContent {
        sections,
        summary: reply.summary.trim().to_string(),
    })
}

fn build_document(project: &Project, content: RfpContent, mode: GenerationMode) -> RfpDocument {
    let rate = completion_rate(content.sections.iter().map(|s| s.trust_level));
    let trust_of = |id: &str| {
        content
            .sections
            .iter()
            .find(|s| s.id == id)
            .map(|s| s.trust_level)
            .unwrap_or(TrustLevel::Missing)
    };
    let minimum_met = minimum_requirements_met(trust_of);

    RfpDocument {
        id: Uuid::new_v4().to_string(),
        project_id: project.id.clone(),
        version: RFP_VERSION.to_string(),
        completion_rate: rate,
        completion_level: CompletionLevel::from_rate(rate),
        minimum_requirements_met: minimum_met,
        mode,
        created_at: Utc::now().to_rfc3339(),
        content,
    }
}

fn build_draft_prompt(project_name: &str, mapped: &SectionMap) -> String {
    let section_lines = SECTIONS
        .iter()
        .map(|section| match mapped.get(section.id) {
            Some(m) => format!(
                "- {} {} [{}, step {}]: {}",
                section.id,
                section.name,
                m.trust_level.as_str(),
                m.source_step,
                m.answer
                    .as_ref()
                    .map(|a| a.to_plain())
                    .unwrap_or_else(|| "(답변 대기)".to_string())
            ),
            None => format!("- {} {} [missing]: (없음)", section.id, section.name),
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "당신은 IT 외주 개발을 위한 RFP(제안요청서)를 작성하는 비즈니스 분석가입니다.\n\
         아래 인터뷰 답변을 바탕으로 '{name}' 프로젝트의 RFP를 작성하세요.\n\n\
         ## 섹션별 답변\n{lines}\n\n\
         ## 작성 규칙\n\
         - 답변이 있는 섹션은 그 내용을 문장으로 정리하고 trustLevel은 답변의 상태를 유지합니다.\n\
         - 답변에서 합리적으로 추론한 내용은 trustLevel을 \"inferred\"로 표시합니다.\n\
         - 근거가 없는 섹션은 content를 null, trustLevel을 \"missing\"으로 둡니다.\n\
         - 섹션 id는 위 목록에 있는 것만 한 번씩 사용합니다.\n\n\
         응답 형식 (JSON만 출력):\n\
         {{\"sections\": [{{\"id\": \"1.1.1\", \"name\": \"해결하려는 문제\", \"content\": \"...\", \
         \"trustLevel\": \"confirmed\", \"sourceStep\": 1}}], \"summary\": \"한 문단 요약\"}}",
        name = project_name,
        lines = section_lines
    )
}

/// Synthesize and store a document for a project, snapshotting its completion rate
pub async fn generate_rfp(
    engine: &InterviewEngine,
    provider: Option<&dyn LlmProvider>,
    project_id: &str,
) -> AppResult<RfpDocument> {
    let (project, answers) = engine.load_with_answers(project_id)?;
    let document = RfpSynthesizer::new(engine.registry(), provider)
        .synthesize(&project, &answers)
        .await;
    engine.store().save_document(&document)?;

    info!(
        project_id,
        document_id = %document.id,
        mode = document.mode.as_str(),
        completion_rate = document.completion_rate,
        "RFP generated"
    );
    Ok(document)
}

/// Newest stored document for an existing project
pub fn latest_rfp(engine: &InterviewEngine, project_id: &str) -> AppResult<Option<RfpDocument>> {
    engine.get_project(project_id)?;
    engine.store().latest_document(project_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use rfp_forge_core::Answer;
    use rfp_forge_llm::{LlmError, LlmRequestOptions, LlmResponse, LlmResult, Message, ProviderConfig, StopReason, UsageStats};
    use std::sync::Mutex;

    struct ScriptedProvider {
        config: ProviderConfig,
        replies: Mutex<Vec<LlmResult<String>>>,
    }

    impl ScriptedProvider {
        fn new(replies: Vec<LlmResult<String>>) -> Self {
            Self {
                config: ProviderConfig::default(),
                replies: Mutex::new(replies),
            }
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        fn name(&self) -> &'static str {
            "scripted"
        }

        fn model(&self) -> &str {
            "scripted-model"
        }

        fn config(&self) -> &ProviderConfig {
            &self.config
        }

        async fn send_message(
            &self,
            _messages: Vec<Message>,
            _system: Option<String>,
            _request_options: LlmRequestOptions,
        ) -> LlmResult<LlmResponse> {
            let next = self.replies.lock().unwrap().remove(0)?;
            Ok(LlmResponse {
                content: Some(next),
                stop_reason: StopReason::EndTurn,
                usage: UsageStats::default(),
                model: "scripted-model".to_string(),
            })
        }
    }

    fn project() -> Project {
        Project::new("p1", "직거래", "2026-01-01T00:00:00Z")
    }

    fn answers() -> Vec<RecordedAnswer> {
        vec![
            RecordedAnswer::confirmed("p1", 1, Answer::text("농부가 농산물을 판매하는 서비스"), 0),
            RecordedAnswer::confirmed("p1", 2, Answer::choices(["농부"]), 0),
        ]
    }

    #[tokio::test]
    async fn test_without_provider_uses_fallback() {
        let doc = RfpSynthesizer::new(StepRegistry::standard(), None)
            .synthesize(&project(), &answers())
            .await;

        assert_eq!(doc.mode, GenerationMode::Fallback);
        assert_eq!(doc.version, RFP_VERSION);
        assert_eq!(doc.content.sections.len(), SECTIONS.len());
        assert_eq!(doc.content.summary, "직거래 프로젝트의 RFP입니다.");
        // 2 of 21 confirmed
        assert_eq!(doc.completion_rate, 10);
        assert_eq!(doc.completion_level, CompletionLevel::Critical);
        assert!(!doc.minimum_requirements_met);
    }

    #[tokio::test]
    async fn test_generated_reply_is_used() {
        let reply = r#"```json
{"sections": [
  {"id": "1.1.1", "name": "x", "content": "농산물 유통 문제", "trustLevel": "confirmed", "sourceStep": 1},
  {"id": "1.2.1", "name": "x", "content": "농부와 소비자", "trustLevel": "inferred"}
], "summary": "직거래 플랫폼"}
```"#;
        let provider = ScriptedProvider::new(vec![Ok(reply.to_string())]);
        let doc = RfpSynthesizer::new(StepRegistry::standard(), Some(&provider))
            .synthesize(&project(), &answers())
            .await;

        assert_eq!(doc.mode, GenerationMode::Generated);
        assert_eq!(doc.content.sections.len(), 2);
        assert_eq!(doc.content.sections[0].name, "해결하려는 문제");
        assert_eq!(doc.content.summary, "직거래 플랫폼");
        // (1 + 0.5) / 2
        assert_eq!(doc.completion_rate, 75);
        assert_eq!(doc.completion_level, CompletionLevel::Medium);
    }

    #[tokio::test]
    async fn test_provider_error_falls_back() {
        let provider = ScriptedProvider::new(vec![Err(LlmError::NetworkError {
            message: "connection reset".to_string(),
        })]);
        let doc = RfpSynthesizer::new(StepRegistry::standard(), Some(&provider))
            .synthesize(&project(), &answers())
            .await;
        assert_eq!(doc.mode, GenerationMode::Fallback);
    }

    #[tokio::test]
    async fn test_nonconforming_replies_fall_back() {
        let replies = [
            "I cannot help with that.",
            r#"{"sections": [], "summary": "empty"}"#,
            r#"{"sections": [{"id": "9.9", "name": "?"}], "summary": "s"}"#,
            r#"{"sections": [{"id": "1.7", "name": "a"}, {"id": "1.7", "name": "b"}], "summary": "s"}"#,
        ];
        for reply in replies {
            let provider = ScriptedProvider::new(vec![Ok(reply.to_string())]);
            let doc = RfpSynthesizer::new(StepRegistry::standard(), Some(&provider))
                .synthesize(&project(), &answers())
                .await;
            assert_eq!(doc.mode, GenerationMode::Fallback, "reply: {}", reply);
        }
    }

    #[test]
    fn test_prompt_embeds_project_and_answers() {
        let mapped = map_answers_to_sections(StepRegistry::standard(), &answers());
        let prompt = build_draft_prompt("직거래", &mapped);
        assert!(prompt.contains("'직거래'"));
        assert!(prompt.contains("- 1.2.1 사용자 유형 [confirmed, step 2]: 농부"));
        assert!(prompt.contains("- 1.10 브랜딩 [missing]: (없음)"));
    }
}
