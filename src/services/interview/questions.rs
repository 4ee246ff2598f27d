//! Question Generation
//!
//! Phrases the question for a project's current step. A configured provider
//! drafts it from the step and the answers so far; otherwise, or when the
//! draft is unusable, the fixed per-step catalogue is used. Step 19 always
//! lists the open gaps in the current answers as its options.

use serde::{Deserialize, Serialize};
use tracing::warn;

use rfp_forge_core::{
    GapPriority, Phase, ProgressStatus, QuestionKind, RecordedAnswer, StepDefinition,
    StepRegistry, TrustLevel,
};
use rfp_forge_llm::LlmProvider;

use crate::models::project::Project;
use crate::services::generation::parse_generated;
use crate::services::rfp::mapping::{map_answers_to_sections, trust_of};
use crate::utils::error::{AppError, AppResult};

use super::engine::InterviewEngine;

/// Step whose options are the gaps left in the answers
pub const GAP_DETECTION_STEP: u32 = 19;

const EMPTY_CONTEXT: &str = "(아직 없음)";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionOption {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Default status for multi-choice-with-status options
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionSource {
    Generated,
    Catalogue,
}

/// The question to put to the interviewee for one step
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub step_number: u32,
    pub step_name: String,
    pub phase: Phase,
    pub phase_label: String,
    pub text: String,
    pub options: Vec<QuestionOption>,
    pub hint: Option<String>,
    pub question_kind: QuestionKind,
    pub allows_freeform_supplement: bool,
    pub source: QuestionSource,
}

#[derive(Debug, Deserialize)]
struct GeneratedQuestion {
    text: String,
    #[serde(default)]
    options: Vec<QuestionOption>,
    #[serde(default)]
    hint: Option<String>,
}

struct OptionSeed {
    id: &'static str,
    label: &'static str,
    hint: Option<&'static str>,
    status: Option<&'static str>,
}

const fn opt(id: &'static str, label: &'static str) -> OptionSeed {
    OptionSeed {
        id,
        label,
        hint: None,
        status: None,
    }
}

const fn opt_hint(id: &'static str, label: &'static str, hint: &'static str) -> OptionSeed {
    OptionSeed {
        id,
        label,
        hint: Some(hint),
        status: None,
    }
}

const fn opt_status(id: &'static str, label: &'static str, status: &'static str) -> OptionSeed {
    OptionSeed {
        id,
        label,
        hint: None,
        status: Some(status),
    }
}

struct CatalogueEntry {
    text: &'static str,
    hint: Option<&'static str>,
    options: &'static [OptionSeed],
}

const UNDECIDED: OptionSeed = opt("undecided", "아직 정하지 않았어요");

/// Fixed question per step, indexed by step number - 1
static CATALOGUE: [CatalogueEntry; 20] = [
    // 1
    CatalogueEntry {
        text: "어떤 서비스를 만들고 싶으신가요?",
        hint: Some("누가 사용하고, 무엇을 하는 서비스인지 알려주세요."),
        options: &[],
    },
    // 2
    CatalogueEntry {
        text: "이 서비스를 사용해야 하는 사람은 누구인가요?",
        hint: None,
        options: &[
            opt_hint("single", "한 부류의 사람들이 각자 이용합니다", "예: 메모앱 사용자"),
            opt_hint("multi", "서로 다른 역할을 가진 사람들이 연결됩니다", "예: 판매자-구매자"),
            opt("unknown", "잘 모르겠어요"),
        ],
    },
    // 3
    CatalogueEntry {
        text: "이 서비스에서 어떤 동작들이 필요한가요?",
        hint: Some("각 기능에 대해 [필수/나중에/불필요/미정] 상태를 선택해주세요."),
        options: &[
            opt_status("signup", "회원가입/로그인", "required"),
            opt_status("profile", "프로필 관리", "required"),
            opt_status("search", "검색", "required"),
            opt_status("notification", "알림", "later"),
            opt_status("settings", "설정", "later"),
        ],
    },
    // 4
    CatalogueEntry {
        text: "이 동작들 중 가장 핵심이 되는 하나는 무엇인가요?",
        hint: Some("이 기능이 없으면 서비스가 성립하지 않는 것을 선택하세요."),
        options: &[],
    },
    // 5
    CatalogueEntry {
        text: "고객들이 이 서비스를 이용해야 하는 이유는 무엇인가요?",
        hint: Some("가격 외의 이유를 생각해보세요. 고객이 얻는 결과에 초점을 맞춰주세요."),
        options: &[],
    },
    // 6
    CatalogueEntry {
        text: "이 서비스의 실행 환경은 어디인가요?",
        hint: None,
        options: &[
            opt("web", "웹 (PC/모바일 브라우저)"),
            opt("app", "모바일 앱 (iOS/Android)"),
            opt("both", "둘 다 (웹 + 앱)"),
            UNDECIDED,
        ],
    },
    // 7
    CatalogueEntry {
        text: "비슷한 서비스를 알고 계신가요?",
        hint: Some("알고 있는 경쟁 서비스가 있다면 직접 입력해주세요."),
        options: &[
            opt("yes", "네, 알고 있어요"),
            opt("none", "경쟁 서비스가 없어요"),
            opt("unknown", "잘 모르겠어요"),
        ],
    },
    // 8
    CatalogueEntry {
        text: "경쟁 서비스들 대신 이 서비스를 사용해야 하는 이유는 무엇인가요?",
        hint: Some("경쟁사의 약점이나 이 서비스만의 강점을 생각해보세요."),
        options: &[
            opt("speed", "더 빠릅니다"),
            opt("quality", "품질이 더 좋습니다"),
            opt("experience", "사용하기 더 편합니다"),
            opt("niche", "특정 고객에게 특화되어 있습니다"),
        ],
    },
    // 9
    CatalogueEntry {
        text: "사용자는 이 서비스를 통해 최종적으로 어떤 상태가 되길 바라나요?",
        hint: Some("행위가 아닌 결과/상태로 표현해주세요. 예: \"시간을 절약한다\" → \"여유로운 일상\""),
        options: &[],
    },
    // 10
    CatalogueEntry {
        text: "이 서비스의 수익 모델은 어떻게 되나요?",
        hint: None,
        options: &[
            opt("subscription", "구독 (월/연 정기 결제)"),
            opt("per-use", "건당 결제 (사용할 때마다)"),
            opt("commission", "수수료 (거래 시 일정 비율)"),
            opt("ad", "광고"),
            opt("free", "무료 (수익화 계획 없음)"),
            UNDECIDED,
        ],
    },
    // 11
    CatalogueEntry {
        text: "고객이 이 서비스를 처음 알게 되는 곳은 어디일까요?",
        hint: None,
        options: &[
            opt("search", "검색 (구글, 네이버에서 검색해서)"),
            opt("sns", "SNS (인스타, 유튜브, 틱톡 등)"),
            opt("referral", "지인 추천 (입소문, 공유)"),
            opt("ad", "광고 (온라인/오프라인)"),
            UNDECIDED,
        ],
    },
    // 12
    CatalogueEntry {
        text: "이 서비스가 잘 되고 있다는 걸 어떻게 알 수 있을까요?",
        hint: Some("측정 가능한 숫자로 생각해보세요."),
        options: &[
            opt("users", "활성 사용자 수 (DAU/MAU)"),
            opt("revenue", "거래액/매출"),
            opt("retention", "재방문율/재구매율"),
            opt("conversion", "전환율"),
            opt("undecided", "아직 모르겠어요"),
        ],
    },
    // 13
    CatalogueEntry {
        text: "첫 버전으로 확인하고 싶은 게 뭔가요?",
        hint: None,
        options: &[
            opt("problem", "사람들이 진짜 이 문제를 겪는지 (문제 검증)"),
            opt("solution", "이 방식으로 해결이 되는지 (솔루션 검증)"),
            opt("payment", "돈을 낼 의향이 있는지 (지불 의향 검증)"),
            opt("retention", "계속 쓸 의향이 있는지 (리텐션 검증)"),
            UNDECIDED,
        ],
    },
    // 14
    CatalogueEntry {
        text: "이 서비스에서 외부 연동이 필요한 부분이 있나요?",
        hint: None,
        options: &[
            opt("payment", "결제 (카드, 간편결제)"),
            opt("login", "로그인 (소셜 로그인)"),
            opt("notification", "알림 (푸시, 문자, 이메일)"),
            opt("map", "지도/위치"),
            opt("storage", "파일 저장 (이미지, 동영상)"),
            UNDECIDED,
        ],
    },
    // 15
    CatalogueEntry {
        text: "서비스 시작할 때 미리 준비해야 하는 데이터가 있나요?",
        hint: None,
        options: &[
            opt("yes", "네, 있어요"),
            opt("no", "아니요, 사용자가 직접 채워요"),
            opt("unknown", "아직 모르겠어요"),
        ],
    },
    // 16
    CatalogueEntry {
        text: "이 서비스를 운영하면서 발생할 비용은 어떤 게 있을까요?",
        hint: None,
        options: &[
            opt("server", "서버/호스팅"),
            opt("appstore", "앱스토어 수수료"),
            opt("pg", "PG 수수료"),
            opt("storage", "스토리지 비용"),
            opt("api", "외부 API 비용"),
            opt("undecided", "아직 고려하지 않았어요"),
        ],
    },
    // 17
    CatalogueEntry {
        text: "이 서비스와 관련된 법적 규제나 인허가가 있을까요?",
        hint: None,
        options: &[
            opt("yes", "네, 있어요"),
            opt("no", "아니요, 해당 없어요"),
            opt("unknown", "잘 모르겠어요"),
        ],
    },
    // 18
    CatalogueEntry {
        text: "그 외에 이 서비스를 이해하는데 필요한 내용이 있나요?",
        hint: Some("참고 서비스, 제약 조건, 확장 계획 등 자유롭게 적어주세요."),
        options: &[],
    },
    // 19
    CatalogueEntry {
        text: "지금까지 정리한 내용 중 추가로 확인이 필요한 부분이 있어요.",
        hint: Some("아직 비어 있는 항목입니다. 지금 정할 수 있는 것을 골라주세요."),
        options: &[],
    },
    // 20
    CatalogueEntry {
        text: "지금까지 정리한 RFP를 확정할까요?",
        hint: None,
        options: &[
            opt("confirm", "네, 확정합니다"),
            opt("edit", "수정하고 싶은 부분이 있어요"),
            opt("later", "나중에 다시 할게요"),
        ],
    },
];

const UNKNOWN_STEP_TEXT: &str = "다음 질문입니다.";

fn owned_options(seeds: &[OptionSeed]) -> Vec<QuestionOption> {
    seeds
        .iter()
        .map(|seed| QuestionOption {
            id: seed.id.to_string(),
            label: seed.label.to_string(),
            hint: seed.hint.map(str::to_string),
            status: seed.status.map(str::to_string),
        })
        .collect()
}

/// Options for the gap-detection step: sections still lacking an answer
pub fn gap_options(registry: &StepRegistry, answers: &[RecordedAnswer]) -> Vec<QuestionOption> {
    let map = map_answers_to_sections(registry, answers);
    rfp_forge_core::gap_priorities(|id| trust_of(&map, id))
        .into_iter()
        .map(|gap| QuestionOption {
            id: gap.section_id.to_string(),
            label: gap.name.to_string(),
            hint: Some(
                match gap.priority {
                    GapPriority::P0 => "필수 확인",
                    GapPriority::P1 => "권장 확인",
                }
                .to_string(),
            ),
            status: None,
        })
        .collect()
}

/// The catalogue question for a step
pub fn catalogue_question(
    registry: &StepRegistry,
    step: &StepDefinition,
    answers: &[RecordedAnswer],
) -> Question {
    let entry = step
        .number
        .checked_sub(1)
        .and_then(|index| CATALOGUE.get(index as usize));
    let options = match entry {
        _ if step.number == GAP_DETECTION_STEP => gap_options(registry, answers),
        Some(entry) => owned_options(entry.options),
        None => Vec::new(),
    };

    Question {
        step_number: step.number,
        step_name: step.name.to_string(),
        phase: step.phase,
        phase_label: step.phase.label().to_string(),
        text: entry.map_or(UNKNOWN_STEP_TEXT, |e| e.text).to_string(),
        options,
        hint: entry.and_then(|e| e.hint).map(str::to_string),
        question_kind: step.question_kind,
        allows_freeform_supplement: step.allows_freeform_supplement,
        source: QuestionSource::Catalogue,
    }
}

/// `- name: answer` lines for confirmed answers, in step order
pub fn build_context(registry: &StepRegistry, answers: &[RecordedAnswer]) -> String {
    let mut confirmed: Vec<&RecordedAnswer> = answers
        .iter()
        .filter(|a| a.trust_level == TrustLevel::Confirmed)
        .collect();
    confirmed.sort_by_key(|a| a.step_number);

    let lines: Vec<String> = confirmed
        .iter()
        .filter_map(|a| {
            let raw = a.raw_answer.as_ref()?;
            let name = registry
                .get(a.step_number)
                .map(|s| s.name.to_string())
                .unwrap_or_else(|| a.step_number.to_string());
            Some(format!("- {}: {}", name, raw.to_plain()))
        })
        .collect();

    if lines.is_empty() {
        EMPTY_CONTEXT.to_string()
    } else {
        lines.join("\n")
    }
}

fn build_question_prompt(project: &Project, step: &StepDefinition, context: &str) -> String {
    format!(
        "당신은 비즈니스 컨설턴트로서 사용자가 만들고 싶은 서비스에 대해 인터뷰를 진행합니다.\n\n\
         ## 원칙\n\
         - 질문은 정보 수집보다 사고를 촉발하기 위한 것입니다.\n\
         - 사용자가 결정할 수 있는 것만 묻습니다.\n\
         - 예/아니오 대신 고를 수 있는 선택지를 제안합니다.\n\n\
         ## 현재 컨텍스트\n\
         프로젝트: {project}\n\
         단계: {number}번 - {name}\n\
         Phase: {phase}\n\n\
         ## 이전 답변\n{context}\n\n\
         ## 요청\n\
         {number}번 단계({name})에 맞는 질문을 하나 만드세요. 질문 타입: {kind}\n\n\
         응답 형식 (JSON만 출력):\n\
         {{\"text\": \"질문 내용\", \"options\": [{{\"id\": \"1\", \"label\": \"옵션\", \"hint\": \"힌트\"}}], \
         \"hint\": \"보조 설명\"}}",
        project = project.name,
        number = step.number,
        name = step.name,
        phase = step.phase.label(),
        context = context,
        kind = question_kind_name(step.question_kind),
    )
}

fn question_kind_name(kind: QuestionKind) -> &'static str {
    match kind {
        QuestionKind::FreeText => "free_text",
        QuestionKind::SingleChoice => "single_select",
        QuestionKind::MultiChoice => "multi_select",
        QuestionKind::MultiChoiceWithStatus => "multi_select_with_status",
    }
}

/// Question for a step, drafted by `provider` when one is given
pub async fn question_for_step(
    registry: &StepRegistry,
    provider: Option<&dyn LlmProvider>,
    project: &Project,
    step: &StepDefinition,
    answers: &[RecordedAnswer],
) -> Question {
    let fallback = catalogue_question(registry, step, answers);
    let Some(provider) = provider else {
        return fallback;
    };

    let prompt = build_question_prompt(project, step, &build_context(registry, answers));
    let drafted = match provider.generate_text(&prompt).await {
        Ok(reply) => parse_generated::<GeneratedQuestion>(&reply),
        Err(e) => Err(e.to_string()),
    };

    match drafted {
        Ok(generated) if !generated.text.trim().is_empty() => {
            // keep catalogue or gap options when the draft offers none
            let options = if generated.options.is_empty() || step.number == GAP_DETECTION_STEP {
                fallback.options
            } else {
                generated.options
            };
            Question {
                text: generated.text.trim().to_string(),
                options,
                hint: generated.hint.or(fallback.hint),
                source: QuestionSource::Generated,
                ..fallback
            }
        }
        Ok(_) => {
            warn!(step = step.number, "generated question was blank, using catalogue");
            fallback
        }
        Err(reason) => {
            warn!(
                step = step.number,
                provider = provider.name(),
                reason = %reason,
                "question generation failed, using catalogue"
            );
            fallback
        }
    }
}

/// Question for the project's current step
pub async fn next_question(
    engine: &InterviewEngine,
    provider: Option<&dyn LlmProvider>,
    project_id: &str,
) -> AppResult<Question> {
    let (project, answers) = engine.load_with_answers(project_id)?;
    let progress = &project.progress;

    if progress.status == ProgressStatus::Completed {
        return Err(AppError::invalid_input(format!(
            "Interview for project {} is already completed",
            project_id
        )));
    }
    if progress.awaiting_transition {
        return Err(AppError::invalid_input(
            "A phase transition decision is pending",
        ));
    }

    let registry = engine.registry();
    let step = registry.step_definition(progress.current_step)?;
    Ok(question_for_step(registry, provider, &project, step, &answers).await)
}
