//! Shared test helpers

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use rfp_forge::commands::{self, SubmitAnswerRequest};
use rfp_forge::services::interview::SubmissionOutcome;
use rfp_forge::AppState;
use rfp_forge_core::Answer;
use rfp_forge_llm::{
    LlmError, LlmProvider, LlmRequestOptions, LlmResponse, LlmResult, Message, ProviderConfig,
    StopReason, UsageStats,
};

/// Provider that replays canned replies in order and records every prompt
pub struct ScriptedProvider {
    config: ProviderConfig,
    replies: Mutex<Vec<LlmResult<String>>>,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub fn new(replies: Vec<LlmResult<String>>) -> Self {
        Self {
            config: ProviderConfig::default(),
            replies: Mutex::new(replies),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompt_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
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
        messages: Vec<Message>,
        _system: Option<String>,
        _request_options: LlmRequestOptions,
    ) -> LlmResult<LlmResponse> {
        if let Some(message) = messages.last() {
            self.prompts.lock().unwrap().push(message.content.clone());
        }
        let mut replies = self.replies.lock().unwrap();
        if replies.is_empty() {
            return Err(LlmError::NetworkError {
                message: "script exhausted".to_string(),
            });
        }
        let content = replies.remove(0)?;
        Ok(LlmResponse {
            content: Some(content),
            stop_reason: StopReason::EndTurn,
            usage: UsageStats::default(),
            model: "scripted-model".to_string(),
        })
    }
}

pub fn state() -> AppState {
    AppState::in_memory().unwrap()
}

pub fn state_with(provider: Arc<ScriptedProvider>) -> AppState {
    state().with_provider(provider)
}

/// An answer every step accepts on the first try
pub fn good_answer(step: u32) -> Answer {
    match step {
        1 => Answer::text("농부가 농산물을 직접 판매하는 직거래 서비스"),
        2 => Answer::choices(["농부"]),
        3 => Answer::choices(["상품 등록", "주문 관리"]),
        4 => Answer::choices(["상품 등록"]),
        5 => Answer::text("유통 단계를 줄여 신선한 농산물을 받을 수 있습니다"),
        6 => Answer::choices(["모바일 웹"]),
        7 => Answer::choices(["마켓컬리"]),
        8 => Answer::choices(["산지 직송"]),
        9 => Answer::text("1년 안에 농가 500곳 입점"),
        10 => Answer::choices(["판매 수수료"]),
        11 => Answer::choices(["SNS", "지역 커뮤니티"]),
        12 => Answer::choices(["월 거래액"]),
        13 => Answer::choices(["농부가 직접 올린 상품이 팔린다"]),
        14 => Answer::choices(["결제", "배송 추적"]),
        15 => Answer::choices(["직접 입력"]),
        16 => Answer::choices(["서버", "결제 수수료"]),
        17 => Answer::choices(["전자상거래법"]),
        18 => Answer::text("시범 지역은 전라남도입니다"),
        19 => Answer::choices(["경쟁 서비스"]),
        _ => Answer::choices(["확정"]),
    }
}

pub async fn submit(state: &AppState, project_id: &str, step: u32, answer: Answer) -> SubmissionOutcome {
    let response = commands::submit_answer(
        state,
        SubmitAnswerRequest {
            project_id: project_id.to_string(),
            step_number: step,
            answer,
            custom_input: None,
        },
    )
    .await;
    assert!(response.success, "step {} failed: {:?}", step, response.error);
    response.data.unwrap()
}

/// Answer steps `from..=to`, resolving each checkpoint with `proceed`
pub async fn answer_range(state: &AppState, project_id: &str, from: u32, to: u32, proceed: bool) {
    for step in from..=to {
        let outcome = submit(state, project_id, step, good_answer(step)).await;
        if let SubmissionOutcome::AwaitingTransition { .. } = outcome {
            let response = commands::resolve_phase_transition(state, project_id.to_string(), proceed).await;
            assert!(response.success);
        }
    }
}
