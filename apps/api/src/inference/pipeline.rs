//! Inference orchestration — sequences the pipeline and maps failures.
//!
//! Flow: normalize → retrieve context → placeholder substitution →
//! build prompt → chat completion → validate. One request runs end-to-end
//! on one task; the embedding and chat calls are sequential because the
//! chat call depends on the retrieved context.

use tracing::{debug, info};

use crate::errors::AppError;
use crate::inference::normalizer::{extract_company_names, normalize};
use crate::inference::prompts::build_prompt;
use crate::inference::retriever::ContextSource;
use crate::inference::validator::parse_result;
use crate::llm_client::ChatClient;
use crate::models::candidate::Candidate;
use crate::models::response::InferenceResult;

/// Substituted when retrieval matches nothing. An empty retrieval result is
/// a valid outcome, not a failure.
pub const NO_CONTEXT_PLACEHOLDER: &str = "(관련 맥락 없음)";

pub async fn run_inference(
    retriever: &dyn ContextSource,
    chat: &dyn ChatClient,
    candidate: &Candidate,
) -> Result<InferenceResult, AppError> {
    let text = normalize(candidate);
    let company_names = extract_company_names(candidate);
    debug!(
        "normalized candidate text ({} chars, {} companies)",
        text.len(),
        company_names.len()
    );

    let retrieved = retriever.retrieve(&text, &company_names).await?;
    info!("retrieved {} context snippets", retrieved.len());

    let contexts = if retrieved.is_empty() {
        vec![NO_CONTEXT_PLACEHOLDER.to_string()]
    } else {
        retrieved
    };
    // Invariant: the prompt always receives at least the placeholder.
    if contexts.is_empty() {
        return Err(AppError::NoContext(
            "유효한 컨텍스트를 찾지 못했습니다.".to_string(),
        ));
    }

    let prompt = build_prompt(candidate, &contexts);

    let raw = chat
        .complete(&prompt)
        .await
        .map_err(|e| AppError::Llm(format!("LLM 호출 실패: {e}")))?;

    parse_result(&raw)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::llm_client::LlmError;
    use crate::models::candidate::{Education, Position, PositionPeriod, YearMonth};

    struct StaticContexts(Vec<String>);

    #[async_trait]
    impl ContextSource for StaticContexts {
        async fn retrieve(
            &self,
            _text: &str,
            _company_names: &[String],
        ) -> Result<Vec<String>, AppError> {
            Ok(self.0.clone())
        }
    }

    struct UnavailableStore;

    #[async_trait]
    impl ContextSource for UnavailableStore {
        async fn retrieve(
            &self,
            _text: &str,
            _company_names: &[String],
        ) -> Result<Vec<String>, AppError> {
            Err(AppError::Cache("connection refused".to_string()))
        }
    }

    /// Records the prompt it was handed and replies with a canned string.
    struct RecordingChat {
        seen_prompt: Mutex<Option<String>>,
        reply: Result<String, ()>,
    }

    impl RecordingChat {
        fn replying(reply: &str) -> Self {
            Self {
                seen_prompt: Mutex::new(None),
                reply: Ok(reply.to_string()),
            }
        }

        fn failing() -> Self {
            Self {
                seen_prompt: Mutex::new(None),
                reply: Err(()),
            }
        }

        fn prompt(&self) -> String {
            self.seen_prompt.lock().unwrap().clone().unwrap()
        }
    }

    #[async_trait]
    impl ChatClient for RecordingChat {
        async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
            *self.seen_prompt.lock().unwrap() = Some(prompt.to_string());
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(()) => Err(LlmError::Api {
                    status: 500,
                    message: "upstream down".to_string(),
                }),
            }
        }
    }

    fn sample_candidate() -> Candidate {
        Candidate {
            first_name: "Junho".to_string(),
            last_name: "Kim".to_string(),
            headline: None,
            summary: None,
            skills: vec!["Go".to_string(), "Python".to_string()],
            website: vec![],
            educations: vec![Education {
                school_name: "연세대학교".to_string(),
                degree_name: Some("학사".to_string()),
                field_of_study: Some("컴퓨터공학".to_string()),
                start_end_date: None,
                description: None,
            }],
            positions: vec![Position {
                title: "CTO".to_string(),
                company_name: "토스".to_string(),
                description: "백엔드 조직 총괄".to_string(),
                start_end_date: PositionPeriod {
                    start: YearMonth {
                        year: 2016,
                        month: 3,
                    },
                    end: None,
                },
                company_location: "서울".to_string(),
            }],
        }
    }

    const VALID_REPLY: &str = r#"{"tags":[{"tag":"상위권대학교","evidence":"연세대학교"}]}"#;

    #[tokio::test]
    async fn test_empty_retrieval_substitutes_placeholder_and_proceeds() {
        let retriever = StaticContexts(vec![]);
        let chat = RecordingChat::replying(VALID_REPLY);

        let result = run_inference(&retriever, &chat, &sample_candidate())
            .await
            .unwrap();

        assert_eq!(result.tags.len(), 1);
        assert!(chat.prompt().contains(NO_CONTEXT_PLACEHOLDER));
    }

    #[tokio::test]
    async fn test_context_ordering_flows_into_prompt() {
        let retriever = StaticContexts(vec!["토스 요약".to_string(), "토스 뉴스".to_string()]);
        let chat = RecordingChat::replying(VALID_REPLY);

        run_inference(&retriever, &chat, &sample_candidate())
            .await
            .unwrap();

        let prompt = chat.prompt();
        assert!(prompt.contains("- 토스 요약\n- 토스 뉴스"));
    }

    #[tokio::test]
    async fn test_chat_failure_maps_to_llm_error() {
        let retriever = StaticContexts(vec!["토스 요약".to_string()]);
        let chat = RecordingChat::failing();

        let err = run_inference(&retriever, &chat, &sample_candidate())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Llm(_)));
    }

    #[tokio::test]
    async fn test_malformed_output_maps_to_schema_error() {
        let retriever = StaticContexts(vec!["토스 요약".to_string()]);
        let chat = RecordingChat::replying("not json");

        let err = run_inference(&retriever, &chat, &sample_candidate())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Schema(_)));
    }

    #[tokio::test]
    async fn test_retrieval_transport_failure_propagates() {
        let chat = RecordingChat::replying(VALID_REPLY);

        let err = run_inference(&UnavailableStore, &chat, &sample_candidate())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Cache(_)));
        assert!(chat.seen_prompt.lock().unwrap().is_none());
    }
}
