//! Prompt assembly for the tag-extraction chat call.
//!
//! The prompt carries the whole content contract: the closed tag vocabulary,
//! the evidence-quotation rules, the duplicate-merge rule, the evidence
//! length limit, and the JSON-only output shape. Structure is re-checked by the validator;
//! semantic quality (quotation fidelity, deduplication) is trusted to the
//! model.

use crate::inference::normalizer::normalize;
use crate::models::candidate::Candidate;

/// The closed vocabulary of permissible experience tags.
pub const ALLOWED_TAGS: [&str; 8] = [
    "상위권대학교",
    "대규모 회사 경험",
    "성장기 스타트업 경험",
    "리더쉽",
    "대용량 데이터 처리 경험",
    "IPO",
    "M&A 경험",
    "신규 투자 유치 경험",
];

/// Maximum length of one evidence string, counted after translation.
pub const EVIDENCE_MAX_CHARS: usize = 60;

/// Rendered in place of the context block when no snippets were handed in.
const EMPTY_CONTEXT_FALLBACK: &str = "(관련 회사 정보 없음)";

/// Assembles the full instruction prompt. Pure function.
pub fn build_prompt(candidate: &Candidate, contexts: &[String]) -> String {
    let ctx_block = if contexts.is_empty() {
        EMPTY_CONTEXT_FALLBACK.to_string()
    } else {
        contexts
            .iter()
            .map(|c| format!("- {c}"))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let tag_list_block = ALLOWED_TAGS
        .iter()
        .map(|t| format!("- {t}"))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"당신은 HR 분석 전문가입니다. 아래 **지원자 전처리 텍스트**와 보조 **컨텍스트**(회사·뉴스)를 참고하여 '경험 tag–evidence'를 추출하십시오.

### 지원자 전처리 텍스트
{normalized}

### 컨텍스트 (회사/뉴스, 최근 180일)
{ctx_block}

**규칙**
1. 선택 가능한 태그는 아래 목록으로 한정됩니다. 목록에 없는 태그를 새로 만들지 마십시오.
{tag_list_block}

2. 리더쉽 태그의 evidence는 [EXP] 내 직책(title)을 기반으로 추론하여 활용하십시오.

3. **evidence 문장은 지원자 전처리 텍스트에 존재하는 내용을 그대로 인용**하십시오(필요시 동일 문장 일부만 잘라 사용).
   - 컨텍스트는 태그 판단 참고용이며, 인용 문장으로 쓰지 마십시오.

4. 동일 태그가 여러 번 나타나면 중복 태그를 작성하지 말고, 가장 강력한 1~2개 문장을 '; '로 연결해 하나의 evidence로 제시하십시오.

5. 각 evidence는 최대 {max_chars}자입니다(번역 시 포함). 영어 원문만 있으면 한국어로 번역 후 인용하십시오.

6. 최종 출력은 아래 JSON 형식 한 개만 반환하며, 불필요한 설명이나 주석을 포함하지 마십시오.

{{
  "tags": [
    {{ "tag": "상위권대학교", "evidence": "서울대학교 (석사·컴퓨터공학)" }}
  ]
}}"#,
        normalized = normalize(candidate),
        ctx_block = ctx_block,
        tag_list_block = tag_list_block,
        max_chars = EVIDENCE_MAX_CHARS,
    )
}
