//! Deterministic plain-text rendering of a candidate record.
//!
//! The normalized text is both the embedding query and the only source the
//! model is allowed to quote evidence from, so section order and field
//! labels are fixed. Missing optional fields render as empty strings;
//! position descriptions keep their embedded newlines verbatim.

use crate::models::candidate::Candidate;

/// Renders a candidate into the `[EDU]/[EXP]/[SKILLS]/[SUMMARY]` text block.
/// Pure and total: any well-typed candidate normalizes without failure.
pub fn normalize(candidate: &Candidate) -> String {
    let mut lines: Vec<String> = Vec::new();

    for edu in &candidate.educations {
        lines.push(format!(
            "[EDU] {} ({} · {})",
            edu.school_name,
            edu.degree_name.as_deref().unwrap_or(""),
            edu.field_of_study.as_deref().unwrap_or(""),
        ));
    }

    for position in &candidate.positions {
        lines.push(format!(
            "[EXP]\n  회사(companyName): {}\n  직책(title): {}\n  기간(period): {}\n  지역(location): {}\n  설명(description): {}",
            position.company_name,
            position.title,
            position.start_end_date.render(),
            position.company_location,
            position.description,
        ));
    }

    if !candidate.skills.is_empty() {
        lines.push(format!("[SKILLS] {}", candidate.skills.join(", ")));
    }
    if let Some(summary) = candidate.summary.as_deref() {
        if !summary.is_empty() {
            lines.push(format!("[SUMMARY] {summary}"));
        }
    }

    lines.join("\n")
}

/// Company names scoping context retrieval: one per position, input order
/// and duplicates preserved.
pub fn extract_company_names(candidate: &Candidate) -> Vec<String> {
    candidate
        .positions
        .iter()
        .map(|p| p.company_name.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::candidate::{Education, Position, PositionPeriod, YearMonth};

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

    #[test]
    fn test_normalize_renders_expected_sections() {
        let text = normalize(&sample_candidate());

        assert!(text.contains("[EDU] 연세대학교 (학사 · 컴퓨터공학)"));
        assert!(text.contains("[EXP]"));
        assert!(text.contains("회사(companyName): 토스"));
        assert!(text.contains("직책(title): CTO"));
        assert!(text.contains("기간(period): 2016.03–현재"));
        assert!(text.contains("지역(location): 서울"));
        assert!(text.contains("[SKILLS] Go, Python"));
    }

    #[test]
    fn test_normalize_empty_candidate_has_no_section_markers() {
        let candidate = Candidate {
            first_name: "민수".to_string(),
            last_name: "박".to_string(),
            headline: None,
            summary: None,
            skills: vec![],
            website: vec![],
            educations: vec![],
            positions: vec![],
        };
        let text = normalize(&candidate);

        assert!(!text.contains("[EDU]"));
        assert!(!text.contains("[EXP]"));
        assert!(!text.contains("[SKILLS]"));
        assert!(!text.contains("[SUMMARY]"));
    }

    #[test]
    fn test_normalize_missing_optionals_render_empty() {
        let mut candidate = sample_candidate();
        candidate.educations[0].degree_name = None;
        candidate.educations[0].field_of_study = None;

        let text = normalize(&candidate);
        assert!(text.contains("[EDU] 연세대학교 ( · )"));
    }

    #[test]
    fn test_normalize_preserves_description_newlines() {
        let mut candidate = sample_candidate();
        candidate.positions[0].description = "결제 시스템 설계\n조직 리딩".to_string();

        let text = normalize(&candidate);
        assert!(text.contains("설명(description): 결제 시스템 설계\n조직 리딩"));
    }

    #[test]
    fn test_normalize_summary_only_when_non_empty() {
        let mut candidate = sample_candidate();
        candidate.summary = Some(String::new());
        assert!(!normalize(&candidate).contains("[SUMMARY]"));

        candidate.summary = Some("10년차 백엔드 엔지니어".to_string());
        assert!(normalize(&candidate).contains("[SUMMARY] 10년차 백엔드 엔지니어"));
    }

    #[test]
    fn test_company_names_match_positions_in_order() {
        let mut candidate = sample_candidate();
        candidate.positions.push(Position {
            title: "Backend Engineer".to_string(),
            company_name: "네이버".to_string(),
            description: "검색 인프라".to_string(),
            start_end_date: PositionPeriod {
                start: YearMonth {
                    year: 2012,
                    month: 1,
                },
                end: Some(YearMonth {
                    year: 2016,
                    month: 2,
                }),
            },
            company_location: "성남".to_string(),
        });
        let repeated = candidate.positions[0].clone();
        candidate.positions.push(repeated);

        let names = extract_company_names(&candidate);
        assert_eq!(names.len(), candidate.positions.len());
        assert_eq!(names, vec!["토스", "네이버", "토스"]);
    }
}
