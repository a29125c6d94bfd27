use serde::{Deserialize, Serialize};

/// The resume-like input record being classified.
///
/// Wire format is camelCase (`firstName`, `companyLocation`, ...) to match
/// the profile exports this service ingests. Immutable for the duration of
/// one inference request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub first_name: String,
    pub last_name: String,
    /// Profile headline, e.g. from LinkedIn.
    #[serde(default)]
    pub headline: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    /// Personal website / blog URLs.
    #[serde(default)]
    pub website: Vec<String>,
    #[serde(default)]
    pub educations: Vec<Education>,
    #[serde(default)]
    pub positions: Vec<Position>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    pub school_name: String,
    #[serde(default)]
    pub degree_name: Option<String>,
    #[serde(default)]
    pub field_of_study: Option<String>,
    /// Free-form period descriptor, e.g. "2012 - 2016".
    #[serde(default)]
    pub start_end_date: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub title: String,
    pub company_name: String,
    /// Free text, may contain embedded newlines.
    pub description: String,
    pub start_end_date: PositionPeriod,
    pub company_location: String,
}

/// Employment period. An absent `end` means the position is current.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionPeriod {
    pub start: YearMonth,
    #[serde(default)]
    pub end: Option<YearMonth>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    /// `YYYY.MM` with a zero-padded month.
    pub fn render(&self) -> String {
        format!("{}.{:02}", self.year, self.month)
    }
}

impl PositionPeriod {
    /// `YYYY.MM–YYYY.MM`, or `YYYY.MM–현재` for an open-ended position.
    pub fn render(&self) -> String {
        let start = self.start.render();
        let end = self
            .end
            .as_ref()
            .map(YearMonth::render)
            .unwrap_or_else(|| "현재".to_string());
        format!("{start}–{end}")
    }
}
