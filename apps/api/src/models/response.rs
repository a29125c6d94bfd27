use serde::{Deserialize, Serialize};

/// One extracted experience tag with its supporting quotation.
///
/// `tag` is drawn from the closed vocabulary the prompt enumerates;
/// `evidence` quotes the candidate's normalized text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExperienceTag {
    pub tag: String,
    pub evidence: String,
}

/// Final structured output of one inference request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InferenceResult {
    pub tags: Vec<ExperienceTag>,
}
