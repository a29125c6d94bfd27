use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};

use crate::errors::AppError;
use crate::inference::pipeline::run_inference;
use crate::models::candidate::Candidate;
use crate::models::response::InferenceResult;

/// POST /api/v1/infer
pub async fn handle_infer(
    State(state): State<crate::state::AppState>,
    payload: Result<Json<Candidate>, JsonRejection>,
) -> Result<Json<InferenceResult>, AppError> {
    let Json(candidate) = payload.map_err(|e| AppError::Validation(e.body_text()))?;
    let result = run_inference(state.retriever.as_ref(), &state.llm, &candidate).await?;
    Ok(Json(result))
}
