//! Contact form endpoint.

use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
};
use std::sync::Arc;

use super::{ApiError, AppState, SubmitResponse};
use crate::domain::InquiryId;
use crate::models::inquiry::InquiryDraft;

pub const SUCCESS_MESSAGE: &str = "Message sent successfully!";

/// `POST /api/contact`
///
/// Validates and stores one inquiry. Returns the store-assigned id, which is
/// also attached to the response extensions for the request log.
pub async fn submit_contact(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<InquiryDraft>, JsonRejection>,
) -> Result<(Extension<InquiryId>, Json<SubmitResponse>), ApiError> {
    let verbose = state.environment().exposes_error_details();

    // A body that is not declared as JSON is read as an empty form, so the
    // caller is told which fields are missing.
    let draft = match payload {
        Ok(Json(draft)) => draft,
        Err(JsonRejection::MissingJsonContentType(_)) => InquiryDraft::default(),
        Err(rejection) => return Err(ApiError::malformed_body(&rejection, verbose)),
    };

    let id = state
        .inquiry_service
        .submit(&draft)
        .await
        .map_err(|err| ApiError::from_inquiry_error(err, &draft, verbose))?;

    let body = SubmitResponse {
        message: SUCCESS_MESSAGE.to_string(),
        id: id.to_string(),
    };

    Ok((Extension(id), Json(body)))
}
