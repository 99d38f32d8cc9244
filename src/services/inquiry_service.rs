//! Domain service for contact inquiries.
//!
//! Accepts a draft from the HTTP boundary, validates it and hands the result
//! to the injected [`InquiryStore`](crate::db::InquiryStore).

use crate::domain::InquiryId;
use crate::models::inquiry::{InquiryDraft, ValidationError};
use thiserror::Error;

/// Errors specific to inquiry submission.
#[derive(Debug, Error)]
pub enum InquiryError {
    /// Required fields were missing; nothing was written.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The store rejected or failed the write.
    #[error("Failed to persist inquiry: {0}")]
    Persistence(String),
}

impl From<anyhow::Error> for InquiryError {
    fn from(err: anyhow::Error) -> Self {
        Self::Persistence(format!("{err:#}"))
    }
}

/// Domain service trait for contact inquiries.
#[async_trait::async_trait]
pub trait InquiryService: Send + Sync {
    /// Validates `draft` and persists it as a new inquiry.
    ///
    /// Each call is independent: identical drafts submitted twice produce
    /// two records with distinct ids.
    ///
    /// # Errors
    ///
    /// Returns [`InquiryError::Validation`] if `name`, `email` or `message`
    /// is missing or blank. No write is attempted in that case.
    /// Returns [`InquiryError::Persistence`] if the store write fails.
    async fn submit(&self, draft: &InquiryDraft) -> Result<InquiryId, InquiryError>;
}
