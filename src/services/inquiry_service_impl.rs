//! Store-backed implementation of the `InquiryService` trait.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::db::InquiryStore;
use crate::domain::InquiryId;
use crate::models::inquiry::InquiryDraft;
use crate::services::inquiry_service::{InquiryError, InquiryService};

pub struct DefaultInquiryService {
    store: Arc<dyn InquiryStore>,
}

impl DefaultInquiryService {
    #[must_use]
    pub fn new(store: Arc<dyn InquiryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl InquiryService for DefaultInquiryService {
    async fn submit(&self, draft: &InquiryDraft) -> Result<InquiryId, InquiryError> {
        let inquiry = match draft.validate(Utc::now()) {
            Ok(inquiry) => inquiry,
            Err(err) => {
                metrics::counter!("inquiry_validation_failures_total").increment(1);
                warn!(missing = %err, "Rejected inquiry");
                return Err(err.into());
            }
        };

        match self.store.insert_inquiry(inquiry).await {
            Ok(id) => {
                metrics::counter!("inquiries_submitted_total").increment(1);
                info!(inquiry_id = %id, "Inquiry stored");
                Ok(id)
            }
            Err(err) => {
                metrics::counter!("inquiry_persistence_failures_total").increment(1);
                error!(error = %format!("{err:#}"), "Failed to store inquiry");
                Err(err.into())
            }
        }
    }
}
