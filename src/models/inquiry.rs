use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::domain::InquiryId;

/// Contact form payload as received from an untrusted caller.
///
/// Every field is optional here; presence is enforced by [`InquiryDraft::validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InquiryDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RequiredField {
    Name,
    Email,
    Message,
}

impl RequiredField {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Message => "message",
        }
    }
}

impl fmt::Display for RequiredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A draft was rejected before any persistence attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("missing required fields: {}", join_fields(.missing))]
pub struct ValidationError {
    /// Fields that were absent or blank, in form order.
    pub missing: Vec<RequiredField>,
}

fn join_fields(fields: &[RequiredField]) -> String {
    fields
        .iter()
        .map(|f| f.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// A validated inquiry waiting to be written. Values are already trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInquiry {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
    pub submitted_at: DateTime<Utc>,
}

/// A persisted inquiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Inquiry {
    pub id: InquiryId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
    pub submitted_at: DateTime<Utc>,
}

impl Inquiry {
    #[must_use]
    pub fn from_new(id: InquiryId, new: NewInquiry) -> Self {
        Self {
            id,
            name: new.name,
            email: new.email,
            phone: new.phone,
            message: new.message,
            submitted_at: new.submitted_at,
        }
    }
}

fn trimmed(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl InquiryDraft {
    /// Checks required fields and produces a trimmed [`NewInquiry`].
    ///
    /// `name`, `email` and `message` must be non-empty after trimming. A
    /// missing `phone` becomes the empty string. All missing fields are
    /// reported at once.
    pub fn validate(&self, submitted_at: DateTime<Utc>) -> Result<NewInquiry, ValidationError> {
        let name = trimmed(self.name.as_ref());
        let email = trimmed(self.email.as_ref());
        let message = trimmed(self.message.as_ref());

        match (name, email, message) {
            (Some(name), Some(email), Some(message)) => Ok(NewInquiry {
                name,
                email,
                phone: trimmed(self.phone.as_ref()).unwrap_or_default(),
                message,
                submitted_at,
            }),
            (name, email, message) => {
                let missing = [
                    (RequiredField::Name, name.is_none()),
                    (RequiredField::Email, email.is_none()),
                    (RequiredField::Message, message.is_none()),
                ]
                .into_iter()
                .filter_map(|(field, absent)| absent.then_some(field))
                .collect();

                Err(ValidationError { missing })
            }
        }
    }
}
