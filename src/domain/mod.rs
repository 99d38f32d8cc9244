//! Domain primitives for the inquiry subsystem.
//!
//! Newtypes keep store-assigned identifiers from being confused with the
//! free-form text fields an inquiry carries.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque identifier of a stored inquiry.
///
/// Assigned by the store when the record is created and handed back to the
/// caller verbatim. Callers must not assume any structure.
///
/// # Examples
///
/// ```rust
/// use atelier::domain::InquiryId;
///
/// let id = InquiryId::from("abc-123");
/// assert_eq!(id.as_str(), "abc-123");
/// assert_eq!(id.to_string(), "abc-123");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InquiryId(String);

impl InquiryId {
    /// Generates a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for InquiryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for InquiryId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for InquiryId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<InquiryId> for String {
    fn from(id: InquiryId) -> Self {
        id.0
    }
}
