use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use sea_orm::{
    DatabaseConnection, EntityTrait, PaginatorTrait, QueryOrder, QuerySelect, Set,
};

use crate::domain::InquiryId;
use crate::entities::{inquiries, prelude::*};
use crate::models::inquiry::{Inquiry, NewInquiry};

/// Fixed-width UTC timestamps so lexical order matches chronological order.
fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

impl TryFrom<inquiries::Model> for Inquiry {
    type Error = anyhow::Error;

    fn try_from(model: inquiries::Model) -> Result<Self> {
        let submitted_at = DateTime::parse_from_rfc3339(&model.submitted_at)
            .with_context(|| format!("Invalid submitted_at on inquiry {}", model.id))?
            .with_timezone(&Utc);

        Ok(Self {
            id: InquiryId::from(model.id),
            name: model.name,
            email: model.email,
            phone: model.phone,
            message: model.message,
            submitted_at,
        })
    }
}

pub struct InquiryRepository {
    conn: DatabaseConnection,
}

impl InquiryRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Inserts one inquiry under a freshly generated id.
    pub async fn add(&self, new: NewInquiry) -> Result<Inquiry> {
        let id = InquiryId::generate();

        let active_model = inquiries::ActiveModel {
            id: Set(id.to_string()),
            name: Set(new.name.clone()),
            email: Set(new.email.clone()),
            phone: Set(new.phone.clone()),
            message: Set(new.message.clone()),
            submitted_at: Set(format_timestamp(new.submitted_at)),
        };

        Inquiries::insert(active_model)
            .exec_without_returning(&self.conn)
            .await
            .context("Failed to insert inquiry")?;

        Ok(Inquiry::from_new(id, new))
    }

    pub async fn get(&self, id: &str) -> Result<Option<Inquiry>> {
        Inquiries::find_by_id(id.to_string())
            .one(&self.conn)
            .await
            .context("Failed to query inquiry by id")?
            .map(Inquiry::try_from)
            .transpose()
    }

    pub async fn count(&self) -> Result<u64> {
        let count = Inquiries::find()
            .count(&self.conn)
            .await
            .context("Failed to count inquiries")?;
        Ok(count)
    }

    /// Most recent inquiries first.
    pub async fn list_recent(&self, limit: u64) -> Result<Vec<Inquiry>> {
        Inquiries::find()
            .order_by_desc(inquiries::Column::SubmittedAt)
            .order_by_desc(inquiries::Column::Id)
            .limit(limit)
            .all(&self.conn)
            .await
            .context("Failed to list inquiries")?
            .into_iter()
            .map(Inquiry::try_from)
            .collect()
    }
}
