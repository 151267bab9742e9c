//! Customers and review requests owned by a business profile.
//!
//! A review request moves through a small lifecycle driven by plain
//! single-row writes:
//!
//!   pending → sent → clicked → reviewed
//!   pending | sent | clicked → failed
//!
//! `reviewed` and `failed` are terminal. There is no scheduler, retry logic,
//! or delivery worker here — callers apply one transition per request.

use chrono::Utc;
use uuid::Uuid;

use super::{Storage, StoreResult};

#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRow {
    pub id: String,
    pub profile_id: String,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub created_at: String,
}

#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequestRow {
    pub id: String,
    pub profile_id: String,
    pub customer_id: String,
    pub status: String,
    pub sent_at: Option<String>,
    pub clicked_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    Pending,
    Sent,
    Clicked,
    Reviewed,
    Failed,
}

impl ReviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewStatus::Pending => "pending",
            ReviewStatus::Sent => "sent",
            ReviewStatus::Clicked => "clicked",
            ReviewStatus::Reviewed => "reviewed",
            ReviewStatus::Failed => "failed",
        }
    }

    /// Statuses a request may hold immediately before moving to `self`.
    /// Empty for `pending` — it is the initial state, never a target.
    pub fn allowed_from(&self) -> &'static [ReviewStatus] {
        match self {
            ReviewStatus::Pending => &[],
            ReviewStatus::Sent => &[ReviewStatus::Pending],
            ReviewStatus::Clicked => &[ReviewStatus::Sent],
            ReviewStatus::Reviewed => &[ReviewStatus::Sent, ReviewStatus::Clicked],
            ReviewStatus::Failed => &[
                ReviewStatus::Pending,
                ReviewStatus::Sent,
                ReviewStatus::Clicked,
            ],
        }
    }
}

impl std::str::FromStr for ReviewStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ReviewStatus::Pending),
            "sent" => Ok(ReviewStatus::Sent),
            "clicked" => Ok(ReviewStatus::Clicked),
            "reviewed" => Ok(ReviewStatus::Reviewed),
            "failed" => Ok(ReviewStatus::Failed),
            other => Err(format!("unknown review request status: {other}")),
        }
    }
}

/// Result of attempting a lifecycle transition.
#[derive(Debug)]
pub enum TransitionOutcome {
    Applied(ReviewRequestRow),
    /// The request exists but its current status does not permit the move.
    InvalidState(String),
    NotFound,
}

impl Storage {
    // ─── Customers ──────────────────────────────────────────────────────────

    pub async fn create_customer(
        &self,
        profile_id: &str,
        name: &str,
        phone: &str,
        email: &str,
    ) -> StoreResult<CustomerRow> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "INSERT INTO customers (id, profile_id, name, phone, email, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(profile_id)
        .bind(name)
        .bind(phone)
        .bind(email)
        .bind(&now)
        .execute(&self.pool)
        .await?;
        Ok(CustomerRow {
            id,
            profile_id: profile_id.to_string(),
            name: name.to_string(),
            phone: phone.to_string(),
            email: email.to_string(),
            created_at: now,
        })
    }

    pub async fn get_customer(
        &self,
        id: &str,
        profile_id: &str,
    ) -> StoreResult<Option<CustomerRow>> {
        Ok(
            sqlx::query_as("SELECT * FROM customers WHERE id = ? AND profile_id = ?")
                .bind(id)
                .bind(profile_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    pub async fn list_customers(&self, profile_id: &str) -> StoreResult<Vec<CustomerRow>> {
        super::with_timeout(async {
            Ok(sqlx::query_as(
                "SELECT * FROM customers WHERE profile_id = ? ORDER BY created_at DESC",
            )
            .bind(profile_id)
            .fetch_all(&self.pool)
            .await?)
        })
        .await
    }

    // ─── Review requests ────────────────────────────────────────────────────

    pub async fn create_review_request(
        &self,
        profile_id: &str,
        customer_id: &str,
    ) -> StoreResult<ReviewRequestRow> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "INSERT INTO review_requests
               (id, profile_id, customer_id, status, created_at, updated_at)
             VALUES (?, ?, ?, 'pending', ?, ?)",
        )
        .bind(&id)
        .bind(profile_id)
        .bind(customer_id)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;
        Ok(ReviewRequestRow {
            id,
            profile_id: profile_id.to_string(),
            customer_id: customer_id.to_string(),
            status: "pending".to_string(),
            sent_at: None,
            clicked_at: None,
            created_at: now.clone(),
            updated_at: now,
        })
    }

    pub async fn get_review_request(
        &self,
        id: &str,
        profile_id: &str,
    ) -> StoreResult<Option<ReviewRequestRow>> {
        Ok(
            sqlx::query_as("SELECT * FROM review_requests WHERE id = ? AND profile_id = ?")
                .bind(id)
                .bind(profile_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    pub async fn list_review_requests(
        &self,
        profile_id: &str,
    ) -> StoreResult<Vec<ReviewRequestRow>> {
        super::with_timeout(async {
            Ok(sqlx::query_as(
                "SELECT * FROM review_requests WHERE profile_id = ? ORDER BY created_at DESC",
            )
            .bind(profile_id)
            .fetch_all(&self.pool)
            .await?)
        })
        .await
    }

    /// Atomically move a review request to `next` only when its current
    /// status permits the transition. The guarded UPDATE closes the window
    /// between reading the status and writing the new one — a lost race
    /// reports `InvalidState` instead of silently double-applying.
    ///
    /// `sent` and `clicked` stamp their timestamps on first entry.
    pub async fn transition_review_request(
        &self,
        id: &str,
        profile_id: &str,
        next: ReviewStatus,
    ) -> StoreResult<TransitionOutcome> {
        let allowed = next.allowed_from();
        if allowed.is_empty() {
            return Ok(match self.get_review_request(id, profile_id).await? {
                Some(row) => TransitionOutcome::InvalidState(row.status),
                None => TransitionOutcome::NotFound,
            });
        }

        let placeholders = vec!["?"; allowed.len()].join(", ");
        let sql = format!(
            "UPDATE review_requests SET
               status = ?,
               sent_at = CASE WHEN ? = 'sent' THEN COALESCE(sent_at, ?) ELSE sent_at END,
               clicked_at = CASE WHEN ? = 'clicked' THEN COALESCE(clicked_at, ?) ELSE clicked_at END,
               updated_at = ?
             WHERE id = ? AND profile_id = ? AND status IN ({placeholders})"
        );

        let now = Utc::now().to_rfc3339();
        let mut query = sqlx::query(&sql)
            .bind(next.as_str())
            .bind(next.as_str())
            .bind(&now)
            .bind(next.as_str())
            .bind(&now)
            .bind(&now)
            .bind(id)
            .bind(profile_id);
        for from in allowed {
            query = query.bind(from.as_str());
        }
        let affected = query.execute(&self.pool).await?.rows_affected();

        if affected > 0 {
            let row = self
                .get_review_request(id, profile_id)
                .await?
                .ok_or_else(|| {
                    super::StoreError::Database(sqlx::Error::RowNotFound)
                })?;
            return Ok(TransitionOutcome::Applied(row));
        }
        Ok(match self.get_review_request(id, profile_id).await? {
            Some(row) => TransitionOutcome::InvalidState(row.status),
            None => TransitionOutcome::NotFound,
        })
    }
}
