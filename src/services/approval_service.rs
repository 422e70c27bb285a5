use crate::models::approval::{Approval, ApprovalKind, ApprovalStatus, GroupedApprovals};
use crate::models::{new_id, timestamp, EntityStatus};
use crate::utils::error::{AppError, AppResult};
use chrono::Utc;
use sqlx::AnyPool;
use sqlx::AnyConnection;
use std::str::FromStr;

const APPROVAL_COLUMNS: &str =
    "id, service_provider, name, updating_id, status, requested_on, approved_on";

fn entity_table(kind: ApprovalKind) -> &'static str {
    match kind {
        ApprovalKind::Flight => "flights",
        ApprovalKind::SeatClass => "seat_classes",
    }
}

/// Opens a Pending change request for an entity, replacing any request that
/// is still pending for it. Runs on the caller's transaction so the entity
/// write and the request commit together.
///
/// Single-pending holds only while writes to one entity are serialised;
/// two concurrent submissions can both insert.
pub(crate) async fn open_request(
    conn: &mut AnyConnection,
    service_provider: &str,
    kind: ApprovalKind,
    entity_id: &str,
) -> AppResult<Approval> {
    let purged = sqlx::query("DELETE FROM approvals WHERE updating_id = ? AND status = ?")
        .bind(entity_id)
        .bind(ApprovalStatus::Pending.to_string())
        .execute(&mut *conn)
        .await?;

    let approval = Approval {
        id: new_id(),
        service_provider: service_provider.to_string(),
        name: kind.to_string(),
        updating_id: entity_id.to_string(),
        status: ApprovalStatus::Pending,
        requested_on: Utc::now(),
        approved_on: None,
    };

    sqlx::query(
        r#"INSERT INTO approvals (id, service_provider, name, updating_id, status, requested_on, approved_on)
        VALUES (?, ?, ?, ?, ?, ?, NULL)"#,
    )
    .bind(&approval.id)
    .bind(&approval.service_provider)
    .bind(&approval.name)
    .bind(&approval.updating_id)
    .bind(approval.status.to_string())
    .bind(timestamp(approval.requested_on))
    .execute(&mut *conn)
    .await?;

    tracing::info!(
        approval_id = %approval.id,
        entity_id,
        kind = %kind,
        replaced = purged.rows_affected(),
        "change request opened"
    );
    Ok(approval)
}

/// Marks the most recent request for a deleted entity as Deleted and drops
/// every other request still pending for it.
pub(crate) async fn close_for_deleted_entity(
    conn: &mut AnyConnection,
    entity_id: &str,
) -> AppResult<Option<Approval>> {
    let latest = sqlx::query_as::<_, Approval>(&format!(
        "SELECT {} FROM approvals WHERE updating_id = ? ORDER BY requested_on DESC LIMIT 1",
        APPROVAL_COLUMNS
    ))
    .bind(entity_id)
    .fetch_optional(&mut *conn)
    .await?;

    let Some(mut latest) = latest else {
        return Ok(None);
    };

    sqlx::query("UPDATE approvals SET status = ? WHERE id = ?")
        .bind(ApprovalStatus::Deleted.to_string())
        .bind(&latest.id)
        .execute(&mut *conn)
        .await?;

    sqlx::query("DELETE FROM approvals WHERE updating_id = ? AND id <> ? AND status = ?")
        .bind(entity_id)
        .bind(&latest.id)
        .bind(ApprovalStatus::Pending.to_string())
        .execute(&mut *conn)
        .await?;

    latest.status = ApprovalStatus::Deleted;
    Ok(Some(latest))
}

#[derive(Clone)]
pub struct ApprovalService {
    pool: AnyPool,
}

impl ApprovalService {
    pub fn new(pool: AnyPool) -> Self {
        ApprovalService { pool }
    }

    pub async fn get_approval(&self, approval_id: &str) -> AppResult<Approval> {
        sqlx::query_as::<_, Approval>(&format!(
            "SELECT {} FROM approvals WHERE id = ?",
            APPROVAL_COLUMNS
        ))
        .bind(approval_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Approval request not found.".into()))
    }

    pub async fn list_pending(&self) -> AppResult<Vec<Approval>> {
        let approvals = self.list_by_status(ApprovalStatus::Pending).await?;
        if approvals.is_empty() {
            return Err(AppError::NotFound("No pending approvals found.".into()));
        }
        Ok(approvals)
    }

    pub async fn list_by_status(&self, status: ApprovalStatus) -> AppResult<Vec<Approval>> {
        let approvals = sqlx::query_as::<_, Approval>(&format!(
            "SELECT {} FROM approvals WHERE status = ? ORDER BY requested_on",
            APPROVAL_COLUMNS
        ))
        .bind(status.to_string())
        .fetch_all(&self.pool)
        .await?;
        Ok(approvals)
    }

    pub async fn list_for_entity(&self, entity_id: &str) -> AppResult<Vec<Approval>> {
        let approvals = sqlx::query_as::<_, Approval>(&format!(
            "SELECT {} FROM approvals WHERE updating_id = ? ORDER BY requested_on",
            APPROVAL_COLUMNS
        ))
        .bind(entity_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(approvals)
    }

    pub async fn list_grouped(&self) -> AppResult<GroupedApprovals> {
        let approvals = sqlx::query_as::<_, Approval>(&format!(
            "SELECT {} FROM approvals ORDER BY requested_on",
            APPROVAL_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(GroupedApprovals::from_approvals(approvals))
    }

    /// Approves a pending request and marks the referenced flight or seat
    /// class as Approved, both in one transaction. A missing entity aborts
    /// the whole decision.
    pub async fn approve(&self, approval_id: &str) -> AppResult<Approval> {
        let mut tx = self.pool.begin().await?;
        let mut approval = self.pending_in(&mut tx, approval_id).await?;

        if let Ok(kind) = ApprovalKind::from_str(&approval.name) {
            let table = entity_table(kind);
            let exists = sqlx::query(&format!("SELECT id FROM {} WHERE id = ?", table))
                .bind(&approval.updating_id)
                .fetch_optional(&mut *tx)
                .await?;
            if exists.is_none() {
                tx.rollback().await?;
                tracing::warn!(approval_id, entity_id = %approval.updating_id, "approved entity is gone");
                return Err(AppError::NotFound(format!("Associated {} not found.", kind)));
            }

            sqlx::query(&format!("UPDATE {} SET status = ? WHERE id = ?", table))
                .bind(EntityStatus::Approved.to_string())
                .bind(&approval.updating_id)
                .execute(&mut *tx)
                .await?;
        }

        self.decide(&mut tx, &mut approval, ApprovalStatus::Approved).await?;
        tx.commit().await?;

        tracing::info!(approval_id, entity_id = %approval.updating_id, "change request approved");
        Ok(approval)
    }

    /// Rejects a pending request. The entity's own status is left as is.
    pub async fn reject(&self, approval_id: &str) -> AppResult<Approval> {
        let mut tx = self.pool.begin().await?;
        let mut approval = self.pending_in(&mut tx, approval_id).await?;
        self.decide(&mut tx, &mut approval, ApprovalStatus::Rejected).await?;
        tx.commit().await?;

        tracing::info!(approval_id, entity_id = %approval.updating_id, "change request rejected");
        Ok(approval)
    }

    async fn pending_in(&self, conn: &mut AnyConnection, approval_id: &str) -> AppResult<Approval> {
        let approval = sqlx::query_as::<_, Approval>(&format!(
            "SELECT {} FROM approvals WHERE id = ?",
            APPROVAL_COLUMNS
        ))
        .bind(approval_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Approval request not found.".into()))?;

        if approval.status.is_terminal() {
            return Err(AppError::Conflict(format!(
                "Approval request is already {}.",
                approval.status
            )));
        }
        Ok(approval)
    }

    // Pending -> decided, guarded so two concurrent decisions cannot both win
    async fn decide(
        &self,
        conn: &mut AnyConnection,
        approval: &mut Approval,
        outcome: ApprovalStatus,
    ) -> AppResult<()> {
        let decided_on = Utc::now();
        let result = sqlx::query(
            "UPDATE approvals SET status = ?, approved_on = ? WHERE id = ? AND status = ?",
        )
        .bind(outcome.to_string())
        .bind(timestamp(decided_on))
        .bind(&approval.id)
        .bind(ApprovalStatus::Pending.to_string())
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict(
                "Approval request was decided concurrently.".into(),
            ));
        }

        approval.status = outcome;
        approval.approved_on = Some(decided_on);
        Ok(())
    }
}
