use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;

use crate::db::DbPool;
use crate::entities::{
    alert::{self, Entity as Alert},
    spare_part,
};
use crate::errors::ServiceError;
use crate::services::notifications::LowStockNotifier;

pub const DEFAULT_ALERT_LIMIT: u64 = 50;

/// Alert row joined with its part's name for response assembly
#[derive(Debug, Serialize, ToSchema)]
pub struct AlertView {
    pub id: i32,
    pub part_id: i32,
    pub part_name: Option<String>,
    pub message: String,
    pub seen: bool,
    pub created_at: DateTime<Utc>,
}

impl AlertView {
    fn assemble(alert: alert::Model, part: Option<spare_part::Model>) -> Self {
        Self {
            id: alert.id,
            part_id: alert.part_id,
            part_name: part.map(|p| p.name),
            message: alert.message,
            seen: alert.seen,
            created_at: alert.created_at,
        }
    }
}

/// One page of alerts plus the global unseen count
#[derive(Debug, Serialize, ToSchema)]
pub struct AlertPage {
    pub alerts: Vec<AlertView>,
    pub total: usize,
    pub unread_count: u64,
}

/// Service enforcing the alert dedup invariant: at most one unseen alert
/// exists per part at any time.
#[derive(Clone)]
pub struct AlertService {
    db: Arc<DbPool>,
    notifier: Arc<dyn LowStockNotifier>,
}

impl AlertService {
    pub fn new(db: Arc<DbPool>, notifier: Arc<dyn LowStockNotifier>) -> Self {
        Self { db, notifier }
    }

    /// Create a low-stock alert for the part unless an unseen one already
    /// exists. Returns the created alert, or `None` on the dedup no-op.
    ///
    /// Called after the triggering write has committed; the notifier runs
    /// last and its failure never undoes the alert.
    #[instrument(skip(self, part), fields(part_id = part.id))]
    pub async fn maybe_create_alert(
        &self,
        part: &spare_part::Model,
    ) -> Result<Option<alert::Model>, ServiceError> {
        let existing = Alert::find()
            .filter(alert::Column::PartId.eq(part.id))
            .filter(alert::Column::Seen.eq(false))
            .one(self.db.as_ref())
            .await?;

        if existing.is_some() {
            return Ok(None);
        }

        let message = format!(
            "Low stock alert: {} has {} units (minimum: {})",
            part.name, part.quantity, part.min_quantity
        );

        let created = alert::ActiveModel {
            part_id: Set(part.id),
            message: Set(message),
            seen: Set(false),
            ..Default::default()
        }
        .insert(self.db.as_ref())
        .await?;

        info!(alert_id = created.id, "low-stock alert created");

        match self
            .notifier
            .notify_low_stock(&part.name, part.quantity, part.min_quantity, part.id)
            .await
        {
            Ok(true) => {}
            Ok(false) => {
                info!(part_id = part.id, "low-stock notification skipped by notifier");
            }
            Err(e) => {
                warn!(part_id = part.id, error = %e, "failed to deliver low-stock notification");
            }
        }

        Ok(Some(created))
    }

    /// List alerts, unseen first and newest within each group, with the
    /// global unseen count alongside the page.
    pub async fn list(
        &self,
        seen: Option<bool>,
        limit: Option<u64>,
    ) -> Result<AlertPage, ServiceError> {
        let mut query = Alert::find();
        if let Some(seen) = seen {
            query = query.filter(alert::Column::Seen.eq(seen));
        }

        let rows = query
            .find_also_related(spare_part::Entity)
            .order_by_asc(alert::Column::Seen)
            .order_by_desc(alert::Column::CreatedAt)
            .limit(limit.unwrap_or(DEFAULT_ALERT_LIMIT))
            .all(self.db.as_ref())
            .await?;

        let unread_count = self.unread_count().await?;

        let alerts: Vec<AlertView> = rows
            .into_iter()
            .map(|(alert, part)| AlertView::assemble(alert, part))
            .collect();

        Ok(AlertPage {
            total: alerts.len(),
            alerts,
            unread_count,
        })
    }

    /// Transition a single alert to seen. Unknown ids are an error.
    pub async fn mark_read(&self, alert_id: i32) -> Result<AlertView, ServiceError> {
        let alert = Alert::find_by_id(alert_id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Alert with id {} not found", alert_id))
            })?;

        let mut active: alert::ActiveModel = alert.into();
        active.seen = Set(true);
        let updated = active.update(self.db.as_ref()).await?;

        let part = spare_part::Entity::find_by_id(updated.part_id)
            .one(self.db.as_ref())
            .await?;

        Ok(AlertView::assemble(updated, part))
    }

    /// Transition every currently-unseen alert to seen and return how many
    /// were affected. Alerts created concurrently may miss this sweep; the
    /// next call picks them up.
    pub async fn mark_all_read(&self) -> Result<u64, ServiceError> {
        let result = Alert::update_many()
            .col_expr(alert::Column::Seen, sea_orm::sea_query::Expr::value(true))
            .filter(alert::Column::Seen.eq(false))
            .exec(self.db.as_ref())
            .await?;

        Ok(result.rows_affected)
    }

    pub async fn unread_count(&self) -> Result<u64, ServiceError> {
        let count = Alert::find()
            .filter(alert::Column::Seen.eq(false))
            .count(self.db.as_ref())
            .await?;
        Ok(count)
    }
}
