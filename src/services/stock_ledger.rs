//! The stock ledger: the one place part quantities change hands.
//!
//! Every movement is applied as a single database transaction that writes
//! the append-only ledger row and the quantity delta together. The deduction
//! path uses a guarded conditional update so that two concurrent OUT
//! movements can never both pass the sufficiency check and drive a part
//! negative.

use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
    Set, TransactionTrait,
};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;

use crate::db::DbPool;
use crate::entities::{
    spare_part::{self, Entity as SparePart},
    stock_transaction::{self, Entity as StockTransaction, Movement},
    user::{self, Entity as User},
};
use crate::errors::ServiceError;
use crate::services::alerts::AlertService;

pub const DEFAULT_MOVEMENT_LIMIT: u64 = 100;

/// Input for recording one stock movement
#[derive(Debug, Clone)]
pub struct RecordMovementInput {
    pub part_id: i32,
    pub movement: Movement,
    pub quantity: i32,
    pub machine: Option<String>,
    pub notes: Option<String>,
}

/// Filters for the movement listing
#[derive(Debug, Clone, Default)]
pub struct MovementFilters {
    pub part_id: Option<i32>,
    pub user_id: Option<i32>,
    pub movement: Option<Movement>,
    pub machine: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub limit: Option<u64>,
}

/// Ledger row joined with user and part names for response assembly
#[derive(Debug, Serialize, ToSchema)]
pub struct MovementView {
    pub id: i32,
    pub user_id: i32,
    pub user_name: Option<String>,
    pub part_id: i32,
    pub part_name: Option<String>,
    #[serde(rename = "type")]
    pub movement: String,
    pub quantity: i32,
    pub machine: Option<String>,
    pub notes: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Applies validated IN/OUT quantity changes to parts, producing an
/// immutable ledger entry and the updated part atomically.
#[derive(Clone)]
pub struct StockLedgerService {
    db: Arc<DbPool>,
    alerts: AlertService,
}

impl StockLedgerService {
    pub fn new(db: Arc<DbPool>, alerts: AlertService) -> Self {
        Self { db, alerts }
    }

    /// Record a movement on behalf of `user_id`.
    ///
    /// Returns the created ledger row and the part as it stands after the
    /// movement. An OUT exceeding the available quantity fails entirely:
    /// no ledger row, no deduction.
    #[instrument(skip(self), fields(part_id = input.part_id, movement = input.movement.as_str()))]
    pub async fn record_movement(
        &self,
        user_id: i32,
        input: RecordMovementInput,
    ) -> Result<(stock_transaction::Model, spare_part::Model), ServiceError> {
        if input.quantity <= 0 {
            return Err(ServiceError::ValidationError(
                "Quantity must be positive".to_string(),
            ));
        }

        let txn = self.db.begin().await?;

        SparePart::find_by_id(input.part_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Part with id {} not found", input.part_id))
            })?;

        // Apply the delta with a guarded conditional update; the WHERE clause
        // carries the sufficiency check so validation and mutation are one
        // atomic statement with respect to other writers.
        let update = match input.movement {
            Movement::In => SparePart::update_many()
                .col_expr(
                    spare_part::Column::Quantity,
                    Expr::col(spare_part::Column::Quantity).add(input.quantity),
                )
                .col_expr(spare_part::Column::UpdatedAt, Expr::value(Utc::now()))
                .filter(spare_part::Column::Id.eq(input.part_id)),
            Movement::Out => SparePart::update_many()
                .col_expr(
                    spare_part::Column::Quantity,
                    Expr::col(spare_part::Column::Quantity).sub(input.quantity),
                )
                .col_expr(spare_part::Column::UpdatedAt, Expr::value(Utc::now()))
                .filter(spare_part::Column::Id.eq(input.part_id))
                .filter(spare_part::Column::Quantity.gte(input.quantity)),
        };

        let result = update.exec(&txn).await?;
        if result.rows_affected == 0 {
            // Re-read for an accurate picture; the snapshot from before the
            // update may be stale under contention.
            let current = SparePart::find_by_id(input.part_id).one(&txn).await?;
            txn.rollback().await?;
            return Err(match current {
                None => ServiceError::NotFound(format!(
                    "Part with id {} not found",
                    input.part_id
                )),
                Some(p) => ServiceError::InsufficientStock(format!(
                    "Available: {}, Requested: {}",
                    p.quantity, input.quantity
                )),
            });
        }

        let record = stock_transaction::ActiveModel {
            user_id: Set(user_id),
            part_id: Set(input.part_id),
            movement: Set(input.movement.as_str().to_string()),
            quantity: Set(input.quantity),
            machine: Set(input.machine.clone()),
            notes: Set(input.notes.clone()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let part = SparePart::find_by_id(input.part_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::InternalError("part vanished during movement".to_string())
            })?;

        txn.commit().await?;

        info!(
            transaction_id = record.id,
            new_quantity = part.quantity,
            "stock movement recorded"
        );

        // Alert checks run only on depletion. Restocking never raises an
        // alert, even when the part is still below its minimum afterwards.
        if input.movement == Movement::Out && part.is_low_stock() {
            self.alerts.maybe_create_alert(&part).await?;
        }

        Ok((record, part))
    }

    /// List ledger entries, newest first, joined with user and part names.
    pub async fn list_movements(
        &self,
        filters: MovementFilters,
    ) -> Result<Vec<MovementView>, ServiceError> {
        let mut query = StockTransaction::find();

        if let Some(part_id) = filters.part_id {
            query = query.filter(stock_transaction::Column::PartId.eq(part_id));
        }
        if let Some(user_id) = filters.user_id {
            query = query.filter(stock_transaction::Column::UserId.eq(user_id));
        }
        if let Some(movement) = filters.movement {
            query = query.filter(stock_transaction::Column::Movement.eq(movement.as_str()));
        }
        if let Some(machine) = filters.machine.as_deref() {
            let pattern = format!("%{}%", machine.to_lowercase());
            query = query.filter(
                Condition::all().add(
                    Expr::expr(sea_orm::sea_query::Func::lower(Expr::col(
                        stock_transaction::Column::Machine,
                    )))
                    .like(pattern),
                ),
            );
        }
        if let Some(start) = filters.start_date {
            query = query.filter(stock_transaction::Column::CreatedAt.gte(start));
        }
        if let Some(end) = filters.end_date {
            query = query.filter(stock_transaction::Column::CreatedAt.lte(end));
        }

        let rows = query
            .order_by_desc(stock_transaction::Column::CreatedAt)
            .limit(filters.limit.unwrap_or(DEFAULT_MOVEMENT_LIMIT))
            .all(self.db.as_ref())
            .await?;

        // Joined lookups for names, assembled explicitly rather than via
        // lazy relationship loading.
        let user_ids: Vec<i32> = rows.iter().map(|t| t.user_id).collect();
        let part_ids: Vec<i32> = rows.iter().map(|t| t.part_id).collect();

        let users: HashMap<i32, String> = User::find()
            .filter(user::Column::Id.is_in(user_ids))
            .all(self.db.as_ref())
            .await?
            .into_iter()
            .map(|u| (u.id, u.username))
            .collect();

        let parts: HashMap<i32, String> = SparePart::find()
            .filter(spare_part::Column::Id.is_in(part_ids))
            .all(self.db.as_ref())
            .await?
            .into_iter()
            .map(|p| (p.id, p.name))
            .collect();

        Ok(rows
            .into_iter()
            .map(|t| MovementView {
                id: t.id,
                user_id: t.user_id,
                user_name: users.get(&t.user_id).cloned(),
                part_id: t.part_id,
                part_name: parts.get(&t.part_id).cloned(),
                movement: t.movement,
                quantity: t.quantity,
                machine: t.machine,
                notes: t.notes,
                timestamp: t.created_at,
            })
            .collect())
    }
}
