use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;

use crate::db::DbPool;
use crate::entities::{
    alert::{self, Entity as Alert},
    spare_part::{self, Entity as SparePart},
    stock_transaction::{self, Entity as StockTransaction},
    supplier,
};
use crate::errors::ServiceError;
use crate::qrcodes;
use crate::services::alerts::AlertService;

/// Filters for the part listing; all present filters are ANDed.
#[derive(Debug, Clone, Default)]
pub struct PartFilters {
    pub search: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub low_stock: Option<bool>,
}

/// Input for creating a part
#[derive(Debug, Clone)]
pub struct CreatePartInput {
    pub name: String,
    pub description: Option<String>,
    pub quantity: i32,
    pub min_quantity: i32,
    pub location: Option<String>,
    pub category: Option<String>,
    pub supplier_id: Option<i32>,
}

/// Partial update of a part; absent fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdatePartInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub quantity: Option<i32>,
    pub min_quantity: Option<i32>,
    pub location: Option<String>,
    pub category: Option<String>,
    pub supplier_id: Option<Option<i32>>,
}

/// Part joined with its supplier's name for response assembly
#[derive(Debug, Serialize, ToSchema)]
pub struct PartView {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub quantity: i32,
    pub min_quantity: i32,
    pub location: Option<String>,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub qr_code_url: Option<String>,
    pub is_low_stock: bool,
    pub supplier_id: Option<i32>,
    pub supplier_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PartView {
    pub fn assemble(part: spare_part::Model, supplier: Option<supplier::Model>) -> Self {
        Self {
            id: part.id,
            is_low_stock: part.is_low_stock(),
            name: part.name,
            description: part.description,
            quantity: part.quantity,
            min_quantity: part.min_quantity,
            location: part.location,
            category: part.category,
            image_url: part.image_url,
            qr_code_url: part.qr_code_url,
            supplier_id: part.supplier_id,
            supplier_name: supplier.map(|s| s.name),
            created_at: part.created_at,
            updated_at: part.updated_at,
        }
    }
}

/// Catalog CRUD for spare parts. Quantity edits here are direct admin
/// writes; routine stock movements go through the stock ledger instead.
#[derive(Clone)]
pub struct PartService {
    db: Arc<DbPool>,
    alerts: AlertService,
}

impl PartService {
    pub fn new(db: Arc<DbPool>, alerts: AlertService) -> Self {
        Self { db, alerts }
    }

    /// List parts matching the filters, ordered by name.
    pub async fn list(&self, filters: PartFilters) -> Result<Vec<PartView>, ServiceError> {
        let mut query = SparePart::find();

        // The listing joins suppliers, so raw column references must be
        // table-qualified ("name" exists on both sides).
        if let Some(search) = filters.search.as_deref().filter(|s| !s.trim().is_empty()) {
            let pattern = format!("%{}%", search.trim().to_lowercase());
            query = query.filter(
                Condition::any()
                    .add(
                        Expr::expr(Func::lower(Expr::col((
                            spare_part::Entity,
                            spare_part::Column::Name,
                        ))))
                        .like(pattern.clone()),
                    )
                    .add(
                        Expr::expr(Func::lower(Expr::col((
                            spare_part::Entity,
                            spare_part::Column::Description,
                        ))))
                        .like(pattern),
                    ),
            );
        }
        if let Some(category) = filters.category.as_deref().filter(|s| !s.is_empty()) {
            query = query.filter(spare_part::Column::Category.eq(category));
        }
        if let Some(location) = filters.location.as_deref().filter(|s| !s.is_empty()) {
            query = query.filter(spare_part::Column::Location.eq(location));
        }
        if filters.low_stock == Some(true) {
            query = query.filter(
                Expr::col((spare_part::Entity, spare_part::Column::Quantity)).lte(Expr::col((
                    spare_part::Entity,
                    spare_part::Column::MinQuantity,
                ))),
            );
        }

        let rows = query
            .find_also_related(supplier::Entity)
            .order_by_asc(spare_part::Column::Name)
            .all(self.db.as_ref())
            .await?;

        Ok(rows
            .into_iter()
            .map(|(part, supplier)| PartView::assemble(part, supplier))
            .collect())
    }

    pub async fn get(&self, part_id: i32) -> Result<PartView, ServiceError> {
        let (part, supplier) = self.find_with_supplier(part_id).await?;
        Ok(PartView::assemble(part, supplier))
    }

    /// Raw entity lookup used by collaborating services
    pub async fn get_model(&self, part_id: i32) -> Result<spare_part::Model, ServiceError> {
        SparePart::find_by_id(part_id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Part with id {} not found", part_id)))
    }

    /// Create a part. The new part receives a QR payload URL derived from
    /// its id, and the low-stock check runs on the initial quantity.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create(&self, input: CreatePartInput) -> Result<PartView, ServiceError> {
        validate_part_fields(&input.name, input.quantity, input.min_quantity)?;

        let model = spare_part::ActiveModel {
            name: Set(input.name.trim().to_string()),
            description: Set(input.description),
            quantity: Set(input.quantity),
            min_quantity: Set(input.min_quantity),
            location: Set(input.location),
            category: Set(input.category),
            supplier_id: Set(input.supplier_id),
            ..Default::default()
        };

        let part = model.insert(self.db.as_ref()).await?;

        // The QR URL embeds the generated id, so it is stamped post-insert.
        let part_id = part.id;
        let mut active: spare_part::ActiveModel = part.into();
        active.qr_code_url = Set(Some(qrcodes::qr_code_url(part_id)));
        let part = active.update(self.db.as_ref()).await?;

        info!(part_id = part.id, "part created");

        if part.is_low_stock() {
            self.alerts.maybe_create_alert(&part).await?;
        }

        self.get(part.id).await
    }

    /// Apply a partial update. Setting `quantity` directly is an admin
    /// correction; the low-stock check still runs afterwards.
    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        part_id: i32,
        input: UpdatePartInput,
    ) -> Result<PartView, ServiceError> {
        let part = self.get_model(part_id).await?;
        let mut active: spare_part::ActiveModel = part.into();

        if let Some(name) = input.name {
            if name.trim().is_empty() {
                return Err(ServiceError::ValidationError(
                    "Part name is required".to_string(),
                ));
            }
            active.name = Set(name.trim().to_string());
        }
        if let Some(description) = input.description {
            active.description = Set(Some(description));
        }
        if let Some(quantity) = input.quantity {
            if quantity < 0 {
                return Err(ServiceError::ValidationError(
                    "Quantity cannot be negative".to_string(),
                ));
            }
            active.quantity = Set(quantity);
        }
        if let Some(min_quantity) = input.min_quantity {
            if min_quantity < 0 {
                return Err(ServiceError::ValidationError(
                    "Minimum quantity cannot be negative".to_string(),
                ));
            }
            active.min_quantity = Set(min_quantity);
        }
        if let Some(location) = input.location {
            active.location = Set(Some(location));
        }
        if let Some(category) = input.category {
            active.category = Set(Some(category));
        }
        if let Some(supplier_id) = input.supplier_id {
            active.supplier_id = Set(supplier_id);
        }

        let part = active.update(self.db.as_ref()).await?;

        if part.is_low_stock() {
            self.alerts.maybe_create_alert(&part).await?;
        }

        self.get(part.id).await
    }

    /// Record the stored upload path for a part's image.
    pub async fn set_image(&self, part_id: i32, image_url: String) -> Result<PartView, ServiceError> {
        let part = self.get_model(part_id).await?;
        let mut active: spare_part::ActiveModel = part.into();
        active.image_url = Set(Some(image_url));
        let part = active.update(self.db.as_ref()).await?;
        self.get(part.id).await
    }

    /// Delete a part together with its ledger entries and alerts, in one
    /// database transaction.
    #[instrument(skip(self))]
    pub async fn delete(&self, part_id: i32) -> Result<(), ServiceError> {
        let txn = self.db.begin().await?;

        let part = SparePart::find_by_id(part_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Part with id {} not found", part_id)))?;

        StockTransaction::delete_many()
            .filter(stock_transaction::Column::PartId.eq(part_id))
            .exec(&txn)
            .await?;
        Alert::delete_many()
            .filter(alert::Column::PartId.eq(part_id))
            .exec(&txn)
            .await?;
        SparePart::delete_by_id(part.id).exec(&txn).await?;

        txn.commit().await?;

        info!(part_id, "part deleted with its transactions and alerts");
        Ok(())
    }

    async fn find_with_supplier(
        &self,
        part_id: i32,
    ) -> Result<(spare_part::Model, Option<supplier::Model>), ServiceError> {
        SparePart::find_by_id(part_id)
            .find_also_related(supplier::Entity)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Part with id {} not found", part_id)))
    }
}

fn validate_part_fields(name: &str, quantity: i32, min_quantity: i32) -> Result<(), ServiceError> {
    if name.trim().is_empty() {
        return Err(ServiceError::ValidationError(
            "Part name is required".to_string(),
        ));
    }
    if quantity < 0 {
        return Err(ServiceError::ValidationError(
            "Quantity cannot be negative".to_string(),
        ));
    }
    if min_quantity < 0 {
        return Err(ServiceError::ValidationError(
            "Minimum quantity cannot be negative".to_string(),
        ));
    }
    Ok(())
}
