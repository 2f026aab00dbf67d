use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelBehavior, ActiveValue, Set};
use serde::{Deserialize, Serialize};

/// Spare part entity. `quantity` is mutated exclusively through the stock
/// ledger or a direct admin edit; it is never allowed to go negative.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "spare_parts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub quantity: i32,
    pub min_quantity: i32,
    pub location: Option<String>,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub qr_code_url: Option<String>,
    pub supplier_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Model {
    /// A part is low on stock when it sits at or below its minimum level.
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.min_quantity
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::supplier::Entity",
        from = "Column::SupplierId",
        to = "super::supplier::Column::Id",
        on_delete = "SetNull"
    )]
    Supplier,
    #[sea_orm(has_many = "super::stock_transaction::Entity")]
    StockTransaction,
    #[sea_orm(has_many = "super::alert::Entity")]
    Alert,
}

impl Related<super::supplier::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Supplier.def()
    }
}

impl Related<super::stock_transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StockTransaction.def()
    }
}

impl Related<super::alert::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Alert.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C: ConnectionTrait>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;
        let now = Utc::now();
        if insert {
            if let ActiveValue::NotSet = active_model.created_at {
                active_model.created_at = Set(now);
            }
        }
        active_model.updated_at = Set(now);
        Ok(active_model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn part(quantity: i32, min_quantity: i32) -> Model {
        let now = Utc::now();
        Model {
            id: 1,
            name: "Bearing 6204".to_string(),
            description: None,
            quantity,
            min_quantity,
            location: None,
            category: None,
            image_url: None,
            qr_code_url: None,
            supplier_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn low_stock_boundary_is_inclusive() {
        assert!(part(10, 10).is_low_stock());
        assert!(part(0, 10).is_low_stock());
        assert!(!part(11, 10).is_low_stock());
    }
}
