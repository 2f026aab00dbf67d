use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;
use tracing::{info, instrument};

use crate::db::DbPool;
use crate::entities::{
    spare_part::{self, Entity as SparePart},
    supplier::{self, Entity as Supplier},
};
use crate::errors::ServiceError;

/// Input for creating a supplier
#[derive(Debug, Clone)]
pub struct CreateSupplierInput {
    pub name: String,
    pub contact_person: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Partial update of a supplier
#[derive(Debug, Clone, Default)]
pub struct UpdateSupplierInput {
    pub name: Option<String>,
    pub contact_person: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Reference-entity CRUD for suppliers.
#[derive(Clone)]
pub struct SupplierService {
    db: Arc<DbPool>,
}

impl SupplierService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> Result<Vec<supplier::Model>, ServiceError> {
        let suppliers = Supplier::find()
            .order_by_asc(supplier::Column::Name)
            .all(self.db.as_ref())
            .await?;
        Ok(suppliers)
    }

    pub async fn get(&self, supplier_id: i32) -> Result<supplier::Model, ServiceError> {
        Supplier::find_by_id(supplier_id)
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Supplier with id {} not found", supplier_id))
            })
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create(&self, input: CreateSupplierInput) -> Result<supplier::Model, ServiceError> {
        if input.name.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "Supplier name is required".to_string(),
            ));
        }

        let model = supplier::ActiveModel {
            name: Set(input.name.trim().to_string()),
            contact_person: Set(input.contact_person),
            email: Set(input.email),
            phone: Set(input.phone),
            address: Set(input.address),
            ..Default::default()
        };

        let supplier = model.insert(self.db.as_ref()).await?;
        info!(supplier_id = supplier.id, "supplier created");
        Ok(supplier)
    }

    pub async fn update(
        &self,
        supplier_id: i32,
        input: UpdateSupplierInput,
    ) -> Result<supplier::Model, ServiceError> {
        if input.name.is_none()
            && input.contact_person.is_none()
            && input.email.is_none()
            && input.phone.is_none()
            && input.address.is_none()
        {
            return Err(ServiceError::ValidationError("No data provided".to_string()));
        }

        let supplier = self.get(supplier_id).await?;
        let mut active: supplier::ActiveModel = supplier.into();

        if let Some(name) = input.name {
            if name.trim().is_empty() {
                return Err(ServiceError::ValidationError(
                    "Supplier name is required".to_string(),
                ));
            }
            active.name = Set(name.trim().to_string());
        }
        if let Some(contact_person) = input.contact_person {
            active.contact_person = Set(Some(contact_person));
        }
        if let Some(email) = input.email {
            active.email = Set(Some(email));
        }
        if let Some(phone) = input.phone {
            active.phone = Set(Some(phone));
        }
        if let Some(address) = input.address {
            active.address = Set(Some(address));
        }

        let supplier = active.update(self.db.as_ref()).await?;
        Ok(supplier)
    }

    /// Delete a supplier. Refused while parts still reference it; parts
    /// keep a weak reference, so the caller must reassign or remove them
    /// first.
    #[instrument(skip(self))]
    pub async fn delete(&self, supplier_id: i32) -> Result<(), ServiceError> {
        let supplier = self.get(supplier_id).await?;

        let referencing_parts = SparePart::find()
            .filter(spare_part::Column::SupplierId.eq(supplier_id))
            .count(self.db.as_ref())
            .await?;
        if referencing_parts > 0 {
            return Err(ServiceError::InvalidOperation(
                "Cannot delete supplier with associated spare parts".to_string(),
            ));
        }

        Supplier::delete_by_id(supplier.id)
            .exec(self.db.as_ref())
            .await?;
        info!(supplier_id, "supplier deleted");
        Ok(())
    }
}
