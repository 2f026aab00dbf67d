mod common;

use assert_matches::assert_matches;
use common::TestApp;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};

use stockroom_api::entities::{
    alert::{self, Entity as Alert},
    stock_transaction::{self, Entity as StockTransaction, Movement},
};
use stockroom_api::errors::ServiceError;
use stockroom_api::services::parts::{CreatePartInput, PartFilters, UpdatePartInput};
use stockroom_api::services::stock_ledger::RecordMovementInput;
use stockroom_api::services::suppliers::CreateSupplierInput;

fn part_input(name: &str, quantity: i32) -> CreatePartInput {
    CreatePartInput {
        name: name.to_string(),
        description: None,
        quantity,
        min_quantity: 0,
        location: None,
        category: None,
        supplier_id: None,
    }
}

#[tokio::test]
async fn created_parts_receive_a_qr_code_url() {
    let app = TestApp::new().await;
    let part = app.create_part("Encoder disc", 4, 0).await;

    assert_eq!(
        part.qr_code_url.as_deref(),
        Some(format!("/qrcodes/part_{}.png", part.id).as_str())
    );
}

#[tokio::test]
async fn create_rejects_blank_names_and_negative_quantities() {
    let app = TestApp::new().await;
    let parts = &app.state.services.parts;

    let err = parts.create(part_input("   ", 1)).await.unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));

    let err = parts.create(part_input("Shim", -1)).await.unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));

    let err = parts
        .create(CreatePartInput {
            min_quantity: -5,
            ..part_input("Shim", 1)
        })
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));
}

#[tokio::test]
async fn filters_compose_and_results_order_by_name() {
    let app = TestApp::new().await;
    let parts = &app.state.services.parts;

    parts
        .create(CreatePartInput {
            description: Some("Ceramic hybrid bearing".to_string()),
            category: Some("bearings".to_string()),
            location: Some("A1".to_string()),
            ..part_input("Zenith bearing", 20)
        })
        .await
        .unwrap();
    parts
        .create(CreatePartInput {
            category: Some("bearings".to_string()),
            location: Some("B2".to_string()),
            ..part_input("Axial bearing", 2)
        })
        .await
        .unwrap();
    parts
        .create(CreatePartInput {
            category: Some("belts".to_string()),
            location: Some("A1".to_string()),
            ..part_input("Timing belt", 7)
        })
        .await
        .unwrap();

    // No filters: everything, name-ascending.
    let all = parts.list(PartFilters::default()).await.unwrap();
    let names: Vec<&str> = all.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["Axial bearing", "Timing belt", "Zenith bearing"]);

    // Search is case-insensitive over name and description.
    let by_search = parts
        .list(PartFilters {
            search: Some("BEARING".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_search.len(), 2);

    let by_description = parts
        .list(PartFilters {
            search: Some("ceramic".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_description.len(), 1);
    assert_eq!(by_description[0].name, "Zenith bearing");

    // Filters are ANDed.
    let combined = parts
        .list(PartFilters {
            category: Some("bearings".to_string()),
            location: Some("A1".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(combined.len(), 1);
    assert_eq!(combined[0].name, "Zenith bearing");
}

#[tokio::test]
async fn low_stock_filter_uses_the_inclusive_boundary() {
    let app = TestApp::new().await;
    let parts = &app.state.services.parts;

    parts
        .create(CreatePartInput {
            min_quantity: 5,
            ..part_input("At minimum", 5)
        })
        .await
        .unwrap();
    parts
        .create(CreatePartInput {
            min_quantity: 5,
            ..part_input("Above minimum", 6)
        })
        .await
        .unwrap();

    let low = parts
        .list(PartFilters {
            low_stock: Some(true),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(low.len(), 1);
    assert_eq!(low[0].name, "At minimum");
    assert!(low[0].is_low_stock);
}

#[tokio::test]
async fn part_views_resolve_the_supplier_name() {
    let app = TestApp::new().await;

    let supplier = app
        .state
        .services
        .suppliers
        .create(CreateSupplierInput {
            name: "Acme Industrial".to_string(),
            contact_person: None,
            email: None,
            phone: None,
            address: None,
        })
        .await
        .unwrap();

    let part = app
        .state
        .services
        .parts
        .create(CreatePartInput {
            supplier_id: Some(supplier.id),
            ..part_input("Sprocket", 9)
        })
        .await
        .unwrap();

    assert_eq!(part.supplier_id, Some(supplier.id));
    assert_eq!(part.supplier_name.as_deref(), Some("Acme Industrial"));
}

#[tokio::test]
async fn update_applies_only_present_fields() {
    let app = TestApp::new().await;
    let part = app.create_part("Limit switch", 9, 0).await;

    let updated = app
        .state
        .services
        .parts
        .update(
            part.id,
            UpdatePartInput {
                location: Some("C3".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.location.as_deref(), Some("C3"));
    assert_eq!(updated.name, "Limit switch");
    assert_eq!(updated.quantity, 9);
}

#[tokio::test]
async fn deleting_a_part_cascades_transactions_and_alerts() {
    let app = TestApp::new().await;
    let part = app.create_part("Brake pad", 12, 10).await;

    // Produce one ledger row and one alert.
    app.state
        .services
        .ledger
        .record_movement(
            app.admin_id,
            RecordMovementInput {
                part_id: part.id,
                movement: Movement::Out,
                quantity: 5,
                machine: None,
                notes: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(app.state.services.alerts.unread_count().await.unwrap(), 1);

    app.state.services.parts.delete(part.id).await.unwrap();

    let err = app.state.services.parts.get(part.id).await.unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));

    let transactions = StockTransaction::find()
        .filter(stock_transaction::Column::PartId.eq(part.id))
        .count(app.state.db.as_ref())
        .await
        .unwrap();
    assert_eq!(transactions, 0);

    let alerts = Alert::find()
        .filter(alert::Column::PartId.eq(part.id))
        .count(app.state.db.as_ref())
        .await
        .unwrap();
    assert_eq!(alerts, 0);
}
