use utoipa::OpenApi;

/// OpenAPI documentation for the main API surface. Auth and supplier
/// endpoints are intentionally undocumented here; they follow the same
/// bearer-token and error conventions as the documented routes.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Stockroom API",
        description = r#"
# Stockroom API

Backend for spare-part inventory tracking: parts and suppliers, IN/OUT stock
movements recorded as an append-only ledger, and low-stock alerts with
deduplication.

## Authentication

All `/api` endpoints except `/api/auth/login` and `/api/auth/signup` require
a bearer token:

```
Authorization: Bearer <your-jwt-token>
```

## Error Handling

Errors use a consistent response shape with appropriate status codes:

```json
{
  "error": "Bad Request",
  "message": "Insufficient stock: Available: 5, Requested: 10",
  "timestamp": "2025-06-09T10:30:00Z"
}
```
        "#,
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    paths(
        // Parts
        crate::handlers::parts::list_parts,
        crate::handlers::parts::get_part,
        crate::handlers::parts::create_part,
        crate::handlers::parts::update_part,
        crate::handlers::parts::delete_part,
        crate::handlers::parts::get_qr_code,

        // Transactions
        crate::handlers::transactions::stock_in,
        crate::handlers::transactions::stock_out,
        crate::handlers::transactions::list_transactions,

        // Alerts
        crate::handlers::alerts::list_alerts,
        crate::handlers::alerts::mark_read,
        crate::handlers::alerts::mark_all_read,
        crate::handlers::alerts::unread_count,
    ),
    components(schemas(
        crate::errors::ErrorResponse,
        crate::handlers::parts::CreatePartRequest,
        crate::handlers::parts::UpdatePartRequest,
        crate::handlers::transactions::StockMovementRequest,
        crate::services::alerts::AlertPage,
        crate::services::alerts::AlertView,
        crate::services::parts::PartView,
        crate::services::stock_ledger::MovementView,
    )),
    tags(
        (name = "parts", description = "Spare part catalog"),
        (name = "transactions", description = "Stock movement ledger"),
        (name = "alerts", description = "Low-stock alerts"),
    )
)]
pub struct ApiDoc;
