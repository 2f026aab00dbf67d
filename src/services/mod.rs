pub mod alerts;
pub mod notifications;
pub mod parts;
pub mod stock_ledger;
pub mod suppliers;

use std::sync::Arc;

use crate::db::DbPool;
use crate::services::alerts::AlertService;
use crate::services::notifications::LowStockNotifier;
use crate::services::parts::PartService;
use crate::services::stock_ledger::StockLedgerService;
use crate::services::suppliers::SupplierService;

/// Aggregate of the application services used by the HTTP handlers.
#[derive(Clone)]
pub struct AppServices {
    pub ledger: StockLedgerService,
    pub parts: PartService,
    pub suppliers: SupplierService,
    pub alerts: AlertService,
}

impl AppServices {
    pub fn new(db: Arc<DbPool>, notifier: Arc<dyn LowStockNotifier>) -> Self {
        let alerts = AlertService::new(db.clone(), notifier);
        let ledger = StockLedgerService::new(db.clone(), alerts.clone());
        let parts = PartService::new(db.clone(), alerts.clone());
        let suppliers = SupplierService::new(db);

        Self {
            ledger,
            parts,
            suppliers,
            alerts,
        }
    }
}
