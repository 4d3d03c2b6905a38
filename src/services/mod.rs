//! Service layer for business logic operations.
//!
//! Services validate input, apply the back-office rules and wrap every
//! outcome in an [`Envelope`](crate::envelope::Envelope). No service method
//! returns an error; failures travel inside the envelope.

mod inventory_service;
mod ledger_service;
mod member_service;
mod product_service;
mod profile_service;
mod stats_service;

pub use inventory_service::InventoryService;
pub use ledger_service::LedgerService;
pub use member_service::MemberService;
pub use product_service::ProductService;
pub use profile_service::ProfileService;
pub use stats_service::StatsService;

use crate::error::{AppError, AppResult};
use crate::repositories::Repositories;

/// Aggregates all services for convenient access.
///
/// This struct is designed to be used as Axum application state.
/// Cloning is cheap since repositories share one gateway.
#[derive(Clone)]
pub struct Services {
    pub members: MemberService,
    pub ledger: LedgerService,
    pub stats: StatsService,
    pub products: ProductService,
    pub inventory: InventoryService,
    pub profile: ProfileService,
}

impl Services {
    /// Creates a new Services instance from Repositories.
    pub fn new(repos: Repositories) -> Self {
        Self {
            members: MemberService::new(repos.members.clone(), repos.ledger.clone()),
            ledger: LedgerService::new(repos.ledger.clone()),
            stats: StatsService::new(repos.members, repos.ledger),
            products: ProductService::new(repos.products.clone()),
            inventory: InventoryService::new(repos.products, repos.inventory),
            profile: ProfileService::new(repos.profile),
        }
    }
}

/// Trimmed record id, or a validation error when blank.
pub(crate) fn require_id(record_id: &str) -> AppResult<&str> {
    let id = record_id.trim();
    if id.is_empty() {
        return Err(AppError::validation("recordId", "Record id is required"));
    }
    Ok(id)
}

/// Trimmed, de-duplicated ids; at least one is required.
pub(crate) fn require_ids(record_ids: Vec<String>) -> AppResult<Vec<String>> {
    let mut ids: Vec<String> = Vec::with_capacity(record_ids.len());
    for id in &record_ids {
        let id = require_id(id)?;
        if !ids.iter().any(|seen| seen == id) {
            ids.push(id.to_string());
        }
    }
    if ids.is_empty() {
        return Err(AppError::validation("recordIds", "At least one record id is required"));
    }
    Ok(ids)
}
