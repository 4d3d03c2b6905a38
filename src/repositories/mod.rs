//! Repository layer for datasheet access.
//!
//! Every repository reads and writes through one [`SheetGateway`], so all
//! outbound calls share the same rate limit and cache.

pub mod gateway;
mod inventory_repo;
mod ledger_repo;
mod member_repo;
mod product_repo;
mod profile_repo;

pub use gateway::{Sheet, SheetGateway};
pub use inventory_repo::InventoryRepository;
pub use ledger_repo::LedgerRepository;
pub use member_repo::MemberRepository;
pub use product_repo::ProductRepository;
pub use profile_repo::ProfileRepository;

use crate::config::DatasheetsConfig;

/// Aggregates all repositories for convenient access.
///
/// Cloning is cheap; clones share the gateway.
#[derive(Clone)]
pub struct Repositories {
    pub members: MemberRepository,
    pub ledger: LedgerRepository,
    pub products: ProductRepository,
    pub inventory: InventoryRepository,
    pub profile: ProfileRepository,
}

impl Repositories {
    /// Creates every repository on top of `gateway`.
    ///
    /// # Arguments
    /// * `gateway` - Shared transport, governor and cache
    /// * `sheets` - Datasheet ids and views
    pub fn new(gateway: &SheetGateway, sheets: &DatasheetsConfig) -> Self {
        Self {
            members: MemberRepository::new(gateway.sheet("members", sheets.members.clone())),
            ledger: LedgerRepository::new(gateway.sheet("ledger", sheets.ledger.clone())),
            products: ProductRepository::new(gateway.sheet("products", sheets.products.clone())),
            inventory: InventoryRepository::new(
                gateway.sheet("inventory", sheets.inventory.clone()),
            ),
            profile: ProfileRepository::new(gateway.sheet("profile", sheets.profile.clone())),
        }
    }
}
