//! Domain records of the back office and their datasheet field mappings.

pub mod fields;
pub mod inventory;
pub mod ledger;
pub mod member;
pub mod product;
pub mod profile;
pub mod stats;

pub use inventory::{InventoryAdjustment, InventoryRecord, StockOperation};
pub use ledger::{LedgerEntry, LedgerKind, LedgerScope, NewLedgerEntry, RecentActivity};
pub use member::{
    Consume, ConsumeOutcome, Member, MemberPatch, NewMember, Recharge, RechargeOutcome,
};
pub use product::{
    NewProduct, Product, ProductKind, ProductPatch, ProductStats, ProductStatus, StatusChange,
    StockLevel, StockUpdate,
};
pub use profile::{Profile, ProfilePatch};
pub use stats::{AnalysisWindow, BusinessAnalysis, BusinessSummary, DailyFigures, LevelShare, MemberStats};
