use utoipa::OpenApi;

pub const HEALTH_TAG: &str = "Health";
pub const MEMBER_TAG: &str = "Members";
pub const STATS_TAG: &str = "Statistics";
pub const LEDGER_TAG: &str = "Ledger";
pub const PRODUCT_TAG: &str = "Products";
pub const INVENTORY_TAG: &str = "Inventory";
pub const PROFILE_TAG: &str = "Profile";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "pos-rs",
        description = "Point-of-sale and membership back office over Vika datasheets",
    ),
    components(
        schemas(
            crate::envelope::ErrorCode,
            crate::models::LedgerScope,
        )
    ),
    tags(
        (name = HEALTH_TAG, description = "Health check endpoints"),
        (name = MEMBER_TAG, description = "Member management and balance movements"),
        (name = STATS_TAG, description = "Member statistics and business analysis"),
        (name = LEDGER_TAG, description = "Recharge and consumption records"),
        (name = PRODUCT_TAG, description = "Product catalogue and stock levels"),
        (name = INVENTORY_TAG, description = "Stock-take records"),
        (name = PROFILE_TAG, description = "Admin profile"),
    )
)]
pub struct ApiDoc;
