//! Product catalogue handlers.

use axum::extract::State;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::PRODUCT_TAG;
use crate::api::dto::{BatchStockRequest, SearchParams};
use crate::envelope::Envelope;
use crate::models::{
    NewProduct, Product, ProductPatch, ProductStats, StatusChange, StockLevel, StockUpdate,
};
use crate::state::AppState;
use crate::utils::validate::{RecordPath, ValidatedJson, ValidatedQuery};

pub fn product_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list_products, create_product))
        .routes(routes!(product_stats))
        .routes(routes!(batch_update_stock))
        .routes(routes!(get_product, update_product, delete_product))
        .routes(routes!(update_inventory))
        .routes(routes!(update_status))
}

/// GET /api/products - List or search products
#[utoipa::path(
    get,
    path = "/",
    tag = PRODUCT_TAG,
    params(SearchParams),
    responses(
        (status = 200, description = "Products", body = Envelope<Vec<Product>>)
    )
)]
async fn list_products(
    State(state): State<AppState>,
    ValidatedQuery(params): ValidatedQuery<SearchParams>,
) -> Envelope<Vec<Product>> {
    state.services.products.list_products(params.q).await
}

/// GET /api/products/stats
#[utoipa::path(
    get,
    path = "/stats",
    tag = PRODUCT_TAG,
    responses(
        (status = 200, description = "Product statistics", body = Envelope<ProductStats>)
    )
)]
async fn product_stats(State(state): State<AppState>) -> Envelope<ProductStats> {
    state.services.products.product_stats().await
}

/// POST /api/products
#[utoipa::path(
    post,
    path = "/",
    tag = PRODUCT_TAG,
    request_body = NewProduct,
    responses(
        (status = 200, description = "Product created", body = Envelope<Product>),
        (status = 400, description = "Invalid request")
    )
)]
async fn create_product(
    State(state): State<AppState>,
    ValidatedJson(new_product): ValidatedJson<NewProduct>,
) -> Envelope<Product> {
    state.services.products.create_product(new_product).await
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = PRODUCT_TAG,
    params(("id" = String, Path, description = "Product record id")),
    responses(
        (status = 200, description = "Product found", body = Envelope<Product>),
        (status = 404, description = "Product not found")
    )
)]
async fn get_product(
    State(state): State<AppState>,
    RecordPath(id): RecordPath<String>,
) -> Envelope<Product> {
    state.services.products.get_product(&id).await
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = PRODUCT_TAG,
    params(("id" = String, Path, description = "Product record id")),
    request_body = ProductPatch,
    responses(
        (status = 200, description = "Product updated", body = Envelope<Product>)
    )
)]
async fn update_product(
    State(state): State<AppState>,
    RecordPath(id): RecordPath<String>,
    ValidatedJson(patch): ValidatedJson<ProductPatch>,
) -> Envelope<Product> {
    state.services.products.update_product(&id, patch).await
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = PRODUCT_TAG,
    params(("id" = String, Path, description = "Product record id")),
    responses(
        (status = 200, description = "Product deleted")
    )
)]
async fn delete_product(
    State(state): State<AppState>,
    RecordPath(id): RecordPath<String>,
) -> Envelope<()> {
    state.services.products.delete_product(&id).await
}

/// PUT /api/products/{id}/inventory - Set remaining quantity
#[utoipa::path(
    put,
    path = "/{id}/inventory",
    tag = PRODUCT_TAG,
    params(("id" = String, Path, description = "Product record id")),
    request_body = StockLevel,
    responses(
        (status = 200, description = "Stock updated", body = Envelope<Product>)
    )
)]
async fn update_inventory(
    State(state): State<AppState>,
    RecordPath(id): RecordPath<String>,
    ValidatedJson(level): ValidatedJson<StockLevel>,
) -> Envelope<Product> {
    state.services.products.update_inventory(&id, level).await
}

/// PUT /api/products/{id}/status - Put on or take off the shelf
#[utoipa::path(
    put,
    path = "/{id}/status",
    tag = PRODUCT_TAG,
    params(("id" = String, Path, description = "Product record id")),
    request_body = StatusChange,
    responses(
        (status = 200, description = "Status updated", body = Envelope<Product>)
    )
)]
async fn update_status(
    State(state): State<AppState>,
    RecordPath(id): RecordPath<String>,
    ValidatedJson(change): ValidatedJson<StatusChange>,
) -> Envelope<Product> {
    state.services.products.update_status(&id, change).await
}

/// POST /api/products/batch-stock - Set remaining quantities of several products
#[utoipa::path(
    post,
    path = "/batch-stock",
    tag = PRODUCT_TAG,
    request_body = Vec<StockUpdate>,
    responses(
        (status = 200, description = "Stock updated", body = Envelope<Vec<Product>>)
    )
)]
async fn batch_update_stock(
    State(state): State<AppState>,
    ValidatedJson(BatchStockRequest(updates)): ValidatedJson<BatchStockRequest>,
) -> Envelope<Vec<Product>> {
    state.services.products.batch_update_stock(updates).await
}
