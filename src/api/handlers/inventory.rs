//! Stock-take handlers.

use axum::extract::State;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::INVENTORY_TAG;
use crate::api::dto::{BatchDeleteRequest, SearchParams};
use crate::envelope::Envelope;
use crate::models::{InventoryAdjustment, InventoryRecord};
use crate::state::AppState;
use crate::utils::validate::{RecordPath, ValidatedJson, ValidatedQuery};

pub fn inventory_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list_records))
        .routes(routes!(adjust_inventory))
        .routes(routes!(delete_record))
        .routes(routes!(delete_records))
}

#[utoipa::path(
    get,
    path = "/",
    tag = INVENTORY_TAG,
    params(SearchParams),
    responses(
        (status = 200, description = "Stock-take records", body = Envelope<Vec<InventoryRecord>>)
    )
)]
async fn list_records(
    State(state): State<AppState>,
    ValidatedQuery(params): ValidatedQuery<SearchParams>,
) -> Envelope<Vec<InventoryRecord>> {
    state.services.inventory.list_records(params.q).await
}

/// POST /api/inventory/adjust - Record a stock-take and apply it
#[utoipa::path(
    post,
    path = "/adjust",
    tag = INVENTORY_TAG,
    request_body = InventoryAdjustment,
    responses(
        (status = 200, description = "Stock adjusted", body = Envelope<InventoryRecord>),
        (status = 404, description = "Product not found")
    )
)]
async fn adjust_inventory(
    State(state): State<AppState>,
    ValidatedJson(adjustment): ValidatedJson<InventoryAdjustment>,
) -> Envelope<InventoryRecord> {
    state.services.inventory.adjust_inventory(adjustment).await
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = INVENTORY_TAG,
    params(("id" = String, Path, description = "Stock-take record id")),
    responses(
        (status = 200, description = "Record deleted")
    )
)]
async fn delete_record(
    State(state): State<AppState>,
    RecordPath(id): RecordPath<String>,
) -> Envelope<()> {
    state.services.inventory.delete_record(&id).await
}

#[utoipa::path(
    post,
    path = "/batch-delete",
    tag = INVENTORY_TAG,
    request_body = BatchDeleteRequest,
    responses(
        (status = 200, description = "Number of records deleted", body = Envelope<usize>)
    )
)]
async fn delete_records(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<BatchDeleteRequest>,
) -> Envelope<usize> {
    state.services.inventory.delete_records(req.record_ids).await
}
