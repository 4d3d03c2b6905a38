//! Recharge and consumption ledger handlers.

use axum::extract::State;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::LEDGER_TAG;
use crate::api::dto::{BatchDeleteRequest, BatchLedgerRequest, LedgerParams, RecentParams};
use crate::envelope::Envelope;
use crate::models::{LedgerEntry, NewLedgerEntry, RecentActivity};
use crate::state::AppState;
use crate::utils::validate::{RecordPath, ValidatedJson, ValidatedQuery};

pub fn ledger_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list_entries, create_entry))
        .routes(routes!(recent_activities))
        .routes(routes!(create_entries))
        .routes(routes!(delete_entry))
        .routes(routes!(delete_entries))
}

/// GET /api/ledger - Ledger entries, newest first
#[utoipa::path(
    get,
    path = "/",
    tag = LEDGER_TAG,
    params(LedgerParams),
    responses(
        (status = 200, description = "Ledger entries", body = Envelope<Vec<LedgerEntry>>)
    )
)]
async fn list_entries(
    State(state): State<AppState>,
    ValidatedQuery(params): ValidatedQuery<LedgerParams>,
) -> Envelope<Vec<LedgerEntry>> {
    state.services.ledger.list_entries(params.scope, params.phone).await
}

/// GET /api/ledger/recent - Newest activity for the dashboard
#[utoipa::path(
    get,
    path = "/recent",
    tag = LEDGER_TAG,
    params(RecentParams),
    responses(
        (status = 200, description = "Recent activities", body = Envelope<Vec<RecentActivity>>)
    )
)]
async fn recent_activities(
    State(state): State<AppState>,
    ValidatedQuery(params): ValidatedQuery<RecentParams>,
) -> Envelope<Vec<RecentActivity>> {
    state.services.ledger.recent_activities(params.limit).await
}

/// POST /api/ledger - Record one entry
#[utoipa::path(
    post,
    path = "/",
    tag = LEDGER_TAG,
    request_body = NewLedgerEntry,
    responses(
        (status = 200, description = "Entry created", body = Envelope<LedgerEntry>)
    )
)]
async fn create_entry(
    State(state): State<AppState>,
    ValidatedJson(entry): ValidatedJson<NewLedgerEntry>,
) -> Envelope<LedgerEntry> {
    state.services.ledger.create_entry(entry).await
}

/// POST /api/ledger/batch - Record several entries
#[utoipa::path(
    post,
    path = "/batch",
    tag = LEDGER_TAG,
    request_body = Vec<NewLedgerEntry>,
    responses(
        (status = 200, description = "Entries created", body = Envelope<Vec<LedgerEntry>>)
    )
)]
async fn create_entries(
    State(state): State<AppState>,
    ValidatedJson(BatchLedgerRequest(entries)): ValidatedJson<BatchLedgerRequest>,
) -> Envelope<Vec<LedgerEntry>> {
    state.services.ledger.create_entries(entries).await
}

/// DELETE /api/ledger/{id}
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = LEDGER_TAG,
    params(("id" = String, Path, description = "Ledger record id")),
    responses(
        (status = 200, description = "Entry deleted")
    )
)]
async fn delete_entry(
    State(state): State<AppState>,
    RecordPath(id): RecordPath<String>,
) -> Envelope<()> {
    state.services.ledger.delete_entry(&id).await
}

/// POST /api/ledger/batch-delete
#[utoipa::path(
    post,
    path = "/batch-delete",
    tag = LEDGER_TAG,
    request_body = BatchDeleteRequest,
    responses(
        (status = 200, description = "Number of entries deleted", body = Envelope<usize>)
    )
)]
async fn delete_entries(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<BatchDeleteRequest>,
) -> Envelope<usize> {
    state.services.ledger.delete_entries(req.record_ids).await
}
