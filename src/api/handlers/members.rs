//! Member request handlers.

use axum::extract::State;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::MEMBER_TAG;
use crate::api::dto::MemberQueryParams;
use crate::envelope::Envelope;
use crate::models::{
    Consume, ConsumeOutcome, Member, MemberPatch, NewMember, Recharge, RechargeOutcome,
};
use crate::state::AppState;
use crate::utils::validate::{RecordPath, ValidatedJson, ValidatedQuery};

/// Creates member-related routes.
pub fn member_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(query_members, create_member))
        .routes(routes!(list_all_members))
        .routes(routes!(get_member, update_member, delete_member))
        .routes(routes!(recharge_member))
        .routes(routes!(consume_member))
}

/// GET /api/members - One page of members
#[utoipa::path(
    get,
    path = "/",
    tag = MEMBER_TAG,
    params(MemberQueryParams),
    responses(
        (status = 200, description = "Members", body = Envelope<Vec<Member>>),
        (status = 429, description = "Rate limited by the spreadsheet service")
    )
)]
async fn query_members(
    State(state): State<AppState>,
    ValidatedQuery(params): ValidatedQuery<MemberQueryParams>,
) -> Envelope<Vec<Member>> {
    state
        .services
        .members
        .query_members(params.view_id, params.filter_by_formula, params.max_records)
        .await
}

/// GET /api/members/all - Every member across all pages
#[utoipa::path(
    get,
    path = "/all",
    tag = MEMBER_TAG,
    responses(
        (status = 200, description = "All members", body = Envelope<Vec<Member>>)
    )
)]
async fn list_all_members(State(state): State<AppState>) -> Envelope<Vec<Member>> {
    state.services.members.list_all_members().await
}

/// GET /api/members/{id} - Get member by record id
#[utoipa::path(
    get,
    path = "/{id}",
    tag = MEMBER_TAG,
    params(("id" = String, Path, description = "Member record id")),
    responses(
        (status = 200, description = "Member found", body = Envelope<Member>),
        (status = 404, description = "Member not found")
    )
)]
async fn get_member(
    State(state): State<AppState>,
    RecordPath(id): RecordPath<String>,
) -> Envelope<Member> {
    state.services.members.get_member(&id).await
}

/// POST /api/members - Create a member
#[utoipa::path(
    post,
    path = "/",
    tag = MEMBER_TAG,
    request_body = NewMember,
    responses(
        (status = 200, description = "Member created", body = Envelope<Member>),
        (status = 400, description = "Invalid request"),
        (status = 409, description = "Phone number already registered")
    )
)]
async fn create_member(
    State(state): State<AppState>,
    ValidatedJson(new_member): ValidatedJson<NewMember>,
) -> Envelope<Member> {
    state.services.members.create_member(new_member).await
}

/// PUT /api/members/{id} - Update a member
#[utoipa::path(
    put,
    path = "/{id}",
    tag = MEMBER_TAG,
    params(("id" = String, Path, description = "Member record id")),
    request_body = MemberPatch,
    responses(
        (status = 200, description = "Member updated", body = Envelope<Member>),
        (status = 409, description = "Phone number already registered")
    )
)]
async fn update_member(
    State(state): State<AppState>,
    RecordPath(id): RecordPath<String>,
    ValidatedJson(patch): ValidatedJson<MemberPatch>,
) -> Envelope<Member> {
    state.services.members.update_member(&id, patch).await
}

/// DELETE /api/members/{id} - Delete a member
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = MEMBER_TAG,
    params(("id" = String, Path, description = "Member record id")),
    responses(
        (status = 200, description = "Member deleted")
    )
)]
async fn delete_member(
    State(state): State<AppState>,
    RecordPath(id): RecordPath<String>,
) -> Envelope<()> {
    state.services.members.delete_member(&id).await
}

/// POST /api/members/{id}/recharge - Add to a member's balance
#[utoipa::path(
    post,
    path = "/{id}/recharge",
    tag = MEMBER_TAG,
    params(("id" = String, Path, description = "Member record id")),
    request_body = Recharge,
    responses(
        (status = 200, description = "Balance recharged", body = Envelope<RechargeOutcome>)
    )
)]
async fn recharge_member(
    State(state): State<AppState>,
    RecordPath(id): RecordPath<String>,
    ValidatedJson(recharge): ValidatedJson<Recharge>,
) -> Envelope<RechargeOutcome> {
    state.services.members.recharge_member(&id, recharge).await
}

/// POST /api/members/{id}/consume - Spend from a member's balance
#[utoipa::path(
    post,
    path = "/{id}/consume",
    tag = MEMBER_TAG,
    params(("id" = String, Path, description = "Member record id")),
    request_body = Consume,
    responses(
        (status = 200, description = "Consumption recorded", body = Envelope<ConsumeOutcome>),
        (status = 400, description = "Insufficient balance")
    )
)]
async fn consume_member(
    State(state): State<AppState>,
    RecordPath(id): RecordPath<String>,
    ValidatedJson(consume): ValidatedJson<Consume>,
) -> Envelope<ConsumeOutcome> {
    state.services.members.consume_member(&id, consume).await
}
