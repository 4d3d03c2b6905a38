//! Dashboard statistics handlers.

use axum::extract::State;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::STATS_TAG;
use crate::api::dto::AnalysisParams;
use crate::envelope::Envelope;
use crate::models::{BusinessAnalysis, MemberStats};
use crate::state::AppState;
use crate::utils::validate::ValidatedQuery;

pub fn stats_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(member_stats))
        .routes(routes!(business_analysis))
}

/// GET /api/stats - Member totals and level distribution
#[utoipa::path(
    get,
    path = "/",
    tag = STATS_TAG,
    responses(
        (status = 200, description = "Member statistics", body = Envelope<MemberStats>)
    )
)]
async fn member_stats(State(state): State<AppState>) -> Envelope<MemberStats> {
    state.services.stats.member_stats().await
}

/// GET /api/stats/business - Business figures for the last 7 or 30 days
#[utoipa::path(
    get,
    path = "/business",
    tag = STATS_TAG,
    params(AnalysisParams),
    responses(
        (status = 200, description = "Business analysis", body = Envelope<BusinessAnalysis>),
        (status = 400, description = "Unsupported window")
    )
)]
async fn business_analysis(
    State(state): State<AppState>,
    ValidatedQuery(params): ValidatedQuery<AnalysisParams>,
) -> Envelope<BusinessAnalysis> {
    state.services.stats.business_analysis(params.days).await
}
