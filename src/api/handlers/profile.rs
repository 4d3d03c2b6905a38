use axum::extract::State;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::PROFILE_TAG;
use crate::envelope::Envelope;
use crate::models::{Profile, ProfilePatch};
use crate::state::AppState;
use crate::utils::validate::ValidatedJson;

pub fn profile_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(get_profile, update_profile))
}

/// GET /api/profile - The admin profile
#[utoipa::path(
    get,
    path = "/",
    tag = PROFILE_TAG,
    responses(
        (status = 200, description = "Admin profile", body = Envelope<Profile>),
        (status = 404, description = "No admin row")
    )
)]
async fn get_profile(State(state): State<AppState>) -> Envelope<Profile> {
    state.services.profile.get_profile().await
}

/// PUT /api/profile - Update contact details and photo
#[utoipa::path(
    put,
    path = "/",
    tag = PROFILE_TAG,
    request_body = ProfilePatch,
    responses(
        (status = 200, description = "Profile updated", body = Envelope<Profile>)
    )
)]
async fn update_profile(
    State(state): State<AppState>,
    ValidatedJson(patch): ValidatedJson<ProfilePatch>,
) -> Envelope<Profile> {
    state.services.profile.update_profile(patch).await
}
