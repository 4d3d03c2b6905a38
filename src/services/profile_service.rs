use validator::Validate;

use crate::envelope::Envelope;
use crate::error::{AppError, AppResult};
use crate::models::profile::ADMIN_USERNAME;
use crate::models::{Profile, ProfilePatch};
use crate::repositories::ProfileRepository;

/// The admin profile row.
#[derive(Clone)]
pub struct ProfileService {
    profiles: ProfileRepository,
}

impl ProfileService {
    pub fn new(profiles: ProfileRepository) -> Self {
        Self { profiles }
    }

    pub async fn get_profile(&self) -> Envelope<Profile> {
        Envelope::from_result(self.find_admin().await, "Profile retrieved")
    }

    /// Updates contact details and photo. The password is never written.
    pub async fn update_profile(&self, patch: ProfilePatch) -> Envelope<Profile> {
        let result: AppResult<_> = async {
            patch.validate()?;
            if patch.is_empty() {
                return Err(AppError::validation("body", "No fields to update"));
            }
            let admin = self.find_admin().await?;
            self.profiles.update(&admin.record_id, patch.to_fields()).await
        }
        .await;
        Envelope::from_result(result, "Profile updated")
    }

    async fn find_admin(&self) -> AppResult<Profile> {
        self.profiles
            .find_by_username(ADMIN_USERNAME)
            .await?
            .ok_or_else(|| AppError::not_found("profile", "username", ADMIN_USERNAME))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use crate::envelope::ErrorCode;
    use crate::external::vika::fake::FakeTransport;
    use crate::models::ProfilePatch;
    use crate::services::tests::services;

    #[tokio::test]
    async fn update_leaves_password_column_alone() {
        let transport = Arc::new(FakeTransport::new());
        let id = transport.seed(
            "dstProfile",
            json!({ "username": "admin", "postbox": "old@example.com", "password": "keep" }),
        );
        let services = services(Arc::clone(&transport));

        let patch = ProfilePatch {
            postbox: Some("new@example.com".into()),
            ..Default::default()
        };
        let profile = services.profile.update_profile(patch).await.data.unwrap();

        assert_eq!(profile.postbox.as_deref(), Some("new@example.com"));
        let stored = transport.record("dstProfile", &id).unwrap();
        assert_eq!(stored.fields["password"], json!("keep"));
    }

    #[tokio::test]
    async fn invalid_email_is_rejected() {
        let transport = Arc::new(FakeTransport::new());
        let services = services(Arc::clone(&transport));

        let patch = ProfilePatch {
            postbox: Some("not-an-email".into()),
            ..Default::default()
        };
        let envelope = services.profile.update_profile(patch).await;

        assert_eq!(envelope.error_code, Some(ErrorCode::Validation));
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn missing_admin_row_is_not_found() {
        let transport = Arc::new(FakeTransport::new());
        transport.seed("dstProfile", json!({ "username": "clerk" }));
        let services = services(transport);

        let envelope = services.profile.get_profile().await;

        assert_eq!(envelope.error_code, Some(ErrorCode::NotFound));
    }
}
