use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use validator::Validate;

use super::fields;
use crate::external::vika::{Fields, Record};

pub const ADMIN_USERNAME: &str = "admin";

pub mod field {
    pub const USERNAME: &str = "username";
    pub const POSTBOX: &str = "postbox";
    pub const PHONE: &str = "phonenumber";
    pub const DEPARTMENT: &str = "department";
    pub const PHOTO: &str = "photo";
}

/// Admin profile. The sheet's password column is never read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub record_id: String,
    pub username: String,
    pub postbox: Option<String>,
    pub phonenumber: Option<String>,
    pub department: Option<String>,
    /// Attachment cells as returned by the sheet
    #[schema(value_type = Option<Object>)]
    pub photo: Option<Value>,
}

impl Profile {
    pub fn from_record(record: &Record) -> Self {
        let f = &record.fields;
        Self {
            record_id: record.record_id.clone(),
            username: fields::text_or_default(f, field::USERNAME),
            postbox: fields::text(f, field::POSTBOX),
            phonenumber: fields::text(f, field::PHONE),
            department: fields::text(f, field::DEPARTMENT),
            photo: f.get(field::PHOTO).filter(|v| !v.is_null()).cloned(),
        }
    }
}

/// Editable profile fields. Unknown keys, a password included, are dropped
/// during deserialization.
#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePatch {
    #[validate(email(message = "Invalid email format"))]
    pub postbox: Option<String>,
    #[validate(length(max = 32, message = "Phone number is too long"))]
    pub phonenumber: Option<String>,
    pub department: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub photo: Option<Value>,
}

impl ProfilePatch {
    pub fn is_empty(&self) -> bool {
        self.to_fields().is_empty()
    }

    pub fn to_fields(&self) -> Fields {
        let mut f = Fields::new();
        fields::put_opt(&mut f, field::POSTBOX, self.postbox.as_deref());
        fields::put_opt(&mut f, field::PHONE, self.phonenumber.as_deref());
        fields::put_opt(&mut f, field::DEPARTMENT, self.department.as_deref());
        fields::put_opt(&mut f, field::PHOTO, self.photo.clone());
        f
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn password_column_is_never_exposed() {
        let record = Record {
            record_id: "recA".into(),
            created_at: None,
            updated_at: None,
            fields: json!({
                "username": "admin",
                "postbox": "admin@example.com",
                "login_password": "secret"
            })
            .as_object()
            .cloned()
            .unwrap(),
        };
        let profile = Profile::from_record(&record);
        let value = serde_json::to_value(&profile).unwrap();
        assert!(!value.to_string().contains("secret"));
        assert_eq!(profile.postbox.as_deref(), Some("admin@example.com"));
    }

    #[test]
    fn patch_drops_password_keys() {
        let patch: ProfilePatch =
            serde_json::from_value(json!({ "department": "Front desk", "login_password": "x" }))
                .unwrap();
        let f = patch.to_fields();
        assert_eq!(f.len(), 1);
        assert_eq!(f[field::DEPARTMENT], json!("Front desk"));
    }

    #[test]
    fn postbox_must_be_an_email() {
        let patch = ProfilePatch {
            postbox: Some("not-an-email".into()),
            ..Default::default()
        };
        assert!(patch.validate().is_err());
    }
}
