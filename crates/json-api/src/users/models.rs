//! User request and response bodies.

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use emporium_app::domain::users::models::{ExporterSummary, ProfileUpdate, User};

/// The caller's own account.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UserResponse {
    pub uuid: Uuid,
    pub name: String,
    pub email: String,

    /// `buyer`, `exporter` or `admin`
    pub role: String,

    pub created_at: String,
    pub updated_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            uuid: user.uuid.into(),
            name: user.name,
            email: user.email,
            role: user.role.as_str().to_string(),
            created_at: user.created_at.to_string(),
            updated_at: user.updated_at.to_string(),
        }
    }
}

/// A listed exporter.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ExporterResponse {
    pub uuid: Uuid,
    pub name: String,
}

impl From<ExporterSummary> for ExporterResponse {
    fn from(exporter: ExporterSummary) -> Self {
        Self {
            uuid: exporter.uuid.into(),
            name: exporter.name,
        }
    }
}

/// Profile changes. Missing or blank fields keep their current value.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub(crate) struct ProfileRequest {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub email: Option<String>,
}

impl From<ProfileRequest> for ProfileUpdate {
    fn from(request: ProfileRequest) -> Self {
        Self {
            name: request.name,
            email: request.email,
        }
    }
}
