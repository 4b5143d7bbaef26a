//! Update Profile Handler

use std::sync::Arc;

use salvo::{oapi::extract::JsonBody, prelude::*};
use tracing::info;

use crate::{
    extensions::*,
    state::State,
    users::{
        errors::into_status_error,
        models::{ProfileRequest, UserResponse},
    },
};

/// Update Profile Handler
///
/// Changes the caller's name or email. Fields left out or blank keep their
/// current value.
#[endpoint(
    tags("users"),
    summary = "Update Profile",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Profile updated"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Missing or invalid token"),
        (status_code = StatusCode::NOT_FOUND, description = "User not found"),
        (status_code = StatusCode::CONFLICT, description = "Email already in use"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<ProfileRequest>,
    depot: &mut Depot,
) -> Result<Json<UserResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.identity_or_401()?.user;

    let updated = state
        .app
        .users
        .update_profile(user, json.into_inner().into())
        .await
        .map_err(into_status_error)?;

    info!(user_uuid = %user, "updated profile");

    Ok(Json(updated.into()))
}
