//! Current User Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    extensions::*,
    state::State,
    users::{errors::into_status_error, models::UserResponse},
};

/// Current User Handler
#[endpoint(
    tags("users"),
    summary = "Get Current User",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "The caller's account"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Missing or invalid token"),
        (status_code = StatusCode::NOT_FOUND, description = "User not found"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<UserResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.identity_or_401()?.user;

    let user = state
        .app
        .users
        .get_user(user)
        .await
        .map_err(into_status_error)?;

    Ok(Json(user.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use emporium_app::domain::users::UsersServiceError;

    use crate::test_helpers::{Mocks, TEST_USER_UUID, buyer_service, make_user, public_service};

    use super::*;

    fn route() -> Router {
        Router::with_path("users/me").get(handler)
    }

    #[tokio::test]
    async fn test_returns_the_callers_account() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .users
            .expect_get_user()
            .once()
            .withf(|user| *user == TEST_USER_UUID)
            .return_once(|user| Ok(make_user(user, "Ada", "ada@example.com")));

        let mut res = TestClient::get("http://example.com/users/me")
            .send(&buyer_service(mocks, route()))
            .await;

        let body: UserResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.uuid, TEST_USER_UUID.into_uuid());
        assert_eq!(body.email, "ada@example.com");
        assert_eq!(body.role, "buyer");

        Ok(())
    }

    #[tokio::test]
    async fn test_deleted_account_returns_404() -> TestResult {
        let mut mocks = Mocks::default();

        mocks
            .users
            .expect_get_user()
            .once()
            .return_once(|_| Err(UsersServiceError::NotFound));

        let res = TestClient::get("http://example.com/users/me")
            .send(&buyer_service(mocks, route()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));

        Ok(())
    }

    #[tokio::test]
    async fn test_anonymous_caller_returns_401() -> TestResult {
        let mut mocks = Mocks::default();

        mocks.users.expect_get_user().never();

        let res = TestClient::get("http://example.com/users/me")
            .send(&public_service(mocks, route()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));

        Ok(())
    }
}
