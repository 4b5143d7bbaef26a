//! Bearer token gate for authenticated routes.

use std::sync::Arc;

use emporium_app::auth::{AuthServiceError, Identity};
use salvo::{http::header::AUTHORIZATION, prelude::*};
use tracing::error;

use crate::{extensions::*, state::State};

/// Resolve the bearer token to an identity for the handlers below, or stop
/// the chain with 401.
#[salvo::handler]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    match authenticate(req, depot).await {
        Ok(identity) => {
            depot.insert_identity(identity);

            ctrl.call_next(req, depot, res).await;
        }
        Err(status) => {
            res.render(status);
            ctrl.skip_rest();
        }
    }
}

async fn authenticate(req: &Request, depot: &Depot) -> Result<Identity, StatusError> {
    let token = bearer_token(req).ok_or_else(|| {
        StatusError::unauthorized().brief("Missing or invalid Authorization header")
    })?;

    let state = depot.obtain_or_500::<Arc<State>>()?;

    state
        .app
        .auth
        .authenticate_bearer(token)
        .await
        .map_err(into_status_error)
}

fn into_status_error(error: AuthServiceError) -> StatusError {
    match error {
        // A token whose owner was deleted is as good as unknown.
        AuthServiceError::NotFound
        | AuthServiceError::UserNotFound
        | AuthServiceError::Token(_) => StatusError::unauthorized().brief("Invalid API token"),
        AuthServiceError::OpenBao(source) => {
            error!("token verifier unavailable: {source}");

            StatusError::internal_server_error()
        }
        AuthServiceError::Sql(source) => {
            error!("failed to look up api token: {source}");

            StatusError::internal_server_error()
        }
    }
}

fn bearer_token(req: &Request) -> Option<&str> {
    let (scheme, token) = req
        .headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .split_once(' ')?;

    let token = token.trim();

    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
