//! Cart Handlers
//!
//! Every operation exists twice: for the signed in user, addressed by their
//! own `{user_id}`, and for a guest, addressed by the session id their browser holds.

use salvo::prelude::{Depot, StatusError};
use uuid::Uuid;

use emporium_app::domain::carts::models::{CartOwner, GuestSessionId};

use crate::extensions::*;

pub(crate) mod add;
pub(crate) mod apply_promo;
pub(crate) mod clear;
pub(crate) mod count;
pub(crate) mod get;
pub(crate) mod remove;
pub(crate) mod update;

/// The caller's own cart, refusing a path naming anyone else.
pub(crate) fn user_owner(depot: &Depot, path_user: Uuid) -> Result<CartOwner, StatusError> {
    depot.own_user_or_403(path_user).map(CartOwner::User)
}

pub(crate) fn guest_owner(session: String) -> Result<CartOwner, StatusError> {
    GuestSessionId::new(session)
        .map(CartOwner::Guest)
        .map_err(|_ignored| StatusError::bad_request().brief("Invalid guest session id"))
}
