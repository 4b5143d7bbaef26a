//! Depot helper extensions.

use std::any::Any;

use salvo::prelude::{Depot, StatusError};
use uuid::Uuid;

use emporium_app::{auth::Identity, domain::users::models::UserUuid};

/// Helpers for mapping depot extraction failures to HTTP errors.
pub(crate) trait DepotExt {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError>;

    fn insert_identity(&mut self, identity: Identity);

    fn identity_or_401(&self) -> Result<Identity, StatusError>;

    /// The caller, when they may manage a catalog.
    fn seller_or_403(&self) -> Result<UserUuid, StatusError>;

    /// The caller, when `path_user` names them.
    fn own_user_or_403(&self, path_user: Uuid) -> Result<UserUuid, StatusError>;
}

impl DepotExt for Depot {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError> {
        self.obtain::<T>()
            .map_err(|_ignored| StatusError::internal_server_error())
    }

    fn insert_identity(&mut self, identity: Identity) {
        self.inject(identity);
    }

    fn identity_or_401(&self) -> Result<Identity, StatusError> {
        self.obtain::<Identity>()
            .copied()
            .map_err(|_ignored| StatusError::unauthorized())
    }

    fn seller_or_403(&self) -> Result<UserUuid, StatusError> {
        let identity = self.identity_or_401()?;

        if !identity.role.can_sell() {
            return Err(StatusError::forbidden().brief("Exporter access required"));
        }

        Ok(identity.user)
    }

    fn own_user_or_403(&self, path_user: Uuid) -> Result<UserUuid, StatusError> {
        let identity = self.identity_or_401()?;

        if identity.user.into_uuid() != path_user {
            return Err(StatusError::forbidden().brief("Cannot access another user's cart"));
        }

        Ok(identity.user)
    }
}

#[cfg(test)]
mod tests {
    use emporium_app::domain::users::models::Role;

    use super::*;

    fn depot_with(role: Role) -> (Depot, UserUuid) {
        let user = UserUuid::new();
        let mut depot = Depot::new();

        depot.insert_identity(Identity { user, role });

        (depot, user)
    }

    #[test]
    fn missing_identity_is_unauthorized() {
        let depot = Depot::new();

        assert!(depot.identity_or_401().is_err());
        assert!(depot.seller_or_403().is_err());
    }

    #[test]
    fn buyers_are_not_sellers() {
        let (buyer, _) = depot_with(Role::Buyer);
        let (exporter, exporter_uuid) = depot_with(Role::Exporter);

        assert!(buyer.seller_or_403().is_err());
        assert_eq!(exporter.seller_or_403().ok(), Some(exporter_uuid));
    }

    #[test]
    fn path_user_must_be_the_caller() {
        let (depot, user) = depot_with(Role::Buyer);

        assert_eq!(depot.own_user_or_403(user.into_uuid()).ok(), Some(user));
        assert!(depot.own_user_or_403(Uuid::now_v7()).is_err());
    }
}
