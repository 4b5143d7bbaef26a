//! Users service.

use async_trait::async_trait;
use mockall::automock;
use tracing::info;

use crate::{
    database::Db,
    domain::users::{
        errors::UsersServiceError,
        models::{ExporterSummary, NewUser, ProfileUpdate, User, UserUuid},
        repository::PgUsersRepository,
    },
};

#[derive(Debug, Clone)]
pub struct PgUsersService {
    db: Db,
    repository: PgUsersRepository,
}

impl PgUsersService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgUsersRepository::new(),
        }
    }
}

#[async_trait]
impl UsersService for PgUsersService {
    async fn create_user(&self, user: NewUser) -> Result<User, UsersServiceError> {
        if user.name.trim().is_empty() || user.email.trim().is_empty() {
            return Err(UsersServiceError::MissingRequiredData);
        }

        let mut tx = self.db.begin().await?;

        let created = self.repository.create_user(&mut tx, &user).await?;

        tx.commit().await?;

        Ok(created)
    }

    async fn get_user(&self, user: UserUuid) -> Result<User, UsersServiceError> {
        let mut tx = self.db.begin().await?;

        let user = self
            .repository
            .find_user(&mut tx, user)
            .await?
            .ok_or(UsersServiceError::NotFound)?;

        tx.commit().await?;

        Ok(user)
    }

    async fn list_exporters(&self) -> Result<Vec<ExporterSummary>, UsersServiceError> {
        let mut tx = self.db.begin().await?;

        let exporters = self.repository.list_exporters(&mut tx).await?;

        tx.commit().await?;

        Ok(exporters)
    }

    async fn update_profile(
        &self,
        user: UserUuid,
        update: ProfileUpdate,
    ) -> Result<User, UsersServiceError> {
        let update = update.normalized();

        let mut tx = self.db.begin().await?;

        let updated = self
            .repository
            .update_profile(&mut tx, user, &update)
            .await?
            .ok_or(UsersServiceError::NotFound)?;

        tx.commit().await?;

        info!(
            user = %user,
            name_changed = update.name.is_some(),
            email_changed = update.email.is_some(),
            "profile updated"
        );

        Ok(updated)
    }
}

#[automock]
#[async_trait]
pub trait UsersService: Send + Sync {
    /// Register a user with the given role.
    async fn create_user(&self, user: NewUser) -> Result<User, UsersServiceError>;

    /// Retrieve a single user.
    async fn get_user(&self, user: UserUuid) -> Result<User, UsersServiceError>;

    /// Every exporter, by name.
    async fn list_exporters(&self) -> Result<Vec<ExporterSummary>, UsersServiceError>;

    /// Change the user's own name or email. Blank fields are left as they are.
    async fn update_profile(
        &self,
        user: UserUuid,
        update: ProfileUpdate,
    ) -> Result<User, UsersServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{domain::users::models::Role, test::TestContext};

    use super::*;

    #[tokio::test]
    async fn create_user_then_get_returns_it() -> TestResult {
        let ctx = TestContext::new().await;
        let uuid = UserUuid::new();

        ctx.users
            .create_user(NewUser {
                uuid,
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
                role: Role::Exporter,
            })
            .await?;

        let user = ctx.users.get_user(uuid).await?;

        assert_eq!(user.email, "ada@example.com");
        assert_eq!(user.role, Role::Exporter);

        Ok(())
    }

    #[tokio::test]
    async fn duplicate_email_returns_already_exists() -> TestResult {
        let ctx = TestContext::new().await;

        let new_user = |uuid| NewUser {
            uuid,
            name: "Grace".to_string(),
            email: "grace@example.com".to_string(),
            role: Role::Buyer,
        };

        ctx.users.create_user(new_user(UserUuid::new())).await?;

        let result = ctx.users.create_user(new_user(UserUuid::new())).await;

        assert!(
            matches!(result, Err(UsersServiceError::AlreadyExists)),
            "expected AlreadyExists, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn get_unknown_user_returns_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx.users.get_user(UserUuid::new()).await;

        assert!(
            matches!(result, Err(UsersServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }

    fn user(name: &str, email: &str, role: Role) -> NewUser {
        NewUser {
            uuid: UserUuid::new(),
            name: name.to_string(),
            email: email.to_string(),
            role,
        }
    }

    #[tokio::test]
    async fn exporters_are_listed_by_name_without_buyers() -> TestResult {
        let ctx = TestContext::new().await;

        let zed = ctx
            .users
            .create_user(user("Zed Imports", "zed@example.com", Role::Exporter))
            .await?;
        let ada = ctx
            .users
            .create_user(user("Ada Exports", "ada@example.com", Role::Exporter))
            .await?;
        ctx.users
            .create_user(user("Bob", "bob@example.com", Role::Buyer))
            .await?;

        let exporters = ctx.users.list_exporters().await?;

        assert_eq!(
            exporters,
            vec![
                ExporterSummary {
                    uuid: ada.uuid,
                    name: "Ada Exports".to_string(),
                },
                ExporterSummary {
                    uuid: zed.uuid,
                    name: "Zed Imports".to_string(),
                },
            ]
        );

        Ok(())
    }

    #[tokio::test]
    async fn update_profile_changes_only_given_fields() -> TestResult {
        let ctx = TestContext::new().await;

        let created = ctx
            .users
            .create_user(user("Ada", "ada@example.com", Role::Buyer))
            .await?;

        let updated = ctx
            .users
            .update_profile(
                created.uuid,
                ProfileUpdate {
                    name: Some("Ada Lovelace".to_string()),
                    email: Some("   ".to_string()),
                },
            )
            .await?;

        assert_eq!(updated.name, "Ada Lovelace");
        assert_eq!(updated.email, "ada@example.com");
        assert_eq!(updated.role, Role::Buyer);

        Ok(())
    }

    #[tokio::test]
    async fn update_profile_to_taken_email_returns_already_exists() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.users
            .create_user(user("Grace", "grace@example.com", Role::Buyer))
            .await?;
        let ada = ctx
            .users
            .create_user(user("Ada", "ada@example.com", Role::Buyer))
            .await?;

        let result = ctx
            .users
            .update_profile(
                ada.uuid,
                ProfileUpdate {
                    name: None,
                    email: Some("grace@example.com".to_string()),
                },
            )
            .await;

        assert!(
            matches!(result, Err(UsersServiceError::AlreadyExists)),
            "expected AlreadyExists, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn update_profile_of_unknown_user_returns_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx
            .users
            .update_profile(UserUuid::new(), ProfileUpdate::default())
            .await;

        assert!(
            matches!(result, Err(UsersServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }
}
