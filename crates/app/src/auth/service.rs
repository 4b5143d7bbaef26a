//! Auth service.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    auth::{
        ApiTokenMetadata, ApiTokenSecret, ApiTokenVersion, AuthServiceError, Identity,
        IssuedApiToken, ParsedApiToken, models::NewApiToken, openbao::OpenBaoClient,
        repository::PgAuthRepository,
    },
    database::Db,
    domain::users::models::UserUuid,
};

#[derive(Debug, Clone)]
pub struct PgAuthService {
    repository: PgAuthRepository,
    openbao: OpenBaoClient,
}

impl PgAuthService {
    #[must_use]
    pub fn new(db: &Db, openbao: OpenBaoClient) -> Self {
        Self {
            repository: PgAuthRepository::new(db.pool().clone()),
            openbao,
        }
    }

    /// Issue a new token for `user`. The raw token is only available in the result.
    ///
    /// # Errors
    ///
    /// Returns [`AuthServiceError::UserNotFound`] for an unknown user, or an error
    /// if the HMAC or insert fails.
    pub async fn issue_api_token(
        &self,
        user: UserUuid,
        expires_at: Option<Timestamp>,
    ) -> Result<IssuedApiToken, AuthServiceError> {
        let parsed = ParsedApiToken {
            token_uuid: Uuid::now_v7(),
            version: ApiTokenVersion::V1,
            secret: ApiTokenSecret::generate(),
        };

        let token_hash = self.openbao.hmac(&parsed.verifier_input(user)).await?;

        let metadata = self
            .repository
            .create_api_token(&NewApiToken {
                uuid: parsed.token_uuid,
                user,
                version: parsed.version,
                token_hash,
                expires_at,
            })
            .await?;

        Ok(IssuedApiToken {
            token: parsed.format(),
            metadata,
        })
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_api_tokens(
        &self,
        user: UserUuid,
    ) -> Result<Vec<ApiTokenMetadata>, AuthServiceError> {
        Ok(self.repository.list_api_tokens_by_user(user).await?)
    }

    /// Revoke a token. `true` when it was still active.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub async fn revoke_api_token(&self, token_uuid: Uuid) -> Result<bool, AuthServiceError> {
        Ok(self
            .repository
            .revoke_api_token(token_uuid)
            .await?
            .is_some())
    }
}

#[async_trait]
impl AuthService for PgAuthService {
    async fn authenticate_bearer(&self, bearer_token: &str) -> Result<Identity, AuthServiceError> {
        let parsed: ParsedApiToken = bearer_token.parse().map_err(|error| {
            debug!("rejected malformed bearer token: {error}");

            AuthServiceError::NotFound
        })?;

        let token = self
            .repository
            .find_active_api_token(parsed.token_uuid, parsed.version)
            .await?
            .ok_or(AuthServiceError::NotFound)?;

        let valid = self
            .openbao
            .verify(&parsed.verifier_input(token.user), &token.token_hash)
            .await?;

        if !valid {
            return Err(AuthServiceError::NotFound);
        }

        if let Err(error) = self.repository.touch_api_token(parsed.token_uuid).await {
            warn!(token = %parsed.token_uuid, "failed to record token use: {error}");
        }

        Ok(Identity {
            user: token.user,
            role: token.role,
        })
    }
}

#[automock]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Resolve a raw bearer token to the calling user.
    async fn authenticate_bearer(&self, bearer_token: &str) -> Result<Identity, AuthServiceError>;
}
