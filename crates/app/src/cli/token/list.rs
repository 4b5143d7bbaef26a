use clap::Args;
use emporium_app::{auth::PgAuthRepository, database, domain::users::models::UserUuid};
use jiff::Timestamp;
use uuid::Uuid;

#[derive(Debug, Args)]
pub(crate) struct ListTokensArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// User whose tokens should be listed
    #[arg(long)]
    user_uuid: Uuid,
}

fn or_placeholder(value: Option<Timestamp>, placeholder: &str) -> String {
    value.map_or_else(|| placeholder.to_string(), |value| value.to_string())
}

pub(crate) async fn run(args: ListTokensArgs) -> Result<(), String> {
    let pool = database::connect(&args.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let tokens = PgAuthRepository::new(pool)
        .list_api_tokens_by_user(UserUuid::from_uuid(args.user_uuid))
        .await
        .map_err(|error| format!("failed to list tokens: {error}"))?;

    if tokens.is_empty() {
        println!("no tokens found for user {}", args.user_uuid);
        return Ok(());
    }

    for token in tokens {
        println!("token_uuid: {}", token.uuid);
        println!("token_version: {}", token.version.segment());
        println!("created_at: {}", token.created_at);
        println!("last_used_at: {}", or_placeholder(token.last_used_at, "never"));
        println!("expires_at: {}", or_placeholder(token.expires_at, "none"));
        println!("revoked_at: {}", or_placeholder(token.revoked_at, "active"));
        println!();
    }

    Ok(())
}
