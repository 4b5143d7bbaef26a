use clap::Args;
use emporium_app::{
    database::{self, Db},
    domain::users::{
        PgUsersService, UsersService, UsersServiceError,
        models::{NewUser, Role, UserUuid},
    },
};
use uuid::Uuid;

#[derive(Debug, Args)]
pub(crate) struct CreateUserArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// Display name
    #[arg(long)]
    name: String,

    /// Unique email address
    #[arg(long)]
    email: String,

    /// buyer, exporter or admin
    #[arg(long, default_value = "buyer")]
    role: Role,

    /// Optional user UUID; generated when omitted
    #[arg(long)]
    user_uuid: Option<Uuid>,
}

pub(crate) async fn run(args: CreateUserArgs) -> Result<(), String> {
    let pool = database::connect(&args.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let service = PgUsersService::new(Db::new(pool));

    let user = service
        .create_user(NewUser {
            uuid: args.user_uuid.map_or_else(UserUuid::new, UserUuid::from_uuid),
            name: args.name,
            email: args.email,
            role: args.role,
        })
        .await
        .map_err(|error| match error {
            UsersServiceError::AlreadyExists => "a user with that email already exists".to_string(),
            other => format!("failed to create user: {other}"),
        })?;

    println!("user_uuid: {}", user.uuid);
    println!("name: {}", user.name);
    println!("email: {}", user.email);
    println!("role: {}", user.role);

    Ok(())
}
