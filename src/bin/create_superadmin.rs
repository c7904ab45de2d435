use anyhow::Context;
use clap::Parser;
use esgconnect::auth::hash_password;
use esgconnect::config::Config;
use esgconnect::entities::Role;
use esgconnect::store::{self, accounts::NewAccount};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Creates the superadmin account, or promotes an existing account with the
/// same email. Superadmins cannot be created over HTTP.
#[derive(Parser, Debug)]
#[command(name = "create_superadmin")]
struct Args {
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    /// Falls back to SUPERADMIN_PASSWORD
    #[arg(long, env = "SUPERADMIN_PASSWORD")]
    password: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    let config = Config::from_env()?;
    let args = Args::parse();

    let db = store::connect(&config.database_url)
        .await
        .context("failed to connect to database")?;

    let password_hash = hash_password(&args.password)?;

    match store::accounts::find_by_email(&db, &args.email).await? {
        Some(existing) => {
            let account = store::accounts::promote(&db, existing, Role::Superadmin, password_hash).await?;
            info!(account = %account.id, "existing account promoted to superadmin");
        }
        None => {
            let account = store::accounts::create(
                &db,
                NewAccount {
                    name: args.name,
                    email: args.email,
                    password_hash,
                    role: Role::Superadmin,
                },
            )
            .await?;
            info!(account = %account.id, "superadmin created");
        }
    }

    Ok(())
}
