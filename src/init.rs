use std::str::FromStr;

use rand::Rng;
use salvo::affix_state;
use salvo::prelude::*;
use salvo::serve_static::StaticDir;
use salvo::session::{MemoryStore, SessionHandler};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};

use crate::{routes, seeder, AppState};

async fn init_database() -> anyhow::Result<Pool<Sqlite>> {
    let db_url = std::env::var("DATABASE_URL").expect("missing DATABASE_URL");

    tracing::info!("initializing database connection...");
    let opts = SqliteConnectOptions::from_str(&db_url)
        .expect("invalid DATABASE_URL")
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);
    let db = SqlitePoolOptions::new()
        .max_connections(20)
        .connect_with(opts)
        .await?;

    tracing::info!("running migrations...");
    sqlx::migrate!("./migrations").run(&db).await?;
    tracing::info!("finished running migrations!");

    Ok(db)
}

fn init_session() -> anyhow::Result<SessionHandler<MemoryStore>> {
    let secret = match std::env::var("SESSION_SECRET") {
        Ok(secret) => {
            anyhow::ensure!(
                secret.len() >= 64,
                "SESSION_SECRET must be at least 64 bytes"
            );
            secret.into_bytes()
        }
        Err(_) => {
            tracing::warn!("no SESSION_SECRET set. sessions will not survive a restart.");
            let mut secret = vec![0u8; 64];
            rand::thread_rng().fill(&mut secret[..]);
            secret
        }
    };

    Ok(SessionHandler::builder(MemoryStore::new(), &secret).build()?)
}

pub fn router(state: AppState, session: SessionHandler<MemoryStore>) -> Router {
    Router::new()
        .hoop(affix_state::inject(state))
        .hoop(session)
        .get(routes::home::index)
        .push(Router::with_path("studio/{id}").get(routes::studio::show))
        .push(Router::with_path("static/{**path}").get(StaticDir::new(["static"])))
}

pub async fn init() -> anyhow::Result<Service> {
    tracing::info!("initializing... please wait warmly.");

    let db = init_database().await?;
    seeder::seed(&db).await?;
    let session = init_session()?;

    Ok(Service::new(router(AppState { db }, session)))
}
