use salvo::prelude::*;
use sqlx::{Pool, Sqlite};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod error;
mod init;
mod models;
mod quotes;
mod routes;
mod seeder;

/// Shared application state, injected into every request's depot.
#[derive(Clone)]
pub struct AppState {
    pub db: Pool<Sqlite>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let service = init::init().await?;

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:5800".to_string());
    let acceptor = TcpListener::new(&bind_addr).bind().await;

    tracing::info!("finished initializing! listening on {}.", bind_addr);
    Server::new(acceptor).serve(service).await;

    Ok(())
}
