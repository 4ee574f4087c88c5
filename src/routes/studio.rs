//! Single-quote studio view: customize and export an image card.

use salvo::prelude::*;

use crate::error::AppError;
use crate::{quotes, AppState};

const STUDIO_SHELL: &str = include_str!("../../static/studio.html");

#[handler]
pub async fn show(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<(), AppError> {
    let state = depot.obtain::<AppState>().map_err(|_| AppError::State)?;
    let id = req.param::<i64>("id").ok_or(AppError::NotFound)?;

    let quote = quotes::get_quote(&state.db, id)
        .await?
        .ok_or(AppError::NotFound)?;

    if req.queries().contains_key("partial") {
        res.render(Json(quote));
    } else {
        res.render(Text::Html(STUDIO_SHELL));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use salvo::http::StatusCode;
    use salvo::session::{MemoryStore, SessionHandler};
    use salvo::test::{ResponseExt, TestClient};
    use salvo::Service;
    use sqlx::sqlite::SqlitePoolOptions;

    use super::*;
    use crate::models::quote::QuoteWithMoods;
    use crate::{init, seeder};

    async fn setup_service() -> Service {
        let db = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::migrate!("./migrations").run(&db).await.unwrap();
        seeder::seed_test_fixture(&db).await;

        let session = SessionHandler::builder(MemoryStore::new(), &[7u8; 64])
            .build()
            .unwrap();
        Service::new(init::router(AppState { db }, session))
    }

    #[tokio::test]
    async fn partial_fetch_returns_the_quote_with_moods() {
        let service = setup_service().await;

        let mut res = TestClient::get("http://127.0.0.1:5800/studio/1?partial=1")
            .send(&service)
            .await;
        assert_eq!(res.status_code, Some(StatusCode::OK));

        let quote: QuoteWithMoods = res.take_json().await.unwrap();
        assert_eq!(quote.quote.id, 1);
        assert!(!quote.quote.content.is_empty());
        assert!(!quote.moods.is_empty());
    }

    #[tokio::test]
    async fn full_navigation_serves_the_shell() {
        let service = setup_service().await;

        let mut res = TestClient::get("http://127.0.0.1:5800/studio/1")
            .send(&service)
            .await;
        assert_eq!(res.status_code, Some(StatusCode::OK));

        let body = res.take_string().await.unwrap();
        assert!(body.contains("<!doctype html>"));
    }

    #[tokio::test]
    async fn unknown_quote_is_not_found() {
        let service = setup_service().await;

        let res = TestClient::get("http://127.0.0.1:5800/studio/99999")
            .send(&service)
            .await;
        assert_eq!(res.status_code, Some(StatusCode::NOT_FOUND));
    }
}
