//! Browsing page controller: session-held pagination seed plus the listing
//! view-model.
//!
//! Incremental fetches from the client carry an explicit `partial` query
//! flag; any request without it is a full navigation and gets the HTML shell
//! (or a redirect stripping a stale `page` deep link).

use rand::Rng;
use salvo::prelude::*;
use salvo::session::SessionDepotExt;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::mood::Mood;
use crate::models::quote::QuoteWithMoods;
use crate::{quotes, AppState};

const HOME_SHELL: &str = include_str!("../../static/home.html");
const SEED_KEY: &str = "quote_seed";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Paginated {
    pub data: Vec<QuoteWithMoods>,
    pub current_page: i64,
    pub per_page: i64,
    pub total: i64,
    pub next_page_url: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HomeProps {
    pub quotes: Paginated,
    pub moods: Vec<Mood>,
    pub selected_mood: Option<String>,
}

#[handler]
pub async fn index(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<(), AppError> {
    let db = depot
        .obtain::<AppState>()
        .map_err(|_| AppError::State)?
        .db
        .clone();

    let partial = req.queries().contains_key("partial");
    let mood = req.query::<String>("mood").filter(|mood| !mood.is_empty());
    let page = req.query::<i64>("page").filter(|page| *page >= 1);

    if !partial {
        if page.is_some() {
            // A stale deep link must not resume mid-scroll against a seed it
            // no longer matches; restart the session at page one.
            let location = match &mood {
                Some(mood) => format!("/?mood={mood}"),
                None => "/".to_string(),
            };
            res.render(Redirect::other(location));
            return Ok(());
        }

        res.render(Text::Html(HOME_SHELL));
        return Ok(());
    }

    let session = depot.session_mut().ok_or(AppError::State)?;
    let seed = match page {
        Some(_) => session.get::<i64>(SEED_KEY),
        // No explicit page means a fresh browsing session: reroll.
        None => None,
    };
    let seed = match seed {
        Some(seed) => seed,
        None => {
            let fresh = rand::thread_rng().gen_range(1..=100);
            session.insert(SEED_KEY, fresh)?;
            fresh
        }
    };

    let page = page.unwrap_or(1);
    let listing = quotes::list_page(&db, mood.as_deref(), seed, page).await?;
    let moods = quotes::all_moods(&db).await?;

    let next_page_url = listing.has_next.then(|| match &mood {
        Some(mood) => format!("/?partial=1&page={}&mood={mood}", page + 1),
        None => format!("/?partial=1&page={}", page + 1),
    });

    res.render(Json(HomeProps {
        quotes: Paginated {
            data: listing.items,
            current_page: listing.page,
            per_page: quotes::PAGE_SIZE,
            total: listing.total,
            next_page_url,
        },
        moods,
        selected_mood: mood,
    }));

    Ok(())
}

#[cfg(test)]
mod tests {
    use salvo::http::header::{COOKIE, LOCATION, SET_COOKIE};
    use salvo::http::StatusCode;
    use salvo::session::{MemoryStore, SessionHandler};
    use salvo::test::{ResponseExt, TestClient};
    use salvo::{Response, Service};
    use sqlx::sqlite::SqlitePoolOptions;
    use sqlx::{Pool, Sqlite};

    use super::*;
    use crate::{init, seeder};

    async fn setup_service() -> Service {
        let db: Pool<Sqlite> = SqlitePoolOptions::new()
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

    fn session_cookie(res: &Response) -> String {
        res.headers()
            .get(SET_COOKIE)
            .expect("no session cookie set")
            .to_str()
            .unwrap()
            .split(';')
            .next()
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn full_navigation_serves_the_shell() {
        let service = setup_service().await;

        let mut res = TestClient::get("http://127.0.0.1:5800/").send(&service).await;
        assert_eq!(res.status_code, Some(StatusCode::OK));

        let body = res.take_string().await.unwrap();
        assert!(body.contains("<!doctype html>"));
    }

    #[tokio::test]
    async fn full_navigation_with_page_redirects_to_page_one() {
        let service = setup_service().await;

        let res = TestClient::get("http://127.0.0.1:5800/?page=3&mood=semangat")
            .send(&service)
            .await;

        assert_eq!(res.status_code, Some(StatusCode::SEE_OTHER));
        let location = res.headers().get(LOCATION).unwrap().to_str().unwrap();
        assert_eq!(location, "/?mood=semangat");
    }

    #[tokio::test]
    async fn partial_fetch_returns_the_view_model() {
        let service = setup_service().await;

        let mut res = TestClient::get("http://127.0.0.1:5800/?partial=1")
            .send(&service)
            .await;
        assert_eq!(res.status_code, Some(StatusCode::OK));

        let props: HomeProps = res.take_json().await.unwrap();
        assert_eq!(props.quotes.current_page, 1);
        assert_eq!(props.quotes.data.len(), 10);
        assert_eq!(props.moods.len(), 4);
        assert_eq!(props.selected_mood, None);
        let next = props.quotes.next_page_url.unwrap();
        assert!(next.contains("partial=1"));
        assert!(next.contains("page=2"));
    }

    #[tokio::test]
    async fn second_page_continues_the_first_without_repeats() {
        let service = setup_service().await;

        let mut res = TestClient::get("http://127.0.0.1:5800/?partial=1")
            .send(&service)
            .await;
        let cookie = session_cookie(&res);
        let first: HomeProps = res.take_json().await.unwrap();

        let mut res = TestClient::get("http://127.0.0.1:5800/?partial=1&page=2")
            .add_header(COOKIE, cookie.as_str(), true)
            .send(&service)
            .await;
        let second: HomeProps = res.take_json().await.unwrap();

        let first_ids: Vec<i64> = first.quotes.data.iter().map(|q| q.quote.id).collect();
        let second_ids: Vec<i64> = second.quotes.data.iter().map(|q| q.quote.id).collect();

        assert_eq!(second.quotes.current_page, 2);
        assert!(!second_ids.is_empty());
        assert!(first_ids.iter().all(|id| !second_ids.contains(id)));

        // Same session, same page: identical ordering.
        let mut res = TestClient::get("http://127.0.0.1:5800/?partial=1&page=2")
            .add_header(COOKIE, cookie.as_str(), true)
            .send(&service)
            .await;
        let replay: HomeProps = res.take_json().await.unwrap();
        let replay_ids: Vec<i64> = replay.quotes.data.iter().map(|q| q.quote.id).collect();
        assert_eq!(second_ids, replay_ids);
    }

    #[tokio::test]
    async fn huge_page_numbers_return_an_empty_page() {
        let service = setup_service().await;

        let mut res =
            TestClient::get("http://127.0.0.1:5800/?partial=1&page=9223372036854775807")
                .send(&service)
                .await;
        assert_eq!(res.status_code, Some(StatusCode::OK));

        let props: HomeProps = res.take_json().await.unwrap();
        assert!(props.quotes.data.is_empty());
        assert_eq!(props.quotes.next_page_url, None);
    }

    #[tokio::test]
    async fn mood_filter_only_returns_matching_quotes() {
        let service = setup_service().await;

        let mut res = TestClient::get("http://127.0.0.1:5800/?partial=1&mood=semangat")
            .send(&service)
            .await;
        let props: HomeProps = res.take_json().await.unwrap();

        assert_eq!(props.selected_mood.as_deref(), Some("semangat"));
        assert!(!props.quotes.data.is_empty());
        for quote in &props.quotes.data {
            assert!(quote.moods.iter().any(|m| m.slug == "semangat"));
        }
    }

    #[tokio::test]
    async fn unknown_mood_slug_is_an_empty_listing() {
        let service = setup_service().await;

        let mut res = TestClient::get("http://127.0.0.1:5800/?partial=1&mood=nope")
            .send(&service)
            .await;
        assert_eq!(res.status_code, Some(StatusCode::OK));

        let props: HomeProps = res.take_json().await.unwrap();
        assert!(props.quotes.data.is_empty());
        assert_eq!(props.quotes.total, 0);
        assert_eq!(props.quotes.next_page_url, None);
    }
}
