//! Quote listing with seeded, deterministic pseudo-random ordering.
//!
//! Ordering is a pure function of (quote id, seed), so repeated page requests
//! under one seed always see the same total order regardless of the storage
//! engine underneath.

use std::collections::HashMap;

use sqlx::{FromRow, Pool, QueryBuilder, Sqlite};

use crate::models::mood::Mood;
use crate::models::quote::{Quote, QuoteWithMoods};

pub const PAGE_SIZE: i64 = 10;

#[derive(Clone, Debug)]
pub struct QuotePage {
    pub items: Vec<QuoteWithMoods>,
    pub total: i64,
    pub page: i64,
    pub has_next: bool,
}

/// Sort key for a quote under a given seed. splitmix64 finalizer; bijective
/// per seed, so distinct ids never collide and no tie-break is needed.
fn ordering_key(quote_id: i64, seed: i64) -> u64 {
    let mut x = (quote_id as u64) ^ (seed as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15);
    x = (x ^ (x >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    x ^ (x >> 31)
}

/// Returns one page of quotes under the given mood filter and seed, moods
/// eagerly attached. An unknown slug simply matches nothing. Pure read, no
/// side effects.
pub async fn list_page(
    db: &Pool<Sqlite>,
    mood: Option<&str>,
    seed: i64,
    page: i64,
) -> Result<QuotePage, sqlx::Error> {
    let page = page.max(1);

    let mut ids: Vec<i64> = match mood {
        Some(slug) => sqlx::query_scalar(
            r#"
                SELECT DISTINCT
                    q.id
                FROM quotes q
                JOIN mood_quote mq ON mq.quote_id = q.id
                JOIN moods m ON m.id = mq.mood_id
                WHERE m.slug = $1;
            "#,
        )
        .bind(slug)
        .fetch_all(db)
        .await
        .inspect_err(|e| {
            tracing::error!(err = ?e, slug = %slug, "an error occurred when fetching filtered quote ids");
        })?,
        None => sqlx::query_scalar("SELECT id FROM quotes;")
            .fetch_all(db)
            .await
            .inspect_err(
                |e| tracing::error!(err = ?e, "an error occurred when fetching quote ids"),
            )?,
    };

    ids.sort_by_key(|id| ordering_key(*id, seed));

    let total = ids.len() as i64;
    // Saturate: `page` comes straight from a query parameter and may be
    // arbitrarily large.
    let has_next = total > page.saturating_mul(PAGE_SIZE);
    let start = (page - 1).saturating_mul(PAGE_SIZE) as usize;
    let slice: Vec<i64> = ids.into_iter().skip(start).take(PAGE_SIZE as usize).collect();

    let items = fetch_with_moods(db, &slice).await?;

    Ok(QuotePage {
        items,
        total,
        page,
        has_next,
    })
}

/// Loads a single quote with its moods attached, for the studio view.
pub async fn get_quote(db: &Pool<Sqlite>, id: i64) -> Result<Option<QuoteWithMoods>, sqlx::Error> {
    let quote: Option<Quote> =
        sqlx::query_as("SELECT id, content, author FROM quotes WHERE id = $1;")
            .bind(id)
            .fetch_optional(db)
            .await
            .inspect_err(|e| {
                tracing::error!(err = ?e, id = %id, "an error occurred when fetching quote");
            })?;

    let Some(quote) = quote else {
        return Ok(None);
    };

    let moods: Vec<Mood> = sqlx::query_as(
        r#"
            SELECT
                m.id, m.name, m.slug, m.emoji, m.color_hex
            FROM moods m
            JOIN mood_quote mq ON mq.mood_id = m.id
            WHERE mq.quote_id = $1
            ORDER BY mq.id;
        "#,
    )
    .bind(id)
    .fetch_all(db)
    .await
    .inspect_err(|e| {
        tracing::error!(err = ?e, id = %id, "an error occurred when fetching moods for quote");
    })?;

    Ok(Some(QuoteWithMoods { quote, moods }))
}

/// The full mood reference list, for building the filter chips.
pub async fn all_moods(db: &Pool<Sqlite>) -> Result<Vec<Mood>, sqlx::Error> {
    sqlx::query_as("SELECT id, name, slug, emoji, color_hex FROM moods ORDER BY id;")
        .fetch_all(db)
        .await
        .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when fetching moods"))
}

#[derive(FromRow)]
struct QuoteMoodRow {
    quote_id: i64,
    #[sqlx(flatten)]
    mood: Mood,
}

/// Fetches the given quotes with their moods, preserving the order of `ids`.
async fn fetch_with_moods(
    db: &Pool<Sqlite>,
    ids: &[i64],
) -> Result<Vec<QuoteWithMoods>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut query: QueryBuilder<Sqlite> =
        QueryBuilder::new("SELECT id, content, author FROM quotes WHERE id IN (");
    let mut separated = query.separated(", ");
    for id in ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")");

    let quotes: Vec<Quote> = query
        .build_query_as()
        .fetch_all(db)
        .await
        .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when fetching quote page"))?;

    let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(
        r#"
            SELECT
                mq.quote_id AS quote_id,
                m.id AS id, m.name, m.slug, m.emoji, m.color_hex
            FROM mood_quote mq
            JOIN moods m ON m.id = mq.mood_id
            WHERE mq.quote_id IN (
        "#,
    );
    let mut separated = query.separated(", ");
    for id in ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(") ORDER BY mq.id");

    let mood_rows: Vec<QuoteMoodRow> = query
        .build_query_as()
        .fetch_all(db)
        .await
        .inspect_err(|e| {
            tracing::error!(err = ?e, "an error occurred when fetching moods for quote page");
        })?;

    let mut moods_by_quote: HashMap<i64, Vec<Mood>> = HashMap::new();
    for row in mood_rows {
        moods_by_quote.entry(row.quote_id).or_default().push(row.mood);
    }

    let mut quotes_by_id: HashMap<i64, Quote> =
        quotes.into_iter().map(|quote| (quote.id, quote)).collect();

    Ok(ids
        .iter()
        .filter_map(|id| {
            let quote = quotes_by_id.remove(id)?;
            let moods = moods_by_quote.remove(id).unwrap_or_default();
            Some(QuoteWithMoods { quote, moods })
        })
        .collect())
}
