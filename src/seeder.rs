//! One-time import of the mood reference table and the quote dataset.

use std::collections::HashMap;

use anyhow::Context;
use serde::Deserialize;
use sqlx::{Pool, Sqlite};

const DEFAULT_AUTHOR: &str = "Anonim";

const MOODS: [(&str, &str, &str, &str); 4] = [
    ("Semangat", "semangat", "🚀", "#F59E0B"),
    ("Santai", "santai", "☕", "#10B981"),
    ("Galau", "galau", "🌧️", "#3B82F6"),
    ("Tenang", "tenang", "🧘", "#8B5CF6"),
];

#[derive(Debug, Deserialize)]
struct QuoteRecord {
    content: Option<String>,
    author: Option<String>,
    #[serde(default)]
    moods: Vec<String>,
}

/// Seeds the mood reference table and imports the quote dataset, each only
/// when its table is still empty.
pub async fn seed(db: &Pool<Sqlite>) -> anyhow::Result<()> {
    seed_moods(db).await?;

    let quotes: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM quotes;")
        .fetch_one(db)
        .await?;
    if quotes > 0 {
        tracing::debug!("quotes already imported. skipping dataset.");
        return Ok(());
    }

    let path =
        std::env::var("QUOTES_DATA_PATH").unwrap_or_else(|_| "data/quotes.json".to_string());
    match std::fs::read_to_string(&path) {
        Ok(json) => {
            let imported = import_quotes(db, &json).await?;
            tracing::info!("imported {} quotes from {}.", imported, path);
        }
        Err(e) => {
            tracing::warn!(err = ?e, path = %path, "quote dataset not found. starting with an empty catalogue.");
        }
    }

    Ok(())
}

async fn seed_moods(db: &Pool<Sqlite>) -> anyhow::Result<()> {
    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM moods;")
        .fetch_one(db)
        .await?;
    if existing > 0 {
        return Ok(());
    }

    for (name, slug, emoji, color_hex) in MOODS {
        sqlx::query("INSERT INTO moods (name, slug, emoji, color_hex) VALUES ($1, $2, $3, $4);")
            .bind(name)
            .bind(slug)
            .bind(emoji)
            .bind(color_hex)
            .execute(db)
            .await
            .inspect_err(|e| {
                tracing::error!(err = ?e, slug = %slug, "an error occurred when seeding mood");
            })?;
    }

    tracing::info!("seeded {} moods.", MOODS.len());
    Ok(())
}

/// Imports quote records from a JSON dataset. Records without content are
/// skipped with a warning; unknown mood slugs are dropped per association.
/// Returns the number of quotes created.
pub async fn import_quotes(db: &Pool<Sqlite>, json: &str) -> anyhow::Result<usize> {
    let records: Vec<QuoteRecord> =
        serde_json::from_str(json).context("quote dataset is not valid JSON")?;

    // Slug-to-id map up front, one mood lookup for the whole import.
    let moods: Vec<(i64, String)> = sqlx::query_as("SELECT id, slug FROM moods;")
        .fetch_all(db)
        .await?;
    let mood_ids: HashMap<String, i64> = moods.into_iter().map(|(id, slug)| (slug, id)).collect();

    tracing::info!("importing {} quote records...", records.len());

    let mut imported = 0;
    for (index, record) in records.into_iter().enumerate() {
        let content = match record.content {
            Some(content) if !content.trim().is_empty() => content,
            _ => {
                tracing::warn!("record {} skipped: missing content.", index + 1);
                continue;
            }
        };
        let author = record.author.unwrap_or_else(|| DEFAULT_AUTHOR.to_string());

        let quote_id: i64 = sqlx::query_scalar(
            "INSERT INTO quotes (content, author) VALUES ($1, $2) RETURNING id;",
        )
        .bind(&content)
        .bind(&author)
        .fetch_one(db)
        .await
        .inspect_err(|e| tracing::error!(err = ?e, "an error occurred when inserting quote"))?;

        for slug in &record.moods {
            let Some(mood_id) = mood_ids.get(slug) else {
                tracing::debug!("record {}: unknown mood slug {:?} ignored.", index + 1, slug);
                continue;
            };
            sqlx::query("INSERT INTO mood_quote (mood_id, quote_id) VALUES ($1, $2);")
                .bind(mood_id)
                .bind(quote_id)
                .execute(db)
                .await
                .inspect_err(|e| {
                    tracing::error!(err = ?e, slug = %slug, "an error occurred when attaching mood");
                })?;
        }

        imported += 1;
    }

    Ok(imported)
}

/// Seeds the reference moods and the shipped dataset into a test database.
#[cfg(test)]
pub async fn seed_test_fixture(db: &Pool<Sqlite>) {
    seed_moods(db).await.unwrap();
    import_quotes(db, include_str!("../data/quotes.json"))
        .await
        .unwrap();
}
