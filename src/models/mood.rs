use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Static reference data for the mood filter chips. Seeded once, rarely
/// changes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Mood {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub emoji: String,
    pub color_hex: String,
}
