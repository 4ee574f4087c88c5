use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::mood::Mood;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Quote {
    pub id: i64,
    pub content: String,
    pub author: String,
}

/// A quote with its moods eagerly attached, as handed to the client views.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteWithMoods {
    #[serde(flatten)]
    pub quote: Quote,
    pub moods: Vec<Mood>,
}
