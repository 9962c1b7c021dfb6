use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Place {
    pub id: i64,
    pub name: String,
    /// Owning city id
    #[sqlx(rename = "city_id")]
    pub city: i64,
    pub category: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlaceDraft {
    pub name: String,
    pub city: i64,
    pub category: Option<String>,
    pub description: Option<String>,
}

impl Place {
    pub fn apply(&mut self, draft: PlaceDraft) {
        self.name = draft.name;
        self.city = draft.city;
        self.category = draft.category;
        self.description = draft.description;
    }
}
