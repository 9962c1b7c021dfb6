use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct City {
    pub id: i64,
    pub name: String,
    pub region: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Validated field set for inserting or replacing a city
#[derive(Debug, Clone, PartialEq)]
pub struct CityDraft {
    pub name: String,
    pub region: Option<String>,
    pub description: Option<String>,
}

impl City {
    pub fn apply(&mut self, draft: CityDraft) {
        self.name = draft.name;
        self.region = draft.region;
        self.description = draft.description;
    }
}
