use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{postgres::PgRow, FromRow, Row};
use std::fmt;

/// Kind of record a comment is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    City,
    Place,
}

impl TargetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetKind::City => "city",
            TargetKind::Place => "place",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "city" => Some(TargetKind::City),
            "place" => Some(TargetKind::Place),
            _ => None,
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommentTarget {
    pub kind: TargetKind,
    pub id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub body: String,
    /// Username of the identity that posted the comment
    pub author: String,
    pub target: CommentTarget,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommentDraft {
    pub body: String,
    pub author: String,
    pub target: CommentTarget,
}

// target is stored as (target_kind, target_id) columns
impl<'r> FromRow<'r, PgRow> for Comment {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let kind: String = row.try_get("target_kind")?;
        let kind = TargetKind::parse(&kind).ok_or_else(|| sqlx::Error::ColumnDecode {
            index: "target_kind".to_string(),
            source: format!("unknown comment target kind '{}'", kind).into(),
        })?;

        Ok(Comment {
            id: row.try_get("id")?,
            body: row.try_get("body")?,
            author: row.try_get("author")?,
            target: CommentTarget {
                kind,
                id: row.try_get("target_id")?,
            },
            created_at: row.try_get("created_at")?,
        })
    }
}
