use async_trait::async_trait;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    City, CityDraft, Comment, CommentDraft, CommentTarget, Place, PlaceDraft, TargetKind,
};

/// Durable record storage for the catalog.
///
/// Every mutating method is a single atomic write. `update_*` and `delete_*`
/// return `DatabaseError::NotFound` when the id does not exist; `delete_*`
/// return the removed record.
#[async_trait]
pub trait Store: Send + Sync {
    /// Cheap connectivity check used by `/health`
    async fn ping(&self) -> Result<(), DatabaseError>;

    async fn list_cities(&self) -> Result<Vec<City>, DatabaseError>;
    async fn get_city(&self, id: i64) -> Result<Option<City>, DatabaseError>;
    /// Whether another city (not `exclude`) already uses `name`
    async fn city_name_taken(&self, name: &str, exclude: Option<i64>) -> Result<bool, DatabaseError>;
    async fn insert_city(&self, draft: CityDraft) -> Result<City, DatabaseError>;
    async fn update_city(&self, id: i64, draft: CityDraft) -> Result<City, DatabaseError>;
    /// Removes the city together with its places and every comment attached to either
    async fn delete_city(&self, id: i64) -> Result<City, DatabaseError>;

    async fn list_places(&self) -> Result<Vec<Place>, DatabaseError>;
    async fn get_place(&self, id: i64) -> Result<Option<Place>, DatabaseError>;
    async fn insert_place(&self, draft: PlaceDraft) -> Result<Place, DatabaseError>;
    async fn update_place(&self, id: i64, draft: PlaceDraft) -> Result<Place, DatabaseError>;
    /// Removes the place and its comments
    async fn delete_place(&self, id: i64) -> Result<Place, DatabaseError>;

    async fn list_comments(&self) -> Result<Vec<Comment>, DatabaseError>;
    /// `DatabaseError::Conflict` when the target no longer exists
    async fn insert_comment(&self, draft: CommentDraft) -> Result<Comment, DatabaseError>;
    async fn delete_comment(&self, id: i64) -> Result<Comment, DatabaseError>;

    async fn target_exists(&self, target: CommentTarget) -> Result<bool, DatabaseError> {
        Ok(match target.kind {
            TargetKind::City => self.get_city(target.id).await?.is_some(),
            TargetKind::Place => self.get_place(target.id).await?.is_some(),
        })
    }
}
