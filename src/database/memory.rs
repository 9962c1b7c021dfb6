use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    City, CityDraft, Comment, CommentDraft, CommentTarget, Place, PlaceDraft, TargetKind,
};
use crate::database::repository::Store;

#[derive(Default)]
struct Tables {
    cities: BTreeMap<i64, City>,
    places: BTreeMap<i64, Place>,
    comments: BTreeMap<i64, Comment>,
    last_city_id: i64,
    last_place_id: i64,
    last_comment_id: i64,
}

impl Tables {
    fn name_taken(&self, name: &str, exclude: Option<i64>) -> bool {
        self.cities
            .values()
            .any(|c| c.name == name && Some(c.id) != exclude)
    }

    fn target_exists(&self, target: &CommentTarget) -> bool {
        match target.kind {
            TargetKind::City => self.cities.contains_key(&target.id),
            TargetKind::Place => self.places.contains_key(&target.id),
        }
    }

    fn remove_comments_on(&mut self, kind: TargetKind, ids: &[i64]) {
        self.comments
            .retain(|_, c| !(c.target.kind == kind && ids.contains(&c.target.id)));
    }
}

/// Process-local store with the same constraints as the Postgres schema.
/// Ids are never reused.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }

    async fn list_cities(&self) -> Result<Vec<City>, DatabaseError> {
        Ok(self.tables.read().await.cities.values().cloned().collect())
    }

    async fn get_city(&self, id: i64) -> Result<Option<City>, DatabaseError> {
        Ok(self.tables.read().await.cities.get(&id).cloned())
    }

    async fn city_name_taken(&self, name: &str, exclude: Option<i64>) -> Result<bool, DatabaseError> {
        Ok(self.tables.read().await.name_taken(name, exclude))
    }

    async fn insert_city(&self, draft: CityDraft) -> Result<City, DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.name_taken(&draft.name, None) {
            return Err(DatabaseError::Conflict(format!("city name '{}' already exists", draft.name)));
        }

        tables.last_city_id += 1;
        let city = City {
            id: tables.last_city_id,
            name: draft.name,
            region: draft.region,
            description: draft.description,
            created_at: Utc::now(),
        };
        tables.cities.insert(city.id, city.clone());
        Ok(city)
    }

    async fn update_city(&self, id: i64, draft: CityDraft) -> Result<City, DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.name_taken(&draft.name, Some(id)) {
            return Err(DatabaseError::Conflict(format!("city name '{}' already exists", draft.name)));
        }

        let city = tables
            .cities
            .get_mut(&id)
            .ok_or_else(|| DatabaseError::not_found("city", id))?;
        city.apply(draft);
        Ok(city.clone())
    }

    async fn delete_city(&self, id: i64) -> Result<City, DatabaseError> {
        let mut tables = self.tables.write().await;
        let city = tables
            .cities
            .remove(&id)
            .ok_or_else(|| DatabaseError::not_found("city", id))?;

        let place_ids: Vec<i64> = tables
            .places
            .values()
            .filter(|p| p.city == id)
            .map(|p| p.id)
            .collect();
        tables.places.retain(|_, p| p.city != id);
        tables.remove_comments_on(TargetKind::Place, &place_ids);
        tables.remove_comments_on(TargetKind::City, &[id]);

        Ok(city)
    }

    async fn list_places(&self) -> Result<Vec<Place>, DatabaseError> {
        Ok(self.tables.read().await.places.values().cloned().collect())
    }

    async fn get_place(&self, id: i64) -> Result<Option<Place>, DatabaseError> {
        Ok(self.tables.read().await.places.get(&id).cloned())
    }

    async fn insert_place(&self, draft: PlaceDraft) -> Result<Place, DatabaseError> {
        let mut tables = self.tables.write().await;
        if !tables.cities.contains_key(&draft.city) {
            return Err(DatabaseError::Conflict(format!("city {} does not exist", draft.city)));
        }

        tables.last_place_id += 1;
        let place = Place {
            id: tables.last_place_id,
            name: draft.name,
            city: draft.city,
            category: draft.category,
            description: draft.description,
            created_at: Utc::now(),
        };
        tables.places.insert(place.id, place.clone());
        Ok(place)
    }

    async fn update_place(&self, id: i64, draft: PlaceDraft) -> Result<Place, DatabaseError> {
        let mut tables = self.tables.write().await;
        if !tables.cities.contains_key(&draft.city) {
            return Err(DatabaseError::Conflict(format!("city {} does not exist", draft.city)));
        }

        let place = tables
            .places
            .get_mut(&id)
            .ok_or_else(|| DatabaseError::not_found("place", id))?;
        place.apply(draft);
        Ok(place.clone())
    }

    async fn delete_place(&self, id: i64) -> Result<Place, DatabaseError> {
        let mut tables = self.tables.write().await;
        let place = tables
            .places
            .remove(&id)
            .ok_or_else(|| DatabaseError::not_found("place", id))?;
        tables.remove_comments_on(TargetKind::Place, &[id]);
        Ok(place)
    }

    async fn list_comments(&self) -> Result<Vec<Comment>, DatabaseError> {
        Ok(self.tables.read().await.comments.values().cloned().collect())
    }

    async fn insert_comment(&self, draft: CommentDraft) -> Result<Comment, DatabaseError> {
        let mut tables = self.tables.write().await;
        if !tables.target_exists(&draft.target) {
            return Err(DatabaseError::Conflict(format!(
                "{} {} does not exist",
                draft.target.kind, draft.target.id
            )));
        }

        tables.last_comment_id += 1;
        let comment = Comment {
            id: tables.last_comment_id,
            body: draft.body,
            author: draft.author,
            target: draft.target,
            created_at: Utc::now(),
        };
        tables.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn delete_comment(&self, id: i64) -> Result<Comment, DatabaseError> {
        self.tables
            .write()
            .await
            .comments
            .remove(&id)
            .ok_or_else(|| DatabaseError::not_found("comment", id))
    }
}
