use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::manager::DatabaseError;
use crate::database::models::{City, CityDraft, Comment, CommentDraft, Place, PlaceDraft};
use crate::database::repository::Store;

const CITY_COLUMNS: &str = "id, name, region, description, created_at";
const PLACE_COLUMNS: &str = "id, name, city_id, category, description, created_at";
const COMMENT_COLUMNS: &str = "id, body, author, target_kind, target_id, created_at";

/// Store backed by a Postgres pool
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn list_cities(&self) -> Result<Vec<City>, DatabaseError> {
        let sql = format!("SELECT {CITY_COLUMNS} FROM cities ORDER BY id");
        Ok(sqlx::query_as::<_, City>(&sql).fetch_all(&self.pool).await?)
    }

    async fn get_city(&self, id: i64) -> Result<Option<City>, DatabaseError> {
        let sql = format!("SELECT {CITY_COLUMNS} FROM cities WHERE id = $1");
        Ok(sqlx::query_as::<_, City>(&sql).bind(id).fetch_optional(&self.pool).await?)
    }

    async fn city_name_taken(&self, name: &str, exclude: Option<i64>) -> Result<bool, DatabaseError> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM cities WHERE name = $1 AND ($2::BIGINT IS NULL OR id <> $2)",
        )
        .bind(name)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0 > 0)
    }

    async fn insert_city(&self, draft: CityDraft) -> Result<City, DatabaseError> {
        let sql = format!(
            "INSERT INTO cities (name, region, description) VALUES ($1, $2, $3) RETURNING {CITY_COLUMNS}"
        );
        sqlx::query_as::<_, City>(&sql)
            .bind(draft.name)
            .bind(draft.region)
            .bind(draft.description)
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::from_write)
    }

    async fn update_city(&self, id: i64, draft: CityDraft) -> Result<City, DatabaseError> {
        let sql = format!(
            "UPDATE cities SET name = $2, region = $3, description = $4 WHERE id = $1 RETURNING {CITY_COLUMNS}"
        );
        sqlx::query_as::<_, City>(&sql)
            .bind(id)
            .bind(draft.name)
            .bind(draft.region)
            .bind(draft.description)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from_write)?
            .ok_or_else(|| DatabaseError::not_found("city", id))
    }

    async fn delete_city(&self, id: i64) -> Result<City, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        // Places go with the city through ON DELETE CASCADE; comments have no FK
        sqlx::query(
            "DELETE FROM comments
             WHERE (target_kind = 'city' AND target_id = $1)
                OR (target_kind = 'place' AND target_id IN (SELECT id FROM places WHERE city_id = $1))",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let sql = format!("DELETE FROM cities WHERE id = $1 RETURNING {CITY_COLUMNS}");
        let city = sqlx::query_as::<_, City>(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DatabaseError::not_found("city", id))?;

        tx.commit().await?;
        Ok(city)
    }

    async fn list_places(&self) -> Result<Vec<Place>, DatabaseError> {
        let sql = format!("SELECT {PLACE_COLUMNS} FROM places ORDER BY id");
        Ok(sqlx::query_as::<_, Place>(&sql).fetch_all(&self.pool).await?)
    }

    async fn get_place(&self, id: i64) -> Result<Option<Place>, DatabaseError> {
        let sql = format!("SELECT {PLACE_COLUMNS} FROM places WHERE id = $1");
        Ok(sqlx::query_as::<_, Place>(&sql).bind(id).fetch_optional(&self.pool).await?)
    }

    async fn insert_place(&self, draft: PlaceDraft) -> Result<Place, DatabaseError> {
        let sql = format!(
            "INSERT INTO places (name, city_id, category, description) VALUES ($1, $2, $3, $4) RETURNING {PLACE_COLUMNS}"
        );
        sqlx::query_as::<_, Place>(&sql)
            .bind(draft.name)
            .bind(draft.city)
            .bind(draft.category)
            .bind(draft.description)
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::from_write)
    }

    async fn update_place(&self, id: i64, draft: PlaceDraft) -> Result<Place, DatabaseError> {
        let sql = format!(
            "UPDATE places SET name = $2, city_id = $3, category = $4, description = $5 WHERE id = $1 RETURNING {PLACE_COLUMNS}"
        );
        sqlx::query_as::<_, Place>(&sql)
            .bind(id)
            .bind(draft.name)
            .bind(draft.city)
            .bind(draft.category)
            .bind(draft.description)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from_write)?
            .ok_or_else(|| DatabaseError::not_found("place", id))
    }

    async fn delete_place(&self, id: i64) -> Result<Place, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM comments WHERE target_kind = 'place' AND target_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let sql = format!("DELETE FROM places WHERE id = $1 RETURNING {PLACE_COLUMNS}");
        let place = sqlx::query_as::<_, Place>(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DatabaseError::not_found("place", id))?;

        tx.commit().await?;
        Ok(place)
    }

    async fn list_comments(&self) -> Result<Vec<Comment>, DatabaseError> {
        let sql = format!("SELECT {COMMENT_COLUMNS} FROM comments ORDER BY id");
        Ok(sqlx::query_as::<_, Comment>(&sql).fetch_all(&self.pool).await?)
    }

    async fn insert_comment(&self, draft: CommentDraft) -> Result<Comment, DatabaseError> {
        // Inserts nothing when the target is gone; FOR SHARE holds off a concurrent delete
        let sql = format!(
            "INSERT INTO comments (body, author, target_kind, target_id)
             SELECT $1::TEXT, $2::TEXT, $3::VARCHAR, $4::BIGINT
             WHERE ($3 = 'city' AND EXISTS (SELECT 1 FROM cities WHERE id = $4 FOR SHARE))
                OR ($3 = 'place' AND EXISTS (SELECT 1 FROM places WHERE id = $4 FOR SHARE))
             RETURNING {COMMENT_COLUMNS}"
        );
        let target = draft.target;
        sqlx::query_as::<_, Comment>(&sql)
            .bind(draft.body)
            .bind(draft.author)
            .bind(target.kind.as_str())
            .bind(target.id)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from_write)?
            .ok_or_else(|| DatabaseError::Conflict(format!("{} {} does not exist", target.kind, target.id)))
    }

    async fn delete_comment(&self, id: i64) -> Result<Comment, DatabaseError> {
        let sql = format!("DELETE FROM comments WHERE id = $1 RETURNING {COMMENT_COLUMNS}");
        sqlx::query_as::<_, Comment>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("comment", id))
    }
}
