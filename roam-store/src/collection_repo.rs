use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use uuid::Uuid;

use roam_core::repository::CollectionRepository;
use roam_core::CoreResult;
use roam_shared::{CollectionDraft, CollectionPatch, MarketplaceCollection};

use crate::database::backend_error;

const COLLECTION_COLUMNS: &str =
    "id, creator_id, title, description, cover_image, itinerary_ids, sort_order, created_at, updated_at";

pub struct StoreCollectionRepository {
    pool: PgPool,
}

impl StoreCollectionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn collection_from_row(row: &PgRow) -> Result<MarketplaceCollection, sqlx::Error> {
    Ok(MarketplaceCollection {
        id: row.try_get("id")?,
        creator_id: row.try_get("creator_id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        cover_image: row.try_get("cover_image")?,
        itinerary_ids: row.try_get("itinerary_ids")?,
        sort_order: row.try_get("sort_order")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn collections_from_rows(rows: Vec<PgRow>) -> CoreResult<Vec<MarketplaceCollection>> {
    rows.iter()
        .map(collection_from_row)
        .collect::<Result<Vec<_>, _>>()
        .map_err(backend_error)
}

#[async_trait]
impl CollectionRepository for StoreCollectionRepository {
    async fn list_collections(&self) -> CoreResult<Vec<MarketplaceCollection>> {
        let sql = format!(
            "SELECT {} FROM marketplace_collections ORDER BY sort_order ASC, created_at ASC",
            COLLECTION_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(backend_error)?;

        collections_from_rows(rows)
    }

    async fn list_for_creator(&self, creator_id: Uuid) -> CoreResult<Vec<MarketplaceCollection>> {
        let sql = format!(
            "SELECT {} FROM marketplace_collections WHERE creator_id = $1 ORDER BY sort_order ASC, created_at ASC",
            COLLECTION_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(creator_id)
            .fetch_all(&self.pool)
            .await
            .map_err(backend_error)?;

        collections_from_rows(rows)
    }

    async fn create_collection(
        &self,
        creator_id: Uuid,
        draft: CollectionDraft,
    ) -> CoreResult<MarketplaceCollection> {
        let mut tx = self.pool.begin().await.map_err(backend_error)?;

        // Serializes concurrent creates for the same creator until commit
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(creator_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(backend_error)?;

        let sql = format!(
            r#"
            INSERT INTO marketplace_collections (id, creator_id, title, description, cover_image, itinerary_ids, sort_order)
            SELECT $1, $2, $3, $4, $5, $6, COALESCE(MAX(sort_order) + 1, 0)
            FROM marketplace_collections
            WHERE creator_id = $2
            RETURNING {}
            "#,
            COLLECTION_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(Uuid::new_v4())
            .bind(creator_id)
            .bind(&draft.title)
            .bind(&draft.description)
            .bind(&draft.cover_image)
            .bind(&draft.itinerary_ids)
            .fetch_one(&mut *tx)
            .await
            .map_err(backend_error)?;

        tx.commit().await.map_err(backend_error)?;

        collection_from_row(&row).map_err(backend_error)
    }

    async fn update_collection(
        &self,
        id: Uuid,
        patch: CollectionPatch,
    ) -> CoreResult<Option<MarketplaceCollection>> {
        let mut builder =
            QueryBuilder::<Postgres>::new("UPDATE marketplace_collections SET updated_at = NOW()");
        if let Some(title) = patch.title {
            builder.push(", title = ").push_bind(title);
        }
        if let Some(description) = patch.description {
            builder.push(", description = ").push_bind(description);
        }
        if let Some(cover_image) = patch.cover_image {
            builder.push(", cover_image = ").push_bind(cover_image);
        }
        if let Some(ids) = patch.itinerary_ids {
            builder.push(", itinerary_ids = ").push_bind(ids);
        }
        if let Some(order) = patch.sort_order {
            builder.push(", sort_order = ").push_bind(order);
        }
        builder.push(" WHERE id = ").push_bind(id);
        builder.push(" RETURNING ");
        builder.push(COLLECTION_COLUMNS);

        let row = builder
            .build()
            .fetch_optional(&self.pool)
            .await
            .map_err(backend_error)?;

        row.as_ref()
            .map(collection_from_row)
            .transpose()
            .map_err(backend_error)
    }

    async fn delete_collection(&self, id: Uuid) -> CoreResult<bool> {
        let result = sqlx::query("DELETE FROM marketplace_collections WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(backend_error)?;

        Ok(result.rows_affected() > 0)
    }
}
