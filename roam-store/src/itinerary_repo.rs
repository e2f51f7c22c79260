use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use uuid::Uuid;

use roam_core::repository::{CreatorRepository, ItineraryRepository};
use roam_core::{CoreResult, MarketplaceQuery};
use roam_shared::{ListingWithCreator, MarketplaceCreator, MarketplaceItinerary};

use crate::database::backend_error;

const LISTING_SELECT: &str = r#"
    SELECT i.id, i.creator_id, i.title, i.description, i.destination, i.duration_days,
           i.price, i.discount_price, i.cover_image, i.rating, i.review_count, i.purchase_count,
           i.is_featured, i.is_trending, i.styles, i.video_id, i.view_count, i.created_at, i.updated_at,
           c.id AS c_id, c.user_id AS c_user_id, c.username AS c_username,
           c.display_name AS c_display_name, c.avatar AS c_avatar, c.bio AS c_bio,
           c.specialty AS c_specialty, c.rating AS c_rating, c.itinerary_count AS c_itinerary_count,
           c.total_sales AS c_total_sales, c.is_verified AS c_is_verified
    FROM marketplace_itineraries i
    LEFT JOIN marketplace_creators c ON c.id = i.creator_id
"#;

const CREATOR_SELECT: &str = r#"
    SELECT id, user_id, username, display_name, avatar, bio, specialty, rating,
           itinerary_count, total_sales, is_verified
    FROM marketplace_creators
"#;

pub struct StoreItineraryRepository {
    pool: PgPool,
}

impl StoreItineraryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Escapes LIKE metacharacters so the search term matches literally.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// Appends the WHERE/ORDER BY for a marketplace query, facet by facet.
fn push_query_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &MarketplaceQuery) {
    let f = &query.filters;
    builder.push(" WHERE 1=1");

    if let Some(term) = query.search_term() {
        let pattern = like_pattern(term);
        builder
            .push(" AND (i.title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR i.description ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR i.destination ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(range) = f.price_range {
        builder
            .push(" AND i.price BETWEEN ")
            .push_bind(range.min)
            .push(" AND ")
            .push_bind(range.max);
    }
    if let Some(range) = f.duration_range {
        builder
            .push(" AND i.duration_days BETWEEN ")
            .push_bind(range.min)
            .push(" AND ")
            .push_bind(range.max);
    }
    if !f.destinations.is_empty() {
        builder
            .push(" AND i.destination = ANY(")
            .push_bind(f.destinations.clone())
            .push(")");
    }
    if !f.styles.is_empty() {
        builder
            .push(" AND i.styles && ")
            .push_bind(f.styles.clone())
            .push("::text[]");
    }
    if let Some(min) = f.min_rating {
        builder.push(" AND i.rating >= ").push_bind(min);
    }
    if f.has_video {
        builder.push(" AND i.video_id IS NOT NULL AND i.video_id <> ''");
    }

    builder.push(" ORDER BY ");
    builder.push(f.sort_by.order_by_sql());
    builder.push(", i.id");
}

pub(crate) fn creator_from_row(row: &PgRow) -> Result<MarketplaceCreator, sqlx::Error> {
    Ok(MarketplaceCreator {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        username: row.try_get("username")?,
        display_name: row.try_get("display_name")?,
        avatar: row.try_get("avatar")?,
        bio: row.try_get("bio")?,
        specialty: row.try_get("specialty")?,
        rating: row.try_get("rating")?,
        itinerary_count: row.try_get("itinerary_count")?,
        total_sales: row.try_get("total_sales")?,
        is_verified: row.try_get("is_verified")?,
    })
}

fn listing_from_row(row: &PgRow) -> Result<ListingWithCreator, sqlx::Error> {
    let itinerary = MarketplaceItinerary {
        id: row.try_get("id")?,
        creator_id: row.try_get("creator_id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        destination: row.try_get("destination")?,
        duration_days: row.try_get("duration_days")?,
        price: row.try_get("price")?,
        discount_price: row.try_get("discount_price")?,
        cover_image: row.try_get("cover_image")?,
        rating: row.try_get("rating")?,
        review_count: row.try_get("review_count")?,
        purchase_count: row.try_get("purchase_count")?,
        is_featured: row.try_get("is_featured")?,
        is_trending: row.try_get("is_trending")?,
        styles: row.try_get("styles")?,
        video_id: row.try_get("video_id")?,
        view_count: row.try_get("view_count")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    };

    // LEFT JOIN: every creator column is null when the creator row is missing
    let creator_id: Option<Uuid> = row.try_get("c_id")?;
    let creator = match creator_id {
        Some(id) => Some(MarketplaceCreator {
            id,
            user_id: row.try_get("c_user_id")?,
            username: row.try_get::<Option<String>, _>("c_username")?.unwrap_or_default(),
            display_name: row.try_get::<Option<String>, _>("c_display_name")?.unwrap_or_default(),
            avatar: row.try_get("c_avatar")?,
            bio: row.try_get("c_bio")?,
            specialty: row.try_get("c_specialty")?,
            rating: row.try_get::<Option<f64>, _>("c_rating")?.unwrap_or_default(),
            itinerary_count: row.try_get::<Option<i32>, _>("c_itinerary_count")?.unwrap_or_default(),
            total_sales: row.try_get::<Option<i32>, _>("c_total_sales")?.unwrap_or_default(),
            is_verified: row.try_get::<Option<bool>, _>("c_is_verified")?.unwrap_or_default(),
        }),
        None => None,
    };

    Ok(ListingWithCreator { itinerary, creator })
}

fn listings_from_rows(rows: Vec<PgRow>) -> CoreResult<Vec<ListingWithCreator>> {
    rows.iter()
        .map(listing_from_row)
        .collect::<Result<Vec<_>, _>>()
        .map_err(backend_error)
}

#[async_trait]
impl ItineraryRepository for StoreItineraryRepository {
    async fn search(&self, query: &MarketplaceQuery) -> CoreResult<Vec<ListingWithCreator>> {
        let mut builder = QueryBuilder::<Postgres>::new(LISTING_SELECT);
        push_query_filters(&mut builder, query);
        tracing::debug!(sql = builder.sql(), "Marketplace search");

        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(backend_error)?;

        listings_from_rows(rows)
    }

    async fn featured(&self, limit: i64) -> CoreResult<Vec<ListingWithCreator>> {
        let sql = format!(
            "{} WHERE i.is_featured = TRUE ORDER BY i.purchase_count DESC, i.id LIMIT $1",
            LISTING_SELECT
        );
        let rows = sqlx::query(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(backend_error)?;

        listings_from_rows(rows)
    }

    async fn trending(&self, limit: i64) -> CoreResult<Vec<ListingWithCreator>> {
        let sql = format!(
            "{} WHERE i.is_trending = TRUE ORDER BY i.view_count DESC NULLS LAST, i.id LIMIT $1",
            LISTING_SELECT
        );
        let rows = sqlx::query(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(backend_error)?;

        listings_from_rows(rows)
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> CoreResult<Vec<ListingWithCreator>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!("{} WHERE i.id = ANY($1)", LISTING_SELECT);
        let rows = sqlx::query(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(backend_error)?;

        listings_from_rows(rows)
    }
}

pub struct StoreCreatorRepository {
    pool: PgPool,
}

impl StoreCreatorRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CreatorRepository for StoreCreatorRepository {
    async fn top_creators(&self, limit: i64) -> CoreResult<Vec<MarketplaceCreator>> {
        let sql = format!("{} ORDER BY rating DESC, id LIMIT $1", CREATOR_SELECT);
        let rows = sqlx::query(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(backend_error)?;

        rows.iter()
            .map(creator_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(backend_error)
    }
}
