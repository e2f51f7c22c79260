use std::collections::BTreeMap;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use uuid::Uuid;

use roam_core::repository::ProfileRepository;
use roam_core::{CoreResult, ProfileSubscription};
use roam_shared::{Profile, ProfilePatch};

use crate::database::backend_error;
use crate::events::ProfileChangeListener;

const PROFILE_COLUMNS: &str = "id, username, display_name, avatar_url, bio, extended_bio, is_creator, \
     travel_styles, budget_preference, follower_count, following_count, years_traveling, \
     cities_visited, languages, specialized_places, highlights, social_links, created_at, updated_at";

pub struct StoreProfileRepository {
    pool: PgPool,
    listener: ProfileChangeListener,
}

impl StoreProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        let listener = ProfileChangeListener::new(pool.clone());
        Self { pool, listener }
    }
}

fn profile_from_row(row: &PgRow) -> Result<Profile, sqlx::Error> {
    let budget: String = row.try_get("budget_preference")?;
    let social_links: Json<BTreeMap<String, String>> = row.try_get("social_links")?;

    Ok(Profile {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        display_name: row.try_get("display_name")?,
        avatar_url: row.try_get("avatar_url")?,
        bio: row.try_get("bio")?,
        extended_bio: row.try_get("extended_bio")?,
        is_creator: row.try_get("is_creator")?,
        travel_styles: row.try_get("travel_styles")?,
        budget_preference: budget.parse().unwrap_or_default(),
        follower_count: row.try_get("follower_count")?,
        following_count: row.try_get("following_count")?,
        years_traveling: row.try_get("years_traveling")?,
        cities_visited: row.try_get("cities_visited")?,
        languages: row.try_get("languages")?,
        specialized_places: row.try_get("specialized_places")?,
        highlights: row.try_get("highlights")?,
        social_links: social_links.0,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

pub(crate) async fn fetch_profile(pool: &PgPool, id: Uuid) -> CoreResult<Option<Profile>> {
    let sql = format!("SELECT {} FROM profiles WHERE id = $1", PROFILE_COLUMNS);
    let row = sqlx::query(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(backend_error)?;

    row.as_ref()
        .map(profile_from_row)
        .transpose()
        .map_err(backend_error)
}

#[async_trait]
impl ProfileRepository for StoreProfileRepository {
    async fn get_profile(&self, id: Uuid) -> CoreResult<Option<Profile>> {
        fetch_profile(&self.pool, id).await
    }

    async fn update_profile(&self, id: Uuid, patch: ProfilePatch) -> CoreResult<Option<Profile>> {
        let mut builder = QueryBuilder::<Postgres>::new("UPDATE profiles SET updated_at = NOW()");
        if let Some(v) = patch.username {
            builder.push(", username = ").push_bind(v);
        }
        if let Some(v) = patch.display_name {
            builder.push(", display_name = ").push_bind(v);
        }
        if let Some(v) = patch.avatar_url {
            builder.push(", avatar_url = ").push_bind(v);
        }
        if let Some(v) = patch.bio {
            builder.push(", bio = ").push_bind(v);
        }
        if let Some(v) = patch.extended_bio {
            builder.push(", extended_bio = ").push_bind(v);
        }
        if let Some(v) = patch.is_creator {
            builder.push(", is_creator = ").push_bind(v);
        }
        if let Some(v) = patch.travel_styles {
            builder.push(", travel_styles = ").push_bind(v);
        }
        if let Some(v) = patch.budget_preference {
            builder.push(", budget_preference = ").push_bind(v.as_str());
        }
        if let Some(v) = patch.years_traveling {
            builder.push(", years_traveling = ").push_bind(v);
        }
        if let Some(v) = patch.cities_visited {
            builder.push(", cities_visited = ").push_bind(v);
        }
        if let Some(v) = patch.languages {
            builder.push(", languages = ").push_bind(v);
        }
        if let Some(v) = patch.specialized_places {
            builder.push(", specialized_places = ").push_bind(v);
        }
        if let Some(v) = patch.highlights {
            builder.push(", highlights = ").push_bind(v);
        }
        if let Some(v) = patch.social_links {
            builder.push(", social_links = ").push_bind(Json(v));
        }
        builder.push(" WHERE id = ").push_bind(id);
        builder.push(" RETURNING ");
        builder.push(PROFILE_COLUMNS);

        let row = builder
            .build()
            .fetch_optional(&self.pool)
            .await
            .map_err(backend_error)?;

        row.as_ref()
            .map(profile_from_row)
            .transpose()
            .map_err(backend_error)
    }

    async fn subscribe(&self, id: Uuid) -> CoreResult<ProfileSubscription> {
        self.listener.subscribe(id).await
    }
}
