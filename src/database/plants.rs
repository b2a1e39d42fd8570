use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::{NewPlant, Plant, PlantPatch, RecentPlant};
use crate::database::query::PlantListQuery;
use crate::error::ApiError;

const PLANT_COLUMNS: &str = "id, local_name, scientific_name, family_name, habit, uses, \
                             image, location, map_link, description, created_by, \
                             created_at, updated_at";

// Bind filter parameters in the order where_sql() numbered them: habit,
// then family, then the search pattern. A macro because the page query and
// the count query are different sqlx builder types.
macro_rules! bind_filter {
    ($query:expr, $filter:expr) => {{
        let mut q = $query;
        if let Some(habit) = $filter.habit {
            q = q.bind(habit);
        }
        if let Some(family) = &$filter.family {
            q = q.bind(family.clone());
        }
        if let Some(pattern) = $filter.search_pattern() {
            q = q.bind(pattern);
        }
        q
    }};
}

/// Persistent collection of plant records: CRUD, the listing query, and the
/// aggregate reads behind the stats and dashboard endpoints.
#[derive(Clone)]
pub struct PlantRepository {
    pool: PgPool,
}

impl PlantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run the listing query and the total-count query against the same
    /// filter, so pagination metadata always matches the returned page.
    pub async fn list(&self, query: &PlantListQuery) -> Result<(Vec<Plant>, i64), ApiError> {
        let where_sql = query.where_sql();

        // limit/offset are validated integers, not user text
        let rows_sql = format!(
            "SELECT {PLANT_COLUMNS} FROM plants {where_sql} \
             ORDER BY created_at DESC LIMIT {} OFFSET {}",
            query.limit,
            query.offset(),
        );
        let rows = bind_filter!(sqlx::query_as::<_, Plant>(&rows_sql), query)
            .fetch_all(&self.pool)
            .await?;

        let count_sql = format!("SELECT COUNT(*) FROM plants {where_sql}");
        let total = bind_filter!(sqlx::query_scalar::<_, i64>(&count_sql), query)
            .fetch_one(&self.pool)
            .await?;

        Ok((rows, total))
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Plant>, ApiError> {
        let sql = format!("SELECT {PLANT_COLUMNS} FROM plants WHERE id = $1");
        let plant = sqlx::query_as::<_, Plant>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(plant)
    }

    pub async fn create(&self, new_plant: NewPlant) -> Result<Plant, ApiError> {
        let sql = format!(
            "INSERT INTO plants \
             (local_name, scientific_name, family_name, habit, uses, image, location, \
              map_link, description, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {PLANT_COLUMNS}"
        );
        let plant = sqlx::query_as::<_, Plant>(&sql)
            .bind(&new_plant.local_name)
            .bind(&new_plant.scientific_name)
            .bind(&new_plant.family_name)
            .bind(new_plant.habit)
            .bind(&new_plant.uses)
            .bind(new_plant.image.as_deref().unwrap_or(""))
            .bind(&new_plant.location)
            .bind(new_plant.map_link.as_deref().unwrap_or(""))
            .bind(new_plant.description.as_deref().unwrap_or(""))
            .bind(new_plant.created_by)
            .fetch_one(&self.pool)
            .await?;
        Ok(plant)
    }

    /// Partial update: every `None` in the patch keeps the stored value
    /// (COALESCE against the existing column). Returns `NotFound` for an
    /// unknown id.
    pub async fn update(&self, id: Uuid, patch: PlantPatch) -> Result<Plant, ApiError> {
        let sql = format!(
            "UPDATE plants SET \
             local_name = COALESCE($2, local_name), \
             scientific_name = COALESCE($3, scientific_name), \
             family_name = COALESCE($4, family_name), \
             habit = COALESCE($5, habit), \
             uses = COALESCE($6, uses), \
             image = COALESCE($7, image), \
             location = COALESCE($8, location), \
             map_link = COALESCE($9, map_link), \
             description = COALESCE($10, description), \
             updated_at = now() \
             WHERE id = $1 \
             RETURNING {PLANT_COLUMNS}"
        );
        let plant = sqlx::query_as::<_, Plant>(&sql)
            .bind(id)
            .bind(patch.local_name)
            .bind(patch.scientific_name)
            .bind(patch.family_name)
            .bind(patch.habit)
            .bind(patch.uses)
            .bind(patch.image)
            .bind(patch.location)
            .bind(patch.map_link)
            .bind(patch.description)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ApiError::not_found("Plant not found"))?;
        Ok(plant)
    }

    /// Delete a record, returning the removed row so the caller can clean up
    /// any locally stored image artifact.
    pub async fn delete(&self, id: Uuid) -> Result<Plant, ApiError> {
        let sql = format!("DELETE FROM plants WHERE id = $1 RETURNING {PLANT_COLUMNS}");
        let plant = sqlx::query_as::<_, Plant>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ApiError::not_found("Plant not found"))?;
        Ok(plant)
    }

    /// Distinct family names, sorted lexicographically.
    pub async fn distinct_families(&self) -> Result<Vec<String>, ApiError> {
        let families = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT family_name FROM plants ORDER BY family_name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(families)
    }

    /// Record count per habit.
    pub async fn habit_counts(&self) -> Result<Vec<(String, i64)>, ApiError> {
        let counts = sqlx::query_as::<_, (String, i64)>(
            "SELECT habit::text, COUNT(*) FROM plants GROUP BY habit",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(counts)
    }

    /// The `top` most common families, count descending.
    pub async fn family_counts(&self, top: i64) -> Result<Vec<(String, i64)>, ApiError> {
        let counts = sqlx::query_as::<_, (String, i64)>(
            "SELECT family_name, COUNT(*) AS count FROM plants \
             GROUP BY family_name ORDER BY count DESC, family_name ASC LIMIT $1",
        )
        .bind(top)
        .fetch_all(&self.pool)
        .await?;
        Ok(counts)
    }

    /// Most recently added records, trimmed to name and date fields.
    pub async fn recent(&self, n: i64) -> Result<Vec<RecentPlant>, ApiError> {
        let plants = sqlx::query_as::<_, RecentPlant>(
            "SELECT id, local_name, scientific_name, created_at FROM plants \
             ORDER BY created_at DESC LIMIT $1",
        )
        .bind(n)
        .fetch_all(&self.pool)
        .await?;
        Ok(plants)
    }

    pub async fn count_all(&self) -> Result<i64, ApiError> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM plants")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }
}
