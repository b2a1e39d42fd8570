use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::database::query::{page_count, ListPlantsParams, PlantListQuery};
use crate::error::ApiError;
use crate::state::AppState;

/// Aggregate bucket in the stats payload, keyed `_id` on the wire.
#[derive(Debug, Serialize)]
pub struct GroupCount {
    #[serde(rename = "_id")]
    pub id: String,
    pub count: i64,
}

impl From<(String, i64)> for GroupCount {
    fn from((id, count): (String, i64)) -> Self {
        Self { id, count }
    }
}

/// GET /plants - browse the catalog with filtering, search and pagination.
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListPlantsParams>,
) -> Result<Json<Value>, ApiError> {
    let query = PlantListQuery::from_params(&params, &state.config.api)?;
    let (plants, total) = state.plants.list(&query).await?;

    Ok(Json(json!({
        "success": true,
        "plants": plants,
        "pagination": {
            "total": total,
            "page": query.page,
            "pages": page_count(total, query.limit),
        },
    })))
}

/// GET /plants/stats - catalog totals, habit distribution, top families.
pub async fn stats(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let total = state.plants.count_all().await?;
    let by_habit: Vec<GroupCount> = state
        .plants
        .habit_counts()
        .await?
        .into_iter()
        .map(GroupCount::from)
        .collect();
    let top_families: Vec<GroupCount> = state
        .plants
        .family_counts(10)
        .await?
        .into_iter()
        .map(GroupCount::from)
        .collect();

    Ok(Json(json!({
        "success": true,
        "stats": {
            "total": total,
            "byHabit": by_habit,
            "topFamilies": top_families,
        },
    })))
}

/// GET /plants/:id - a single record.
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_plant_id(&id)?;
    let plant = state
        .plants
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Plant not found"))?;

    Ok(Json(json!({
        "success": true,
        "plant": plant,
    })))
}

/// GET /plants/families/list - sorted, duplicate-free family names.
pub async fn families(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let families = state.plants.distinct_families().await?;

    Ok(Json(json!({
        "success": true,
        "families": families,
    })))
}

/// Parse a path id, shaping the failure as a 400 rather than letting a
/// malformed segment surface as a framework rejection.
pub fn parse_plant_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::bad_request("Invalid plant id"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn group_count_uses_mongo_style_key() {
        let value = serde_json::to_value(GroupCount::from(("Herb".to_string(), 4))).unwrap();
        assert_eq!(value, json!({"_id": "Herb", "count": 4}));
    }

    #[test]
    fn malformed_id_is_a_bad_request() {
        let err = parse_plant_id("not-a-uuid").unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(parse_plant_id("8f5a9f6e-30cb-4769-8b2f-9f1f54c4a1bd").is_ok());
    }
}
