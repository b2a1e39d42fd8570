use axum::{
    extract::{Extension, Multipart, Path, State},
    http::StatusCode,
    response::Json,
};
use serde_json::{json, Map, Value};

use crate::error::ApiError;
use crate::handlers::forms::PlantForm;
use crate::handlers::plants::parse_plant_id;
use crate::middleware::auth::CurrentAdmin;
use crate::state::AppState;

/// POST /admin/plants - create a catalog record from a multipart form with
/// an optional image file.
pub async fn create_plant(
    State(state): State<AppState>,
    Extension(CurrentAdmin(admin)): Extension<CurrentAdmin>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let mut form = PlantForm::from_multipart(&mut multipart).await?;
    let image = form.image.take();
    let mut new_plant = form.into_new_plant(admin.id)?;

    // Store the upload only after the form validated
    let saved_image = match image {
        Some(image) => {
            let path = state
                .images
                .save(&image.filename, &image.bytes)
                .await
                .map_err(|e| ApiError::internal(e.to_string()))?;
            new_plant.image = Some(path.clone());
            Some(path)
        }
        None => None,
    };

    let plant = match state.plants.create(new_plant).await {
        Ok(plant) => plant,
        Err(e) => {
            // The record never existed, so the stored upload is orphaned
            if let Some(path) = &saved_image {
                state.images.remove(path).await;
            }
            return Err(e);
        }
    };

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Plant created successfully",
            "plant": plant,
        })),
    ))
}

/// PUT /admin/plants/:id - partial update; fields absent from the form keep
/// their stored values. A replacement image retires the old local artifact.
pub async fn update_plant(
    State(state): State<AppState>,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let id = parse_plant_id(&id)?;

    let existing = state
        .plants
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Plant not found"))?;

    let mut form = PlantForm::from_multipart(&mut multipart).await?;
    let image = form.image.take();
    let mut patch = form.into_patch()?;

    let saved_image = match image {
        Some(image) => {
            let path = state
                .images
                .save(&image.filename, &image.bytes)
                .await
                .map_err(|e| ApiError::internal(e.to_string()))?;
            patch.image = Some(path.clone());
            Some(path)
        }
        None => None,
    };

    let plant = match state.plants.update(id, patch).await {
        Ok(plant) => plant,
        Err(e) => {
            // The record still points at the old image; drop the new upload
            if let Some(path) = &saved_image {
                state.images.remove(path).await;
            }
            return Err(e);
        }
    };

    // Best-effort cleanup of the superseded local artifact; never fails the update
    if saved_image.is_some() && !existing.image.is_empty() {
        state.images.remove(&existing.image).await;
    }

    Ok(Json(json!({
        "success": true,
        "message": "Plant updated successfully",
        "plant": plant,
    })))
}

/// DELETE /admin/plants/:id - remove a record and, best-effort, its locally
/// stored image.
pub async fn delete_plant(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_plant_id(&id)?;

    let deleted = state.plants.delete(id).await?;

    if !deleted.image.is_empty() {
        state.images.remove(&deleted.image).await;
    }

    Ok(Json(json!({
        "success": true,
        "message": "Plant deleted successfully",
    })))
}

/// GET /admin/dashboard - back-office overview numbers.
pub async fn dashboard(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let total_plants = state.plants.count_all().await?;
    let total_families = state.plants.distinct_families().await?.len();
    let recent_plants = state.plants.recent(5).await?;

    let mut habit_stats = Map::new();
    for (habit, count) in state.plants.habit_counts().await? {
        habit_stats.insert(habit, json!(count));
    }

    Ok(Json(json!({
        "success": true,
        "dashboard": {
            "totalPlants": total_plants,
            "totalFamilies": total_families,
            "recentPlants": recent_plants,
            "habitStats": habit_stats,
        },
    })))
}
