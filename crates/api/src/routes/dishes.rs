//! Dish library routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::models::dish::{CreateDishRequest, UpdateDishRequest};
use domain::models::dish_import::{
    DishImportError, DishImportRequest, DishImportResponse, ImportedByCategory,
};
use domain::models::Dish;
use persistence::repositories::{DishRepository, GroupRepository};
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;

fn dish_not_found() -> ApiError {
    ApiError::NotFound("Dish not found".to_string())
}

/// Add a dish to a group's library.
///
/// POST /api/v1/dishes
pub async fn create_dish(
    State(state): State<AppState>,
    auth: UserAuth,
    Json(request): Json<CreateDishRequest>,
) -> Result<(StatusCode, Json<Dish>), ApiError> {
    state.ensure_can_mutate(&auth)?;
    request.validate()?;

    let dish: Dish = DishRepository::new(state.pool.clone())
        .create(auth.user_id, &request)
        .await?
        .ok_or_else(|| ApiError::NotFound("Group not found".to_string()))?
        .into();

    info!(
        dish_id = %dish.id,
        group_id = %dish.group_id,
        category = %dish.category,
        "Dish created"
    );

    Ok((StatusCode::CREATED, Json(dish)))
}

/// A dish with its recipe.
///
/// GET /api/v1/dishes/:dish_id
pub async fn get_dish(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(dish_id): Path<Uuid>,
) -> Result<Json<Dish>, ApiError> {
    DishRepository::new(state.pool.clone())
        .find_for_user(dish_id, auth.user_id)
        .await?
        .map(|entity| Json(entity.into()))
        .ok_or_else(dish_not_found)
}

/// Edit a dish. Absent fields stay unchanged. A dish already on an event
/// menu cannot move to another course.
///
/// PUT /api/v1/dishes/:dish_id
pub async fn update_dish(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(dish_id): Path<Uuid>,
    Json(request): Json<UpdateDishRequest>,
) -> Result<Json<Dish>, ApiError> {
    state.ensure_can_mutate(&auth)?;
    request.validate()?;

    let repo = DishRepository::new(state.pool.clone());
    if let Some(category) = request.category {
        let current: Dish = repo
            .find_for_user(dish_id, auth.user_id)
            .await?
            .ok_or_else(dish_not_found)?
            .into();
        if current.category != category && repo.is_on_event_menu(dish_id).await? {
            warn!(
                dish_id = %dish_id,
                from = %current.category,
                to = %category,
                "Course change refused for dish on a menu"
            );
            return Err(ApiError::Conflict(
                "This dish is on an event menu, so its course cannot change".to_string(),
            ));
        }
    }

    let dish: Dish = repo
        .update(dish_id, auth.user_id, &request)
        .await?
        .ok_or_else(dish_not_found)?
        .into();

    info!(dish_id = %dish.id, "Dish updated");
    Ok(Json(dish))
}

/// Soft-delete a dish. Events that already list it keep showing it.
///
/// DELETE /api/v1/dishes/:dish_id
pub async fn delete_dish(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(dish_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.ensure_can_mutate(&auth)?;

    if !DishRepository::new(state.pool.clone())
        .soft_delete(dish_id, auth.user_id)
        .await?
    {
        return Err(dish_not_found());
    }

    info!(dish_id = %dish_id, "Dish deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Load many dishes into a group's library at once, e.g. from exported
/// recipe notes. Rows are created one by one; a bad row is reported and
/// the rest still go in.
///
/// POST /api/v1/groups/:group_id/dishes/import
pub async fn import_dishes(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(group_id): Path<Uuid>,
    Json(request): Json<DishImportRequest>,
) -> Result<Json<DishImportResponse>, ApiError> {
    state.ensure_can_mutate(&auth)?;
    request.validate()?;

    GroupRepository::new(state.pool.clone())
        .find_for_user(group_id, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Group not found".to_string()))?;

    let repo = DishRepository::new(state.pool.clone());
    let mut created = 0u32;
    let mut by_category = ImportedByCategory::default();
    let mut images_skipped = 0u32;
    let mut errors = Vec::new();

    for (idx, item) in request.dishes.iter().enumerate() {
        let row = idx + 1;
        let dish = item.to_create_request(group_id);

        if let Err(e) = dish.validate() {
            errors.push(DishImportError {
                row,
                name: dish.name,
                error: ApiError::from(e).to_string(),
            });
            continue;
        }

        match repo.create(auth.user_id, &dish).await {
            Ok(Some(_)) => {
                created += 1;
                by_category.add(dish.category);
                if item.image.is_some() && dish.image_url.is_none() {
                    images_skipped += 1;
                }
            }
            Ok(None) => errors.push(DishImportError {
                row,
                name: dish.name,
                error: "Group not found".to_string(),
            }),
            Err(e) => {
                warn!(group_id = %group_id, row, error = %e, "Dish import row failed");
                errors.push(DishImportError {
                    row,
                    name: dish.name,
                    error: "Failed to save dish".to_string(),
                });
            }
        }
    }

    info!(
        group_id = %group_id,
        processed = request.dishes.len(),
        created,
        failed = errors.len(),
        "Dishes imported"
    );

    Ok(Json(DishImportResponse {
        processed: request.dishes.len() as u32,
        created,
        by_category,
        images_skipped,
        errors,
    }))
}
