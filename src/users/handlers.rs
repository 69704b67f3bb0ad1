use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{error, instrument};

use crate::model::Snowflake;
use crate::mods::dto::{ModShape, Pagination};
use crate::reviews::dto::ReviewShape;
use crate::state::AppState;
use crate::users::dto::UserShape;
use crate::users::repo;
use crate::{mods, reviews};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/:id", get(get_user))
        .route("/users/:id/mods", get(get_user_mods))
        .route("/users/:id/favourites", get(get_user_favourites))
        .route("/users/:id/reviews", get(get_user_reviews))
}

fn internal<E: std::fmt::Display>(e: E) -> (StatusCode, String) {
    error!(error = %e, "internal error");
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".into())
}

fn user_not_found(id: Snowflake) -> (StatusCode, String) {
    (StatusCode::NOT_FOUND, format!("User '{id}' not found"))
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    Query(p): Query<Pagination>,
) -> Result<Json<Vec<UserShape>>, (StatusCode, String)> {
    let records = repo::page(&state.db, p.limit, p.offset)
        .await
        .map_err(internal)?;
    let shapes = records
        .iter()
        .map(UserShape::from_record)
        .collect::<Result<Vec<_>, _>>()
        .map_err(internal)?;
    Ok(Json(shapes))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Snowflake>,
) -> Result<Json<UserShape>, (StatusCode, String)> {
    let record = repo::find_hydrated(&state.db, id)
        .await
        .map_err(internal)?
        .ok_or_else(|| user_not_found(id))?;
    let shape = UserShape::from_record(&record).map_err(internal)?;
    Ok(Json(shape))
}

#[instrument(skip(state))]
pub async fn get_user_mods(
    State(state): State<AppState>,
    Path(id): Path<Snowflake>,
) -> Result<Json<Vec<ModShape>>, (StatusCode, String)> {
    if repo::find_by_id(&state.db, id).await.map_err(internal)?.is_none() {
        return Err(user_not_found(id));
    }
    let mut records = mods::repo::list_by_author(&state.db, id)
        .await
        .map_err(internal)?;
    mods::repo::hydrate_all(&state.db, &mut records)
        .await
        .map_err(internal)?;
    let shapes = records
        .iter()
        .map(ModShape::from_record)
        .collect::<Result<Vec<_>, _>>()
        .map_err(internal)?;
    Ok(Json(shapes))
}

#[instrument(skip(state))]
pub async fn get_user_favourites(
    State(state): State<AppState>,
    Path(id): Path<Snowflake>,
) -> Result<Json<Vec<ModShape>>, (StatusCode, String)> {
    if repo::find_by_id(&state.db, id).await.map_err(internal)?.is_none() {
        return Err(user_not_found(id));
    }
    let mut records = mods::repo::list_favourites_of(&state.db, id)
        .await
        .map_err(internal)?;
    mods::repo::hydrate_all(&state.db, &mut records)
        .await
        .map_err(internal)?;
    let shapes = records
        .iter()
        .map(ModShape::from_record)
        .collect::<Result<Vec<_>, _>>()
        .map_err(internal)?;
    Ok(Json(shapes))
}

#[instrument(skip(state))]
pub async fn get_user_reviews(
    State(state): State<AppState>,
    Path(id): Path<Snowflake>,
    Query(p): Query<Pagination>,
) -> Result<Json<Vec<ReviewShape>>, (StatusCode, String)> {
    if repo::find_by_id(&state.db, id).await.map_err(internal)?.is_none() {
        return Err(user_not_found(id));
    }
    let records = reviews::repo::page_by_author(&state.db, id, p.limit, p.offset)
        .await
        .map_err(internal)?;
    Ok(Json(records.iter().map(ReviewShape::from_record).collect()))
}
