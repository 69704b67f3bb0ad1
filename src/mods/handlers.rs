use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{error, instrument};

use crate::model::Snowflake;
use crate::mods::dto::{ModShape, Pagination};
use crate::mods::repo;
use crate::mods::repo_types::ModRecord;
use crate::reviews::dto::ReviewShape;
use crate::state::AppState;
use crate::users::dto::UserShape;
use crate::{reviews, users};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/mods", get(list_mods))
        .route("/mods/recent_releases", get(get_recent_releases))
        .route("/mods/popular", get(get_popular))
        .route("/mods/:id", get(get_mod))
        .route("/mods/:id/reviews", get(get_mod_reviews))
        .route("/mods/:id/authors", get(get_mod_authors))
}

fn internal<E: std::fmt::Display>(e: E) -> (StatusCode, String) {
    error!(error = %e, "internal error");
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".into())
}

fn mod_not_found(id: Snowflake) -> (StatusCode, String) {
    (StatusCode::NOT_FOUND, format!("Mod '{id}' not found"))
}

fn shape_all(records: &[ModRecord]) -> Result<Vec<ModShape>, (StatusCode, String)> {
    records
        .iter()
        .map(ModShape::from_record)
        .collect::<Result<Vec<_>, _>>()
        .map_err(internal)
}

/// Verified mods only; unverified ones are invisible to listings.
#[instrument(skip(state))]
pub async fn list_mods(
    State(state): State<AppState>,
    Query(p): Query<Pagination>,
) -> Result<Json<Vec<ModShape>>, (StatusCode, String)> {
    let records = repo::page_verified(&state.db, p.limit, p.offset)
        .await
        .map_err(internal)?;
    Ok(Json(shape_all(&records)?))
}

#[instrument(skip(state))]
pub async fn get_recent_releases(
    State(state): State<AppState>,
) -> Result<Json<Vec<ModShape>>, (StatusCode, String)> {
    let records = repo::recent_releases(&state.db).await.map_err(internal)?;
    Ok(Json(shape_all(&records)?))
}

#[instrument(skip(state))]
pub async fn get_popular(
    State(state): State<AppState>,
) -> Result<Json<Vec<ModShape>>, (StatusCode, String)> {
    let records = repo::popular(&state.db).await.map_err(internal)?;
    Ok(Json(shape_all(&records)?))
}

#[instrument(skip(state))]
pub async fn get_mod(
    State(state): State<AppState>,
    Path(id): Path<Snowflake>,
) -> Result<Json<ModShape>, (StatusCode, String)> {
    let record = repo::find_hydrated(&state.db, id)
        .await
        .map_err(internal)?
        .ok_or_else(|| mod_not_found(id))?;
    let shape = ModShape::from_record(&record).map_err(internal)?;
    Ok(Json(shape))
}

#[instrument(skip(state))]
pub async fn get_mod_reviews(
    State(state): State<AppState>,
    Path(id): Path<Snowflake>,
) -> Result<Json<Vec<ReviewShape>>, (StatusCode, String)> {
    if repo::find_by_id(&state.db, id).await.map_err(internal)?.is_none() {
        return Err(mod_not_found(id));
    }
    let records = reviews::repo::list_by_mod(&state.db, id)
        .await
        .map_err(internal)?;
    Ok(Json(records.iter().map(ReviewShape::from_record).collect()))
}

#[instrument(skip(state))]
pub async fn get_mod_authors(
    State(state): State<AppState>,
    Path(id): Path<Snowflake>,
) -> Result<Json<Vec<UserShape>>, (StatusCode, String)> {
    if repo::find_by_id(&state.db, id).await.map_err(internal)?.is_none() {
        return Err(mod_not_found(id));
    }
    let records = users::repo::list_authors_of_mod(&state.db, id)
        .await
        .map_err(internal)?;
    let shapes = records
        .iter()
        .map(UserShape::from_record)
        .collect::<Result<Vec<_>, _>>()
        .map_err(internal)?;
    Ok(Json(shapes))
}
