use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use evc_core::{SortOrder, Station, StatusFilter};
use evc_engine::{Engine, EngineError};
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;

#[derive(Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct StationQuery {
    pub status: StatusFilter,
    pub sort: SortOrder,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReloadResponse {
    pub count: usize,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteResponse {
    pub station_id: String,
    pub is_favorite: bool,
}

/// List stations, filtered by status and sorted
pub async fn list_stations(
    State(engine): State<Arc<Engine>>,
    Query(query): Query<StationQuery>,
) -> Json<Vec<Station>> {
    Json(engine.list_stations(query.status, query.sort))
}

pub async fn reload_stations(State(engine): State<Arc<Engine>>) -> ApiResult<Json<ReloadResponse>> {
    let count = engine.load_stations().await?;
    Ok(Json(ReloadResponse { count }))
}

pub async fn get_station(
    State(engine): State<Arc<Engine>>,
    Path(station_id): Path<String>,
) -> ApiResult<Json<Station>> {
    let station = engine
        .station(&station_id)
        .ok_or(EngineError::StationNotFound(station_id))?;
    Ok(Json(station))
}

pub async fn toggle_favorite(
    State(engine): State<Arc<Engine>>,
    Path(station_id): Path<String>,
) -> ApiResult<Json<FavoriteResponse>> {
    let is_favorite = engine.toggle_favorite(&station_id)?;
    Ok(Json(FavoriteResponse {
        station_id,
        is_favorite,
    }))
}

pub async fn select_station(
    State(engine): State<Arc<Engine>>,
    Path(station_id): Path<String>,
) -> ApiResult<Json<Station>> {
    Ok(Json(engine.select_station(&station_id)?))
}

pub async fn list_favorites(State(engine): State<Arc<Engine>>) -> Json<Vec<Station>> {
    Json(engine.favorite_stations())
}
