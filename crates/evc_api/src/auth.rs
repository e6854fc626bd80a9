use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};
use evc_core::User;
use evc_core::phone::format_kyrgyz_phone;
use evc_engine::{Engine, EngineError};
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeRequest {
    pub phone_number: String,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeResponse {
    pub phone_number: String,
    /// `+996 XXX XX XX XX` form for display
    pub formatted: String,
    pub resend_in_secs: u64,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    pub code: String,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRequest {
    pub name: String,
    pub car_number: String,
}

pub async fn request_code(
    State(engine): State<Arc<Engine>>,
    Json(request): Json<CodeRequest>,
) -> ApiResult<Json<CodeResponse>> {
    let phone_number = engine.request_code(&request.phone_number).await?;
    Ok(Json(CodeResponse {
        formatted: format_kyrgyz_phone(&phone_number),
        resend_in_secs: engine.resend_remaining_secs().unwrap_or_default(),
        phone_number,
    }))
}

pub async fn resend_code(State(engine): State<Arc<Engine>>) -> ApiResult<StatusCode> {
    engine.resend_code().await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn verify_code(
    State(engine): State<Arc<Engine>>,
    Json(request): Json<VerifyRequest>,
) -> ApiResult<Json<User>> {
    let user = engine.verify_code(&request.code).await?;
    tracing::info!("User {} logged in", user.id);
    Ok(Json(user))
}

pub async fn current_user(State(engine): State<Arc<Engine>>) -> ApiResult<Json<User>> {
    let user = engine
        .read(|store| store.auth().user().cloned())
        .ok_or(EngineError::NotAuthenticated)?;
    Ok(Json(user))
}

pub async fn update_profile(
    State(engine): State<Arc<Engine>>,
    Json(request): Json<ProfileRequest>,
) -> ApiResult<Json<User>> {
    let user = engine
        .update_profile(&request.name, &request.car_number)
        .await?;
    Ok(Json(user))
}

pub async fn logout(State(engine): State<Arc<Engine>>) -> ApiResult<StatusCode> {
    engine.logout().await?;
    Ok(StatusCode::NO_CONTENT)
}
