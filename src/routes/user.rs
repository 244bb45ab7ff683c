use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use tracing::instrument;

use crate::core::error::Error;
use crate::core::state::AppState;
use crate::types::request::LoginData;
use crate::types::response;

#[instrument(skip_all)]
pub(crate) async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<LoginData>, JsonRejection>,
) -> Result<Json<response::Signup>, Error> {
    let Json(user_data) = payload?;

    tracing::info!("Received one signup request");

    state
        .user_controller
        .register(&user_data.username, &user_data.password)
        .await?;

    Ok(Json(response::Signup::success()))
}

#[instrument(skip_all)]
pub(crate) async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginData>, JsonRejection>,
) -> Result<Json<response::Login>, Error> {
    let Json(user_data) = payload?;

    tracing::info!("Received one login request");

    let token = state
        .user_controller
        .login(&user_data.username, &user_data.password)
        .await?;

    Ok(Json(response::Login::new(token)))
}
