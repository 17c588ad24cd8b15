use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{Path, RawQuery, State as AxumState},
    http::StatusCode,
    response::{Html, IntoResponse},
};

use crate::{
    error::AppError,
    logs::render_log_view,
    state::State,
    users::{NewUser, UserPatch},
    utils::{LogParams, parse_body},
};

type AppState = AxumState<Arc<State>>;

pub async fn root_handler() -> impl IntoResponse {
    (StatusCode::OK, "Hello from userbase!")
}

pub async fn list_users_handler(AxumState(state): AppState) -> Result<impl IntoResponse, AppError> {
    let users = state.users.fetch_all_users().await?;

    Ok((StatusCode::OK, Json(users)))
}

pub async fn get_user_handler(
    AxumState(state): AppState,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let user = state.users.fetch_user(&user_id).await?;

    Ok((StatusCode::OK, Json(user)))
}

pub async fn create_user_handler(
    AxumState(state): AppState,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let new_user: NewUser = parse_body(body)?;
    let user = state.users.create_user(new_user).await?;

    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn update_user_handler(
    AxumState(state): AppState,
    Path(user_id): Path<String>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let patch: UserPatch = parse_body(body)?;
    let user = state.users.update_user(&user_id, patch).await?;

    Ok((StatusCode::OK, Json(user)))
}

pub async fn logs_handler(
    AxumState(state): AppState,
    RawQuery(raw): RawQuery,
) -> Result<impl IntoResponse, AppError> {
    let query = LogParams::from_query(raw.as_deref()).into_query();
    let html = render_log_view(&state.config.log_file, &query).await?;

    Ok((StatusCode::OK, Html(html)))
}
