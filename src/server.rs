//! HTTP front end. Every request opens its own `ItemsDb` on a blocking
//! thread, makes one repository call and closes it again.

use std::path::PathBuf;

use anyhow::{Context, Result};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tower_http::services::ServeDir;

use crate::config::Config;
use crate::error::ItemsError;
use crate::model::{Item, ItemPatch};
use crate::repo::ItemsDb;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
}

pub struct ApiError(anyhow::Error);

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0.downcast_ref::<ItemsError>() {
            Some(ItemsError::InvalidItemId(_)) => StatusCode::NOT_FOUND,
            Some(ItemsError::MissingSummary) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            log::error!("request failed: {:#}", self.0);
        }
        let message = match self.0.downcast_ref::<ItemsError>() {
            Some(e) => e.to_string(),
            None => format!("{:#}", self.0),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Run `f` against a freshly opened database on the blocking pool.
async fn with_db<T, F>(config: Config, f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&ItemsDb) -> Result<T> + Send + 'static,
{
    let value = tokio::task::spawn_blocking(move || config.with_db(f))
        .await
        .context("database task panicked")??;
    Ok(value)
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub owner: Option<String>,
    pub state: Option<String>,
}

async fn list_items(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Item>>, ApiError> {
    let items = with_db(state.config, move |db| {
        Ok(db.list_items(query.owner.as_deref(), query.state.as_deref())?)
    })
    .await?;
    Ok(Json(items))
}

async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Item>, ApiError> {
    let item = with_db(state.config, move |db| Ok(db.get_item(id)?)).await?;
    Ok(Json(item))
}

async fn add_item(
    State(state): State<AppState>,
    Json(item): Json<Item>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let id = with_db(state.config, move |db| Ok(db.add_item(&item)?)).await?;
    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    with_db(state.config, move |db| Ok(db.delete_item(id)?)).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(mods): Json<ItemPatch>,
) -> Result<StatusCode, ApiError> {
    with_db(state.config, move |db| Ok(db.update_item(id, &mods)?)).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn start_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    with_db(state.config, move |db| Ok(db.start(id)?)).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn finish_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    with_db(state.config, move |db| Ok(db.finish(id)?)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router(config: Config, static_dir: Option<PathBuf>) -> Router {
    let app = Router::new()
        .route("/items", get(list_items).post(add_item))
        .route(
            "/items/{id}",
            get(get_item).patch(update_item).delete(delete_item),
        )
        .route("/items/{id}/start", post(start_item))
        .route("/items/{id}/finish", post(finish_item))
        .with_state(AppState { config });
    match static_dir {
        Some(dir) => app.fallback_service(ServeDir::new(dir).append_index_html_on_directories(true)),
        None => app,
    }
}

pub async fn serve(config: Config, bind: &str, static_dir: Option<PathBuf>) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;
    log::info!(
        "serving items from {} on http://{}",
        config.db_dir.display(),
        listener.local_addr()?
    );
    axum::serve(listener, router(config, static_dir))
        .await
        .context("server error")
}
