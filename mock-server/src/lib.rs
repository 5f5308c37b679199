use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;
use uuid::Uuid;

pub const DEFAULT_BASE_PATH: &str = "/api/items";

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    pub description: String,
    pub done: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Deserialize)]
pub struct NewItem {
    pub description: String,
}

#[derive(Deserialize)]
pub struct ItemUpdate {
    pub description: String,
    pub done: bool,
}

pub type Db = Arc<RwLock<HashMap<String, Item>>>;

pub fn app() -> Router {
    app_with_base(DEFAULT_BASE_PATH)
}

/// Router serving the collection at `base` (e.g. `/api/items`).
pub fn app_with_base(base: &str) -> Router {
    let db: Db = Arc::new(RwLock::new(HashMap::new()));
    let base = format!("/{}", base.trim_matches('/'));
    Router::new()
        .route(&base, get(list_items).post(create_item))
        .route(
            &format!("{base}/{{id}}"),
            get(get_item).put(update_item).delete(delete_item),
        )
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with_base(listener: TcpListener, base: &str) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_base(base)).await
}

/// Oldest first; ties broken by id so the order is deterministic.
async fn list_items(State(db): State<Db>) -> Json<Vec<Item>> {
    let items = db.read().await;
    let mut all: Vec<Item> = items.values().cloned().collect();
    all.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
    Json(all)
}

/// Answers `201` with the new id in `location` and no body.
async fn create_item(
    State(db): State<Db>,
    Json(input): Json<NewItem>,
) -> Result<impl IntoResponse, StatusCode> {
    if input.description.trim().is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    let item = Item {
        id: Uuid::new_v4().to_string(),
        description: input.description,
        done: false,
        created_at: Utc::now(),
    };
    info!(id = %item.id, "item created");
    let id = item.id.clone();
    db.write().await.insert(item.id.clone(), item);
    Ok((StatusCode::CREATED, [(header::LOCATION, id)]))
}

async fn get_item(State(db): State<Db>, Path(id): Path<String>) -> Result<Json<Item>, StatusCode> {
    let items = db.read().await;
    items.get(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn update_item(
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(input): Json<ItemUpdate>,
) -> Result<Json<Item>, StatusCode> {
    let mut items = db.write().await;
    let item = items.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    item.description = input.description;
    item.done = input.done;
    info!(%id, done = item.done, "item updated");
    Ok(Json(item.clone()))
}

async fn delete_item(State(db): State<Db>, Path(id): Path<String>) -> StatusCode {
    let mut items = db.write().await;
    match items.remove(&id) {
        Some(_) => {
            info!(%id, "item deleted");
            StatusCode::NO_CONTENT
        }
        None => StatusCode::NOT_FOUND,
    }
}
