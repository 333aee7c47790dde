//! # デモサービス
//!
//! エンベロープ形式のレスポンスを返す小さな JSON API。
//! ルーター構築をライブラリとして公開し、統合テストから呼び出せるようにする。

pub mod config;
pub mod handler;
pub mod state;

use std::sync::Arc;

use axum::{
   Router,
   routing::get,
};
use handler::{create_item, fallback, get_item, health_check, list_items};
pub use state::{AppState, Catalog, Item};
use tower_http::trace::TraceLayer;

/// ルーターを構築する
pub fn router(state: Arc<AppState>) -> Router {
   Router::new()
      .route("/health", get(health_check))
      .route("/api/v1/items", get(list_items).post(create_item))
      .route("/api/v1/items/{id}", get(get_item))
      .fallback(fallback)
      .with_state(state)
      .layer(TraceLayer::new_for_http())
}
