//! # ヘルスチェックハンドラ
//!
//! ```text
//! GET /health
//! ```
//!
//! ## レスポンス例
//!
//! ```json
//! {
//!   "data": "OK",
//!   "meta": { "version": "0.1.0" },
//!   "status": "success"
//! }
//! ```

use std::sync::Arc;

use api_response_core::{ApiResponse, Meta};
use axum::{extract::State, http::HeaderMap};

use crate::state::AppState;

/// ヘルスチェックエンドポイント
///
/// 本体は `"OK"` で、`meta.version` にアプリケーションバージョンを返す。
pub async fn health_check(State(state): State<Arc<AppState>>) -> ApiResponse {
   state.responses.ok(
      Meta::new().with("version", env!("CARGO_PKG_VERSION")),
      HeaderMap::new(),
   )
}
