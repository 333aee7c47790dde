//! # HTTP リクエストハンドラ
//!
//! axum のルートに対応するハンドラ関数を定義する。
//!
//! ## 設計方針
//!
//! - 各ハンドラはサブモジュールに配置し、ここで re-export する
//! - レスポンスは成功・失敗とも [`ResponseFactory`](api_response_core::ResponseFactory)
//!   で組み立て、本体の形式を揃える

pub mod health;
pub mod item;

use std::sync::Arc;

use api_response_core::{ApiResponse, Meta};
use axum::{extract::State, http::HeaderMap};
pub use health::health_check;
pub use item::{create_item, get_item, list_items};

use crate::state::AppState;

/// どのルートにも一致しなかったリクエスト
pub async fn fallback(State(state): State<Arc<AppState>>) -> ApiResponse {
   state.responses.not_found(Meta::new(), HeaderMap::new())
}
