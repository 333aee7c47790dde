//! # アイテムハンドラ
//!
//! ## エンドポイント
//!
//! - `GET /api/v1/items` - アイテム一覧（ページネーション付き）
//! - `GET /api/v1/items/{id}` - アイテム取得
//! - `POST /api/v1/items` - アイテム作成

use std::sync::Arc;

use api_response_core::{ApiError, ApiResponse, Meta, Page, Payload};
use axum::{
   Json,
   extract::{
      Path,
      Query,
      State,
      rejection::{JsonRejection, PathRejection, QueryRejection},
   },
   http::{HeaderMap, HeaderValue, StatusCode, header},
};
use serde::Deserialize;
use validator::Validate;

use crate::state::AppState;

const ITEMS_PATH: &str = "/api/v1/items";
const DEFAULT_PER_PAGE: u64 = 10;
const MAX_PER_PAGE: u64 = 100;

// --- リクエスト型 ---

/// 一覧取得のクエリパラメータ
#[derive(Debug, Deserialize)]
pub struct ListItemsQuery {
   pub page:     Option<u64>,
   pub per_page: Option<u64>,
}

/// アイテム作成リクエスト
#[derive(Debug, Deserialize, Validate)]
pub struct CreateItemRequest {
   #[validate(length(min = 1, max = 100, message = "The name must be between 1 and 100 characters."))]
   pub name:  String,
   #[validate(range(min = 1, message = "The price must be at least 1."))]
   pub price: u32,
}

// --- ハンドラ ---

/// GET /api/v1/items
///
/// `paginate` にページ情報を含む一覧を返す。
#[tracing::instrument(skip_all)]
pub async fn list_items(
   State(state): State<Arc<AppState>>,
   query: Result<Query<ListItemsQuery>, QueryRejection>,
) -> ApiResponse {
   let query = match query {
      Ok(Query(query)) => query,
      Err(rejection) => return rejected(&state, rejection.status(), rejection.body_text()),
   };

   let page = query.page.unwrap_or(1).max(1);
   let per_page = query
      .per_page
      .unwrap_or(DEFAULT_PER_PAGE)
      .clamp(1, MAX_PER_PAGE);

   let (items, total) = state.catalog.page(page, per_page).await;
   let page = Page::new(items, total, per_page, page).with_path(ITEMS_PATH);

   match Payload::try_from(page) {
      Ok(payload) => state.responses.success(payload, Meta::new(), HeaderMap::new()),
      Err(e) => state.responses.render_error(&ApiError::from(e)),
   }
}

/// GET /api/v1/items/{id}
///
/// ## レスポンス
///
/// - `200 OK`: アイテム
/// - `404 Not Found`: アイテムが存在しない（`ModelNotFoundException`）
#[tracing::instrument(skip_all)]
pub async fn get_item(
   State(state): State<Arc<AppState>>,
   id: Result<Path<u64>, PathRejection>,
) -> ApiResponse {
   let id = match id {
      Ok(Path(id)) => id,
      Err(rejection) => return rejected(&state, rejection.status(), rejection.body_text()),
   };

   let Some(item) = state.catalog.find(id).await else {
      return state
         .responses
         .render_error(&ApiError::model_not_found("Item", id));
   };

   match Payload::from_serialize(&item) {
      Ok(payload) => state.responses.success(payload, Meta::new(), HeaderMap::new()),
      Err(e) => state.responses.render_error(&ApiError::from(e)),
   }
}

/// POST /api/v1/items
///
/// ## レスポンス
///
/// - `201 Created`: 作成されたアイテム（`Location` ヘッダー付き）
/// - `422 Unprocessable Entity`: バリデーションエラー
/// - JSON として読めない本体は extractor のステータスでエラーのエンベロープを返す
#[tracing::instrument(skip_all)]
pub async fn create_item(
   State(state): State<Arc<AppState>>,
   body: Result<Json<CreateItemRequest>, JsonRejection>,
) -> ApiResponse {
   let req = match body {
      Ok(Json(req)) => req,
      Err(rejection) => return rejected(&state, rejection.status(), rejection.body_text()),
   };

   if let Err(errors) = req.validate() {
      return state.responses.render_error(&ApiError::from(errors));
   }

   let item = state.catalog.insert(req.name, req.price).await;
   tracing::info!(item.id = item.id, "アイテムを作成しました");

   let mut headers = HeaderMap::new();
   if let Ok(location) = HeaderValue::from_str(&format!("{ITEMS_PATH}/{}", item.id)) {
      headers.insert(header::LOCATION, location);
   }

   match Payload::from_serialize(&item) {
      Ok(payload) => state
         .responses
         .response(payload, StatusCode::CREATED, Meta::new(), headers),
      Err(e) => state.responses.render_error(&ApiError::from(e)),
   }
}

/// extractor が拒否したリクエストをエラーのエンベロープにする
fn rejected(state: &AppState, status: StatusCode, message: String) -> ApiResponse {
   state
      .responses
      .error(None, status, Meta::new().with("message", message), HeaderMap::new())
}
