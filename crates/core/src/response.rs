//! # レスポンスファクトリ
//!
//! アプリケーションコードとエラーハンドラが呼び出す入口。
//! エンベロープを組み立て、HTTP ステータスとヘッダーと一緒に [`ApiResponse`]
//! として返す。
//!
//! ## 操作一覧
//!
//! | 操作 | ステータス | 本体 |
//! |------|-----------|------|
//! | [`ok`](ResponseFactory::ok) | 200 | `"OK"` |
//! | [`success`](ResponseFactory::success) | 200 | 任意のペイロード |
//! | [`response`](ResponseFactory::response) | 任意 | 任意のペイロード |
//! | [`error`](ResponseFactory::error) | 任意（通常 400） | 空（情報は `meta` に入る） |
//! | [`not_found`](ResponseFactory::not_found) | 404 | 空（`meta.message = "Not Found"`） |
//! | [`render_error`](ResponseFactory::render_error) | エラー種別から決定 | 空 |
//!
//! HTTP への書き出しはホスト側の責務。`axum` feature を有効にすると
//! [`ApiResponse`] が `IntoResponse` を実装する。

use std::sync::Arc;

use http::{HeaderMap, StatusCode};
use serde_json::{Map, Value};

use crate::{
   builder::{Envelope, EnvelopeBuilder},
   config::EnvelopeConfig,
   error::{ApiError, ErrorKind},
   meta::Meta,
   payload::Payload,
   value::deep_merge,
};

/// `not_found` のデフォルトメッセージ
const NOT_FOUND_MESSAGE: &str = "Not Found";

/// HTTP 層に渡すレスポンス
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
   status:  StatusCode,
   headers: HeaderMap,
   body:    Envelope,
}

impl ApiResponse {
   pub fn status(&self) -> StatusCode {
      self.status
   }

   pub fn headers(&self) -> &HeaderMap {
      &self.headers
   }

   pub fn body(&self) -> &Envelope {
      &self.body
   }

   /// ステータス、ヘッダー、エンベロープに分解する
   pub fn into_parts(self) -> (StatusCode, HeaderMap, Envelope) {
      (self.status, self.headers, self.body)
   }
}

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for ApiResponse {
   fn into_response(self) -> axum::response::Response {
      (self.status, self.headers, axum::Json(self.body)).into_response()
   }
}

/// レスポンスファクトリ
///
/// 起動時に構築した設定を `Arc` で共有する。クローンは安価。
///
/// ## 使用例
///
/// ```
/// use std::sync::Arc;
///
/// use api_response_core::{EnvelopeConfig, Meta, ResponseFactory};
/// use http::{HeaderMap, StatusCode};
///
/// let responses = ResponseFactory::new(Arc::new(EnvelopeConfig::default()));
///
/// let response = responses.success("OK", Meta::new(), HeaderMap::new());
/// assert_eq!(response.status(), StatusCode::OK);
/// assert_eq!(response.body()["data"], "OK");
/// assert_eq!(response.body()["status"], "success");
/// ```
#[derive(Debug, Clone)]
pub struct ResponseFactory {
   config: Arc<EnvelopeConfig>,
}

impl ResponseFactory {
   pub fn new(config: Arc<EnvelopeConfig>) -> Self {
      Self { config }
   }

   pub fn config(&self) -> &EnvelopeConfig {
      &self.config
   }

   fn builder(&self) -> EnvelopeBuilder<'_> {
      EnvelopeBuilder::new(&self.config)
   }

   /// 任意のステータスでレスポンスを作成する
   pub fn response(
      &self,
      payload: impl Into<Payload>,
      status: StatusCode,
      meta: impl Into<Meta>,
      headers: HeaderMap,
   ) -> ApiResponse {
      ApiResponse {
         status,
         headers,
         body: self.builder().make_envelope(payload.into(), status, meta.into()),
      }
   }

   /// 本体が `"OK"` の 200 レスポンスを作成する
   pub fn ok(&self, meta: impl Into<Meta>, headers: HeaderMap) -> ApiResponse {
      self.response("OK", StatusCode::OK, meta, headers)
   }

   /// 200 レスポンスを作成する
   pub fn success(
      &self,
      payload: impl Into<Payload>,
      meta: impl Into<Meta>,
      headers: HeaderMap,
   ) -> ApiResponse {
      self.response(payload, StatusCode::OK, meta, headers)
   }

   /// エラーレスポンスを作成する
   ///
   /// `error` を渡した場合、`meta` に以下を追加する:
   /// - `exception`: エラー種別名
   /// - `message`: エラーメッセージ
   /// - `errors`: フィールドごとのメッセージ（バリデーションエラーのみ）
   /// - `trace`: キャプチャしたスパン（例外詳細の出力が有効な場合のみ）
   ///
   /// 本体は常に空になる。
   pub fn error(
      &self,
      error: Option<&ApiError>,
      status: StatusCode,
      meta: impl Into<Meta>,
      headers: HeaderMap,
   ) -> ApiResponse {
      let mut meta = meta.into();

      if let Some(error) = error {
         meta.insert("exception", error.kind().name());
         meta.insert("message", error.message());

         if error.kind() == ErrorKind::Validation {
            meta.insert("errors", field_errors_value(error));
         }

         if self.config.expose_exception_details() {
            let mut trace = Map::new();
            trace.insert("trace".to_string(), Value::Array(error.trace()));
            let mut merged = meta.into_map();
            deep_merge(&mut merged, trace, self.config.list_merge());
            meta = Meta::from(merged);
         }
      }

      self.response(Payload::empty(), status, meta, headers)
   }

   /// 404 レスポンスを作成する
   ///
   /// `meta.message` のデフォルトは `"Not Found"`。呼び出し側の `meta` が優先される。
   pub fn not_found(&self, meta: impl Into<Meta>, headers: HeaderMap) -> ApiResponse {
      let mut merged = Meta::new().with("message", NOT_FOUND_MESSAGE).into_map();
      deep_merge(&mut merged, meta.into().into_map(), self.config.list_merge());

      self.response(Payload::empty(), StatusCode::NOT_FOUND, merged, headers)
   }

   /// エラー値をエラー種別に応じたステータスのレスポンスに変換する
   ///
   /// 5xx はエラーログ、4xx はデバッグログを出力する。
   pub fn render_error(&self, error: &ApiError) -> ApiResponse {
      let status = error.status_code();

      if status.is_server_error() {
         tracing::error!(
            error.kind = error.kind().name(),
            span_trace = %error.span_trace(),
            "内部エラー: {}",
            error
         );
      } else {
         tracing::debug!(
            error.kind = error.kind().name(),
            status = status.as_u16(),
            "エラーレスポンスを返します: {}",
            error
         );
      }

      self.error(
         Some(error),
         status,
         Meta::new().with("exception", error.kind().name()),
         HeaderMap::new(),
      )
   }
}

fn field_errors_value(error: &ApiError) -> Value {
   Value::Object(
      error
         .field_errors()
         .iter()
         .map(|(field, messages)| {
            let messages = messages.iter().cloned().map(Value::String).collect();
            (field.clone(), Value::Array(messages))
         })
         .collect(),
   )
}

#[cfg(test)]
mod tests {
   use http::HeaderValue;
   use pretty_assertions::assert_eq;
   use rstest::rstest;
   use serde_json::json;
   use tracing_subscriber::layer::SubscriberExt as _;

   use super::*;
   use crate::{error::FieldErrors, value::ListMergePolicy};

   fn factory(config: EnvelopeConfig) -> ResponseFactory {
      ResponseFactory::new(Arc::new(config))
   }

   fn body(response: &ApiResponse) -> Value {
      response.body().clone().into_value()
   }

   #[test]
   fn test_okは本体がokの200レスポンス() {
      let response = factory(EnvelopeConfig::default()).ok(Meta::new(), HeaderMap::new());

      assert_eq!(response.status(), StatusCode::OK);
      assert_eq!(body(&response), json!({ "data": "OK", "status": "success" }));
   }

   #[test]
   fn test_responseでヘッダーとステータスがそのまま渡される() {
      let mut headers = HeaderMap::new();
      headers.insert("x-request-id", HeaderValue::from_static("req-1"));

      let response = factory(EnvelopeConfig::default()).response(
         json!({ "id": 1 }),
         StatusCode::CREATED,
         Meta::new(),
         headers,
      );

      assert_eq!(response.status(), StatusCode::CREATED);
      assert_eq!(response.headers()["x-request-id"], "req-1");
      assert_eq!(body(&response)["status"], json!("success"));
   }

   #[test]
   fn test_not_foundのデフォルトメッセージ() {
      let response = factory(EnvelopeConfig::default()).not_found(Meta::new(), HeaderMap::new());

      assert_eq!(response.status(), StatusCode::NOT_FOUND);
      assert_eq!(
         body(&response),
         json!({ "data": [], "meta": { "message": "Not Found" }, "status": "error" })
      );
   }

   #[test]
   fn test_not_foundで呼び出し側のmetaが優先される() {
      let response = factory(EnvelopeConfig::default()).not_found(
         Meta::new().with("message", "Item missing").with("id", 3),
         HeaderMap::new(),
      );

      assert_eq!(
         body(&response)["meta"],
         json!({ "message": "Item missing", "id": 3 })
      );
   }

   #[test]
   fn test_エラー値なしのerrorは本体が空でmetaのみ() {
      let response = factory(EnvelopeConfig::default()).error(
         None,
         StatusCode::BAD_REQUEST,
         Meta::new().with("message", "Insufficient balance"),
         HeaderMap::new(),
      );

      assert_eq!(response.status(), StatusCode::BAD_REQUEST);
      assert_eq!(
         body(&response),
         json!({
            "data": [],
            "meta": { "message": "Insufficient balance" },
            "status": "error",
         })
      );
   }

   #[test]
   fn test_バリデーションエラーでerrorsが出力される() {
      let mut field_errors = FieldErrors::new();
      field_errors.insert("name".to_string(), vec!["Required.".to_string()]);
      let err = ApiError::validation(field_errors);

      let response = factory(EnvelopeConfig::default().without_exception_details()).error(
         Some(&err),
         StatusCode::UNPROCESSABLE_ENTITY,
         Meta::new(),
         HeaderMap::new(),
      );

      assert_eq!(
         body(&response),
         json!({
            "data": [],
            "meta": {
               "exception": "ValidationException",
               "message": "Required.",
               "errors": { "name": ["Required."] },
            },
            "status": "error",
         })
      );
   }

   #[test]
   fn test_例外詳細が有効ならtraceが出力される() {
      let subscriber = tracing_subscriber::registry().with(tracing_error::ErrorLayer::default());
      let _guard = tracing::subscriber::set_default(subscriber);
      let span = tracing::info_span!("checkout");
      let _enter = span.enter();

      let err = ApiError::internal("boom");
      let response = factory(EnvelopeConfig::default()).render_error(&err);

      let trace = &body(&response)["meta"]["trace"];
      assert_eq!(trace[0]["span"], json!("checkout"));
   }

   #[test]
   fn test_例外詳細が無効ならtraceが出力されない() {
      let subscriber = tracing_subscriber::registry().with(tracing_error::ErrorLayer::default());
      let _guard = tracing::subscriber::set_default(subscriber);
      let span = tracing::info_span!("checkout");
      let _enter = span.enter();

      let err = ApiError::internal("boom");
      let response =
         factory(EnvelopeConfig::default().without_exception_details()).render_error(&err);

      assert!(body(&response)["meta"].get("trace").is_none());
   }

   #[rstest]
   #[case(ListMergePolicy::Concat, 2)]
   #[case(ListMergePolicy::Replace, 1)]
   fn test_呼び出し側のtraceとキャプチャしたtraceの統合(
      #[case] policy: ListMergePolicy,
      #[case] expected_len: usize,
   ) {
      let subscriber = tracing_subscriber::registry().with(tracing_error::ErrorLayer::default());
      let _guard = tracing::subscriber::set_default(subscriber);
      let span = tracing::info_span!("checkout");
      let _enter = span.enter();

      let err = ApiError::internal("boom");
      let response = factory(EnvelopeConfig::default().with_list_merge(policy)).error(
         Some(&err),
         StatusCode::INTERNAL_SERVER_ERROR,
         Meta::new().with("trace", json!(["caller-frame"])),
         HeaderMap::new(),
      );

      let trace = body(&response)["meta"]["trace"].as_array().unwrap().clone();
      assert_eq!(trace.len(), expected_len);
      assert_eq!(trace[expected_len - 1]["span"], json!("checkout"));
      if policy == ListMergePolicy::Concat {
         assert_eq!(trace[0], json!("caller-frame"));
      }
   }

   #[test]
   fn test_render_errorでエラー種別からステータスが決まる() {
      let responses = factory(EnvelopeConfig::default());

      let cases = [
         (ApiError::authentication("Unauthenticated."), StatusCode::UNAUTHORIZED),
         (ApiError::access_denied("Forbidden."), StatusCode::FORBIDDEN),
         (ApiError::not_found("No route."), StatusCode::NOT_FOUND),
         (ApiError::model_not_found("Item", 1), StatusCode::NOT_FOUND),
         (ApiError::validation(FieldErrors::new()), StatusCode::UNPROCESSABLE_ENTITY),
         (ApiError::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR),
      ];

      for (err, expected) in cases {
         let response = responses.render_error(&err);
         assert_eq!(response.status(), expected, "{:?}", err.kind());
         assert_eq!(
            body(&response)["meta"]["exception"],
            json!(err.kind().name())
         );
         assert_eq!(body(&response)["status"], json!("error"));
      }
   }

   #[test]
   fn test_into_partsで分解できる() {
      let response = factory(EnvelopeConfig::default()).ok(Meta::new(), HeaderMap::new());

      let (status, headers, envelope) = response.into_parts();

      assert_eq!(status, StatusCode::OK);
      assert!(headers.is_empty());
      assert_eq!(envelope.get("data"), Some(&json!("OK")));
   }
}
