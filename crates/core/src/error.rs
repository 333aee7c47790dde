//! # API エラー定義
//!
//! エラーレスポンスの元になるエラー値と、その種別から HTTP ステータスへの
//! 対応を定義する。
//!
//! ## 構造
//!
//! `std::io::Error` と同じ struct + enum パターンを採用:
//! - [`ApiError`]: エラー種別、メッセージ、フィールドエラー、[`SpanTrace`] を保持する
//! - [`ErrorKind`]: エラーの種別
//!
//! ## エラー種別と HTTP ステータスの対応
//!
//! | エラー種別 | HTTP ステータス | `meta.exception` |
//! |-----------|----------------|------------------|
//! | `Authentication` | 401 Unauthorized | `AuthenticationException` |
//! | `AccessDenied` | 403 Forbidden | `AccessDeniedHttpException` |
//! | `NotFound` | 404 Not Found | `NotFoundHttpException` |
//! | `ModelNotFound` | 404 Not Found | `ModelNotFoundException` |
//! | `Validation` | 422 Unprocessable Entity | `ValidationException` |
//! | `Internal` | 500 Internal Server Error | `Exception` |

use std::{collections::BTreeMap, fmt};

use derive_more::Display;
use http::StatusCode;
use serde_json::{Value, json};
use strum::IntoStaticStr;
use tracing_error::SpanTrace;

/// フィールド名 → エラーメッセージ一覧
pub type FieldErrors = BTreeMap<String, Vec<String>>;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// エラー種別
///
/// `Display` は `meta.exception` に出力される種別名を返す。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoStaticStr, strum::Display)]
pub enum ErrorKind {
   /// 認証失敗（ユーザーが誰か不明）
   #[strum(serialize = "AuthenticationException")]
   Authentication,
   /// 認可失敗（ユーザーは特定できたが権限がない）
   #[strum(serialize = "AccessDeniedHttpException")]
   AccessDenied,
   /// ルートやリソースが存在しない
   #[strum(serialize = "NotFoundHttpException")]
   NotFound,
   /// 指定された ID のエンティティが存在しない
   #[strum(serialize = "ModelNotFoundException")]
   ModelNotFound,
   /// 入力値の検証失敗
   #[strum(serialize = "ValidationException")]
   Validation,
   /// 上記に分類できないエラー
   #[strum(serialize = "Exception")]
   Internal,
}

impl ErrorKind {
   /// エラー種別に対応する HTTP ステータスを返す
   pub fn status_code(self) -> StatusCode {
      match self {
         Self::Authentication => StatusCode::UNAUTHORIZED,
         Self::AccessDenied => StatusCode::FORBIDDEN,
         Self::NotFound | Self::ModelNotFound => StatusCode::NOT_FOUND,
         Self::Validation => StatusCode::UNPROCESSABLE_ENTITY,
         Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
      }
   }

   /// `meta.exception` に出力される種別名
   pub fn name(self) -> &'static str {
      self.into()
   }
}

/// エラーレスポンスの元になるエラー値
///
/// 生成時点のスパン情報を [`SpanTrace`] として自動的にキャプチャする。
/// 例外詳細の出力が有効な場合、この情報が `meta.trace` に出力される。
#[derive(Display)]
#[display("{message}")]
pub struct ApiError {
   kind:         ErrorKind,
   message:      String,
   field_errors: FieldErrors,
   source:       Option<BoxError>,
   span_trace:   SpanTrace,
}

impl ApiError {
   /// 種別とメッセージからエラーを作成する
   pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
      Self {
         kind,
         message: message.into(),
         field_errors: FieldErrors::new(),
         source: None,
         span_trace: SpanTrace::capture(),
      }
   }

   // ===== Convenience constructors =====

   /// 認証エラーを生成する
   pub fn authentication(message: impl Into<String>) -> Self {
      Self::new(ErrorKind::Authentication, message)
   }

   /// 認可エラーを生成する
   pub fn access_denied(message: impl Into<String>) -> Self {
      Self::new(ErrorKind::AccessDenied, message)
   }

   /// Not Found エラーを生成する
   pub fn not_found(message: impl Into<String>) -> Self {
      Self::new(ErrorKind::NotFound, message)
   }

   /// エンティティが見つからないエラーを生成する
   pub fn model_not_found(model: &str, id: impl fmt::Display) -> Self {
      Self::new(
         ErrorKind::ModelNotFound,
         format!("No query results for model [{model}] {id}"),
      )
   }

   /// バリデーションエラーを生成する
   ///
   /// メッセージは最初のエラーメッセージと残りの件数から組み立てる。
   pub fn validation(field_errors: FieldErrors) -> Self {
      let message = summarize(&field_errors);
      Self {
         field_errors,
         ..Self::new(ErrorKind::Validation, message)
      }
   }

   /// 予期しないエラーを生成する
   pub fn internal(message: impl Into<String>) -> Self {
      Self::new(ErrorKind::Internal, message)
   }

   /// 原因となったエラーを設定する
   pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
      self.source = Some(source.into());
      self
   }

   // ===== アクセサ =====

   pub fn kind(&self) -> ErrorKind {
      self.kind
   }

   pub fn message(&self) -> &str {
      &self.message
   }

   /// バリデーションエラーのフィールドごとのメッセージ
   pub fn field_errors(&self) -> &FieldErrors {
      &self.field_errors
   }

   pub fn span_trace(&self) -> &SpanTrace {
      &self.span_trace
   }

   /// エラー種別に対応する HTTP ステータス
   pub fn status_code(&self) -> StatusCode {
      self.kind.status_code()
   }

   /// キャプチャしたスパンを内側から順にフレームとして返す
   ///
   /// `tracing_error::ErrorLayer` が登録されていない場合は空になる。
   pub fn trace(&self) -> Vec<Value> {
      let mut frames = Vec::new();
      self.span_trace.with_spans(|metadata, fields| {
         frames.push(json!({
            "span": metadata.name(),
            "target": metadata.target(),
            "file": metadata.file(),
            "line": metadata.line(),
            "fields": fields,
         }));
         true
      });
      frames
   }
}

fn summarize(field_errors: &FieldErrors) -> String {
   let mut messages = field_errors.values().flatten();
   let Some(first) = messages.next() else {
      return "The given data was invalid.".to_string();
   };
   match messages.count() {
      0 => first.clone(),
      1 => format!("{first} (and 1 more error)"),
      rest => format!("{first} (and {rest} more errors)"),
   }
}

// ===== トレイト実装 =====

impl fmt::Debug for ApiError {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.debug_struct("ApiError")
         .field("kind", &self.kind)
         .field("message", &self.message)
         .field("field_errors", &self.field_errors)
         .field("source", &self.source)
         .field("span_trace", &self.span_trace)
         .finish()
   }
}

impl std::error::Error for ApiError {
   fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
      self
         .source
         .as_deref()
         .map(|source| source as &(dyn std::error::Error + 'static))
   }
}

// ===== From 実装（SpanTrace 自動キャプチャ） =====

impl From<validator::ValidationErrors> for ApiError {
   fn from(errors: validator::ValidationErrors) -> Self {
      let field_errors = errors
         .field_errors()
         .into_iter()
         .map(|(field, errors)| {
            let field = field.to_string();
            let messages = errors
               .iter()
               .map(|error| match &error.message {
                  Some(message) => message.to_string(),
                  None => format!("The {field} field is invalid ({}).", error.code),
               })
               .collect();
            (field, messages)
         })
         .collect();
      Self::validation(field_errors).with_source(errors)
   }
}

impl From<serde_json::Error> for ApiError {
   fn from(source: serde_json::Error) -> Self {
      Self::internal(source.to_string()).with_source(source)
   }
}
