//! # API レスポンスエンベロープ
//!
//! JSON API のレスポンス本体を統一された形式に整形する。
//!
//! ```json
//! {
//!   "data": [...],
//!   "paginate": { "current_page": 1, "total": 2 },
//!   "meta": { "request_id": "req-1" },
//!   "status": "success"
//! }
//! ```
//!
//! ## 構成
//!
//! - [`EnvelopeConfig`]: ラッパーキー名などの設定。起動時に一度だけ構築する
//! - [`EnvelopeBuilder`]: ペイロード + ステータス + メタデータからエンベロープを組み立てる
//! - [`ResponseFactory`]: アプリケーションとエラーハンドラが呼び出す入口
//! - [`ApiError`]: エラーレスポンスの元になるエラー値と HTTP ステータスの対応
//! - [`EnvelopeSettings`]: 設定ファイル・環境変数からの設定読み込み
//!
//! ## 設計方針
//!
//! - 設定はグローバル状態に持たず、`Arc<EnvelopeConfig>` で注入する
//! - ペイロードの形状はバリアントで明示し、形状ごとに整形関数を分ける
//! - 組み立ては失敗しない。失敗しうる変換（シリアライズ、設定読み込み）は構築時に行う
//! - HTTP への書き出しはホスト側の責務。`axum` feature で `IntoResponse` を提供する

pub mod builder;
pub mod config;
pub mod error;
pub mod meta;
pub mod pagination;
pub mod payload;
pub mod response;
pub mod settings;
pub mod value;

pub use builder::{Envelope, EnvelopeBuilder, Outcome};
pub use config::EnvelopeConfig;
pub use error::{ApiError, ErrorKind, FieldErrors};
pub use meta::Meta;
pub use pagination::{Page, Paginated};
pub use payload::Payload;
pub use response::{ApiResponse, ResponseFactory};
pub use settings::{AppEnvironment, EnvelopeSettings, SettingsError};
pub use value::ListMergePolicy;
