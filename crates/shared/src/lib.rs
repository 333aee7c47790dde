//! # API Response 共有ユーティリティ
//!
//! ワークスペース内のサービスで共通に使うユーティリティを提供する。
//!
//! ## 設計方針
//!
//! - レスポンス整形のロジックは含めない（`api-response-core` の責務）
//! - 外部クレートへの依存は feature で切り替え、最小限に抑える

pub mod observability;

pub use observability::{LogFormat, TracingConfig};
