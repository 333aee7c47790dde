//! # Observability 基盤
//!
//! トレーシング初期化とログ出力形式の設定を提供する。
//!
//! - 環境変数 `LOG_FORMAT` による JSON / Pretty 出力の切り替え
//! - `RUST_LOG` によるログレベル制御（未設定時は [`DEFAULT_FILTER`]）
//! - `tracing_error::ErrorLayer` の登録。これがないと `ApiError` の
//!   `SpanTrace` が空になり、エラーレスポンスの `meta.trace` が出力されない

/// `RUST_LOG` 未設定時のフィルタ
pub const DEFAULT_FILTER: &str = "info,api_response=debug";

/// ログ出力形式
///
/// 環境変数 `LOG_FORMAT` で切り替える。
/// 値が未設定または不正な場合は [`Pretty`](LogFormat::Pretty) にフォールバックする。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
   /// JSON 形式（本番環境向け）
   Json,
   /// 人間が読みやすい形式（開発環境向け）
   #[default]
   Pretty,
}

impl LogFormat {
   /// 文字列からログ形式をパースする
   ///
   /// 前後の空白と大文字小文字は無視する。不正な値の場合は
   /// [`Pretty`](LogFormat::Pretty) にフォールバックし、stderr に警告を出力する。
   pub fn parse(s: &str) -> Self {
      match s.trim().to_ascii_lowercase().as_str() {
         "json" => Self::Json,
         "pretty" => Self::Pretty,
         _ => {
            eprintln!("WARNING: unknown LOG_FORMAT={s:?}, falling back to pretty");
            Self::Pretty
         }
      }
   }

   /// 環境変数 `LOG_FORMAT` から読み取る
   pub fn from_env() -> Self {
      std::env::var("LOG_FORMAT")
         .map(|val| Self::parse(&val))
         .unwrap_or_default()
   }
}

/// トレーシング初期化設定
#[derive(Debug, Clone)]
pub struct TracingConfig {
   /// サービス名（[`TracingConfig::app_span`] の `service` フィールドに出力）
   pub service_name:   String,
   /// ログ出力形式
   pub log_format:     LogFormat,
   /// `RUST_LOG` 未設定時のフィルタ
   pub default_filter: String,
}

impl TracingConfig {
   /// 新しい設定を作成する
   pub fn new(service_name: impl Into<String>, log_format: LogFormat) -> Self {
      Self {
         service_name: service_name.into(),
         log_format,
         default_filter: DEFAULT_FILTER.to_string(),
      }
   }

   /// 環境変数 `LOG_FORMAT` から出力形式を決定する
   pub fn from_env(service_name: impl Into<String>) -> Self {
      Self::new(service_name, LogFormat::from_env())
   }

   /// `RUST_LOG` 未設定時のフィルタを差し替える
   pub fn with_default_filter(mut self, filter: impl Into<String>) -> Self {
      self.default_filter = filter.into();
      self
   }

   /// サービス全体を包むルートスパンを作成する
   ///
   /// JSON モードでは `span.service` としてログに含まれる。
   #[cfg(feature = "observability")]
   pub fn app_span(&self) -> tracing::Span {
      tracing::info_span!("app", service = %self.service_name)
   }
}

/// トレーシングを初期化する
///
/// `RUST_LOG` が未設定の場合は [`TracingConfig::default_filter`] を使う。
/// グローバル subscriber が既に設定されている場合はエラーを返す。
///
/// JSON モードでは以下のフィールドがトップレベルに出力される:
/// - `timestamp`, `level`, `target`, `message`
#[cfg(feature = "observability")]
pub fn init_tracing(
   config: &TracingConfig,
) -> Result<(), tracing_subscriber::util::TryInitError> {
   use tracing_subscriber::util::SubscriberInitExt;

   let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
      .unwrap_or_else(|_| config.default_filter.as_str().into());

   build_subscriber(config.log_format, env_filter).try_init()
}

#[cfg(feature = "observability")]
fn build_subscriber(
   log_format: LogFormat,
   env_filter: tracing_subscriber::EnvFilter,
) -> impl tracing::Subscriber + Send + Sync {
   use tracing_subscriber::{Layer as _, layer::SubscriberExt};

   let fmt_layer = match log_format {
      LogFormat::Json => tracing_subscriber::fmt::layer()
         .json()
         .flatten_event(true)
         .with_target(true)
         .with_current_span(true)
         .with_span_list(false)
         .boxed(),
      LogFormat::Pretty => tracing_subscriber::fmt::layer().boxed(),
   };

   tracing_subscriber::registry()
      .with(env_filter)
      .with(fmt_layer)
      .with(tracing_error::ErrorLayer::default())
}

#[cfg(test)]
mod tests {
   use super::*;

   // ===== LogFormat::parse テスト =====

   #[test]
   fn test_parse_jsonでjsonを返す() {
      assert_eq!(LogFormat::parse("json"), LogFormat::Json);
   }

   #[test]
   fn test_parse_大文字と空白を無視する() {
      assert_eq!(LogFormat::parse(" JSON "), LogFormat::Json);
      assert_eq!(LogFormat::parse("Pretty"), LogFormat::Pretty);
   }

   #[test]
   fn test_parse_不正な値でprettyにフォールバックする() {
      assert_eq!(LogFormat::parse("unknown"), LogFormat::Pretty);
      assert_eq!(LogFormat::parse(""), LogFormat::Pretty);
   }

   // ===== TracingConfig テスト =====

   #[test]
   fn test_newでデフォルトフィルタが設定される() {
      let config = TracingConfig::new("demo-service", LogFormat::Json);

      assert_eq!(config.service_name, "demo-service");
      assert_eq!(config.log_format, LogFormat::Json);
      assert_eq!(config.default_filter, DEFAULT_FILTER);
   }

   #[test]
   fn test_with_default_filterでフィルタが差し替わる() {
      let config = TracingConfig::new("demo-service", LogFormat::Pretty).with_default_filter("warn");

      assert_eq!(config.default_filter, "warn");
   }

   #[cfg(feature = "observability")]
   #[test]
   fn test_subscriberでspan_traceが有効になる() {
      let config = TracingConfig::new("demo-service", LogFormat::Json);
      let subscriber = build_subscriber(
         config.log_format,
         tracing_subscriber::EnvFilter::new("api_response_shared=info"),
      );

      let names = tracing::subscriber::with_default(subscriber, || {
         let span = config.app_span();
         let _enter = span.enter();
         let trace = tracing_error::SpanTrace::capture();

         let mut names = Vec::new();
         trace.with_spans(|metadata, _| {
            names.push(metadata.name());
            true
         });
         names
      });

      assert_eq!(names, vec!["app"]);
   }
}
