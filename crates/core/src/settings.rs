//! # 外部設定の読み込み
//!
//! 設定ファイル（TOML）と環境変数から [`EnvelopeSettings`] を読み込み、
//! [`EnvelopeConfig`] に変換する。起動時に一度だけ呼び出す想定。
//!
//! ## 設定ファイル
//!
//! ```toml
//! wrapper = "data"              # 空文字列でラップを無効化
//! string_field_wrapper = "content"
//! useMeta = true
//! useStatus = true
//! disable_exceptions_details = false
//! meta_list_merge = "concat"    # "concat" | "replace"
//!
//! [pagination]
//! paginate_meta_field = "paginate"
//! exclude_fields = ["from", "to", "links"]
//! ```
//!
//! ## 環境変数
//!
//! `API_RESPONSE__` プレフィックス、`__` 区切りで上書きできる
//! （例: `API_RESPONSE__PAGINATION__PAGINATE_META_FIELD=pager`）。
//! `pagination.exclude_fields` はカンマ区切り。
//!
//! `APP_ENV=production` の場合、`disable_exceptions_details` の値に関わらず
//! 例外詳細は出力しない。

use std::path::Path;

use config::{Config, Environment, File, FileFormat, FileSourceFile};
use serde::Deserialize;
use thiserror::Error;

use crate::{
   config::{
      DEFAULT_PAGINATION_EXCLUDE_FIELDS,
      DEFAULT_PAGINATION_FIELD,
      DEFAULT_STRING_FIELD,
      DEFAULT_WRAPPER,
      EnvelopeConfig,
   },
   value::ListMergePolicy,
};

/// 環境変数のプレフィックス
const ENV_PREFIX: &str = "API_RESPONSE";

/// 設定読み込みエラー
#[derive(Debug, Error)]
pub enum SettingsError {
   /// 設定ソースの読み込みまたはデシリアライズに失敗
   #[error("設定の読み込みに失敗しました: {0}")]
   Load(#[from] config::ConfigError),
}

/// 実行環境
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppEnvironment {
   /// 本番環境（例外詳細を常に隠す）
   Production,
   /// それ以外
   #[default]
   Development,
}

impl AppEnvironment {
   /// 文字列から実行環境をパースする
   ///
   /// `production` / `prod`（大文字小文字を区別しない）のみ本番環境とみなす。
   pub fn parse(s: &str) -> Self {
      match s.trim().to_ascii_lowercase().as_str() {
         "production" | "prod" => Self::Production,
         _ => Self::Development,
      }
   }

   /// 環境変数 `APP_ENV` から読み取る
   pub fn from_env() -> Self {
      std::env::var("APP_ENV")
         .map(|val| Self::parse(&val))
         .unwrap_or_default()
   }

   pub fn is_production(self) -> bool {
      self == Self::Production
   }
}

/// ページネーション関連の設定
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PaginationSettings {
   /// ページネーション情報を置くキー
   pub paginate_meta_field: String,
   /// ページネーション情報から除外するフィールド
   pub exclude_fields:      Vec<String>,
}

impl Default for PaginationSettings {
   fn default() -> Self {
      Self {
         paginate_meta_field: DEFAULT_PAGINATION_FIELD.to_string(),
         exclude_fields:      DEFAULT_PAGINATION_EXCLUDE_FIELDS
            .iter()
            .map(ToString::to_string)
            .collect(),
      }
   }
}

/// 外部設定の内容
///
/// 未指定の項目はデフォルト値になる。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EnvelopeSettings {
   /// ラッパーキー（空文字列で無効化）
   pub wrapper:                    Option<String>,
   /// ラッパー無効時に文字列ペイロードを包むフィールド名
   pub string_field_wrapper:       String,
   pub pagination:                 PaginationSettings,
   #[serde(rename = "useMeta", alias = "usemeta", alias = "use_meta")]
   pub use_meta:                   bool,
   #[serde(rename = "useStatus", alias = "usestatus", alias = "use_status")]
   pub use_status:                 bool,
   pub disable_exceptions_details: bool,
   pub meta_list_merge:            ListMergePolicy,
}

impl Default for EnvelopeSettings {
   fn default() -> Self {
      Self {
         wrapper:                    Some(DEFAULT_WRAPPER.to_string()),
         string_field_wrapper:       DEFAULT_STRING_FIELD.to_string(),
         pagination:                 PaginationSettings::default(),
         use_meta:                   true,
         use_status:                 true,
         disable_exceptions_details: false,
         meta_list_merge:            ListMergePolicy::default(),
      }
   }
}

impl EnvelopeSettings {
   /// 設定ファイル（任意）と環境変数から読み込む
   ///
   /// `path` を指定した場合、そのファイルは存在しなければならない。
   pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
      let file = path.map(|path| File::from(path).required(true));
      let settings = Self::build(file, environment(None))?;
      tracing::debug!(?settings, "エンベロープ設定を読み込みました");
      Ok(settings)
   }

   /// TOML 文字列から読み込む（環境変数は参照しない）
   pub fn from_toml_str(toml: &str) -> Result<Self, SettingsError> {
      let builder = Config::builder().add_source(File::from_str(toml, FileFormat::Toml));
      Ok(builder.build()?.try_deserialize()?)
   }

   fn build(
      file: Option<File<FileSourceFile, FileFormat>>,
      env: Environment,
   ) -> Result<Self, SettingsError> {
      let mut builder = Config::builder();
      if let Some(file) = file {
         builder = builder.add_source(file);
      }
      let config = builder.add_source(env).build()?;
      Ok(config.try_deserialize()?)
   }

   /// 実行環境を考慮して [`EnvelopeConfig`] に変換する
   pub fn into_config(self, environment: AppEnvironment) -> EnvelopeConfig {
      let mut config = EnvelopeConfig::default()
         .with_wrapper(self.wrapper)
         .with_string_field(self.string_field_wrapper)
         .with_pagination_field(self.pagination.paginate_meta_field)
         .with_pagination_exclude_fields(self.pagination.exclude_fields)
         .with_list_merge(self.meta_list_merge);

      if !self.use_meta {
         config = config.without_meta();
      }
      if !self.use_status {
         config = config.without_status();
      }
      if environment.is_production() || self.disable_exceptions_details {
         config = config.without_exception_details();
      }
      config
   }
}

fn environment(source: Option<config::Map<String, String>>) -> Environment {
   Environment::with_prefix(ENV_PREFIX)
      .prefix_separator("__")
      .separator("__")
      .list_separator(",")
      .with_list_parse_key("pagination.exclude_fields")
      .try_parsing(true)
      .source(source)
}
