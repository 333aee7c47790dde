//! # エンベロープ設定
//!
//! エンベロープの組み立て方を決める設定値。
//!
//! 起動時に一度だけ構築し、以降は `Arc<EnvelopeConfig>` として共有して
//! 読み取り専用で使う。実行中の再設定はサポートしない。
//!
//! 外部の設定ファイル・環境変数からの読み込みは [`crate::settings`] を参照。

use std::collections::BTreeSet;

use crate::value::ListMergePolicy;

/// ラッパーキーのデフォルト値
pub const DEFAULT_WRAPPER: &str = "data";
/// 文字列ペイロードを包むフィールド名のデフォルト値
pub const DEFAULT_STRING_FIELD: &str = "content";
/// ページネーション情報を置くキーのデフォルト値
pub const DEFAULT_PAGINATION_FIELD: &str = "paginate";
/// ページネーション情報から除外するフィールドのデフォルト値
pub const DEFAULT_PAGINATION_EXCLUDE_FIELDS: [&str; 7] = [
   "from",
   "to",
   "first_page_url",
   "last_page_url",
   "prev_page_url",
   "next_page_url",
   "links",
];

/// エンベロープ設定
///
/// ## 使用例
///
/// ```
/// use api_response_core::EnvelopeConfig;
///
/// let config = EnvelopeConfig::default().with_wrapper(None::<String>).without_status();
/// assert_eq!(config.wrapper(), None);
/// assert!(!config.include_status());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvelopeConfig {
   wrapper:                   Option<String>,
   string_field:              String,
   pagination_field:          String,
   pagination_exclude_fields: BTreeSet<String>,
   include_meta:              bool,
   include_status:            bool,
   expose_exception_details:  bool,
   list_merge:                ListMergePolicy,
}

impl Default for EnvelopeConfig {
   fn default() -> Self {
      Self {
         wrapper:                   Some(DEFAULT_WRAPPER.to_string()),
         string_field:              DEFAULT_STRING_FIELD.to_string(),
         pagination_field:          DEFAULT_PAGINATION_FIELD.to_string(),
         pagination_exclude_fields: DEFAULT_PAGINATION_EXCLUDE_FIELDS
            .iter()
            .map(ToString::to_string)
            .collect(),
         include_meta:              true,
         include_status:            true,
         expose_exception_details:  true,
         list_merge:                ListMergePolicy::default(),
      }
   }
}

impl EnvelopeConfig {
   // ===== ビルダーメソッド =====

   /// ラッパーキーを設定する
   ///
   /// `None` または空文字列でラップを無効化し、本体を展開して返すようにする。
   pub fn with_wrapper(mut self, wrapper: Option<impl Into<String>>) -> Self {
      self.wrapper = wrapper.map(Into::into).filter(|key| !key.is_empty());
      self
   }

   /// ラッパー無効時に文字列ペイロードを包むフィールド名を設定する
   pub fn with_string_field(mut self, field: impl Into<String>) -> Self {
      self.string_field = field.into();
      self
   }

   /// ページネーション情報を置くキーを設定する
   pub fn with_pagination_field(mut self, field: impl Into<String>) -> Self {
      self.pagination_field = field.into();
      self
   }

   /// ページネーション情報から除外するフィールドを設定する
   pub fn with_pagination_exclude_fields<I, S>(mut self, fields: I) -> Self
   where
      I: IntoIterator<Item = S>,
      S: Into<String>,
   {
      self.pagination_exclude_fields = fields.into_iter().map(Into::into).collect();
      self
   }

   /// リストの衝突時のマージ方針を設定する
   pub fn with_list_merge(mut self, policy: ListMergePolicy) -> Self {
      self.list_merge = policy;
      self
   }

   /// `meta` キーを出力しない
   pub fn without_meta(mut self) -> Self {
      self.include_meta = false;
      self
   }

   /// `status` キーを出力しない
   pub fn without_status(mut self) -> Self {
      self.include_status = false;
      self
   }

   /// エラー時に `meta.trace` を出力しない
   pub fn without_exception_details(mut self) -> Self {
      self.expose_exception_details = false;
      self
   }

   // ===== アクセサ =====

   pub fn wrapper(&self) -> Option<&str> {
      self.wrapper.as_deref()
   }

   pub fn string_field(&self) -> &str {
      &self.string_field
   }

   pub fn pagination_field(&self) -> &str {
      &self.pagination_field
   }

   pub fn pagination_exclude_fields(&self) -> &BTreeSet<String> {
      &self.pagination_exclude_fields
   }

   pub fn include_meta(&self) -> bool {
      self.include_meta
   }

   pub fn include_status(&self) -> bool {
      self.include_status
   }

   pub fn expose_exception_details(&self) -> bool {
      self.expose_exception_details
   }

   pub fn list_merge(&self) -> ListMergePolicy {
      self.list_merge
   }
}

#[cfg(test)]
mod tests {
   use pretty_assertions::assert_eq;

   use super::*;

   #[test]
   fn test_defaultの値() {
      let config = EnvelopeConfig::default();

      assert_eq!(config.wrapper(), Some("data"));
      assert_eq!(config.string_field(), "content");
      assert_eq!(config.pagination_field(), "paginate");
      assert_eq!(config.pagination_exclude_fields().len(), 7);
      assert!(config.pagination_exclude_fields().contains("links"));
      assert!(config.include_meta());
      assert!(config.include_status());
      assert!(config.expose_exception_details());
      assert_eq!(config.list_merge(), ListMergePolicy::Concat);
   }

   #[test]
   fn test_with_wrapperに空文字列を渡すとラップが無効になる() {
      let config = EnvelopeConfig::default().with_wrapper(Some(""));

      assert_eq!(config.wrapper(), None);
   }

   #[test]
   fn test_無効化メソッドでフラグが落ちる() {
      let config = EnvelopeConfig::default()
         .without_meta()
         .without_status()
         .without_exception_details();

      assert!(!config.include_meta());
      assert!(!config.include_status());
      assert!(!config.expose_exception_details());
   }

   #[test]
   fn test_with_pagination_exclude_fieldsで除外フィールドが置き換わる() {
      let config = EnvelopeConfig::default().with_pagination_exclude_fields(["path"]);

      let fields: Vec<&str> = config
         .pagination_exclude_fields()
         .iter()
         .map(String::as_str)
         .collect();
      assert_eq!(fields, vec!["path"]);
   }
}
