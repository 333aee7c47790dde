//! # エンベロープビルダー
//!
//! ペイロード、ステータスコード、メタデータからレスポンスエンベロープを組み立てる。
//!
//! ## 組み立て手順
//!
//! 1. ステータスコードを成功（200〜299）/ エラーに分類する
//! 2. ペイロードをバリアントごとに整形する
//! 3. `meta` を有効にしている場合、メタデータを `meta` キーに再帰マージする
//! 4. `status` を有効にしている場合、分類結果を `status` キーに入れる
//! 5. 空の値を持つキーを再帰的に取り除く（ラッパーキーは空でも残す）
//!
//! ## 出力例
//!
//! ```json
//! {
//!   "data": { "id": 1 },
//!   "meta": { "request_id": "req-1" },
//!   "status": "success"
//! }
//! ```
//!
//! 設定を読むだけで副作用はない。同じ入力と設定からは常に同じエンベロープを返す。

use derive_more::{Deref, From};
use http::StatusCode;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::{
   config::EnvelopeConfig,
   meta::Meta,
   pagination::Paginated,
   payload::Payload,
   value::{deep_merge, prune_empty},
};

/// ラッパー無効時にページネーションのアイテムを置くキー
const FALLBACK_ITEMS_KEY: &str = "data";
const META_KEY: &str = "meta";
const STATUS_KEY: &str = "status";

/// レスポンスエンベロープ
///
/// キーは挿入順で並ぶ。JSON としてそのままシリアライズできる。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deref, From)]
#[serde(transparent)]
pub struct Envelope(Map<String, Value>);

impl Envelope {
   pub fn into_map(self) -> Map<String, Value> {
      self.0
   }

   pub fn into_value(self) -> Value {
      Value::Object(self.0)
   }
}

/// ステータスコードの分類
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum Outcome {
   Success,
   Error,
}

impl Outcome {
   /// 200〜299 を成功、それ以外をエラーに分類する
   pub fn from_status(status: StatusCode) -> Self {
      if status.is_success() {
         Self::Success
      } else {
         Self::Error
      }
   }

   pub fn as_str(self) -> &'static str {
      self.into()
   }
}

/// エンベロープビルダー
///
/// 設定を借用して使う。設定は起動時に一度だけ構築される前提。
#[derive(Debug, Clone, Copy)]
pub struct EnvelopeBuilder<'a> {
   config: &'a EnvelopeConfig,
}

impl<'a> EnvelopeBuilder<'a> {
   pub fn new(config: &'a EnvelopeConfig) -> Self {
      Self { config }
   }

   /// エンベロープを組み立てる
   pub fn make_envelope(&self, payload: Payload, status: StatusCode, meta: Meta) -> Envelope {
      let outcome = Outcome::from_status(status);
      let mut body = self.format_payload(payload);

      if self.config.include_meta() {
         let incoming = meta.into_map();
         match body.get_mut(META_KEY) {
            // 展開した本体が既に meta を持っていれば、その位置のままマージする
            Some(existing) => {
               let mut merged = Meta::from(existing.take()).into_map();
               deep_merge(&mut merged, incoming, self.config.list_merge());
               *existing = Value::Object(merged);
            }
            None => {
               body.insert(META_KEY.to_string(), Value::Object(incoming));
            }
         }
      }

      if self.config.include_status() {
         body.insert(STATUS_KEY.to_string(), Value::from(outcome.as_str()));
      }

      prune_empty(&mut body, self.config.wrapper());
      Envelope(body)
   }

   /// ペイロードを本体の形に整形する
   ///
   /// ラッパーキーが設定されていれば本体をその下に置き、
   /// 無効なら本体を展開して返す。
   pub fn format_payload(&self, payload: Payload) -> Map<String, Value> {
      match payload {
         Payload::Paginated(paginated) => self.format_paginated(paginated),
         Payload::Text(text) => self.format_text(text),
         Payload::Json(value) => self.format_json(value),
      }
   }

   fn format_paginated(&self, paginated: Paginated) -> Map<String, Value> {
      let (items, mut fields) = paginated.into_parts();
      let excluded = self.config.pagination_exclude_fields();
      fields.retain(|key, _| !excluded.contains(key));

      let items_key = self.config.wrapper().unwrap_or(FALLBACK_ITEMS_KEY);
      let mut body = Map::new();
      body.insert(items_key.to_string(), Value::Array(items));
      body.insert(
         self.config.pagination_field().to_string(),
         Value::Object(fields),
      );
      body
   }

   fn format_text(&self, text: String) -> Map<String, Value> {
      let key = self.config.wrapper().unwrap_or(self.config.string_field());
      let mut body = Map::new();
      body.insert(key.to_string(), Value::String(text));
      body
   }

   fn format_json(&self, value: Value) -> Map<String, Value> {
      match self.config.wrapper() {
         Some(wrapper) => {
            let content = match value {
               Value::Null => Value::Array(Vec::new()),
               other => other,
            };
            let mut body = Map::new();
            body.insert(wrapper.to_string(), content);
            body
         }
         None => flatten(value),
      }
   }
}

/// ラッパー無効時の展開
///
/// マッピングはそのまま、配列とスカラーはインデックスをキーにしたマッピング、
/// null は空のマッピングにする。
fn flatten(value: Value) -> Map<String, Value> {
   match value {
      Value::Object(map) => map,
      Value::Array(items) => items
         .into_iter()
         .enumerate()
         .map(|(index, item)| (index.to_string(), item))
         .collect(),
      Value::Null => Map::new(),
      scalar => {
         let mut body = Map::new();
         body.insert("0".to_string(), scalar);
         body
      }
   }
}
