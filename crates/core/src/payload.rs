//! # ペイロード
//!
//! エンベロープの本体に入るデータを表現する。
//!
//! ペイロードの形状ごとに整形方法が異なるため、形状をバリアントで明示する:
//!
//! | バリアント | 整形方法 |
//! |-----------|----------|
//! | `Text` | ラッパーキー（無効時は文字列フィールド名）の下に置く |
//! | `Json` | ラッパーキーの下に置く（無効時は展開する） |
//! | `Paginated` | アイテムとページネーション情報に分けて置く |
//!
//! `Serialize` を実装した任意の値は [`Payload::from_serialize`] で
//! 構築時に JSON へ変換する。

use serde::Serialize;
use serde_json::{Map, Value};

use crate::pagination::{Page, Paginated};

/// エンベロープの本体に入るデータ
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
   /// 文字列
   Text(String),
   /// マッピング、配列、スカラー、null
   Json(Value),
   /// ページネーション結果
   Paginated(Paginated),
}

impl Payload {
   /// 空のペイロード
   pub fn empty() -> Self {
      Self::Json(Value::Null)
   }

   /// `Serialize` を実装した値からペイロードを作成する
   ///
   /// 文字列にシリアライズされる値は [`Payload::Text`] になる。
   pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self, serde_json::Error> {
      serde_json::to_value(value).map(Self::from)
   }
}

impl Default for Payload {
   fn default() -> Self {
      Self::empty()
   }
}

impl From<&str> for Payload {
   fn from(value: &str) -> Self {
      Self::Text(value.to_string())
   }
}

impl From<String> for Payload {
   fn from(value: String) -> Self {
      Self::Text(value)
   }
}

impl From<Value> for Payload {
   fn from(value: Value) -> Self {
      match value {
         Value::String(text) => Self::Text(text),
         other => Self::Json(other),
      }
   }
}

impl From<Map<String, Value>> for Payload {
   fn from(value: Map<String, Value>) -> Self {
      Self::Json(Value::Object(value))
   }
}

impl From<Vec<Value>> for Payload {
   fn from(value: Vec<Value>) -> Self {
      Self::Json(Value::Array(value))
   }
}

impl From<Paginated> for Payload {
   fn from(value: Paginated) -> Self {
      Self::Paginated(value)
   }
}

impl<T: Serialize> TryFrom<Page<T>> for Payload {
   type Error = serde_json::Error;

   fn try_from(page: Page<T>) -> Result<Self, Self::Error> {
      page.into_paginated().map(Self::Paginated)
   }
}
