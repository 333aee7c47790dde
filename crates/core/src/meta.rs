//! # メタデータ
//!
//! エンベロープの `meta` キーにマージされる補助情報。
//!
//! 呼び出し側はマッピング以外の値も渡せる。受け取った値は以下の規則で
//! マッピングに正規化する:
//!
//! | 入力 | 正規化結果 |
//! |------|-----------|
//! | マッピング | そのまま |
//! | JSON 文字列 | パースした結果を再度正規化 |
//! | JSON でない文字列 | `{"0": 文字列}` |
//! | 配列 | インデックスをキーにしたマッピング |
//! | null | 空のマッピング |
//! | その他のスカラー | `{"0": 値}` |

use derive_more::{Deref, From};
use serde::Serialize;
use serde_json::{Map, Value};

/// エンベロープの `meta` にマージされるマッピング
///
/// ## 使用例
///
/// ```
/// use api_response_core::Meta;
///
/// let meta = Meta::new().with("request_id", "req-1");
/// assert_eq!(meta.get("request_id").unwrap(), "req-1");
///
/// let parsed = Meta::from_json_str(r#"{"version": 2}"#);
/// assert_eq!(parsed.get("version").unwrap(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deref, From)]
#[serde(transparent)]
pub struct Meta(Map<String, Value>);

impl Meta {
   /// 空のメタデータを作成する
   pub fn new() -> Self {
      Self::default()
   }

   /// キーと値を追加する（同じキーは上書き）
   pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
      self.insert(key, value);
      self
   }

   /// キーと値を追加する（同じキーは上書き）
   pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
      self.0.insert(key.into(), value.into());
   }

   /// 文字列からメタデータを作成する
   ///
   /// JSON としてパースできればその結果を正規化し、
   /// できなければ文字列を `{"0": 文字列}` として包む。
   pub fn from_json_str(raw: &str) -> Self {
      match serde_json::from_str::<Value>(raw) {
         Ok(Value::String(text)) => Self::single(Value::String(text)),
         Ok(parsed) => Self::from(parsed),
         Err(_) => Self::single(Value::String(raw.to_string())),
      }
   }

   /// `Serialize` を実装した値からメタデータを作成する
   pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self, serde_json::Error> {
      serde_json::to_value(value).map(Self::from)
   }

   pub fn into_map(self) -> Map<String, Value> {
      self.0
   }

   fn single(value: Value) -> Self {
      let mut map = Map::new();
      map.insert("0".to_string(), value);
      Self(map)
   }
}

impl From<Value> for Meta {
   fn from(value: Value) -> Self {
      match value {
         Value::Object(map) => Self(map),
         Value::String(text) => Self::from_json_str(&text),
         Value::Array(items) => Self(
            items
               .into_iter()
               .enumerate()
               .map(|(index, item)| (index.to_string(), item))
               .collect(),
         ),
         Value::Null => Self::default(),
         scalar => Self::single(scalar),
      }
   }
}

impl From<&str> for Meta {
   fn from(value: &str) -> Self {
      Self::from_json_str(value)
   }
}

impl From<String> for Meta {
   fn from(value: String) -> Self {
      Self::from_json_str(&value)
   }
}
