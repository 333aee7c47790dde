//! # JSON ツリー操作
//!
//! エンベロープの組み立てで使う 2 つの純粋関数を提供する。
//!
//! - [`prune_empty`]: 空の値を持つキーを再帰的に取り除く
//! - [`deep_merge`]: マッピング同士を再帰的にマージする
//!
//! どちらも `serde_json::Map` を直接書き換える。キー順序は挿入順で保持される。

use serde::Deserialize;
use serde_json::{Map, Value};

/// リスト同士が衝突したときのマージ方針
///
/// スカラー同士の衝突は方針に関わらず新しい値で上書きする。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListMergePolicy {
   /// 既存のリストに新しい要素を連結する
   #[default]
   Concat,
   /// 新しい値で置き換える
   Replace,
}

/// 値が「空」かどうかを判定する
///
/// 空とみなすのは `null`、空文字列、空配列、空マッピングのみ。
/// `false` や `0` は空ではない。
pub fn is_empty(value: &Value) -> bool {
   match value {
      Value::Null => true,
      Value::String(s) => s.is_empty(),
      Value::Array(items) => items.is_empty(),
      Value::Object(map) => map.is_empty(),
      Value::Bool(_) | Value::Number(_) => false,
   }
}

/// 空の値を持つキーを再帰的に取り除く
///
/// 子を先に刈り込んでから判定するため、刈り込みの結果空になった
/// マッピングも取り除かれる。`keep` に指定したキーはどの階層でも残す。
///
/// 配列の中は再帰的に刈り込むが、配列の要素自体は削除しない。
pub fn prune_empty(map: &mut Map<String, Value>, keep: Option<&str>) {
   map.retain(|key, value| {
      prune_value(value, keep);
      keep == Some(key.as_str()) || !is_empty(value)
   });
}

fn prune_value(value: &mut Value, keep: Option<&str>) {
   match value {
      Value::Object(map) => prune_empty(map, keep),
      Value::Array(items) => {
         for item in items.iter_mut() {
            prune_value(item, keep);
         }
      }
      _ => {}
   }
}

/// `incoming` を `base` に再帰的にマージする
///
/// - マッピング同士: キーごとに再帰マージ
/// - リスト同士: [`ListMergePolicy::Concat`] なら連結
/// - 既存がリストで新しい値がスカラー: `Concat` なら末尾に追加
/// - それ以外: 新しい値で上書き
pub fn deep_merge(
   base: &mut Map<String, Value>,
   incoming: Map<String, Value>,
   policy: ListMergePolicy,
) {
   for (key, value) in incoming {
      match base.get_mut(&key) {
         Some(existing) => merge_value(existing, value, policy),
         None => {
            base.insert(key, value);
         }
      }
   }
}

fn merge_value(existing: &mut Value, incoming: Value, policy: ListMergePolicy) {
   match (existing, incoming) {
      (Value::Object(base), Value::Object(incoming)) => deep_merge(base, incoming, policy),
      (Value::Array(base), Value::Array(incoming)) if policy == ListMergePolicy::Concat => {
         base.extend(incoming);
      }
      (Value::Array(base), incoming)
         if policy == ListMergePolicy::Concat && !incoming.is_object() =>
      {
         base.push(incoming);
      }
      (existing, incoming) => *existing = incoming,
   }
}
