//! # ページネーション
//!
//! ページ番号ベースのページネーション結果を表現する。
//!
//! - [`Paginated`]: アイテムリスト + ページネーション情報。エンベロープでは
//!   アイテムがラッパーキーの下に、残りのフィールドがページネーションキーの下に入る
//! - [`Page`]: 総件数を知っているページ（length-aware）から標準的な
//!   フィールド一式を組み立てるビルダー
//!
//! ## フィールド一覧
//!
//! [`Page::into_paginated`] は以下のフィールドを生成する（`data` はアイテムリスト）:
//!
//! ```text
//! current_page, first_page_url, from, last_page, last_page_url, links,
//! next_page_url, path, per_page, prev_page_url, to, total
//! ```

use serde::Serialize;
use serde_json::{Map, Value, json};

/// アイテムリストを格納するキー
const ITEMS_KEY: &str = "data";

/// `links` でカレントページの前後に表示するページ数
const LINKS_ON_EACH_SIDE: u64 = 3;

/// ページネーション結果
///
/// アイテムリストとページネーション情報（現在ページ、総件数、リンクなど）を持つ。
#[derive(Debug, Clone, PartialEq)]
pub struct Paginated {
   items:  Vec<Value>,
   fields: Map<String, Value>,
}

impl Paginated {
   /// アイテムリストとページネーション情報から作成する
   ///
   /// `fields` に `data` キーが含まれていても無視される。
   pub fn new(items: Vec<Value>, mut fields: Map<String, Value>) -> Self {
      fields.remove(ITEMS_KEY);
      Self { items, fields }
   }

   /// ページネーターの配列表現から作成する
   ///
   /// `data` キーにアイテムの配列を持つマッピングのみ受け付ける。
   /// それ以外の形状の場合は `None` を返す。
   pub fn from_value(value: Value) -> Option<Self> {
      let Value::Object(mut fields) = value else {
         return None;
      };
      let Some(Value::Array(items)) = fields.remove(ITEMS_KEY) else {
         return None;
      };
      Some(Self { items, fields })
   }

   pub fn items(&self) -> &[Value] {
      &self.items
   }

   pub fn fields(&self) -> &Map<String, Value> {
      &self.fields
   }

   /// アイテムリストとページネーション情報に分解する
   pub fn into_parts(self) -> (Vec<Value>, Map<String, Value>) {
      (self.items, self.fields)
   }
}

/// 総件数を知っているページ
///
/// ## 使用例
///
/// ```
/// use api_response_core::Page;
///
/// let page = Page::new(vec!["a", "b"], 5, 2, 1).with_path("/items");
/// assert_eq!(page.last_page(), 3);
/// assert_eq!(page.from(), Some(1));
/// assert_eq!(page.to(), Some(2));
/// ```
#[derive(Debug, Clone)]
pub struct Page<T> {
   items:        Vec<T>,
   total:        u64,
   per_page:     u64,
   current_page: u64,
   path:         String,
}

impl<T> Page<T> {
   /// 新しいページを作成する
   ///
   /// `per_page` と `current_page` は 1 未満の場合 1 に切り上げる。
   pub fn new(items: Vec<T>, total: u64, per_page: u64, current_page: u64) -> Self {
      Self {
         items,
         total,
         per_page: per_page.max(1),
         current_page: current_page.max(1),
         path: String::new(),
      }
   }

   /// ページ URL の基底パスを設定する
   pub fn with_path(mut self, path: impl Into<String>) -> Self {
      self.path = path.into();
      self
   }

   pub fn current_page(&self) -> u64 {
      self.current_page
   }

   pub fn per_page(&self) -> u64 {
      self.per_page
   }

   pub fn total(&self) -> u64 {
      self.total
   }

   /// 最終ページ番号（アイテムが 0 件でも 1）
   pub fn last_page(&self) -> u64 {
      self.total.div_ceil(self.per_page).max(1)
   }

   /// このページ先頭アイテムの通し番号（1 始まり）
   ///
   /// クエリ由来の巨大なページ番号でも溢れないよう `u64::MAX` で頭打ちにする。
   pub fn from(&self) -> Option<u64> {
      if self.items.is_empty() {
         return None;
      }
      Some(
         (self.current_page - 1)
            .saturating_mul(self.per_page)
            .saturating_add(1),
      )
   }

   /// このページ末尾アイテムの通し番号
   pub fn to(&self) -> Option<u64> {
      let offset = (self.items.len() as u64).saturating_sub(1);
      self.from().map(|from| from.saturating_add(offset))
   }

   fn url(&self, page: u64) -> String {
      format!("{}?page={page}", self.path)
   }

   fn prev_page_url(&self) -> Option<String> {
      (self.current_page > 1).then(|| self.url(self.current_page - 1))
   }

   fn next_page_url(&self) -> Option<String> {
      (self.current_page < self.last_page())
         .then(|| self.url(self.current_page.saturating_add(1)))
   }

   /// ナビゲーションリンクを組み立てる
   ///
   /// 先頭 2 ページ、末尾 2 ページ、カレントページの前後 3 ページを表示し、
   /// 間が空く箇所には `...` を挟む。
   fn links(&self) -> Vec<Value> {
      let last = self.last_page();
      let window_start = self.current_page.saturating_sub(LINKS_ON_EACH_SIDE).max(1);
      let window_end = self.current_page.saturating_add(LINKS_ON_EACH_SIDE).min(last);

      let mut pages: Vec<u64> = [1, 2, last.saturating_sub(1), last]
         .into_iter()
         .chain(window_start..=window_end)
         .filter(|page| (1..=last).contains(page))
         .collect();
      pages.sort_unstable();
      pages.dedup();

      let mut links = vec![json!({
         "url": self.prev_page_url(),
         "label": "&laquo; Previous",
         "active": false,
      })];
      let mut previous = 0;
      for page in pages {
         if page > previous + 1 {
            links.push(json!({ "url": null, "label": "...", "active": false }));
         }
         links.push(json!({
            "url": self.url(page),
            "label": page.to_string(),
            "active": page == self.current_page,
         }));
         previous = page;
      }
      links.push(json!({
         "url": self.next_page_url(),
         "label": "Next &raquo;",
         "active": false,
      }));
      links
   }
}

impl<T: Serialize> Page<T> {
   /// [`Paginated`] に変換する
   ///
   /// アイテムのシリアライズに失敗した場合はエラーを返す。
   pub fn into_paginated(self) -> Result<Paginated, serde_json::Error> {
      let mut fields = Map::new();
      fields.insert("current_page".to_string(), json!(self.current_page));
      fields.insert("first_page_url".to_string(), json!(self.url(1)));
      fields.insert("from".to_string(), json!(self.from()));
      fields.insert("last_page".to_string(), json!(self.last_page()));
      fields.insert("last_page_url".to_string(), json!(self.url(self.last_page())));
      fields.insert("links".to_string(), Value::Array(self.links()));
      fields.insert("next_page_url".to_string(), json!(self.next_page_url()));
      fields.insert("path".to_string(), json!(self.path));
      fields.insert("per_page".to_string(), json!(self.per_page));
      fields.insert("prev_page_url".to_string(), json!(self.prev_page_url()));
      fields.insert("to".to_string(), json!(self.to()));
      fields.insert("total".to_string(), json!(self.total));

      let items = self
         .items
         .iter()
         .map(serde_json::to_value)
         .collect::<Result<Vec<_>, _>>()?;

      Ok(Paginated { items, fields })
   }
}

#[cfg(test)]
mod tests {
   use pretty_assertions::assert_eq;
   use rstest::rstest;

   use super::*;

   fn labels(paginated: &Paginated) -> Vec<String> {
      paginated.fields()["links"]
         .as_array()
         .unwrap()
         .iter()
         .map(|link| link["label"].as_str().unwrap().to_string())
         .collect()
   }

   #[test]
   fn test_from_valueでdataがアイテムに分離される() {
      let paginated = Paginated::from_value(json!({
         "current_page": 1,
         "data": [{ "id": 1 }, { "id": 2 }],
         "total": 2,
      }))
      .unwrap();

      assert_eq!(paginated.items(), &[json!({ "id": 1 }), json!({ "id": 2 })]);
      assert_eq!(
         Value::Object(paginated.fields().clone()),
         json!({ "current_page": 1, "total": 2 })
      );
   }

   #[rstest]
   #[case(json!([1, 2]))]
   #[case(json!({ "data": "not a list" }))]
   #[case(json!({ "total": 0 }))]
   fn test_from_valueでページネーター形状でなければnone(#[case] value: Value) {
      assert!(Paginated::from_value(value).is_none());
   }

   #[test]
   fn test_newでfieldsのdataキーは無視される() {
      let mut fields = Map::new();
      fields.insert("data".to_string(), json!(["x"]));
      fields.insert("total".to_string(), json!(1));

      let paginated = Paginated::new(vec![json!("a")], fields);

      assert_eq!(paginated.items(), &[json!("a")]);
      assert!(!paginated.fields().contains_key("data"));
   }

   #[rstest]
   #[case(0, 10, 1)]
   #[case(10, 10, 1)]
   #[case(11, 10, 2)]
   #[case(95, 10, 10)]
   fn test_last_pageの計算(#[case] total: u64, #[case] per_page: u64, #[case] expected: u64) {
      let page = Page::<i32>::new(vec![], total, per_page, 1);
      assert_eq!(page.last_page(), expected);
   }

   #[test]
   fn test_空のページはfromとtoがnone() {
      let page = Page::<i32>::new(vec![], 0, 15, 1);

      assert_eq!(page.from(), None);
      assert_eq!(page.to(), None);
   }

   #[test]
   fn test_巨大なper_pageでもfromとtoが溢れない() {
      let page = Page::new(vec![1], 10, u64::MAX, 3);

      assert_eq!(page.from(), Some(u64::MAX));
      assert_eq!(page.to(), Some(u64::MAX));

      let paginated = page.into_paginated().unwrap();
      assert_eq!(paginated.fields()["last_page"], json!(1));
      assert_eq!(paginated.fields()["next_page_url"], Value::Null);
   }

   #[test]
   fn test_最大値のページ番号でもリンクを組み立てられる() {
      let paginated = Page::<i32>::new(vec![], 3, 10, u64::MAX)
         .with_path("/items")
         .into_paginated()
         .unwrap();

      assert_eq!(paginated.fields()["current_page"], json!(u64::MAX));
      assert_eq!(paginated.fields()["from"], Value::Null);
      assert_eq!(labels(&paginated), vec!["&laquo; Previous", "1", "Next &raquo;"]);
   }

   #[test]
   fn test_per_pageとcurrent_pageは1以上に切り上げられる() {
      let page = Page::new(vec![1], 1, 0, 0);

      assert_eq!(page.per_page(), 1);
      assert_eq!(page.current_page(), 1);
   }

   #[test]
   fn test_into_paginatedで標準フィールドが順序どおり生成される() {
      let paginated = Page::new(vec!["c", "d"], 5, 2, 2)
         .with_path("/items")
         .into_paginated()
         .unwrap();

      let keys: Vec<&str> = paginated.fields().keys().map(String::as_str).collect();
      assert_eq!(
         keys,
         vec![
            "current_page",
            "first_page_url",
            "from",
            "last_page",
            "last_page_url",
            "links",
            "next_page_url",
            "path",
            "per_page",
            "prev_page_url",
            "to",
            "total",
         ]
      );
      assert_eq!(paginated.items(), &[json!("c"), json!("d")]);

      let fields = paginated.fields();
      assert_eq!(fields["from"], json!(3));
      assert_eq!(fields["to"], json!(4));
      assert_eq!(fields["last_page"], json!(3));
      assert_eq!(fields["first_page_url"], json!("/items?page=1"));
      assert_eq!(fields["prev_page_url"], json!("/items?page=1"));
      assert_eq!(fields["next_page_url"], json!("/items?page=3"));
   }

   #[test]
   fn test_最終ページではnext_page_urlがnull() {
      let paginated = Page::new(vec![5], 5, 2, 3)
         .with_path("/items")
         .into_paginated()
         .unwrap();

      assert_eq!(paginated.fields()["next_page_url"], Value::Null);
   }

   #[test]
   fn test_linksはページ数が少なければ全ページを並べる() {
      let paginated = Page::new(vec![1], 3, 1, 2).into_paginated().unwrap();

      assert_eq!(
         labels(&paginated),
         vec!["&laquo; Previous", "1", "2", "3", "Next &raquo;"]
      );
   }

   #[test]
   fn test_linksはページ数が多いと省略記号を挟む() {
      let paginated = Page::new(vec![1], 20, 1, 10).into_paginated().unwrap();

      assert_eq!(
         labels(&paginated),
         vec![
            "&laquo; Previous",
            "1",
            "2",
            "...",
            "7",
            "8",
            "9",
            "10",
            "11",
            "12",
            "13",
            "...",
            "19",
            "20",
            "Next &raquo;",
         ]
      );
   }

   #[test]
   fn test_linksでカレントページのみactive() {
      let paginated = Page::new(vec![1], 3, 1, 2).into_paginated().unwrap();
      let links = paginated.fields()["links"].as_array().unwrap();

      let active: Vec<&str> = links
         .iter()
         .filter(|link| link["active"] == json!(true))
         .map(|link| link["label"].as_str().unwrap())
         .collect();
      assert_eq!(active, vec!["2"]);
   }
}
