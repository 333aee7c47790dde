//! # アプリケーション状態
//!
//! ハンドラ間で共有するレスポンスファクトリとインメモリのアイテムカタログ。

use api_response_core::ResponseFactory;
use serde::Serialize;
use tokio::sync::RwLock;

/// カタログのアイテム
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Item {
   pub id:    u64,
   pub name:  String,
   pub price: u32,
}

/// インメモリのアイテムカタログ
#[derive(Debug, Default)]
pub struct Catalog {
   items: RwLock<Vec<Item>>,
}

impl Catalog {
   pub fn new(items: Vec<Item>) -> Self {
      Self {
         items: RwLock::new(items),
      }
   }

   /// 起動時に投入するサンプルデータ
   pub fn seeded() -> Self {
      let items = (1..=25)
         .map(|id| Item {
            id,
            name: format!("item-{id}"),
            price: u32::try_from(id * 100).unwrap_or(u32::MAX),
         })
         .collect();
      Self::new(items)
   }

   /// 指定ページのアイテムと総件数を返す
   pub async fn page(&self, page: u64, per_page: u64) -> (Vec<Item>, u64) {
      let items = self.items.read().await;
      let skip = usize::try_from(page.saturating_sub(1).saturating_mul(per_page)).unwrap_or(usize::MAX);
      let take = usize::try_from(per_page).unwrap_or(usize::MAX);
      let slice = items.iter().skip(skip).take(take).cloned().collect();
      (slice, items.len() as u64)
   }

   pub async fn find(&self, id: u64) -> Option<Item> {
      self.items.read().await.iter().find(|item| item.id == id).cloned()
   }

   /// 新しい ID を採番してアイテムを追加する
   pub async fn insert(&self, name: String, price: u32) -> Item {
      let mut items = self.items.write().await;
      let id = items.iter().map(|item| item.id).max().unwrap_or(0) + 1;
      let item = Item { id, name, price };
      items.push(item.clone());
      item
   }
}

/// ハンドラの共有状態
pub struct AppState {
   pub responses: ResponseFactory,
   pub catalog:   Catalog,
}
