//! # デモサービス サーバー
//!
//! ## 環境変数
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `DEMO_HOST` | No | バインドアドレス（デフォルト: `0.0.0.0`） |
//! | `DEMO_PORT` | No | ポート番号（デフォルト: `3000`） |
//! | `API_RESPONSE_CONFIG` | No | エンベロープ設定ファイル（TOML）のパス |
//! | `API_RESPONSE__*` | No | エンベロープ設定の個別上書き |
//! | `APP_ENV` | No | `production` で例外詳細を常に隠す |
//! | `LOG_FORMAT` | No | `json` / `pretty`（デフォルト: `pretty`） |
//!
//! ## 起動方法
//!
//! ```bash
//! cargo run -p api-response-demo-service
//! ```

use std::sync::Arc;

use anyhow::Context as _;
use api_response_core::{AppEnvironment, EnvelopeSettings, ResponseFactory};
use api_response_demo_service::{AppState, Catalog, config::DemoConfig, router};
use api_response_shared::observability::{TracingConfig, init_tracing};
use tokio::net::TcpListener;
use tracing::Instrument as _;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
   // .env ファイルを読み込む（存在する場合）
   dotenvy::dotenv().ok();

   let tracing_config = TracingConfig::from_env("demo-service");
   init_tracing(&tracing_config).context("トレーシングの初期化に失敗しました")?;

   let span = tracing_config.app_span();
   run().instrument(span).await
}

async fn run() -> anyhow::Result<()> {
   let config = DemoConfig::from_env()?;
   let environment = AppEnvironment::from_env();
   let envelope = EnvelopeSettings::load(config.settings_path.as_deref())
      .context("エンベロープ設定の読み込みに失敗しました")?
      .into_config(environment);
   tracing::info!(?environment, ?envelope, "エンベロープ設定を適用します");

   let state = Arc::new(AppState {
      responses: ResponseFactory::new(Arc::new(envelope)),
      catalog:   Catalog::seeded(),
   });

   let addr = config.addr();
   let listener = TcpListener::bind(&addr)
      .await
      .with_context(|| format!("{addr} にバインドできませんでした"))?;
   tracing::info!("デモサービスが起動しました: {}", addr);

   axum::serve(listener, router(state)).await?;

   Ok(())
}
