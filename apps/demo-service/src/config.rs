//! # デモサービス設定
//!
//! 環境変数からサーバーの設定を読み込む。

use std::{env, path::PathBuf};

use anyhow::Context as _;

/// デモサービスの設定
#[derive(Debug, Clone)]
pub struct DemoConfig {
   /// バインドアドレス
   pub host:          String,
   /// ポート番号
   pub port:          u16,
   /// エンベロープ設定ファイルのパス（未設定なら環境変数とデフォルト値のみ）
   pub settings_path: Option<PathBuf>,
}

impl DemoConfig {
   /// 環境変数から設定を読み込む
   pub fn from_env() -> anyhow::Result<Self> {
      let port = env::var("DEMO_PORT").unwrap_or_else(|_| "3000".to_string());

      Ok(Self {
         host:          env::var("DEMO_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
         port:          port
            .parse()
            .with_context(|| format!("DEMO_PORT は有効なポート番号である必要があります: {port}"))?,
         settings_path: env::var_os("API_RESPONSE_CONFIG").map(PathBuf::from),
      })
   }

   pub fn addr(&self) -> String {
      format!("{}:{}", self.host, self.port)
   }
}
