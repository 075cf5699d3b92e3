//! 強調サービスクライアント
//!
//! セッションは `Enhancer` トレイト越しにサービスを呼び出す。
//! 実装は HTTP の `EnhancementClient`、テストではモックに差し替える。

mod http;

pub use http::EnhancementClient;

use async_trait::async_trait;
use seavigil_common::{EnhancementResult, MediaAsset};

use crate::error::Result;

#[async_trait]
pub trait Enhancer: Send + Sync {
    /// メディアを1回だけ送信して結果を返す
    ///
    /// 失敗時は `SeaVigilError::Transport` を返し、代替結果は作らない。
    async fn enhance(&self, asset: &MediaAsset) -> Result<EnhancementResult>;
}
