use std::time::Duration;

use async_trait::async_trait;

/// ステップ間の待機
///
/// 進捗表示のペースを作るだけの待機。テストでは即時に返す実装を差し込む。
#[async_trait]
pub trait Delay: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// tokioタイマーによる実時間の待機
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioDelay;

#[async_trait]
impl Delay for TokioDelay {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// 待たずにスケジューラへ制御を返すだけの待機
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

#[async_trait]
impl Delay for NoDelay {
    async fn sleep(&self, _duration: Duration) {
        tokio::task::yield_now().await;
    }
}
