//! アップロードセッション
//!
//! 状態遷移:
//! - Idle: メディア未選択（初期状態）
//! - Ready: メディア選択済み、実行前（または結果破棄後）
//! - Running: ステップ進行とサービス呼び出しを実行中
//! - Done: 全ステップ完了、結果（成功または代替）を保持
//!
//! `select_asset` は世代番号を進め、実行中の古い実行の結果を無効にする。
//! `start_run` の Future が完了前に破棄された場合は Ready に戻る。

mod delay;

pub use delay::{Delay, NoDelay, TokioDelay};

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use seavigil_common::{EnhancementResult, MediaAsset, ProcessingStep, StepTracker, DEFAULT_STEP_LABELS};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::client::Enhancer;
use crate::error::{Result, SeaVigilError};

const EVENT_CAPACITY: usize = 64;

/// セッションの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Ready,
    Running,
    Done,
}

/// 購読者へ通知されるイベント
#[derive(Debug, Clone)]
pub enum SessionEvent {
    PhaseChanged(Phase),
    StepsChanged(Vec<ProcessingStep>),
    ResultReady(EnhancementResult),
}

/// `start_run` の結果
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Completed(EnhancementResult),
    /// 既に実行中のため無視された
    AlreadyRunning,
    /// 実行中に別のメディアが選択され、結果を破棄した
    Superseded,
}

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub labels: Vec<String>,
    pub step_interval: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            labels: DEFAULT_STEP_LABELS.iter().map(|s| s.to_string()).collect(),
            step_interval: Duration::from_millis(1500),
        }
    }
}

struct SessionState {
    phase: Phase,
    asset: Option<MediaAsset>,
    steps: StepTracker,
    result: Option<EnhancementResult>,
    generation: u64,
}

pub struct UploadSession {
    enhancer: Arc<dyn Enhancer>,
    delay: Arc<dyn Delay>,
    step_interval: Duration,
    state: Mutex<SessionState>,
    events: broadcast::Sender<SessionEvent>,
}

impl UploadSession {
    pub fn new(enhancer: Arc<dyn Enhancer>, delay: Arc<dyn Delay>, options: SessionOptions) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            enhancer,
            delay,
            step_interval: options.step_interval,
            state: Mutex::new(SessionState {
                phase: Phase::Idle,
                asset: None,
                steps: StepTracker::new(options.labels.as_slice()),
                result: None,
                generation: 0,
            }),
            events,
        }
    }

    /// 実時間の待機と既定のステップ構成で作成
    pub fn with_enhancer(enhancer: Arc<dyn Enhancer>) -> Self {
        Self::new(enhancer, Arc::new(TokioDelay), SessionOptions::default())
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn phase(&self) -> Phase {
        self.state().phase
    }

    pub fn steps(&self) -> Vec<ProcessingStep> {
        self.state().steps.steps().to_vec()
    }

    pub fn result(&self) -> Option<EnhancementResult> {
        self.state().result.clone()
    }

    pub fn asset(&self) -> Option<MediaAsset> {
        self.state().asset.clone()
    }

    /// メディアを選択する
    ///
    /// どの状態からでも Ready に遷移し、以前の結果とステップ進捗を破棄する。
    pub fn select_asset(&self, asset: MediaAsset) {
        let mut state = self.state();
        if state.phase == Phase::Running {
            info!(file = asset.file_name(), "new selection supersedes the running enhancement");
        }

        state.generation += 1;
        state.asset = Some(asset);
        state.result = None;
        state.steps.reset();
        state.phase = Phase::Ready;

        self.emit(SessionEvent::PhaseChanged(Phase::Ready));
        self.emit(SessionEvent::StepsChanged(state.steps.steps().to_vec()));
    }

    /// 生のファイル内容から選択する（不正な入力は状態を変えずに拒否）
    pub fn select_bytes(&self, file_name: &str, mime: &str, content: Vec<u8>) -> Result<()> {
        let asset = MediaAsset::new(file_name, mime, content)?;
        self.select_asset(asset);
        Ok(())
    }

    /// 強調処理を実行する
    ///
    /// ステップ進行とサービス呼び出しを並行に進め、両方が終わってから結果を確定する。
    /// サービス呼び出しが失敗しても元画像と指標ゼロの代替結果で Done に到達する。
    pub async fn start_run(&self) -> Result<RunOutcome> {
        let (generation, asset) = {
            let mut state = self.state();
            match state.phase {
                Phase::Running => {
                    debug!("run already in progress, ignoring start request");
                    return Ok(RunOutcome::AlreadyRunning);
                }
                Phase::Idle => {
                    return Err(SeaVigilError::Precondition("メディアが選択されていません".into()));
                }
                Phase::Ready | Phase::Done => {}
            }
            let asset = state
                .asset
                .clone()
                .ok_or_else(|| SeaVigilError::Precondition("メディアが選択されていません".into()))?;

            state.phase = Phase::Running;
            state.result = None;
            state.steps.reset();

            self.emit(SessionEvent::PhaseChanged(Phase::Running));
            self.emit(SessionEvent::StepsChanged(state.steps.steps().to_vec()));
            (state.generation, asset)
        };

        info!(file = asset.file_name(), kind = %asset.kind(), "enhancement run started");

        let guard = RunGuard::new(self, generation);
        let (_, outcome) = tokio::join!(self.walk_steps(generation), self.enhancer.enhance(&asset));

        let result = match outcome {
            Ok(result) => result,
            Err(err) => {
                warn!(error = %err, "enhancement failed, falling back to the original media");
                EnhancementResult::fallback(&asset)
            }
        };

        guard.disarm();
        let mut state = self.state();
        if state.generation != generation {
            info!(file = asset.file_name(), "discarding result of superseded run");
            return Ok(RunOutcome::Superseded);
        }

        state.result = Some(result.clone());
        state.phase = Phase::Done;
        self.emit(SessionEvent::ResultReady(result.clone()));
        self.emit(SessionEvent::PhaseChanged(Phase::Done));

        Ok(RunOutcome::Completed(result))
    }

    async fn walk_steps(&self, generation: u64) {
        if !self.advance_steps(generation) {
            return;
        }
        loop {
            self.delay.sleep(self.step_interval).await;
            if !self.advance_steps(generation) {
                break;
            }
        }
    }

    /// 1段階進める。続行すべきなら true
    fn advance_steps(&self, generation: u64) -> bool {
        let mut state = self.state();
        if state.generation != generation {
            return false;
        }
        if !state.steps.advance() {
            return false;
        }
        self.emit(SessionEvent::StepsChanged(state.steps.steps().to_vec()));
        !state.steps.is_finished()
    }

    fn emit(&self, event: SessionEvent) {
        // 購読者がいなければ捨てる
        let _ = self.events.send(event);
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// 実行中の `start_run` が途中で破棄されたとき Running から戻す
struct RunGuard<'a> {
    session: &'a UploadSession,
    generation: u64,
    armed: bool,
}

impl<'a> RunGuard<'a> {
    fn new(session: &'a UploadSession, generation: u64) -> Self {
        Self {
            session,
            generation,
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }

        let mut state = self.session.state();
        if state.generation != self.generation || state.phase != Phase::Running {
            return;
        }

        warn!("enhancement run was cancelled before completion");
        state.phase = Phase::Ready;
        state.steps.reset();
        self.session.emit(SessionEvent::PhaseChanged(Phase::Ready));
        self.session.emit(SessionEvent::StepsChanged(state.steps.steps().to_vec()));
    }
}
