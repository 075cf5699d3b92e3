//! ステップ進捗のターミナル表示

use indicatif::{ProgressBar, ProgressStyle};
use seavigil_common::{ProcessingStep, StepState};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;

use crate::session::SessionEvent;

/// 完了数と表示メッセージ
pub fn describe_steps(steps: &[ProcessingStep]) -> (u64, String) {
    let completed = steps.iter().filter(|s| s.state == StepState::Completed).count() as u64;
    let message = match steps.iter().find(|s| s.state == StepState::Active) {
        Some(step) => format!("{}...", step.label),
        None if !steps.is_empty() && completed == steps.len() as u64 => "完了".to_string(),
        None => "待機中".to_string(),
    };
    (completed, message)
}

#[derive(Clone)]
pub struct StepProgress {
    bar: ProgressBar,
}

impl StepProgress {
    pub fn new(total: usize) -> Self {
        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        );
        Self { bar }
    }

    pub fn render(&self, steps: &[ProcessingStep]) {
        let (completed, message) = describe_steps(steps);
        self.bar.set_position(completed);
        self.bar.set_message(message);
        self.bar.tick();
    }

    pub fn finish(&self) {
        self.bar.finish();
    }

    /// セッションイベントを受けて描画するタスクを起動
    pub fn follow(&self, mut events: broadcast::Receiver<SessionEvent>) -> JoinHandle<()> {
        let progress = self.clone();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(SessionEvent::StepsChanged(steps)) => progress.render(&steps),
                    Ok(_) => {}
                    Err(RecvError::Lagged(_)) => continue,
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }
}
