//! 処理ステップの進捗管理
//!
//! 固定のステップ列を Pending → Active → Completed の順に進める。
//! Active なステップは常に高々1つ。

use serde::{Deserialize, Serialize};

/// 既定のステップ名
pub const DEFAULT_STEP_LABELS: &[&str] = &["Uploaded Image", "Processing", "Enhancement", "Completed"];

/// ステップの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepState {
    Pending,
    Active,
    Completed,
}

/// パイプラインの1ステップ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingStep {
    pub id: String,
    pub label: String,
    pub state: StepState,
}

/// ステップ列
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepTracker {
    steps: Vec<ProcessingStep>,
}

impl Default for StepTracker {
    fn default() -> Self {
        Self::new(DEFAULT_STEP_LABELS)
    }
}

impl StepTracker {
    pub fn new<S: AsRef<str>>(labels: &[S]) -> Self {
        let steps = labels
            .iter()
            .enumerate()
            .map(|(i, label)| ProcessingStep {
                id: (i + 1).to_string(),
                label: label.as_ref().to_string(),
                state: StepState::Pending,
            })
            .collect();
        Self { steps }
    }

    /// 全ステップを Pending に戻す
    pub fn reset(&mut self) {
        for step in &mut self.steps {
            step.state = StepState::Pending;
        }
    }

    /// 1段階進める
    ///
    /// Active がなければ最初の Pending を Active に、あれば Completed にして次を Active にする。
    /// 全ステップ完了済みなら何もせず false を返す。
    pub fn advance(&mut self) -> bool {
        match self.active_index() {
            Some(i) => {
                self.steps[i].state = StepState::Completed;
                if let Some(next) = self.steps.get_mut(i + 1) {
                    next.state = StepState::Active;
                }
                true
            }
            None => match self.steps.iter_mut().find(|s| s.state == StepState::Pending) {
                Some(step) => {
                    step.state = StepState::Active;
                    true
                }
                None => false,
            },
        }
    }

    pub fn active_index(&self) -> Option<usize> {
        self.steps.iter().position(|s| s.state == StepState::Active)
    }

    pub fn is_finished(&self) -> bool {
        self.steps.iter().all(|s| s.state == StepState::Completed)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn steps(&self) -> &[ProcessingStep] {
        &self.steps
    }
}
