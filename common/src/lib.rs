//! SeaVigil Common Library
//!
//! CLIとセッションで共有される型とユーティリティ（通信処理は含まない）

pub mod error;
pub mod format;
pub mod media;
pub mod response;
pub mod steps;
pub mod types;

pub use error::{Error, Result};
pub use format::{format_fixed, MetricRow};
pub use media::{decode_data_url, extension_for_mime, extract_base64_from_data_url, extract_mime_type_from_data_url};
pub use response::{decode_image_response, decode_video_response};
pub use steps::{ProcessingStep, StepState, StepTracker, DEFAULT_STEP_LABELS};
pub use types::{EnhancedMedia, EnhancementResult, MediaAsset, MediaKind, QualityMetrics, ResultOutcome};
