//! 強調サービスのレスポンスデコーダー
//!
//! レスポンスの形を検証し、明示的な既定値ルールで EnhancedMedia に変換する:
//! - メディア参照（image / video_url）は空でない文字列が必須
//! - metrics オブジェクトや個々の指標が欠けている（または null）場合は 0.0
//! - 指標の型違い、負のPSNRは形状エラー
//! - file_exists: false と報告されたサーバー側ファイルは捨てる

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::types::{EnhancedMedia, QualityMetrics};

#[derive(Deserialize)]
struct WireMetrics {
    #[serde(default)]
    psnr: Option<f64>,
    #[serde(default)]
    ssim: Option<f64>,
    #[serde(default, alias = "uqim")]
    uqi: Option<f64>,
}

/// POST /enhance のレスポンス
#[derive(Deserialize)]
struct ImageResponse {
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    metrics: Option<WireMetrics>,
    #[serde(default)]
    file: Option<String>,
    #[serde(default)]
    file_exists: Option<bool>,
}

/// POST /enhance_video のレスポンス
#[derive(Deserialize)]
struct VideoResponse {
    #[serde(default)]
    video_url: Option<String>,
    #[serde(default)]
    video_file: Option<String>,
    #[serde(default)]
    metrics: Option<WireMetrics>,
}

/// 画像強調レスポンスをデコード
pub fn decode_image_response(body: &str) -> Result<EnhancedMedia> {
    let raw: ImageResponse = serde_json::from_str(body)
        .map_err(|e| Error::Decode(format!("image response: {}", e)))?;

    let media = require_media(raw.image, "image")?;
    let metrics = normalize_metrics(raw.metrics)?;
    let source_file = match raw.file_exists {
        Some(false) => None,
        _ => non_empty(raw.file),
    };

    Ok(EnhancedMedia {
        media,
        metrics,
        source_file,
    })
}

/// 動画強調レスポンスをデコード
pub fn decode_video_response(body: &str) -> Result<EnhancedMedia> {
    let raw: VideoResponse = serde_json::from_str(body)
        .map_err(|e| Error::Decode(format!("video response: {}", e)))?;

    Ok(EnhancedMedia {
        media: require_media(raw.video_url, "video_url")?,
        metrics: normalize_metrics(raw.metrics)?,
        source_file: non_empty(raw.video_file),
    })
}

fn require_media(value: Option<String>, field: &str) -> Result<String> {
    non_empty(value).ok_or_else(|| Error::Decode(format!("missing or empty `{}`", field)))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn normalize_metrics(metrics: Option<WireMetrics>) -> Result<QualityMetrics> {
    let Some(m) = metrics else {
        return Ok(QualityMetrics::default());
    };

    let psnr = m.psnr.unwrap_or(0.0);
    if psnr < 0.0 {
        return Err(Error::Decode(format!("negative psnr: {}", psnr)));
    }

    Ok(QualityMetrics {
        ssim: m.ssim.unwrap_or(0.0),
        uqi: m.uqi.unwrap_or(0.0),
        psnr,
    })
}
