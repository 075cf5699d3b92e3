//! 強調処理の型定義
//!
//! CLIとセッションで共有される型:
//! - MediaAsset: ユーザーが選択した画像/動画
//! - EnhancedMedia: サーバーレスポンスのデコード結果
//! - EnhancementResult: 1回の強調処理の最終結果

use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// メディア種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// MIMEタイプから種別を判定（image/* と video/* 以外は None）
    pub fn from_mime(mime: &str) -> Option<Self> {
        let top = mime.split('/').next()?.trim().to_ascii_lowercase();
        let sub = mime.split('/').nth(1).map(str::trim).unwrap_or_default();
        if sub.is_empty() {
            return None;
        }
        match top.as_str() {
            "image" => Some(MediaKind::Image),
            "video" => Some(MediaKind::Video),
            _ => None,
        }
    }

    /// multipartのフィールド名
    pub fn form_field(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        }
    }

    /// エンドポイントのパス
    pub fn endpoint_path(&self) -> &'static str {
        match self {
            MediaKind::Image => "/enhance",
            MediaKind::Video => "/enhance_video",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Image => write!(f, "image"),
            MediaKind::Video => write!(f, "video"),
        }
    }
}

/// ユーザーが選択したメディア
///
/// 新しいファイルを選択すると丸ごと置き換えられ、内容が書き換わることはない。
#[derive(Clone, PartialEq, Eq)]
pub struct MediaAsset {
    file_name: String,
    mime: String,
    kind: MediaKind,
    content: Vec<u8>,
}

impl MediaAsset {
    /// 空のペイロードと未知のMIMEタイプは拒否する
    pub fn new(file_name: impl Into<String>, mime: impl Into<String>, content: Vec<u8>) -> Result<Self> {
        let file_name = file_name.into();
        let mime = mime.into();

        if content.is_empty() {
            return Err(Error::InvalidMedia(format!("{} is empty", file_name)));
        }

        let kind = MediaKind::from_mime(&mime)
            .ok_or_else(|| Error::InvalidMedia(format!("unsupported media type: {}", mime)))?;

        Ok(Self {
            file_name,
            mime,
            kind,
            content,
        })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// 表示用のData URL（data:<mime>;base64,<payload>）
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.content))
    }
}

impl fmt::Debug for MediaAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaAsset")
            .field("file_name", &self.file_name)
            .field("mime", &self.mime)
            .field("kind", &self.kind)
            .field("bytes", &self.content.len())
            .finish()
    }
}

/// 画質指標
///
/// 値が取得できなかった場合は省略せず 0.0 とする。
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    #[serde(default)]
    pub ssim: f64,

    #[serde(default, alias = "uqim")]
    pub uqi: f64,

    #[serde(default)]
    pub psnr: f64,
}

impl QualityMetrics {
    pub fn new(ssim: f64, uqi: f64, psnr: f64) -> Self {
        Self { ssim, uqi, psnr }
    }

    pub fn is_zero(&self) -> bool {
        self.ssim == 0.0 && self.uqi == 0.0 && self.psnr == 0.0
    }
}

/// サーバーから返された強調済みメディア
#[derive(Debug, Clone, PartialEq)]
pub struct EnhancedMedia {
    /// Data URL またはURL
    pub media: String,
    pub metrics: QualityMetrics,
    /// サーバー側の保存ファイル（ダウンロードリンク用）
    pub source_file: Option<String>,
}

/// 結果の出自
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultOutcome {
    /// サーバーが処理した結果
    Enhanced,
    /// 呼び出し失敗時の代替結果（元画像 + 指標ゼロ）
    Fallback,
}

/// 強調処理の結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancementResult {
    pub original: String,
    pub enhanced: String,
    pub metrics: QualityMetrics,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
    pub outcome: ResultOutcome,
}

impl EnhancementResult {
    pub fn enhanced(asset: &MediaAsset, media: EnhancedMedia) -> Self {
        Self {
            original: asset.to_data_url(),
            enhanced: media.media,
            metrics: media.metrics,
            source_file: media.source_file,
            outcome: ResultOutcome::Enhanced,
        }
    }

    pub fn fallback(asset: &MediaAsset) -> Self {
        let original = asset.to_data_url();
        Self {
            enhanced: original.clone(),
            original,
            metrics: QualityMetrics::default(),
            source_file: None,
            outcome: ResultOutcome::Fallback,
        }
    }

    pub fn is_enhanced(&self) -> bool {
        self.outcome == ResultOutcome::Enhanced
    }
}
