use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use seavigil_common::{
    decode_image_response, decode_video_response, EnhancedMedia, EnhancementResult, MediaAsset, MediaKind,
};
use tracing::{debug, info};

use super::Enhancer;
use crate::error::{Result, TransportError};

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// 強調サービスへのHTTPクライアント
///
/// 状態を持たないのでセッション間で共有できる。リトライもタイムアウト設定もしない。
#[derive(Debug, Clone)]
pub struct EnhancementClient {
    http: reqwest::Client,
    base_url: String,
    passthrough: bool,
}

impl EnhancementClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(TransportError::Http)?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            passthrough: false,
        })
    }

    /// サーバー側でモデルを通さず入力をそのまま返させる（パイプライン検証用）
    pub fn with_passthrough(mut self, passthrough: bool) -> Self {
        self.passthrough = passthrough;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoint(&self, kind: MediaKind) -> String {
        format!("{}{}", self.base_url, kind.endpoint_path())
    }

    /// GET /health
    pub async fn health(&self) -> Result<serde_json::Value> {
        let url = format!("{}/health", self.base_url);
        debug!(%url, "health check");

        let response = self.http.get(&url).send().await.map_err(TransportError::Http)?;
        let response = check_status(response).await?;
        let body = response.json().await.map_err(TransportError::Http)?;
        Ok(body)
    }

    async fn post_media(&self, asset: &MediaAsset) -> std::result::Result<EnhancedMedia, TransportError> {
        let kind = asset.kind();
        let url = self.endpoint(kind);

        let part = Part::bytes(asset.content().to_vec())
            .file_name(asset.file_name().to_string())
            .mime_str(asset.mime())?;
        let mut form = Form::new().part(kind.form_field(), part);
        if self.passthrough {
            form = form.text("passthrough", "true");
        }

        info!(%url, file = asset.file_name(), bytes = asset.content().len(), "uploading media");
        let response = self.http.post(&url).multipart(form).send().await?;
        let response = check_status(response).await?;
        let body = response.text().await?;
        debug!(len = body.len(), "response received");

        let decoded = match kind {
            MediaKind::Image => decode_image_response(&body),
            MediaKind::Video => decode_video_response(&body),
        };
        decoded.map_err(TransportError::Decode)
    }
}

async fn check_status(response: reqwest::Response) -> std::result::Result<reqwest::Response, TransportError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(TransportError::Status { status, body })
}

#[async_trait]
impl Enhancer for EnhancementClient {
    async fn enhance(&self, asset: &MediaAsset) -> Result<EnhancementResult> {
        let media = self.post_media(asset).await?;
        info!(
            ssim = media.metrics.ssim,
            uqi = media.metrics.uqi,
            psnr = media.metrics.psnr,
            "enhancement finished"
        );
        Ok(EnhancementResult::enhanced(asset, media))
    }
}
