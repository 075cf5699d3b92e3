//! Data URLユーティリティ

use base64::{engine::general_purpose::STANDARD, Engine};

use crate::error::{Error, Result};

/// Data URLからBase64データ部分を抽出
///
/// # Arguments
/// * `data_url` - "data:image/png;base64,iVBOR..." 形式のData URL
///
/// # Returns
/// Base64エンコードされたデータ部分、または抽出失敗時はNone
pub fn extract_base64_from_data_url(data_url: &str) -> Option<&str> {
    let rest = data_url.strip_prefix("data:")?;
    let (header, data) = rest.split_once(',')?;
    if !header.ends_with(";base64") {
        return None;
    }
    Some(data)
}

/// Data URLからMIMEタイプを抽出
///
/// 抽出失敗時は "application/octet-stream" を返す
pub fn extract_mime_type_from_data_url(data_url: &str) -> &str {
    data_url
        .strip_prefix("data:")
        .and_then(|s| s.split([';', ',']).next())
        .filter(|s| !s.is_empty())
        .unwrap_or("application/octet-stream")
}

/// Data URLをデコードして (MIMEタイプ, バイト列) を返す
pub fn decode_data_url(data_url: &str) -> Result<(String, Vec<u8>)> {
    let data = extract_base64_from_data_url(data_url)
        .ok_or_else(|| Error::Decode("not a base64 data URL".into()))?;
    let bytes = STANDARD
        .decode(data.trim())
        .map_err(|e| Error::Decode(format!("invalid base64 payload: {}", e)))?;
    let mime = extract_mime_type_from_data_url(data_url).to_string();
    Ok((mime, bytes))
}

/// 保存ファイル用の拡張子
pub fn extension_for_mime(mime: &str) -> &'static str {
    match mime.to_ascii_lowercase().as_str() {
        "image/png" => "png",
        "image/jpeg" | "image/jpg" => "jpg",
        "image/bmp" => "bmp",
        "image/tiff" => "tiff",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "video/mp4" => "mp4",
        "video/quicktime" => "mov",
        "video/webm" => "webm",
        "video/x-msvideo" => "avi",
        "video/x-matroska" => "mkv",
        _ => "bin",
    }
}
