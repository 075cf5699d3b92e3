//! 強調結果の保存

use std::path::{Path, PathBuf};

use seavigil_common::{decode_data_url, extension_for_mime, EnhancementResult};

use crate::error::Result;

/// 既定の保存ファイル名（enhanced_YYYYmmdd-HHMMSS.<ext>）
pub fn default_file_name(ext: &str) -> String {
    format!("enhanced_{}.{}", chrono::Local::now().format("%Y%m%d-%H%M%S"), ext)
}

/// 入力ファイル名から出力ファイル名を作る（reef.jpg → reef_enhanced.png）
pub fn derived_file_name(input: &str, ext: &str) -> String {
    let stem = Path::new(input)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "output".to_string());
    format!("{}_enhanced.{}", stem, ext)
}

/// 強調後メディアがData URLなら保存する
///
/// 代替結果やURLで返された動画は保存せず None を返す。
/// `target` がディレクトリなら `name` で決めたファイル名で保存する。
pub fn save_enhanced(
    result: &EnhancementResult,
    target: &Path,
    name: impl FnOnce(&str) -> String,
) -> Result<Option<PathBuf>> {
    if !result.is_enhanced() || !result.enhanced.starts_with("data:") {
        return Ok(None);
    }

    let (mime, bytes) = decode_data_url(&result.enhanced)?;
    let path = if target.is_dir() {
        target.join(name(extension_for_mime(&mime)))
    } else {
        target.to_path_buf()
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, bytes)?;
    Ok(Some(path))
}
