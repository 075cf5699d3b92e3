use crate::error::{Result, SeaVigilError};
use seavigil_common::{MediaAsset, MediaKind};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct MediaInfo {
    pub path: PathBuf,
    pub file_name: String,
    pub kind: MediaKind,
}

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tif", "tiff", "gif", "webp"];

const VIDEO_EXTENSIONS: &[(&str, &str)] = &[
    ("mp4", "video/mp4"),
    ("m4v", "video/mp4"),
    ("mov", "video/quicktime"),
    ("webm", "video/webm"),
    ("avi", "video/x-msvideo"),
    ("mkv", "video/x-matroska"),
];

/// ファイルを読み込んでMediaAssetを作成
pub fn load_asset(path: &Path) -> Result<MediaAsset> {
    if !path.is_file() {
        return Err(SeaVigilError::FileNotFound(path.display().to_string()));
    }

    let content = std::fs::read(path)?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let mime = detect_mime(path, &content)
        .ok_or_else(|| SeaVigilError::InvalidInput(format!("対応していない形式です: {}", file_name)))?;

    Ok(MediaAsset::new(file_name, mime, content)?)
}

/// MIMEタイプを判定（画像のマジックバイト > 拡張子）
pub fn detect_mime(path: &Path, content: &[u8]) -> Option<String> {
    if let Ok(format) = image::guess_format(content) {
        return Some(format.to_mime_type().to_string());
    }

    let ext = path.extension()?.to_string_lossy().to_ascii_lowercase();
    if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        return image::ImageFormat::from_extension(&ext).map(|f| f.to_mime_type().to_string());
    }
    VIDEO_EXTENSIONS
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, mime)| mime.to_string())
}

fn kind_from_extension(path: &Path) -> Option<MediaKind> {
    let ext = path.extension()?.to_string_lossy().to_ascii_lowercase();
    if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        Some(MediaKind::Image)
    } else if VIDEO_EXTENSIONS.iter().any(|(e, _)| *e == ext) {
        Some(MediaKind::Video)
    } else {
        None
    }
}

/// フォルダ直下の画像・動画を列挙（ファイル名順）
pub fn scan_folder(folder: &Path) -> Result<Vec<MediaInfo>> {
    if !folder.is_dir() {
        return Err(SeaVigilError::FolderNotFound(folder.display().to_string()));
    }

    let mut items = Vec::new();

    for entry in WalkDir::new(folder)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();

        if !path.is_file() {
            continue;
        }

        if let Some(kind) = kind_from_extension(path) {
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();

            items.push(MediaInfo {
                path: path.to_path_buf(),
                file_name,
                kind,
            });
        }
    }

    items.sort_by(|a, b| a.file_name.cmp(&b.file_name));

    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::tempdir;

    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n', 0, 0];

    #[test]
    fn test_kind_from_extension() {
        assert_eq!(kind_from_extension(Path::new("a.jpg")), Some(MediaKind::Image));
        assert_eq!(kind_from_extension(Path::new("a.JPG")), Some(MediaKind::Image));
        assert_eq!(kind_from_extension(Path::new("a.tiff")), Some(MediaKind::Image));
        assert_eq!(kind_from_extension(Path::new("dive.MP4")), Some(MediaKind::Video));
        assert_eq!(kind_from_extension(Path::new("notes.txt")), None);
        assert_eq!(kind_from_extension(Path::new("noext")), None);
    }

    #[test]
    fn test_detect_mime_prefers_magic_bytes() {
        // 拡張子が違っても中身で判定する
        let mime = detect_mime(Path::new("photo.jpg"), PNG_MAGIC);
        assert_eq!(mime.as_deref(), Some("image/png"));
    }

    #[test]
    fn test_detect_mime_by_extension() {
        assert_eq!(detect_mime(Path::new("a.jpeg"), b"dummy").as_deref(), Some("image/jpeg"));
        assert_eq!(detect_mime(Path::new("a.mov"), b"dummy").as_deref(), Some("video/quicktime"));
        assert_eq!(detect_mime(Path::new("a.txt"), b"dummy"), None);
    }

    #[test]
    fn test_video_mimes_have_save_extension() {
        for (ext, mime) in VIDEO_EXTENSIONS {
            let saved = seavigil_common::extension_for_mime(mime);
            assert_ne!(saved, "bin", "{} ({}) に保存用拡張子がない", ext, mime);
        }
        assert_eq!(seavigil_common::extension_for_mime("video/x-matroska"), "mkv");
    }

    #[test]
    fn test_load_asset_not_found() {
        let err = load_asset(Path::new("/nonexistent/dive.png")).unwrap_err();
        assert!(matches!(err, SeaVigilError::FileNotFound(_)));
    }

    #[test]
    fn test_load_asset_empty_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.png");
        File::create(&path).unwrap();

        let err = load_asset(&path).unwrap_err();
        assert!(matches!(err, SeaVigilError::InvalidInput(_)));
    }

    #[test]
    fn test_load_asset_unsupported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("readme.txt");
        fs::write(&path, "text").unwrap();

        let err = load_asset(&path).unwrap_err();
        assert!(matches!(err, SeaVigilError::InvalidInput(_)));
    }

    #[test]
    fn test_load_asset_png() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("reef.png");
        fs::write(&path, PNG_MAGIC).unwrap();

        let asset = load_asset(&path).unwrap();
        assert_eq!(asset.file_name(), "reef.png");
        assert_eq!(asset.mime(), "image/png");
        assert_eq!(asset.kind(), MediaKind::Image);
        assert_eq!(asset.content(), PNG_MAGIC);
    }

    #[test]
    fn test_scan_folder_not_found() {
        let result = scan_folder(Path::new("/nonexistent/folder"));
        assert!(matches!(result, Err(SeaVigilError::FolderNotFound(_))));
    }

    #[test]
    fn test_scan_folder_with_media() {
        let dir = tempdir().unwrap();

        File::create(dir.path().join("c.mp4")).unwrap().write_all(b"dummy").unwrap();
        File::create(dir.path().join("a.jpg")).unwrap().write_all(b"dummy").unwrap();
        File::create(dir.path().join("b.PNG")).unwrap().write_all(b"dummy").unwrap();
        File::create(dir.path().join("readme.txt")).unwrap().write_all(b"text").unwrap();
        fs::create_dir(dir.path().join("sub.png")).unwrap();

        let result = scan_folder(dir.path()).unwrap();
        let names: Vec<_> = result.iter().map(|m| m.file_name.as_str()).collect();
        assert_eq!(names, vec!["a.jpg", "b.PNG", "c.mp4"]);
        assert_eq!(result[2].kind, MediaKind::Video);
    }
}
