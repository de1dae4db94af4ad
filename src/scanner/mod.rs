mod encode;

pub use encode::{encode_png, EncodedImage, PNG_MIME_TYPE};

use crate::error::{EvalError, Result};
use emotion_eval_common::FEW_SHOT_EXAMPLES;
use emotion_eval_common::Emotion;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct ImageInfo {
    pub path: PathBuf,
    pub file_name: String,
}

/// PNG変換済みの解析対象画像
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub info: ImageInfo,
    pub image: EncodedImage,
}

/// few-shot 例示画像
#[derive(Debug, Clone)]
pub struct FewShotExample {
    pub emotion: Emotion,
    pub path: PathBuf,
    pub image: EncodedImage,
}

const IMAGE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "bmp", "gif", "tiff", "tif", "webp", "ico", "heic",
];

fn is_image_extension(ext: &str) -> bool {
    IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str())
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .map(|ext| is_image_extension(&ext.to_string_lossy()))
        .unwrap_or(false)
}

pub fn scan_folder(folder: &Path) -> Result<Vec<ImageInfo>> {
    if !folder.is_dir() {
        return Err(EvalError::FolderNotFound(folder.display().to_string()));
    }

    let mut images = Vec::new();

    for entry in WalkDir::new(folder)
        .max_depth(1)  // 直下のみ（再帰しない）
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();

        if !path.is_file() || !has_image_extension(path) {
            continue;
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        images.push(ImageInfo {
            path: path.to_path_buf(),
            file_name,
        });
    }

    // ファイル名でソート
    images.sort_by(|a, b| a.file_name.cmp(&b.file_name));

    Ok(images)
}

/// 画像を読み込んでPNGに変換する
///
/// 読み込めない画像は警告を出してスキップする。
pub fn load_images(images: &[ImageInfo]) -> Vec<LoadedImage> {
    images
        .iter()
        .filter_map(|info| match encode_png(&info.path) {
            Ok(image) => Some(LoadedImage {
                info: info.clone(),
                image,
            }),
            Err(e) => {
                tracing::warn!(path = %info.path.display(), error = %e, "画像を読み込めないためスキップ");
                None
            }
        })
        .collect()
}

/// few-shot 例示画像を読み込む
///
/// FEW_SHOT_EXAMPLES の順に、ファイル名（小文字）が basename で始まる
/// 最初の画像ファイルを探す。1つでも欠けていればエラー。
pub fn load_few_shot_examples(folder: &Path) -> Result<Vec<FewShotExample>> {
    if !folder.is_dir() {
        return Err(EvalError::FolderNotFound(folder.display().to_string()));
    }

    let candidates = scan_folder(folder)?;
    let mut examples = Vec::with_capacity(FEW_SHOT_EXAMPLES.len());

    for spec in FEW_SHOT_EXAMPLES {
        let found = candidates
            .iter()
            .find(|img| img.file_name.to_lowercase().starts_with(spec.basename))
            .ok_or_else(|| EvalError::FewShotExampleNotFound {
                basename: spec.basename.to_string(),
                label: spec.emotion.arabic().to_string(),
                folder: folder.display().to_string(),
            })?;

        tracing::debug!(path = %found.path.display(), label = %spec.emotion, "few-shot例示を読み込み");
        examples.push(FewShotExample {
            emotion: spec.emotion,
            path: found.path.clone(),
            image: encode_png(&found.path)?,
        });
    }

    Ok(examples)
}
