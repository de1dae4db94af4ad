//! 画像のPNG再エンコード
//!
//! 入力形式に関係なく、APIへはPNGで送る。

use crate::error::{EvalError, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::ImageFormat;
use std::io::Cursor;
use std::path::Path;

pub const PNG_MIME_TYPE: &str = "image/png";

/// PNGにエンコード済みの画像
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    png: Vec<u8>,
}

impl EncodedImage {
    /// PNGバイト列から作成
    pub fn from_png_bytes(png: Vec<u8>) -> Self {
        Self { png }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.png
    }

    pub fn mime_type(&self) -> &'static str {
        PNG_MIME_TYPE
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.png)
    }

    /// `data:image/png;base64,...` 形式
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", PNG_MIME_TYPE, self.to_base64())
    }
}

/// 画像ファイルを読み込んでPNGに変換
pub fn encode_png(path: &Path) -> Result<EncodedImage> {
    let img = image::open(path)
        .map_err(|e| EvalError::ImageLoad(format!("{}: {}", path.display(), e)))?;

    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, ImageFormat::Png)
        .map_err(|e| EvalError::ImageLoad(format!("{}: PNG変換失敗: {}", path.display(), e)))?;

    Ok(EncodedImage::from_png_bytes(buffer.into_inner()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_url() {
        let img = EncodedImage::from_png_bytes(b"abc".to_vec());
        assert_eq!(img.to_base64(), "YWJj");
        assert_eq!(img.to_data_url(), "data:image/png;base64,YWJj");
    }

    #[test]
    fn test_encode_png_from_bmp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pixel.bmp");
        image::RgbImage::from_pixel(2, 2, image::Rgb([255, 0, 0]))
            .save(&path)
            .unwrap();

        let encoded = encode_png(&path).unwrap();
        assert!(encoded.bytes().starts_with(&[0x89, b'P', b'N', b'G']));
    }

    #[test]
    fn test_encode_png_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.jpg");
        std::fs::write(&path, b"not an image").unwrap();

        let err = encode_png(&path).unwrap_err();
        assert!(matches!(err, EvalError::ImageLoad(_)));
    }
}
