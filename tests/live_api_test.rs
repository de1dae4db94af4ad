//! 実APIを使う統合テスト
//!
//! APIキーの環境変数が未設定ならスキップする。

use emotion_eval::analyzer::{query_emotion, GeminiClient, OpenAiClient, PromptImages, QueryOptions, VisionModel};
use emotion_eval::scanner::EncodedImage;
use emotion_eval_common::{PromptStrategy, StrategyOutcome};
use std::io::Cursor;

fn api_key(name: &str) -> Option<String> {
    match std::env::var(name) {
        Ok(key) if !key.trim().is_empty() => Some(key),
        _ => {
            eprintln!("{} not set; skipping integration test", name);
            None
        }
    }
}

/// 単色の小さなPNG
fn test_image() -> EncodedImage {
    let img = image::RgbImage::from_pixel(64, 64, image::Rgb([255, 220, 0]));
    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, image::ImageFormat::Png)
        .expect("png encode failed");
    EncodedImage::from_png_bytes(buffer.into_inner())
}

async fn assert_zero_shot_answers(model: &dyn VisionModel) {
    let target = test_image();
    let images = PromptImages::new(&target, &[]);
    let options = QueryOptions {
        temperature: 0.0,
        max_retries: 1,
    };

    let response = query_emotion(model, PromptStrategy::ZeroShot, &images, &options).await;
    assert!(response.label.is_some(), "no answer from {}", model.model_name());

    let outcome = StrategyOutcome::from_response(&response);
    eprintln!(
        "{}: {:?} -> {:?}",
        model.model_name(),
        outcome.raw_label,
        outcome.label
    );
}

#[tokio::test]
async fn gemini_zero_shot_integration() {
    let Some(key) = api_key("GOOGLE_API_KEY") else {
        return;
    };
    let client = GeminiClient::new(key, "gemini-1.5-pro").with_timeout(60);
    assert_zero_shot_answers(&client).await;
}

#[tokio::test]
async fn openai_zero_shot_integration() {
    let Some(key) = api_key("OPENAI_API_KEY") else {
        return;
    };
    let client = OpenAiClient::new(key, "gpt-4o").with_timeout(60);
    assert_zero_shot_answers(&client).await;
}
