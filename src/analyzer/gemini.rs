//! Gemini API連携
//!
//! システムロールは使わず、指示を先頭テキストに結合して送信する。

use super::{PromptImages, VisionModel};
use crate::error::{EvalError, Result};
use async_trait::async_trait;
use emotion_eval_common::{ModelVendor, Prompt, PromptPart};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// 監査ログで画像データの代わりに入れる値
const IMAGE_PLACEHOLDER: &str = "[BINARY_IMAGE_DATA]";

/// Gemini APIリクエスト
#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Debug, Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

/// Gemini APIレスポンス
#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<ResponseContent>,
    #[serde(rename = "finishReason", default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        let model = model.into();
        info!(model = %model, "Geminiクライアントを作成");
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model,
            base_url: GEMINI_API_BASE.to_string(),
        }
    }

    /// HTTPタイムアウトを設定
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "タイムアウト付きクライアントの作成に失敗、デフォルトを使用");
                reqwest::Client::new()
            });
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/{}:generateContent", self.base_url.trim_end_matches('/'), self.model)
    }

    /// 部品列を組み立てる（images が None なら画像を伏せ字にする）
    ///
    /// システム指示は最初のテキスト部品の前に空行を挟んで結合する。
    fn build_parts(&self, prompt: &Prompt, images: Option<&PromptImages<'_>>) -> Result<Vec<Part>> {
        let mut system = prompt.system.as_deref();
        let mut parts = Vec::with_capacity(prompt.parts.len());

        for part in &prompt.parts {
            match part {
                PromptPart::Text(text) => {
                    let text = match system.take() {
                        Some(system) => format!("{}\n\n{}", system, text),
                        None => text.clone(),
                    };
                    parts.push(Part::Text { text });
                }
                PromptPart::Image(image) => {
                    let inline_data = match images {
                        Some(images) => {
                            let encoded = images.resolve(*image)?;
                            InlineData {
                                mime_type: encoded.mime_type().to_string(),
                                data: encoded.to_base64(),
                            }
                        }
                        None => InlineData {
                            mime_type: crate::scanner::PNG_MIME_TYPE.to_string(),
                            data: IMAGE_PLACEHOLDER.to_string(),
                        },
                    };
                    parts.push(Part::InlineData { inline_data });
                }
            }
        }

        Ok(parts)
    }

    fn build_contents(&self, prompt: &Prompt, images: Option<&PromptImages<'_>>) -> Result<Vec<Content>> {
        Ok(vec![Content {
            role: "user",
            parts: self.build_parts(prompt, images)?,
        }])
    }
}

/// 応答からテキストを取り出す（複数部品は連結）
fn extract_text(response: GeminiResponse) -> Result<String> {
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| EvalError::ApiParse("Gemini: 候補が空です".into()))?;

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(EvalError::ApiParse(format!(
            "Gemini: 応答テキストがありません (finishReason: {})",
            candidate.finish_reason.as_deref().unwrap_or("unknown")
        )));
    }

    Ok(text)
}

#[async_trait]
impl VisionModel for GeminiClient {
    fn vendor(&self) -> ModelVendor {
        ModelVendor::Gemini
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn describe_request(&self, prompt: &Prompt) -> Result<String> {
        let contents = self.build_contents(prompt, None)?;
        Ok(serde_json::to_string_pretty(&contents)?)
    }

    #[instrument(name = "gemini_complete", skip(self, prompt, images), fields(model = %self.model))]
    async fn complete(
        &self,
        prompt: &Prompt,
        images: &PromptImages<'_>,
        temperature: f32,
    ) -> Result<String> {
        let request = GeminiRequest {
            contents: self.build_contents(prompt, Some(images))?,
            generation_config: GenerationConfig { temperature },
        };

        debug!("Gemini APIへ送信");
        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                // URLにAPIキーが含まれるため伏せる
                let e = e.without_url();
                error!(error = %e, "GeminiへのHTTPリクエスト失敗");
                if e.is_timeout() {
                    EvalError::Timeout
                } else {
                    EvalError::Http(e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(EvalError::ApiCall(format!(
                "Gemini API error ({}): {}",
                status, error_text
            )));
        }

        let payload: GeminiResponse = response
            .json()
            .await
            .map_err(|e| EvalError::ApiParse(format!("Gemini: {}", e.without_url())))?;

        extract_text(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::{EncodedImage, FewShotExample};
    use emotion_eval_common::{build_prompt, Emotion, PromptStrategy, SYSTEM_PROMPT};
    use std::path::PathBuf;

    fn client() -> GeminiClient {
        GeminiClient::new("test-key", "gemini-1.5-pro")
    }

    #[test]
    fn test_endpoint() {
        let c = client().with_base_url("http://localhost:8080/models/");
        assert_eq!(c.endpoint(), "http://localhost:8080/models/gemini-1.5-pro:generateContent");
        assert_eq!(
            client().endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-pro:generateContent"
        );
    }

    #[test]
    fn test_system_prompt_merged_into_first_text() {
        let prompt = build_prompt(ModelVendor::Gemini, PromptStrategy::ZeroShot);
        let img = EncodedImage::from_png_bytes(b"abc".to_vec());
        let images = PromptImages::new(&img, &[]);

        let contents = client().build_contents(&prompt, Some(&images)).unwrap();
        let json = serde_json::to_value(&contents).unwrap();

        assert_eq!(json[0]["role"], "user");
        let first = json[0]["parts"][0]["text"].as_str().unwrap();
        assert!(first.starts_with(&format!("{}\n\n", SYSTEM_PROMPT)));
        assert_eq!(json[0]["parts"][1]["inline_data"]["mime_type"], "image/png");
        assert_eq!(json[0]["parts"][1]["inline_data"]["data"], "YWJj");
    }

    #[test]
    fn test_few_shot_without_system() {
        let prompt = build_prompt(ModelVendor::Gemini, PromptStrategy::FewShot);
        let img = EncodedImage::from_png_bytes(b"abc".to_vec());
        let examples: Vec<FewShotExample> = [Emotion::Sadness, Emotion::Surprise, Emotion::Disgust]
            .into_iter()
            .map(|emotion| FewShotExample {
                emotion,
                path: PathBuf::from(format!("{}.png", emotion.english())),
                image: EncodedImage::from_png_bytes(vec![0]),
            })
            .collect();
        let images = PromptImages::new(&img, &examples);

        let parts = client().build_parts(&prompt, Some(&images)).unwrap();
        assert_eq!(parts.len(), prompt.parts.len());
        match &parts[0] {
            Part::Text { text } => assert!(!text.contains(SYSTEM_PROMPT)),
            other => panic!("unexpected part: {:?}", other),
        }
    }

    #[test]
    fn test_describe_request_redacts_images() {
        let prompt = build_prompt(ModelVendor::Gemini, PromptStrategy::ChainOfThought);
        let json = client().describe_request(&prompt).unwrap();
        assert!(json.contains(IMAGE_PLACEHOLDER));
        assert!(json.contains("الشعور:"));
    }

    #[test]
    fn test_extract_text_joins_parts() {
        let response: GeminiResponse = serde_json::from_str(
            r#"{"candidates": [{"content": {"parts": [{"text": "الطفل يبكي.\n"}, {"text": "الشعور: حزن"}]}, "finishReason": "STOP"}]}"#,
        )
        .unwrap();
        assert_eq!(extract_text(response).unwrap(), "الطفل يبكي.\nالشعور: حزن");
    }

    #[test]
    fn test_extract_text_blocked() {
        let response: GeminiResponse =
            serde_json::from_str(r#"{"candidates": [{"finishReason": "SAFETY"}]}"#).unwrap();
        let err = extract_text(response).unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }

    #[test]
    fn test_extract_text_no_candidates() {
        let response: GeminiResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert!(matches!(extract_text(response), Err(EvalError::ApiParse(_))));
    }
}
