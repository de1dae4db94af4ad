//! OpenAI Chat Completions 連携
//!
//! システムロール + ユーザーロール（テキストと data URL 画像の部品列）で送信する。

use super::{PromptImages, VisionModel};
use crate::error::{EvalError, Result};
use async_trait::async_trait;
use emotion_eval_common::{ImageRef, ModelVendor, Prompt, PromptPart};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// 監査ログで画像データの代わりに入れる値
const IMAGE_PLACEHOLDER: &str = "[BASE64_IMAGE_DATA]";

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: MessageContent,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

pub struct OpenAiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    max_tokens: u32,
    endpoint: String,
}

impl OpenAiClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        let model = model.into();
        info!(model = %model, "OpenAIクライアントを作成");
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model,
            max_tokens: 256,
            endpoint: OPENAI_API_URL.to_string(),
        }
    }

    pub fn max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = max;
        self
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

    /// 互換エンドポイント（プロキシ等）を使う
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// メッセージ列を組み立てる（images が None なら画像を伏せ字にする）
    fn build_messages(&self, prompt: &Prompt, images: Option<&PromptImages<'_>>) -> Result<Vec<ChatMessage>> {
        let mut messages = Vec::new();

        if let Some(system) = &prompt.system {
            messages.push(ChatMessage {
                role: "system",
                content: MessageContent::Text(system.clone()),
            });
        }

        let mut parts = Vec::with_capacity(prompt.parts.len());
        for part in &prompt.parts {
            match part {
                PromptPart::Text(text) => parts.push(ContentPart::Text { text: text.clone() }),
                PromptPart::Image(image) => parts.push(ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: image_url(*image, images)?,
                    },
                }),
            }
        }

        messages.push(ChatMessage {
            role: "user",
            content: MessageContent::Parts(parts),
        });

        Ok(messages)
    }
}

fn image_url(image: ImageRef, images: Option<&PromptImages<'_>>) -> Result<String> {
    match images {
        Some(images) => Ok(images.resolve(image)?.to_data_url()),
        None => Ok(IMAGE_PLACEHOLDER.to_string()),
    }
}

/// 応答から本文を取り出す
fn extract_content(completion: ChatCompletionResponse) -> Result<String> {
    completion
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| EvalError::ApiParse("OpenAI: 応答に本文がありません".into()))
}

#[async_trait]
impl VisionModel for OpenAiClient {
    fn vendor(&self) -> ModelVendor {
        ModelVendor::OpenAi
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn describe_request(&self, prompt: &Prompt) -> Result<String> {
        let messages = self.build_messages(prompt, None)?;
        Ok(serde_json::to_string_pretty(&messages)?)
    }

    #[instrument(name = "openai_complete", skip(self, prompt, images), fields(model = %self.model))]
    async fn complete(
        &self,
        prompt: &Prompt,
        images: &PromptImages<'_>,
        temperature: f32,
    ) -> Result<String> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages: self.build_messages(prompt, Some(images))?,
            max_tokens: self.max_tokens,
            temperature,
        };

        debug!("OpenAI APIへ送信");
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "OpenAIへのHTTPリクエスト失敗");
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
                "OpenAI API error ({}): {}",
                status, error_text
            )));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| EvalError::ApiParse(format!("OpenAI: {}", e)))?;

        extract_content(completion)
    }
}
