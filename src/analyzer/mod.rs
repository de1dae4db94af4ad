//! 画像感情解析モジュール
//!
//! - VisionModel: ベンダーごとのクライアントが実装するトレイト
//! - query_emotion: 拒否・エラー時のリトライを含む1回分の問い合わせ

mod gemini;
mod openai;

pub use gemini::GeminiClient;
pub use openai::OpenAiClient;

use crate::error::Result;
use crate::scanner::{EncodedImage, FewShotExample};
use async_trait::async_trait;
use emotion_eval_common::{
    build_prompt, is_refusal, ImageRef, ModelResponse, ModelVendor, Prompt, PromptStrategy,
};
use emotion_eval_common::Error as CommonError;
use tracing::{debug, warn};

/// リトライごとに加算する温度
const TEMPERATURE_STEP: f32 = 0.1;
/// 両APIが受け付ける温度の上限
const MAX_TEMPERATURE: f32 = 2.0;

/// プロンプトの画像スロットに入る画像
#[derive(Debug, Clone, Copy)]
pub struct PromptImages<'a> {
    pub target: &'a EncodedImage,
    pub examples: &'a [FewShotExample],
}

impl<'a> PromptImages<'a> {
    pub fn new(target: &'a EncodedImage, examples: &'a [FewShotExample]) -> Self {
        Self { target, examples }
    }

    /// 画像スロットを実画像に解決
    pub fn resolve(&self, image: ImageRef) -> Result<&'a EncodedImage> {
        match image {
            ImageRef::Target => Ok(self.target),
            ImageRef::Example(idx) => self
                .examples
                .get(idx)
                .map(|e| &e.image)
                .ok_or_else(|| CommonError::MissingFewShotExample(idx).into()),
        }
    }
}

#[async_trait]
pub trait VisionModel: Send + Sync {
    fn vendor(&self) -> ModelVendor;

    fn model_name(&self) -> &str;

    /// 画像データを伏せ字にしたリクエストJSON（監査ログ用）
    fn describe_request(&self, prompt: &Prompt) -> Result<String>;

    /// プロンプトを送信し、応答テキストを返す
    async fn complete(
        &self,
        prompt: &Prompt,
        images: &PromptImages<'_>,
        temperature: f32,
    ) -> Result<String>;
}

/// 問い合わせオプション
#[derive(Debug, Clone, Copy)]
pub struct QueryOptions {
    /// 初回の温度
    pub temperature: f32,
    /// 初回以降の最大リトライ回数
    pub max_retries: u32,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            max_retries: 3,
        }
    }
}

/// 試行回ごとの温度（0.1ずつ上げる）
pub fn attempt_temperature(base: f32, attempt: u32) -> f32 {
    (base + attempt as f32 * TEMPERATURE_STEP).min(MAX_TEMPERATURE)
}

/// 1画像・1戦略の問い合わせ
///
/// # Arguments
/// * `model` - 送信先モデル
/// * `strategy` - プロンプト戦略
/// * `images` - 対象画像と few-shot 例示
/// * `options` - 温度とリトライ回数
///
/// # Returns
/// 応答。最後の試行まで失敗した場合は全項目 None（バッチは止めない）
pub async fn query_emotion(
    model: &dyn VisionModel,
    strategy: PromptStrategy,
    images: &PromptImages<'_>,
    options: &QueryOptions,
) -> ModelResponse {
    let prompt = build_prompt(model.vendor(), strategy);

    let request_json = match model.describe_request(&prompt) {
        Ok(json) => {
            debug!(model = model.model_name(), strategy = %strategy, request = %json, "リクエスト");
            Some(json)
        }
        Err(e) => {
            warn!(model = model.model_name(), error = %e, "リクエストJSONの生成に失敗");
            None
        }
    };

    for attempt in 0..=options.max_retries {
        let temperature = attempt_temperature(options.temperature, attempt);
        let is_last = attempt == options.max_retries;

        match model.complete(&prompt, images, temperature).await {
            Ok(answer) => {
                let answer = answer.trim();
                if !is_last && is_refusal(answer) {
                    warn!(
                        model = model.model_name(),
                        strategy = %strategy,
                        attempt = attempt + 1,
                        max_retries = options.max_retries,
                        answer,
                        "拒否応答を検出、再試行します"
                    );
                    continue;
                }
                return ModelResponse::from_answer(answer, strategy, request_json);
            }
            Err(e) => {
                warn!(
                    model = model.model_name(),
                    strategy = %strategy,
                    attempt = attempt + 1,
                    error = %e,
                    "API呼び出し失敗"
                );
                if !is_last {
                    continue;
                }
            }
        }
    }

    ModelResponse::failed()
}
