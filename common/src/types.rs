//! 解析結果の型定義
//!
//! - ModelResponse: 1回のモデル呼び出しの結果
//! - StrategyOutcome: 生ラベルと正規化ラベルの組
//! - ModelColumns / ReportRow: レポート1行分

use crate::normalizer::match_emotion;
use crate::parser::split_answer;
use crate::prompts::{ModelVendor, PromptStrategy};
use serde::{Deserialize, Serialize};

/// モデル呼び出しの結果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModelResponse {
    /// ラベル（呼び出し失敗時は None）
    pub label: Option<String>,
    /// chain-of-thought の推論部分
    pub reasoning: Option<String>,
    /// 監査用リクエストJSON（画像データは伏せ字）
    pub request_json: Option<String>,
}

impl ModelResponse {
    /// リトライを使い切った失敗
    pub fn failed() -> Self {
        Self::default()
    }

    /// 応答テキストから生成
    pub fn from_answer(answer: &str, strategy: PromptStrategy, request_json: Option<String>) -> Self {
        let (label, reasoning) = split_answer(answer, strategy);
        Self {
            label: Some(label),
            reasoning,
            request_json,
        }
    }
}

/// 1戦略分の結果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StrategyOutcome {
    /// モデルの生ラベル
    pub raw_label: Option<String>,
    /// 正規化ラベル
    pub label: Option<String>,
    pub reasoning: Option<String>,
    /// 正規ラベルに一致したか
    pub canonical: bool,
}

impl StrategyOutcome {
    /// 応答を正規化して結果にする
    pub fn from_response(response: &ModelResponse) -> Self {
        let matched = response.label.as_deref().map(match_emotion);
        Self {
            raw_label: response.label.clone(),
            canonical: matched.as_ref().is_some_and(|m| m.is_canonical()),
            label: matched.map(|m| m.into_label()),
            reasoning: response.reasoning.clone(),
        }
    }

    /// 正規化で値が変わったか
    pub fn was_normalized(&self) -> bool {
        self.label != self.raw_label
    }

    /// ラベルはあるが正規ラベルに一致しなかった
    pub fn is_unmatched(&self) -> bool {
        self.label.is_some() && !self.canonical
    }
}

/// 1モデル分の列
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModelColumns {
    pub zero_shot: StrategyOutcome,
    pub few_shot: StrategyOutcome,
    pub chain_of_thought: StrategyOutcome,
}

impl ModelColumns {
    pub fn get(&self, strategy: PromptStrategy) -> &StrategyOutcome {
        match strategy {
            PromptStrategy::ZeroShot => &self.zero_shot,
            PromptStrategy::FewShot => &self.few_shot,
            PromptStrategy::ChainOfThought => &self.chain_of_thought,
        }
    }

    pub fn get_mut(&mut self, strategy: PromptStrategy) -> &mut StrategyOutcome {
        match strategy {
            PromptStrategy::ZeroShot => &mut self.zero_shot,
            PromptStrategy::FewShot => &mut self.few_shot,
            PromptStrategy::ChainOfThought => &mut self.chain_of_thought,
        }
    }
}

/// レポート1行（画像1枚）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportRow {
    pub image_name: String,
    pub openai: ModelColumns,
    pub gemini: ModelColumns,
    /// 処理開始時刻（%Y-%m-%d %H:%M:%S）
    pub timestamp: String,
}

impl ReportRow {
    pub fn new(image_name: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            image_name: image_name.into(),
            timestamp: timestamp.into(),
            ..Default::default()
        }
    }

    pub fn columns(&self, vendor: ModelVendor) -> &ModelColumns {
        match vendor {
            ModelVendor::OpenAi => &self.openai,
            ModelVendor::Gemini => &self.gemini,
        }
    }

    pub fn columns_mut(&mut self, vendor: ModelVendor) -> &mut ModelColumns {
        match vendor {
            ModelVendor::OpenAi => &mut self.openai,
            ModelVendor::Gemini => &mut self.gemini,
        }
    }

    /// 正規ラベルに一致しなかった結果の数
    pub fn unmatched_count(&self) -> usize {
        [&self.openai, &self.gemini]
            .iter()
            .flat_map(|cols| PromptStrategy::ALL.into_iter().map(move |s| cols.get(s)))
            .filter(|outcome| outcome.is_unmatched())
            .count()
    }
}
