//! プロンプト生成モジュール
//!
//! 3種類のプロンプト戦略（zero-shot / few-shot / chain-of-thought）を
//! ベンダー非依存の部品列として組み立てる:
//! - PromptStrategy: 戦略の種類
//! - ModelVendor: 送信先ベンダー（部品の並べ方が異なる）
//! - build_prompt: テキストと画像スロットの列を生成
//!
//! 選択肢の一覧は常に `CANONICAL_LABELS` から描画する。

use crate::error::{Error, Result};
use crate::labels::{label_choices, Emotion};
use serde::{Deserialize, Serialize};

/// システムプロンプト
pub const SYSTEM_PROMPT: &str = "أنت خبير في علم النفس العاطفي للأطفال.";

/// chain-of-thought の最終回答行の接頭辞
pub const ANSWER_MARKER: &str = "الشعور:";

/// プロンプト戦略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptStrategy {
    ZeroShot,
    FewShot,
    ChainOfThought,
}

impl PromptStrategy {
    /// 実行順
    pub const ALL: [PromptStrategy; 3] = [
        PromptStrategy::ZeroShot,
        PromptStrategy::FewShot,
        PromptStrategy::ChainOfThought,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PromptStrategy::ZeroShot => "zero_shot",
            PromptStrategy::FewShot => "few_shot",
            PromptStrategy::ChainOfThought => "chain_of_thought",
        }
    }

    /// レポート列名の接尾辞
    pub fn column_suffix(&self) -> &'static str {
        match self {
            PromptStrategy::ZeroShot => "zero_shot",
            PromptStrategy::FewShot => "few_shot",
            PromptStrategy::ChainOfThought => "cot",
        }
    }
}

impl std::fmt::Display for PromptStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PromptStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "zero_shot" | "zero-shot" | "zero" => Ok(PromptStrategy::ZeroShot),
            "few_shot" | "few-shot" | "few" => Ok(PromptStrategy::FewShot),
            "chain_of_thought" | "chain-of-thought" | "cot" => Ok(PromptStrategy::ChainOfThought),
            _ => Err(Error::UnknownStrategy(s.to_string())),
        }
    }
}

/// 送信先ベンダー
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelVendor {
    OpenAi,
    Gemini,
}

impl ModelVendor {
    /// レポート列名の接頭辞（ヘッダーは固定）
    pub fn column_prefix(&self) -> &'static str {
        match self {
            ModelVendor::OpenAi => "gpt4o",
            ModelVendor::Gemini => "gemini",
        }
    }
}

impl std::fmt::Display for ModelVendor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelVendor::OpenAi => write!(f, "OpenAI"),
            ModelVendor::Gemini => write!(f, "Gemini"),
        }
    }
}

/// few-shot 例示画像の定義
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FewShotSpec {
    /// ファイル名の先頭（拡張子は問わない）
    pub basename: &'static str,
    /// 正解ラベル
    pub emotion: Emotion,
}

/// few-shot 例示（この順でプロンプトに並ぶ）
pub const FEW_SHOT_EXAMPLES: [FewShotSpec; 3] = [
    FewShotSpec { basename: "sadness", emotion: Emotion::Sadness },
    FewShotSpec { basename: "surprise", emotion: Emotion::Surprise },
    FewShotSpec { basename: "disgust", emotion: Emotion::Disgust },
];

/// プロンプト内の画像スロット
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageRef {
    /// 解析対象の画像
    Target,
    /// few-shot 例示画像（FEW_SHOT_EXAMPLES のインデックス）
    Example(usize),
}

/// プロンプトの部品
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptPart {
    Text(String),
    Image(ImageRef),
}

/// 組み立て済みプロンプト
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    /// システム指示（ベンダーが対応していない場合は None）
    pub system: Option<String>,
    pub parts: Vec<PromptPart>,
}

impl Prompt {
    /// 画像スロット数
    pub fn image_count(&self) -> usize {
        self.parts
            .iter()
            .filter(|p| matches!(p, PromptPart::Image(_)))
            .count()
    }

    /// 参照している few-shot 例示の最大インデックスを検証
    pub fn check_examples(&self, available: usize) -> Result<()> {
        for part in &self.parts {
            if let PromptPart::Image(ImageRef::Example(idx)) = part {
                if *idx >= available {
                    return Err(Error::MissingFewShotExample(*idx));
                }
            }
        }
        Ok(())
    }
}

const ZERO_SHOT_INTRO: &str = "انظر إلى الصورة التالية ثم أجب عن السؤال.";
const COT_INTRO: &str = "انظر إلى هذه الصورة ثم أجب عن المطلوب.";
const SHORT_QUESTION: &str = "السؤال: ما الشعور الأساسي؟";

fn zero_shot_question() -> String {
    format!(
        "السؤال: ما هو الشعور الأساسي الظاهر في هذا المشهد؟\n\
         اختر كلمة واحدة فقط من القائمة التالية :\n\
         {}.\n\
         أجب بالكلمة المختارة فقط دون أي شرح إضافي.",
        label_choices()
    )
}

fn cot_steps() -> String {
    format!(
        "الخطوات:\n\
         ١( فكِّر خطوة بخطوة: صف بإيجاز تعابير الوجه أو لغة الجسد والعناصر السياقية التي تدل على الشعور )سطرين على الأكثر(.\n\
         ٢( استنتج الشعور الأساسي الظاهر باستخدام كلمة واحدة فقط من القائمة:\n\
         {}.\n\
         ٣( اطبع الإجابة النهائية في سطر منفصل بصيغة:\n\
         {} >الكلمة<\n\
         ابدأ الآن.",
        label_choices(),
        ANSWER_MARKER
    )
}

/// 数字をアラビア・インド数字に変換
fn arabic_indic(n: usize) -> String {
    n.to_string()
        .chars()
        .map(|c| match c.to_digit(10) {
            Some(d) => char::from_u32(0x0660 + d).unwrap_or(c),
            None => c,
        })
        .collect()
}

/// few-shot 部品列（両ベンダー共通）
///
/// 例示 → 画像 → 回答 → 次の例示、の順に明示的に並べ、最後に対象画像と質問を置く。
fn few_shot_parts() -> Vec<PromptPart> {
    let mut parts = Vec::new();
    let mut previous: Option<Emotion> = None;

    for (idx, example) in FEW_SHOT_EXAMPLES.iter().enumerate() {
        let heading = format!("مثال {}", arabic_indic(idx + 1));
        let text = match previous {
            None => format!("أمثلة توضيحية:\n{}", heading),
            Some(answer) => format!("{}\nالإجابة: {}\n{}", SHORT_QUESTION, answer.arabic(), heading),
        };
        parts.push(PromptPart::Text(text));
        parts.push(PromptPart::Image(ImageRef::Example(idx)));
        previous = Some(example.emotion);
    }

    let last_answer = previous.map(|e| e.arabic()).unwrap_or_default();
    parts.push(PromptPart::Text(format!(
        "{}\nالإجابة: {}\nالآن حلل الصورة الجديدة وأجب بالشعور الأساسي بكلمة واحدة فقط.",
        SHORT_QUESTION, last_answer
    )));
    parts.push(PromptPart::Image(ImageRef::Target));
    parts.push(PromptPart::Text(format!(
        "{}\nاختر من: {}.",
        SHORT_QUESTION,
        label_choices()
    )));
    parts
}

/// プロンプトを組み立てる
///
/// # Arguments
/// * `vendor` - 送信先ベンダー
/// * `strategy` - プロンプト戦略
///
/// # Returns
/// システム指示と部品列
///
/// OpenAI はシステムロールを持つため指示を分離し、画像を導入文と質問の間に置く。
/// Gemini は指示を先頭テキストに結合し、画像を最後に置く（few-shot は指示なし）。
pub fn build_prompt(vendor: ModelVendor, strategy: PromptStrategy) -> Prompt {
    match (vendor, strategy) {
        (ModelVendor::OpenAi, PromptStrategy::ZeroShot) => Prompt {
            system: Some(SYSTEM_PROMPT.to_string()),
            parts: vec![
                PromptPart::Text(ZERO_SHOT_INTRO.to_string()),
                PromptPart::Image(ImageRef::Target),
                PromptPart::Text(zero_shot_question()),
            ],
        },
        (ModelVendor::OpenAi, PromptStrategy::FewShot) => Prompt {
            system: Some(SYSTEM_PROMPT.to_string()),
            parts: few_shot_parts(),
        },
        (ModelVendor::OpenAi, PromptStrategy::ChainOfThought) => Prompt {
            system: Some(SYSTEM_PROMPT.to_string()),
            parts: vec![
                PromptPart::Text(COT_INTRO.to_string()),
                PromptPart::Image(ImageRef::Target),
                PromptPart::Text(cot_steps()),
            ],
        },
        (ModelVendor::Gemini, PromptStrategy::ZeroShot) => Prompt {
            system: Some(SYSTEM_PROMPT.to_string()),
            parts: vec![
                PromptPart::Text(format!("{}\n{}", ZERO_SHOT_INTRO, zero_shot_question())),
                PromptPart::Image(ImageRef::Target),
            ],
        },
        (ModelVendor::Gemini, PromptStrategy::FewShot) => Prompt {
            system: None,
            parts: few_shot_parts(),
        },
        (ModelVendor::Gemini, PromptStrategy::ChainOfThought) => Prompt {
            system: Some(SYSTEM_PROMPT.to_string()),
            parts: vec![
                PromptPart::Text(format!("{}\n{}", COT_INTRO, cot_steps())),
                PromptPart::Image(ImageRef::Target),
            ],
        },
    }
}
