//! モデル応答パーサー
//!
//! - 拒否応答の判定
//! - chain-of-thought 応答を理由とラベルに分割

use crate::prompts::{PromptStrategy, ANSWER_MARKER};

/// 拒否応答によく現れる表現
pub const REFUSAL_PATTERNS: &[&str] = &[
    "آسف",
    "عذرا",
    "لا أستطيع",
    "لا يمكنني",
    "عفوا",
    "تحليل الصور",
    "وصف الصور",
    "التعرف على",
    "الأشخاص",
    "غير قادر",
    "المساعدة",
];

/// 拒否と判定する一致数の下限
const REFUSAL_THRESHOLD: usize = 2;

/// 応答が拒否メッセージかどうか
///
/// 2パターン以上の一致で拒否とみなす。
pub fn is_refusal(text: &str) -> bool {
    REFUSAL_PATTERNS
        .iter()
        .filter(|pattern| text.contains(*pattern))
        .count()
        >= REFUSAL_THRESHOLD
}

/// 応答をラベルと理由に分割する
///
/// # Arguments
/// * `answer` - モデルの応答（前後空白は除去される）
/// * `strategy` - 使用したプロンプト戦略
///
/// # Returns
/// (ラベル, 理由)。chain-of-thought 以外、またはマーカーがない場合は理由なし
pub fn split_answer(answer: &str, strategy: PromptStrategy) -> (String, Option<String>) {
    let answer = answer.trim();
    if strategy != PromptStrategy::ChainOfThought {
        return (answer.to_string(), None);
    }

    match answer.rsplit_once(ANSWER_MARKER) {
        Some((reasoning, label)) => (
            label.trim().to_string(),
            Some(reasoning.trim().to_string()),
        ),
        None => (answer.to_string(), None),
    }
}
