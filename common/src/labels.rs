//! 感情ラベル定義
//!
//! 9クラスのアラビア語感情ラベル（正規ラベル集合）。
//! 宣言順はプロンプトの選択肢表示と正規化の前方一致判定の両方で使われるため、
//! 並べ替えてはならない。

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// 感情カテゴリ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Emotion {
    Joy,
    Trust,
    Fear,
    Surprise,
    Sadness,
    Disgust,
    Anger,
    Anticipation,
    Neutral,
}

/// 正規ラベル（宣言順）
pub const CANONICAL_LABELS: [&str; 9] = [
    "سعادة",
    "ثقة",
    "خوف",
    "مفاجأة",
    "حزن",
    "قرف",
    "غضب",
    "ترقب",
    "محايد",
];

impl Emotion {
    /// 全カテゴリ（CANONICAL_LABELSと同じ順序）
    pub const ALL: [Emotion; 9] = [
        Emotion::Joy,
        Emotion::Trust,
        Emotion::Fear,
        Emotion::Surprise,
        Emotion::Sadness,
        Emotion::Disgust,
        Emotion::Anger,
        Emotion::Anticipation,
        Emotion::Neutral,
    ];

    fn index(self) -> usize {
        self as usize
    }

    /// アラビア語の正規ラベル
    pub fn arabic(self) -> &'static str {
        CANONICAL_LABELS[self.index()]
    }

    /// 英語名
    pub fn english(self) -> &'static str {
        match self {
            Emotion::Joy => "joy",
            Emotion::Trust => "trust",
            Emotion::Fear => "fear",
            Emotion::Surprise => "surprise",
            Emotion::Sadness => "sadness",
            Emotion::Disgust => "disgust",
            Emotion::Anger => "anger",
            Emotion::Anticipation => "anticipation",
            Emotion::Neutral => "neutral",
        }
    }

    /// 正規ラベル文字列と完全一致するカテゴリを返す
    pub fn from_arabic(label: &str) -> Option<Emotion> {
        Emotion::ALL.into_iter().find(|e| e.arabic() == label)
    }
}

impl std::fmt::Display for Emotion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.arabic())
    }
}

impl std::str::FromStr for Emotion {
    type Err = Error;

    /// 英語名またはアラビア語ラベルを受け付ける
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if let Some(emotion) = Emotion::from_arabic(trimmed) {
            return Ok(emotion);
        }
        let lower = trimmed.to_lowercase();
        Emotion::ALL
            .into_iter()
            .find(|e| e.english() == lower)
            .ok_or_else(|| Error::UnknownEmotion(s.to_string()))
    }
}

/// 選択肢表示用のラベル一覧（「، 」区切り）
pub fn label_choices() -> String {
    CANONICAL_LABELS.join("، ")
}

/// 正規ラベル集合に含まれるか
pub fn is_canonical(label: &str) -> bool {
    CANONICAL_LABELS.contains(&label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_matches_label_order() {
        for (emotion, label) in Emotion::ALL.iter().zip(CANONICAL_LABELS.iter()) {
            assert_eq!(emotion.arabic(), *label);
        }
    }

    #[test]
    fn test_from_str() {
        assert_eq!("joy".parse::<Emotion>().unwrap(), Emotion::Joy);
        assert_eq!("Neutral".parse::<Emotion>().unwrap(), Emotion::Neutral);
        assert_eq!("قرف".parse::<Emotion>().unwrap(), Emotion::Disgust);
        assert!("boredom".parse::<Emotion>().is_err());
    }

    #[test]
    fn test_label_choices() {
        assert_eq!(
            label_choices(),
            "سعادة، ثقة، خوف، مفاجأة، حزن، قرف، غضب، ترقب، محايد"
        );
    }

    #[test]
    fn test_two_char_prefixes_are_distinct() {
        let prefixes: std::collections::HashSet<String> = CANONICAL_LABELS
            .iter()
            .map(|l| l.chars().take(2).collect())
            .collect();
        assert_eq!(prefixes.len(), CANONICAL_LABELS.len());
    }

    #[test]
    fn test_is_canonical() {
        assert!(is_canonical("حزن"));
        assert!(!is_canonical("حزين"));
    }
}
