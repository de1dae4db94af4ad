//! 感情ラベル正規化
//!
//! モデルが返した自由テキストを9つの正規ラベルのいずれかに寄せる。
//!
//! ## 処理フロー
//! 1. 記号除去（文字・数字・`_`・空白以外を削除。結合記号やゼロ幅文字もここで落ちる）
//! 2. アリフ統一（أ إ آ → ا）
//! 3. タシュキール（母音記号 U+064B–U+065F, U+0670）除去
//! 4. 同義語テーブル照合
//! 5. 正規ラベル完全一致
//! 6. 先頭2文字の前方一致（宣言順で最初のラベル）
//! 7. 一致なし → 1〜3の結果をそのまま返す
//!
//! 失敗はしない。入力が `None` なら `None` を返す。

use crate::labels::{Emotion, CANONICAL_LABELS};
use regex::Regex;
use std::collections::HashMap;

/// 前方一致で比較する文字数
const PREFIX_LEN: usize = 2;

/// 同義語テーブル（キーは正規化済み）
pub const SYNONYM_TABLE: &[(&str, Emotion)] = &[
    // سعادة
    ("سعاده", Emotion::Joy),
    ("فرح", Emotion::Joy),
    ("فرحة", Emotion::Joy),
    ("سرور", Emotion::Joy),
    ("بهجة", Emotion::Joy),
    // ثقة
    ("ثقه", Emotion::Trust),
    ("امان", Emotion::Trust),
    ("اطمئنان", Emotion::Trust),
    // خوف
    ("رعب", Emotion::Fear),
    ("فزع", Emotion::Fear),
    ("خشية", Emotion::Fear),
    // مفاجأة
    ("مفاجاة", Emotion::Surprise),
    ("دهشة", Emotion::Surprise),
    ("ذهول", Emotion::Surprise),
    // حزن
    ("اسى", Emotion::Sadness),
    ("كابة", Emotion::Sadness),
    ("كآبة", Emotion::Sadness),
    ("حسرة", Emotion::Sadness),
    // قرف
    ("اشمئزاز", Emotion::Disgust),
    ("استياء", Emotion::Disgust),
    // غضب
    ("سخط", Emotion::Anger),
    ("غيظ", Emotion::Anger),
    // ترقب
    ("انتظار", Emotion::Anticipation),
    ("توقع", Emotion::Anticipation),
    // محايد
    ("حيادي", Emotion::Neutral),
    ("محايدة", Emotion::Neutral),
];

lazy_static::lazy_static! {
    static ref SYNONYMS: HashMap<&'static str, Emotion> =
        SYNONYM_TABLE.iter().copied().collect();
    static ref NON_WORD_RE: Regex = Regex::new(r"[^\p{L}\p{N}_\s]").unwrap();
    static ref WHITESPACE_RE: Regex = Regex::new(r"\s+").unwrap();
    static ref TASHKEEL_RE: Regex = Regex::new(r"[\x{064B}-\x{065F}\x{0670}]").unwrap();
}

/// 照合結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelMatch {
    /// 同義語テーブルで一致
    Synonym(Emotion),
    /// 正規ラベルと完全一致
    Exact(Emotion),
    /// 先頭2文字で一致
    Prefix(Emotion),
    /// 一致なし（クリーニング済み文字列）
    Unmatched(String),
}

impl LabelMatch {
    /// 一致したカテゴリ
    pub fn emotion(&self) -> Option<Emotion> {
        match self {
            LabelMatch::Synonym(e) | LabelMatch::Exact(e) | LabelMatch::Prefix(e) => Some(*e),
            LabelMatch::Unmatched(_) => None,
        }
    }

    pub fn is_canonical(&self) -> bool {
        self.emotion().is_some()
    }

    /// 出力ラベル文字列
    pub fn into_label(self) -> String {
        match self {
            LabelMatch::Unmatched(cleaned) => cleaned,
            matched => matched
                .emotion()
                .map(|e| e.arabic().to_string())
                .unwrap_or_default(),
        }
    }

    /// 照合方法の名前（表示用）
    pub fn kind(&self) -> &'static str {
        match self {
            LabelMatch::Synonym(_) => "synonym",
            LabelMatch::Exact(_) => "exact",
            LabelMatch::Prefix(_) => "prefix",
            LabelMatch::Unmatched(_) => "unmatched",
        }
    }
}

/// 記号・アリフ・母音記号を整えた比較用文字列を返す
///
/// `\w` は結合記号（Mn/Mc/Me）と ZWNJ/ZWJ を含むため使わず、
/// 文字（L）・数字（N）・`_` だけを残す。空白の圧縮は最後に行う。
pub fn clean_label(text: &str) -> String {
    let stripped = NON_WORD_RE.replace_all(text, "");
    let unified = unify_alef(&stripped);
    let bare = TASHKEEL_RE.replace_all(&unified, "");
    WHITESPACE_RE.replace_all(&bare, " ").trim().to_string()
}

fn unify_alef(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            'أ' | 'إ' | 'آ' => 'ا',
            other => other,
        })
        .collect()
}

/// テキストを正規ラベルと照合する
pub fn match_emotion(text: &str) -> LabelMatch {
    let cleaned = clean_label(text);

    if let Some(&emotion) = SYNONYMS.get(cleaned.as_str()) {
        return LabelMatch::Synonym(emotion);
    }

    if let Some(emotion) = Emotion::from_arabic(&cleaned) {
        return LabelMatch::Exact(emotion);
    }

    for (emotion, label) in Emotion::ALL.iter().zip(CANONICAL_LABELS.iter()) {
        let prefix: String = label.chars().take(PREFIX_LEN).collect();
        if cleaned.starts_with(&prefix) {
            return LabelMatch::Prefix(*emotion);
        }
    }

    LabelMatch::Unmatched(cleaned)
}

/// ラベルを正規化する
///
/// # Arguments
/// * `text` - モデルの生出力（API失敗時は `None`）
///
/// # Returns
/// 正規ラベル、または一致しなかった場合はクリーニング済み文字列
pub fn normalize_emotion(text: Option<&str>) -> Option<String> {
    text.map(|t| match_emotion(t).into_label())
}
