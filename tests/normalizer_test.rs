//! ラベル正規化の性質テスト
//!
//! 正規ラベルへの寄せ方が表記揺れ（母音記号・その他の結合記号・ゼロ幅文字・アリフ・記号・空白）に
//! 左右されないことを確認する。

use emotion_eval_common::{
    clean_label, is_canonical, match_emotion, normalize_emotion, Emotion, LabelMatch,
    CANONICAL_LABELS, SYNONYM_TABLE,
};

const SAMPLE_INPUTS: &[&str] = &[
    "سعادة",
    "فرح",
    "غضبان",
    "مفاجاة",
    "خوف شديد",
    "لا أعرف",
    "Hello",
    "حزين جدا",
    "",
];

/// 母音記号（ファトハ・ダンマ・カスラ・スクーン・シャッダ・タンウィーン）
const TASHKEEL: &[char] = &['\u{064E}', '\u{064F}', '\u{0650}', '\u{0652}', '\u{0651}', '\u{064B}'];

/// 母音記号の範囲外にある結合記号（アラビア記号・クルアーン記号・ラテン結合アクセント）
const OTHER_MARKS: &[char] = &[
    '\u{0610}', '\u{0615}', '\u{061A}', '\u{06D6}', '\u{06E1}', '\u{06ED}', '\u{0301}',
];

/// ゼロ幅文字
const ZERO_WIDTH: &[char] = &['\u{200C}', '\u{200D}'];

fn sprinkle_tashkeel(text: &str) -> String {
    sprinkle(text, TASHKEEL)
}

fn sprinkle(text: &str, marks: &[char]) -> String {
    text.chars()
        .enumerate()
        .flat_map(|(i, c)| {
            let mark = marks[i % marks.len()];
            if c.is_whitespace() {
                vec![c]
            } else {
                vec![c, mark]
            }
        })
        .collect()
}

fn norm(text: &str) -> String {
    normalize_emotion(Some(text)).unwrap_or_default()
}

#[test]
fn canonical_labels_are_fixpoints() {
    for label in CANONICAL_LABELS {
        assert_eq!(norm(label), label);
        assert!(is_canonical(&norm(label)));
    }
}

#[test]
fn normalization_is_idempotent_for_matched_labels() {
    for input in SAMPLE_INPUTS.iter().chain(SYNONYM_TABLE.iter().map(|(s, _)| s)) {
        let once = match_emotion(input);
        if once.is_canonical() {
            let label = once.into_label();
            assert_eq!(norm(&label), label, "input: {}", input);
        }
    }
}

#[test]
fn diacritics_do_not_change_result() {
    for input in SAMPLE_INPUTS {
        assert_eq!(
            norm(&sprinkle_tashkeel(input)),
            norm(input),
            "input: {}",
            input
        );
    }
}

#[test]
fn other_combining_marks_do_not_change_result() {
    for input in SAMPLE_INPUTS {
        assert_eq!(norm(&sprinkle(input, OTHER_MARKS)), norm(input), "input: {}", input);
    }
}

#[test]
fn zero_width_characters_do_not_change_result() {
    for input in SAMPLE_INPUTS {
        assert_eq!(norm(&sprinkle(input, ZERO_WIDTH)), norm(input), "input: {}", input);
    }
}

#[test]
fn marks_on_synonyms_still_match() {
    assert_eq!(norm("فرح\u{06E1}"), "سعادة");
    assert_eq!(norm("رعب\u{200C}"), "خوف");
    assert_eq!(norm("سخط\u{0610}"), "غضب");
    assert_eq!(norm("abc\u{0301}"), "abc");
}

#[test]
fn alef_variants_do_not_change_result() {
    for input in SAMPLE_INPUTS {
        for variant in ['أ', 'إ', 'آ'] {
            let replaced = input.replace('ا', &variant.to_string());
            assert_eq!(norm(&replaced), norm(input), "input: {} / {}", input, variant);
        }
    }
}

#[test]
fn punctuation_and_spacing_do_not_change_result() {
    for input in SAMPLE_INPUTS {
        let noisy = format!("  «{}»!؟ . ", input.replace(' ', "   "));
        assert_eq!(norm(&noisy), norm(input), "input: {}", input);
    }
}

#[test]
fn synonyms_map_to_their_category() {
    for (variant, emotion) in SYNONYM_TABLE {
        let matched = match_emotion(variant);
        assert_eq!(matched.emotion(), Some(*emotion), "variant: {}", variant);
    }
}

#[test]
fn every_category_reachable_by_label() {
    for emotion in Emotion::ALL {
        assert_eq!(match_emotion(emotion.arabic()).emotion(), Some(emotion));
    }
}

#[test]
fn prefix_match_uses_declaration_order() {
    // "حز" は حزن のみに一致
    assert_eq!(match_emotion("حزين"), LabelMatch::Prefix(Emotion::Sadness));
    assert_eq!(match_emotion("ترقّب"), LabelMatch::Exact(Emotion::Anticipation));
    assert_eq!(match_emotion("محايدون"), LabelMatch::Prefix(Emotion::Neutral));
}

#[test]
fn unmatched_text_is_cleaned_not_dropped() {
    assert_eq!(norm("I cannot tell."), "I cannot tell");
    assert_eq!(clean_label("  إِنْسَان  "), "انسان");
    assert!(!match_emotion("انسان").is_canonical());
}

#[test]
fn none_stays_none() {
    assert_eq!(normalize_emotion(None), None);
}
