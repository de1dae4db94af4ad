//! Emotion Eval Common Library
//!
//! CLIとテストで共有される型とユーティリティ

pub mod error;
pub mod labels;
pub mod normalizer;
pub mod parser;
pub mod prompts;
pub mod types;

pub use error::{Error, Result};
pub use labels::{is_canonical, label_choices, Emotion, CANONICAL_LABELS};
pub use normalizer::{clean_label, match_emotion, normalize_emotion, LabelMatch, SYNONYM_TABLE};
pub use parser::{is_refusal, split_answer};
pub use prompts::{
    build_prompt, FewShotSpec, ImageRef, ModelVendor, Prompt, PromptPart, PromptStrategy,
    FEW_SHOT_EXAMPLES, SYSTEM_PROMPT,
};
pub use types::{ModelColumns, ModelResponse, ReportRow, StrategyOutcome};
