//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown emotion: {0}")]
    UnknownEmotion(String),

    #[error("Unknown prompt strategy: {0}. Use zero_shot, few_shot, or chain_of_thought")]
    UnknownStrategy(String),

    #[error("Few-shot example #{0} is missing")]
    MissingFewShotExample(usize),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_json() {
        let json_error = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let error = Error::Json(json_error);
        assert!(format!("{}", error).contains("JSON error"));
    }

    #[test]
    fn test_error_display_unknown_emotion() {
        let error = Error::UnknownEmotion("boredom".to_string());
        assert_eq!(format!("{}", error), "Unknown emotion: boredom");
    }

    #[test]
    fn test_error_display_missing_example() {
        let error = Error::MissingFewShotExample(2);
        assert_eq!(format!("{}", error), "Few-shot example #2 is missing");
    }

    #[test]
    fn test_error_from_json() {
        let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error: Error = json_error.into();
        assert!(matches!(error, Error::Json(_)));
    }

    #[test]
    fn test_error_debug() {
        let error = Error::UnknownStrategy("cot2".to_string());
        let debug = format!("{:?}", error);
        assert!(debug.contains("UnknownStrategy"));
        assert!(debug.contains("cot2"));
    }
}
