//! ログ初期化
//!
//! `tracing` を使用。`EMOTION_EVAL_LOG` 環境変数があればそのフィルタを優先する。
//!
//! ```bash
//! EMOTION_EVAL_LOG=emotion_eval=debug emotion-eval run
//! ```

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// フィルタを上書きする環境変数
pub const LOG_ENV: &str = "EMOTION_EVAL_LOG";

/// 既定のフィルタ文字列
pub fn default_filter(verbose: bool) -> String {
    let level = if verbose { "debug" } else { "info" };
    format!("emotion_eval={}", level)
}

/// ログを初期化する（起動時に1回だけ呼ぶ）
///
/// `verbose` の場合はリクエストJSON（画像は伏せ字）も出力される。
pub fn init_logging(verbose: bool) {
    let env_filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    let result = tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(env_filter)
        .try_init();

    if result.is_ok() {
        tracing::debug!(verbose, "ログを初期化");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter() {
        assert_eq!(default_filter(false), "emotion_eval=info");
        assert_eq!(default_filter(true), "emotion_eval=debug");
    }

    #[test]
    fn test_init_twice_does_not_panic() {
        init_logging(false);
        init_logging(true);
    }
}
