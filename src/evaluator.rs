//! 評価オーケストレーション
//!
//! 画像1枚ごとに、モデル順（OpenAI → Gemini）× 戦略順（zero-shot → few-shot → CoT）で
//! 問い合わせ、正規化した結果をレポート行にまとめる。

use crate::analyzer::{query_emotion, PromptImages, QueryOptions, VisionModel};
use crate::scanner::{FewShotExample, LoadedImage};
use chrono::Local;
use emotion_eval_common::{ModelVendor, PromptStrategy, ReportRow, StrategyOutcome};
use std::time::Duration;
use tracing::warn;

/// タイムスタンプ形式
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 1回の問い合わせが終わるたびに通知される内容
#[derive(Debug)]
pub struct QueryEvent<'a> {
    pub image_name: &'a str,
    pub vendor: ModelVendor,
    pub model_name: &'a str,
    pub strategy: PromptStrategy,
    pub outcome: &'a StrategyOutcome,
}

/// モデルをレポート列の順（OpenAI → Gemini）に並べ替える
pub fn sort_models(models: &mut [Box<dyn VisionModel>]) {
    models.sort_by_key(|m| match m.vendor() {
        ModelVendor::OpenAi => 0,
        ModelVendor::Gemini => 1,
    });
}

/// 画像1枚を評価する
///
/// # Arguments
/// * `models` - 問い合わせるモデル（この順で実行）
/// * `image` - 対象画像
/// * `examples` - few-shot 例示
/// * `options` - 温度とリトライ回数
/// * `on_query` - 問い合わせごとの通知（コンソール表示用）
///
/// # Returns
/// レポート行。使われなかったモデルの列は空のまま
pub async fn evaluate_image<F>(
    models: &[Box<dyn VisionModel>],
    image: &LoadedImage,
    examples: &[FewShotExample],
    options: &QueryOptions,
    mut on_query: F,
) -> ReportRow
where
    F: FnMut(&QueryEvent<'_>),
{
    let image_name = image.info.file_name.as_str();
    let mut row = ReportRow::new(image_name, Local::now().format(TIMESTAMP_FORMAT).to_string());
    let images = PromptImages::new(&image.image, examples);

    for model in models {
        for strategy in PromptStrategy::ALL {
            let response = query_emotion(model.as_ref(), strategy, &images, options).await;
            let outcome = StrategyOutcome::from_response(&response);

            if outcome.is_unmatched() {
                warn!(
                    image = image_name,
                    model = model.model_name(),
                    strategy = %strategy,
                    raw = outcome.raw_label.as_deref().unwrap_or_default(),
                    "正規ラベルに一致しない回答"
                );
            }

            on_query(&QueryEvent {
                image_name,
                vendor: model.vendor(),
                model_name: model.model_name(),
                strategy,
                outcome: &outcome,
            });

            *row.columns_mut(model.vendor()).get_mut(strategy) = outcome;
        }
    }

    row
}

/// 経過時間を HH:MM:SS に整形
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

/// 平均処理時間から残り時間を見積もる
pub fn estimate_remaining(elapsed: Duration, done: usize, total: usize) -> Duration {
    if done == 0 || done >= total {
        return Duration::ZERO;
    }
    elapsed * (total - done) as u32 / done as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(0)), "00:00:00");
        assert_eq!(format_duration(Duration::from_secs(59)), "00:00:59");
        assert_eq!(format_duration(Duration::from_secs(3661)), "01:01:01");
        assert_eq!(format_duration(Duration::from_millis(90_900)), "00:01:30");
    }

    #[test]
    fn test_estimate_remaining() {
        assert_eq!(estimate_remaining(Duration::from_secs(30), 3, 10), Duration::from_secs(70));
        assert_eq!(estimate_remaining(Duration::from_secs(30), 0, 10), Duration::ZERO);
        assert_eq!(estimate_remaining(Duration::from_secs(30), 10, 10), Duration::ZERO);
    }
}
