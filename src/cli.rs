use clap::{Parser, Subcommand};
use crate::ai_provider::AiProvider;
use std::path::PathBuf;

/// 温度の許容範囲（対話入力・引数共通）
pub const MIN_TEMPERATURE: f32 = 0.0;
pub const MAX_TEMPERATURE: f32 = 1.0;

#[derive(Parser)]
#[command(name = "emotion-eval")]
#[command(about = "子ども向け画像の感情ラベル評価ツール（OpenAI / Gemini）", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力（リクエストJSONを含む）
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 画像フォルダを全モデル・全戦略で評価してレポートを出力
    Run {
        /// 評価する画像フォルダ
        #[arg(short, long, default_value = "images")]
        images: PathBuf,

        /// few-shot 例示画像のフォルダ
        #[arg(long, default_value = "few_shot_examples")]
        few_shot_dir: PathBuf,

        /// レポート出力先フォルダ
        #[arg(short, long, default_value = "results")]
        output: PathBuf,

        /// 出力形式 (csv/json/both)
        #[arg(short, long, default_value = "csv")]
        format: ReportFormat,

        /// 温度（省略時は対話入力）
        #[arg(short, long, value_parser = parse_temperature)]
        temperature: Option<f32>,

        /// 最大リトライ回数（省略時は設定ファイルの値）
        #[arg(long)]
        max_retries: Option<u32>,

        /// 使用するモデル（カンマ区切り）
        #[arg(short, long, value_delimiter = ',', default_value = "openai,gemini")]
        models: Vec<AiProvider>,

        /// 生ラベル列もレポートに含める
        #[arg(long)]
        include_raw: bool,
    },

    /// ラベルを正規化して表示
    Normalize {
        /// 正規化するテキスト
        #[arg(required = true)]
        text: Vec<String>,
    },

    /// 正規ラベルと同義語の一覧を表示
    Labels,

    /// 設定を表示/編集
    Config {
        /// OpenAI APIキーを設定
        #[arg(long)]
        set_openai_key: Option<String>,

        /// Google (Gemini) APIキーを設定
        #[arg(long)]
        set_google_key: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReportFormat {
    #[default]
    Csv,
    Json,
    Both,
}

impl ReportFormat {
    pub fn writes_csv(&self) -> bool {
        matches!(self, ReportFormat::Csv | ReportFormat::Both)
    }

    pub fn writes_json(&self) -> bool {
        matches!(self, ReportFormat::Json | ReportFormat::Both)
    }
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ReportFormat::Csv),
            "json" => Ok(ReportFormat::Json),
            "both" => Ok(ReportFormat::Both),
            _ => Err(format!("Unknown format: {}. Use csv, json, or both", s)),
        }
    }
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportFormat::Csv => write!(f, "csv"),
            ReportFormat::Json => write!(f, "json"),
            ReportFormat::Both => write!(f, "both"),
        }
    }
}

/// 温度をパースして範囲を検証
pub fn parse_temperature(s: &str) -> Result<f32, String> {
    let value: f32 = s
        .trim()
        .parse()
        .map_err(|_| format!("数値を入力してください: {}", s))?;

    if !(MIN_TEMPERATURE..=MAX_TEMPERATURE).contains(&value) {
        return Err(format!(
            "温度は {:.1} 〜 {:.1} の範囲で指定してください: {}",
            MIN_TEMPERATURE, MAX_TEMPERATURE, value
        ));
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_temperature() {
        assert_eq!(parse_temperature("0.7"), Ok(0.7));
        assert_eq!(parse_temperature(" 0 "), Ok(0.0));
        assert_eq!(parse_temperature("1.0"), Ok(1.0));
        assert!(parse_temperature("1.5").is_err());
        assert!(parse_temperature("-0.1").is_err());
        assert!(parse_temperature("hot").is_err());
    }

    #[test]
    fn test_report_format_from_str() {
        assert_eq!("CSV".parse::<ReportFormat>(), Ok(ReportFormat::Csv));
        assert_eq!("both".parse::<ReportFormat>(), Ok(ReportFormat::Both));
        assert!("xlsx".parse::<ReportFormat>().is_err());
        assert!(ReportFormat::Both.writes_csv() && ReportFormat::Both.writes_json());
        assert!(!ReportFormat::Json.writes_csv());
    }

    #[test]
    fn test_run_defaults() {
        let cli = Cli::try_parse_from(["emotion-eval", "run", "--temperature", "0.2"]).unwrap();
        match cli.command {
            Commands::Run { images, models, format, temperature, include_raw, .. } => {
                assert_eq!(images, PathBuf::from("images"));
                assert_eq!(models, vec![AiProvider::OpenAi, AiProvider::Gemini]);
                assert_eq!(format, ReportFormat::Csv);
                assert_eq!(temperature, Some(0.2));
                assert!(!include_raw);
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_run_single_model() {
        let cli = Cli::try_parse_from(["emotion-eval", "run", "--models", "gemini"]).unwrap();
        match cli.command {
            Commands::Run { models, temperature, .. } => {
                assert_eq!(models, vec![AiProvider::Gemini]);
                assert!(temperature.is_none());
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_run_rejects_out_of_range_temperature() {
        assert!(Cli::try_parse_from(["emotion-eval", "run", "-t", "3"]).is_err());
    }
}
