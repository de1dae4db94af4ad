//! CSVレポート出力
//!
//! 列順は固定: image_name, gpt4o_*, gemini_*, timestamp。
//! 生ラベル列（`*_raw`）は指定時のみ末尾に追加する。

use crate::error::Result;
use emotion_eval_common::{ModelVendor, PromptStrategy, ReportRow, StrategyOutcome};
use std::path::Path;

const VENDORS: [ModelVendor; 2] = [ModelVendor::OpenAi, ModelVendor::Gemini];

/// ヘッダー行
pub fn header(include_raw: bool) -> Vec<String> {
    let mut columns = vec!["image_name".to_string()];

    for vendor in VENDORS {
        for strategy in PromptStrategy::ALL {
            columns.push(format!("{}_{}", vendor.column_prefix(), strategy.column_suffix()));
            if strategy == PromptStrategy::ChainOfThought {
                columns.push(format!("{}_cot_reasoning", vendor.column_prefix()));
            }
        }
    }

    columns.push("timestamp".to_string());

    if include_raw {
        for vendor in VENDORS {
            for strategy in PromptStrategy::ALL {
                columns.push(format!(
                    "{}_{}_raw",
                    vendor.column_prefix(),
                    strategy.column_suffix()
                ));
            }
        }
    }

    columns
}

fn cell(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

/// データ行（失敗・未実行のセルは空文字）
pub fn record(row: &ReportRow, include_raw: bool) -> Vec<String> {
    let mut fields = vec![row.image_name.clone()];

    for vendor in VENDORS {
        let columns = row.columns(vendor);
        for strategy in PromptStrategy::ALL {
            let outcome: &StrategyOutcome = columns.get(strategy);
            fields.push(cell(&outcome.label));
            if strategy == PromptStrategy::ChainOfThought {
                fields.push(cell(&outcome.reasoning));
            }
        }
    }

    fields.push(row.timestamp.clone());

    if include_raw {
        for vendor in VENDORS {
            let columns = row.columns(vendor);
            for strategy in PromptStrategy::ALL {
                fields.push(cell(&columns.get(strategy).raw_label));
            }
        }
    }

    fields
}

/// CSVを書き出す（UTF-8）
pub fn write_csv(rows: &[ReportRow], output_path: &Path, include_raw: bool) -> Result<()> {
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut writer = ::csv::Writer::from_path(output_path)?;
    writer.write_record(header(include_raw))?;
    for row in rows {
        writer.write_record(record(row, include_raw))?;
    }
    writer.flush()?;

    Ok(())
}
