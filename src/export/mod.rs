pub mod csv;

use crate::cli::ReportFormat;
use crate::error::Result;
use chrono::{DateTime, Local};
use emotion_eval_common::ReportRow;
use std::path::{Path, PathBuf};

/// レポートファイル名の日時形式
const FILE_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// レポートファイルのパス（results_YYYYMMDD_HHMMSS.<ext>）
pub fn report_path(output_dir: &Path, saved_at: &DateTime<Local>, extension: &str) -> PathBuf {
    output_dir.join(format!(
        "results_{}.{}",
        saved_at.format(FILE_TIMESTAMP_FORMAT),
        extension
    ))
}

/// JSONを書き出す
pub fn write_json(rows: &[ReportRow], output_path: &Path) -> Result<()> {
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(rows)?;
    std::fs::write(output_path, json)?;
    Ok(())
}

/// 現在時刻でファイル名を付けてレポートを保存する
pub fn save_report(
    rows: &[ReportRow],
    format: ReportFormat,
    output_dir: &Path,
    include_raw: bool,
) -> Result<Vec<PathBuf>> {
    export_report(rows, format, output_dir, &Local::now(), include_raw)
}

/// 形式に応じてレポートを書き出し、出力したパスを返す
pub fn export_report(
    rows: &[ReportRow],
    format: ReportFormat,
    output_dir: &Path,
    saved_at: &DateTime<Local>,
    include_raw: bool,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    if format.writes_csv() {
        let path = report_path(output_dir, saved_at, "csv");
        csv::write_csv(rows, &path, include_raw)?;
        tracing::info!(path = %path.display(), rows = rows.len(), "CSVを出力");
        written.push(path);
    }

    if format.writes_json() {
        let path = report_path(output_dir, saved_at, "json");
        write_json(rows, &path)?;
        tracing::info!(path = %path.display(), rows = rows.len(), "JSONを出力");
        written.push(path);
    }

    Ok(written)
}
