//! 教員別の出席率レポート

use super::columns::{last_matching, TEACHER_KEYWORDS};
use super::{threshold_label, ReportOutput, ReportSummary};
use crate::api::{ParseMode, ReportKind};
use crate::builder::AnalysisConfig;
use crate::error::ReportError;
use crate::formatter::{normalize_percentage, parse_loose_number, CellFormatter};
use crate::output::{pack_messages, REPORT_CHUNK_LIMIT};
use crate::parser::{HeaderLayout, SheetGrid};

/// 出席率の列を示すキーワード
const ATTENDANCE_KEYWORDS: &[&str] = &["посещ", "сред", "процент", "%", "присут", "avg"];

pub(crate) fn analyze(grid: &SheetGrid, config: &AnalysisConfig) -> Result<ReportOutput, ReportError> {
    let table = grid.to_table(HeaderLayout::Row(0));
    if table.column_count() < 2 {
        return Err(ReportError::TooFewColumns {
            required: 2,
            found: table.column_count(),
        });
    }

    // 同じキーワードを含む列が複数あれば右側を優先
    let headers = table.lowercase_headers();
    let teacher_col = last_matching(&headers, TEACHER_KEYWORDS).unwrap_or(0);
    let value_col = last_matching(&headers, ATTENDANCE_KEYWORDS).unwrap_or(1);
    tracing::debug!(teacher_col, value_col, "attendance columns detected");

    let formatter = CellFormatter::new();
    let mut flagged: Vec<(String, f64)> = Vec::new();
    for row in 0..table.row_count() {
        let Some(name) = formatter.format_trimmed(table.cell(row, teacher_col)) else {
            continue;
        };
        let Some(value) = parse_loose_number(table.cell(row, value_col)) else {
            continue;
        };
        let attendance = normalize_percentage(value);
        if attendance < config.attendance_threshold {
            flagged.push((name, attendance));
        }
    }
    flagged.sort_by(|a, b| a.1.total_cmp(&b.1));

    let threshold = threshold_label(config.attendance_threshold);
    let mut lines = vec!["📊 Отчет по посещаемости преподавателей:".to_string()];
    if flagged.is_empty() {
        lines.push(format!(
            "✅ Все преподаватели имеют посещаемость ≥ {}%.",
            threshold
        ));
    } else {
        lines.push(format!(
            "⚠️ Преподавателей с посещаемостью < {}%: {}",
            threshold,
            flagged.len()
        ));
        lines.extend(
            flagged
                .iter()
                .map(|(name, value)| format!("• {}: {:.1}%", name, value)),
        );
    }

    Ok(ReportOutput {
        kind: ReportKind::Attendance,
        messages: pack_messages(&lines, REPORT_CHUNK_LIMIT, ParseMode::Plain),
        summary: ReportSummary {
            rows_scanned: table.row_count(),
            flagged: flagged.len(),
        },
    })
}
