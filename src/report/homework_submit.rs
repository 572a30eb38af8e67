//! 学生別の宿題提出率レポート

use super::columns::first_matching;
use super::{threshold_label, ReportOutput, ReportSummary};
use crate::api::{ParseMode, ReportKind};
use crate::builder::AnalysisConfig;
use crate::error::ReportError;
use crate::formatter::{normalize_percentage, parse_percent_text, CellFormatter};
use crate::output::{pack_messages, LONG_LIST_CHUNK_LIMIT};
use crate::parser::{HeaderLayout, SheetGrid};

const STUDENT_KEYWORDS: &[&str] = &["фио", "студент", "имя", "name"];
const GROUP_KEYWORDS: &[&str] = &["группа", "group"];

/// 提出率の列（「percentage」と「homework」の両方を含む列を優先）
fn find_percentage_column(headers: &[String]) -> Option<usize> {
    headers
        .iter()
        .position(|h| h.contains("percentage") && h.contains("homework"))
        .or_else(|| {
            tracing::warn!("no 'percentage homework' header, falling back to 'percentage'");
            headers.iter().position(|h| h.contains("percentage"))
        })
}

pub(crate) fn analyze(grid: &SheetGrid, config: &AnalysisConfig) -> Result<ReportOutput, ReportError> {
    let table = grid.to_table(HeaderLayout::Row(0));
    if table.column_count() < 2 {
        return Err(ReportError::TooFewColumns {
            required: 2,
            found: table.column_count(),
        });
    }

    let headers = table.lowercase_headers();
    let student_col = first_matching(&headers, STUDENT_KEYWORDS).unwrap_or(0);
    let group_col = first_matching(&headers, GROUP_KEYWORDS);
    let percent_col = find_percentage_column(&headers).ok_or_else(|| {
        ReportError::MissingColumn {
            column: "Percentage Homework".to_string(),
        }
    })?;
    tracing::debug!(student_col, ?group_col, percent_col, "homework submit columns detected");

    let formatter = CellFormatter::new();
    let mut flagged: Vec<(String, Option<String>, f64)> = Vec::new();
    for row in 0..table.row_count() {
        let Some(name) = formatter.format_trimmed(table.cell(row, student_col)) else {
            continue;
        };
        let raw = table.cell(row, percent_col);
        if raw.is_blank() {
            continue;
        }
        let Some(value) = parse_percent_text(raw) else {
            tracing::warn!(
                row = table.row_number(row),
                value = %formatter.format(raw),
                "failed to parse homework percentage"
            );
            continue;
        };
        let percent = normalize_percentage(value);
        if percent < config.homework_submit_threshold {
            let group = group_col.and_then(|col| formatter.format_trimmed(table.cell(row, col)));
            flagged.push((name, group, percent));
        }
    }
    flagged.sort_by(|a, b| a.2.total_cmp(&b.2));

    let threshold = threshold_label(config.homework_submit_threshold);
    let mut lines = vec!["📝 Отчет по сданным домашним заданиям:".to_string()];
    if flagged.is_empty() {
        lines.push(format!("✅ Все студенты выполнили ≥ {}% заданий.", threshold));
    } else {
        lines.push(format!(
            "⚠️ Студентов с выполнением < {}%: {}",
            threshold,
            flagged.len()
        ));
        lines.extend(flagged.iter().map(|(name, group, percent)| match group {
            Some(group) => format!("• {} ({}): {:.1}%", name, group, percent),
            None => format!("• {}: {:.1}%", name, percent),
        }));
    }

    Ok(ReportOutput {
        kind: ReportKind::HomeworkSubmit,
        messages: pack_messages(&lines, LONG_LIST_CHUNK_LIMIT, ParseMode::Plain),
        summary: ReportSummary {
            rows_scanned: table.row_count(),
            flagged: flagged.len(),
        },
    })
}
