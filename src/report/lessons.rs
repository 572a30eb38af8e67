//! 授業テーマの書式チェック
//!
//! テーマは `Урок № 5. Тема: ...` の形式である必要があります。
//! 形式に合わない行はシート上の行番号とともに列挙します。

use regex::Regex;

use super::{ReportOutput, ReportSummary};
use crate::api::{ParseMode, ReportKind};
use crate::builder::AnalysisConfig;
use crate::error::ReportError;
use crate::formatter::CellFormatter;
use crate::output::{pack_messages, REPORT_CHUNK_LIMIT};
use crate::parser::{HeaderLayout, SheetGrid};
use crate::types::Table;

const TOPIC_COLUMN: &str = "Тема урока";
const TOPIC_PATTERN: &str = r"(?i)^Урок\s*№\s*\d+\.?\s*Тема\s*:\s*.+";
const EMPTY_TOPIC: &str = "(пусто)";

/// テーマ列を決める
///
/// 完全一致 → 見出しに「тема」を含む列 → 値を持つ最初の列、の順に探します。
fn find_topic_column(table: &Table) -> Option<usize> {
    table
        .find_column(TOPIC_COLUMN)
        .or_else(|| {
            table
                .lowercase_headers()
                .iter()
                .position(|h| h.contains("тема"))
        })
        .or_else(|| (0..table.column_count()).find(|&col| table.column(col).any(|c| !c.is_blank())))
}

pub(crate) fn analyze(grid: &SheetGrid, _config: &AnalysisConfig) -> Result<ReportOutput, ReportError> {
    let table = grid.to_table(HeaderLayout::Row(0));
    let topic_col = find_topic_column(&table).ok_or(ReportError::NoTopicColumn)?;

    let formatter = CellFormatter::new();
    let topics: Vec<(u32, String)> = (0..table.row_count())
        .map(|row| {
            let text = formatter
                .format_trimmed(table.cell(row, topic_col))
                .unwrap_or_default();
            (table.row_number(row), text)
        })
        .collect();
    if topics.iter().all(|(_, text)| text.is_empty()) {
        return Err(ReportError::NoTopics);
    }

    let pattern = Regex::new(TOPIC_PATTERN).map_err(|e| ReportError::Config(e.to_string()))?;
    let (correct, incorrect): (Vec<_>, Vec<_>) = topics
        .into_iter()
        .partition(|(_, text)| pattern.is_match(text));
    tracing::debug!(
        topic_col,
        correct = correct.len(),
        incorrect = incorrect.len(),
        "lesson topics checked"
    );

    let mut lines = vec![
        "📚 Отчет по темам занятий".to_string(),
        String::new(),
        format!("✅ Корректных тем: {}", correct.len()),
        format!("❌ Некорректных тем: {}", incorrect.len()),
        String::new(),
    ];
    if incorrect.is_empty() {
        lines.push("🎉 Все темы в правильном формате!".to_string());
    } else {
        lines.extend(incorrect.iter().map(|(row_number, text)| {
            let shown = if text.is_empty() { EMPTY_TOPIC } else { text.as_str() };
            format!("• [строка {}] {}", row_number, shown)
        }));
    }

    let mode = ParseMode::MarkdownV2;
    let escaped: Vec<String> = lines.iter().map(|line| mode.escape(line)).collect();

    Ok(ReportOutput {
        kind: ReportKind::Lessons,
        messages: pack_messages(&escaped, REPORT_CHUNK_LIMIT, mode),
        summary: ReportSummary {
            rows_scanned: table.row_count(),
            flagged: incorrect.len(),
        },
    })
}
