//! 問題のある学生の一覧
//!
//! 宿題の評価が`1`、または授業評価が閾値未満の学生を抽出します。
//! 出力はMarkdownV2で、名前だけを太字にし、それ以外の動的な値はエスケープします。

use super::{russian_plural, threshold_label, ReportOutput, ReportSummary};
use crate::api::{ParseMode, ReportKind};
use crate::builder::AnalysisConfig;
use crate::error::ReportError;
use crate::formatter::{format_number, parse_strict_number, CellFormatter};
use crate::output::{pack_messages, REPORT_CHUNK_LIMIT};
use crate::parser::{HeaderLayout, SheetGrid};

const REQUIRED_COLUMNS: [&str; 3] = ["FIO", "Homework", "Classroom"];
const GROUP_COLUMN: &str = "Группа";

#[derive(Debug, Clone, PartialEq)]
struct StudentRow {
    name: String,
    group: Option<String>,
    homework: Option<f64>,
    classroom: Option<f64>,
}

pub(crate) fn analyze(grid: &SheetGrid, config: &AnalysisConfig) -> Result<ReportOutput, ReportError> {
    let table = grid.to_table(HeaderLayout::Row(0));

    let mut required = [0usize; 3];
    for (slot, name) in required.iter_mut().zip(REQUIRED_COLUMNS) {
        *slot = table
            .find_column(name)
            .ok_or_else(|| ReportError::MissingColumn {
                column: REQUIRED_COLUMNS.join(", "),
            })?;
    }
    let [name_col, homework_col, classroom_col] = required;
    let group_col = table.find_column(GROUP_COLUMN);

    let formatter = CellFormatter::new();
    let mut flagged = Vec::new();
    for row in 0..table.row_count() {
        let homework = parse_strict_number(table.cell(row, homework_col));
        let classroom = parse_strict_number(table.cell(row, classroom_col));
        let failing_homework = homework == Some(config.failing_homework_grade);
        let low_classroom = classroom.is_some_and(|c| c < config.classroom_threshold);
        if !failing_homework && !low_classroom {
            continue;
        }
        let Some(name) = formatter.format_trimmed(table.cell(row, name_col)) else {
            tracing::warn!(row = table.row_number(row), "flagged student without a name");
            continue;
        };
        flagged.push(StudentRow {
            name,
            group: group_col.map(|col| {
                formatter
                    .format_trimmed(table.cell(row, col))
                    .unwrap_or_else(|| "-".to_string())
            }),
            homework,
            classroom,
        });
    }

    let mode = ParseMode::MarkdownV2;
    let mut items = vec![
        format!("👥 {}", mode.bold("Отчет по студентам с проблемами")),
        String::new(),
    ];
    if flagged.is_empty() {
        items.push(mode.escape("✅ Проблемных студентов не найдено."));
    } else {
        let forms = ["студент", "студента", "студентов"];
        items.push(mode.escape(&format!(
            "⚠️ Найдено {} {}:",
            flagged.len(),
            russian_plural(flagged.len(), forms)
        )));
        for student in &flagged {
            items.push(String::new());
            items.push(render_student(student, config, mode));
        }
    }

    Ok(ReportOutput {
        kind: ReportKind::Students,
        messages: pack_messages(&items, REPORT_CHUNK_LIMIT, mode),
        summary: ReportSummary {
            rows_scanned: table.row_count(),
            flagged: flagged.len(),
        },
    })
}

/// 学生1名分のブロック（複数行）
fn render_student(student: &StudentRow, config: &AnalysisConfig, mode: ParseMode) -> String {
    let mut block = format!("• {}", mode.bold(&student.name));
    if let Some(group) = &student.group {
        block.push_str(&mode.escape(&format!(" ({})", group)));
    }

    let shown = |value: Option<f64>| value.map(format_number).unwrap_or_else(|| "-".to_string());
    block.push('\n');
    block.push_str(&mode.escape(&format!(
        "  ДЗ: {} | Класс: {}",
        shown(student.homework.map(f64::trunc)),
        shown(student.classroom)
    )));

    let mut reasons = Vec::new();
    if student.homework == Some(config.failing_homework_grade) {
        reasons.push(format!(
            "ДЗ = {} 🔥",
            format_number(config.failing_homework_grade)
        ));
    }
    if student
        .classroom
        .is_some_and(|c| c < config.classroom_threshold)
    {
        reasons.push(format!(
            "Классная < {} ⚠️",
            threshold_label(config.classroom_threshold)
        ));
    }
    if !reasons.is_empty() {
        block.push('\n');
        block.push_str(&mode.escape(&format!("  Причина: {}", reasons.join(", "))));
    }
    block
}
