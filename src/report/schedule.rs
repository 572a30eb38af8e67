//! 時間割レポート
//!
//! グループごと・科目ごとのコマ数（пары）を数えます。
//! 時間割のセルは複数行で、`Предмет: ...` の行が1コマに対応します。

use std::collections::HashMap;

use super::{ReportOutput, ReportSummary};
use crate::api::{ParseMode, ReportKind};
use crate::error::ReportError;
use crate::formatter::CellFormatter;
use crate::output::{pack_messages, REPORT_CHUNK_LIMIT};
use crate::parser::{HeaderLayout, SheetGrid};
use crate::types::Table;

const GROUP_COLUMN: &str = "Группа";
const SUBJECT_MARKER: &str = "Предмет:";

/// 曜日ごとの内容列は4列目から1列おき
const FIRST_CONTENT_COLUMN: usize = 3;

/// グループ1つ分の集計
#[derive(Debug, Clone, PartialEq)]
struct GroupLoad {
    group: String,
    /// 科目とコマ数（多い順、同数は初出順）
    disciplines: Vec<(String, usize)>,
}

impl GroupLoad {
    fn total(&self) -> usize {
        self.disciplines.iter().map(|(_, n)| n).sum()
    }
}

/// セルのテキストから科目名を取り出す
fn subjects_in(cell_text: &str) -> impl Iterator<Item = &str> {
    cell_text.split('\n').filter_map(|line| {
        line.split_once(SUBJECT_MARKER)
            .map(|(_, rest)| rest.trim())
            .filter(|subject| !subject.is_empty())
    })
}

fn count_groups(table: &Table, group_col: usize, content_cols: &[usize]) -> Vec<GroupLoad> {
    let formatter = CellFormatter::new();
    let mut loads: Vec<GroupLoad> = Vec::new();
    let mut group_index: HashMap<String, usize> = HashMap::new();
    let mut discipline_index: Vec<HashMap<String, usize>> = Vec::new();

    for row in 0..table.row_count() {
        let Some(group) = formatter.format_trimmed(table.cell(row, group_col)) else {
            continue;
        };
        let slot = *group_index.entry(group.clone()).or_insert_with(|| {
            loads.push(GroupLoad {
                group,
                disciplines: Vec::new(),
            });
            discipline_index.push(HashMap::new());
            loads.len() - 1
        });

        for &col in content_cols {
            let text = formatter.format(table.cell(row, col));
            for subject in subjects_in(&text) {
                let position = match discipline_index[slot].get(subject) {
                    Some(&position) => position,
                    None => {
                        loads[slot].disciplines.push((subject.to_string(), 0));
                        let position = loads[slot].disciplines.len() - 1;
                        discipline_index[slot].insert(subject.to_string(), position);
                        position
                    }
                };
                loads[slot].disciplines[position].1 += 1;
            }
        }
    }

    for load in &mut loads {
        // 安定ソートなので同数は初出順のまま
        load.disciplines.sort_by(|a, b| b.1.cmp(&a.1));
    }
    loads
}

pub(crate) fn analyze(grid: &SheetGrid) -> Result<ReportOutput, ReportError> {
    let table = grid.to_table(HeaderLayout::Row(0));
    let group_col = table
        .find_column(GROUP_COLUMN)
        .ok_or_else(|| ReportError::MissingColumn {
            column: GROUP_COLUMN.to_string(),
        })?;
    let content_cols: Vec<usize> = (FIRST_CONTENT_COLUMN..table.column_count())
        .step_by(2)
        .collect();
    if content_cols.is_empty() {
        return Err(ReportError::MissingScheduleDays);
    }

    let loads = count_groups(&table, group_col, &content_cols);
    let overall: usize = loads.iter().map(GroupLoad::total).sum();
    tracing::debug!(groups = loads.len(), pairs = overall, "schedule counted");

    // グループ単位のブロックを1項目として分割する
    let mode = ParseMode::Markdown;
    let mut blocks = vec![format!("📅 {}\n", mode.bold("Отчет по выставленному расписанию"))];
    for load in &loads {
        let title = mode.bold(&format!("Группа {}", load.group));
        if load.disciplines.is_empty() {
            blocks.push(format!("{}: Нет занятий в расписании.\n", title));
            continue;
        }
        let mut block = format!("{}:", title);
        for (discipline, count) in &load.disciplines {
            block.push_str(&format!(
                "\n• {}: {}",
                mode.escape(discipline),
                mode.bold(&format!("{} пар", count))
            ));
        }
        block.push_str(&format!(
            "\nВсего пар в группе: {}\n",
            mode.bold(&load.total().to_string())
        ));
        blocks.push(block);
    }
    if overall == 0 {
        blocks.push("Нет данных о занятиях в загруженном файле.".to_string());
    }
    blocks.push(mode.bold(&format!(
        "Общее количество пар по всем группам: {}",
        overall
    )));

    Ok(ReportOutput {
        kind: ReportKind::Schedule,
        messages: pack_messages(&blocks, REPORT_CHUNK_LIMIT, mode),
        summary: ReportSummary {
            rows_scanned: table.row_count(),
            flagged: overall,
        },
    })
}
