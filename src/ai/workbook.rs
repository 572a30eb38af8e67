//! ワークブック全体の解析プロンプト
//!
//! すべてのシートをCSVとして書き出し、指示文とともにモデルへ渡します。
//! シートごとのCSV変換はrayonで並列に行います。

use rayon::prelude::*;
use std::io::Cursor;

use crate::error::ReportError;
use crate::formatter::CellFormatter;
use crate::output::render_csv;
use crate::parser::WorkbookParser;
use crate::types::Table;

/// プロンプトに埋め込むCSVの最大文字数
pub const WORKBOOK_CONTENT_LIMIT: usize = 15_000;

const TRUNCATION_MARGIN: usize = 200;

const INSTRUCTION: &str = "Пользователь загрузил Excel-файл. Проанализируй таблицы и дай краткое резюме, \
выдели ключевые столбцы/строки, возможные аномалии, агрегаты и рекомендации.\n\n";

fn sheet_csv(name: &str, table: &Table) -> String {
    let formatter = CellFormatter::new();
    let rows: Vec<Vec<String>> = table
        .rows
        .iter()
        .map(|row| row.iter().map(|cell| formatter.format(cell)).collect())
        .collect();
    format!("--- Sheet: {} ---\n{}", name, render_csv(&table.headers, &rows))
}

/// ワークブックの全シートをCSVテキストにまとめる
pub fn workbook_digest(bytes: &[u8], max_input_size: u64) -> Result<String, ReportError> {
    let mut parser = WorkbookParser::open(Cursor::new(bytes), max_input_size)?;
    let sheets = parser.read_all_sheets()?;

    let parts: Vec<String> = sheets
        .par_iter()
        .map(|(name, table)| sheet_csv(name, table))
        .collect();

    tracing::debug!(sheets = parts.len(), "workbook digest rendered");
    Ok(parts.join("\n"))
}

/// ワークブック解析用のプロンプトを組み立てる
///
/// 内容が長すぎる場合は切り詰め、ファイルのキャプションがあれば利用者の課題として先頭に付けます。
pub fn workbook_prompt(content: &str, caption: Option<&str>) -> String {
    let snippet = if content.chars().count() > WORKBOOK_CONTENT_LIMIT {
        let kept: String = content
            .chars()
            .take(WORKBOOK_CONTENT_LIMIT - TRUNCATION_MARGIN)
            .collect();
        format!("{}\n... (truncated)", kept)
    } else {
        content.to_string()
    };

    let body = format!(
        "{}Excel START:\n{}\nExcel END:\nОтвечай подробно, но лаконично.",
        INSTRUCTION, snippet
    );
    match caption.map(str::trim).filter(|c| !c.is_empty()) {
        Some(task) => format!("Задача от пользователя: {}\n\n{}", task, body),
        None => body,
    }
}
