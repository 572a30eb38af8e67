//! Workbook Parser
//!
//! calamineのラッパーとして、ワークブックレベルの操作を提供します。
//! `.xls` / `.xlsx` / `.xlsb` / `.ods` のいずれもメモリ上で開きます。

use calamine::{open_workbook_auto_from_rs, Reader, Sheets};
use std::io::{Cursor, Read};

use crate::api::SheetSelector;
use crate::error::ReportError;
use crate::formatter::{cell_from_data, CellFormatter};
use crate::security::SecurityConfig;
use crate::types::{CellValue, Table};

/// 見出し行の取り方
///
/// 行番号は「シートの最初の空でない行」を0とした相対位置です。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderLayout {
    /// 1行の見出し
    Row(usize),

    /// 2行の見出し（上段の空セルは左から前方埋め）
    ///
    /// 「Месяц」のように横方向に結合されたグループ見出しを持つファイル向けです。
    Rows(usize, usize),
}

impl Default for HeaderLayout {
    fn default() -> Self {
        HeaderLayout::Row(0)
    }
}

/// シートから読み出した生の行
///
/// 完全に空の行は除外済みです。列はA列から始まります。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetGrid {
    /// 各行のセル（A列から）
    pub rows: Vec<Vec<CellValue>>,

    /// 各行のシート上の行番号（1始まり）
    pub row_numbers: Vec<u32>,
}

impl SheetGrid {
    /// 列数（最長の行に合わせる）
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// 見出しレイアウトに従ってテーブルに変換
    ///
    /// 見出し行が存在しない場合は空のテーブルを返します。
    pub fn to_table(&self, layout: HeaderLayout) -> Table {
        let formatter = CellFormatter::new();
        let width = self.width();
        let label = |row: usize, col: usize| -> String {
            self.rows
                .get(row)
                .and_then(|r| r.get(col))
                .and_then(|cell| formatter.format_trimmed(cell))
                .unwrap_or_default()
        };

        let (headers, data_start) = match layout {
            HeaderLayout::Row(row) => {
                if row >= self.rows.len() {
                    return Table::default();
                }
                ((0..width).map(|col| label(row, col)).collect(), row + 1)
            }
            HeaderLayout::Rows(upper, lower) => {
                if upper >= self.rows.len() || lower >= self.rows.len() {
                    return Table::default();
                }
                let mut last_upper = String::new();
                let headers = (0..width)
                    .map(|col| {
                        let top = label(upper, col);
                        if !top.is_empty() {
                            last_upper = top;
                        }
                        let bottom = label(lower, col);
                        [last_upper.as_str(), bottom.as_str()]
                            .iter()
                            .filter(|part| !part.is_empty())
                            .copied()
                            .collect::<Vec<_>>()
                            .join(" ")
                    })
                    .collect();
                (headers, upper.max(lower) + 1)
            }
        };

        let rows = self.rows.iter().skip(data_start).cloned().collect();
        let mut table = Table::new(headers, rows);
        table.row_numbers = self.row_numbers.iter().skip(data_start).copied().collect();
        table
    }
}

/// ワークブックパーサー
///
/// 入力全体をメモリに読み込んでから calamine で開きます。
pub struct WorkbookParser {
    /// calamineのワークブック（形式は自動判定）
    workbook: Sheets<Cursor<Vec<u8>>>,
}

impl WorkbookParser {
    /// ワークブックを開く
    ///
    /// # 引数
    ///
    /// * `reader` - Excelファイルを読み込むためのリーダー
    /// * `max_input_file_size` - 入力サイズの上限（バイト）
    ///
    /// # 戻り値
    ///
    /// * `Ok(WorkbookParser)` - ワークブックの読み込みに成功した場合
    /// * `Err(ReportError::SecurityViolation)` - サイズ上限を超えた場合
    /// * `Err(ReportError::Parse)` - Excelとして解釈できない場合
    pub fn open<R: Read>(reader: R, max_input_file_size: u64) -> Result<Self, ReportError> {
        let security_config = SecurityConfig::with_max_input_file_size(max_input_file_size);

        // 上限+1バイトまでしか読まない
        let mut buffer = Vec::new();
        let bytes_read = reader
            .take(max_input_file_size.saturating_add(1))
            .read_to_end(&mut buffer)?;
        security_config.check_input_size(bytes_read as u64)?;

        let workbook = open_workbook_auto_from_rs(Cursor::new(buffer))?;
        Ok(WorkbookParser { workbook })
    }

    /// すべてのシート名を取得
    pub fn sheet_names(&self) -> Vec<String> {
        self.workbook.sheet_names()
    }

    /// シート選択方式に基づいてシートを選択
    ///
    /// # 戻り値
    ///
    /// * `Ok(String)` - 選択されたシート名
    /// * `Err(ReportError::Config)` - シートが見つからない、またはインデックスが範囲外の場合
    pub fn select_sheet(&self, selector: &SheetSelector) -> Result<String, ReportError> {
        let all_sheet_names = self.sheet_names();

        match selector {
            SheetSelector::Index(index) => all_sheet_names.get(*index).cloned().ok_or_else(|| {
                ReportError::Config(format!(
                    "Sheet index {} is out of range (total: {})",
                    index,
                    all_sheet_names.len()
                ))
            }),
            SheetSelector::Name(name) => {
                if !all_sheet_names.contains(name) {
                    return Err(ReportError::Config(format!("Sheet '{}' not found", name)));
                }
                Ok(name.clone())
            }
        }
    }

    /// シートを行の集合として読み出す
    ///
    /// calamineの範囲は最初の空でないセルから始まるため、
    /// 列方向はA列から始まるように空セルで埋め直します。
    pub fn read_grid(&mut self, sheet_name: &str) -> Result<SheetGrid, ReportError> {
        let range = self.workbook.worksheet_range(sheet_name)?;

        let (start_row, start_col) = match range.start() {
            Some(start) => start,
            None => return Ok(SheetGrid::default()),
        };

        let mut grid = SheetGrid::default();
        for (offset, row) in range.rows().enumerate() {
            let mut cells = vec![CellValue::Empty; start_col as usize];
            cells.extend(row.iter().map(cell_from_data));

            if cells.iter().all(CellValue::is_blank) {
                continue;
            }
            grid.rows.push(cells);
            grid.row_numbers.push(start_row + offset as u32 + 1);
        }

        Ok(grid)
    }

    /// シートをテーブルとして読み出す
    pub fn read_table(
        &mut self,
        sheet_name: &str,
        layout: HeaderLayout,
    ) -> Result<Table, ReportError> {
        Ok(self.read_grid(sheet_name)?.to_table(layout))
    }

    /// すべてのシートを1行目見出しのテーブルとして読み出す
    pub fn read_all_sheets(&mut self) -> Result<Vec<(String, Table)>, ReportError> {
        let mut sheets = Vec::new();
        for name in self.sheet_names() {
            let table = self.read_table(&name, HeaderLayout::Row(0))?;
            sheets.push((name, table));
        }
        Ok(sheets)
    }
}
