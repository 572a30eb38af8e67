//! Types Module
//!
//! クレート全体で使用する共通データ型を定義するモジュール。

use chrono::NaiveDateTime;

/// セルの値を表す列挙型
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// 数値（f64）
    Number(f64),

    /// 文字列
    Text(String),

    /// 論理値
    Bool(bool),

    /// 日付・日時
    Date(NaiveDateTime),

    /// エラー値（例: #DIV/0!）
    Error(String),

    /// 空セル
    Empty,
}

impl CellValue {
    /// 値が空かどうかを判定
    ///
    /// 空白のみの文字列も空として扱います。
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

/// 見出し付きのテーブル
///
/// 1枚のシートを「見出し行 + データ行」に分割したものです。
/// 各データ行の長さは見出しの数に揃えてあります。
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    /// 列見出し（前後の空白は除去済み）
    pub headers: Vec<String>,

    /// データ行
    pub rows: Vec<Vec<CellValue>>,

    /// 各データ行のシート上の行番号（1始まり）
    pub row_numbers: Vec<u32>,
}

static EMPTY: CellValue = CellValue::Empty;

impl Table {
    /// 見出しとデータ行からテーブルを生成
    ///
    /// 行の長さが見出しより短い場合は`Empty`で埋め、長い場合は切り詰めます。
    /// 行番号は見出しが1行目にあるものとして2から振ります。
    pub fn new(headers: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let width = headers.len();
        let rows: Vec<Vec<CellValue>> = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, CellValue::Empty);
                row
            })
            .collect();
        let row_numbers = (2..).take(rows.len()).collect();
        Self {
            headers,
            rows,
            row_numbers,
        }
    }

    /// データ行のシート上の行番号
    pub fn row_number(&self, row: usize) -> u32 {
        self.row_numbers
            .get(row)
            .copied()
            .unwrap_or(row as u32 + 2)
    }

    /// 列数
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// データ行数
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// 見出しが完全一致する最初の列
    pub fn find_column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// 小文字化した見出しの一覧
    pub fn lowercase_headers(&self) -> Vec<String> {
        self.headers.iter().map(|h| h.to_lowercase()).collect()
    }

    /// セルを取得（範囲外は`Empty`）
    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY)
    }

    /// 指定列の値を上から順に返すイテレーター
    pub fn column(&self, col: usize) -> impl Iterator<Item = &CellValue> + '_ {
        (0..self.rows.len()).map(move |row| self.cell(row, col))
    }
}
