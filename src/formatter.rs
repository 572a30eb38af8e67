//! Formatter Module
//!
//! セル値のテキスト化と、レポートごとの数値パース規則を提供するモジュール。
//!
//! スプレッドシートの書き出し元によって同じ「パーセント」でも
//! `45`、`0.45`、`"45 %"`、`"45,0"` のように表現が揺れるため、
//! レポートごとに寛容さの異なるパース関数を用意しています。

use calamine::Data;
use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::types::CellValue;

/// セルフォーマッター
///
/// セル値を人間向けの文字列に変換します。
#[derive(Debug, Default, Clone, Copy)]
pub struct CellFormatter;

impl CellFormatter {
    /// 新しいCellFormatterインスタンスを生成
    pub fn new() -> Self {
        Self
    }

    /// セル値をフォーマット
    ///
    /// - 整数値の数値は小数部なし（`85.0` → `85`）
    /// - 日付は`YYYY-MM-DD`（時刻があれば` HH:MM:SS`を付加）
    /// - 論理値は`TRUE`/`FALSE`
    pub fn format(&self, value: &CellValue) -> String {
        match value {
            CellValue::Number(n) => format_number(*n),
            CellValue::Text(s) => s.clone(),
            CellValue::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
            CellValue::Date(dt) => {
                if dt.time() == chrono::NaiveTime::MIN {
                    dt.format("%Y-%m-%d").to_string()
                } else {
                    dt.format("%Y-%m-%d %H:%M:%S").to_string()
                }
            }
            CellValue::Error(e) => e.clone(),
            CellValue::Empty => String::new(),
        }
    }

    /// トリム済みのテキストを返す（空の場合は`None`）
    pub fn format_trimmed(&self, value: &CellValue) -> Option<String> {
        let text = self.format(value);
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}

/// 数値を表示用にフォーマット
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// calamineのセルを`CellValue`に変換
pub(crate) fn cell_from_data(cell: &Data) -> CellValue {
    match cell {
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => {
            if dt.is_datetime() {
                match DateFormatter.from_serial(dt.as_f64()) {
                    Some(date) => CellValue::Date(date),
                    None => CellValue::Number(dt.as_f64()),
                }
            } else {
                CellValue::Number(dt.as_f64())
            }
        }
        Data::DateTimeIso(s) => NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
            .map(CellValue::Date)
            .unwrap_or_else(|_| CellValue::Text(s.clone())),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Error(format!("{:?}", e)),
        Data::Empty => CellValue::Empty,
    }
}

/// 日付フォーマッター
///
/// Excelのシリアル日付値を日時に変換します。
/// 1900年システム（1899年12月30日起算）のみを扱います。
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct DateFormatter;

impl DateFormatter {
    /// シリアル値を日時に変換
    ///
    /// 小数部は1日の中の時刻として扱い、秒単位に丸めます。
    pub fn from_serial(&self, serial_value: f64) -> Option<NaiveDateTime> {
        if !serial_value.is_finite() || serial_value < 0.0 {
            return None;
        }
        let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
        let days = serial_value.floor();
        let seconds = ((serial_value - days) * 86_400.0).round() as i64;
        epoch
            .checked_add_signed(Duration::days(days as i64))?
            .checked_add_signed(Duration::seconds(seconds))
    }
}

/// 出席率の列で使う寛容なパース
///
/// 文字列の場合、NBSPを空白に置き換えてから`0-9 , . % -`以外をすべて除去し、
/// `%`を除いて`,`を`.`に置換してから解釈します。
pub fn parse_loose_number(value: &CellValue) -> Option<f64> {
    match value {
        CellValue::Number(n) => Some(*n),
        CellValue::Text(s) => {
            let cleaned: String = s
                .replace('\u{a0}', " ")
                .chars()
                .filter(|c| c.is_ascii_digit() || matches!(c, ',' | '.' | '-'))
                .map(|c| if c == ',' { '.' } else { c })
                .collect();
            parse_finite(&cleaned)
        }
        _ => None,
    }
}

/// 宿題チェックの「Получено / Проверено」列で使うパース
///
/// トリム、NBSP除去、`,`→`.`のみを行います。`%`は許容しません。
pub fn parse_plain_number(value: &CellValue) -> Option<f64> {
    match value {
        CellValue::Number(n) => Some(*n),
        CellValue::Text(s) => {
            let cleaned = s.trim().replace('\u{a0}', "").replace(',', ".");
            parse_finite(&cleaned)
        }
        _ => None,
    }
}

/// 宿題提出率の列で使うパース
///
/// `parse_plain_number`に加えて`%`記号を除去します。
pub fn parse_percent_text(value: &CellValue) -> Option<f64> {
    match value {
        CellValue::Number(n) => Some(*n),
        CellValue::Text(s) => {
            let cleaned = s
                .trim()
                .replace('\u{a0}', "")
                .replace(',', ".")
                .replace('%', "");
            parse_finite(&cleaned)
        }
        _ => None,
    }
}

/// 厳密なパース（数値セル、または数値として読める文字列のみ）
pub fn parse_strict_number(value: &CellValue) -> Option<f64> {
    match value {
        CellValue::Number(n) => Some(*n),
        CellValue::Text(s) => parse_finite(s.trim()),
        CellValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

/// 0〜1の値を割合とみなしてパーセントに変換
pub fn normalize_percentage(value: f64) -> f64 {
    if (0.0..=1.0).contains(&value) {
        value * 100.0
    } else {
        value
    }
}

fn parse_finite(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|n| n.is_finite())
}
