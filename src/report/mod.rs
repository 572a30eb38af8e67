//! Report Module
//!
//! シートの内容を解析し、Telegramへ送るメッセージ列を組み立てるモジュール。
//! レポート種別ごとにサブモジュールを1つ持ちます。

mod attendance;
mod columns;
mod homework_check;
mod homework_submit;
mod lessons;
mod schedule;
mod students;

use crate::api::ReportKind;
use crate::builder::AnalysisConfig;
use crate::error::ReportError;
use crate::output::OutgoingText;
use crate::parser::SheetGrid;

/// 解析結果の集計値
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportSummary {
    /// 走査したデータ行数
    pub rows_scanned: usize,

    /// 抽出した項目数（閾値未満の人数、不正なテーマ数、時間割ではコマ数）
    pub flagged: usize,
}

/// レポートの出力
#[derive(Debug, Clone, PartialEq)]
pub struct ReportOutput {
    /// レポート種別
    pub kind: ReportKind,

    /// 送信順のメッセージ
    pub messages: Vec<OutgoingText>,

    /// 集計値
    pub summary: ReportSummary,
}

impl ReportOutput {
    /// すべてのメッセージ本文を連結（CLI表示・テスト用）
    pub fn joined_text(&self) -> String {
        self.messages
            .iter()
            .map(|m| m.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// レポート種別に応じた解析を実行
pub(crate) fn run(
    kind: ReportKind,
    grid: &SheetGrid,
    config: &AnalysisConfig,
) -> Result<ReportOutput, ReportError> {
    match kind {
        ReportKind::Schedule => schedule::analyze(grid),
        ReportKind::Lessons => lessons::analyze(grid, config),
        ReportKind::Students => students::analyze(grid, config),
        ReportKind::Attendance => attendance::analyze(grid, config),
        ReportKind::HomeworkCheck => homework_check::analyze(grid, config),
        ReportKind::HomeworkSubmit => homework_submit::analyze(grid, config),
        ReportKind::Ai => Err(ReportError::Config(
            "AI requests are not spreadsheet reports".to_string(),
        )),
    }
}

/// 閾値の表示（整数ならそのまま、小数は短く）
pub(crate) fn threshold_label(value: f64) -> String {
    crate::formatter::format_number(value)
}

/// ロシア語の数詞に合わせて名詞の形を選ぶ
///
/// `forms`は「1・2〜4・5以上」の順（例: студент / студента / студентов）。
pub(crate) fn russian_plural(n: usize, forms: [&'static str; 3]) -> &'static str {
    let last_two = n % 100;
    let last = n % 10;
    if (11..=14).contains(&last_two) {
        forms[2]
    } else if last == 1 {
        forms[0]
    } else if (2..=4).contains(&last) {
        forms[1]
    } else {
        forms[2]
    }
}
