//! 教員別の宿題チェック率レポート
//!
//! 「Получено / Проверено」の列は月・週の2組あることが多く、
//! 見出しが2行に分かれている（上段に期間、下段に列名）ファイルもあります。
//! そのため見出しレイアウトを複数試し、期間ごとに列の組を割り当てます。

use super::columns::{contains_any, first_matching, TEACHER_KEYWORDS};
use super::{threshold_label, ReportOutput, ReportSummary};
use crate::api::{HomeworkPeriod, ParseMode, ReportKind};
use crate::builder::AnalysisConfig;
use crate::error::ReportError;
use crate::formatter::{parse_plain_number, CellFormatter};
use crate::output::{pack_messages, REPORT_CHUNK_LIMIT};
use crate::parser::{HeaderLayout, SheetGrid};
use crate::types::Table;

const ISSUED_KEYWORDS: &[&str] = &["получ"];
const CHECKED_KEYWORDS: &[&str] = &["провер"];

/// 診断メッセージに含める見出しの最大数
const DIAGNOSTIC_HEADER_LIMIT: usize = 12;

/// 試行する見出しレイアウト（優先順）
const LAYOUTS: [HeaderLayout; 3] = [
    HeaderLayout::Row(0),
    HeaderLayout::Rows(0, 1),
    HeaderLayout::Row(1),
];

/// 1つの期間に対応する列の組
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct PeriodColumns {
    issued: Option<usize>,
    checked: Option<usize>,
}

/// 月・週それぞれの列の割り当て
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct ColumnPlan {
    month: PeriodColumns,
    week: PeriodColumns,
}

impl ColumnPlan {
    fn for_period(&self, period: HomeworkPeriod) -> PeriodColumns {
        match period {
            HomeworkPeriod::Month => self.month,
            HomeworkPeriod::Week => self.week,
        }
    }
}

/// 問題のある教員1名分
#[derive(Debug, Clone, PartialEq)]
struct CheckRow {
    name: String,
    issued: i64,
    checked: i64,
    percent: f64,
}

fn period_of(label: &str) -> Option<HomeworkPeriod> {
    if label.contains("месяц") {
        Some(HomeworkPeriod::Month)
    } else if label.contains("недел") {
        Some(HomeworkPeriod::Week)
    } else {
        None
    }
}

/// 見出しレイアウトを選ぶ
///
/// キーワードと期間の両方を含むレイアウトを最優先し、
/// 次にキーワードだけを含む最初のレイアウト、最後に1行目の見出しを使います。
fn choose_table(grid: &SheetGrid) -> Table {
    let mut keywords_only: Option<Table> = None;

    for layout in LAYOUTS {
        let table = grid.to_table(layout);
        let headers = table.lowercase_headers();
        let has_keywords = first_matching(&headers, ISSUED_KEYWORDS).is_some()
            && first_matching(&headers, CHECKED_KEYWORDS).is_some();
        let has_period = headers.iter().any(|h| period_of(h).is_some());

        if has_keywords && has_period {
            tracing::debug!(?layout, "homework check header layout with periods");
            return table;
        }
        if has_keywords && keywords_only.is_none() {
            keywords_only = Some(table);
        }
    }

    keywords_only.unwrap_or_else(|| grid.to_table(HeaderLayout::Row(0)))
}

/// 見出しから期間ごとの列の組を決める
fn plan_columns(headers: &[String]) -> ColumnPlan {
    let mut plan = ColumnPlan::default();
    let mut other_issued = Vec::new();
    let mut other_checked = Vec::new();

    for (i, label) in headers.iter().enumerate() {
        let period = period_of(label);
        if contains_any(label, ISSUED_KEYWORDS) {
            match period {
                Some(HomeworkPeriod::Month) => plan.month.issued = Some(i),
                Some(HomeworkPeriod::Week) => plan.week.issued = Some(i),
                None => other_issued.push(i),
            }
        }
        if contains_any(label, CHECKED_KEYWORDS) {
            match period {
                Some(HomeworkPeriod::Month) => plan.month.checked = Some(i),
                Some(HomeworkPeriod::Week) => plan.week.checked = Some(i),
                None => other_checked.push(i),
            }
        }
    }

    if plan.month.issued.is_none() {
        plan.month.issued = other_issued.first().copied();
    }
    if plan.month.checked.is_none() {
        plan.month.checked = match plan.month.issued {
            Some(issued) => other_checked
                .iter()
                .copied()
                .min_by_key(|&c| c.abs_diff(issued)),
            None => other_checked.first().copied(),
        };
    }

    if plan.week.issued.is_none() {
        plan.week.issued = second_or_other(&other_issued, plan.month.issued);
    }
    if plan.week.checked.is_none() {
        plan.week.checked = second_or_other(&other_checked, plan.month.checked);
    }

    plan
}

/// 未割り当て列の2番目、なければ月に使っていない最初の列
fn second_or_other(candidates: &[usize], month: Option<usize>) -> Option<usize> {
    if candidates.len() >= 2 {
        return Some(candidates[1]);
    }
    let month = month?;
    candidates.iter().copied().find(|&c| c != month)
}

pub(crate) fn analyze(grid: &SheetGrid, config: &AnalysisConfig) -> Result<ReportOutput, ReportError> {
    let table = choose_table(grid);
    let headers = table.lowercase_headers();

    if first_matching(&headers, ISSUED_KEYWORDS).is_none()
        || first_matching(&headers, CHECKED_KEYWORDS).is_none()
    {
        return Err(ReportError::UnrecognizedHeaders {
            headers: headers.into_iter().take(DIAGNOSTIC_HEADER_LIMIT).collect(),
        });
    }

    let teacher_col = first_matching(&headers, TEACHER_KEYWORDS).unwrap_or(0);
    let plan = plan_columns(&headers);
    let period = config.homework_period;
    let selected = plan.for_period(period);
    tracing::debug!(teacher_col, ?plan, ?period, "homework check columns detected");

    let mut flagged = Vec::new();
    match (selected.issued, selected.checked) {
        (Some(issued_col), Some(checked_col)) => {
            let formatter = CellFormatter::new();
            for row in 0..table.row_count() {
                let Some(name) = formatter.format_trimmed(table.cell(row, teacher_col)) else {
                    continue;
                };
                let Some(issued) = parse_plain_number(table.cell(row, issued_col)) else {
                    continue;
                };
                let Some(checked) = parse_plain_number(table.cell(row, checked_col)) else {
                    continue;
                };
                if issued <= 0.0 {
                    continue;
                }
                let percent = checked / issued * 100.0;
                if percent < config.homework_check_threshold {
                    flagged.push(CheckRow {
                        name,
                        issued: issued.trunc() as i64,
                        checked: checked.trunc() as i64,
                        percent,
                    });
                }
            }
        }
        _ => tracing::warn!(?period, "no issued/checked column pair for the selected period"),
    }
    flagged.sort_by(|a, b| a.percent.total_cmp(&b.percent));

    let period_text = period.accusative();
    let threshold = threshold_label(config.homework_check_threshold);
    let mut lines = vec![format!(
        "✅ Отчет по проверке домашних заданий за {}:",
        period_text
    )];
    if flagged.is_empty() {
        lines.push(format!(
            "✅ Все преподаватели проверили ≥ {}% заданий за {}.",
            threshold, period_text
        ));
    } else {
        lines.push(format!(
            "⚠️ Преподавателей с проверкой < {}%: {}",
            threshold,
            flagged.len()
        ));
        lines.extend(flagged.iter().map(|t| {
            format!(
                "• {}: Получено {} | Проверено {} | {:.1}%",
                t.name, t.issued, t.checked, t.percent
            )
        }));
    }

    Ok(ReportOutput {
        kind: ReportKind::HomeworkCheck,
        messages: pack_messages(&lines, REPORT_CHUNK_LIMIT, ParseMode::Plain),
        summary: ReportSummary {
            rows_scanned: table.row_count(),
            flagged: flagged.len(),
        },
    })
}
