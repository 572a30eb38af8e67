//! Public API Types
//!
//! 公開APIで使用する列挙型を定義するモジュール。

use std::fmt;
use std::str::FromStr;

use crate::error::ReportError;

/// レポートの種類
///
/// メインメニューの各ボタンに対応します。`as_str()`の値はそのまま
/// Telegramのcallback dataとして使われます。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ReportKind {
    /// 時間割（グループ別・科目別のコマ数）
    Schedule,

    /// 授業テーマの書式チェック
    Lessons,

    /// 宿題評価1、または授業評価3未満の学生
    Students,

    /// 講師別の出席率
    Attendance,

    /// 講師による宿題チェック率（月/週）
    HomeworkCheck,

    /// 学生の宿題提出率
    HomeworkSubmit,

    /// AIアシスタント（ファイル分析ではない）
    Ai,
}

impl ReportKind {
    /// メニューに並ぶ順序
    pub const ALL: [ReportKind; 7] = [
        ReportKind::Schedule,
        ReportKind::Lessons,
        ReportKind::Students,
        ReportKind::Attendance,
        ReportKind::HomeworkCheck,
        ReportKind::HomeworkSubmit,
        ReportKind::Ai,
    ];

    /// callback data用の識別子
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::Schedule => "schedule",
            ReportKind::Lessons => "lessons",
            ReportKind::Students => "students",
            ReportKind::Attendance => "attendance",
            ReportKind::HomeworkCheck => "homework_check",
            ReportKind::HomeworkSubmit => "homework_submit",
            ReportKind::Ai => "ai",
        }
    }

    /// スプレッドシートを解析するレポートかどうか
    pub fn is_file_report(&self) -> bool {
        !matches!(self, ReportKind::Ai)
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportKind {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReportKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ReportError::Config(format!("Unknown report kind: '{}'", s)))
    }
}

/// 宿題チェックレポートの集計期間
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HomeworkPeriod {
    /// 1か月（デフォルト）
    #[default]
    Month,

    /// 1週間
    Week,
}

impl HomeworkPeriod {
    /// callback data用の識別子
    pub fn callback_data(&self) -> &'static str {
        match self {
            HomeworkPeriod::Month => "hw_check_month",
            HomeworkPeriod::Week => "hw_check_week",
        }
    }

    /// callback dataから期間を復元
    pub fn from_callback(data: &str) -> Option<Self> {
        match data {
            "hw_check_month" => Some(HomeworkPeriod::Month),
            "hw_check_week" => Some(HomeworkPeriod::Week),
            _ => None,
        }
    }

    /// 「за …」に続く対格形（месяц / неделю）
    pub fn accusative(&self) -> &'static str {
        match self {
            HomeworkPeriod::Month => "месяц",
            HomeworkPeriod::Week => "неделю",
        }
    }
}

impl FromStr for HomeworkPeriod {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "month" => Ok(HomeworkPeriod::Month),
            "week" => Ok(HomeworkPeriod::Week),
            other => Err(ReportError::Config(format!(
                "Unknown homework period: '{}' (expected 'month' or 'week')",
                other
            ))),
        }
    }
}

/// シート選択方式
///
/// 解析対象のシートを選択する方法を指定します。
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SheetSelector {
    /// インデックス指定（0始まり）
    ///
    /// 例: `SheetSelector::Index(0)` は最初のシートを選択（デフォルト）
    Index(usize),

    /// シート名指定
    ///
    /// 例: `SheetSelector::Name("Лист1".to_string())`
    Name(String),
}

impl Default for SheetSelector {
    fn default() -> Self {
        SheetSelector::Index(0)
    }
}

/// Telegramメッセージの書式モード
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseMode {
    /// 書式なし
    #[default]
    Plain,

    /// 旧Markdown（`*bold*`のみ使用）
    Markdown,

    /// MarkdownV2（全特殊文字のエスケープが必要）
    MarkdownV2,
}

impl ParseMode {
    /// Bot APIの`parse_mode`パラメータ値（Plainの場合は`None`）
    pub fn as_api_str(&self) -> Option<&'static str> {
        match self {
            ParseMode::Plain => None,
            ParseMode::Markdown => Some("Markdown"),
            ParseMode::MarkdownV2 => Some("MarkdownV2"),
        }
    }
}
