//! キーボード定義

use crate::api::{HomeworkPeriod, ReportKind};
use crate::telegram::types::{
    InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, ReplyKeyboardMarkup, ReplyMarkup,
};

/// ヘルプボタンのcallback data
pub const HELP: &str = "help";

/// 「最初から」ボタンのcallback data
pub const RESTART: &str = "restart";

fn button(text: &str, data: &str) -> InlineKeyboardButton {
    InlineKeyboardButton {
        text: text.to_string(),
        callback_data: data.to_string(),
    }
}

fn menu_label(kind: ReportKind) -> &'static str {
    match kind {
        ReportKind::Schedule => "📅 Отчет по расписанию",
        ReportKind::Lessons => "📚 Отчет по темам занятий",
        ReportKind::Students => "👥 Отчет по студентам",
        ReportKind::Attendance => "📊 Отчет по посещаемости",
        ReportKind::HomeworkCheck => "✅ Отчет по проверке ДЗ",
        ReportKind::HomeworkSubmit => "📝 Отчет по сдаче ДЗ",
        ReportKind::Ai => "🤖 AI-помощник",
    }
}

/// メインメニュー（1行に1ボタン）
pub fn main_menu() -> ReplyMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = ReportKind::ALL
        .iter()
        .map(|kind| vec![button(menu_label(*kind), kind.as_str())])
        .collect();
    rows.push(vec![button("❓ Справка", HELP)]);
    rows.push(vec![button("🔄 Начать заново", RESTART)]);

    ReplyMarkup::Inline(InlineKeyboardMarkup {
        inline_keyboard: rows,
    })
}

/// 宿題チェックの期間選択
pub fn period_keyboard() -> ReplyMarkup {
    ReplyMarkup::Inline(InlineKeyboardMarkup {
        inline_keyboard: vec![vec![
            button("📅 За месяц", HomeworkPeriod::Month.callback_data()),
            button("📆 За неделю", HomeworkPeriod::Week.callback_data()),
        ]],
    })
}

/// 入力欄の横に常に表示される`/start`ボタン
pub fn start_reply_keyboard() -> ReplyMarkup {
    ReplyMarkup::Keyboard(ReplyKeyboardMarkup {
        keyboard: vec![vec![KeyboardButton {
            text: "/start".to_string(),
        }]],
        resize_keyboard: true,
        one_time_keyboard: false,
    })
}
