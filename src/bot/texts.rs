//! 利用者に表示する文言

use crate::api::{HomeworkPeriod, ParseMode, ReportKind};
use crate::error::ReportError;
use crate::telegram::OutgoingMessage;

use super::keyboards;

pub const GREETING: &str = "👋 Привет! Я бот для анализа учебных отчётов.\n\nВыберите нужный отчёт:";
pub const START_HINT: &str = "Нажмите кнопку /start для быстрого открытия меню.";

pub const HELP: &str = "🤖 *Справка по боту*

*Доступные отчёты:*

📅 *Отчет по расписанию* — файл Расписание групп.xlsx
📚 *Отчет по темам занятий* — файл Темы уроков.xls
👥 *Отчет по студентам* — файл Отчет по студентам.xls
📊 *Отчет по посещаемости* — файл Посещаемость по преподавателям.xlsx
✅ *Отчет по проверке ДЗ* — файл Отчет по домашним заданиям.xlsx
📝 *Отчет по сдаче ДЗ* — файл Отчет по студентам.xls

*Как пользоваться:*
1. Нажмите на нужный отчёт
2. Загрузите соответствующий Excel-файл
3. Получите результат

Команды:
/start — главное меню
/help — эта справка
/cancel — отменить текущую операцию";

pub const SELECT_REPORT_FIRST: &str = "❌ Сначала выберите отчёт из меню.";
pub const NOT_EXCEL: &str = "❌ Пожалуйста, отправьте файл Excel (.xls или .xlsx).";
pub const FILE_RECEIVED: &str = "📥 Файл получен, обрабатываю...";
pub const ALREADY_PROCESSED: &str = "❗ Этот файл уже обрабатывается или был обработан.";
pub const DONE: &str = "✅ Готово! Выберите следующий отчёт:";
pub const DOWNLOAD_FAILED: &str = "❌ Произошла ошибка при обработке файла.";
pub const CANCELLED: &str = "❌ Операция отменена.";

pub const AI_SELECTED: &str =
    "🤖 Выбран AI-помощник. Опишите задачу — кратко или подробно, а я постараюсь помочь.";
pub const AI_EMPTY_QUERY: &str = "❗ Пожалуйста, напишите запрос текстом.";
pub const AI_SENDING: &str = "🔎 Отправляю запрос в AI, ожидайте...";
pub const AI_SENDING_WITH_REPORT: &str = "🔎 Отправляю запрос в AI с контекстом отчёта...";
pub const AI_SENDING_WITH_MESSAGE: &str = "🔎 Отправляю запрос в AI с контекстом сообщения...";
pub const AI_FAILED: &str = "❌ Ошибка при обращении к AI. Попробуйте позже.";
pub const AI_EMPTY_REPLY: &str = "❌ AI вернул пустой ответ.";
pub const AI_NOT_CONFIGURED: &str = "❌ AI-помощник не настроен. Обратитесь к администратору бота.";
pub const AI_DONE: &str = "Готово — выберите следующую опцию:";
pub const AI_ONLY_EXCEL: &str = "❗ Поддерживаются только файлы .xls или .xlsx для анализа.";
pub const AI_FILE_RECEIVED: &str = "📥 Файл получен, скачиваю и анализирую...";

pub const PERIOD_PROMPT: &str = "✅ Выберите период для проверки домашних заданий:";

/// 期間を選んだ後の案内
pub fn period_chosen(period: HomeworkPeriod) -> String {
    format!(
        "✅ Вы выбрали проверку за {}.\n\n\
         Теперь загрузите файл проверки домашних заданий (Excel).\n\
         Файл должен содержать информацию по преподавателям и проверенным заданиям.",
        period.accusative()
    )
}

/// レポートを選んだときの案内
pub fn report_prompt(kind: ReportKind) -> OutgoingMessage {
    match kind {
        ReportKind::Schedule => OutgoingMessage::plain(
            "📅 Загрузите файл с расписанием групп (Расписание групп.xlsx).\n\
             Бот посчитает количество пар по каждой дисциплине для каждой группы.",
        ),
        ReportKind::Lessons => OutgoingMessage::plain(
            "📚 *Отчет по темам занятий*\n\n\
             Загрузите файл *Темы уроков.xls*\n\n\
             Бот проверит формат тем:\n\
             `Урок № X. Тема: ...`\n\
             Некорректные темы будут перечислены.",
        )
        .with_parse_mode(ParseMode::Markdown),
        ReportKind::Students => OutgoingMessage::plain(
            "👥 *Отчет по студентам*\n\n\
             Загрузите файл:\n\
             • Отчет по студентам.xls или .xlsx\n\n\
             Бот найдёт студентов с:\n\
             • ДЗ = 1 *или*\n\
             • Классная работа < 3",
        )
        .with_parse_mode(ParseMode::Markdown),
        ReportKind::Attendance => OutgoingMessage::plain(
            "📊 Загрузите файл посещаемости (Excel).\n\
             Файл должен содержать информацию по преподавателям и их посещаемость.",
        ),
        ReportKind::HomeworkCheck => {
            OutgoingMessage::plain(PERIOD_PROMPT).with_markup(keyboards::period_keyboard())
        }
        ReportKind::HomeworkSubmit => OutgoingMessage::plain(
            "📝 Загрузите файл сданных домашних заданий (Excel).\n\
             Файл должен содержать информацию по студентам,\n\
             группам и проценту выполненных заданий.",
        ),
        ReportKind::Ai => OutgoingMessage::plain(AI_SELECTED),
    }
}

/// 列の診断メッセージ（宿題チェックで列を特定できなかった場合）
pub fn unrecognized_headers(headers: &[String]) -> String {
    let mut lines = vec![
        "Не удалось автоматически определить колонки 'Получено' и/или 'Проверено'.".to_string(),
        "Найденные заголовки:".to_string(),
    ];
    lines.extend(headers.iter().enumerate().map(|(i, h)| format!("{}: {}", i, h)));
    lines.push("Если хотите, пришлите первый лист xlsx или укажите номер строки заголовка.".to_string());
    lines.join("\n")
}

/// 拒否理由の文言
///
/// 内部エラー（`is_rejection() == false`）の場合は`None`。
pub fn rejection(kind: ReportKind, error: &ReportError) -> Option<String> {
    let text = match error {
        ReportError::TooFewColumns { .. } => "❌ Файл должен содержать минимум 2 колонки.".to_string(),
        ReportError::MissingColumn { column } => match kind {
            ReportKind::Schedule => "❌ В файле не найдена колонка 'Группа'. Файл некорректный.".to_string(),
            ReportKind::Students => "❌ Нет нужных колонок в файле".to_string(),
            ReportKind::HomeworkSubmit => {
                "❌ Не удалось найти колонку 'Percentage Homework' в файле.".to_string()
            }
            _ => format!("❌ В файле не найдена колонка '{}'.", column),
        },
        ReportError::MissingScheduleDays => "❌ Не найдены колонки с расписанием по дням.".to_string(),
        ReportError::NoTopicColumn => "❌ Не удалось определить колонку с темами уроков.".to_string(),
        ReportError::NoTopics => "❌ Нет тем уроков в выбранной колонке.".to_string(),
        ReportError::UnrecognizedHeaders { headers } => unrecognized_headers(headers),
        _ => return None,
    };
    Some(text)
}

/// 内部エラー時の文言
pub fn internal_error(kind: ReportKind) -> &'static str {
    match kind {
        ReportKind::Schedule => "❌ Произошла ошибка при обработке файла. Попробуйте снова.",
        ReportKind::Lessons => "❌ Ошибка при чтении файла.",
        ReportKind::Students => "❌ Ошибка при обработке файла.",
        _ => "❌ Ошибка обработки файла. Подробности в логах.",
    }
}

/// AIによるファイル解析の失敗
pub fn ai_file_failed(error: &dyn std::fmt::Display) -> String {
    format!("❌ Ошибка при анализе файла: {}", error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_chosen() {
        assert!(period_chosen(HomeworkPeriod::Week).starts_with("✅ Вы выбрали проверку за неделю.\n\n"));
    }

    #[test]
    fn test_homework_check_prompt_has_period_keyboard() {
        let message = report_prompt(ReportKind::HomeworkCheck);
        assert_eq!(message.text, PERIOD_PROMPT);
        assert_eq!(message.reply_markup, Some(keyboards::period_keyboard()));
    }

    #[test]
    fn test_markdown_prompts() {
        assert_eq!(report_prompt(ReportKind::Lessons).parse_mode, ParseMode::Markdown);
        assert_eq!(report_prompt(ReportKind::Attendance).parse_mode, ParseMode::Plain);
    }

    #[test]
    fn test_unrecognized_headers() {
        let text = unrecognized_headers(&["фио".to_string(), "выдано".to_string()]);
        assert_eq!(
            text,
            "Не удалось автоматически определить колонки 'Получено' и/или 'Проверено'.\n\
             Найденные заголовки:\n\
             0: фио\n\
             1: выдано\n\
             Если хотите, пришлите первый лист xlsx или укажите номер строки заголовка."
        );
    }

    #[test]
    fn test_rejection_per_kind() {
        let missing = ReportError::MissingColumn {
            column: "Группа".to_string(),
        };
        assert_eq!(
            rejection(ReportKind::Schedule, &missing).unwrap(),
            "❌ В файле не найдена колонка 'Группа'. Файл некорректный."
        );
        assert_eq!(
            rejection(ReportKind::Students, &missing).unwrap(),
            "❌ Нет нужных колонок в файле"
        );
        assert!(rejection(ReportKind::Attendance, &ReportError::Config("x".to_string())).is_none());
    }

    #[test]
    fn test_internal_error_texts() {
        assert_eq!(
            internal_error(ReportKind::Attendance),
            "❌ Ошибка обработки файла. Подробности в логах."
        );
        assert_eq!(internal_error(ReportKind::Lessons), "❌ Ошибка при чтении файла.");
    }
}
