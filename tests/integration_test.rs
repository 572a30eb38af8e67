//! Integration Tests for eduxlsx
//!
//! 各レポートを、rust_xlsxwriterで生成したワークブックに対して
//! 公開API（`AnalyzerBuilder` / `Analyzer`）経由で実行します。

use rust_xlsxwriter::*;
use std::io::Cursor;
use eduxlsx::{AnalyzerBuilder, HomeworkPeriod, ParseMode, ReportError, ReportKind, SheetSelector};

// Helper module for generating test fixtures
mod fixtures {
    use super::*;

    /// 1行目を見出しとして文字列セルを書き込む
    pub fn string_sheet(rows: &[&[&str]]) -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        for (r, row) in rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                if !value.is_empty() {
                    worksheet.write_string(r as u32, c as u16, *value)?;
                }
            }
        }
        Ok(workbook.save_to_buffer()?)
    }

    /// 講師別の出席率（数値は0〜1の割合）
    pub fn generate_attendance() -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();

        worksheet.write_string(0, 0, "ФИО преподавателя")?;
        worksheet.write_string(0, 1, "Средняя посещаемость")?;

        let data = [("Иванов И.И.", 0.35), ("Петров П.П.", 0.8), ("Сидоров С.С.", 0.125)];
        for (i, (name, value)) in data.iter().enumerate() {
            worksheet.write_string(i as u32 + 1, 0, *name)?;
            worksheet.write_number(i as u32 + 1, 1, *value)?;
        }

        Ok(workbook.save_to_buffer()?)
    }

    /// 月・週の2組の列を持つ、見出し2行の宿題チェック表
    pub fn generate_homework_check() -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();

        worksheet.write_string(0, 0, "ФИО преподавателя")?;
        worksheet.write_string(0, 1, "Месяц")?;
        worksheet.write_string(0, 3, "Неделя")?;
        worksheet.write_string(1, 1, "Получено")?;
        worksheet.write_string(1, 2, "Проверено")?;
        worksheet.write_string(1, 3, "Получено")?;
        worksheet.write_string(1, 4, "Проверено")?;

        let data = [
            ("Иванов И.И.", [10.0, 5.0, 4.0, 4.0]),
            ("Петров П.П.", [20.0, 19.0, 10.0, 2.0]),
        ];
        for (i, (name, values)) in data.iter().enumerate() {
            let row = i as u32 + 2;
            worksheet.write_string(row, 0, *name)?;
            for (j, value) in values.iter().enumerate() {
                worksheet.write_number(row, j as u16 + 1, *value)?;
            }
        }

        Ok(workbook.save_to_buffer()?)
    }

    /// 2枚のシートを持つワークブック
    pub fn generate_two_sheets() -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();

        let first = workbook.add_worksheet();
        first.set_name("Сводка")?;
        first.write_string(0, 0, "Пусто")?;

        let second = workbook.add_worksheet();
        second.set_name("Посещаемость")?;
        second.write_string(0, 0, "Преподаватель")?;
        second.write_string(0, 1, "Посещаемость, %")?;
        second.write_string(1, 0, "Козлова А.А.")?;
        second.write_number(1, 1, 12.0)?;

        Ok(workbook.save_to_buffer()?)
    }
}

#[test]
fn test_attendance_report() {
    let data = fixtures::generate_attendance().unwrap();
    let analyzer = AnalyzerBuilder::new().build().unwrap();

    let output = analyzer
        .analyze(ReportKind::Attendance, Cursor::new(data))
        .unwrap();

    assert_eq!(output.kind, ReportKind::Attendance);
    assert_eq!(output.summary.rows_scanned, 3);
    assert_eq!(output.summary.flagged, 2);
    assert_eq!(
        output.joined_text(),
        "📊 Отчет по посещаемости преподавателей:\n\
         ⚠️ Преподавателей с посещаемостью < 40%: 2\n\
         • Сидоров С.С.: 12.5%\n\
         • Иванов И.И.: 35.0%"
    );
}

#[test]
fn test_attendance_custom_threshold() {
    let data = fixtures::generate_attendance().unwrap();
    let analyzer = AnalyzerBuilder::new()
        .with_attendance_threshold(10.0)
        .build()
        .unwrap();

    let output = analyzer
        .analyze_bytes(ReportKind::Attendance, &data)
        .unwrap();

    assert_eq!(output.summary.flagged, 0);
    assert!(output
        .joined_text()
        .ends_with("✅ Все преподаватели имеют посещаемость ≥ 10%."));
}

#[test]
fn test_homework_check_month_and_week() {
    let data = fixtures::generate_homework_check().unwrap();
    let analyzer = AnalyzerBuilder::new().build().unwrap();

    let month = analyzer
        .analyze_bytes(ReportKind::HomeworkCheck, &data)
        .unwrap();
    assert_eq!(
        month.joined_text(),
        "✅ Отчет по проверке домашних заданий за месяц:\n\
         ⚠️ Преподавателей с проверкой < 70%: 1\n\
         • Иванов И.И.: Получено 10 | Проверено 5 | 50.0%"
    );

    let week = analyzer
        .with_homework_period(HomeworkPeriod::Week)
        .analyze_bytes(ReportKind::HomeworkCheck, &data)
        .unwrap();
    assert_eq!(
        week.joined_text(),
        "✅ Отчет по проверке домашних заданий за неделю:\n\
         ⚠️ Преподавателей с проверкой < 70%: 1\n\
         • Петров П.П.: Получено 10 | Проверено 2 | 20.0%"
    );
}

#[test]
fn test_homework_check_unrecognized_headers() {
    let data = fixtures::string_sheet(&[&["ФИО", "Выдано", "Сдано"], &["Иванов", "1", "1"]]).unwrap();
    let analyzer = AnalyzerBuilder::new().build().unwrap();

    match analyzer.analyze_bytes(ReportKind::HomeworkCheck, &data) {
        Err(ReportError::UnrecognizedHeaders { headers }) => {
            assert_eq!(headers, vec!["фио", "выдано", "сдано"]);
        }
        other => panic!("Expected UnrecognizedHeaders, got {:?}", other),
    }
}

#[test]
fn test_homework_submit_report() {
    let data = fixtures::string_sheet(&[
        &["ФИО", "Группа", "Percentage Homework"],
        &["Смирнов", "101", "45%"],
        &["Кузнецова", "102", "95%"],
        &["Орлов", "", "12,5"],
        &["Белова", "101", "н/д"],
    ])
    .unwrap();
    let analyzer = AnalyzerBuilder::new().build().unwrap();

    let output = analyzer
        .analyze_bytes(ReportKind::HomeworkSubmit, &data)
        .unwrap();

    assert_eq!(output.summary.flagged, 2);
    assert_eq!(
        output.joined_text(),
        "📝 Отчет по сданным домашним заданиям:\n\
         ⚠️ Студентов с выполнением < 70%: 2\n\
         • Орлов: 12.5%\n\
         • Смирнов (101): 45.0%"
    );
}

#[test]
fn test_homework_submit_missing_column() {
    let data = fixtures::string_sheet(&[&["ФИО", "Группа"], &["Смирнов", "101"]]).unwrap();
    let analyzer = AnalyzerBuilder::new().build().unwrap();

    let result = analyzer.analyze_bytes(ReportKind::HomeworkSubmit, &data);
    assert!(matches!(
        result,
        Err(ReportError::MissingColumn { ref column }) if column == "Percentage Homework"
    ));
}

#[test]
fn test_students_report_markdown_v2() {
    let data = fixtures::string_sheet(&[
        &["FIO", "Группа", "Homework", "Classroom"],
        &["Иванов Иван", "ИС-21", "1", "4"],
        &["Петрова Анна", "ИС-22", "5", "5"],
        &["Сидоров Олег", "", "4", "2.5"],
    ])
    .unwrap();
    let analyzer = AnalyzerBuilder::new().build().unwrap();

    let output = analyzer
        .analyze_bytes(ReportKind::Students, &data)
        .unwrap();

    assert_eq!(output.summary.flagged, 2);
    assert!(output
        .messages
        .iter()
        .all(|m| m.parse_mode == ParseMode::MarkdownV2));
    let text = output.joined_text();
    assert!(text.starts_with("👥 *Отчет по студентам с проблемами*"));
    assert!(text.contains("Найдено 2 студента:"));
    assert!(text.contains("• *Иванов Иван* \\(ИС\\-21\\)"));
    assert!(text.contains("• *Сидоров Олег* \\(\\-\\)"));
    assert!(!text.contains("Петрова"));
}

#[test]
fn test_students_missing_columns() {
    let data = fixtures::string_sheet(&[&["ФИО", "ДЗ"], &["Иванов", "1"]]).unwrap();
    let analyzer = AnalyzerBuilder::new().build().unwrap();

    let err = analyzer
        .analyze_bytes(ReportKind::Students, &data)
        .unwrap_err();
    assert!(err.is_rejection());
}

#[test]
fn test_lessons_report() {
    let data = fixtures::string_sheet(&[
        &["Дата", "Тема урока"],
        &["01.09", "Урок № 1. Тема: Введение"],
        &["02.09", "Введение в базы данных"],
        &["03.09", "урок №3 тема: Индексы"],
    ])
    .unwrap();
    let analyzer = AnalyzerBuilder::new().build().unwrap();

    let output = analyzer
        .analyze_bytes(ReportKind::Lessons, &data)
        .unwrap();

    assert_eq!(output.summary.rows_scanned, 3);
    assert_eq!(output.summary.flagged, 1);
    let text = output.joined_text();
    assert!(text.contains("Корректных тем: 2"));
    assert!(text.contains("Некорректных тем: 1"));
    assert!(text.contains("• \\[строка 3\\] Введение в базы данных"));
}

#[test]
fn test_lessons_without_topics() {
    let data = fixtures::string_sheet(&[&["Тема урока"]]).unwrap();
    let analyzer = AnalyzerBuilder::new().build().unwrap();

    let result = analyzer.analyze_bytes(ReportKind::Lessons, &data);
    assert!(matches!(result, Err(ReportError::NoTopics)));
}

#[test]
fn test_schedule_report() {
    let data = fixtures::string_sheet(&[
        &["Группа", "Курс", "Понедельник", "Пары", "Вторник", "Пары2"],
        &[
            "101",
            "1",
            "",
            "Предмет: Математика\nПредмет: Физика",
            "",
            "Предмет: Математика",
        ],
        &["102", "1", "", "", "", ""],
    ])
    .unwrap();
    let analyzer = AnalyzerBuilder::new().build().unwrap();

    let output = analyzer
        .analyze_bytes(ReportKind::Schedule, &data)
        .unwrap();

    assert_eq!(output.summary.flagged, 3);
    assert!(output
        .messages
        .iter()
        .all(|m| m.parse_mode == ParseMode::Markdown));
    let text = output.joined_text();
    assert!(text.contains("*Группа 101*:\n• Математика: *2 пар*\n• Физика: *1 пар*"));
    assert!(text.contains("*Группа 102*: Нет занятий в расписании."));
    assert!(text.ends_with("*Общее количество пар по всем группам: 3*"));
}

#[test]
fn test_schedule_without_group_column() {
    let data = fixtures::generate_attendance().unwrap();
    let analyzer = AnalyzerBuilder::new().build().unwrap();

    let result = analyzer.analyze_bytes(ReportKind::Schedule, &data);
    assert!(matches!(result, Err(ReportError::MissingColumn { .. })));
}

#[test]
fn test_sheet_selection_by_name() {
    let data = fixtures::generate_two_sheets().unwrap();
    let analyzer = AnalyzerBuilder::new()
        .with_sheet_selector(SheetSelector::Name("Посещаемость".to_string()))
        .build()
        .unwrap();

    let output = analyzer
        .analyze_bytes(ReportKind::Attendance, &data)
        .unwrap();
    assert!(output.joined_text().contains("• Козлова А.А.: 12.0%"));
}

#[test]
fn test_sheet_not_found() {
    let data = fixtures::generate_two_sheets().unwrap();
    let analyzer = AnalyzerBuilder::new()
        .with_sheet_selector(SheetSelector::Index(5))
        .build()
        .unwrap();

    let result = analyzer.analyze_bytes(ReportKind::Attendance, &data);
    assert!(matches!(result, Err(ReportError::Config(_))));
}

#[test]
fn test_ai_kind_is_not_a_spreadsheet_report() {
    let data = fixtures::generate_attendance().unwrap();
    let analyzer = AnalyzerBuilder::new().build().unwrap();

    let result = analyzer.analyze_bytes(ReportKind::Ai, &data);
    assert!(matches!(result, Err(ReportError::Config(_))));
}

#[test]
fn test_workbook_digest_covers_every_sheet() {
    let data = fixtures::generate_two_sheets().unwrap();

    let digest = eduxlsx::ai::workbook_digest(&data, 1024 * 1024).unwrap();

    assert!(digest.starts_with("--- Sheet: Сводка ---\n"));
    assert!(digest.contains("--- Sheet: Посещаемость ---\nПреподаватель,\"Посещаемость, %\"\nКозлова А.А.,12\n"));
}
