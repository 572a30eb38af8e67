//! パフォーマンステスト
//!
//! 大きめのシートでも応答が実用的な時間で返ることを確認します。
//! フィクスチャはrust_xlsxwriterでメモリ上に生成します。
//!
//! 注意: 時間はCI環境に左右されるため、上限には十分な余裕を持たせています。

use rust_xlsxwriter::{Workbook, XlsxError};
use std::time::{Duration, Instant};
use eduxlsx::{AnalyzerBuilder, ReportKind};

/// 講師`rows`人分の出席率シート
fn generate_attendance(rows: u32) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.write_string(0, 0, "ФИО преподавателя")?;
    worksheet.write_string(0, 1, "Посещаемость")?;
    for i in 0..rows {
        worksheet.write_string(i + 1, 0, format!("Преподаватель {}", i))?;
        worksheet.write_number(i + 1, 1, f64::from(i % 100) / 100.0)?;
    }
    Ok(workbook.save_to_buffer()?)
}

/// 時間割`groups`グループ分（6日 × 4コマ）
fn generate_schedule(groups: u32) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.write_string(0, 0, "Группа")?;
    for day in 0..6u16 {
        worksheet.write_string(0, 2 + day * 2, format!("Время {}", day))?;
        worksheet.write_string(0, 3 + day * 2, format!("День {}", day))?;
    }
    let subjects = ["Математика", "Физика", "История", "Информатика"];
    for g in 0..groups {
        worksheet.write_string(g + 1, 0, format!("Г-{}", g))?;
        for day in 0..6u16 {
            let cell = subjects
                .iter()
                .map(|s| format!("Предмет: {}", s))
                .collect::<Vec<_>>()
                .join("\n");
            worksheet.write_string(g + 1, 3 + day * 2, cell)?;
        }
    }
    Ok(workbook.save_to_buffer()?)
}

#[test]
fn test_medium_attendance_sheet() {
    let data = generate_attendance(5_000).unwrap();
    let analyzer = AnalyzerBuilder::new().build().unwrap();

    let start = Instant::now();
    let output = analyzer
        .analyze_bytes(ReportKind::Attendance, &data)
        .unwrap();
    let elapsed = start.elapsed();

    // 0.00〜0.39 の40%が閾値未満
    assert_eq!(output.summary.flagged, 2_000);
    assert!(
        elapsed < Duration::from_secs(10),
        "attendance report took {:?}",
        elapsed
    );
}

#[test]
fn test_schedule_sheet() {
    let data = generate_schedule(200).unwrap();
    let analyzer = AnalyzerBuilder::new().build().unwrap();

    let start = Instant::now();
    let output = analyzer
        .analyze_bytes(ReportKind::Schedule, &data)
        .unwrap();
    let elapsed = start.elapsed();

    assert_eq!(output.summary.flagged, 200 * 6 * 4);
    assert!(elapsed < Duration::from_secs(10), "schedule report took {:?}", elapsed);
}

/// 大きなシート（手動実行用）
#[test]
#[ignore]
fn test_large_attendance_sheet() {
    let data = generate_attendance(100_000).unwrap();
    let analyzer = AnalyzerBuilder::new().build().unwrap();

    let start = Instant::now();
    let output = analyzer
        .analyze_bytes(ReportKind::Attendance, &data)
        .unwrap();
    let elapsed = start.elapsed();

    println!(
        "{} rows, {} messages in {:?}",
        output.summary.rows_scanned,
        output.messages.len(),
        elapsed
    );
    assert!(elapsed < Duration::from_secs(30));
}
