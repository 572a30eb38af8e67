//! 宿題チェックレポートの再解析
//!
//! ボットが送った宿題チェックレポートに返信して質問された場合、
//! 本文から教員ごとの行を取り出し、簡単な質問にはローカルで答えます。

use regex::Regex;

/// `• Name: Получено I | Проверено C | P%` の行
const ENTRY_PATTERN: &str = r"(?m)^[•\-*]?\s*(?P<name>[^:\n]+):\s*[Пп]олучено\s*(?P<issued>[0-9]+)\s*\|\s*[Пп]роверено\s*(?P<checked>[0-9]+)\s*\|\s*(?P<pct>[0-9.,]+)%";

const LEAST_WORDS: &[&str] = &["кто меньше", "кто наименее", "least", "меньше всех провер"];
const TOP_WORDS: &[&str] = &["топ", "первые", "наиб", "лучше"];
const COUNT_WORDS: &[&str] = &["сколько"];

const TOP_COUNT: usize = 5;

/// モデルへ渡す行数の上限
const PROMPT_ENTRY_LIMIT: usize = 50;

/// レポートの1行分
#[derive(Debug, Clone, PartialEq)]
pub struct CheckEntry {
    /// 教員名
    pub name: String,
    /// 受け取った宿題数
    pub issued: u64,
    /// チェック済みの宿題数
    pub checked: u64,
    /// チェック率（%）
    pub percent: f64,
}

/// レポート本文から教員ごとの行を取り出す
pub fn parse_check_report(text: &str) -> Vec<CheckEntry> {
    let Ok(pattern) = Regex::new(ENTRY_PATTERN) else {
        return Vec::new();
    };
    pattern
        .captures_iter(text)
        .filter_map(|caps| {
            Some(CheckEntry {
                name: caps.name("name")?.as_str().trim().to_string(),
                issued: caps.name("issued")?.as_str().parse().ok()?,
                checked: caps.name("checked")?.as_str().parse().ok()?,
                percent: caps.name("pct")?.as_str().replace(',', ".").parse().ok()?,
            })
        })
        .collect()
}

fn asks(question: &str, words: &[&str]) -> bool {
    words.iter().any(|w| question.contains(w))
}

/// 簡単な質問にローカルで答える
///
/// 「誰が最も少ないか」「上位5名」「何人か」のいずれにも当たらなければ`None`。
pub fn answer_locally(question: &str, entries: &[CheckEntry]) -> Option<String> {
    if entries.is_empty() {
        return None;
    }
    let q = question.to_lowercase();

    if asks(&q, LEAST_WORDS) {
        let worst = entries
            .iter()
            .min_by(|a, b| a.percent.total_cmp(&b.percent))?;
        return Some(format!(
            "👎 Наименее проверял: {} — {}/{} ({:.1}%)",
            worst.name, worst.checked, worst.issued, worst.percent
        ));
    }

    if asks(&q, TOP_WORDS) {
        let mut sorted: Vec<&CheckEntry> = entries.iter().collect();
        sorted.sort_by(|a, b| b.percent.total_cmp(&a.percent));
        let mut lines = vec![format!("Топ {} преподавателей по % проверки:", TOP_COUNT)];
        lines.extend(sorted.iter().take(TOP_COUNT).map(|t| {
            format!("• {}: {}/{} ({:.1}%)", t.name, t.checked, t.issued, t.percent)
        }));
        return Some(lines.join("\n"));
    }

    if asks(&q, COUNT_WORDS) {
        return Some(format!("⚠️ Преподавателей с проблемой: {}", entries.len()));
    }

    None
}

/// 解析済みの行と質問をまとめたプロンプト
pub fn report_prompt(entries: &[CheckEntry], question: &str) -> String {
    let mut lines = vec![
        "Parsed report (from message):".to_string(),
        "Teachers with issues:".to_string(),
    ];
    lines.extend(entries.iter().take(PROMPT_ENTRY_LIMIT).map(|t| {
        format!(
            "{}: issued={}, checked={}, pct={:.1}",
            t.name, t.issued, t.checked, t.percent
        )
    }));
    lines.push(format!("\nUser question: {}", question));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = "✅ Отчет по проверке домашних заданий за месяц:\n\
        ⚠️ Преподавателей с проверкой < 70%: 3\n\
        • Иванов И.И.: Получено 10 | Проверено 2 | 20.0%\n\
        • Петров: Получено 8 | Проверено 4 | 50,0%\n\
        • Сидоров: получено 10 | проверено 6 | 60.0%";

    #[test]
    fn test_parse_check_report() {
        let entries = parse_check_report(REPORT);
        assert_eq!(entries.len(), 3);
        assert_eq!(
            entries[0],
            CheckEntry {
                name: "Иванов И.И.".to_string(),
                issued: 10,
                checked: 2,
                percent: 20.0,
            }
        );
        assert_eq!(entries[1].percent, 50.0);
        assert_eq!(entries[2].name, "Сидоров");
    }

    #[test]
    fn test_parse_ignores_other_text() {
        assert!(parse_check_report("📊 Отчет по посещаемости преподавателей:\n• Иванов: 35.0%").is_empty());
    }

    #[test]
    fn test_answer_least() {
        let entries = parse_check_report(REPORT);
        assert_eq!(
            answer_locally("Кто меньше всех проверил?", &entries).unwrap(),
            "👎 Наименее проверял: Иванов И.И. — 2/10 (20.0%)"
        );
    }

    #[test]
    fn test_answer_top() {
        let entries = parse_check_report(REPORT);
        assert_eq!(
            answer_locally("покажи топ", &entries).unwrap(),
            "Топ 5 преподавателей по % проверки:\n\
             • Сидоров: 6/10 (60.0%)\n\
             • Петров: 4/8 (50.0%)\n\
             • Иванов И.И.: 2/10 (20.0%)"
        );
    }

    #[test]
    fn test_answer_count() {
        let entries = parse_check_report(REPORT);
        assert_eq!(
            answer_locally("Сколько их?", &entries).unwrap(),
            "⚠️ Преподавателей с проблемой: 3"
        );
    }

    #[test]
    fn test_other_questions_go_to_model() {
        let entries = parse_check_report(REPORT);
        assert!(answer_locally("Что посоветуешь?", &entries).is_none());
        assert!(answer_locally("кто меньше", &[]).is_none());
    }

    #[test]
    fn test_report_prompt() {
        let entries = parse_check_report(REPORT);
        let prompt = report_prompt(&entries[..1], "Что делать?");
        assert_eq!(
            prompt,
            "Parsed report (from message):\n\
             Teachers with issues:\n\
             Иванов И.И.: issued=10, checked=2, pct=20.0\n\
             \n\
             User question: Что делать?"
        );
    }
}
