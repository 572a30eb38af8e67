//! Output Module
//!
//! Telegramへ送るテキストの組み立てを担当するモジュール。
//! 書式モードごとのエスケープと、メッセージ長制限に合わせた分割を提供します。

mod formatters;

use crate::api::ParseMode;

pub use formatters::{escape_markdown, escape_markdown_v2, render_csv, split_lines, text_len};

/// Bot APIが受け付けるメッセージ長の上限（UTF-16コード単位）
pub const TELEGRAM_MESSAGE_LIMIT: usize = 4096;

/// 通常のレポートで使う分割サイズ
pub const REPORT_CHUNK_LIMIT: usize = 4000;

/// 学生一覧のように行数が多いレポートで使う分割サイズ
pub const LONG_LIST_CHUNK_LIMIT: usize = 3500;

/// 送信用テキスト（本文と書式モードの組）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingText {
    /// 本文（書式モードに応じてエスケープ済み）
    pub text: String,

    /// 書式モード
    pub parse_mode: ParseMode,
}

impl OutgoingText {
    /// 書式なしテキスト
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            parse_mode: ParseMode::Plain,
        }
    }

    /// 書式モードを指定して生成
    pub fn new(text: impl Into<String>, parse_mode: ParseMode) -> Self {
        Self {
            text: text.into(),
            parse_mode,
        }
    }
}

impl ParseMode {
    /// 動的な文字列をこの書式モード向けにエスケープ
    pub fn escape(&self, text: &str) -> String {
        match self {
            ParseMode::Plain => text.to_string(),
            ParseMode::Markdown => escape_markdown(text),
            ParseMode::MarkdownV2 => escape_markdown_v2(text),
        }
    }

    /// 未加工の文字列を太字にする（Plainではそのまま）
    ///
    /// 旧Markdownはエンティティ内でエスケープできないため、`*`を取り除いて囲みます。
    pub fn bold(&self, text: &str) -> String {
        match self {
            ParseMode::Plain => text.to_string(),
            ParseMode::Markdown => format!("*{}*", text.replace('*', "")),
            ParseMode::MarkdownV2 => format!("*{}*", escape_markdown_v2(text)),
        }
    }
}

/// 行の列を書式モード付きのメッセージ列に変換
pub fn pack_messages(lines: &[String], limit: usize, parse_mode: ParseMode) -> Vec<OutgoingText> {
    split_lines(lines, limit)
        .into_iter()
        .map(|text| OutgoingText::new(text, parse_mode))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_dispatch() {
        assert_eq!(ParseMode::Plain.escape("a_b"), "a_b");
        assert_eq!(ParseMode::Markdown.escape("a_b"), "a\\_b");
        assert_eq!(ParseMode::MarkdownV2.escape("a.b"), "a\\.b");
    }

    #[test]
    fn test_bold() {
        assert_eq!(ParseMode::Plain.bold("x"), "x");
        assert_eq!(ParseMode::Markdown.bold("П_1 *x*"), "*П_1 x*");
        assert_eq!(ParseMode::MarkdownV2.bold("Иван И."), "*Иван И\\.*");
    }

    #[test]
    fn test_pack_messages_keeps_mode() {
        let lines = vec!["one".to_string(), "two".to_string()];
        let messages = pack_messages(&lines, 100, ParseMode::Markdown);
        assert_eq!(
            messages,
            vec![OutgoingText::new("one\ntwo", ParseMode::Markdown)]
        );
    }
}
