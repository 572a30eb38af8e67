//! AI Assistant Module
//!
//! チャット補完APIへの問い合わせと、そのためのプロンプト組み立てを担当するモジュール。
//!
//! - `Assistant`: 補完APIの抽象（テストでは差し替え可能）
//! - `MistralClient`: Mistralのchat completions実装
//! - 宿題チェックレポートの返信に対するローカル回答
//! - ワークブック全体をCSVとして埋め込んだ解析プロンプト

mod check_report;
mod mistral;
mod workbook;

use async_trait::async_trait;

use crate::error::AiError;
use crate::output::{text_len, REPORT_CHUNK_LIMIT};

pub use check_report::{answer_locally, parse_check_report, report_prompt, CheckEntry};
pub use mistral::MistralClient;
pub use workbook::{workbook_digest, workbook_prompt, WORKBOOK_CONTENT_LIMIT};

/// チャット補完APIの抽象
#[async_trait]
pub trait Assistant: Send + Sync {
    /// プロンプトを1件のユーザーメッセージとして送り、応答本文を返す
    ///
    /// 応答が空の場合は空文字列を返します。
    async fn complete(&self, prompt: &str) -> Result<String, AiError>;
}

/// 返信に引用されたメッセージを文脈として付けたプロンプト
pub fn context_prompt(context: &str, question: &str) -> String {
    format!(
        "Контекст (сообщение):\n{}\n\nВопрос пользователя: {}",
        context, question
    )
}

/// モデルの応答をメッセージ長に収める
///
/// 上限を超える場合は末尾を削って`...`を付けます。
pub fn truncate_reply(reply: &str) -> String {
    if text_len(reply) <= REPORT_CHUNK_LIMIT {
        return reply.to_string();
    }
    let budget = REPORT_CHUNK_LIMIT - 20;
    let mut used = 0;
    let mut truncated = String::new();
    for c in reply.chars() {
        used += c.len_utf16();
        if used > budget {
            break;
        }
        truncated.push(c);
    }
    truncated.push_str("...");
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_prompt() {
        assert_eq!(
            context_prompt("Отчет", "Что делать?"),
            "Контекст (сообщение):\nОтчет\n\nВопрос пользователя: Что делать?"
        );
    }

    #[test]
    fn test_truncate_reply_short_is_untouched() {
        assert_eq!(truncate_reply("ответ"), "ответ");
    }

    #[test]
    fn test_truncate_reply_long() {
        let reply = "я".repeat(5000);
        let truncated = truncate_reply(&reply);
        assert!(truncated.ends_with("..."));
        assert_eq!(text_len(&truncated), REPORT_CHUNK_LIMIT - 20 + 3);
    }
}
