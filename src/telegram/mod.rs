//! Telegram Module
//!
//! Bot APIとの通信を担当するモジュール。
//!
//! - `Transport`: 対話ロジックが使う送受信の抽象
//! - `TelegramClient`: reqwestによるBot API実装
//! - `Poller`: getUpdatesのロングポーリングループ

mod client;
mod poller;
pub mod types;

use async_trait::async_trait;

use crate::api::ParseMode;
use crate::error::BotError;
use crate::output::OutgoingText;
use types::ReplyMarkup;

pub use client::TelegramClient;
pub use poller::Poller;

/// 送信するメッセージ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    /// 本文
    pub text: String,

    /// 書式モード
    pub parse_mode: ParseMode,

    /// 添付するキーボード
    pub reply_markup: Option<ReplyMarkup>,
}

impl OutgoingMessage {
    /// 書式なしのメッセージ
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            parse_mode: ParseMode::Plain,
            reply_markup: None,
        }
    }

    /// 書式モードを指定
    pub fn with_parse_mode(mut self, parse_mode: ParseMode) -> Self {
        self.parse_mode = parse_mode;
        self
    }

    /// キーボードを添付
    pub fn with_markup(mut self, markup: ReplyMarkup) -> Self {
        self.reply_markup = Some(markup);
        self
    }
}

impl From<OutgoingText> for OutgoingMessage {
    fn from(text: OutgoingText) -> Self {
        Self {
            text: text.text,
            parse_mode: text.parse_mode,
            reply_markup: None,
        }
    }
}

/// 対話ロジックから見た送受信の抽象
///
/// 本番では`TelegramClient`、テストでは記録用の実装を使います。
#[async_trait]
pub trait Transport: Send + Sync {
    /// チャットにメッセージを送信
    async fn send_message(&self, chat_id: i64, message: &OutgoingMessage) -> Result<(), BotError>;

    /// 既存のメッセージを書き換える
    async fn edit_message(
        &self,
        chat_id: i64,
        message_id: i64,
        message: &OutgoingMessage,
    ) -> Result<(), BotError>;

    /// コールバックボタンの押下に応答（ローディング表示を消す）
    async fn answer_callback(&self, callback_id: &str) -> Result<(), BotError>;

    /// ファイルをダウンロード
    async fn download_file(&self, file_id: &str) -> Result<Vec<u8>, BotError>;
}
