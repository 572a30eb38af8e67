//! Bot Module
//!
//! ユーザーとの対話（状態遷移）を担当するモジュール。
//!
//! # 状態遷移
//!
//! ```text
//! /start ─▶ メニュー ─▶ レポート選択 ─▶ ファイル受信 ─▶ 解析結果 ─▶ メニュー
//!                   └▶ AI選択 ─▶ テキスト / ファイル ─▶ AI応答 ─▶ メニュー
//! ```
//!
//! 状態は(chat_id, user_id)ごとに`SessionStore`に保持され、
//! レポート送信後や`/cancel`で破棄されます。

pub mod keyboards;
pub mod session;
pub mod texts;

use std::sync::Arc;

use crate::ai::{self, Assistant};
use crate::api::{HomeworkPeriod, ParseMode, ReportKind};
use crate::builder::Analyzer;
use crate::error::{BotError, ReportError};
use crate::security::validate_document_name;
use crate::telegram::types::{CallbackQuery, Document, Message, Update};
use crate::telegram::{OutgoingMessage, Transport};

pub use session::{Session, SessionKey, SessionStore};

/// 受信したコマンド
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Start,
    Help,
    Cancel,
}

impl Command {
    /// `/start`、`/start@bot_name`などを解釈
    fn parse(text: &str) -> Option<Command> {
        let word = text.split_whitespace().next()?;
        let name = word.strip_prefix('/')?;
        let name = name.split('@').next().unwrap_or(name);
        match name {
            "start" => Some(Command::Start),
            "help" => Some(Command::Help),
            "cancel" => Some(Command::Cancel),
            _ => None,
        }
    }
}

/// 対話の状態機械
///
/// 1つの`Update`を受け取り、必要なメッセージを`Transport`経由で送信します。
/// 解析処理はブロッキングスレッドで実行されるため、他のチャットの応答を妨げません。
pub struct Dialog {
    transport: Arc<dyn Transport>,
    assistant: Option<Arc<dyn Assistant>>,
    analyzer: Analyzer,
    sessions: SessionStore,
}

impl Dialog {
    /// 新しい対話を作成
    ///
    /// `assistant`が`None`の場合、AI関連の要求には「未設定」と応答します。
    pub fn new(
        transport: Arc<dyn Transport>,
        assistant: Option<Arc<dyn Assistant>>,
        analyzer: Analyzer,
    ) -> Self {
        Self {
            transport,
            assistant,
            analyzer,
            sessions: SessionStore::new(),
        }
    }

    /// セッションの保管庫
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// 1件の更新を処理
    pub async fn handle_update(&self, update: Update) -> Result<(), BotError> {
        if let Some(callback) = update.callback_query {
            return self.handle_callback(callback).await;
        }
        if let Some(message) = update.message {
            return self.handle_message(message).await;
        }
        tracing::debug!(update_id = update.update_id, "ignoring update without message");
        Ok(())
    }

    async fn send(&self, chat_id: i64, message: OutgoingMessage) -> Result<(), BotError> {
        self.transport.send_message(chat_id, &message).await
    }

    async fn send_plain(&self, chat_id: i64, text: &str) -> Result<(), BotError> {
        self.send(chat_id, OutgoingMessage::plain(text)).await
    }

    async fn send_menu(&self, chat_id: i64, text: &str) -> Result<(), BotError> {
        self.send(
            chat_id,
            OutgoingMessage::plain(text).with_markup(keyboards::main_menu()),
        )
        .await
    }

    /// ボタンが付いていたメッセージを書き換える（失敗したら新規送信）
    async fn show(
        &self,
        chat_id: i64,
        message_id: Option<i64>,
        message: OutgoingMessage,
    ) -> Result<(), BotError> {
        if let Some(message_id) = message_id {
            match self.transport.edit_message(chat_id, message_id, &message).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    tracing::debug!(chat_id, message_id, error = %e, "edit failed, sending instead")
                }
            }
        }
        self.send(chat_id, message).await
    }

    async fn greet(&self, chat_id: i64, message_id: Option<i64>) -> Result<(), BotError> {
        self.show(
            chat_id,
            message_id,
            OutgoingMessage::plain(texts::GREETING).with_markup(keyboards::main_menu()),
        )
        .await?;
        self.send(
            chat_id,
            OutgoingMessage::plain(texts::START_HINT).with_markup(keyboards::start_reply_keyboard()),
        )
        .await
    }

    fn help_message() -> OutgoingMessage {
        OutgoingMessage::plain(texts::HELP).with_parse_mode(ParseMode::Markdown)
    }

    async fn handle_callback(&self, callback: CallbackQuery) -> Result<(), BotError> {
        if let Err(e) = self.transport.answer_callback(&callback.id).await {
            tracing::warn!(callback_id = %callback.id, error = %e, "answerCallbackQuery failed");
        }

        let chat_id = callback
            .message
            .as_ref()
            .map(|m| m.chat.id)
            .unwrap_or(callback.from.id);
        let message_id = callback.message.as_ref().map(|m| m.message_id);
        let key = (chat_id, callback.from.id);
        let data = callback.data.as_deref().unwrap_or_default();

        tracing::debug!(chat_id, user_id = callback.from.id, data, "callback received");

        if data == keyboards::HELP {
            self.sessions.clear(key).await;
            return self.show(chat_id, message_id, Self::help_message()).await;
        }
        if data == keyboards::RESTART {
            self.sessions.clear(key).await;
            return self.greet(chat_id, message_id).await;
        }
        if let Some(period) = HomeworkPeriod::from_callback(data) {
            self.sessions.select_period(key, period).await;
            return self
                .show(
                    chat_id,
                    message_id,
                    OutgoingMessage::plain(texts::period_chosen(period)),
                )
                .await;
        }

        match data.parse::<ReportKind>() {
            Ok(kind) => {
                self.sessions.select_report(key, kind).await;
                tracing::info!(chat_id, report = %kind, "report selected");
                self.show(chat_id, message_id, texts::report_prompt(kind)).await
            }
            Err(_) => {
                tracing::debug!(data, "unknown callback data");
                Ok(())
            }
        }
    }

    async fn handle_message(&self, message: Message) -> Result<(), BotError> {
        let chat_id = message.chat.id;
        let user_id = message.from.as_ref().map(|u| u.id).unwrap_or(chat_id);
        let key = (chat_id, user_id);

        if let Some(command) = message.text.as_deref().and_then(Command::parse) {
            return self.handle_command(key, command).await;
        }

        let session = self.sessions.get(key).await;
        let is_reply = message.reply_to_message.is_some();

        if let Some(document) = message.document.as_ref() {
            return match session.report {
                Some(ReportKind::Ai) => self.process_ai_file(key, &message, document).await,
                Some(kind) => self.process_report_file(key, &session, kind, document).await,
                None if is_reply => self.process_ai_file(key, &message, document).await,
                None => self.send_menu(chat_id, texts::SELECT_REPORT_FIRST).await,
            };
        }

        if message.text.is_some() && (session.report == Some(ReportKind::Ai) || is_reply) {
            return self.process_ai_query(key, &message).await;
        }

        tracing::debug!(chat_id, "ignoring message outside of a conversation step");
        Ok(())
    }

    async fn handle_command(&self, key: SessionKey, command: Command) -> Result<(), BotError> {
        let (chat_id, _) = key;
        match command {
            Command::Start => {
                self.sessions.clear(key).await;
                self.greet(chat_id, None).await
            }
            Command::Help => self.send(chat_id, Self::help_message()).await,
            Command::Cancel => {
                self.sessions.clear(key).await;
                self.send_menu(chat_id, texts::CANCELLED).await
            }
        }
    }

    async fn process_report_file(
        &self,
        key: SessionKey,
        session: &Session,
        kind: ReportKind,
        document: &Document,
    ) -> Result<(), BotError> {
        let (chat_id, _) = key;
        let file_name = document.file_name.as_deref().unwrap_or_default();
        if let Err(reason) = validate_document_name(file_name) {
            tracing::info!(chat_id, report = %kind, reason = %reason, "document rejected");
            return self.send_plain(chat_id, texts::NOT_EXCEL).await;
        }

        self.send_plain(chat_id, texts::FILE_RECEIVED).await?;

        if !self
            .sessions
            .mark_processed(key, &document.file_unique_id)
            .await
        {
            tracing::info!(chat_id, file = %document.file_unique_id, "duplicate document");
            return self.send_plain(chat_id, texts::ALREADY_PROCESSED).await;
        }

        let bytes = match self.transport.download_file(&document.file_id).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!(chat_id, report = %kind, error = %e, "download failed");
                self.sessions.clear(key).await;
                return self.send_plain(chat_id, texts::DOWNLOAD_FAILED).await;
            }
        };

        tracing::info!(chat_id, report = %kind, file = file_name, size = bytes.len(), "analyzing document");

        let analyzer = self.analyzer.with_homework_period(session.period);
        let result = run_blocking(move || analyzer.analyze_bytes(kind, &bytes)).await;

        match result {
            Ok(output) => {
                for (part, text) in output.messages.into_iter().enumerate() {
                    // 一部が送れなくても会話は終了させる
                    if let Err(e) = self.send(chat_id, text.into()).await {
                        tracing::error!(chat_id, report = %kind, part, error = %e, "failed to send report message");
                    }
                }
            }
            Err(e) => {
                let sent = match texts::rejection(kind, &e) {
                    Some(text) => {
                        tracing::info!(chat_id, report = %kind, reason = %e, "report rejected");
                        self.send_plain(chat_id, &text).await
                    }
                    None => {
                        tracing::error!(chat_id, report = %kind, error = %e, "report failed");
                        self.send_plain(chat_id, texts::internal_error(kind)).await
                    }
                };
                if let Err(e) = sent {
                    tracing::error!(chat_id, report = %kind, error = %e, "failed to send report error");
                }
            }
        }

        self.sessions.clear(key).await;
        self.send_menu(chat_id, texts::DONE).await
    }

    async fn process_ai_query(&self, key: SessionKey, message: &Message) -> Result<(), BotError> {
        let (chat_id, _) = key;
        let question = message.text.as_deref().unwrap_or_default().trim();
        if question.is_empty() {
            return self.send_plain(chat_id, texts::AI_EMPTY_QUERY).await;
        }

        let context = message
            .reply_to_message
            .as_deref()
            .and_then(Message::text_or_caption)
            .map(str::trim)
            .filter(|text| !text.is_empty());

        let (notice, prompt) = match context {
            Some(context) => {
                let entries = ai::parse_check_report(context);
                if entries.is_empty() {
                    (
                        texts::AI_SENDING_WITH_MESSAGE,
                        ai::context_prompt(context, question),
                    )
                } else {
                    if let Some(answer) = ai::answer_locally(question, &entries) {
                        tracing::debug!(chat_id, entries = entries.len(), "answered from report locally");
                        return self.send_plain(chat_id, &answer).await;
                    }
                    (
                        texts::AI_SENDING_WITH_REPORT,
                        ai::report_prompt(&entries, question),
                    )
                }
            }
            None => (texts::AI_SENDING, question.to_string()),
        };

        let Some(assistant) = self.assistant.as_ref() else {
            return self.send_plain(chat_id, texts::AI_NOT_CONFIGURED).await;
        };

        self.send_plain(chat_id, notice).await?;

        let reply = match assistant.complete(&prompt).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::error!(chat_id, error = %e, "assistant request failed");
                return self.send_plain(chat_id, texts::AI_FAILED).await;
            }
        };
        self.finish_ai(key, &reply).await
    }

    async fn process_ai_file(
        &self,
        key: SessionKey,
        message: &Message,
        document: &Document,
    ) -> Result<(), BotError> {
        let (chat_id, _) = key;
        let file_name = document.file_name.as_deref().unwrap_or_default();
        if validate_document_name(file_name).is_err() {
            return self.send_plain(chat_id, texts::AI_ONLY_EXCEL).await;
        }

        let Some(assistant) = self.assistant.as_ref() else {
            return self.send_plain(chat_id, texts::AI_NOT_CONFIGURED).await;
        };

        self.send_plain(chat_id, texts::AI_FILE_RECEIVED).await?;

        let bytes = match self.transport.download_file(&document.file_id).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!(chat_id, error = %e, "download failed");
                return self.send_plain(chat_id, &texts::ai_file_failed(&e)).await;
            }
        };

        let max = self.analyzer.max_input_size();
        let content = match run_blocking(move || ai::workbook_digest(&bytes, max)).await {
            Ok(content) => content,
            Err(e) => {
                tracing::error!(chat_id, error = %e, "workbook digest failed");
                return self.send_plain(chat_id, &texts::ai_file_failed(&e)).await;
            }
        };

        let caption = message
            .caption
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty());
        let prompt = ai::workbook_prompt(&content, caption);

        tracing::info!(chat_id, file = file_name, prompt_len = prompt.len(), "sending workbook to assistant");

        let reply = match assistant.complete(&prompt).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::error!(chat_id, error = %e, "assistant request failed");
                return self.send_plain(chat_id, &texts::ai_file_failed(&e)).await;
            }
        };
        self.finish_ai(key, &reply).await
    }

    /// AI応答を送信して会話を終了（空応答の場合は状態を維持）
    async fn finish_ai(&self, key: SessionKey, reply: &str) -> Result<(), BotError> {
        let (chat_id, _) = key;
        let reply = reply.trim();
        if reply.is_empty() {
            return self.send_plain(chat_id, texts::AI_EMPTY_REPLY).await;
        }

        self.send_plain(chat_id, &ai::truncate_reply(reply)).await?;
        self.sessions.clear(key).await;
        self.send_menu(chat_id, texts::AI_DONE).await
    }
}

/// 解析処理をブロッキングスレッドで実行
async fn run_blocking<T, F>(f: F) -> Result<T, ReportError>
where
    F: FnOnce() -> Result<T, ReportError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        ReportError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("analysis task failed: {}", e),
        ))
    })?
}
