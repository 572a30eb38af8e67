//! reqwestによるTelegram Bot APIクライアント

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use super::types::{ApiResponse, File, ReplyMarkup, Update};
use super::{OutgoingMessage, Transport};
use crate::error::BotError;

/// ロングポーリングのタイムアウトに上乗せするHTTPタイムアウトの余裕
const HTTP_TIMEOUT_MARGIN: Duration = Duration::from_secs(15);

#[derive(Serialize)]
struct SendMessageParams<'a> {
    chat_id: i64,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<&'a ReplyMarkup>,
}

#[derive(Serialize)]
struct EditMessageParams<'a> {
    chat_id: i64,
    message_id: i64,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<&'a ReplyMarkup>,
}

#[derive(Serialize)]
struct GetUpdatesParams<'a> {
    offset: i64,
    timeout: u64,
    allowed_updates: &'a [&'a str],
}

/// Telegram Bot APIクライアント
pub struct TelegramClient {
    client: Client,
    api_url: String,
    file_url: String,
    max_download: u64,
}

impl TelegramClient {
    /// `token`のボット用クライアントを作成
    ///
    /// HTTPタイムアウトは`get_updates`のロングポーリング時間（`poll_timeout`）より少し長くします。
    ///
    /// # エラー
    ///
    /// TLSバックエンドの初期化に失敗した場合は`BotError::Http`を返します。
    pub fn new(
        api_base: &str,
        token: &str,
        poll_timeout: Duration,
        max_download: u64,
    ) -> Result<Self, BotError> {
        let base = api_base.trim_end_matches('/');
        let client = Client::builder()
            .timeout(poll_timeout + HTTP_TIMEOUT_MARGIN)
            .build()?;

        Ok(Self {
            client,
            api_url: format!("{}/bot{}", base, token),
            file_url: format!("{}/file/bot{}", base, token),
            max_download,
        })
    }

    async fn call<P, T>(&self, method: &str, params: &P) -> Result<T, BotError>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response: ApiResponse<T> = self
            .client
            .post(format!("{}/{}", self.api_url, method))
            .json(params)
            .send()
            .await?
            .json()
            .await?;

        match (response.ok, response.result) {
            (true, Some(result)) => Ok(result),
            (_, _) => Err(BotError::Api {
                method: method.to_string(),
                description: response
                    .description
                    .unwrap_or_else(|| "no description".to_string()),
            }),
        }
    }

    /// 登録済みのWebhookを削除する（`getUpdates`を使うため）
    pub async fn delete_webhook(&self) -> Result<(), BotError> {
        let _: bool = self
            .call("deleteWebhook", &serde_json::json!({"drop_pending_updates": false}))
            .await?;
        Ok(())
    }

    /// `offset`以降の更新をロングポーリングで取得
    pub async fn get_updates(&self, offset: i64, timeout: Duration) -> Result<Vec<Update>, BotError> {
        let params = GetUpdatesParams {
            offset,
            timeout: timeout.as_secs(),
            allowed_updates: &["message", "callback_query"],
        };
        self.call("getUpdates", &params).await
    }
}

#[async_trait]
impl Transport for TelegramClient {
    async fn send_message(&self, chat_id: i64, message: &OutgoingMessage) -> Result<(), BotError> {
        let params = SendMessageParams {
            chat_id,
            text: &message.text,
            parse_mode: message.parse_mode.as_api_str(),
            reply_markup: message.reply_markup.as_ref(),
        };
        let _: serde_json::Value = self.call("sendMessage", &params).await?;
        Ok(())
    }

    async fn edit_message(
        &self,
        chat_id: i64,
        message_id: i64,
        message: &OutgoingMessage,
    ) -> Result<(), BotError> {
        let params = EditMessageParams {
            chat_id,
            message_id,
            text: &message.text,
            parse_mode: message.parse_mode.as_api_str(),
            reply_markup: message.reply_markup.as_ref(),
        };
        let _: serde_json::Value = self.call("editMessageText", &params).await?;
        Ok(())
    }

    async fn answer_callback(&self, callback_id: &str) -> Result<(), BotError> {
        let _: bool = self
            .call(
                "answerCallbackQuery",
                &serde_json::json!({ "callback_query_id": callback_id }),
            )
            .await?;
        Ok(())
    }

    async fn download_file(&self, file_id: &str) -> Result<Vec<u8>, BotError> {
        let file: File = self
            .call("getFile", &serde_json::json!({ "file_id": file_id }))
            .await?;

        if let Some(size) = file.file_size {
            check_download_size(size, self.max_download)?;
        }
        let path = file.file_path.ok_or_else(|| BotError::Api {
            method: "getFile".to_string(),
            description: "file_path is missing".to_string(),
        })?;

        let mut response = self
            .client
            .get(format!("{}/{}", self.file_url, path))
            .send()
            .await?
            .error_for_status()?;

        // file_sizeが無い場合もあるため、受信しながら上限を確認する
        let mut bytes = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            check_download_size((bytes.len() + chunk.len()) as u64, self.max_download)?;
            bytes.extend_from_slice(&chunk);
        }

        tracing::debug!(file_id, size = bytes.len(), "file downloaded");
        Ok(bytes)
    }
}

/// ダウンロードサイズが上限以内か検証
fn check_download_size(size: u64, max: u64) -> Result<(), BotError> {
    if size > max {
        return Err(BotError::FileTooLarge { size, max });
    }
    Ok(())
}
