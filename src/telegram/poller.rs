//! getUpdatesのロングポーリングループ

use std::sync::Arc;
use std::time::Duration;

use super::TelegramClient;
use crate::bot::Dialog;
use crate::error::BotError;

/// `getUpdates`を繰り返し呼び、受け取った更新を対話ロジックへ渡す
pub struct Poller {
    client: Arc<TelegramClient>,
    dialog: Arc<Dialog>,
    poll_timeout: Duration,
    retry_delay: Duration,
}

impl Poller {
    pub fn new(
        client: Arc<TelegramClient>,
        dialog: Arc<Dialog>,
        poll_timeout: Duration,
        retry_delay: Duration,
    ) -> Self {
        Self {
            client,
            dialog,
            poll_timeout,
            retry_delay,
        }
    }

    /// Ctrl-Cを受けるまでポーリングする
    ///
    /// 更新は1件ずつ別タスクで処理します。取得に失敗した場合は`retry_delay`待ってから再試行します。
    pub async fn run(self) -> Result<(), BotError> {
        self.client.delete_webhook().await?;
        tracing::info!(timeout_secs = self.poll_timeout.as_secs(), "polling started");

        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);
        let mut offset = 0i64;

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("shutdown requested, stopping polling");
                    break;
                }
                result = self.client.get_updates(offset, self.poll_timeout) => match result {
                    Ok(updates) => {
                        for update in updates {
                            offset = offset.max(update.update_id + 1);
                            let dialog = Arc::clone(&self.dialog);
                            tokio::spawn(async move {
                                let update_id = update.update_id;
                                if let Err(e) = dialog.handle_update(update).await {
                                    tracing::error!(update_id, error = %e, "failed to handle update");
                                }
                            });
                        }
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, retry_in_secs = self.retry_delay.as_secs(), "getUpdates failed");
                        tokio::time::sleep(self.retry_delay).await;
                    }
                }
            }
        }

        Ok(())
    }
}
