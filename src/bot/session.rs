//! 会話状態

use std::collections::{HashMap, HashSet};

use tokio::sync::Mutex;

use crate::api::{HomeworkPeriod, ReportKind};

/// (chat_id, user_id)
pub type SessionKey = (i64, i64);

/// 1ユーザー分の会話状態
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    /// 選択中のレポート（未選択なら`None`）
    pub report: Option<ReportKind>,

    /// 宿題チェックの期間
    pub period: HomeworkPeriod,

    /// 処理済みファイルの`file_unique_id`
    pub processed: HashSet<String>,
}

/// セッションの保管庫（プロセス内のみ、再起動で消える）
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<SessionKey, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 現在の状態のコピーを取得（存在しなければ初期状態）
    pub async fn get(&self, key: SessionKey) -> Session {
        self.sessions
            .lock()
            .await
            .get(&key)
            .cloned()
            .unwrap_or_default()
    }

    /// レポートを選択（期間と処理済み一覧は維持）
    pub async fn select_report(&self, key: SessionKey, report: ReportKind) {
        let mut sessions = self.sessions.lock().await;
        sessions.entry(key).or_default().report = Some(report);
    }

    /// 宿題チェックの期間を選択
    pub async fn select_period(&self, key: SessionKey, period: HomeworkPeriod) {
        let mut sessions = self.sessions.lock().await;
        let session = sessions.entry(key).or_default();
        session.report = Some(ReportKind::HomeworkCheck);
        session.period = period;
    }

    /// ファイルを処理済みとして記録
    ///
    /// 既に記録済みであれば`false`を返します。
    pub async fn mark_processed(&self, key: SessionKey, file_unique_id: &str) -> bool {
        let mut sessions = self.sessions.lock().await;
        sessions
            .entry(key)
            .or_default()
            .processed
            .insert(file_unique_id.to_string())
    }

    /// 会話を終了して状態を破棄
    pub async fn clear(&self, key: SessionKey) {
        self.sessions.lock().await.remove(&key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_default_session() {
        let store = SessionStore::new();
        let session = store.get((1, 1)).await;
        assert_eq!(session.report, None);
        assert_eq!(session.period, HomeworkPeriod::Month);
    }

    #[tokio::test]
    async fn test_select_period_sets_report() {
        let store = SessionStore::new();
        store.select_period((1, 2), HomeworkPeriod::Week).await;
        let session = store.get((1, 2)).await;
        assert_eq!(session.report, Some(ReportKind::HomeworkCheck));
        assert_eq!(session.period, HomeworkPeriod::Week);
    }

    #[tokio::test]
    async fn test_mark_processed_once() {
        let store = SessionStore::new();
        assert!(store.mark_processed((1, 2), "U1").await);
        assert!(!store.mark_processed((1, 2), "U1").await);
        assert!(store.mark_processed((1, 3), "U1").await);

        store.clear((1, 2)).await;
        assert!(store.mark_processed((1, 2), "U1").await);
    }

    #[tokio::test]
    async fn test_sessions_are_per_user() {
        let store = SessionStore::new();
        store.select_report((10, 1), ReportKind::Lessons).await;
        assert_eq!(store.get((10, 2)).await.report, None);
        assert_eq!(store.get((10, 1)).await.report, Some(ReportKind::Lessons));
    }
}
