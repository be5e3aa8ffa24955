use crate::core::retry::{FailureHook, Operation, RetryPolicy, RetryRunner};
use crate::core::{AccountStore, NewsletterClient, NotificationClient};
use crate::domain::model::User;
use crate::utils::error::{Result, SignUpError};
use std::sync::Arc;
use tokio::sync::oneshot;

/// 註冊流程：先建立帳號 (等待完成)，再於背景加入電子報與發送通知。
///
/// 三個操作都經過 [`RetryRunner`] 重試，結果一律不回傳給呼叫端。
/// 背景任務不會被 join，也無法取消；若 runtime 在重試途中關閉，剩餘的工作會直接被丟棄。
pub struct SignUpHandler<R, N, M>
where
    R: AccountStore + 'static,
    N: NewsletterClient + 'static,
    M: NotificationClient + 'static,
{
    account_store: Arc<R>,
    newsletter_client: Arc<N>,
    notification_client: Arc<M>,
    runner: RetryRunner,
}

impl<R, N, M> SignUpHandler<R, N, M>
where
    R: AccountStore + 'static,
    N: NewsletterClient + 'static,
    M: NotificationClient + 'static,
{
    pub fn new(account_store: R, newsletter_client: N, notification_client: M) -> Self {
        Self::from_shared(
            Arc::new(account_store),
            Arc::new(newsletter_client),
            Arc::new(notification_client),
        )
    }

    pub fn from_shared(
        account_store: Arc<R>,
        newsletter_client: Arc<N>,
        notification_client: Arc<M>,
    ) -> Self {
        Self {
            account_store,
            newsletter_client,
            notification_client,
            runner: RetryRunner::default(),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.runner = self.runner.with_policy(policy);
        self
    }

    /// 設定失敗回呼，與 [`with_policy`](Self::with_policy) 的呼叫順序無關
    pub fn with_failure_hook(mut self, hook: FailureHook) -> Self {
        self.runner = self.runner.with_failure_hook(hook);
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        self.runner.policy()
    }

    /// 註冊使用者。
    ///
    /// 在帳號建立的重試序列結束 (成功或用盡次數) 之前不會返回；之後啟動的
    /// newsletter 與 notification 任務不會被等待。即使帳號最終建立失敗也回傳 `Ok(())`。
    ///
    /// 唯一的錯誤是帳號任務在送出完成訊號前就中止 (例如 collaborator panic)。
    pub async fn sign_up(&self, user: User) -> Result<()> {
        tracing::info!("📝 Signing up {}", user);

        let (created_tx, created_rx) = oneshot::channel::<()>();
        let account_store = Arc::clone(&self.account_store);
        let runner = self.runner.clone();
        let account_user = user.clone();
        tokio::spawn(async move {
            runner
                .run(Operation::CreateAccount, || {
                    let account_store = Arc::clone(&account_store);
                    let user = account_user.clone();
                    async move { account_store.create_account(&user).await }
                })
                .await;
            // 接收端被丟棄時 (sign_up future 被 drop) 沒有人需要這個訊號
            let _ = created_tx.send(());
        });

        created_rx
            .await
            .map_err(|_| SignUpError::AccountTaskAborted {
                email: user.email.clone(),
            })?;
        tracing::debug!("Account step finished for {}", user);

        self.spawn_add_to_newsletter(user.clone());
        self.spawn_send_notification(user);

        Ok(())
    }

    fn spawn_add_to_newsletter(&self, user: User) {
        let newsletter_client = Arc::clone(&self.newsletter_client);
        let runner = self.runner.clone();
        tokio::spawn(async move {
            runner
                .run(Operation::AddToNewsletter, || {
                    let newsletter_client = Arc::clone(&newsletter_client);
                    let user = user.clone();
                    async move { newsletter_client.add_subscriber(&user).await }
                })
                .await;
        });
    }

    fn spawn_send_notification(&self, user: User) {
        let notification_client = Arc::clone(&self.notification_client);
        let runner = self.runner.clone();
        tokio::spawn(async move {
            runner
                .run(Operation::SendNotification, || {
                    let notification_client = Arc::clone(&notification_client);
                    let user = user.clone();
                    async move { notification_client.send_notification(&user).await }
                })
                .await;
        });
    }
}

impl<R, N, M> Clone for SignUpHandler<R, N, M>
where
    R: AccountStore + 'static,
    N: NewsletterClient + 'static,
    M: NotificationClient + 'static,
{
    fn clone(&self) -> Self {
        Self {
            account_store: Arc::clone(&self.account_store),
            newsletter_client: Arc::clone(&self.newsletter_client),
            notification_client: Arc::clone(&self.notification_client),
            runner: self.runner.clone(),
        }
    }
}
