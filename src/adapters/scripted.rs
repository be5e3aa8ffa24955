use crate::adapters::FailureBudget;
use crate::domain::errors::ClientError;
use crate::domain::model::User;
use crate::domain::ports::{NewsletterClient, NotificationClient};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

/// 模擬的遠端 client：前幾次呼叫失敗，之後記錄收到的使用者。
///
/// 同時實作 [`NewsletterClient`] 與 [`NotificationClient`]，`service` 只用於錯誤訊息與日誌。
#[derive(Debug)]
pub struct ScriptedClient {
    service: &'static str,
    delivered: Mutex<Vec<User>>,
    failures: FailureBudget,
    calls: AtomicU32,
    latency: Duration,
}

impl ScriptedClient {
    pub fn new(service: &'static str) -> Self {
        Self::failing_first(service, 0)
    }

    pub fn failing_first(service: &'static str, failures: u32) -> Self {
        Self {
            service,
            delivered: Mutex::new(Vec::new()),
            failures: FailureBudget::new(failures),
            calls: AtomicU32::new(0),
            latency: Duration::ZERO,
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn service(&self) -> &'static str {
        self.service
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub async fn delivered(&self) -> Vec<User> {
        self.delivered.lock().await.clone()
    }

    async fn deliver(&self, user: &User) -> Result<(), ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        if let Some(left) = self.failures.take() {
            return Err(ClientError::new(format!(
                "{} service unavailable ({} failures left)",
                self.service, left
            )));
        }

        tracing::debug!("{} delivered for {}", self.service, user);
        self.delivered.lock().await.push(user.clone());
        Ok(())
    }
}

#[async_trait]
impl NewsletterClient for ScriptedClient {
    async fn add_subscriber(&self, user: &User) -> Result<(), ClientError> {
        self.deliver(user).await
    }
}

#[async_trait]
impl NotificationClient for ScriptedClient {
    async fn send_notification(&self, user: &User) -> Result<(), ClientError> {
        self.deliver(user).await
    }
}
