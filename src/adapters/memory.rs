use crate::adapters::FailureBudget;
use crate::domain::errors::StoreError;
use crate::domain::model::User;
use crate::domain::ports::AccountStore;
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

/// 記憶體內的帳號儲存。重複建立同一個 email 視為成功。
#[derive(Debug, Default)]
pub struct InMemoryAccountStore {
    accounts: Mutex<BTreeSet<String>>,
    failures: FailureBudget,
    calls: AtomicU32,
    latency: Duration,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 前 `failures` 次呼叫回傳 [`StoreError`]
    pub fn failing_first(failures: u32) -> Self {
        Self {
            failures: FailureBudget::new(failures),
            ..Self::default()
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub async fn contains(&self, email: &str) -> bool {
        self.accounts.lock().await.contains(email)
    }

    pub async fn accounts(&self) -> Vec<String> {
        self.accounts.lock().await.iter().cloned().collect()
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn create_account(&self, user: &User) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        if let Some(left) = self.failures.take() {
            return Err(StoreError::new(format!(
                "simulated outage while creating {} ({} failures left)",
                user.email, left
            )));
        }

        let inserted = self.accounts.lock().await.insert(user.email.clone());
        if inserted {
            tracing::debug!("Account created for {}", user);
        } else {
            tracing::debug!("Account for {} already exists", user);
        }
        Ok(())
    }
}
