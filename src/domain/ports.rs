use crate::domain::errors::{ClientError, StoreError};
use crate::domain::model::User;
use async_trait::async_trait;

#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn create_account(&self, user: &User) -> Result<(), StoreError>;
}

#[async_trait]
pub trait NewsletterClient: Send + Sync {
    async fn add_subscriber(&self, user: &User) -> Result<(), ClientError>;
}

#[async_trait]
pub trait NotificationClient: Send + Sync {
    async fn send_notification(&self, user: &User) -> Result<(), ClientError>;
}
