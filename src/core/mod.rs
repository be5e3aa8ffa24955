pub mod retry;
pub mod signup;

pub use crate::domain::errors::{ClientError, StoreError};
pub use crate::domain::model::User;
pub use crate::domain::ports::{AccountStore, NewsletterClient, NotificationClient};
pub use crate::utils::error::Result;
