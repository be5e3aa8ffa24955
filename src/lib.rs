pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use crate::core::retry::{
    run_repeatedly, FailedAttempt, FailureHook, Operation, RetryPolicy, RetryRunner,
};
pub use crate::core::signup::SignUpHandler;
pub use domain::errors::{ClientError, StoreError};
pub use domain::model::User;
pub use domain::ports::{AccountStore, NewsletterClient, NotificationClient};
pub use utils::error::{Result, SignUpError};
