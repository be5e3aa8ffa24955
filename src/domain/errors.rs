use thiserror::Error;

/// 帳號儲存失敗的原因
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("account store error: {message}")]
pub struct StoreError {
    pub message: String,
}

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// 遠端呼叫 (newsletter / notification) 失敗的原因
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("client error: {message}")]
pub struct ClientError {
    pub message: String,
}

impl ClientError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
