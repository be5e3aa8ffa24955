use thiserror::Error;

#[derive(Error, Debug)]
pub enum SignUpError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Account creation task for {email} ended before signalling completion")]
    AccountTaskAborted { email: String },
}

impl SignUpError {
    /// 給終端使用者看的簡短訊息
    pub fn user_friendly_message(&self) -> String {
        match self {
            SignUpError::IoError(e) => format!("無法讀取檔案: {}", e),
            SignUpError::ConfigValidationError { field, message } => {
                format!("設定錯誤 ({}): {}", field, message)
            }
            SignUpError::InvalidConfigValueError { field, value, reason } => {
                format!("設定值無效 {} = '{}': {}", field, value, reason)
            }
            SignUpError::AccountTaskAborted { email } => {
                format!("建立帳號 {} 時任務意外中止", email)
            }
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            SignUpError::IoError(_) => "確認設定檔路徑存在且可讀取",
            SignUpError::ConfigValidationError { .. } => "確認設定檔為合法的 TOML 格式",
            SignUpError::InvalidConfigValueError { .. } => "修正上述欄位後重新執行",
            SignUpError::AccountTaskAborted { .. } => "檢查帳號儲存實作是否發生 panic",
        }
    }
}

pub type Result<T> = std::result::Result<T, SignUpError>;
