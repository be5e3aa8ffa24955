use crate::config::toml_config::{TomlConfig, MAX_DELAY_MS};
use crate::core::retry::{RetryPolicy, DEFAULT_MAX_ATTEMPTS};
use crate::utils::error::{Result, SignUpError};
use crate::utils::validation::{self, Validate};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "signup-fanout")]
#[command(about = "Sign up users and fan out newsletter and notification calls with retries")]
pub struct CliConfig {
    #[arg(long = "email", value_delimiter = ',', default_value = "user@example.com")]
    pub emails: Vec<String>,

    #[arg(long, help = "Path to a TOML file overriding retry and simulation settings")]
    pub config: Option<String>,

    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
    pub max_attempts: u32,

    #[arg(long, default_value = "1000")]
    pub retry_delay_ms: u64,

    #[arg(long, default_value = "0", help = "Failures before the account store succeeds")]
    pub account_failures: u32,

    #[arg(long, default_value = "0", help = "Failures before the newsletter client succeeds")]
    pub newsletter_failures: u32,

    #[arg(long, default_value = "0", help = "Failures before the notification client succeeds")]
    pub notification_failures: u32,

    #[arg(long, default_value = "0", help = "Simulated latency per collaborator call")]
    pub latency_ms: u64,

    #[arg(
        long,
        default_value = "6000",
        help = "How long to wait for background retries before exiting"
    )]
    pub linger_ms: u64,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliConfig {
    /// 以設定檔中有填寫的欄位覆蓋命令列的值
    pub fn apply_file(&mut self, file: &TomlConfig) {
        if let Some(max_attempts) = file.retry.max_attempts {
            self.max_attempts = max_attempts;
        }
        if let Some(delay_ms) = file.retry.delay_ms {
            self.retry_delay_ms = delay_ms;
        }
        if let Some(failures) = file.simulation.account_failures {
            self.account_failures = failures;
        }
        if let Some(failures) = file.simulation.newsletter_failures {
            self.newsletter_failures = failures;
        }
        if let Some(failures) = file.simulation.notification_failures {
            self.notification_failures = failures;
        }
        if let Some(latency_ms) = file.simulation.latency_ms {
            self.latency_ms = latency_ms;
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, Duration::from_millis(self.retry_delay_ms))
    }

    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }

    pub fn linger(&self) -> Duration {
        Duration::from_millis(self.linger_ms)
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if self.emails.is_empty() {
            return Err(SignUpError::ConfigValidationError {
                field: "email".to_string(),
                message: "At least one email is required".to_string(),
            });
        }
        for email in &self.emails {
            validation::validate_non_empty_string("email", email)?;
        }
        validation::validate_positive_number("max_attempts", self.max_attempts.into(), 1)?;
        validation::validate_range("retry_delay_ms", self.retry_delay_ms, 0, MAX_DELAY_MS)?;
        Ok(())
    }
}
