use clap::Parser;
use signup_fanout::adapters::{InMemoryAccountStore, ScriptedClient};
use signup_fanout::config::toml_config::TomlConfig;
use signup_fanout::utils::{logger, validation::Validate};
use signup_fanout::{CliConfig, SignUpHandler, User};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut config = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting signup-fanout");

    if let Some(path) = config.config.clone() {
        tracing::info!("📁 Loading configuration from: {}", path);
        let loaded = TomlConfig::from_file(&path).and_then(|file| file.validate().map(|_| file));
        let file = match loaded {
            Ok(file) => file,
            Err(e) => {
                tracing::error!("❌ Failed to load config file '{}': {}", path, e);
                eprintln!("❌ {}", e.user_friendly_message());
                eprintln!("💡 建議: {}", e.recovery_suggestion());
                std::process::exit(1);
            }
        };
        config.apply_file(&file);
    }

    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    // 建立模擬的 collaborators
    let account_store = Arc::new(
        InMemoryAccountStore::failing_first(config.account_failures).with_latency(config.latency()),
    );
    let newsletter_client = Arc::new(
        ScriptedClient::failing_first("newsletter", config.newsletter_failures)
            .with_latency(config.latency()),
    );
    let notification_client = Arc::new(
        ScriptedClient::failing_first("notification", config.notification_failures)
            .with_latency(config.latency()),
    );

    let handler = SignUpHandler::from_shared(
        account_store.clone(),
        newsletter_client.clone(),
        notification_client.clone(),
    )
    .with_policy(config.retry_policy());

    for email in &config.emails {
        handler.sign_up(User::new(email.as_str())).await?;
        tracing::info!("✅ sign_up returned for {}", email);
    }

    // 背景任務不會被 join；等待 linger 時間後，未完成的重試會隨 runtime 關閉而被丟棄
    tracing::info!(
        "⏳ Waiting {:?} for background retries before exiting",
        config.linger()
    );
    tokio::time::sleep(config.linger()).await;

    let accounts = account_store.accounts().await;
    let subscribers = newsletter_client.delivered().await;
    let notified = notification_client.delivered().await;

    println!("✅ Sign-up run finished");
    println!(
        "👤 Accounts ({} calls): {}",
        account_store.calls(),
        accounts.join(", ")
    );
    println!(
        "📰 Newsletter subscribers ({} calls): {}",
        newsletter_client.calls(),
        join_emails(&subscribers)
    );
    println!(
        "🔔 Notifications sent ({} calls): {}",
        notification_client.calls(),
        join_emails(&notified)
    );

    Ok(())
}

fn join_emails(users: &[User]) -> String {
    users
        .iter()
        .map(|user| user.email.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
