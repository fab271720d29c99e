use anyhow::{anyhow, Result};
use dotenvy::dotenv;
use log::{error, info, warn};

use anki_reminder::core::{ChannelError, Config};
use anki_reminder::features::get_bot_version;
use anki_reminder::features::reminders::{ReminderContent, ReminderScheduler, Schedule};
use anki_reminder::features::startup::StartupNotifier;
use anki_reminder::telegram::{TelegramChannel, TelegramClient};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = Config::from_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    info!("Starting Anki Reminder Bot v{}...", get_bot_version());

    let client = TelegramClient::new(&config.api_url, &config.telegram_token)?;

    // A rejected credential is fatal; a network hiccup is left to the tick loop
    match client.get_me().await {
        Ok(me) => info!("🤖 Connected as {}", me.display_name()),
        Err(e @ ChannelError::Api { .. }) => {
            error!("Telegram rejected the bot credential: {e}");
            error!("Check TELEGRAM_TOKEN and that the bot has not been revoked");
            return Err(anyhow!("Bot authentication failed: {}", e));
        }
        Err(e) => warn!("Could not reach Telegram to verify the bot credential: {e}"),
    }

    let schedule = Schedule::from_config(&config);
    let content = ReminderContent::new(config.image_dir.clone());
    let channel = TelegramChannel::new(client, config.chat_id);

    info!("📅 Schedule: {}", schedule.describe());
    info!("💬 Sending to chat ID: {}", config.chat_id);
    info!("🖼️ Image pool: {}", config.image_dir.display());
    info!("🕐 Current local time: {}", schedule.now().format("%Y-%m-%d %H:%M:%S"));

    StartupNotifier::new(config.startup_notification)
        .send_if_enabled(&channel, &content)
        .await;

    let mut scheduler =
        ReminderScheduler::new(channel, config.chat_id, schedule, content, config.ack_mode)
            .with_tick_interval(config.tick_interval);

    tokio::select! {
        _ = scheduler.run() => {}
        signal = shutdown_signal() => info!("Received {signal}, shutting down..."),
    }

    info!("Bot stopped gracefully");
    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on unix
async fn shutdown_signal() -> &'static str {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => "Ctrl-C",
        _ = terminate => "SIGTERM",
    }
}
