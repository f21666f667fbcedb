use std::process::ExitCode;
use std::sync::Arc;

use teloxide::error_handlers::LoggingErrorHandler;
use teloxide::prelude::*;
use teloxide::update_listeners::webhooks::{self, Options};
use tracing_subscriber::EnvFilter;

use totemquizbot::catalog::Catalog;
use totemquizbot::config::Config;
use totemquizbot::media::MediaLibrary;
use totemquizbot::router::DialogueRouter;
use totemquizbot::runner::QuizRunner;
use totemquizbot::schema::schema;

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|err| {
        eprintln!("Invalid LOG_LEVEL '{level}': {err}, using 'info'");
        EnvFilter::new("info")
    });

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .log_internal_errors(true)
        .with_line_number(true)
        .with_target(false)
        .finish();

    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to install tracing subscriber: {err}");
    }
    // teloxide reports through `log`.
    if let Err(err) = tracing_log::LogTracer::init() {
        eprintln!("Failed to bridge log records: {err}");
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Invalid configuration: {err}");
            return ExitCode::FAILURE;
        }
    };
    init_tracing(&config.log_level);

    if config.uses_placeholder_token() {
        tracing::warn!("TELOXIDE_TOKEN is not set, using a placeholder token");
    }
    tracing::info!(support_chat = config.support_chat_id, "Support chat configured");

    let catalog = match Catalog::load(&config.data_dir) {
        Ok(catalog) => Arc::new(catalog),
        Err(err) => {
            tracing::error!(error = %err, "Failed to load catalog");
            return ExitCode::FAILURE;
        }
    };

    let router = Arc::new(DialogueRouter::new(
        QuizRunner::new(catalog),
        MediaLibrary::new(&config.media_dir),
        config.logo_file.clone(),
    ));

    let bot = Bot::new(config.token.clone());
    tracing::info!("Starting bot...");

    let mut dispatcher = Dispatcher::builder(bot.clone(), schema())
        .dependencies(dptree::deps![router])
        .default_handler(|update| async move {
            tracing::debug!(update_id = ?update.id, "Unhandled update");
        })
        .error_handler(LoggingErrorHandler::with_custom_text(
            "An error has occurred in the dispatcher",
        ))
        .enable_ctrlc_handler()
        .build();

    match config.webhook {
        Some(webhook) => {
            let listener = match webhooks::axum(bot, Options::new(webhook.addr, webhook.url)).await {
                Ok(listener) => listener,
                Err(err) => {
                    tracing::error!(error = %err, "Failed to build a webhook listener");
                    return ExitCode::FAILURE;
                }
            };
            dispatcher
                .dispatch_with_listener(
                    listener,
                    LoggingErrorHandler::with_custom_text("An error from the update listener"),
                )
                .await
        }
        None => dispatcher.dispatch().await,
    }

    ExitCode::SUCCESS
}
