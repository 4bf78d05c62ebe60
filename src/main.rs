//! ContextBuddy Telegram Bot
//!
//! Main application entry point

use std::sync::Arc;
use teloxide::{prelude::*, types::Update};
use teloxide::dispatching::UpdateHandler;
use tracing::{info, warn, error};

use ContextBuddy::{
    config::Settings,
    utils::logging,
    models::BotType,
    state::{ContinuationRegistry, UserContextStorage},
    handlers::{
        commands::{handle_cancel, handle_help, Command},
        greeting::{register_greeting, start_handler},
        messages::{handle_message, StartHandler},
    },
};

type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new()?;
    settings.validate()?;

    // Initialize logging
    let _log_guard = logging::init_logging(&settings.logging)?;

    info!("Starting {}...", ContextBuddy::info());

    // Register every continuation before serving traffic
    let bot_type = BotType::new(settings.bot.bot_type.clone());
    let mut registry = ContinuationRegistry::new();
    register_greeting(&mut registry, &bot_type);
    let registry = Arc::new(registry);

    // Connect continuation storage
    info!(mode = ?settings.redis.mode, "Connecting to Redis...");
    let storage = Arc::new(UserContextStorage::connect(registry, &settings).await?);
    info!(expires_in = ?storage.expires_in(), "User context storage ready");

    let bot = Bot::new(&settings.bot.token);
    let start: StartHandler = start_handler();

    let mut dispatcher = Dispatcher::builder(bot, create_handler())
        .dependencies(dptree::deps![storage, start])
        .default_handler(|upd| async move {
            warn!("Unhandled update: {:?}", upd);
        })
        .enable_ctrlc_handler()
        .build();

    info!("Starting bot with polling mode...");
    dispatcher.dispatch().await;

    info!("ContextBuddy bot has been shut down.");

    Ok(())
}

/// Create the main update handler
fn create_handler() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
    use teloxide::dispatching::UpdateFilterExt;

    Update::filter_message()
        .branch(
            // Handle commands
            dptree::entry()
                .filter_command::<Command>()
                .endpoint(handle_commands)
        )
        .branch(
            // Handle text messages
            dptree::filter(|msg: Message| msg.text().is_some())
                .endpoint(handle_messages)
        )
}

/// Handle bot commands
async fn handle_commands(
    bot: Bot,
    msg: Message,
    cmd: Command,
    storage: Arc<UserContextStorage>,
) -> HandlerResult {
    let result = match cmd {
        Command::Help => handle_help(bot, msg).await,
        Command::Cancel => handle_cancel(bot, msg, &storage).await,
    };

    if let Err(e) = result {
        error!(error = %e, severity = %e.severity(), "Error handling command");
        return Err(e.into());
    }

    Ok(())
}

/// Handle regular messages
async fn handle_messages(
    bot: Bot,
    msg: Message,
    storage: Arc<UserContextStorage>,
    start: StartHandler,
) -> HandlerResult {
    if let Err(e) = handle_message(bot, msg, storage, start).await {
        error!(error = %e, "Error handling message");
        return Err(e.into());
    }

    Ok(())
}
