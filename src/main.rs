mod config;
mod core;
mod engine;
mod models;
mod services;

use std::sync::Arc;

use config::Settings;
use engine::Engine;
use models::{InviteKind, SwipeAction};
use services::{seed::demo_profiles, MemoryStore};
use tracing::{error, info};

/// Scripted demo session: swipe through the deck, chat with the first
/// match, and print the resulting progression state.
#[tokio::main]
async fn main() {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Initialize logging
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    let subscriber = tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }

    info!("Starting Lumina Core demo session...");

    let settings = Settings::load().unwrap_or_else(|e| {
        error!("Failed to load configuration: {}", e);
        Settings::default()
    });

    let store = Arc::new(MemoryStore::new());
    let engine = Engine::new("demo-user", &settings, store);

    let ledger = engine.ledger();
    ledger.check_daily_login();
    info!(
        "Ledger after login: {} XP, level {}, {} credits",
        ledger.xp(),
        ledger.level(),
        ledger.credits()
    );

    // Swipe through the whole demo deck
    let mut session = engine.swipe_session(demo_profiles());
    while let Some(profile) = session.current().cloned() {
        let outcome = match session.decide(SwipeAction::Like) {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Swipe failed: {}", e);
                break;
            }
        };
        if outcome.is_match() {
            info!("Matched with {}!", profile.name);
            if let Err(e) = session.advance() {
                error!("Failed to acknowledge match: {}", e);
                break;
            }
        }
    }

    let matches = engine.matches().list();
    info!("Session finished with {} matches", matches.len());

    // Chat with the first match, if any
    if let Some(m) = matches.first() {
        let chat = engine.chat(&m.id);
        if let Err(e) = chat.send_text("Hey, nice to match with you!") {
            error!("Send failed: {}", e);
        }
        if let Err(e) = chat.send_invite(InviteKind::Coffee) {
            error!("Invite failed: {}", e);
        }

        // Wait out the bot-response chains before reading the log
        tokio::time::sleep(std::time::Duration::from_millis(4500)).await;

        for message in chat.messages() {
            info!("[{:?}] {:?}", message.sender, message.kind);
        }
        chat.close();
    }

    info!(
        "Final ledger: {} XP, level {}, {} credits",
        ledger.xp(),
        ledger.level(),
        ledger.credits()
    );
}
