use poise::serenity_prelude as serenity;
use tokio::sync::mpsc;
use tracing::{error, info};

use config::Config;
use discord::{Data, create_framework};
use error::AppError;
use roster::RosterStore;

mod config;
mod discord;
mod error;
mod liveness;
mod logging;
mod roster;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    logging::init()?;

    info!("🎯 Starting...");

    let config = Config::from_env()?;

    let (expired_tx, expired_rx) = mpsc::channel(100);
    let store = RosterStore::new(config.allowed_team_sizes.clone(), expired_tx);
    let rosters = store.handle();
    store.start();

    let liveness_rosters = rosters.clone();
    let port = config.port;
    tokio::spawn(async move {
        if let Err(e) = liveness::serve(port, liveness_rosters).await {
            error!(error = ?e, "🩺 ❌ Liveness endpoint stopped");
        }
    });
    tokio::spawn(liveness::start_keep_alive(
        config.external_url.clone(),
        config.keep_alive_interval_secs,
    ));

    let framework = create_framework(
        Data { rosters },
        expired_rx,
        config.command_prefix.clone(),
    );

    let intents =
        serenity::GatewayIntents::non_privileged() | serenity::GatewayIntents::MESSAGE_CONTENT;

    let mut client = serenity::ClientBuilder::new(&config.discord_token, intents)
        .framework(framework)
        .await?;

    client.start().await?;

    Ok(())
}
