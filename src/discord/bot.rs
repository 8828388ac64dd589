use tracing::{error, info, warn};

use crate::error::AppError;
use crate::roster::RosterHandle;

use super::commands;
use super::expiry_notifier::{ExpiredRx, ExpiryNotifier};
use super::interactions;

/// Shared data accessible in all commands
#[derive(Debug)]
pub struct Data {
    pub rosters: RosterHandle,
}

pub type Context<'a> = poise::Context<'a, Data, AppError>;

pub fn create_framework(
    data: Data,
    expired: ExpiredRx,
    command_prefix: String,
) -> poise::Framework<Data, AppError> {
    poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![commands::team(), commands::close()],
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some(command_prefix),
                ..Default::default()
            },
            event_handler: |ctx, event, framework, data| {
                Box::pin(interactions::event_handler(ctx, event, framework, data))
            },
            on_error: |error| {
                Box::pin(async move {
                    handle_error(error).await;
                })
            },
            ..Default::default()
        })
        .setup(|ctx, ready, framework| {
            Box::pin(async move {
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                ExpiryNotifier::new(expired, ctx.http.clone()).spawn();
                info!(
                    bot_name = %ready.user.name,
                    guild_count = ready.guilds.len(),
                    "🎮 Bot is ready"
                );
                Ok(data)
            })
        })
        .build()
}

async fn handle_error(error: poise::FrameworkError<'_, Data, AppError>) {
    match error {
        poise::FrameworkError::Command { error, ctx, .. } => {
            let command_name = ctx.command().name.as_str();
            let reply = if error.is_user_facing() {
                warn!(
                    error = %error,
                    command = command_name,
                    user_id = %ctx.author().id,
                    "🎮 ⚠️ Roster request rejected"
                );
                error.to_string()
            } else {
                error!(
                    error = ?error,
                    command = command_name,
                    user_id = %ctx.author().id,
                    "🎮 ❌ Command execution failed"
                );
                format!("Error: {}", error)
            };
            let _ = ctx
                .send(poise::CreateReply::default().content(reply).ephemeral(true))
                .await;
        }
        poise::FrameworkError::ArgumentParse { error, ctx, .. } => {
            warn!(
                error = %error,
                command = ctx.command().name.as_str(),
                "🎮 ⚠️ Invalid command argument"
            );
            let _ = ctx.say(format!("Invalid argument: {}", error)).await;
        }
        poise::FrameworkError::GuildOnly { ctx, .. } => {
            let _ = ctx.say("❌ Team finders can only be used inside a server.").await;
        }
        poise::FrameworkError::EventHandler { error, .. } => {
            error!(error = ?error, "🎮 ❌ Interaction handling failed");
        }
        other => {
            error!(error = ?other, "🎮 ❌ Unhandled framework error");
        }
    }
}
