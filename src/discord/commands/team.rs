use std::time::Duration;

use tracing::{info, instrument, warn};

use crate::discord::bot::Context;
use crate::discord::render;
use crate::error::AppError;
use crate::roster::{Capacity, MessageAnchor};

/// One week.
const MAX_DURATION_MINUTES: u64 = 10_080;

/// Open a team finder where members pick their role with buttons
#[poise::command(slash_command, prefix_command, guild_only)]
#[instrument(
    skip(ctx, description),
    fields(guild_id, user_id = %ctx.author().id)
)]
pub async fn team(
    ctx: Context<'_>,
    #[description = "Team size"] size: u32,
    #[description = "Confirmed Tank slots"]
    #[max = 10]
    tank: u32,
    #[description = "Confirmed DPS slots"]
    #[max = 10]
    dps: u32,
    #[description = "Confirmed Healer slots"]
    #[max = 10]
    healer: u32,
    #[description = "Close the team finder automatically after this many minutes"]
    #[min = 1]
    #[max = 10080]
    duration_minutes: Option<u64>,
    #[description = "Text shown on the team finder"]
    #[rest]
    description: Option<String>,
) -> Result<(), AppError> {
    if let Some(guild_id) = ctx.guild_id() {
        tracing::Span::current().record("guild_id", guild_id.get());
    }

    let capacity = Capacity::new(tank, dps, healer);
    // Prefix invocations skip the slash-side bounds.
    let duration = duration_minutes
        .map(|minutes| Duration::from_secs(minutes.clamp(1, MAX_DURATION_MINUTES) * 60));

    let roster = ctx
        .data()
        .rosters
        .create(size, capacity, description, duration)
        .await?;

    let reply = poise::CreateReply::default()
        .embed(render::roster_embed(&roster))
        .components(render::roster_components(&roster));

    let handle = match ctx.send(reply).await {
        Ok(handle) => handle,
        Err(e) => {
            // Nobody can reach a roster that was never posted.
            if let Err(close_err) = ctx.data().rosters.close(roster.id).await {
                warn!(
                    error = %close_err,
                    session_id = %roster.id,
                    "🎮 ⚠️ Could not discard unposted roster"
                );
            }
            return Err(e.into());
        }
    };

    let message = handle.message().await?;
    ctx.data()
        .rosters
        .attach_message(
            roster.id,
            MessageAnchor {
                channel_id: message.channel_id.get(),
                message_id: message.id.get(),
            },
        )
        .await?;

    info!(session_id = %roster.id, size, ?capacity, "🎮 Team finder posted");

    Ok(())
}
