use tracing::{info, instrument};

use crate::discord::bot::Context;
use crate::discord::{render, summary};
use crate::error::AppError;
use crate::roster::SessionId;

/// Close a team finder and post its final roster
#[poise::command(slash_command, prefix_command, guild_only)]
#[instrument(skip(ctx), fields(guild_id, user_id = %ctx.author().id))]
pub async fn close(
    ctx: Context<'_>,
    #[description = "Roster number, shown at the bottom of the team finder"] roster: String,
) -> Result<(), AppError> {
    if let Some(guild_id) = ctx.guild_id() {
        tracing::Span::current().record("guild_id", guild_id.get());
    }

    let id: SessionId = roster.parse()?;
    let summary = ctx.data().rosters.close(id).await?;

    ctx.send(
        poise::CreateReply::default()
            .content(render::summary_text(&summary))
            .allowed_mentions(poise::serenity_prelude::CreateAllowedMentions::new()),
    )
    .await?;

    summary::retire_roster_message(ctx.http(), &summary).await;

    info!(session_id = %id, "🎮 Team finder closed");

    Ok(())
}
