use poise::serenity_prelude::{
    ChannelId, CreateAllowedMentions, CreateMessage, EditMessage, Http, MessageId,
};
use tracing::{debug, warn};

use super::render;
use crate::error::AppError;
use crate::roster::RosterSummary;

/// Swap the roster message to its final state and remove its buttons.
///
/// Failing to do so is not fatal: the message may have been deleted in the meantime.
pub async fn retire_roster_message(http: &Http, summary: &RosterSummary) {
    let Some(anchor) = summary.roster.anchor else {
        debug!(session_id = %summary.roster.id, "🎮 Roster was never posted, nothing to retire");
        return;
    };

    let edit = EditMessage::new()
        .embed(render::retired_embed(summary))
        .components(vec![]);

    if let Err(e) = ChannelId::new(anchor.channel_id)
        .edit_message(http, MessageId::new(anchor.message_id), edit)
        .await
    {
        warn!(
            error = %e,
            session_id = %summary.roster.id,
            channel_id = anchor.channel_id,
            "🎮 ⚠️ Failed to retire roster message"
        );
    }
}

/// Post the summary of a finished roster in the roster's channel.
///
/// Returns `false` when the roster was never posted and there is no channel to announce in.
pub async fn post_summary(http: &Http, summary: &RosterSummary) -> Result<bool, AppError> {
    let Some(anchor) = summary.roster.anchor else {
        warn!(session_id = %summary.roster.id, "🎮 ⚠️ No channel known for roster summary");
        return Ok(false);
    };

    ChannelId::new(anchor.channel_id)
        .send_message(http, summary_message(summary))
        .await?;
    Ok(true)
}

/// Members are mentioned by id but never pinged.
pub fn summary_message(summary: &RosterSummary) -> CreateMessage {
    CreateMessage::new()
        .content(render::summary_text(summary))
        .allowed_mentions(CreateAllowedMentions::new())
}
