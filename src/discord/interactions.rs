use poise::serenity_prelude::{
    self as serenity, ActionRowComponent, ComponentInteraction, CreateActionRow,
    CreateInputText, CreateInteractionResponse, CreateInteractionResponseFollowup,
    CreateInteractionResponseMessage, CreateModal, InputTextStyle, ModalInteraction,
};
use tracing::{debug, info, instrument, warn};

use super::bot::Data;
use super::components::{self, ComponentAction, DATE_INPUT_ID, HOUR_INPUT_ID};
use super::{render, summary};
use crate::error::AppError;
use crate::roster::{RosterError, ScheduleEdge, SessionId, UserId};

pub async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, AppError>,
    data: &Data,
) -> Result<(), AppError> {
    let serenity::FullEvent::InteractionCreate { interaction } = event else {
        return Ok(());
    };

    match interaction {
        serenity::Interaction::Component(component) => {
            let Some((session, action)) = components::parse_custom_id(&component.data.custom_id)
            else {
                return Ok(());
            };
            let res = handle_component(ctx, data, component, session, action).await;
            if let Err(e) = res {
                notify_failure(&e, |msg| component.create_response(ctx, msg)).await;
                if !e.is_user_facing() {
                    return Err(e);
                }
            }
        }
        serenity::Interaction::Modal(modal) => {
            let Some((session, ComponentAction::SubmitSchedule(edge))) =
                components::parse_custom_id(&modal.data.custom_id)
            else {
                return Ok(());
            };
            if let Err(e) = handle_schedule_modal(ctx, data, modal, session, edge).await {
                notify_failure(&e, |msg| modal.create_response(ctx, msg)).await;
                if !e.is_user_facing() {
                    return Err(e);
                }
            }
        }
        _ => {}
    }

    Ok(())
}

/// Answer a failed interaction with an ephemeral notice.
///
/// Roster errors (stale buttons, bad input) are shown verbatim; other failures get a generic
/// notice and are left to the framework error handler.
async fn notify_failure<F, Fut>(error: &AppError, respond: F)
where
    F: FnOnce(CreateInteractionResponse) -> Fut,
    Fut: std::future::Future<Output = serenity::Result<()>>,
{
    let content = if error.is_user_facing() {
        warn!(error = %error, "🎮 ⚠️ Roster interaction rejected");
        error.to_string()
    } else {
        "❌ Something went wrong while updating the team.".to_string()
    };

    let notice = CreateInteractionResponse::Message(
        CreateInteractionResponseMessage::new()
            .content(content)
            .ephemeral(true),
    );
    if let Err(e) = respond(notice).await {
        debug!(error = %e, "🎮 Could not deliver error notice");
    }
}

#[instrument(
    skip(ctx, data, component),
    fields(session_id = %session, user_id = %component.user.id)
)]
async fn handle_component(
    ctx: &serenity::Context,
    data: &Data,
    component: &ComponentInteraction,
    session: SessionId,
    action: ComponentAction,
) -> Result<(), AppError> {
    match action {
        ComponentAction::Toggle { role, status } => {
            let user = UserId(component.user.id.get());
            let snapshot = data.rosters.toggle(session, user, role, status).await?;

            let update = CreateInteractionResponseMessage::new()
                .embed(render::roster_embed(&snapshot))
                .components(render::roster_components(&snapshot));
            component
                .create_response(ctx, CreateInteractionResponse::UpdateMessage(update))
                .await?;
            debug!(%role, %status, "🎮 Roster updated");
        }
        ComponentAction::EditSchedule(edge) => {
            component
                .create_response(
                    ctx,
                    CreateInteractionResponse::Modal(schedule_modal(session, edge)),
                )
                .await?;
        }
        ComponentAction::Close => {
            let summary = data.rosters.close(session).await?;

            let update = CreateInteractionResponseMessage::new()
                .embed(render::retired_embed(&summary))
                .components(vec![]);
            component
                .create_response(ctx, CreateInteractionResponse::UpdateMessage(update))
                .await?;
            component
                .channel_id
                .send_message(ctx, summary::summary_message(&summary))
                .await?;
            info!("🎮 Roster closed from its message");
        }
        // Only ever sent by modals.
        ComponentAction::SubmitSchedule(_) => {}
    }

    Ok(())
}

fn schedule_modal(session: SessionId, edge: ScheduleEdge) -> CreateModal {
    let title = match edge {
        ScheduleEdge::Start => "Start date and hour",
        ScheduleEdge::End => "Search end date and hour",
    };

    CreateModal::new(
        components::custom_id(session, &ComponentAction::SubmitSchedule(edge)),
        title,
    )
    .components(vec![
        CreateActionRow::InputText(
            CreateInputText::new(InputTextStyle::Short, "Date (YYYY-MM-DD)", DATE_INPUT_ID)
                .placeholder("2025-11-26")
                .max_length(10)
                .required(true),
        ),
        CreateActionRow::InputText(
            CreateInputText::new(InputTextStyle::Short, "Hour (0-23)", HOUR_INPUT_ID)
                .placeholder("20")
                .max_length(2)
                .required(true),
        ),
    ])
}

#[instrument(
    skip(ctx, data, modal),
    fields(session_id = %session, user_id = %modal.user.id, edge = edge.as_str())
)]
async fn handle_schedule_modal(
    ctx: &serenity::Context,
    data: &Data,
    modal: &ModalInteraction,
    session: SessionId,
    edge: ScheduleEdge,
) -> Result<(), AppError> {
    let date = modal_value(modal, DATE_INPUT_ID)?;
    let hour = modal_value(modal, HOUR_INPUT_ID)?;

    let snapshot = data
        .rosters
        .set_schedule(
            session,
            vec![(edge.day_field(), date), (edge.hour_field(), hour)],
        )
        .await?;

    let update = CreateInteractionResponseMessage::new()
        .embed(render::roster_embed(&snapshot))
        .components(render::roster_components(&snapshot));
    modal
        .create_response(ctx, CreateInteractionResponse::UpdateMessage(update))
        .await?;
    modal
        .create_followup(
            ctx,
            CreateInteractionResponseFollowup::new()
                .content("🕒 Schedule updated!")
                .ephemeral(true),
        )
        .await?;

    info!("🎮 Roster schedule updated");
    Ok(())
}

fn modal_value(modal: &ModalInteraction, input_id: &str) -> Result<String, AppError> {
    modal
        .data
        .components
        .iter()
        .flat_map(|row| row.components.iter())
        .find_map(|component| match component {
            ActionRowComponent::InputText(input) if input.custom_id == input_id => {
                Some(input.value.clone().unwrap_or_default())
            }
            _ => None,
        })
        .ok_or_else(|| RosterError::InvalidValue(format!("missing `{input_id}` field")).into())
}
