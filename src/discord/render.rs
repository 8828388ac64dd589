//! Pure rendering of roster snapshots into Discord messages.

use poise::serenity_prelude::{
    ButtonStyle, CreateActionRow, CreateButton, CreateEmbed, CreateEmbedFooter,
};

use super::components::{ComponentAction, custom_id};
use crate::roster::{
    CloseReason, RoleSnapshot, RosterSnapshot, RosterSummary, Schedule, ScheduleEdge, Status,
    UserId,
};

const ROSTER_COLOUR: u32 = 0x3498db;
const CLOSED_COLOUR: u32 = 0x95a5a6;
const DEFAULT_DESCRIPTION: &str = "Pick your role with the buttons!";
const EMPTY_LIST: &str = "...";
/// Room for one member list. Three of them fit an embed field (1024) and six fit a message (2000).
const MEMBER_LIST_BUDGET: usize = 250;
/// Space kept free for the `, +N more` tail.
const MORE_SUFFIX_ROOM: usize = 16;

pub fn roster_embed(roster: &RosterSnapshot) -> CreateEmbed {
    CreateEmbed::new()
        .title(title(roster))
        .description(description(roster))
        .color(ROSTER_COLOUR)
        .field("✅ Confirmed", confirmed_field(roster), true)
        .field("🔄 Substitute", substitute_field(roster), true)
        .footer(CreateEmbedFooter::new(format!(
            "Roster #{id} • close with /close {id}",
            id = roster.id
        )))
}

/// Embed left on the roster message once it can no longer be joined.
pub fn retired_embed(summary: &RosterSummary) -> CreateEmbed {
    let state = match summary.reason {
        CloseReason::Closed => "closed",
        CloseReason::Expired => "expired",
    };

    CreateEmbed::new()
        .title(format!("{} ({state})", title(&summary.roster)))
        .description(description(&summary.roster))
        .color(CLOSED_COLOUR)
        .field("✅ Confirmed", confirmed_field(&summary.roster), true)
        .field("🔄 Substitute", substitute_field(&summary.roster), true)
        .footer(CreateEmbedFooter::new(format!("Roster #{}", summary.roster.id)))
}

pub fn roster_components(roster: &RosterSnapshot) -> Vec<CreateActionRow> {
    let mut rows: Vec<CreateActionRow> = roster
        .roles
        .iter()
        .map(|role| {
            let buttons = Status::ALL
                .iter()
                .map(|&status| {
                    let action = ComponentAction::Toggle {
                        role: role.role,
                        status,
                    };
                    CreateButton::new(custom_id(roster.id, &action))
                        .label(button_label(role, status))
                        .style(button_style(role, status))
                })
                .collect();
            CreateActionRow::Buttons(buttons)
        })
        .collect();

    rows.push(CreateActionRow::Buttons(vec![
        CreateButton::new(custom_id(
            roster.id,
            &ComponentAction::EditSchedule(ScheduleEdge::Start),
        ))
        .label("📅 Set start")
        .style(ButtonStyle::Primary),
        CreateButton::new(custom_id(
            roster.id,
            &ComponentAction::EditSchedule(ScheduleEdge::End),
        ))
        .label("⏹ Set search end")
        .style(ButtonStyle::Danger),
        CreateButton::new(custom_id(roster.id, &ComponentAction::Close))
            .label("🔒 Close")
            .style(ButtonStyle::Secondary),
    ]));

    rows
}

/// Plain-text summary posted when a roster ends.
pub fn summary_text(summary: &RosterSummary) -> String {
    let roster = &summary.roster;
    let mut text = match summary.reason {
        CloseReason::Closed => format!("🎉 **Team ({}) closed!** 🎉\n\n", roster.size),
        CloseReason::Expired => format!("⌛ **Team ({}) expired!**\n\n", roster.size),
    };

    for role in &roster.roles {
        text.push_str(&format!(
            "**{}**\n✅ Confirmed: {}\n🔵 Substitute: {}\n\n",
            role.role,
            member_list(&role.confirmed),
            member_list(&role.substitute)
        ));
    }

    text.push_str(&schedule_lines(&roster.schedule));
    text
}

fn title(roster: &RosterSnapshot) -> String {
    format!("🎯 {}-player Team Finder", roster.size)
}

fn description(roster: &RosterSnapshot) -> String {
    let mut text = roster
        .description
        .clone()
        .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string());

    let schedule = schedule_lines(&roster.schedule);
    if !schedule.is_empty() {
        text.push('\n');
        text.push_str(schedule.trim_end());
    }

    if let Some(expires_at) = roster.expires_at {
        text.push_str(&format!("\n⌛ **Expires:** <t:{}:R>", expires_at.timestamp()));
    }

    text
}

fn schedule_lines(schedule: &Schedule) -> String {
    let mut lines = String::new();
    if let Some((day, hour)) = schedule.start() {
        lines.push_str(&format!("🕒 **Start:** {day} {hour}:00\n"));
    }
    if let Some((day, hour)) = schedule.end() {
        lines.push_str(&format!("⏹ **Search ends:** {day} {hour}:00\n"));
    }
    lines
}

fn confirmed_field(roster: &RosterSnapshot) -> String {
    roster
        .roles
        .iter()
        .map(|role| {
            format!(
                "{} **{}**\n{}\n{}\n\n",
                role.role.emoji(),
                role.role,
                member_list(&role.confirmed),
                capacity_bar(role)
            )
        })
        .collect()
}

fn substitute_field(roster: &RosterSnapshot) -> String {
    roster
        .roles
        .iter()
        .map(|role| {
            format!(
                "{} **{}**\n{}\n\n",
                role.role.emoji(),
                role.role,
                member_list(&role.substitute)
            )
        })
        .collect()
}

fn member_list(members: &[UserId]) -> String {
    if members.is_empty() {
        return EMPTY_LIST.to_string();
    }

    let mut text = String::new();
    for (shown, user) in members.iter().enumerate() {
        let mention = format!("<@{}>", user.0);
        if shown > 0 {
            if text.len() + 2 + mention.len() + MORE_SUFFIX_ROOM > MEMBER_LIST_BUDGET {
                text.push_str(&format!(", +{} more", members.len() - shown));
                break;
            }
            text.push_str(", ");
        }
        text.push_str(&mention);
    }
    text
}

/// How full the confirmed slots of a role are.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fill {
    Unavailable,
    Open,
    HalfFull,
    Full,
}

fn fill(role: &RoleSnapshot) -> Fill {
    let current = role.confirmed.len();
    let max = role.capacity as usize;

    if max == 0 {
        Fill::Unavailable
    } else if current >= max {
        Fill::Full
    } else if current * 2 >= max {
        Fill::HalfFull
    } else {
        Fill::Open
    }
}

pub fn capacity_bar(role: &RoleSnapshot) -> String {
    let current = role.confirmed.len();
    let free = (role.capacity as usize).saturating_sub(current);

    let taken = match fill(role) {
        Fill::Unavailable => return "⚪".to_string(),
        Fill::Full => "🟥",
        Fill::HalfFull => "🟨",
        Fill::Open => "🟩",
    };

    format!("{}{}", taken.repeat(current), "⚪".repeat(free))
}

pub fn button_label(role: &RoleSnapshot, status: Status) -> String {
    match status {
        Status::Confirmed => format!(
            "{} {} - Confirmed ({}/{})",
            role.role.emoji(),
            role.role,
            role.confirmed.len(),
            role.capacity
        ),
        Status::Substitute => format!(
            "{} {} - Substitute ({})",
            role.role.emoji(),
            role.role,
            role.substitute.len()
        ),
    }
}

pub fn button_style(role: &RoleSnapshot, status: Status) -> ButtonStyle {
    if status == Status::Substitute {
        return ButtonStyle::Primary;
    }

    match fill(role) {
        Fill::Unavailable | Fill::HalfFull => ButtonStyle::Secondary,
        Fill::Full => ButtonStyle::Danger,
        Fill::Open => ButtonStyle::Success,
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::roster::{Role, SessionId};

    fn role(role: Role, capacity: u32, confirmed: &[u64], substitute: &[u64]) -> RoleSnapshot {
        RoleSnapshot {
            role,
            capacity,
            confirmed: confirmed.iter().copied().map(UserId).collect(),
            substitute: substitute.iter().copied().map(UserId).collect(),
        }
    }

    fn snapshot() -> RosterSnapshot {
        RosterSnapshot {
            id: SessionId(3),
            size: 5,
            roles: vec![
                role(Role::Tank, 1, &[], &[42]),
                role(Role::Dps, 2, &[7], &[]),
                role(Role::Healer, 2, &[], &[]),
            ],
            schedule: Schedule::default(),
            description: None,
            expires_at: None,
            anchor: None,
        }
    }

    #[test]
    fn capacity_bar_colours_follow_fill() {
        assert_eq!(capacity_bar(&role(Role::Dps, 4, &[1], &[])), "🟩⚪⚪⚪");
        assert_eq!(capacity_bar(&role(Role::Dps, 4, &[1, 2], &[])), "🟨🟨⚪⚪");
        assert_eq!(capacity_bar(&role(Role::Tank, 1, &[1], &[])), "🟥");
        assert_eq!(capacity_bar(&role(Role::Tank, 0, &[], &[])), "⚪");
        assert_eq!(capacity_bar(&role(Role::Healer, 2, &[], &[])), "⚪⚪");
    }

    #[test]
    fn button_labels_show_counts() {
        let dps = role(Role::Dps, 2, &[7], &[8, 9]);
        assert_eq!(button_label(&dps, Status::Confirmed), "⚔️ DPS - Confirmed (1/2)");
        assert_eq!(button_label(&dps, Status::Substitute), "⚔️ DPS - Substitute (2)");
    }

    #[test]
    fn button_styles_follow_fill() {
        let open = role(Role::Dps, 3, &[1], &[]);
        let half = role(Role::Dps, 2, &[1], &[]);
        let full = role(Role::Tank, 1, &[1], &[]);
        let none = role(Role::Healer, 0, &[], &[]);

        assert_eq!(button_style(&open, Status::Confirmed), ButtonStyle::Success);
        assert_eq!(button_style(&half, Status::Confirmed), ButtonStyle::Secondary);
        assert_eq!(button_style(&full, Status::Confirmed), ButtonStyle::Danger);
        assert_eq!(button_style(&none, Status::Confirmed), ButtonStyle::Secondary);
        assert_eq!(button_style(&full, Status::Substitute), ButtonStyle::Primary);
    }

    #[test]
    fn fields_list_members_or_placeholder() {
        let roster = snapshot();
        let confirmed = confirmed_field(&roster);
        assert!(confirmed.starts_with("🛡️ **Tank**\n...\n⚪\n\n"));
        assert!(confirmed.contains("⚔️ **DPS**\n<@7>\n🟨⚪"));

        let substitute = substitute_field(&roster);
        assert!(substitute.starts_with("🛡️ **Tank**\n<@42>\n\n"));
    }

    #[test]
    fn description_includes_complete_schedule_only() {
        let mut roster = snapshot();
        roster.schedule.start_day = NaiveDate::from_ymd_opt(2025, 11, 26);
        roster.schedule.end_hour = Some(22);

        let text = description(&roster);
        assert_eq!(text, DEFAULT_DESCRIPTION);

        roster.schedule.start_hour = Some(20);
        let text = description(&roster);
        assert_eq!(
            text,
            "Pick your role with the buttons!\n🕒 **Start:** 2025-11-26 20:00"
        );
    }

    #[test]
    fn summary_lists_every_role() {
        let summary = RosterSummary {
            reason: CloseReason::Closed,
            roster: snapshot(),
        };

        let text = summary_text(&summary);
        assert!(text.starts_with("🎉 **Team (5) closed!** 🎉\n\n"));
        assert!(text.contains("**Tank**\n✅ Confirmed: ...\n🔵 Substitute: <@42>\n\n"));
        assert!(text.contains("**DPS**\n✅ Confirmed: <@7>\n"));
        assert!(text.contains("**Healer**\n✅ Confirmed: ...\n🔵 Substitute: ...\n\n"));
    }

    #[test]
    fn expired_summary_has_its_own_heading() {
        let summary = RosterSummary {
            reason: CloseReason::Expired,
            roster: snapshot(),
        };
        assert!(summary_text(&summary).starts_with("⌛ **Team (5) expired!**"));
    }

    #[test]
    fn components_hold_one_row_per_role_plus_controls() {
        let rows = roster_components(&snapshot());
        assert_eq!(rows.len(), 4);
    }

    #[test]
    fn crowded_bench_is_truncated_to_fit_the_field() {
        let bench: Vec<u64> = (0..40).map(|i| 400_000_000_000_000_000 + i).collect();
        let mut roster = snapshot();
        for role in &mut roster.roles {
            role.substitute = bench.iter().copied().map(UserId).collect();
        }

        let field = substitute_field(&roster);
        assert!(field.chars().count() <= 1024);

        let list = member_list(&roster.roles[0].substitute);
        let shown = list.matches("<@").count();
        assert!(shown > 0 && shown < 40);
        assert!(list.ends_with(&format!(", +{} more", 40 - shown)));

        let summary = RosterSummary {
            reason: CloseReason::Closed,
            roster,
        };
        assert!(summary_text(&summary).chars().count() <= 2000);
    }

    #[test]
    fn short_member_lists_are_not_truncated() {
        assert_eq!(member_list(&[UserId(1), UserId(2)]), "<@1>, <@2>");
    }
}
