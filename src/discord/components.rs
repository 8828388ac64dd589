//! Custom ids carried by roster buttons and modals.
//!
//! Every id has the form `roster:<session>:<action>` so interactions can be routed back to the
//! roster they belong to without any lookup table.

use crate::roster::{Role, ScheduleEdge, SessionId, Status};

pub const ROSTER_PREFIX: &str = "roster";

/// Input ids inside the schedule modal.
pub const DATE_INPUT_ID: &str = "date";
pub const HOUR_INPUT_ID: &str = "hour";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentAction {
    Toggle { role: Role, status: Status },
    EditSchedule(ScheduleEdge),
    Close,
    /// Submission of the schedule modal opened by [`ComponentAction::EditSchedule`].
    SubmitSchedule(ScheduleEdge),
}

pub fn custom_id(session: SessionId, action: &ComponentAction) -> String {
    let action = match action {
        ComponentAction::Toggle { role, status } => format!(
            "toggle:{}:{}",
            role.as_str().to_lowercase(),
            status.as_str().to_lowercase()
        ),
        ComponentAction::EditSchedule(edge) => format!("schedule:{}", edge.as_str()),
        ComponentAction::Close => "close".to_string(),
        ComponentAction::SubmitSchedule(edge) => format!("modal:{}", edge.as_str()),
    };

    format!("{ROSTER_PREFIX}:{session}:{action}")
}

/// Returns `None` for ids that do not belong to a roster.
pub fn parse_custom_id(custom_id: &str) -> Option<(SessionId, ComponentAction)> {
    let mut parts = custom_id.split(':');
    if parts.next()? != ROSTER_PREFIX {
        return None;
    }

    let session = SessionId(parts.next()?.parse().ok()?);
    let action = match (parts.next()?, parts.next(), parts.next()) {
        ("toggle", Some(role), Some(status)) => ComponentAction::Toggle {
            role: role.parse().ok()?,
            status: status.parse().ok()?,
        },
        ("schedule", Some(edge), None) => ComponentAction::EditSchedule(edge.parse().ok()?),
        ("modal", Some(edge), None) => ComponentAction::SubmitSchedule(edge.parse().ok()?),
        ("close", None, None) => ComponentAction::Close,
        _ => return None,
    };

    if parts.next().is_some() {
        return None;
    }

    Some((session, action))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_action_survives_formatting() {
        let mut actions = vec![
            ComponentAction::Close,
            ComponentAction::EditSchedule(ScheduleEdge::Start),
            ComponentAction::SubmitSchedule(ScheduleEdge::End),
        ];
        for role in Role::ALL {
            for status in Status::ALL {
                actions.push(ComponentAction::Toggle { role, status });
            }
        }

        for action in actions {
            let id = custom_id(SessionId(42), &action);
            assert!(id.len() <= 100, "custom id too long: {id}");
            assert_eq!(parse_custom_id(&id), Some((SessionId(42), action)));
        }
    }

    #[test]
    fn toggle_id_layout() {
        let id = custom_id(
            SessionId(7),
            &ComponentAction::Toggle {
                role: Role::Dps,
                status: Status::Substitute,
            },
        );
        assert_eq!(id, "roster:7:toggle:dps:substitute");
    }

    #[test]
    fn foreign_or_malformed_ids_are_ignored() {
        assert_eq!(parse_custom_id("persona_chef"), None);
        assert_eq!(parse_custom_id("roster:x:close"), None);
        assert_eq!(parse_custom_id("roster:1:toggle:mage:confirmed"), None);
        assert_eq!(parse_custom_id("roster:1:toggle:tank"), None);
        assert_eq!(parse_custom_id("roster:1:close:extra"), None);
        assert_eq!(parse_custom_id("roster:1:schedule:middle"), None);
        assert_eq!(parse_custom_id("roster:1:schedule:start:x"), None);
    }
}
