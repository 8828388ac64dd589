//! In-memory team-finder rosters.
//!
//! A roster is one team-finder session: members claim a [`Role`] at a [`Status`], confirmed
//! slots are capped per role, and every member holds at most one placement at a time.
//! All sessions of the process are owned by the [`RosterStore`] actor.

mod schedule;
mod session;
mod store;

use std::fmt;

use thiserror::Error;

pub use schedule::{Schedule, ScheduleEdge, ScheduleField};
pub use session::{RoleSnapshot, RosterSession, RosterSnapshot};
pub use store::{CloseReason, RosterHandle, RosterStore, RosterSummary};

/// Team sizes accepted when no configuration overrides them.
pub const DEFAULT_TEAM_SIZES: [u32; 2] = [5, 10];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RosterError {
    #[error("Only teams of {allowed} players can be created (got {size}).")]
    InvalidSize { size: u32, allowed: String },

    #[error("The role slots add up to {total}, which is more than the team size of {size}.")]
    CapacityExceedsSize { total: u32, size: u32 },

    #[error("Team not found (it may have been closed or expired).")]
    SessionNotFound,

    #[error("Invalid input: {0}")]
    InvalidValue(String),
}

/// A party function a member can sign up for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Tank,
    Dps,
    Healer,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Tank, Role::Dps, Role::Healer];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Tank => "Tank",
            Role::Dps => "DPS",
            Role::Healer => "Healer",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Role::Tank => "🛡️",
            Role::Dps => "⚔️",
            Role::Healer => "❤️",
        }
    }

    fn index(self) -> usize {
        match self {
            Role::Tank => 0,
            Role::Dps => 1,
            Role::Healer => 2,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = RosterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tank" => Ok(Role::Tank),
            "dps" => Ok(Role::Dps),
            "healer" => Ok(Role::Healer),
            other => Err(RosterError::InvalidValue(format!("unknown role `{other}`"))),
        }
    }
}

/// Commitment level of a placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Confirmed,
    Substitute,
}

impl Status {
    pub const ALL: [Status; 2] = [Status::Confirmed, Status::Substitute];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Confirmed => "Confirmed",
            Status::Substitute => "Substitute",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Status {
    type Err = RosterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "confirmed" => Ok(Status::Confirmed),
            "substitute" => Ok(Status::Substitute),
            other => Err(RosterError::InvalidValue(format!("unknown status `{other}`"))),
        }
    }
}

/// Maximum number of confirmed members per role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capacity {
    pub tank: u32,
    pub dps: u32,
    pub healer: u32,
}

impl Capacity {
    pub fn new(tank: u32, dps: u32, healer: u32) -> Self {
        Self { tank, dps, healer }
    }

    pub fn get(&self, role: Role) -> u32 {
        match role {
            Role::Tank => self.tank,
            Role::Dps => self.dps,
            Role::Healer => self.healer,
        }
    }

    pub fn total(&self) -> u32 {
        self.tank.saturating_add(self.dps).saturating_add(self.healer)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for SessionId {
    type Err = RosterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .trim_start_matches('#')
            .parse()
            .map(SessionId)
            .map_err(|_| RosterError::SessionNotFound)
    }
}

/// Raw Discord user id of a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(pub u64);

/// Where a roster message was posted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageAnchor {
    pub channel_id: u64,
    pub message_id: u64,
}
