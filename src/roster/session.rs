use std::collections::HashMap;

use chrono::{DateTime, Utc};

use super::{
    Capacity, MessageAnchor, Role, RosterError, Schedule, ScheduleField, SessionId, Status,
    UserId,
};

type Placement = (Role, Status);

#[derive(Debug, Clone, Default)]
struct RoleBuckets {
    confirmed: Vec<UserId>,
    substitute: Vec<UserId>,
}

impl RoleBuckets {
    fn bucket_mut(&mut self, status: Status) -> &mut Vec<UserId> {
        match status {
            Status::Confirmed => &mut self.confirmed,
            Status::Substitute => &mut self.substitute,
        }
    }
}

/// One team-finder roster.
#[derive(Debug, Clone)]
pub struct RosterSession {
    id: SessionId,
    size: u32,
    capacity: Capacity,
    buckets: [RoleBuckets; 3],
    /// Active placement of every member, at most one each.
    choices: HashMap<UserId, Placement>,
    schedule: Schedule,
    description: Option<String>,
    expires_at: Option<DateTime<Utc>>,
    anchor: Option<MessageAnchor>,
}

impl RosterSession {
    pub fn new(
        id: SessionId,
        size: u32,
        capacity: Capacity,
        allowed_sizes: &[u32],
    ) -> Result<Self, RosterError> {
        if !allowed_sizes.contains(&size) {
            let allowed = allowed_sizes
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
                .join(" or ");
            return Err(RosterError::InvalidSize { size, allowed });
        }

        let total = capacity.total();
        if total > size {
            return Err(RosterError::CapacityExceedsSize { total, size });
        }

        Ok(Self {
            id,
            size,
            capacity,
            buckets: Default::default(),
            choices: HashMap::new(),
            schedule: Schedule::default(),
            description: None,
            expires_at: None,
            anchor: None,
        })
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description.filter(|d| !d.trim().is_empty());
        self
    }

    pub fn with_expiry(mut self, expires_at: Option<DateTime<Utc>>) -> Self {
        self.expires_at = expires_at;
        self
    }

    pub fn set_anchor(&mut self, anchor: MessageAnchor) {
        self.anchor = Some(anchor);
    }

    /// Select, deselect or move `user` to `(role, status)`.
    ///
    /// Picking the current placement again clears it. Confirming into a full role lands the
    /// user on that role's substitute bench instead. Returns the user's placement afterwards.
    pub fn toggle(&mut self, user: UserId, role: Role, status: Status) -> Option<(Role, Status)> {
        let prev = self.choices.get(&user).copied();

        if prev == Some((role, status)) {
            self.remove(user, role, status);
            self.choices.remove(&user);
            return None;
        }

        if let Some((prev_role, prev_status)) = prev {
            self.remove(user, prev_role, prev_status);
        }

        let placement = if status == Status::Confirmed && self.is_full(role) {
            (role, Status::Substitute)
        } else {
            (role, status)
        };

        self.buckets[placement.0.index()]
            .bucket_mut(placement.1)
            .push(user);
        self.choices.insert(user, placement);

        Some(placement)
    }

    pub fn set_schedule<S: AsRef<str>>(
        &mut self,
        entries: &[(ScheduleField, S)],
    ) -> Result<(), RosterError> {
        self.schedule.apply(entries)
    }

    #[cfg(test)]
    pub fn placement_of(&self, user: UserId) -> Option<(Role, Status)> {
        self.choices.get(&user).copied()
    }

    pub fn snapshot(&self) -> RosterSnapshot {
        let roles = Role::ALL
            .iter()
            .map(|&role| {
                let buckets = &self.buckets[role.index()];
                RoleSnapshot {
                    role,
                    capacity: self.capacity.get(role),
                    confirmed: buckets.confirmed.clone(),
                    substitute: buckets.substitute.clone(),
                }
            })
            .collect();

        RosterSnapshot {
            id: self.id,
            size: self.size,
            roles,
            schedule: self.schedule,
            description: self.description.clone(),
            expires_at: self.expires_at,
            anchor: self.anchor,
        }
    }

    fn is_full(&self, role: Role) -> bool {
        self.buckets[role.index()].confirmed.len() >= self.capacity.get(role) as usize
    }

    fn remove(&mut self, user: UserId, role: Role, status: Status) {
        self.buckets[role.index()]
            .bucket_mut(status)
            .retain(|member| *member != user);
    }
}

/// Read-only view of a roster, enough to render it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterSnapshot {
    pub id: SessionId,
    pub size: u32,
    /// Always ordered Tank, DPS, Healer.
    pub roles: Vec<RoleSnapshot>,
    pub schedule: Schedule,
    pub description: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub anchor: Option<MessageAnchor>,
}

impl RosterSnapshot {
    #[cfg(test)]
    pub fn role(&self, role: Role) -> &RoleSnapshot {
        &self.roles[role.index()]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleSnapshot {
    pub role: Role,
    pub capacity: u32,
    pub confirmed: Vec<UserId>,
    pub substitute: Vec<UserId>,
}
