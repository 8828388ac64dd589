use std::{collections::HashMap, time::Duration};

use chrono::Utc;
use tokio::{
    sync::{
        mpsc::{self, error::TrySendError},
        oneshot,
    },
    task::AbortHandle,
};
use tracing::{debug, info, warn};

use super::{
    Capacity, MessageAnchor, Role, RosterError, RosterSession, RosterSnapshot, ScheduleField,
    SessionId, Status, UserId,
};
use crate::error::AppError;

pub type RosterTx = mpsc::Sender<RosterRequest>;
pub type RosterRx = mpsc::Receiver<RosterRequest>;

const CHANNEL_CAPACITY: usize = 100;

/// How a roster left the active set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    Closed,
    Expired,
}

/// Final state of a roster once it is closed or expired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterSummary {
    pub reason: CloseReason,
    pub roster: RosterSnapshot,
}

struct ActiveRoster {
    session: RosterSession,
    expiry: Option<AbortHandle>,
}

/// Owner of every active roster.
///
/// All requests go through one task so a toggle, a close and an expiry on the same roster are
/// applied strictly one after the other.
pub struct RosterStore {
    sessions: HashMap<SessionId, ActiveRoster>,
    next_id: u64,
    allowed_sizes: Vec<u32>,
    sender: RosterTx,
    receiver: RosterRx,
    expired: mpsc::Sender<RosterSummary>,
}

impl RosterStore {
    /// Expired rosters are published on `expired`.
    pub fn new(allowed_sizes: Vec<u32>, expired: mpsc::Sender<RosterSummary>) -> Self {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);

        Self {
            sessions: HashMap::new(),
            next_id: 1,
            allowed_sizes,
            sender: tx,
            receiver: rx,
            expired,
        }
    }

    pub fn handle(&self) -> RosterHandle {
        RosterHandle {
            sender: self.sender.clone(),
        }
    }

    pub fn start(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }

    async fn run(mut self) {
        info!(allowed_sizes = ?self.allowed_sizes, "📋 Roster store started");

        while let Some(request) = self.receiver.recv().await {
            match request {
                RosterRequest::Create {
                    size,
                    capacity,
                    description,
                    duration,
                    respond_to,
                } => {
                    let _ = respond_to.send(self.create(size, capacity, description, duration));
                }
                RosterRequest::AttachMessage {
                    id,
                    anchor,
                    respond_to,
                } => {
                    let res = self.session_mut(id).map(|session| session.set_anchor(anchor));
                    let _ = respond_to.send(res);
                }
                RosterRequest::Toggle {
                    id,
                    user,
                    role,
                    status,
                    respond_to,
                } => {
                    let res = self.session_mut(id).map(|session| {
                        let placement = session.toggle(user, role, status);
                        debug!(session_id = %id, user_id = user.0, ?placement, "📋 Toggled");
                        session.snapshot()
                    });
                    let _ = respond_to.send(res);
                }
                RosterRequest::SetSchedule {
                    id,
                    entries,
                    respond_to,
                } => {
                    let res = self.session_mut(id).and_then(|session| {
                        session.set_schedule(&entries)?;
                        Ok(session.snapshot())
                    });
                    let _ = respond_to.send(res);
                }
                RosterRequest::Close { id, respond_to } => {
                    let res = self.remove(id).map(|roster| RosterSummary {
                        reason: CloseReason::Closed,
                        roster,
                    });
                    if res.is_ok() {
                        info!(session_id = %id, "📋 Roster closed");
                    }
                    let _ = respond_to.send(res);
                }
                RosterRequest::Expire { id } => self.expire(id),
                RosterRequest::ActiveCount { respond_to } => {
                    let _ = respond_to.send(self.sessions.len());
                }
            }
        }
    }

    fn create(
        &mut self,
        size: u32,
        capacity: Capacity,
        description: Option<String>,
        duration: Option<Duration>,
    ) -> Result<RosterSnapshot, RosterError> {
        let id = SessionId(self.next_id);
        let expires_at = duration
            .and_then(|d| chrono::Duration::from_std(d).ok())
            .map(|d| Utc::now() + d);

        let session = RosterSession::new(id, size, capacity, &self.allowed_sizes)?
            .with_description(description)
            .with_expiry(expires_at);
        self.next_id += 1;

        let expiry = duration.map(|d| self.schedule_expiry(id, d));
        let snapshot = session.snapshot();
        self.sessions.insert(id, ActiveRoster { session, expiry });

        info!(session_id = %id, size, ?capacity, ?duration, "📋 Roster created");
        Ok(snapshot)
    }

    fn schedule_expiry(&self, id: SessionId, after: Duration) -> AbortHandle {
        let sender = self.sender.clone();
        tokio::spawn(async move {
            tokio::time::sleep(after).await;
            let _ = sender.send(RosterRequest::Expire { id }).await;
        })
        .abort_handle()
    }

    /// Never waits on the listener: a backed-up notifier must not hold up other rosters.
    fn expire(&mut self, id: SessionId) {
        // Lost the race against an explicit close.
        let Ok(roster) = self.remove(id) else {
            debug!(session_id = %id, "📋 Expiry fired for an inactive roster");
            return;
        };

        info!(session_id = %id, "📋 ⌛ Roster expired");
        let summary = RosterSummary {
            reason: CloseReason::Expired,
            roster,
        };
        match self.expired.try_send(summary) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                warn!(session_id = %id, "📋 ⚠️ Expired roster queue full, announcement dropped");
            }
            Err(TrySendError::Closed(_)) => {
                warn!(session_id = %id, "📋 ⚠️ No listener for expired rosters");
            }
        }
    }

    fn session_mut(&mut self, id: SessionId) -> Result<&mut RosterSession, RosterError> {
        self.sessions
            .get_mut(&id)
            .map(|active| &mut active.session)
            .ok_or(RosterError::SessionNotFound)
    }

    fn remove(&mut self, id: SessionId) -> Result<RosterSnapshot, RosterError> {
        let active = self
            .sessions
            .remove(&id)
            .ok_or(RosterError::SessionNotFound)?;
        if let Some(expiry) = active.expiry {
            expiry.abort();
        }
        Ok(active.session.snapshot())
    }
}

/// MPSC messages understood by the [`RosterStore`] task.
#[derive(Debug)]
pub enum RosterRequest {
    Create {
        size: u32,
        capacity: Capacity,
        description: Option<String>,
        duration: Option<Duration>,
        respond_to: oneshot::Sender<Result<RosterSnapshot, RosterError>>,
    },
    AttachMessage {
        id: SessionId,
        anchor: MessageAnchor,
        respond_to: oneshot::Sender<Result<(), RosterError>>,
    },
    Toggle {
        id: SessionId,
        user: UserId,
        role: Role,
        status: Status,
        respond_to: oneshot::Sender<Result<RosterSnapshot, RosterError>>,
    },
    SetSchedule {
        id: SessionId,
        entries: Vec<(ScheduleField, String)>,
        respond_to: oneshot::Sender<Result<RosterSnapshot, RosterError>>,
    },
    Close {
        id: SessionId,
        respond_to: oneshot::Sender<Result<RosterSummary, RosterError>>,
    },
    Expire {
        id: SessionId,
    },
    ActiveCount {
        respond_to: oneshot::Sender<usize>,
    },
}

/// Cloneable client of the [`RosterStore`] task.
#[derive(Debug, Clone)]
pub struct RosterHandle {
    sender: RosterTx,
}

impl RosterHandle {
    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> RosterRequest,
    ) -> Result<T, AppError> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(build(tx))
            .await
            .map_err(|_| AppError::StoreUnavailable)?;
        rx.await.map_err(|_| AppError::StoreUnavailable)
    }

    pub async fn create(
        &self,
        size: u32,
        capacity: Capacity,
        description: Option<String>,
        duration: Option<Duration>,
    ) -> Result<RosterSnapshot, AppError> {
        Ok(self
            .request(|respond_to| RosterRequest::Create {
                size,
                capacity,
                description,
                duration,
                respond_to,
            })
            .await??)
    }

    pub async fn attach_message(
        &self,
        id: SessionId,
        anchor: MessageAnchor,
    ) -> Result<(), AppError> {
        Ok(self
            .request(|respond_to| RosterRequest::AttachMessage {
                id,
                anchor,
                respond_to,
            })
            .await??)
    }

    pub async fn toggle(
        &self,
        id: SessionId,
        user: UserId,
        role: Role,
        status: Status,
    ) -> Result<RosterSnapshot, AppError> {
        Ok(self
            .request(|respond_to| RosterRequest::Toggle {
                id,
                user,
                role,
                status,
                respond_to,
            })
            .await??)
    }

    pub async fn set_schedule(
        &self,
        id: SessionId,
        entries: Vec<(ScheduleField, String)>,
    ) -> Result<RosterSnapshot, AppError> {
        Ok(self
            .request(|respond_to| RosterRequest::SetSchedule {
                id,
                entries,
                respond_to,
            })
            .await??)
    }

    pub async fn close(&self, id: SessionId) -> Result<RosterSummary, AppError> {
        Ok(self
            .request(|respond_to| RosterRequest::Close { id, respond_to })
            .await??)
    }

    pub async fn active_count(&self) -> Result<usize, AppError> {
        self.request(|respond_to| RosterRequest::ActiveCount { respond_to })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::DEFAULT_TEAM_SIZES;

    fn start_store() -> (RosterHandle, mpsc::Receiver<RosterSummary>) {
        let (tx, rx) = mpsc::channel(10);
        let store = RosterStore::new(DEFAULT_TEAM_SIZES.to_vec(), tx);
        let handle = store.handle();
        store.start();
        (handle, rx)
    }

    fn roster_error(err: AppError) -> RosterError {
        match err {
            AppError::Roster(e) => e,
            other => panic!("expected roster error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn create_allocates_distinct_ids() {
        let (store, _expired) = start_store();

        let first = store.create(5, Capacity::new(1, 2, 2), None, None).await.unwrap();
        let second = store.create(10, Capacity::new(2, 6, 2), None, None).await.unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(store.active_count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn create_rejects_invalid_requests() {
        let (store, _expired) = start_store();

        let err = store
            .create(5, Capacity::new(3, 2, 1), None, None)
            .await
            .unwrap_err();
        assert_eq!(
            roster_error(err),
            RosterError::CapacityExceedsSize { total: 6, size: 5 }
        );

        let err = store
            .create(7, Capacity::new(1, 1, 1), None, None)
            .await
            .unwrap_err();
        assert!(matches!(roster_error(err), RosterError::InvalidSize { .. }));
        assert_eq!(store.active_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn scenario_through_the_store() {
        let (store, _expired) = start_store();
        let id = store
            .create(5, Capacity::new(1, 2, 2), None, None)
            .await
            .unwrap()
            .id;
        let (a, b) = (UserId(10), UserId(20));

        let snap = store.toggle(id, a, Role::Tank, Status::Confirmed).await.unwrap();
        assert_eq!(snap.role(Role::Tank).confirmed, vec![a]);

        store.toggle(id, b, Role::Tank, Status::Confirmed).await.unwrap();
        store.toggle(id, a, Role::Tank, Status::Confirmed).await.unwrap();

        let summary = store.close(id).await.unwrap();
        assert_eq!(summary.reason, CloseReason::Closed);
        let tank = summary.roster.role(Role::Tank);
        assert!(tank.confirmed.is_empty());
        assert_eq!(tank.substitute, vec![b]);
    }

    #[tokio::test]
    async fn requests_after_close_fail_with_not_found() {
        let (store, _expired) = start_store();
        let id = store
            .create(5, Capacity::new(1, 2, 2), None, None)
            .await
            .unwrap()
            .id;
        store.close(id).await.unwrap();

        let err = store
            .toggle(id, UserId(1), Role::Dps, Status::Confirmed)
            .await
            .unwrap_err();
        assert_eq!(roster_error(err), RosterError::SessionNotFound);

        let err = store.close(id).await.unwrap_err();
        assert_eq!(roster_error(err), RosterError::SessionNotFound);

        let err = store
            .set_schedule(id, vec![(ScheduleField::StartHour, "20".into())])
            .await
            .unwrap_err();
        assert_eq!(roster_error(err), RosterError::SessionNotFound);
    }

    #[tokio::test]
    async fn closing_one_roster_leaves_others_alone() {
        let (store, _expired) = start_store();
        let first = store.create(5, Capacity::new(1, 2, 2), None, None).await.unwrap().id;
        let second = store.create(5, Capacity::new(1, 2, 2), None, None).await.unwrap().id;
        store
            .toggle(second, UserId(3), Role::Healer, Status::Confirmed)
            .await
            .unwrap();

        store.close(first).await.unwrap();

        let snap = store
            .toggle(second, UserId(4), Role::Healer, Status::Confirmed)
            .await
            .unwrap();
        assert_eq!(snap.role(Role::Healer).confirmed, vec![UserId(3), UserId(4)]);
    }

    #[tokio::test]
    async fn schedule_and_anchor_show_up_in_summary() {
        let (store, _expired) = start_store();
        let id = store
            .create(5, Capacity::new(1, 2, 2), Some("raid night".into()), None)
            .await
            .unwrap()
            .id;
        let anchor = MessageAnchor {
            channel_id: 100,
            message_id: 200,
        };
        store.attach_message(id, anchor).await.unwrap();

        let err = store
            .set_schedule(id, vec![(ScheduleField::StartHour, "25".into())])
            .await
            .unwrap_err();
        assert!(matches!(roster_error(err), RosterError::InvalidValue(_)));

        store
            .set_schedule(
                id,
                vec![
                    (ScheduleField::StartDay, "2025-11-26".into()),
                    (ScheduleField::StartHour, "20".into()),
                ],
            )
            .await
            .unwrap();

        let summary = store.close(id).await.unwrap();
        assert_eq!(summary.roster.anchor, Some(anchor));
        assert_eq!(summary.roster.schedule.start_hour, Some(20));
        assert_eq!(summary.roster.description.as_deref(), Some("raid night"));
    }

    #[tokio::test(start_paused = true)]
    async fn expiry_publishes_summary_once() {
        let (store, mut expired) = start_store();
        let id = store
            .create(
                5,
                Capacity::new(1, 2, 2),
                None,
                Some(Duration::from_secs(60)),
            )
            .await
            .unwrap()
            .id;
        store
            .toggle(id, UserId(1), Role::Dps, Status::Confirmed)
            .await
            .unwrap();

        let summary = expired.recv().await.unwrap();
        assert_eq!(summary.reason, CloseReason::Expired);
        assert_eq!(summary.roster.id, id);
        assert_eq!(summary.roster.role(Role::Dps).confirmed, vec![UserId(1)]);

        let err = store.close(id).await.unwrap_err();
        assert_eq!(roster_error(err), RosterError::SessionNotFound);
        assert!(expired.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn close_before_expiry_suppresses_it() {
        let (store, mut expired) = start_store();
        let id = store
            .create(
                5,
                Capacity::new(1, 2, 2),
                None,
                Some(Duration::from_secs(60)),
            )
            .await
            .unwrap()
            .id;

        store.close(id).await.unwrap();
        tokio::time::sleep(Duration::from_secs(120)).await;

        assert_eq!(store.active_count().await.unwrap(), 0);
        assert!(expired.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn backed_up_expiry_listener_does_not_stall_live_rosters() {
        let (tx, mut expired) = mpsc::channel(1);
        let roster_store = RosterStore::new(DEFAULT_TEAM_SIZES.to_vec(), tx);
        let store = roster_store.handle();
        roster_store.start();

        for _ in 0..2 {
            store
                .create(5, Capacity::new(1, 2, 2), None, Some(Duration::from_secs(60)))
                .await
                .unwrap();
        }
        let live = store
            .create(5, Capacity::new(1, 2, 2), None, None)
            .await
            .unwrap()
            .id;

        tokio::time::sleep(Duration::from_secs(61)).await;

        let snap = tokio::time::timeout(
            Duration::from_secs(5),
            store.toggle(live, UserId(1), Role::Tank, Status::Confirmed),
        )
        .await
        .expect("store stalled behind the expired roster queue")
        .unwrap();
        assert_eq!(snap.role(Role::Tank).confirmed, vec![UserId(1)]);
        assert_eq!(store.active_count().await.unwrap(), 1);

        // One announcement fits in the queue, the other is dropped.
        assert_eq!(expired.recv().await.unwrap().reason, CloseReason::Expired);
        assert!(expired.try_recv().is_err());
    }
}
