use std::sync::Arc;

use poise::serenity_prelude::Http;
use tokio::sync::mpsc;
use tracing::{error, info};

use super::summary;
use crate::roster::RosterSummary;

pub type ExpiredRx = mpsc::Receiver<RosterSummary>;

/// Announces rosters that ran out of time.
pub struct ExpiryNotifier {
    http: Arc<Http>,
    receiver: ExpiredRx,
}

impl ExpiryNotifier {
    pub fn new(receiver: ExpiredRx, http: Arc<Http>) -> Self {
        Self { http, receiver }
    }

    pub fn spawn(mut self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }

    async fn run(&mut self) {
        info!("⌛ Expiry notifier started");

        while let Some(expired) = self.receiver.recv().await {
            summary::retire_roster_message(&self.http, &expired).await;

            match summary::post_summary(&self.http, &expired).await {
                Ok(true) => info!(session_id = %expired.roster.id, "⌛ Expired roster announced"),
                Ok(false) => {}
                Err(e) => error!(
                    error = ?e,
                    session_id = %expired.roster.id,
                    "⌛ ❌ Failed to announce expired roster"
                ),
            }
        }
    }
}
