use std::time::Duration;

use tokio::time::interval;
use tracing::{info, warn};

use crate::error::AppError;

/// Periodically request our own public URL so the host does not put the service to sleep.
pub async fn start_keep_alive(url: Option<String>, interval_secs: u64) {
    let Some(url) = url else {
        info!("💓 RENDER_EXTERNAL_URL not set, keep-alive disabled");
        return;
    };

    let client = reqwest::Client::new();
    let mut interval = interval(Duration::from_secs(interval_secs));

    info!(%url, interval_secs, "💓 Keep-alive started");

    loop {
        interval.tick().await;

        match ping(&client, &url).await {
            Ok(status) => info!(status, "💓 Keep-alive ping"),
            Err(e) => warn!(error = %e, "💓 ⚠️ Keep-alive ping failed"),
        }
    }
}

async fn ping(client: &reqwest::Client, url: &str) -> Result<u16, AppError> {
    let response = client.get(url).send().await?;
    Ok(response.status().as_u16())
}
